//! CLI surface for ipfsd-rs.
//!
//! Thin handlers over the library: `spawn` bootstraps a node and leaves
//! the daemon running; `has` answers the offline presence question via
//! its exit code.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{DEFAULT_KEY_BITS, NodeDefaults, PatchProfile, SeedProfile, SpawnProfile};
use crate::daemon::{SpawnOptions, presence, spawn};
use crate::paths;

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "ipfsd",
    version,
    about = "Launch and query local IPFS daemon instances",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a repository and start a daemon bound to it.
    Spawn(SpawnArgs),

    /// Check whether a CID is already present locally (exit 0 = present).
    Has(HasArgs),
}

#[derive(Args, Debug)]
pub struct SpawnArgs {
    /// Repository directory (default: $IPFS_PATH or ~/.ipfs).
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Daemon executable.
    #[arg(long = "ipfs-bin", value_name = "PATH", default_value = "ipfs")]
    pub ipfs_bin: PathBuf,

    /// Join the built-in private swarm instead of the public network.
    #[arg(long, default_value_t = false)]
    pub private: bool,

    /// Init with this storage-profile preset and patch the generated
    /// config, instead of seeding a fresh repository.
    #[arg(long, value_name = "PRESET")]
    pub patch: Option<String>,
}

#[derive(Args, Debug)]
pub struct HasArgs {
    /// Content identifier to look up.
    pub cid: String,

    /// Repository directory (default: $IPFS_PATH or ~/.ipfs).
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Daemon executable.
    #[arg(long = "ipfs-bin", value_name = "PATH", default_value = "ipfs")]
    pub ipfs_bin: PathBuf,
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

// =============================================================================
// Handlers
// =============================================================================

pub fn run(cli: Cli) -> crate::Result<()> {
    match cli.command {
        Commands::Spawn(args) => run_spawn(args),
        Commands::Has(args) => run_has(args),
    }
}

fn run_spawn(args: SpawnArgs) -> crate::Result<()> {
    let defaults = if args.private {
        NodeDefaults::private_swarm()
    } else {
        NodeDefaults::standard()
    };
    let profile = match args.patch {
        Some(preset) => SpawnProfile::Patch(PatchProfile { preset, defaults }),
        None => SpawnProfile::Seed(SeedProfile {
            key_bits: DEFAULT_KEY_BITS,
            defaults,
        }),
    };

    let mut opts = SpawnOptions::new(
        args.repo.unwrap_or_else(paths::default_repo_dir),
        args.ipfs_bin,
    );
    opts.profile = profile;
    opts.log = Arc::new(|line: &str| println!("{line}"));

    let handle = spawn(opts)?;
    tracing::info!(peer_id = %handle.identity().peer_id, "daemon ready, detaching");
    Ok(())
}

fn run_has(args: HasArgs) -> crate::Result<()> {
    let repo = args.repo.unwrap_or_else(paths::default_repo_dir);
    let present = presence::has_local(&args.ipfs_bin, &repo, &args.cid);
    println!("{present}");
    if !present {
        std::process::exit(1);
    }
    Ok(())
}
