use ipfsd_rs::{cli, telemetry};

fn main() {
    let cli = cli::parse_from(std::env::args_os());
    telemetry::init(cli.verbose, telemetry::LogFormat::Compact);

    if let Err(e) = cli::run(cli) {
        tracing::error!("error: {}", e);
        if e.transience().is_retryable() {
            tracing::warn!("transient failure; retrying may help");
        }
        std::process::exit(1);
    }
}
