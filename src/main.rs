use rotolog::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Internal diagnostics (failed compression, dropped records) go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    ctrlc::set_handler(|| {
        if let Err(e) = rotolog::logger::global::sync() {
            eprintln!("Failed to sync logs: {}", e);
        }
        std::process::exit(130);
    })?;

    Cli::run()?;
    Ok(())
}
