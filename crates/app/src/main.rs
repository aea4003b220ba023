use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = app::cli::Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app::cli::run(cli, &mut out)
}
