use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> ExitCode {
    let cli = cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &cli::Cli) {
    let default = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &cli::Cli) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading mechanism {}", cli.input.display()))?;
    let mode = cli.build.mode();

    let artifacts = mechgen::generate(&json, &mode, cli.moles.as_deref())
        .with_context(|| format!("generating {} sources", mode.backend))?;
    let written = artifacts
        .write_to(&cli.output)
        .with_context(|| format!("writing to {}", cli.output.display()))?;

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
