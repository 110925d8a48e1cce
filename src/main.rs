use std::process::ExitCode;

use clap::Parser;
use rss_reader::{app, cli::Args, config::Config, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    app::run(args, &config).await?;
    Ok(())
}
