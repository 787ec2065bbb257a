mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(error) => {
            error!("media-upload exited with error: {:#}", error);
            std::process::exit(1);
        }
    }
}
