use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
#[cfg(test)]
mod test_utils;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap and the settings read the environment
    dotenvy::dotenv().ok();

    model::init_tracing();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
