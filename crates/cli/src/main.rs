//! `clinica` command line client.

mod commands;

use clap::Parser;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clinica_observability::init();

    let cli = Cli::parse();
    let output = commands::run(cli).await?;
    println!("{output}");
    Ok(())
}
