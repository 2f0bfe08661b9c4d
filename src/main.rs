use ardf_mcp::Cli;
use clap::Parser;
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    ardf_mcp::run(cli).await
}
