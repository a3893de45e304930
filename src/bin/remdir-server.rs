use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use remdir::server::Server;

#[derive(Parser, Debug)]
#[command(name = "remdir-server")]
#[command(version)]
#[command(about = "Serve a directory for remote navigation and file transfer", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 65432)]
    port: u16,

    /// Directory every session starts in
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let server = Server::bind((cli.host.as_str(), cli.port), &cli.root).await?;
    server.serve().await?;

    Ok(())
}
