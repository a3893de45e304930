use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use remdir::{
    client::{error::Error as ClientError, RemoteSession},
    protocol::Command,
};
use tokio::{
    fs,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

#[derive(Parser, Debug)]
#[command(name = "remdir-client")]
#[command(version)]
#[command(about = "Interactive client for a remdir server", long_about = None)]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 65432)]
    port: u16,
}

/// Upload reads the local file before anything goes on the wire, so a
/// bad path costs no round trip.
async fn upload(session: &mut RemoteSession<TcpStream>, name: &str) -> Result<String, ClientError> {
    let content = fs::read(name).await?;
    session.upload(name, &content).await
}

async fn download(
    session: &mut RemoteSession<TcpStream>,
    name: &str,
) -> Result<String, ClientError> {
    let (content, listing) = session.download(name).await?;
    fs::write(name, &content).await?;

    Ok(listing)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let (mut session, listing) = RemoteSession::connect((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("cannot connect to {}:{}", cli.host, cli.port))?;

    println!(
        "connected to {}:{}, session token {}",
        cli.host,
        cli.port,
        session.token()
    );
    println!("{listing}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            session.exit().await?;
            break;
        };

        let command = match Command::try_from(line.as_bytes()) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        let outcome = match command {
            Command::Exit => {
                session.exit().await?;
                break;
            }
            Command::Cd(path) => session.change_dir(path).await,
            Command::Mkdir(name) => session.make_dir(name).await,
            Command::Rm(name) => session.remove(name).await,
            Command::Ul(name) => upload(&mut session, &name).await,
            Command::Dl(name) => download(&mut session, &name).await,
        };

        match outcome {
            Ok(listing) => println!("{listing}"),
            Err(ClientError::Refused(reason)) => eprintln!("{reason}"),
            // local file trouble is the user's, not the session's
            Err(err @ ClientError::IO(_)) => eprintln!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
