use clap::Parser;
use tracing_subscriber::EnvFilter;

use flip::api::{Cli, Command, run_command, run_http_server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        Command::Report(command) => match run_command(&command) {
            Ok(output) => println!("{output}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(2);
            }
        },
    }
}
