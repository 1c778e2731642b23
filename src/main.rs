use clap::Parser;
use kofi_relay::application::{config::Args, startup};
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(error) = startup::run(args).await {
        error!("relay failed: {error}");
        eprintln!("kofi-relay: {error}");
        std::process::exit(1);
    }
}
