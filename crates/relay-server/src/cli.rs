use clap::Parser;

/// Starts the HTTP ingestion surface and the scheduler loop together.
#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(about = "Notification routing and delivery core")]
#[command(version)]
pub struct Cli {
    /// Address to bind the HTTP surface to (overrides RELAY_BIND_ADDRESS).
    #[arg(long, env = "RELAY_BIND_ADDRESS")]
    pub bind_address: Option<String>,
}
