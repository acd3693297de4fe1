use anyhow::{bail, Context};
use biomatch::{
    core::identity::types::LiveSample,
    utils::{config::Config, logging},
    BiometricSystem,
};
use serde::Serialize;
use tracing::{error, info};

const USAGE: &str = "usage:
  biomatch enroll <username> <email> [samples]
  biomatch auth <username> [sample-id]
  biomatch history <username> [limit]
  biomatch status <username>
  biomatch users";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::new().context("Failed to load configuration")?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init(&config.logging)?;

    info!("Starting biomatch v{}", env!("CARGO_PKG_VERSION"));

    let system = BiometricSystem::new(config).map_err(|e| {
        error!("Failed to initialize: {}", e);
        e
    })?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["enroll", username, email] => print(&system.enroll(username, email, None).await?),
        ["enroll", username, email, samples] => {
            let samples = samples.parse().context("samples must be a positive integer")?;
            print(&system.enroll(username, email, Some(samples)).await?)
        }
        ["auth", username] => print(&system.authenticate(username, None).await?),
        ["auth", username, sample_id] => {
            let sample = LiveSample::Identifier(sample_id.to_string());
            print(&system.authenticate(username, Some(sample)).await?)
        }
        ["history", username] => print(&system.history(username, None).await?),
        ["history", username, limit] => {
            let limit = limit.parse().context("limit must be a positive integer")?;
            print(&system.history(username, Some(limit)).await?)
        }
        ["status", username] => print(&system.enrollment_status(username).await?),
        ["users"] => print(&system.identities().await?),
        _ => bail!(USAGE),
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
