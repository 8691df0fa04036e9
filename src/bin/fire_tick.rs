//! Run a single fire check against the live configuration and print the report.

use fire_watch::{Poller, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    fire_watch::init_tracing();

    let settings = Settings::load_default()?;
    let poller = Poller::from_settings(&settings)?;

    let report = poller.tick_from_env().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
