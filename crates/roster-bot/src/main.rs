use std::sync::Arc;

use roster_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), roster_core::Error> {
    roster_core::logging::init("roster_bot")?;

    let cfg = Arc::new(Config::load()?);

    roster_discord::router::run(cfg)
        .await
        .map_err(|e| roster_core::Error::External(format!("discord bot failed: {e}")))?;

    Ok(())
}
