mod app;
mod poller;
mod reload;

use crate::core::settings::Settings;
use anyhow::Result;
use std::path::PathBuf;

pub use poller::PollerState;

pub async fn run(settings: Settings, items_path: PathBuf) -> Result<()> {
    app::run(settings, items_path).await
}
