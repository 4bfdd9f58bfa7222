use anyhow::{Context, Result};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Signals whenever the items file is created or modified, coalescing bursts
/// of filesystem events into one signal.
pub struct ItemsWatcher {
    _watcher: RecommendedWatcher,
}

impl ItemsWatcher {
    pub fn start(items_path: &Path) -> Result<(Self, mpsc::UnboundedReceiver<()>)> {
        let parent = items_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let file_name: OsString = items_path
            .file_name()
            .with_context(|| format!("Items path has no file name: {}", items_path.display()))?
            .to_os_string();

        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<()>();
        let (async_tx, async_rx) = mpsc::unbounded_channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                let Ok(event) = res else {
                    return;
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                if event
                    .paths
                    .iter()
                    .any(|path| path.file_name() == Some(file_name.as_os_str()))
                {
                    let _ = notify_tx.send(());
                }
            },
            Config::default(),
        )?;

        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", parent.display()))?;
        tracing::info!(?parent, "Watching items directory");

        tokio::spawn(async move {
            while notify_rx.recv().await.is_some() {
                tokio::time::sleep(DEBOUNCE).await;
                while notify_rx.try_recv().is_ok() {}

                tracing::info!("Items file changed on disk");
                if async_tx.send(()).is_err() {
                    break;
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}
