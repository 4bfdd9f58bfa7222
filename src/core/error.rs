use crate::daemon::PollerState;

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Failed to query items: {0:#}")]
    ItemSource(#[source] anyhow::Error),

    #[error("Poll interval must be greater than zero")]
    InvalidInterval,

    #[error("Poller cannot be initialized again (state: {state})")]
    AlreadyInitialized { state: PollerState },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_source_error_keeps_context() {
        let cause = anyhow::anyhow!("file missing").context("Failed to read items.json");
        let err = PollerError::ItemSource(cause);
        let message = err.to_string();
        assert!(message.contains("Failed to read items.json"));
        assert!(message.contains("file missing"));
    }

    #[test]
    fn test_already_initialized_names_state() {
        let err = PollerError::AlreadyInitialized {
            state: PollerState::Stopped,
        };
        assert!(err.to_string().contains("stopped"));
    }
}
