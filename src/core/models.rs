use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawItemId", into = "String")]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Request ids arrive as database integers or as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawItemId {
    Number(u64),
    Text(String),
}

impl From<RawItemId> for ItemId {
    fn from(raw: RawItemId) -> Self {
        match raw {
            RawItemId::Number(n) => ItemId::from(n),
            RawItemId::Text(s) => ItemId(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Pending,
    Processing,
    /// Completed, failed, or any state the poller does not track.
    Terminal,
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Status::Pending,
            "processing" => Status::Processing,
            _ => Status::Terminal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Processing => "processing",
            Status::Terminal => "terminal",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Status::Pending | Status::Processing)
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        Status::parse(&raw)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub status: Status,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, status: Status) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

pub fn active_count(items: &[Item]) -> usize {
    items.iter().filter(|item| item.is_active()).count()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub terminal: usize,
}

impl StatusCounts {
    pub fn tally(items: &[Item]) -> Self {
        items.iter().fold(Self::default(), |mut counts, item| {
            match item.status {
                Status::Pending => counts.pending += 1,
                Status::Processing => counts.processing += 1,
                Status::Terminal => counts.terminal += 1,
            }
            counts
        })
    }

    pub fn active(&self) -> usize {
        self.pending + self.processing
    }

    pub fn total(&self) -> usize {
        self.active() + self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("pending"), Status::Pending);
        assert_eq!(Status::parse(" Processing "), Status::Processing);
        assert_eq!(Status::parse("completed"), Status::Terminal);
        assert_eq!(Status::parse("failed"), Status::Terminal);
        assert_eq!(Status::parse(""), Status::Terminal);
    }

    #[test]
    fn test_only_pending_and_processing_are_active() {
        assert!(Status::Pending.is_active());
        assert!(Status::Processing.is_active());
        assert!(!Status::Terminal.is_active());
    }

    #[test]
    fn test_parse_item_list() {
        let json = r#"[
            {"id": 1, "status": "pending"},
            {"id": "req-2", "status": "completed", "video_url": "https://example.com/v.mp4"},
            {"id": 3, "status": "PROCESSING"}
        ]"#;

        let items: Vec<Item> = serde_json::from_str(json).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id.as_str(), "1");
        assert_eq!(items[0].status, Status::Pending);
        assert_eq!(items[1].id.as_str(), "req-2");
        assert_eq!(items[1].status, Status::Terminal);
        assert_eq!(items[2].status, Status::Processing);
    }

    #[test]
    fn test_item_serializes_canonical_status() {
        let item = Item::new("7", Status::Terminal);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":"7","status":"terminal"}"#);
    }

    #[test]
    fn test_active_count() {
        let items = vec![
            Item::new("1", Status::Pending),
            Item::new("2", Status::Terminal),
            Item::new("3", Status::Processing),
        ];
        assert_eq!(active_count(&items), 2);
        assert_eq!(active_count(&[]), 0);
    }

    #[test]
    fn test_status_counts() {
        let items = vec![
            Item::new("1", Status::Pending),
            Item::new("2", Status::Pending),
            Item::new("3", Status::Processing),
            Item::new("4", Status::Terminal),
        ];

        let counts = StatusCounts::tally(&items);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.processing, 1);
        assert_eq!(counts.terminal, 1);
        assert_eq!(counts.active(), 3);
        assert_eq!(counts.total(), 4);
    }
}
