use crate::core::models::{Item, StatusCounts};
use crate::core::settings::Settings;
use crate::sources::{FileItemSource, ItemSource};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct StatusOutput {
    items_path: PathBuf,
    #[serde(flatten)]
    counts: StatusCounts,
    active: usize,
    total: usize,
    would_arm: bool,
    interval_ms: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    checked_at: DateTime<Utc>,
}

pub fn run(settings: &Settings, items_path: PathBuf, json: bool) -> Result<()> {
    let source = FileItemSource::new(items_path);
    let items = source.snapshot()?;
    let output = build_output(&source, &items, settings.poller.interval_ms);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_output(&output);
    }

    Ok(())
}

fn build_output(
    source: &FileItemSource,
    items: &[Item],
    interval_ms: u64,
) -> StatusOutput {
    let counts = StatusCounts::tally(items);

    StatusOutput {
        items_path: source.path().to_path_buf(),
        counts,
        active: counts.active(),
        total: counts.total(),
        would_arm: counts.active() > 0,
        interval_ms,
        checked_at: Utc::now(),
    }
}

fn print_text_output(output: &StatusOutput) {
    println!("{}", output.items_path.display());
    println!("  {:<11} {:>5}", "Pending:", output.counts.pending);
    println!("  {:<11} {:>5}", "Processing:", output.counts.processing);
    println!("  {:<11} {:>5}", "Terminal:", output.counts.terminal);

    if output.would_arm {
        println!(
            "Polling every {} while {} request(s) are active",
            format_interval(output.interval_ms),
            output.active
        );
    } else {
        println!("No active requests, poller would not arm");
    }
}

fn format_interval(interval_ms: u64) -> String {
    if interval_ms % 1000 == 0 {
        format!("{}s", interval_ms / 1000)
    } else {
        format!("{}ms", interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Status;

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(10_000), "10s");
        assert_eq!(format_interval(2_500), "2500ms");
    }

    #[test]
    fn test_build_output() {
        let source = FileItemSource::new("/tmp/items.json");
        let items = vec![
            Item::new("1", Status::Pending),
            Item::new("2", Status::Terminal),
        ];

        let output = build_output(&source, &items, 10_000);
        assert!(output.would_arm);
        assert_eq!(output.active, 1);
        assert_eq!(output.total, 2);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["pending"], 1);
        assert_eq!(json["terminal"], 1);
        assert_eq!(json["would_arm"], true);
        assert!(json["checked_at"].is_i64());
    }

    #[test]
    fn test_run_reads_items_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"id": 4, "status": "failed"}]"#).unwrap();

        assert!(run(&Settings::default(), path, true).is_ok());
        assert!(run(&Settings::default(), dir.path().join("missing.json"), false).is_err());
    }
}
