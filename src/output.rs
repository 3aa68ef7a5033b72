//! Rendering of published snapshots for the command line.

use crate::domain::{ResultSnapshot, StoreItem};
use clap::ValueEnum;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    #[value(name = "jsonl")]
    JsonL,
}

pub fn format_item(item: &StoreItem, use_color: bool) -> String {
    use colored::Colorize;

    let artist = item.artist.as_deref().unwrap_or("-");
    if use_color {
        format!(
            "{} {} [{}] {}",
            item.name.bright_green(),
            artist.bright_yellow(),
            item.kind.bright_blue(),
            item.id.to_string().dimmed()
        )
    } else {
        format!("{} {} [{}] {}", item.name, artist, item.kind, item.id)
    }
}

/// Write one snapshot in the requested format. `elapsed` is reported alongside
/// the results when known.
pub fn write_snapshot<W: Write>(
    out: &mut W,
    snapshot: &ResultSnapshot,
    format: OutputFormat,
    use_color: bool,
    elapsed: Option<Duration>,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            if snapshot.is_empty() {
                writeln!(out, "No results found.")?;
            } else {
                writeln!(out, "Found {} results ({}):\n", snapshot.len(), snapshot.generation)?;
                for section in &snapshot.sections {
                    writeln!(out, "{}", section.name)?;
                    for item in &section.items {
                        writeln!(out, "  {}", format_item(item, use_color))?;
                    }
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "generation": snapshot.generation,
                "sections": snapshot.sections,
                "returned_count": snapshot.len(),
                "duration_ms": elapsed.map(|d| d.as_millis() as u64),
            });
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        }
        OutputFormat::JsonL => {
            for item in snapshot.items() {
                serde_json::to_writer(&mut *out, item)?;
                writeln!(out)?;
            }
            // Metadata goes last
            let metadata = serde_json::json!({
                "_metadata": {
                    "generation": snapshot.generation,
                    "returned_count": snapshot.len(),
                    "duration_ms": elapsed.map(|d| d.as_millis() as u64),
                }
            });
            serde_json::to_writer(&mut *out, &metadata)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Generation;

    fn snapshot() -> ResultSnapshot {
        ResultSnapshot::from_items(
            Generation::INITIAL.next(),
            vec![
                StoreItem::new(1, "Blue Train", "song").with_artist("John Coltrane"),
                StoreItem::new(2, "Dune", "ebook"),
            ],
        )
    }

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_snapshot(&mut out, &snapshot(), format, false, Some(Duration::from_millis(12))).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_item_without_color() {
        let item = StoreItem::new(7, "So What", "song").with_artist("Miles Davis");
        assert_eq!(format_item(&item, false), "So What Miles Davis [song] 7");

        let bare = StoreItem::new(8, "Dune", "ebook");
        assert_eq!(format_item(&bare, false), "Dune - [ebook] 8");
    }

    #[test]
    fn test_text_lists_every_item() {
        let text = render(OutputFormat::Text);
        assert!(text.starts_with("Found 2 results"));
        assert!(text.contains("Blue Train John Coltrane [song] 1"));
        assert!(text.contains("Dune - [ebook] 2"));
    }

    #[test]
    fn test_empty_snapshot_text() {
        let mut out = Vec::new();
        write_snapshot(&mut out, &ResultSnapshot::default(), OutputFormat::Text, false, None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No results found.\n");
    }

    #[test]
    fn test_json_carries_counts() {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(value["returned_count"], 2);
        assert_eq!(value["generation"], 1);
        assert_eq!(value["duration_ms"], 12);
        assert_eq!(value["sections"][0]["items"][1]["name"], "Dune");
    }

    #[test]
    fn test_jsonl_ends_with_metadata() {
        let text = render(OutputFormat::JsonL);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: StoreItem = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.name, "Blue Train");
        let metadata: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(metadata["_metadata"]["returned_count"], 2);
    }
}
