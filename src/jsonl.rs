// JSONL snapshot I/O for the task file

use crate::models::TaskItem;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Read all task items from a JSONL file, preserving line order.
///
/// A missing file is an empty store (first run). Lines that fail to parse
/// are skipped with a warning; an unreadable file is an error for the
/// caller to surface.
pub fn read_items(path: &Path) -> io::Result<Vec<TaskItem>> {
    if !path.exists() {
        // File doesn't exist yet, return empty collection
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut items = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<TaskItem>(&line) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = items.len(), "Loaded tasks from JSONL");

    Ok(items)
}

/// Write the complete collection as a JSONL snapshot.
///
/// The snapshot is written to a temporary sibling file, flushed to disk,
/// then renamed over `path`. Either the new snapshot is fully durable or
/// the previous file is untouched.
pub fn write_items(path: &Path, items: &[TaskItem]) -> io::Result<()> {
    let tmp_path = path.with_extension("jsonl.tmp");

    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(&file);

    for item in items {
        let json = serde_json::to_string(item).map_err(io::Error::other)?;
        writeln!(writer, "{}", json)?;
    }

    writer.flush()?;
    drop(writer);
    file.sync_all()?; // Ensure data is flushed to disk before the rename

    fs::rename(&tmp_path, path)?;

    Ok(())
}
