//! File persistence shared by the profile, the logs and the achievements.
//!
//! JSONL logs are appended under an exclusive lock and read under a shared
//! lock, skipping lines that fail to parse. JSON documents are replaced
//! atomically: written to a temp file in the same directory, synced, then
//! renamed over the original.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

fn parent_dir(path: &Path) -> Result<&Path> {
    path.parent()
        .ok_or_else(|| Error::Other(format!("path {:?} has no parent", path)))
}

/// Append one JSON line with exclusive locking
pub(crate) fn append_jsonl<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::create_dir_all(parent_dir(path)?)?;

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.lock_exclusive()?;

    let mut writer = BufWriter::new(&file);
    let line = serde_json::to_string(value)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    file.unlock()?;
    Ok(())
}

/// Parse every line of an already locked JSONL file
pub(crate) fn parse_jsonl<T: DeserializeOwned>(file: &File, kind: &str) -> Result<Vec<T>> {
    let reader = BufReader::new(file);
    let mut items = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!("Skipping malformed {} line {}: {}", kind, line_num + 1, e);
            }
        }
    }

    Ok(items)
}

/// Read a JSONL file with shared locking; a missing file is empty
pub(crate) fn read_jsonl<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;
    let items = parse_jsonl(&file, kind);
    file.unlock()?;

    let items = items?;
    tracing::debug!("Read {} {} lines from {:?}", items.len(), kind, path);
    Ok(items)
}

/// Replace a JSONL file with `items`
///
/// The caller holds the lock on the original file.
pub(crate) fn replace_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let temp = NamedTempFile::new_in(parent_dir(path)?)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        for item in items {
            writer.write_all(serde_json::to_string(item)?.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Load a JSON document with shared locking
///
/// Returns `None` if the file doesn't exist. An unreadable or corrupted file
/// logs a warning and also returns `None`.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Option<T>> {
    if !path.exists() {
        tracing::info!("No {} found at {:?}", kind, path);
        return Ok(None);
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {} {:?}: {}", kind, path, e);
            return Ok(None);
        }
    };

    file.lock_shared()?;

    let mut contents = String::new();
    let read = BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;

    if let Err(e) = read {
        tracing::warn!("Failed to read {} {:?}: {}", kind, path, e);
        return Ok(None);
    }

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => {
            tracing::debug!("Loaded {} from {:?}", kind, path);
            Ok(Some(value))
        }
        Err(e) => {
            tracing::warn!("Failed to parse {} {:?}: {}", kind, path, e);
            Ok(None)
        }
    }
}

/// Save a JSON document atomically with exclusive locking
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = parent_dir(path)?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
