use crate::model::{NormalizedListing, StorageError};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSON lines file, one listing per line.
pub struct JsonSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonSink {
    /// Output file for one crawl run:
    /// `{output_dir}/spareroom/{date}/{location}_{time}.jsonl`.
    pub fn run_path(output_dir: &str, location: &str, started_at: DateTime<Local>) -> PathBuf {
        Path::new(output_dir)
            .join("spareroom")
            .join(started_at.format("%Y-%m-%d").to_string())
            .join(format!("{}_{}.jsonl", location, started_at.format("%H-%M-%S")))
    }

    /// Opens (or creates) the file for appending, creating parent folders.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, listing: &NormalizedListing) -> Result<(), StorageError> {
        let line = serde_json::to_string(listing)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
