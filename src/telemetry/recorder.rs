//! # Telemetry Recorder
//!
//! Writes [`SensorSample`]s to rotating JSONL files.
//!
//! Files are named `samples_YYYYMMDD_HHMMSS_NNNN.jsonl` so that a plain
//! lexicographic sort is chronological. Retention applies across sessions:
//! files left in `log_dir` by earlier runs count towards `max_files_to_keep`.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::types::SensorSample;
use crate::config::TelemetryConfig;
use crate::error::Result;

const FILE_PREFIX: &str = "samples_";
const FILE_EXTENSION: &str = "jsonl";

/// Rotating JSONL sample writer.
#[derive(Debug)]
pub struct TelemetryRecorder {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    interval: Duration,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files: VecDeque<PathBuf>,
    sequence: u32,
    last_write: Option<Instant>,
    total_records: u64,
}

impl TelemetryRecorder {
    /// Creates a recorder from the `[telemetry]` configuration section.
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        Self::new(
            &config.log_dir,
            config.max_records_per_file,
            config.max_files_to_keep,
            Duration::from_millis(config.log_interval_ms),
        )
    }

    /// Creates a recorder writing into `dir`, creating it if needed.
    ///
    /// # Arguments
    ///
    /// * `max_records_per_file` - Records before rotating (minimum 1)
    /// * `max_files_to_keep` - Files retained in `dir` (minimum 1)
    /// * `interval` - Minimum time between recorded samples
    pub fn new<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
        interval: Duration,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let files = existing_sample_files(&dir)?;
        info!(
            "Telemetry recording to {} ({} existing files)",
            dir.display(),
            files.len()
        );

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            interval,
            writer: None,
            records_in_file: 0,
            files,
            sequence: 0,
            last_write: None,
            total_records: 0,
        })
    }

    /// Records a sample unless one was written less than `interval` ago.
    ///
    /// Returns whether the sample was written.
    pub fn record(&mut self, sample: &SensorSample) -> Result<bool> {
        let now = Instant::now();
        if let Some(last) = self.last_write {
            if now.duration_since(last) < self.interval {
                return Ok(false);
            }
        }

        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = sample.to_json_line()?;
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
        }

        self.records_in_file += 1;
        self.total_records += 1;
        self.last_write = Some(now);
        Ok(true)
    }

    /// Flushes buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Records written since creation.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// Sample files currently retained, oldest first.
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        self.files.iter().cloned().collect()
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            Utc::now().format("%Y%m%d_%H%M%S"),
            self.sequence,
            FILE_EXTENSION
        );
        self.sequence = self.sequence.wrapping_add(1);

        let path = self.dir.join(name);
        let file = File::create(&path)?;
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files.push_back(path);
        self.prune();
        Ok(())
    }

    fn prune(&mut self) {
        while self.files.len() > self.max_files_to_keep {
            if let Some(oldest) = self.files.pop_front() {
                match fs::remove_file(&oldest) {
                    Ok(()) => debug!("Removed old telemetry file {}", oldest.display()),
                    Err(e) => warn!("Failed to remove {}: {}", oldest.display(), e),
                }
            }
        }
    }
}

/// Sample files already present in `dir`, oldest first.
fn existing_sample_files(dir: &Path) -> Result<VecDeque<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_sample_file(path))
        .collect();
    files.sort();
    Ok(files.into())
}

fn is_sample_file(path: &Path) -> bool {
    let named = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with(FILE_PREFIX))
        .unwrap_or(false);
    named && path.extension().map(|e| e == FILE_EXTENSION).unwrap_or(false)
}
