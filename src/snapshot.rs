//! Durable snapshot persistence.
//!
//! Two output files feed the out-of-band consumer process:
//! - the latest snapshot, overwritten wholesale every frame
//! - an append-only JSON Lines history, one record per frame
//!
//! The latest snapshot must never be observable half-written by a
//! concurrent reader. The primary strategy writes a temporary sibling and
//! atomically renames it over the destination. Platforms where the
//! destination may be held open by a reader (windows file sharing) break
//! rename-over-open-file, so a direct-overwrite fallback exists with a
//! documented narrow race; consumers already treat a parse failure as
//! "try again next poll".

use anyhow::{anyhow, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::record::{LogRecord, SnapshotPayload};

/// How `write_latest` replaces the destination file.
///
/// Selected once at startup, not branched per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Temp sibling + atomic rename. Readers see fully-old or fully-new.
    AtomicRename,
    /// In-place overwrite. A reader can observe a partially written file
    /// during the write window; used where rename over an open file fails.
    DirectOverwrite,
}

impl WriteStrategy {
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            WriteStrategy::DirectOverwrite
        } else {
            WriteStrategy::AtomicRename
        }
    }
}

impl FromStr for WriteStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "atomic" => Ok(WriteStrategy::AtomicRename),
            "direct" => Ok(WriteStrategy::DirectOverwrite),
            "platform" => Ok(WriteStrategy::platform_default()),
            other => Err(anyhow!(
                "unknown write strategy: {} (expected atomic|direct|platform)",
                other
            )),
        }
    }
}

/// Writer for the latest-snapshot file and the append-only log.
pub struct SnapshotWriter {
    latest_path: PathBuf,
    log_path: PathBuf,
    strategy: WriteStrategy,
}

impl SnapshotWriter {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        latest_path: P,
        log_path: Q,
        strategy: WriteStrategy,
    ) -> Self {
        Self {
            latest_path: latest_path.into(),
            log_path: log_path.into(),
            strategy,
        }
    }

    pub fn latest_path(&self) -> &Path {
        &self.latest_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Persist `payload` as the canonical current state, replacing any
    /// previous content wholesale.
    pub fn write_latest(&self, payload: &SnapshotPayload) -> Result<()> {
        ensure_parent_dir(&self.latest_path)?;
        let json = serde_json::to_vec_pretty(payload)?;
        match self.strategy {
            WriteStrategy::AtomicRename => {
                let tmp = sibling_tmp_path(&self.latest_path);
                fs::write(&tmp, &json)
                    .with_context(|| format!("failed to write {}", tmp.display()))?;
                fs::rename(&tmp, &self.latest_path).with_context(|| {
                    format!(
                        "failed to rename {} over {}",
                        tmp.display(),
                        self.latest_path.display()
                    )
                })?;
            }
            WriteStrategy::DirectOverwrite => {
                fs::write(&self.latest_path, &json)
                    .with_context(|| format!("failed to write {}", self.latest_path.display()))?;
            }
        }
        Ok(())
    }

    /// Append one self-contained record plus newline to the log file.
    ///
    /// The file is opened, written, and closed per call, so a partial write
    /// can only ever damage the single most recent record.
    pub fn append_log(&self, record: &LogRecord) -> Result<()> {
        ensure_parent_dir(&self.log_path)?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("failed to open {}", self.log_path.display()))?;
        file.write_all(&line)
            .with_context(|| format!("failed to append to {}", self.log_path.display()))?;
        Ok(())
    }
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ImageSize;
    use tempfile::tempdir;

    fn payload(n: u64) -> SnapshotPayload {
        SnapshotPayload {
            timestamp: n as f64,
            exercise: "hand".to_string(),
            side: "right".to_string(),
            image_size: ImageSize { w: 640, h: 480 },
            subjects: Vec::new(),
        }
    }

    fn writer_in(dir: &Path, strategy: WriteStrategy) -> SnapshotWriter {
        SnapshotWriter::new(
            dir.join("outputs").join("latest.json"),
            dir.join("outputs").join("log.jsonl"),
            strategy,
        )
    }

    #[test]
    fn write_latest_creates_directories_lazily() -> Result<()> {
        let dir = tempdir()?;
        let writer = writer_in(dir.path(), WriteStrategy::AtomicRename);
        writer.write_latest(&payload(1))?;
        let back: SnapshotPayload =
            serde_json::from_str(&fs::read_to_string(writer.latest_path())?)?;
        assert_eq!(back, payload(1));
        Ok(())
    }

    #[test]
    fn write_latest_replaces_previous_content_wholesale() -> Result<()> {
        let dir = tempdir()?;
        for strategy in [WriteStrategy::AtomicRename, WriteStrategy::DirectOverwrite] {
            let writer = writer_in(dir.path(), strategy);
            writer.write_latest(&payload(1))?;
            writer.write_latest(&payload(2))?;
            let back: SnapshotPayload =
                serde_json::from_str(&fs::read_to_string(writer.latest_path())?)?;
            assert_eq!(back, payload(2));
        }
        Ok(())
    }

    #[test]
    fn atomic_strategy_leaves_no_tmp_file_behind() -> Result<()> {
        let dir = tempdir()?;
        let writer = writer_in(dir.path(), WriteStrategy::AtomicRename);
        writer.write_latest(&payload(7))?;
        assert!(!sibling_tmp_path(writer.latest_path()).exists());
        Ok(())
    }

    #[test]
    fn append_log_produces_one_parseable_line_per_call() -> Result<()> {
        let dir = tempdir()?;
        let writer = writer_in(dir.path(), WriteStrategy::AtomicRename);
        for n in 0..5 {
            writer.append_log(&LogRecord::new(payload(n)))?;
        }
        let content = fs::read_to_string(writer.log_path())?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        for (n, line) in lines.iter().enumerate() {
            let record: LogRecord = serde_json::from_str(line)?;
            assert_eq!(record.payload.timestamp, n as f64);
        }
        Ok(())
    }

    #[test]
    fn strategy_parses_from_config_values() {
        assert_eq!(
            "atomic".parse::<WriteStrategy>().unwrap(),
            WriteStrategy::AtomicRename
        );
        assert_eq!(
            "direct".parse::<WriteStrategy>().unwrap(),
            WriteStrategy::DirectOverwrite
        );
        assert!("fsync".parse::<WriteStrategy>().is_err());
    }
}
