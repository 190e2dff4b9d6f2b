//! Remembered window positions keyed by title.
//!
//! The on-disk format is a small TOML document:
//!
//! ```toml
//! [positions]
//! "Buddy List" = "10;4"
//! ```
//!
//! Writes are debounced: every remembered move pushes the deadline out by
//! the configured delay and the store is flushed once it passes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::constants::POSITION_WRITE_DELAY;
use crate::error::WmResult;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PositionsFile {
    #[serde(default)]
    positions: BTreeMap<String, String>,
}

fn parse_entry(value: &str) -> Option<(u16, u16)> {
    let parts: Vec<&str> = value.split(';').map(str::trim).collect();
    let [x, y] = parts.as_slice() else {
        return None;
    };
    Some((x.parse().ok()?, y.parse().ok()?))
}

/// Parse a positions document. Malformed entries are skipped with a
/// warning rather than failing the whole file.
pub fn parse_positions(text: &str) -> Result<BTreeMap<String, (u16, u16)>, toml::de::Error> {
    let file: PositionsFile = toml::from_str(text)?;
    let mut positions = BTreeMap::new();
    for (title, value) in file.positions {
        match parse_entry(&value) {
            Some(pos) => {
                positions.insert(title, pos);
            }
            None => {
                tracing::warn!(%title, %value, "invalid window position, expected `x;y`");
            }
        }
    }
    Ok(positions)
}

pub fn render_positions(positions: &BTreeMap<String, (u16, u16)>) -> WmResult<String> {
    let file = PositionsFile {
        positions: positions
            .iter()
            .map(|(title, (x, y))| (title.clone(), format!("{x};{y}")))
            .collect(),
    };
    Ok(toml::to_string(&file)?)
}

#[derive(Debug)]
pub struct PositionStore {
    path: Option<PathBuf>,
    positions: BTreeMap<String, (u16, u16)>,
    write_delay: Duration,
    write_deadline: Option<Instant>,
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl PositionStore {
    /// A store that remembers positions for this session only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            positions: BTreeMap::new(),
            write_delay: POSITION_WRITE_DELAY,
            write_deadline: None,
        }
    }

    /// Load from `path`. A missing file starts empty; an unreadable or
    /// unparsable one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let positions = match fs::read_to_string(&path) {
            Ok(text) => match parse_positions(&text) {
                Ok(positions) => {
                    tracing::debug!(path = ?path, count = positions.len(), "loaded window positions");
                    positions
                }
                Err(err) => {
                    tracing::warn!(path = ?path, error = %err, "failed to parse window positions");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = ?path, error = %err, "failed to read window positions");
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            positions,
            write_delay: POSITION_WRITE_DELAY,
            write_deadline: None,
        }
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, title: &str) -> Option<(u16, u16)> {
        self.positions.get(title).copied()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.positions.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Record a position and (re)arm the debounced write.
    pub fn remember(&mut self, title: &str, pos: (u16, u16), now: Instant) {
        self.positions.insert(title.to_string(), pos);
        if self.path.is_some() {
            self.write_deadline = Some(now + self.write_delay);
        }
    }

    pub fn write_pending(&self) -> bool {
        self.write_deadline.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.write_deadline
    }

    /// Write if the debounce deadline has passed. Returns whether a write
    /// happened.
    pub fn flush_due(&mut self, now: Instant) -> WmResult<bool> {
        match self.write_deadline {
            Some(deadline) if now >= deadline => {
                self.flush()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Write immediately if anything is pending.
    pub fn flush(&mut self) -> WmResult<()> {
        let Some(path) = self.path.as_deref() else {
            self.write_deadline = None;
            return Ok(());
        };
        if self.write_deadline.is_none() {
            return Ok(());
        }
        // Clear first so a failing disk does not retry on every tick; the
        // next move re-arms the write.
        self.write_deadline = None;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, render_positions(&self.positions)?)?;
        tracing::debug!(path = ?path, count = self.positions.len(), "wrote window positions");
        Ok(())
    }
}
