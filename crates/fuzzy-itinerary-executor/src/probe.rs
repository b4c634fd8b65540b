//! Memory probe implementations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::traits::MemoryProbe;

const PROC_MEMINFO: &str = "/proc/meminfo";

/// Reads `MemAvailable` from a Linux `/proc/meminfo`-style file.
///
/// A failed read logs a warning and reports the last good reading.
#[derive(Debug)]
pub struct SystemMemoryProbe {
    path: PathBuf,
    last_known: AtomicU64,
}

impl SystemMemoryProbe {
    /// Probes `/proc/meminfo`. Fails if it cannot be read right now.
    pub fn new() -> io::Result<Self> {
        Self::with_path(PROC_MEMINFO)
    }

    /// Probes a meminfo-formatted file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let bytes = read_available(&path)?;
        Ok(Self {
            path,
            last_known: AtomicU64::new(bytes),
        })
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn available_bytes(&self) -> u64 {
        match read_available(&self.path) {
            Ok(bytes) => {
                self.last_known.store(bytes, Ordering::Relaxed);
                bytes
            }
            Err(e) => {
                let bytes = self.last_known.load(Ordering::Relaxed);
                warn!(path = %self.path.display(), error = %e, bytes, "memory probe failed, reusing last reading");
                bytes
            }
        }
    }
}

fn read_available(path: &Path) -> io::Result<u64> {
    let text = fs::read_to_string(path)?;
    parse_mem_available(&text).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no MemAvailable entry in {}", path.display()),
        )
    })
}

fn parse_mem_available(text: &str) -> Option<u64> {
    let line = text
        .lines()
        .find_map(|line| line.strip_prefix("MemAvailable:"))?;
    let mut fields = line.split_whitespace();
    let value: u64 = fields.next()?.parse().ok()?;
    let scale = match fields.next() {
        None => 1,
        Some(unit) if unit.eq_ignore_ascii_case("kB") => 1024,
        Some(unit) if unit.eq_ignore_ascii_case("mB") => 1024 * 1024,
        Some(_) => return None,
    };
    value.checked_mul(scale)
}

/// A probe reporting a value set by the caller.
///
/// Useful when the caller does its own accounting, and in tests.
#[derive(Debug, Default)]
pub struct FixedMemoryProbe {
    bytes: AtomicU64,
}

impl FixedMemoryProbe {
    /// Creates a probe reporting `bytes`.
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes: AtomicU64::new(bytes),
        }
    }

    /// Changes the reported value.
    pub fn set(&self, bytes: u64) {
        self.bytes.store(bytes, Ordering::SeqCst);
    }
}

impl MemoryProbe for FixedMemoryProbe {
    fn available_bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }
}
