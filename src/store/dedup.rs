use crate::models::Fingerprint;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Fingerprints already notified, mirrored by an append-only log file.
///
/// The set only grows. Every `mark_seen` appends one line; the file is never
/// rewritten or compacted.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    seen: HashSet<Fingerprint>,
}

impl DedupStore {
    /// Read the whole log into memory.
    ///
    /// A missing file is an empty store. Blank and non-UTF-8 lines are
    /// skipped. An unreadable file is logged and treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seen = match std::fs::read(&path) {
            Ok(bytes) => parse_log(&bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(err) => {
                warn!("Could not read {}: {}", path.display(), err);
                HashSet::new()
            }
        };
        info!("Loaded {} seen fingerprints from {}", seen.len(), path.display());
        Self { path, seen }
    }

    pub fn has(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// Persist then remember a fingerprint.
    ///
    /// The in-memory insert happens even if the append fails; the error is
    /// returned so the caller can log it.
    pub fn mark_seen(&mut self, fingerprint: &Fingerprint) -> Result<()> {
        let appended = self.append(fingerprint);
        self.seen.insert(fingerprint.clone());
        appended
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn append(&self, fingerprint: &Fingerprint) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{}", fingerprint)
            .with_context(|| format!("Failed to append to {}", self.path.display()))
    }
}

fn parse_log(bytes: &[u8]) -> HashSet<Fingerprint> {
    bytes
        .split(|b| *b == b'\n')
        .filter_map(|line| std::str::from_utf8(line).ok())
        .filter_map(Fingerprint::from_stored)
        .collect()
}
