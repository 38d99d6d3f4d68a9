//! Bounded FIFO history store with dedup and file persistence (spec
//! §4.7).

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use nix::sys::stat::{umask, Mode};

use crate::error::{Error, Result};

/// Default history capacity (spec §3).
pub const DEFAULT_MAX_LEN: usize = 100;

pub struct History {
    entries: VecDeque<String>,
    max_len: usize,
}

impl History {
    pub fn new(max_len: usize) -> Self {
        History {
            entries: VecDeque::new(),
            max_len,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.entries.get(i).map(String::as_str)
    }

    /// Append `line`, deduping against the current tail and evicting the
    /// oldest entry on overflow (spec invariants 4, 6).
    ///
    /// Returns `false` if `max_len == 0` or the line equals the current
    /// newest entry (a no-op, not an error).
    pub fn add(&mut self, line: impl Into<String>) -> bool {
        if self.max_len == 0 {
            return false;
        }
        let line = line.into();
        if self.entries.back().is_some_and(|last| *last == line) {
            return false;
        }
        if self.entries.len() >= self.max_len {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
        true
    }

    /// Resize the capacity. If shrinking below the current length, the
    /// oldest entries are dropped so only the latest `n` survive.
    pub fn set_max_len(&mut self, n: usize) -> Result<()> {
        if n < 1 {
            return Err(Error::InvalidArgument("history max_len must be >= 1"));
        }
        while self.entries.len() > n {
            self.entries.pop_front();
        }
        self.max_len = n;
        Ok(())
    }

    /// Save one entry per line, creating the file mode 0o600 regardless
    /// of the caller's umask (spec §4.7/§6, boundary scenario 7).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let prev_umask = umask(Mode::from_bits_truncate(0o077));
        let result = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path);
        umask(prev_umask);

        let mut file = result.map_err(Error::HistoryIo)?;
        for entry in &self.entries {
            writeln!(file, "{entry}").map_err(Error::HistoryIo)?;
        }
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(Error::HistoryIo)?;
        Ok(())
    }

    /// Load entries from `path`, stripping trailing `\r`/`\n` and
    /// re-adding each line through [`History::add`] so dedup and
    /// max-len still apply. A missing file is a no-op failure: state is
    /// left unmodified.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = fs::File::open(path).map_err(Error::HistoryIo)?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line.map_err(Error::HistoryIo)?;
            let trimmed = line.trim_end_matches(['\r', '\n']);
            self.add(trimmed.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_immediate_repeat() {
        let mut h = History::new(10);
        assert!(h.add("one"));
        assert!(!h.add("one"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn evicts_oldest_on_overflow() {
        let mut h = History::new(2);
        h.add("a");
        h.add("b");
        h.add("c");
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), Some("b"));
        assert_eq!(h.get(1), Some("c"));
    }

    #[test]
    fn zero_max_len_rejects_add() {
        let mut h = History::new(0);
        assert!(!h.add("x"));
    }

    #[test]
    fn set_max_len_rejects_zero() {
        let mut h = History::new(5);
        assert!(h.set_max_len(0).is_err());
    }

    #[test]
    fn set_max_len_trims_oldest() {
        let mut h = History::new(5);
        for s in ["a", "b", "c", "d"] {
            h.add(s);
        }
        h.set_max_len(2).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0), Some("c"));
        assert_eq!(h.get(1), Some("d"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut h = History::new(10);
        for s in ["one", "two", "three"] {
            h.add(s);
        }
        h.save(&path).unwrap();

        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);

        let mut loaded = History::new(10);
        loaded.load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get(0), Some("one"));
        assert_eq!(loaded.get(2), Some("three"));
    }

    #[test]
    fn load_missing_file_leaves_state_untouched() {
        let mut h = History::new(10);
        h.add("kept");
        assert!(h.load("/nonexistent/path/to/history").is_err());
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(0), Some("kept"));
    }
}
