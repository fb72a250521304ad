// History file persistence
//
// One entry per line. Multi-line queries keep their line breaks escaped so
// the file stays line-oriented.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
    max_entries: usize,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all stored entries; a missing file is an empty history
    pub fn load(&self) -> io::Result<Vec<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(decode)
            .collect())
    }

    /// Append `entries`, keeping only the most recent `max_entries`
    pub fn append(&self, entries: &[String]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut all = self.load()?;
        all.extend(entries.iter().cloned());
        if all.len() > self.max_entries {
            let excess = all.len() - self.max_entries;
            all.drain(..excess);
        }

        let mut contents = String::new();
        for entry in &all {
            contents.push_str(&encode(entry));
            contents.push('\n');
        }

        // Write then rename so an interrupted write never truncates history
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), stored = all.len(), "History file written");
        Ok(())
    }
}

fn encode(entry: &str) -> String {
    let mut out = String::with_capacity(entry.len());
    for c in entry.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn decode(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
