use std::{
    collections::BTreeSet,
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use miette::{Context, IntoDiagnostic};
use tracing::debug;

use crate::{
    result::{bail, Error, Result},
    site::ARCHIVE_TAG,
};

/// Append-only record of the videos already downloaded for one performer.
///
/// Each line of the backing file is `<tag> <video_id>`.
/// IDs are only ever added, never removed.
#[derive(Debug)]
pub struct Ledger {
    ids: BTreeSet<u64>,
    file: File,
    path: PathBuf,
}

impl Ledger {
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .wrap_err("Could not create the archive folder")?;
        }

        // Open or create the file, every write goes to its end
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not open archive {}", path.display()))?;

        let reader = BufReader::new(&file);
        let mut ids = BTreeSet::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line
                .into_diagnostic()
                .wrap_err("Could not read archive line")?;

            if line.trim().is_empty() {
                continue;
            }

            let id = parse_line(&line).ok_or_else(|| Error::LedgerCorrupt {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.clone(),
            })?;
            ids.insert(id);
        }

        debug!("Loaded {} archived IDs from {}", ids.len(), path.display());

        Ok(Self {
            ids,
            file,
            path: path.to_path_buf(),
        })
    }

    /// Persist a downloaded video ID.
    ///
    /// Recording an ID twice is an error: callers must gate it with [`Ledger::contains`].
    pub fn record(&mut self, id: u64) -> Result<()> {
        if self.ids.contains(&id) {
            return bail(format!("ID {id} already exists in the archive"));
        }

        writeln!(self.file, "{ARCHIVE_TAG} {id}")
            .and_then(|_| self.file.flush())
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not append to archive {}", self.path.display()))?;

        self.ids.insert(id);
        Ok(())
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Parse a `<tag> <integer>` line, the tag itself is not checked
fn parse_line(line: &str) -> Option<u64> {
    let mut parts = line.split_whitespace();
    let (_tag, id) = (parts.next()?, parts.next()?);

    if parts.next().is_some() {
        return None;
    }

    id.parse().ok()
}
