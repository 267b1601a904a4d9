//! Out-of-band payload files addressed by correlation id.
//!
//! The notification channel carries a single machine word, so the URI text
//! travels through `<staging-dir>/<id>` instead. Sender writes, receiver
//! reads and deletes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::correlation::CorrelationId;
use crate::uri::Uri;

const TERMINATOR: &str = "\r\n";

#[derive(Debug, Clone)]
pub struct PayloadStaging {
    dir: PathBuf,
}

impl PayloadStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: CorrelationId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Write `uri` + CRLF to the id's file.
    ///
    /// The content is written to a temporary sibling, synced, then moved into
    /// place without replacing an existing file, so a receiver never sees a
    /// partial payload and an id is never staged twice.
    pub fn stage(&self, id: CorrelationId, uri: &Uri) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(id);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(uri.as_str().as_bytes())?;
        tmp.write_all(TERMINATOR.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(&target).map_err(|err| err.error)?;

        debug!(id = %id, path = %target.display(), "payload staged");
        Ok(target)
    }

    /// Read the payload for `id` and remove the file.
    pub fn take(&self, id: CorrelationId) -> io::Result<String> {
        let path = self.path_for(id);
        let mut content = fs::read_to_string(&path)?;
        fs::remove_file(&path)?;

        if content.ends_with(TERMINATOR) {
            content.truncate(content.len() - TERMINATOR.len());
        } else if content.ends_with('\n') {
            content.pop();
        }
        trace!(id = %id, "payload taken");
        Ok(content)
    }

    /// Delete payloads nobody consumed within `max_age`.
    ///
    /// Only files whose name is a correlation id are considered; entries that
    /// can't be inspected are skipped. Returns the number of files removed.
    pub fn sweep(&self, max_age: Duration) -> io::Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        let now = SystemTime::now();
        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_payload_name(name) {
                continue;
            }

            let age = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok());
            match age {
                Some(age) if age > max_age => match fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(err) => debug!(file = name, error = %err, "orphan removal skipped"),
                },
                _ => {}
            }
        }

        if removed > 0 {
            debug!(removed, dir = %self.dir.display(), "orphaned payloads swept");
        }
        Ok(removed)
    }
}

fn is_payload_name(name: &str) -> bool {
    name.len() == 16 && name.bytes().all(|b| b.is_ascii_hexdigit())
}
