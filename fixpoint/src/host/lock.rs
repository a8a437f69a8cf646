//! §6 "Single-instance lock" — a non-blocking, advisory lock a host uses to
//! keep a second instance of a long-running process from starting while
//! the first is still alive.
//!
//! Implemented as an exclusive-create marker file: `OpenOptions::create_new`
//! is atomic at the filesystem level, so two processes racing to acquire
//! the same path can never both succeed, with no platform-specific
//! `flock`/`LockFileEx` call to maintain. The handle removes its marker
//! file on drop, so a crashed holder doesn't wedge the lock past process
//! exit on most platforms (it can still be left behind after e.g. `SIGKILL`
//! on some filesystems — a host that needs stronger guarantees than a
//! plain marker file should layer OS-level advisory locking on top).

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A held single-instance lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    _file: File,
}

impl LockHandle {
    /// Release the lock immediately rather than waiting for drop.
    pub fn release(self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Attempt to acquire the single-instance lock at `path`. Returns `None` —
/// the "null handle" spec.md's §6 calls for — if another instance already
/// holds it. Never blocks.
pub fn acquire(path: impl AsRef<Path>) -> io::Result<Option<LockHandle>> {
    let path = path.as_ref().to_path_buf();
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => {
            tracing::trace!(path = %path.display(), "acquired single-instance lock");
            Ok(Some(LockHandle { path, _file: file }))
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::warn!(path = %path.display(), "single-instance lock already held");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
