//! Atomic persistence of downloaded artifacts.
//!
//! Bytes are streamed into `<destination>.tmp` next to the destination and
//! only renamed into place once every byte has been written and flushed.
//! An observer of the destination path therefore sees either no file or a
//! complete one.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::PersistError;

/// Suffix appended to the destination path for in-progress writes.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Hook invoked immediately before bytes are written.
///
/// Receives the final destination path. Returning `Err` aborts the write.
pub type BeforeWriteHook = Arc<dyn Fn(&Path) -> Result<(), String> + Send + Sync>;

/// Hook invoked after a file was promoted to its final path.
///
/// Receives the final destination path and the number of bytes written.
pub type AfterWriteHook = Arc<dyn Fn(&Path, u64) + Send + Sync>;

/// Optional observation points around each write.
///
/// Used by tests to inject faults at a precise point and by callers that
/// want to be told about every completed artifact.
#[derive(Clone, Default)]
pub struct WriteHooks {
    before_write: Option<BeforeWriteHook>,
    after_write: Option<AfterWriteHook>,
}

impl WriteHooks {
    /// Create an empty set of hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook run immediately before bytes are written.
    pub fn before_write<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Path) -> Result<(), String> + Send + Sync + 'static,
    {
        self.before_write = Some(Arc::new(hook));
        self
    }

    /// Set the hook run after a successful promotion.
    pub fn after_write<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Path, u64) + Send + Sync + 'static,
    {
        self.after_write = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for WriteHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteHooks")
            .field("before_write", &self.before_write.is_some())
            .field("after_write", &self.after_write.is_some())
            .finish()
    }
}

/// Path of the temporary file used while writing `dest`.
pub fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Writes byte streams to a temporary file and promotes them atomically.
#[derive(Debug, Clone, Default)]
pub struct AtomicWriter {
    hooks: WriteHooks,
}

impl AtomicWriter {
    /// Create a writer without hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with hooks.
    pub fn with_hooks(hooks: WriteHooks) -> Self {
        Self { hooks }
    }

    /// Stream `reader` to `dest` atomically.
    ///
    /// Returns the number of bytes written. On any error the temporary file
    /// is removed and `dest` is left untouched.
    pub fn persist<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        dest: &Path,
    ) -> Result<u64, PersistError> {
        let tmp = temp_path(dest);

        let result = self
            .write_temp(reader, dest, &tmp)
            .and_then(|bytes| promote(&tmp, dest).map(|()| bytes));

        match result {
            Ok(bytes) => {
                if let Some(hook) = &self.hooks.after_write {
                    hook(dest, bytes);
                }
                Ok(bytes)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    if cleanup.kind() != io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %tmp.display(),
                            error = %cleanup,
                            "Failed to remove temporary file"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    fn write_temp<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        dest: &Path,
        tmp: &Path,
    ) -> Result<u64, PersistError> {
        let write_err = |source: io::Error| PersistError::Write {
            path: tmp.to_path_buf(),
            source,
        };

        let file = File::create(tmp).map_err(write_err)?;

        if let Some(hook) = &self.hooks.before_write {
            hook(dest).map_err(|reason| PersistError::Rejected {
                path: dest.to_path_buf(),
                reason,
            })?;
        }

        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut written = 0u64;

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(PersistError::Read(e)),
            };

            writer.write_all(&buffer[..bytes_read]).map_err(write_err)?;
            written += bytes_read as u64;
        }

        writer.flush().map_err(write_err)?;
        writer.get_ref().sync_all().map_err(write_err)?;

        Ok(written)
    }
}

/// Replace `dest` with `tmp`.
fn promote(tmp: &Path, dest: &Path) -> Result<(), PersistError> {
    match fs::remove_file(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(PersistError::Write {
                path: dest.to_path_buf(),
                source: e,
            })
        }
    }

    fs::rename(tmp, dest).map_err(|e| PersistError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
