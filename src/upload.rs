//! Uploaded file descriptors.
//!
//! The transport layer hands pico already-received files; pico only exposes
//! their metadata and copies their bytes into place on [`UploadedFile::store`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::error::{Error, Result};

/// A file received under a form field.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    full_name: String,
    mime_type: String,
    data: Bytes,
    error: Option<String>,
}

impl UploadedFile {
    /// A successfully received file.
    pub fn new(full_name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            full_name: full_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
            error: None,
        }
    }

    /// A field the transport saw but could not receive (size limit,
    /// partial upload, ...). [`Request::file`](crate::Request::file) treats
    /// it as absent.
    pub fn failed(full_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            mime_type: String::new(),
            data: Bytes::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The client-side file name without its extension.
    pub fn file_name(&self) -> &str {
        Path::new(&self.full_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// The client-side file name, extension included.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Writes the file into `dir`, as `name` or the client-side name, and
    /// returns the written path.
    ///
    /// Only the last component of the name is used, so the file always lands
    /// directly inside `dir`. A name with no final component (`""`, `..`,
    /// `/`) is [`Error::InvalidFileName`].
    pub fn store(&self, dir: impl AsRef<Path>, name: Option<&str>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let meta = match fs::metadata(dir) {
            Ok(m) if m.is_dir() => m,
            _ => return Err(Error::DestinationMissing(dir.to_path_buf())),
        };
        if meta.permissions().readonly() {
            return Err(Error::DestinationNotWritable(dir.to_path_buf()));
        }

        let name = name.unwrap_or(&self.full_name);
        let base = Path::new(name)
            .file_name()
            .ok_or_else(|| Error::InvalidFileName(name.to_owned()))?;
        let target = dir.join(base);
        fs::write(&target, &self.data).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => Error::DestinationNotWritable(dir.to_path_buf()),
            _ => Error::Io(e),
        })?;

        debug!(path = %target.display(), size = self.size(), "upload stored");
        Ok(target)
    }
}
