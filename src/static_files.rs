//! Static file resolution for every non-API path.
//!
//! Only extensions listed in [`MIME_TYPES`] are served. A request for any
//! other extension is refused before the filesystem is consulted, so
//! `/secrets.txt` answers "not allowed" whether or not the file exists.
//!
//! Request paths are percent-decoded before they are resolved, and the
//! traversal guard runs on the decoded form: `/%2e%2e/x.html` is refused the
//! same way `/../x.html` is.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// One servable extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeType {
    /// Lower-case extension without the dot
    pub extension: &'static str,
    pub mime: &'static str,
    /// Complete `Content-Type` header line
    pub header: &'static str,
}

macro_rules! mime_table {
    ($($ext:literal => $mime:literal),* $(,)?) => {
        &[$(MimeType {
            extension: $ext,
            mime: $mime,
            header: concat!("Content-Type: ", $mime),
        }),*]
    };
}

/// Extension -> MIME type table
pub static MIME_TYPES: &[MimeType] = mime_table! {
    "ico" => "image/x-icon",
    "icon" => "image/x-icon",
    "html" => "text/html; charset=utf-8",
    "htm" => "text/html; charset=utf-8",
    "js" => "application/javascript",
    "css" => "text/css; charset=utf-8",
    "json" => "application/json",
    "yaml" => "text/yaml; charset=utf-8",
    "yml" => "text/yaml; charset=utf-8",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "png" => "image/png",
    "svg" => "image/svg+xml",
};

/// Registered type for `extension` (case-insensitive).
pub fn mime_for_extension(extension: &str) -> Option<&'static MimeType> {
    MIME_TYPES
        .iter()
        .find(|m| m.extension.eq_ignore_ascii_case(extension))
}

/// Registered type for the extension of `path`.
pub fn mime_for_path(path: &str) -> Option<&'static MimeType> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
}

/// Why a static file was not served
#[derive(Debug)]
pub enum StaticError {
    /// Extension is not in the MIME table
    NotAllowed(String),
    /// No such file, or the path escapes the static root
    NotFound(String),
    /// The file exists but could not be read
    Io { path: String, source: io::Error },
}

impl StaticError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            StaticError::NotAllowed(_) => 401,
            StaticError::NotFound(_) => 404,
            StaticError::Io { .. } => 500,
        }
    }
}

impl fmt::Display for StaticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticError::NotAllowed(path) => write!(f, "Not allowed: {path}"),
            StaticError::NotFound(path) => write!(f, "File not found: {path}"),
            StaticError::Io { path, source } => write!(f, "Failed to read {path}: {source}"),
        }
    }
}

impl std::error::Error for StaticError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StaticError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A file ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub bytes: Vec<u8>,
    pub mime: &'static MimeType,
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Request path with the index document filled in.
    ///
    /// `""` and `/` become `/index.html`; `dir/` becomes `dir/index.html`.
    #[must_use]
    pub fn normalize(url_path: &str) -> String {
        let path = if url_path.starts_with('/') {
            url_path.to_string()
        } else {
            format!("/{url_path}")
        };
        if path.ends_with('/') {
            format!("{path}index.html")
        } else {
            path
        }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// Resolve and read the file for `url_path` (query string already removed).
    ///
    /// Invalid percent-encoding leaves the path as received.
    pub fn load(&self, url_path: &str) -> Result<StaticFile, StaticError> {
        let decoded = urlencoding::decode(url_path).unwrap_or(Cow::Borrowed(url_path));
        let path = Self::normalize(&decoded);
        let Some(mime) = mime_for_path(&path) else {
            return Err(StaticError::NotAllowed(path));
        };
        if path.contains('\0') {
            return Err(StaticError::NotFound(path));
        }
        let Some(file) = self.map_path(&path) else {
            return Err(StaticError::NotFound(path));
        };
        if !file.is_file() {
            return Err(StaticError::NotFound(path));
        }
        match fs::read(&file) {
            Ok(bytes) => Ok(StaticFile { bytes, mime }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StaticError::NotFound(path)),
            Err(source) => Err(StaticError::Io { path, source }),
        }
    }
}
