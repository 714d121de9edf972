//! Template path resolution
//!
//! Turns a template reference such as `"welcome"`, `"emails/welcome.hbs"`
//! or `"/srv/mail/welcome.hbs"` into the file to read and the name it is
//! cached under. Resolution is pure: nothing touches the filesystem, and a
//! malformed reference still yields a path that fails later when read.

use crate::config::{normalize_extension, CacheKeyStrategy};
use std::path::{Path, PathBuf};

/// A resolved template reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// File name without directory or extension
    pub name: String,

    /// File to read
    pub path: PathBuf,

    /// Extension including the leading dot
    pub extension: String,
}

impl ResolvedTemplate {
    /// Compile cache key under the given strategy
    pub fn cache_key(&self, strategy: CacheKeyStrategy) -> String {
        match strategy {
            CacheKeyStrategy::BaseName => self.name.clone(),
            CacheKeyStrategy::ResolvedPath => self.path.to_string_lossy().into_owned(),
        }
    }
}

/// Resolve `reference` against `base_dir`.
///
/// `default_ext` is used when the reference has no extension; a missing
/// leading dot is added. Absolute references ignore `base_dir`.
pub fn resolve(reference: &str, base_dir: &Path, default_ext: &str) -> ResolvedTemplate {
    let reference = Path::new(reference);

    let extension = reference
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| normalize_extension(default_ext.to_string()));

    let name = reference
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parent = reference.parent().unwrap_or_else(|| Path::new(""));
    let dir = if reference.is_absolute() {
        parent.to_path_buf()
    } else if parent.as_os_str().is_empty() {
        base_dir.to_path_buf()
    } else {
        base_dir.join(parent)
    };

    let path = dir.join(format!("{}{}", name, extension));

    ResolvedTemplate {
        name,
        path,
        extension,
    }
}
