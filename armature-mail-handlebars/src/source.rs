//! Template file access

use std::io;
use std::path::{Path, PathBuf};

/// Access to template files.
///
/// The adapter only reads files and lists a directory; both go through this
/// trait so other storage can stand in for the local filesystem.
pub trait TemplateSource: Send + Sync {
    /// Read a whole template file
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// List files directly inside `dir` whose extension matches `extension`
    /// (leading dot optional). Subdirectories are not searched.
    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
}

/// Local filesystem source
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == wanted) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_is_flat_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("header.hbs"), "head").unwrap();
        fs::write(temp_dir.path().join("footer.hbs"), "foot").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "skip").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested/deep.hbs"), "skip").unwrap();

        let mut files = FsTemplateSource.list_files(temp_dir.path(), ".hbs").unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![
                temp_dir.path().join("footer.hbs"),
                temp_dir.path().join("header.hbs"),
            ]
        );
    }

    #[test]
    fn test_list_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = FsTemplateSource.list_files(&temp_dir.path().join("absent"), "hbs");
        assert!(result.is_err());
    }

    #[test]
    fn test_read_to_string() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("welcome.hbs");
        fs::write(&path, "<p>Hello {{name}}</p>").unwrap();

        assert_eq!(
            FsTemplateSource.read_to_string(&path).unwrap(),
            "<p>Hello {{name}}</p>"
        );
    }
}
