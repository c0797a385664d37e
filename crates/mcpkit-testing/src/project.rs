//! Temporary on-disk projects.
//!
//! Module resolution and `tsconfig.json` discovery need real files; a
//! [`TempProject`] lays them out in a directory that is removed on drop.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary project directory.
///
/// # Example
///
/// ```rust
/// use mcpkit_testing::TempProject;
///
/// let project = TempProject::new()?
///     .file("src/server.ts", "export default class Server {}")?
///     .file("tsconfig.json", "{ /* defaults */ }")?;
/// assert!(project.path("src/server.ts").is_file());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    /// Create an empty project.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Write a file, creating parent directories.
    pub fn file(self, relative: impl AsRef<Path>, contents: &str) -> io::Result<Self> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(self)
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a project file.
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_are_written_and_removed() {
        let project = TempProject::new()
            .and_then(|p| p.file("a/b/c.ts", "export {}"))
            .expect("project");
        let file = project.path("a/b/c.ts");
        assert_eq!(fs::read_to_string(&file).expect("read"), "export {}");

        let root = project.root().to_path_buf();
        drop(project);
        assert!(!root.exists());
    }
}
