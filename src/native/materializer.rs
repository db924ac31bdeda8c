use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::constants::SOURCE_EXTENSION;

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("failed to prepare source directory {}: {source}", .dir.display())]
    Dir { dir: PathBuf, source: io::Error },
    #[error("failed to write source file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Writes submissions into uniquely named files under a private directory.
#[derive(Clone, Debug)]
pub struct SourceMaterializer {
    dir: PathBuf,
}

impl SourceMaterializer {
    pub fn new<T: AsRef<Path>>(dir: T) -> Self {
        Self {
            dir: dir.as_ref().into(),
        }
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[tracing::instrument(skip(code), fields(code_len = code.len()))]
    pub async fn materialize(&self, code: &str) -> Result<SourceFile, MaterializeError> {
        self.ensure_dir().await?;

        let path = self
            .dir
            .join(format!("{}.{}", Uuid::new_v4(), SOURCE_EXTENSION));
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| MaterializeError::Write {
                path: path.clone(),
                source: e,
            })?;

        // From here on the guard owns the file, so a failed write removes it.
        let guard = SourceFile::new(path);

        let written = async {
            file.write_all(code.as_bytes()).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            return Err(MaterializeError::Write {
                path: guard.path().to_path_buf(),
                source: e,
            });
        }

        tracing::debug!(path = %guard.path().display(), "source materialized");
        Ok(guard)
    }

    async fn ensure_dir(&self) -> Result<(), MaterializeError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);

        builder
            .create(&self.dir)
            .await
            .map_err(|e| MaterializeError::Dir {
                dir: self.dir.clone(),
                source: e,
            })
    }
}

/// Owns one materialized source file. The file is deleted on [`release`]
/// or, failing that, when the guard is dropped.
///
/// [`release`]: SourceFile::release
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    released: bool,
}

impl SourceFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "source released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "source already gone")
            }
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove source file"
            ),
        }
    }
}

impl Drop for SourceFile {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> PathBuf {
        std::env::temp_dir().join(format!("codehelper_test_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_materialize_writes_code() {
        let materializer = SourceMaterializer::new(test_dir());

        let source = materializer.materialize("print('hi')\n").await.unwrap();

        assert!(source.path().starts_with(materializer.dir()));
        assert_eq!(source.path().extension().unwrap(), "py");
        let content = fs::read_to_string(source.path()).await.unwrap();
        assert_eq!(content, "print('hi')\n");
    }

    #[tokio::test]
    async fn test_materialize_keeps_non_ascii_text() {
        let materializer = SourceMaterializer::new(test_dir());

        let source = materializer
            .materialize("print('안녕하세요')")
            .await
            .unwrap();

        let content = fs::read_to_string(source.path()).await.unwrap();
        assert_eq!(content, "print('안녕하세요')");
    }

    #[tokio::test]
    async fn test_file_names_are_unique() {
        let materializer = SourceMaterializer::new(test_dir());

        let first = materializer.materialize("").await.unwrap();
        let second = materializer.materialize("").await.unwrap();

        assert_ne!(first.path(), second.path());
    }

    #[tokio::test]
    async fn test_release_removes_file() {
        let materializer = SourceMaterializer::new(test_dir());
        let source = materializer.materialize("x = 1").await.unwrap();
        let path = source.path().to_path_buf();

        source.release();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_file() {
        let materializer = SourceMaterializer::new(test_dir());
        let source = materializer.materialize("x = 1").await.unwrap();
        let path = source.path().to_path_buf();

        fs::remove_file(&path).await.unwrap();
        source.release();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let materializer = SourceMaterializer::new(test_dir());
        let path = {
            let source = materializer.materialize("x = 1").await.unwrap();
            source.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let materializer = SourceMaterializer::new(test_dir());
        let _source = materializer.materialize("").await.unwrap();

        let mode = fs::metadata(materializer.dir())
            .await
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[tokio::test]
    async fn test_materialize_filesystem_error() {
        // /proc is readonly dir
        let dir = format!("/proc/codehelper_{}", Uuid::new_v4());
        let materializer = SourceMaterializer::new(dir);

        let result = materializer.materialize("x = 1").await;

        assert!(matches!(result, Err(MaterializeError::Dir { .. })));
    }
}
