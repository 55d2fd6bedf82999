use std::path::{Path, PathBuf};

/// Minimal metadata used by listing, acceptance and permission checks.
#[derive(Clone, Debug)]
pub struct FsMetadata {
    /// Whether the path refers to a directory.
    pub is_dir: bool,
    /// Whether the path can be read (listed, for directories).
    pub readable: bool,
    /// Whether the path can be written to (or into, for directories).
    pub writable: bool,
}

/// Directory entry returned by [`FileSystem::read_dir`].
#[derive(Clone, Debug)]
pub struct FsEntry {
    /// Base name (no parent path).
    pub name: String,
    /// Full path.
    pub path: PathBuf,
    /// Whether this entry is a directory.
    pub is_dir: bool,
}

/// File system abstraction behind the picker.
///
/// All calls are synchronous and fallible; failures are recovered locally and
/// never retried. `Err(NotFound)` from [`FileSystem::metadata`] doubles as
/// the existence probe.
pub trait FileSystem {
    /// List direct children of a directory.
    fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<FsEntry>>;
    /// Fetch metadata for a path.
    fn metadata(&self, path: &Path) -> std::io::Result<FsMetadata>;
    /// Canonicalize a path (best-effort absolute normalization).
    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf>;
}

/// Default filesystem implementation using `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_dir(&self, dir: &Path) -> std::io::Result<Vec<FsEntry>> {
        let mut out = Vec::new();
        let rd = std::fs::read_dir(dir)?;
        for e in rd {
            let e = match e {
                Ok(v) => v,
                Err(_) => continue,
            };
            let ft = match e.file_type() {
                Ok(v) => v,
                Err(_) => continue,
            };
            // Symlinks count as what they point at; broken links list as files.
            let is_dir = if ft.is_symlink() {
                std::fs::metadata(e.path()).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                ft.is_dir()
            };
            out.push(FsEntry {
                name: e.file_name().to_string_lossy().to_string(),
                path: e.path(),
                is_dir,
            });
        }
        Ok(out)
    }

    fn metadata(&self, path: &Path) -> std::io::Result<FsMetadata> {
        let md = std::fs::metadata(path)?;
        let is_dir = md.is_dir();
        let readable = if is_dir {
            std::fs::read_dir(path).is_ok()
        } else {
            std::fs::File::open(path).is_ok()
        };
        Ok(FsMetadata {
            is_dir,
            readable,
            writable: !md.permissions().readonly(),
        })
    }

    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// Platform starting directory: the user's home, else the filesystem root.
pub(crate) fn default_root() -> PathBuf {
    home_dir().unwrap_or_else(|| PathBuf::from(std::path::MAIN_SEPARATOR.to_string()))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
}
