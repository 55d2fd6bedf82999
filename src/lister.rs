use std::path::{Path, PathBuf};

use crate::fs::{FileSystem, FsEntry};

/// Kind of a listed entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Folder,
    /// Synthetic "up one level" row pointing at the parent directory.
    Up,
}

/// One row of a directory listing.
///
/// Entries are rebuilt from scratch on every listing and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Display label.
    pub name: String,
    /// Absolute path of the node; for [`EntryKind::Up`], the parent of the
    /// listed directory.
    pub path: PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
}

impl Entry {
    /// Whether activating this entry navigates (folders and the up row).
    pub fn is_navigable(&self) -> bool {
        matches!(self.kind, EntryKind::Folder | EntryKind::Up)
    }
}

pub(crate) const UP_LABEL: &str = "Up";

/// Lists `directory`, applying `accept` to every direct child.
///
/// Folders sort before files; within each group names compare
/// case-insensitively. The up row, present whenever the directory has a
/// parent, is prepended after filtering and sorting and is exempt from both.
/// An unreadable or non-directory path yields an empty listing.
pub fn list_directory<F>(fs: &dyn FileSystem, directory: &Path, accept: F) -> Vec<Entry>
where
    F: Fn(&FsEntry) -> bool,
{
    let mut children = match fs.read_dir(directory) {
        Ok(children) => children,
        Err(_) => return Vec::new(),
    };
    children.retain(|c| accept(c));
    children.sort_by(|a, b| {
        if a.is_dir != b.is_dir {
            return b.is_dir.cmp(&a.is_dir);
        }
        a.name.to_lowercase().cmp(&b.name.to_lowercase())
    });

    let mut out = Vec::with_capacity(children.len() + 1);
    if let Some(parent) = directory.parent() {
        out.push(Entry {
            name: UP_LABEL.to_string(),
            path: parent.to_path_buf(),
            kind: EntryKind::Up,
        });
    }
    out.extend(children.into_iter().map(|c| Entry {
        name: c.name,
        kind: if c.is_dir {
            EntryKind::Folder
        } else {
            EntryKind::File
        },
        path: c.path,
    }));
    out
}
