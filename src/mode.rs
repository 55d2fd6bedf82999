use std::path::{Path, PathBuf};

use crate::core::{ExtensionFilter, RejectReason, SelectMode};
use crate::fs::{FileSystem, FsEntry};
use crate::lister::Entry;

/// Result of evaluating a candidate path against the active mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acceptance {
    /// The candidate may be selected as-is.
    Acceptable,
    /// The candidate is refused; the reason is for display.
    Rejected(RejectReason),
    /// Selecting the candidate needs an affirmative overwrite answer first.
    NeedsConfirmation,
}

/// Effect of activating a listed entry, decided per mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Activation {
    /// Enter the directory.
    Navigate(PathBuf),
    /// Run the acceptance check and select on success.
    EvaluateTarget(PathBuf),
    /// Put the entry's name into the pending filename field.
    FillPendingName(String),
}

impl SelectMode {
    /// Listing predicate: whether `candidate` appears in a directory listing.
    ///
    /// The optional extension filter composes with the mode rule; folder
    /// candidates always pass it so navigation stays possible.
    pub fn admits(self, filter: Option<&ExtensionFilter>, candidate: &FsEntry) -> bool {
        let mode_ok = match self {
            SelectMode::OpenFile | SelectMode::SaveFile => true,
            SelectMode::OpenFolder => candidate.is_dir,
        };
        if !mode_ok {
            return false;
        }
        candidate.is_dir || filter.map(|f| f.matches(&candidate.name)).unwrap_or(true)
    }

    /// Acceptance check backing the commit action.
    ///
    /// - `OpenFile`: acceptable iff `path` is a readable regular file.
    /// - `OpenFolder`: acceptable iff `path` is a directory.
    /// - `SaveFile`: rejected when the parent directory is not writable
    ///   (whether or not the target exists); otherwise acceptable for an
    ///   absent target and confirmation-gated for an existing one.
    pub fn evaluate_target(self, fs: &dyn FileSystem, path: &Path) -> Acceptance {
        let name = display_name(path);
        match self {
            SelectMode::OpenFile => match fs.metadata(path) {
                Ok(md) if !md.is_dir && md.readable => Acceptance::Acceptable,
                _ => Acceptance::Rejected(RejectReason::Unacceptable { name }),
            },
            SelectMode::OpenFolder => match fs.metadata(path) {
                Ok(md) if md.is_dir => Acceptance::Acceptable,
                _ => Acceptance::Rejected(RejectReason::Unacceptable { name }),
            },
            SelectMode::SaveFile => {
                let parent_writable = path
                    .parent()
                    .and_then(|p| fs.metadata(p).ok())
                    .map(|md| md.is_dir && md.writable)
                    .unwrap_or(false);
                if !parent_writable {
                    return Acceptance::Rejected(RejectReason::NotWritableParent { name });
                }
                if fs.metadata(path).is_ok() {
                    Acceptance::NeedsConfirmation
                } else {
                    Acceptance::Acceptable
                }
            }
        }
    }

    /// Per-mode effect of activating `entry`. The readability gate runs
    /// before this, in the controller.
    pub(crate) fn activation(self, entry: &Entry) -> Activation {
        if entry.is_navigable() {
            return Activation::Navigate(entry.path.clone());
        }
        match self {
            SelectMode::OpenFile => Activation::EvaluateTarget(entry.path.clone()),
            // Folder-only listings never produce file rows; keep the
            // always-navigate rule for completeness.
            SelectMode::OpenFolder => Activation::Navigate(entry.path.clone()),
            SelectMode::SaveFile => Activation::FillPendingName(entry.name.clone()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
