use std::path::PathBuf;
use thiserror::Error;

/// Selection mode, fixed for the lifetime of a picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectMode {
    /// Pick a single existing, readable file.
    OpenFile,
    /// Pick a directory.
    OpenFolder,
    /// Choose a path to save a file to, possibly overwriting an existing one.
    SaveFile,
}

/// Filename-extension filter (e.g., "Images" -> ["png", "jpg"]).
///
/// Extensions are matched case-insensitively and should be provided without a
/// leading dot. The variants created from tuples are normalized to lowercase
/// automatically. An empty extension list matches every name.
#[derive(Clone, Debug, Default)]
pub struct ExtensionFilter {
    /// Filter display name.
    pub name: String,
    /// Lower-case extensions without dot (e.g., "png").
    pub extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Create a filter from a name and extensions.
    ///
    /// Extensions should be provided without dots (e.g. "png"). Matching is
    /// case-insensitive.
    pub fn new(name: impl Into<String>, exts: impl Into<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            extensions: exts.into(),
        }
    }

    /// Whether `file_name` carries one of the filter's extensions.
    ///
    /// ```
    /// use file_select::ExtensionFilter;
    /// let f = ExtensionFilter::from(("Images", &["png", "jpg"]));
    /// assert!(f.matches("photo.PNG"));
    /// assert!(!f.matches("notes.txt"));
    /// assert!(!f.matches("png"));
    /// ```
    pub fn matches(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let name_lower = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| has_extension_suffix(&name_lower, &ext.to_lowercase()))
    }
}

impl From<(&str, &[&str])> for ExtensionFilter {
    fn from(value: (&str, &[&str])) -> Self {
        Self {
            name: value.0.to_owned(),
            extensions: value.1.iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

impl<const N: usize> From<(&str, &[&str; N])> for ExtensionFilter {
    fn from(value: (&str, &[&str; N])) -> Self {
        (value.0, &value.1[..]).into()
    }
}

fn has_extension_suffix(name_lower: &str, ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() {
        return false;
    }
    if !name_lower.ends_with(ext) {
        return false;
    }
    let prefix_len = name_lower.len() - ext.len();
    if prefix_len == 0 {
        return false;
    }
    name_lower.as_bytes()[prefix_len - 1] == b'.'
}

/// Terminal result of one picker instance, produced at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The user settled on a path.
    Selected(PathBuf),
    /// The picker was cancelled.
    Cancelled,
}

/// Policy for dispatching the cancellation handler on [`Outcome::Cancelled`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CancelNotice {
    /// Invoke the cancel handler once, so callers are never left waiting.
    #[default]
    Notify,
    /// Invoke no handler on cancellation.
    Silent,
}

/// Recoverable, user-facing rejection of a candidate path.
///
/// Rejections carry the offending name and render a displayable message; they
/// never terminate the picker.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The candidate cannot be read.
    #[error("[{name}] can't be read.")]
    NotReadable {
        /// Offending file or folder name.
        name: String,
    },
    /// The candidate's parent folder cannot be written into.
    #[error("[{name}] can't be written into selected folder.")]
    NotWritableParent {
        /// Offending file name.
        name: String,
    },
    /// The candidate fails the mode's acceptance rule.
    #[error("[{name}] can't be selected.")]
    Unacceptable {
        /// Offending file or folder name.
        name: String,
    },
}

/// Contract violations reported by picker operations.
///
/// Unlike [`RejectReason`], these are programming errors on the caller's
/// side, made observable instead of being silently ignored.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    /// The operation is not valid in the picker's current state.
    #[error("operation invalid for the current picker state")]
    InvalidState,
    /// The picker already produced its outcome and accepts no further input.
    #[error("picker already terminated")]
    AlreadyTerminated,
    /// The navigation target is not an existing, listable directory.
    #[error("no such directory: {}", .0.display())]
    NoSuchDirectory(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_messages_carry_the_offending_name() {
        let r = RejectReason::NotReadable {
            name: "secret".into(),
        };
        assert_eq!(r.to_string(), "[secret] can't be read.");

        let r = RejectReason::NotWritableParent {
            name: "out.txt".into(),
        };
        assert_eq!(
            r.to_string(),
            "[out.txt] can't be written into selected folder."
        );

        let r = RejectReason::Unacceptable { name: "dev".into() };
        assert_eq!(r.to_string(), "[dev] can't be selected.");
    }

    #[test]
    fn filter_matches_dotted_suffix_only() {
        let f = ExtensionFilter::from(("Text", &["txt"]));
        assert!(f.matches("a.txt"));
        assert!(f.matches("A.TXT"));
        assert!(!f.matches("txt"));
        assert!(!f.matches(".txt"));
        assert!(!f.matches("atxt"));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = ExtensionFilter::new("All", Vec::new());
        assert!(f.matches("anything.bin"));
        assert!(f.matches("no_extension"));
    }
}
