use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{CancelNotice, ExtensionFilter, Outcome, RejectReason, SelectError, SelectMode};
use crate::events::PickerEvent;
use crate::fs::{self, FileSystem, StdFileSystem};
use crate::lister::{self, Entry};
use crate::mode::{Acceptance, Activation};
use crate::saved::SavedState;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Handler invoked once with the selected absolute path.
pub type SelectedHandler = Box<dyn FnMut(&Path)>;
/// Handler invoked once on cancellation, subject to [`CancelNotice`].
pub type CancelledHandler = Box<dyn FnMut()>;

/// Result of a [`PickerController::go_up`] request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpNavigation {
    /// Moved into the parent directory.
    Moved,
    /// The current directory has no parent; nothing changed. Callers with
    /// their own back-navigation fall through to it on this signal.
    Boundary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    Browsing,
    AwaitingConfirmation(PathBuf),
    Terminated,
}

/// Builder for [`PickerController`].
///
/// ```
/// use file_select::{PickerBuilder, SelectMode};
///
/// let picker = PickerBuilder::new(SelectMode::OpenFile)
///     .start_dir("/tmp")
///     .filter(("Images", &["png", "jpg"]))
///     .on_selected(|path| println!("picked {}", path.display()))
///     .build();
/// # let _ = picker;
/// ```
pub struct PickerBuilder {
    mode: SelectMode,
    start_dir: Option<PathBuf>,
    filter: Option<ExtensionFilter>,
    pending_name: String,
    cancel_notice: CancelNotice,
    notify_on_overwrite_decline: bool,
    on_selected: Option<SelectedHandler>,
    on_cancelled: Option<CancelledHandler>,
}

impl PickerBuilder {
    /// Creates a builder for the given mode.
    pub fn new(mode: SelectMode) -> Self {
        Self {
            mode,
            start_dir: None,
            filter: None,
            pending_name: String::new(),
            cancel_notice: CancelNotice::default(),
            notify_on_overwrite_decline: false,
            on_selected: None,
            on_cancelled: None,
        }
    }

    /// Sets the starting directory. A missing or unlistable path falls back
    /// to the platform root at build time; it is never a construction error.
    pub fn start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    /// Adds an extension filter, ANDed with the mode's own filtering.
    pub fn filter<F: Into<ExtensionFilter>>(mut self, filter: F) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Pre-fills the pending filename field (SaveFile).
    pub fn default_file_name(mut self, name: impl Into<String>) -> Self {
        self.pending_name = name.into();
        self
    }

    /// Sets the cancellation-notification policy.
    pub fn cancel_notice(mut self, policy: CancelNotice) -> Self {
        self.cancel_notice = policy;
        self
    }

    /// Also emit [`PickerEvent::OverwriteDeclined`] when a pending overwrite
    /// is declined. Off by default: declining quietly returns to browsing.
    pub fn notify_on_overwrite_decline(mut self, yes: bool) -> Self {
        self.notify_on_overwrite_decline = yes;
        self
    }

    /// Registers the selection handler, called exactly once with the
    /// selected path when the picker terminates with a selection.
    pub fn on_selected<F: FnMut(&Path) + 'static>(mut self, f: F) -> Self {
        self.on_selected = Some(Box::new(f));
        self
    }

    /// Registers the cancellation handler.
    pub fn on_cancelled<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_cancelled = Some(Box::new(f));
        self
    }

    /// Builds a controller over the real filesystem.
    pub fn build(self) -> PickerController {
        self.build_with_fs(Box::new(StdFileSystem))
    }

    /// Builds a controller over a custom [`FileSystem`].
    pub fn build_with_fs(self, fs: Box<dyn FileSystem>) -> PickerController {
        self.into_controller(fs, None)
    }

    /// Rebuilds a controller from persisted state, resuming an outstanding
    /// overwrite confirmation when one was pending.
    pub fn restore(self, saved: SavedState) -> PickerController {
        self.restore_with_fs(saved, Box::new(StdFileSystem))
    }

    /// Like [`PickerBuilder::restore`], over a custom [`FileSystem`].
    pub fn restore_with_fs(self, saved: SavedState, fs: Box<dyn FileSystem>) -> PickerController {
        self.into_controller(fs, Some(saved))
    }

    fn into_controller(self, fs: Box<dyn FileSystem>, saved: Option<SavedState>) -> PickerController {
        let (requested, pending) = match saved {
            Some(s) => (Some(s.current_path), s.pending_confirmation),
            None => (self.start_dir, None),
        };

        let mut controller = PickerController {
            mode: self.mode,
            fs,
            filter: self.filter,
            current_path: PathBuf::new(),
            entries: Vec::new(),
            pending_name: self.pending_name,
            phase: Phase::Browsing,
            outcome: None,
            events: Vec::new(),
            cancel_notice: self.cancel_notice,
            notify_on_overwrite_decline: self.notify_on_overwrite_decline,
            on_selected: self.on_selected,
            on_cancelled: self.on_cancelled,
        };

        let start = requested
            .filter(|p| controller.is_listable(p))
            .unwrap_or_else(fs::default_root);
        if controller.navigate_unchecked(start.clone()).is_err() {
            // Even the fallback root can be unlistable in sandboxed hosts;
            // browsing then starts on an empty listing and recovers on the
            // first successful navigation.
            controller.current_path = start.clone();
            controller
                .events
                .push(PickerEvent::NavigationChanged { path: start });
        }

        if let Some(path) = pending {
            controller.phase = Phase::AwaitingConfirmation(path.clone());
            controller
                .events
                .push(PickerEvent::ConfirmationRequested { path });
        }

        controller
    }
}

impl fmt::Debug for PickerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerBuilder")
            .field("mode", &self.mode)
            .field("start_dir", &self.start_dir)
            .finish_non_exhaustive()
    }
}

/// Drives one file/folder selection to a single terminal [`Outcome`].
///
/// The controller processes one operation at a time; the only suspension
/// point is an outstanding overwrite confirmation, during which every
/// operation other than [`PickerController::resolve_confirmation`] and
/// [`PickerController::cancel`] fails with [`SelectError::InvalidState`].
/// Once the outcome is produced the controller is inert: all further
/// operations fail with [`SelectError::AlreadyTerminated`].
///
/// State changes are queued as [`PickerEvent`]s for a rendering layer; the
/// terminal outcome is additionally dispatched to the handlers registered on
/// the builder.
pub struct PickerController {
    mode: SelectMode,
    fs: Box<dyn FileSystem>,
    filter: Option<ExtensionFilter>,
    current_path: PathBuf,
    entries: Vec<Entry>,
    pending_name: String,
    phase: Phase,
    outcome: Option<Outcome>,
    events: Vec<PickerEvent>,
    cancel_notice: CancelNotice,
    notify_on_overwrite_decline: bool,
    on_selected: Option<SelectedHandler>,
    on_cancelled: Option<CancelledHandler>,
}

impl PickerController {
    /// Mode fixed at construction.
    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// Directory currently listed.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Entries of the last successful listing, up row first when present.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Pending filename field (SaveFile).
    pub fn pending_name(&self) -> &str {
        &self.pending_name
    }

    /// Overwrites the pending filename field.
    pub fn set_pending_name(&mut self, name: impl Into<String>) {
        self.pending_name = name.into();
    }

    /// Save target built from the current directory and the pending filename.
    pub fn save_target(&self) -> PathBuf {
        self.current_path.join(self.pending_name.trim())
    }

    /// Candidate path an outstanding overwrite confirmation is waiting on.
    pub fn pending_confirmation(&self) -> Option<&Path> {
        match &self.phase {
            Phase::AwaitingConfirmation(path) => Some(path),
            _ => None,
        }
    }

    /// Terminal outcome, once produced.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Whether the picker reached its terminal state.
    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated)
    }

    /// Drains queued state-change events, oldest first.
    pub fn take_events(&mut self) -> Vec<PickerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Captures restorable state: the current directory plus any pending
    /// overwrite candidate.
    pub fn saved_state(&self) -> SavedState {
        SavedState {
            current_path: self.current_path.clone(),
            pending_confirmation: self.pending_confirmation().map(Path::to_path_buf),
        }
    }

    /// Lists `path` and makes it the current directory.
    ///
    /// The target must be an existing, listable directory, else
    /// [`SelectError::NoSuchDirectory`] is returned and nothing changes.
    /// Navigation while a confirmation is pending is a contract violation.
    pub fn navigate(&mut self, path: impl Into<PathBuf>) -> Result<(), SelectError> {
        self.ensure_browsing()?;
        self.navigate_unchecked(path.into())
    }

    /// Activates the entry at `index` in the current listing: the click
    /// semantics of the active mode.
    ///
    /// An unreadable candidate is rejected with [`RejectReason::NotReadable`]
    /// before any mode behavior runs. An out-of-range index is a contract
    /// violation.
    pub fn activate_entry(&mut self, index: usize) -> Result<(), SelectError> {
        self.ensure_browsing()?;
        let Some(entry) = self.entries.get(index).cloned() else {
            return Err(SelectError::InvalidState);
        };

        let readable = self
            .fs
            .metadata(&entry.path)
            .map(|md| md.readable)
            .unwrap_or(false);
        if !readable {
            let name = entry
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| entry.name.clone());
            self.events
                .push(PickerEvent::Rejected {
                    reason: RejectReason::NotReadable { name },
                });
            return Ok(());
        }

        match self.mode.activation(&entry) {
            Activation::Navigate(path) => self.navigate_unchecked(path),
            Activation::EvaluateTarget(path) => {
                self.apply_acceptance(path);
                Ok(())
            }
            Activation::FillPendingName(name) => {
                self.pending_name = name;
                Ok(())
            }
        }
    }

    /// Explicit commit (Save / Select-current-folder) of `candidate`.
    ///
    /// An acceptable target terminates the picker with
    /// [`Outcome::Selected`]; a rejected one queues a
    /// [`PickerEvent::Rejected`] and leaves the picker browsing; an existing
    /// save target parks the picker on an overwrite confirmation.
    pub fn commit(&mut self, candidate: impl Into<PathBuf>) -> Result<(), SelectError> {
        self.ensure_browsing()?;
        self.apply_acceptance(candidate.into());
        Ok(())
    }

    /// Navigates to the parent of the current directory.
    ///
    /// At the filesystem root this is a no-op returning
    /// [`UpNavigation::Boundary`] rather than an error.
    pub fn go_up(&mut self) -> Result<UpNavigation, SelectError> {
        self.ensure_browsing()?;
        let Some(parent) = self.current_path.parent().map(Path::to_path_buf) else {
            return Ok(UpNavigation::Boundary);
        };
        self.navigate_unchecked(parent)?;
        Ok(UpNavigation::Moved)
    }

    /// Answers the outstanding overwrite question.
    ///
    /// An affirmative answer terminates the picker with the parked
    /// candidate; declining returns to browsing with the navigation state
    /// untouched. Fails with [`SelectError::InvalidState`] when no
    /// confirmation is pending.
    pub fn resolve_confirmation(&mut self, accepted: bool) -> Result<(), SelectError> {
        if matches!(self.phase, Phase::Terminated) {
            return Err(SelectError::AlreadyTerminated);
        }
        let Phase::AwaitingConfirmation(path) =
            std::mem::replace(&mut self.phase, Phase::Browsing)
        else {
            return Err(SelectError::InvalidState);
        };
        trace_confirmation_resolved(&path, accepted);
        if accepted {
            self.finish(Outcome::Selected(path));
        } else if self.notify_on_overwrite_decline {
            self.events.push(PickerEvent::OverwriteDeclined { path });
        }
        Ok(())
    }

    /// Cancels the picker. Valid in any state before termination, including
    /// while a confirmation is pending.
    pub fn cancel(&mut self) -> Result<(), SelectError> {
        if matches!(self.phase, Phase::Terminated) {
            return Err(SelectError::AlreadyTerminated);
        }
        self.finish(Outcome::Cancelled);
        Ok(())
    }

    fn ensure_browsing(&self) -> Result<(), SelectError> {
        match self.phase {
            Phase::Browsing => Ok(()),
            Phase::AwaitingConfirmation(_) => Err(SelectError::InvalidState),
            Phase::Terminated => Err(SelectError::AlreadyTerminated),
        }
    }

    fn is_listable(&self, path: &Path) -> bool {
        self.fs
            .metadata(path)
            .map(|md| md.is_dir && md.readable)
            .unwrap_or(false)
    }

    fn navigate_unchecked(&mut self, path: PathBuf) -> Result<(), SelectError> {
        if !self.is_listable(&path) {
            return Err(SelectError::NoSuchDirectory(path));
        }
        let path = self.fs.canonicalize(&path).unwrap_or(path);
        let entries = self.list_dir(&path);
        self.entries = entries;
        self.current_path = path;
        trace_navigated(&self.current_path, self.entries.len());
        self.events.push(PickerEvent::NavigationChanged {
            path: self.current_path.clone(),
        });
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Vec<Entry> {
        let mode = self.mode;
        let filter = self.filter.as_ref();
        lister::list_directory(self.fs.as_ref(), path, |candidate| {
            mode.admits(filter, candidate)
        })
    }

    fn apply_acceptance(&mut self, candidate: PathBuf) {
        let acceptance = self.mode.evaluate_target(self.fs.as_ref(), &candidate);
        trace_commit_evaluated(&candidate, &acceptance);
        match acceptance {
            Acceptance::Acceptable => self.finish(Outcome::Selected(candidate)),
            Acceptance::Rejected(reason) => self.events.push(PickerEvent::Rejected { reason }),
            Acceptance::NeedsConfirmation => {
                self.phase = Phase::AwaitingConfirmation(candidate.clone());
                self.events
                    .push(PickerEvent::ConfirmationRequested { path: candidate });
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = Phase::Terminated;
        trace_finished(&outcome);
        match &outcome {
            Outcome::Selected(path) => {
                if let Some(handler) = self.on_selected.as_mut() {
                    handler(path);
                }
            }
            Outcome::Cancelled => {
                if matches!(self.cancel_notice, CancelNotice::Notify) {
                    if let Some(handler) = self.on_cancelled.as_mut() {
                        handler();
                    }
                }
            }
        }
        self.outcome = Some(outcome.clone());
        self.events.push(PickerEvent::Outcome(outcome));
    }
}

impl fmt::Debug for PickerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerController")
            .field("mode", &self.mode)
            .field("current_path", &self.current_path)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "tracing")]
fn trace_navigated(path: &Path, entries: usize) {
    trace!(
        event = "picker.navigated",
        path = %path.display(),
        entries,
        "navigated"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_navigated(_path: &Path, _entries: usize) {}

#[cfg(feature = "tracing")]
fn trace_commit_evaluated(path: &Path, acceptance: &Acceptance) {
    let verdict = match acceptance {
        Acceptance::Acceptable => "acceptable",
        Acceptance::Rejected(_) => "rejected",
        Acceptance::NeedsConfirmation => "needs_confirmation",
    };
    trace!(
        event = "picker.commit_evaluated",
        path = %path.display(),
        verdict,
        "commit evaluated"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_commit_evaluated(_path: &Path, _acceptance: &Acceptance) {}

#[cfg(feature = "tracing")]
fn trace_confirmation_resolved(path: &Path, accepted: bool) {
    trace!(
        event = "picker.confirmation_resolved",
        path = %path.display(),
        accepted,
        "confirmation resolved"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_confirmation_resolved(_path: &Path, _accepted: bool) {}

#[cfg(feature = "tracing")]
fn trace_finished(outcome: &Outcome) {
    let outcome = match outcome {
        Outcome::Selected(_) => "selected",
        Outcome::Cancelled => "cancelled",
    };
    trace!(event = "picker.finished", outcome, "picker finished");
}

#[cfg(not(feature = "tracing"))]
fn trace_finished(_outcome: &Outcome) {}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::fs::test_fs::TestFs;
    use crate::lister::EntryKind;

    fn sample_tree() -> TestFs {
        TestFs::default()
            .dir("/", &[("root", true)])
            .dir("/root", &[("docs", true), ("a.txt", false)])
            .dir("/root/docs", &[])
    }

    fn open_file_picker(fs: TestFs) -> PickerController {
        PickerBuilder::new(SelectMode::OpenFile)
            .start_dir("/root")
            .build_with_fs(Box::new(fs))
    }

    fn index_of(picker: &PickerController, name: &str) -> usize {
        picker
            .entries()
            .iter()
            .position(|e| e.name == name)
            .unwrap_or_else(|| panic!("missing entry {name}"))
    }

    #[test]
    fn initial_listing_is_ready_at_build_time() {
        let picker = open_file_picker(sample_tree());
        assert_eq!(picker.current_path(), Path::new("/root"));
        assert_eq!(picker.entries()[0].kind, EntryKind::Up);
        assert_eq!(index_of(&picker, "docs"), 1);
        assert_eq!(index_of(&picker, "a.txt"), 2);
    }

    #[test]
    fn open_file_scenario_navigate_then_select() {
        let selected: Rc<RefCell<Vec<PathBuf>>> = Rc::default();
        let sink = Rc::clone(&selected);
        let mut picker = PickerBuilder::new(SelectMode::OpenFile)
            .start_dir("/root")
            .on_selected(move |path| sink.borrow_mut().push(path.to_path_buf()))
            .build_with_fs(Box::new(sample_tree()));

        let docs = index_of(&picker, "docs");
        picker.activate_entry(docs).unwrap();
        assert_eq!(picker.current_path(), Path::new("/root/docs"));

        assert_eq!(picker.go_up().unwrap(), UpNavigation::Moved);
        assert_eq!(picker.current_path(), Path::new("/root"));

        let a_txt = index_of(&picker, "a.txt");
        picker.activate_entry(a_txt).unwrap();

        assert_eq!(
            picker.outcome(),
            Some(&Outcome::Selected(PathBuf::from("/root/a.txt")))
        );
        assert_eq!(*selected.borrow(), vec![PathBuf::from("/root/a.txt")]);
        assert!(picker.is_terminated());
    }

    #[test]
    fn activating_the_up_row_navigates_to_the_parent() {
        let mut picker = open_file_picker(sample_tree());
        picker.activate_entry(0).unwrap();
        assert_eq!(picker.current_path(), Path::new("/"));
    }

    #[test]
    fn go_up_at_the_root_signals_the_boundary() {
        let mut picker = PickerBuilder::new(SelectMode::OpenFolder)
            .start_dir("/")
            .build_with_fs(Box::new(sample_tree()));

        picker.take_events();
        assert_eq!(picker.go_up().unwrap(), UpNavigation::Boundary);
        assert_eq!(picker.current_path(), Path::new("/"));
        assert!(picker.take_events().is_empty());
    }

    #[test]
    fn open_folder_listings_exclude_files_and_activation_always_navigates() {
        let mut picker = PickerBuilder::new(SelectMode::OpenFolder)
            .start_dir("/root")
            .build_with_fs(Box::new(sample_tree()));

        assert!(picker.entries().iter().all(|e| e.kind != EntryKind::File));

        let docs = index_of(&picker, "docs");
        picker.activate_entry(docs).unwrap();
        assert_eq!(picker.current_path(), Path::new("/root/docs"));
        assert!(!picker.is_terminated());
    }

    #[test]
    fn open_folder_commit_selects_the_current_directory() {
        let mut picker = PickerBuilder::new(SelectMode::OpenFolder)
            .start_dir("/root")
            .build_with_fs(Box::new(sample_tree()));

        let current = picker.current_path().to_path_buf();
        picker.commit(current.clone()).unwrap();
        assert_eq!(picker.outcome(), Some(&Outcome::Selected(current)));
    }

    #[test]
    fn unreadable_candidate_is_rejected_before_mode_behavior() {
        let fs = TestFs::default()
            .dir("/root", &[("locked.txt", false)])
            .meta("/root/locked.txt", false, false, true);
        let mut picker = open_file_picker(fs);
        picker.take_events();

        let locked = index_of(&picker, "locked.txt");
        picker.activate_entry(locked).unwrap();

        assert_eq!(
            picker.take_events(),
            vec![PickerEvent::Rejected {
                reason: RejectReason::NotReadable {
                    name: "locked.txt".into()
                }
            }]
        );
        assert!(!picker.is_terminated());
    }

    #[test]
    fn rejected_commit_keeps_the_picker_browsing() {
        let mut picker = open_file_picker(sample_tree());
        picker.take_events();

        picker.commit("/root/docs").unwrap();

        assert_eq!(
            picker.take_events(),
            vec![PickerEvent::Rejected {
                reason: RejectReason::Unacceptable {
                    name: "docs".into()
                }
            }]
        );
        assert!(!picker.is_terminated());
        assert_eq!(picker.current_path(), Path::new("/root"));
    }

    #[test]
    fn save_file_activation_fills_the_pending_name() {
        let fs = TestFs::default().dir("/root", &[("old.txt", false), ("docs", true)]);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .default_file_name("draft.txt")
            .build_with_fs(Box::new(fs));

        assert_eq!(picker.pending_name(), "draft.txt");
        let old = index_of(&picker, "old.txt");
        picker.activate_entry(old).unwrap();
        assert_eq!(picker.pending_name(), "old.txt");
        assert_eq!(picker.save_target(), PathBuf::from("/root/old.txt"));
        assert!(!picker.is_terminated());

        // A folder row navigates instead.
        let docs = index_of(&picker, "docs");
        picker.activate_entry(docs).unwrap();
        assert_eq!(picker.current_path(), Path::new("/root/docs"));
    }

    #[test]
    fn save_file_overwrite_accept_selects_the_candidate() {
        let fs = TestFs::default().dir("/root", &[("out.txt", false)]);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .build_with_fs(Box::new(fs));
        picker.take_events();

        picker.commit("/root/out.txt").unwrap();
        assert_eq!(
            picker.pending_confirmation(),
            Some(Path::new("/root/out.txt"))
        );
        assert_eq!(
            picker.take_events(),
            vec![PickerEvent::ConfirmationRequested {
                path: PathBuf::from("/root/out.txt")
            }]
        );

        picker.resolve_confirmation(true).unwrap();
        assert_eq!(
            picker.outcome(),
            Some(&Outcome::Selected(PathBuf::from("/root/out.txt")))
        );
    }

    #[test]
    fn save_file_overwrite_decline_returns_to_browsing() {
        let fs = TestFs::default().dir("/root", &[("out.txt", false)]);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .build_with_fs(Box::new(fs));

        let path_before = picker.current_path().to_path_buf();
        let entries_before = picker.entries().to_vec();

        picker.commit("/root/out.txt").unwrap();
        picker.resolve_confirmation(false).unwrap();

        assert_eq!(picker.outcome(), None);
        assert!(!picker.is_terminated());
        assert_eq!(picker.current_path(), path_before);
        assert_eq!(picker.entries(), entries_before.as_slice());

        // The question is gone; answering again is a contract violation.
        assert_eq!(
            picker.resolve_confirmation(false),
            Err(SelectError::InvalidState)
        );
    }

    #[test]
    fn overwrite_decline_notification_is_opt_in() {
        let fs = TestFs::default().dir("/root", &[("out.txt", false)]);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .notify_on_overwrite_decline(true)
            .build_with_fs(Box::new(fs));
        picker.take_events();

        picker.commit("/root/out.txt").unwrap();
        picker.take_events();
        picker.resolve_confirmation(false).unwrap();

        assert_eq!(
            picker.take_events(),
            vec![PickerEvent::OverwriteDeclined {
                path: PathBuf::from("/root/out.txt")
            }]
        );
    }

    #[test]
    fn save_file_unwritable_parent_rejects_without_confirmation() {
        let fs = TestFs::default()
            .dir("/root", &[("out.txt", false)])
            .meta("/root", true, true, false);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .build_with_fs(Box::new(fs));
        picker.take_events();

        picker.commit("/root/out.txt").unwrap();

        assert_eq!(
            picker.take_events(),
            vec![PickerEvent::Rejected {
                reason: RejectReason::NotWritableParent {
                    name: "out.txt".into()
                }
            }]
        );
        assert_eq!(picker.pending_confirmation(), None);
    }

    #[test]
    fn no_input_is_processed_while_a_confirmation_is_pending() {
        let fs = TestFs::default().dir("/root", &[("out.txt", false), ("docs", true)]);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .build_with_fs(Box::new(fs));

        picker.commit("/root/out.txt").unwrap();

        assert_eq!(picker.navigate("/root/docs"), Err(SelectError::InvalidState));
        assert_eq!(picker.commit("/root/other.txt"), Err(SelectError::InvalidState));
        assert_eq!(picker.activate_entry(0), Err(SelectError::InvalidState));
        assert_eq!(picker.go_up(), Err(SelectError::InvalidState));

        // The pending question itself survives the refused operations.
        assert_eq!(
            picker.pending_confirmation(),
            Some(Path::new("/root/out.txt"))
        );
    }

    #[test]
    fn cancel_works_while_a_confirmation_is_pending() {
        let fs = TestFs::default().dir("/root", &[("out.txt", false)]);
        let cancelled = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&cancelled);
        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .on_cancelled(move || *sink.borrow_mut() += 1)
            .build_with_fs(Box::new(fs));

        picker.commit("/root/out.txt").unwrap();
        picker.cancel().unwrap();

        assert_eq!(picker.outcome(), Some(&Outcome::Cancelled));
        assert_eq!(*cancelled.borrow(), 1);
    }

    #[test]
    fn silent_cancel_policy_skips_the_handler() {
        let cancelled = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&cancelled);
        let mut picker = PickerBuilder::new(SelectMode::OpenFile)
            .start_dir("/root")
            .cancel_notice(CancelNotice::Silent)
            .on_cancelled(move || *sink.borrow_mut() += 1)
            .build_with_fs(Box::new(sample_tree()));

        picker.cancel().unwrap();
        assert_eq!(picker.outcome(), Some(&Outcome::Cancelled));
        assert_eq!(*cancelled.borrow(), 0);
    }

    #[test]
    fn terminated_picker_refuses_every_operation() {
        let mut picker = open_file_picker(sample_tree());
        picker.cancel().unwrap();

        assert_eq!(picker.navigate("/root"), Err(SelectError::AlreadyTerminated));
        assert_eq!(picker.activate_entry(0), Err(SelectError::AlreadyTerminated));
        assert_eq!(picker.commit("/root/a.txt"), Err(SelectError::AlreadyTerminated));
        assert_eq!(picker.go_up(), Err(SelectError::AlreadyTerminated));
        assert_eq!(
            picker.resolve_confirmation(true),
            Err(SelectError::AlreadyTerminated)
        );
        assert_eq!(picker.cancel(), Err(SelectError::AlreadyTerminated));
    }

    #[test]
    fn navigate_to_a_missing_directory_leaves_state_intact() {
        let mut picker = open_file_picker(sample_tree());
        picker.take_events();

        let err = picker.navigate("/root/ghost").unwrap_err();
        assert_eq!(err, SelectError::NoSuchDirectory(PathBuf::from("/root/ghost")));
        assert_eq!(picker.current_path(), Path::new("/root"));
        assert!(picker.take_events().is_empty());
    }

    #[test]
    fn activation_index_out_of_range_is_a_contract_violation() {
        let mut picker = open_file_picker(sample_tree());
        assert_eq!(picker.activate_entry(99), Err(SelectError::InvalidState));
    }

    #[test]
    fn invalid_start_dir_falls_back_to_the_platform_root() {
        let picker = PickerBuilder::new(SelectMode::OpenFile)
            .start_dir("/nowhere")
            .build_with_fs(Box::new(TestFs::default()));

        assert_eq!(picker.current_path(), fs::default_root());
        assert!(picker.entries().is_empty());
    }

    #[test]
    fn extension_filter_narrows_file_listings() {
        let fs = TestFs::default().dir(
            "/root",
            &[("a.txt", false), ("b.png", false), ("docs", true)],
        );
        let picker = PickerBuilder::new(SelectMode::OpenFile)
            .start_dir("/root")
            .filter(("Text", &["txt"]))
            .build_with_fs(Box::new(fs));

        let names: Vec<_> = picker.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Up", "docs", "a.txt"]);
    }

    #[test]
    fn saved_state_round_trip_resumes_a_pending_confirmation() {
        let make_fs = || TestFs::default().dir("/root", &[("out.txt", false)]);

        let mut picker = PickerBuilder::new(SelectMode::SaveFile)
            .start_dir("/root")
            .build_with_fs(Box::new(make_fs()));
        picker.commit("/root/out.txt").unwrap();

        let text = picker.saved_state().serialize_compact();
        let saved = SavedState::deserialize_compact(&text).unwrap();

        let mut resumed = PickerBuilder::new(SelectMode::SaveFile)
            .restore_with_fs(saved, Box::new(make_fs()));

        assert_eq!(resumed.current_path(), Path::new("/root"));
        assert_eq!(
            resumed.pending_confirmation(),
            Some(Path::new("/root/out.txt"))
        );
        // The outstanding question is re-announced for the rendering layer.
        assert!(resumed.take_events().contains(&PickerEvent::ConfirmationRequested {
            path: PathBuf::from("/root/out.txt")
        }));

        resumed.resolve_confirmation(true).unwrap();
        assert_eq!(
            resumed.outcome(),
            Some(&Outcome::Selected(PathBuf::from("/root/out.txt")))
        );
    }

    #[test]
    fn selection_emits_a_single_handler_call_and_event() {
        let calls = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&calls);
        let mut picker = PickerBuilder::new(SelectMode::OpenFile)
            .start_dir("/root")
            .on_selected(move |_| *sink.borrow_mut() += 1)
            .build_with_fs(Box::new(sample_tree()));
        picker.take_events();

        picker.commit("/root/a.txt").unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(
            picker.take_events(),
            vec![PickerEvent::Outcome(Outcome::Selected(PathBuf::from(
                "/root/a.txt"
            )))]
        );
    }
}
