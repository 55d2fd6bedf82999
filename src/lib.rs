#![deny(missing_docs)]
//! Embeddable file/folder selection core.
//!
//! Drives a mode-fixed picking session — open a file, pick a folder, or
//! choose a save target — over a pluggable [`FileSystem`], terminating in
//! exactly one [`Outcome`] per controller. Rendering is external: listings,
//! state-change [`PickerEvent`]s and the overwrite question are plain data
//! for any UI layer to present.
//!
//! The three modes share navigation but diverge in filtering, acceptance and
//! click semantics:
//! - [`SelectMode::OpenFile`] lists everything; activating a file selects it
//!   when it is a readable regular file.
//! - [`SelectMode::OpenFolder`] lists folders only; activation always
//!   navigates, and an explicit [`PickerController::commit`] of the current
//!   directory selects it.
//! - [`SelectMode::SaveFile`] lists everything; activating a file fills the
//!   pending filename, and committing an existing target suspends the picker
//!   on an overwrite confirmation resolved via
//!   [`PickerController::resolve_confirmation`].
//!
//! ```
//! use file_select::{PickerBuilder, SelectMode};
//!
//! let mut picker = PickerBuilder::new(SelectMode::OpenFile)
//!     .filter(("Images", &["png", "jpg"]))
//!     .on_selected(|path| println!("picked {}", path.display()))
//!     .build();
//! for event in picker.take_events() {
//!     // hand to the rendering layer
//!     let _ = event;
//! }
//! ```

mod controller;
mod core;
mod events;
mod fs;
mod lister;
mod mode;
mod saved;

pub use controller::{
    CancelledHandler, PickerBuilder, PickerController, SelectedHandler, UpNavigation,
};
pub use core::{CancelNotice, ExtensionFilter, Outcome, RejectReason, SelectError, SelectMode};
pub use events::PickerEvent;
pub use fs::{FileSystem, FsEntry, FsMetadata, StdFileSystem};
pub use lister::{Entry, EntryKind, list_directory};
pub use mode::Acceptance;
pub use saved::{SavedState, SavedStateError};
