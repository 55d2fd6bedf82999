use std::path::PathBuf;

use crate::core::{Outcome, RejectReason};

/// Declarative state-change notifications for a rendering layer.
///
/// Operations queue events; [`crate::PickerController::take_events`] drains
/// them. Events carry plain data only, so the rendering layer stays fully
/// external to the picker and the picker stays testable without one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerEvent {
    /// The current directory, and with it the listing, changed.
    NavigationChanged {
        /// New current directory.
        path: PathBuf,
    },
    /// An overwrite question is now pending on `path`; the picker accepts no
    /// input other than the answer until it is resolved.
    ConfirmationRequested {
        /// Candidate save target.
        path: PathBuf,
    },
    /// A candidate was refused; display the reason and keep browsing.
    Rejected {
        /// Why the candidate was refused.
        reason: RejectReason,
    },
    /// A pending overwrite was declined. Emitted only when the
    /// notify-on-decline policy is set on the builder.
    OverwriteDeclined {
        /// The candidate that will not be overwritten.
        path: PathBuf,
    },
    /// The picker reached its terminal outcome.
    Outcome(Outcome),
}
