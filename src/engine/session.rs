use std::fmt;

use log::debug;

use crate::engine::store::ProfileStore;
use crate::model::profile::{Group, OrderGroup};

// ---- Drop outcomes ----

/// Why a drop was rejected instead of committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// No drag session was active.
    NoSession,
    /// The gesture ended outside any drop target.
    NoTarget,
    /// The profile was dropped on itself.
    SameProfile,
    /// The dragged profile vanished mid-drag.
    UnknownOrigin,
    /// The default entry cannot be dragged.
    DefaultOrigin,
    /// The drop target is not in the store.
    UnknownTarget,
    /// Nothing can be dropped onto the default entry.
    DefaultTarget,
    /// Pinned and normal profiles cannot be reordered across groups.
    GroupMismatch,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CancelReason::NoSession => "no active drag",
            CancelReason::NoTarget => "no drop target",
            CancelReason::SameProfile => "dropped on itself",
            CancelReason::UnknownOrigin => "dragged profile no longer exists",
            CancelReason::DefaultOrigin => "the default entry cannot be moved",
            CancelReason::UnknownTarget => "drop target no longer exists",
            CancelReason::DefaultTarget => "cannot drop onto the default entry",
            CancelReason::GroupMismatch => "pinned and unpinned profiles cannot be mixed",
        };
        write!(f, "{}", msg)
    }
}

/// A validated reorder, ready for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub group: OrderGroup,
    pub origin_id: String,
    pub target_id: String,
}

/// Result of ending a drag session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Commit(MoveRequest),
    Cancel(CancelReason),
}

// ---- DragController ----

#[derive(Debug, Clone, PartialEq, Eq)]
enum Session {
    Idle,
    Active { origin_id: String, origin_group: Group },
}

/// Tracks the single interactive move gesture.
///
/// The origin's group is captured when the drag starts and never
/// re-evaluated, so an edit landing mid-drag cannot silently change what
/// the gesture means; the drop is cancelled instead.
#[derive(Debug)]
pub struct DragController {
    session: Session,
}

impl Default for DragController {
    fn default() -> Self {
        DragController::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        DragController {
            session: Session::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.session, Session::Active { .. })
    }

    pub fn active_origin(&self) -> Option<&str> {
        match &self.session {
            Session::Active { origin_id, .. } => Some(origin_id),
            Session::Idle => None,
        }
    }

    /// Begin a drag on `id`. Unknown profiles are ignored and the
    /// controller stays idle. At most one session can be active;
    /// starting a second is a caller bug.
    pub fn begin(&mut self, store: &ProfileStore, id: &str) -> bool {
        debug_assert!(!self.is_active(), "drag began while another is active");
        let Some(profile) = store.get(id) else {
            debug!("drag start ignored: unknown profile {}", id);
            return false;
        };
        self.session = Session::Active {
            origin_id: profile.id.clone(),
            origin_group: profile.group(),
        };
        true
    }

    /// Abandon any active session without validating a drop.
    pub fn reset(&mut self) {
        self.session = Session::Idle;
    }

    /// End the active session over `over`. The controller returns to
    /// idle no matter how validation goes.
    pub fn end(&mut self, store: &ProfileStore, over: Option<&str>) -> DropOutcome {
        let session = std::mem::replace(&mut self.session, Session::Idle);
        let Session::Active {
            origin_id,
            origin_group,
        } = session
        else {
            return DropOutcome::Cancel(CancelReason::NoSession);
        };
        let Some(target_id) = over else {
            return DropOutcome::Cancel(CancelReason::NoTarget);
        };
        if target_id == origin_id {
            return DropOutcome::Cancel(CancelReason::SameProfile);
        }
        if store.get(&origin_id).is_none() {
            return DropOutcome::Cancel(CancelReason::UnknownOrigin);
        }
        let Some(group) = origin_group.order_group() else {
            return DropOutcome::Cancel(CancelReason::DefaultOrigin);
        };
        let Some(target) = store.get(target_id) else {
            return DropOutcome::Cancel(CancelReason::UnknownTarget);
        };
        if target.is_default() {
            return DropOutcome::Cancel(CancelReason::DefaultTarget);
        }
        if target.group() != origin_group {
            return DropOutcome::Cancel(CancelReason::GroupMismatch);
        }
        DropOutcome::Commit(MoveRequest {
            group,
            origin_id,
            target_id: target_id.to_string(),
        })
    }
}
