pub mod reconcile;
pub mod session;
pub mod store;

use std::collections::VecDeque;

use log::debug;

use crate::io::gateway::{GatewayError, OrderGateway};
use crate::model::profile::{OrderBatch, Profile, unix_now};
use reconcile::{Command, Reconciler};
use session::{CancelReason, DragController, DropOutcome};
use store::ProfileStore;

// ---- Dock ----

/// What a finished drag gesture amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDisposition {
    /// Validation rejected the drop; nothing changed.
    Cancelled(CancelReason),
    /// The new order is applied and persisted.
    Saved,
    /// The save failed and the canonical order was reloaded instead.
    Reverted,
}

/// The ordering engine behind a profile list: store, drag session, and
/// reconciler wired to one persistence gateway.
///
/// `drag_end` drives dispatched commands to completion before it
/// returns, which suits a one-shot host. Event-driven hosts can hold
/// `ProfileStore`, `DragController`, and `Reconciler` directly and pump
/// commands on their own schedule.
pub struct Dock<G: OrderGateway> {
    store: ProfileStore,
    drag: DragController,
    reconciler: Reconciler,
    gateway: G,
}

impl<G: OrderGateway> Dock<G> {
    /// Load the canonical profile set and wrap it in an engine.
    pub fn open(mut gateway: G) -> Result<Self, GatewayError> {
        let profiles = gateway.load_all()?;
        Ok(Dock {
            store: ProfileStore::from_profiles(profiles),
            drag: DragController::new(),
            reconciler: Reconciler::new(),
            gateway,
        })
    }

    /// Snapshot of every profile in display order.
    pub fn current_order(&self) -> Vec<Profile> {
        self.store.display_order()
    }

    /// Begin a drag gesture. Returns false for unknown profiles.
    pub fn drag_start(&mut self, id: &str) -> bool {
        self.drag.begin(&self.store, id)
    }

    /// Finish the gesture dragging `id` over `over`. A validation
    /// failure cancels with nothing changed; a failed save reverts to
    /// canonical state. Only a failing reload surfaces an error.
    pub fn drag_end(
        &mut self,
        id: &str,
        over: Option<&str>,
    ) -> Result<MoveDisposition, GatewayError> {
        if self.drag.active_origin() != Some(id) {
            debug!("drag end for {} does not match the active session", id);
            self.drag.reset();
            return Ok(MoveDisposition::Cancelled(CancelReason::NoSession));
        }
        match self.drag.end(&self.store, over) {
            DropOutcome::Cancel(reason) => {
                debug!("drag of {} cancelled: {}", id, reason);
                Ok(MoveDisposition::Cancelled(reason))
            }
            DropOutcome::Commit(request) => {
                let commands = self.reconciler.commit(&mut self.store, &request, unix_now());
                let reverted = self.run_commands(commands)?;
                Ok(if reverted {
                    MoveDisposition::Reverted
                } else {
                    MoveDisposition::Saved
                })
            }
        }
    }

    fn run_commands(&mut self, commands: Vec<Command>) -> Result<bool, GatewayError> {
        let mut queue: VecDeque<Command> = commands.into();
        let mut reverted = false;
        while let Some(command) = queue.pop_front() {
            match command {
                Command::Save(ticket, batch) => {
                    let result = match &batch {
                        OrderBatch::Normal(items) => self.gateway.save_normal_order(items),
                        OrderBatch::Pinned(items) => self.gateway.save_pinned_order(items),
                    };
                    queue.extend(self.reconciler.complete_save(ticket, result));
                }
                Command::Reload => {
                    let profiles = self.gateway.load_all()?;
                    self.reconciler.complete_reload(&mut self.store, profiles);
                    reverted = true;
                }
            }
        }
        Ok(reverted)
    }
}
