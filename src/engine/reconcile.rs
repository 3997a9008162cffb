use log::{debug, warn};

use crate::engine::session::MoveRequest;
use crate::engine::store::ProfileStore;
use crate::io::gateway::GatewayError;
use crate::model::profile::{OrderBatch, OrderGroup, Profile};
use crate::ops::order;

// ---- Commands ----

/// Opaque handle pairing a dispatched save with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(u64);

/// Gateway work the host must carry out for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Persist the batch, then report the result via `complete_save`.
    Save(SaveTicket, OrderBatch),
    /// Load the canonical set, then hand it to `complete_reload`.
    Reload,
}

#[derive(Debug, Default)]
struct GroupSlot {
    in_flight: Option<SaveTicket>,
    queued: Option<OrderBatch>,
}

// ---- Reconciler ----

/// Turns committed moves into optimistic store updates plus gateway
/// work, and settles that work as completions arrive.
///
/// Saves are serialized per group: one save in flight at most, and a
/// commit made meanwhile parks its batch in the group's single queue
/// slot, replacing anything already parked there. A full-group batch
/// subsumes every older one, so nothing is lost by the replacement.
/// Any save failure throws away parked work and asks for one reload;
/// until the reload lands, further commits stay local to the store.
#[derive(Debug, Default)]
pub struct Reconciler {
    next_ticket: u64,
    normal: GroupSlot,
    pinned: GroupSlot,
    reload_pending: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler::default()
    }

    /// True when no save or reload is outstanding.
    pub fn is_settled(&self) -> bool {
        !self.reload_pending
            && self.normal.in_flight.is_none()
            && self.normal.queued.is_none()
            && self.pinned.in_flight.is_none()
            && self.pinned.queued.is_none()
    }

    /// Commit a validated move: recompute the whole group's ranks,
    /// apply them to the store, and return the commands to dispatch.
    pub fn commit(
        &mut self,
        store: &mut ProfileStore,
        request: &MoveRequest,
        now: u64,
    ) -> Vec<Command> {
        let mut ids = store.group_ids(request.group);
        if !order::move_id(&mut ids, &request.origin_id, &request.target_id) {
            warn!(
                "move dropped: {} or {} left the {} group",
                request.origin_id, request.target_id, request.group
            );
            return Vec::new();
        }
        let batch = match request.group {
            OrderGroup::Normal => OrderBatch::Normal(order::reindex_normal(&ids)),
            OrderGroup::Pinned => OrderBatch::Pinned(order::stamp_pinned(&ids, now)),
        };
        store.apply_order(&batch);
        self.enqueue(batch)
    }

    fn enqueue(&mut self, batch: OrderBatch) -> Vec<Command> {
        let group = batch.group();
        if self.reload_pending {
            debug!("reload pending, {} order batch not persisted", group);
            return Vec::new();
        }
        if self.slot(group).in_flight.is_some() {
            let slot = self.slot_mut(group);
            if slot.queued.is_some() {
                debug!("queued {} order batch superseded by a newer one", group);
            }
            slot.queued = Some(batch);
            return Vec::new();
        }
        let ticket = self.take_ticket();
        self.slot_mut(group).in_flight = Some(ticket);
        vec![Command::Save(ticket, batch)]
    }

    /// Settle a dispatched save. On success the group's parked batch,
    /// if any, is promoted into a fresh save.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), GatewayError>,
    ) -> Vec<Command> {
        let Some(group) = self.group_of(ticket) else {
            debug!("ignoring completion for stale save ticket {:?}", ticket);
            return Vec::new();
        };
        self.slot_mut(group).in_flight = None;

        match result {
            Ok(()) => {
                if self.reload_pending {
                    return Vec::new();
                }
                match self.slot_mut(group).queued.take() {
                    Some(batch) => self.enqueue(batch),
                    None => Vec::new(),
                }
            }
            Err(e) => {
                warn!("{} order save failed: {}", group, e);
                if self.reload_pending {
                    return Vec::new();
                }
                self.normal.queued = None;
                self.pinned.queued = None;
                self.reload_pending = true;
                vec![Command::Reload]
            }
        }
    }

    /// Install a freshly loaded canonical set. Anything optimistic that
    /// had not been persisted is gone after this.
    pub fn complete_reload(&mut self, store: &mut ProfileStore, profiles: Vec<Profile>) {
        let dropped_normal = self.normal.queued.take().is_some();
        let dropped_pinned = self.pinned.queued.take().is_some();
        if dropped_normal || dropped_pinned {
            debug!("parked order batches dropped by reload");
        }
        self.reload_pending = false;
        store.replace_all(profiles);
    }

    fn take_ticket(&mut self) -> SaveTicket {
        self.next_ticket += 1;
        SaveTicket(self.next_ticket)
    }

    fn group_of(&self, ticket: SaveTicket) -> Option<OrderGroup> {
        if self.normal.in_flight == Some(ticket) {
            Some(OrderGroup::Normal)
        } else if self.pinned.in_flight == Some(ticket) {
            Some(OrderGroup::Pinned)
        } else {
            None
        }
    }

    fn slot(&self, group: OrderGroup) -> &GroupSlot {
        match group {
            OrderGroup::Normal => &self.normal,
            OrderGroup::Pinned => &self.pinned,
        }
    }

    fn slot_mut(&mut self, group: OrderGroup) -> &mut GroupSlot {
        match group {
            OrderGroup::Normal => &mut self.normal,
            OrderGroup::Pinned => &mut self.pinned,
        }
    }
}
