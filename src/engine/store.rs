use indexmap::IndexMap;

use crate::model::profile::{OrderBatch, OrderGroup, Placement, Profile};
use crate::ops::order;

// ---- ProfileStore ----

/// Owned in-memory set of profiles, the single source of truth for
/// rendering between loads.
///
/// Readers get cloned snapshots. Rank rewrites go through `apply_order`,
/// which only touches profiles already in the batch's group, so a batch
/// can never flip a profile between groups or move the default entry.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: IndexMap<String, Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        ProfileStore {
            profiles: IndexMap::new(),
        }
    }

    pub fn from_profiles(profiles: Vec<Profile>) -> Self {
        let mut store = ProfileStore::new();
        store.replace_all(profiles);
        store
    }

    /// Swap in a freshly loaded canonical set, dropping everything held.
    pub fn replace_all(&mut self, profiles: Vec<Profile>) {
        self.profiles = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.get(id)
    }

    /// Cloned snapshot of every profile in display order.
    pub fn display_order(&self) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self.profiles.values().cloned().collect();
        order::sort_display(&mut profiles);
        profiles
    }

    /// Ids of one reorderable group in display order.
    pub fn group_ids(&self, group: OrderGroup) -> Vec<String> {
        order::group_ids(self.profiles.values(), group)
    }

    /// Rewrite ranks from a full-group batch. Items naming a profile
    /// that is missing or no longer in the batch's group are skipped.
    /// Returns how many profiles were rewritten.
    pub fn apply_order(&mut self, batch: &OrderBatch) -> usize {
        let mut applied = 0;
        match batch {
            OrderBatch::Normal(items) => {
                for item in items {
                    if let Some(profile) = self.profiles.get_mut(&item.id)
                        && matches!(profile.placement, Placement::Normal { .. })
                    {
                        profile.placement = Placement::Normal {
                            sort_order: item.sort_order,
                        };
                        applied += 1;
                    }
                }
            }
            OrderBatch::Pinned(items) => {
                for item in items {
                    if let Some(profile) = self.profiles.get_mut(&item.id)
                        && matches!(profile.placement, Placement::Pinned { .. })
                    {
                        profile.placement = Placement::Pinned {
                            pinned_at: item.pinned_at,
                        };
                        applied += 1;
                    }
                }
            }
        }
        applied
    }
}
