use std::cmp::Ordering;

use crate::model::profile::{NormalOrderItem, OrderGroup, PinnedOrderItem, Placement, Profile};

// ---------------------------------------------------------------------------
// Display order
// ---------------------------------------------------------------------------

/// Global display comparator: the default entry first, then pinned
/// profiles by `pinned_at` descending, then normal profiles by
/// `sort_order` ascending. Ties within a group fall back to `id`
/// ascending so the order is total and re-sorting is stable.
pub fn compare_display(a: &Profile, b: &Profile) -> Ordering {
    group_rank(a)
        .cmp(&group_rank(b))
        .then_with(|| match (a.placement, b.placement) {
            (Placement::Pinned { pinned_at: pa }, Placement::Pinned { pinned_at: pb }) => {
                pb.cmp(&pa)
            }
            (Placement::Normal { sort_order: sa }, Placement::Normal { sort_order: sb }) => {
                sa.cmp(&sb)
            }
            _ => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

fn group_rank(p: &Profile) -> u8 {
    match p.placement {
        Placement::Default => 0,
        Placement::Pinned { .. } => 1,
        Placement::Normal { .. } => 2,
    }
}

/// Sort profiles into display order, in place.
pub fn sort_display(profiles: &mut [Profile]) {
    profiles.sort_by(compare_display);
}

/// Ids of one reorderable group, in display order.
pub fn group_ids<'a, I>(profiles: I, group: OrderGroup) -> Vec<String>
where
    I: IntoIterator<Item = &'a Profile>,
{
    let mut members: Vec<&Profile> = profiles
        .into_iter()
        .filter(|p| p.group().order_group() == Some(group))
        .collect();
    members.sort_by(|a, b| compare_display(a, b));
    members.into_iter().map(|p| p.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Rank computation
// ---------------------------------------------------------------------------

/// Single-element list move: remove `origin_id` and reinsert it at the
/// index `target_id` occupied before the removal. Everything between the
/// two slots shifts by one. Returns false, leaving `ids` untouched, when
/// either id is missing.
pub fn move_id(ids: &mut Vec<String>, origin_id: &str, target_id: &str) -> bool {
    let Some(from) = ids.iter().position(|id| id == origin_id) else {
        return false;
    };
    let Some(to) = ids.iter().position(|id| id == target_id) else {
        return false;
    };
    if from == to {
        return true;
    }
    let moved = ids.remove(from);
    ids.insert(to, moved);
    true
}

/// Dense ranks for a normal group in its new order: `sort_order = index`.
pub fn reindex_normal(ids: &[String]) -> Vec<NormalOrderItem> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| NormalOrderItem {
            id: id.clone(),
            sort_order: index as u32,
        })
        .collect()
}

/// Recency stamps for a pinned group in its new order: the head entry
/// gets the commit-time stamp and each later entry one second less, so a
/// batch is strictly decreasing even when several reorders land within
/// the same wall-clock second.
pub fn stamp_pinned(ids: &[String], now: u64) -> Vec<PinnedOrderItem> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| PinnedOrderItem {
            id: id.clone(),
            pinned_at: now.saturating_sub(index as u64),
        })
        .collect()
}
