//! Priority ordering of preload work around the active entry

use daybook_core::Entry;

/// Ordered work for one preload pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadPlan {
    /// Active entry, then its neighbours; loaded concurrently
    pub urgent: Vec<usize>,
    /// Everything else, newest first; loaded one at a time
    pub background: Vec<usize>,
}

impl PreloadPlan {
    pub fn is_empty(&self) -> bool {
        self.urgent.is_empty() && self.background.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urgent.len() + self.background.len()
    }
}

/// Build the plan for `current`
///
/// Neighbours alternate between the playback direction (older entries,
/// lower indices) and the opposite one, `surrounding` deep on each side.
/// Entries without an image or already cached are left out.
pub fn build_plan<F>(entries: &[Entry], current: usize, surrounding: usize, is_cached: F) -> PreloadPlan
where
    F: Fn(&Entry) -> bool,
{
    let mut plan = PreloadPlan::default();
    if current >= entries.len() {
        return plan;
    }

    let mut listed = vec![false; entries.len()];
    let wanted = |idx: usize, listed: &mut [bool]| -> bool {
        if listed[idx] {
            return false;
        }
        listed[idx] = true;
        let entry = &entries[idx];
        entry.image.is_some() && !is_cached(entry)
    };

    if wanted(current, &mut listed) {
        plan.urgent.push(current);
    }

    for distance in 1..=surrounding {
        if let Some(older) = current.checked_sub(distance) {
            if wanted(older, &mut listed) {
                plan.urgent.push(older);
            }
        }
        let newer = current + distance;
        if newer < entries.len() && wanted(newer, &mut listed) {
            plan.urgent.push(newer);
        }
    }

    for idx in (0..entries.len()).rev() {
        if wanted(idx, &mut listed) {
            plan.background.push(idx);
        }
    }

    plan
}
