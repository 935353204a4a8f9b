//! Applying toggle results to every in-memory list that renders the toggled item.
//!
//! Lists hold `Arc` entries. A patched entry is replaced by a fresh `Arc`; every
//! other entry keeps its pointer, so views can skip re-rendering by `Arc::ptr_eq`.

use std::sync::Arc;

use crate::models::{
    Creator, InteractionTarget, Story, TargetKey, TargetKind, ToggleOutcome, Verse,
};

pub trait Projectable: Clone {
    fn target(&self) -> &InteractionTarget;
    fn target_mut(&mut self) -> &mut InteractionTarget;

    /// Whether applying `patch` would change this entry.
    fn is_stale(&self, patch: &ToggleOutcome) -> bool {
        is_stale(self.target(), patch)
    }

    fn apply(&mut self, patch: &ToggleOutcome) {
        apply(self.target_mut(), patch);
    }

    /// Whether this entry goes away when the story `slug` is deleted.
    fn belongs_to_story(&self, slug: &str) -> bool {
        let target = self.target();
        target.kind == TargetKind::Story && target.id.as_ref().is_some_and(|id| id.0 == slug)
    }
}

pub fn matches(target: &InteractionTarget, key: &TargetKey) -> bool {
    match key {
        TargetKey::Item(kind, id) => target.kind == *kind && target.id.as_ref() == Some(id),
        TargetKey::Creator(username) => target.owner.as_deref() == Some(username.as_str()),
    }
}

fn is_stale(target: &InteractionTarget, patch: &ToggleOutcome) -> bool {
    matches(target, &patch.key)
        && (target.flag(patch.action) != patch.flag || target.count(patch.action) != patch.count)
}

fn apply(target: &mut InteractionTarget, patch: &ToggleOutcome) {
    if matches(target, &patch.key) {
        target.set(patch.action, patch.flag, patch.count);
    }
}

impl Projectable for InteractionTarget {
    fn target(&self) -> &InteractionTarget {
        self
    }

    fn target_mut(&mut self) -> &mut InteractionTarget {
        self
    }
}

impl Projectable for Verse {
    fn target(&self) -> &InteractionTarget {
        &self.target
    }

    fn target_mut(&mut self) -> &mut InteractionTarget {
        &mut self.target
    }

    fn belongs_to_story(&self, slug: &str) -> bool {
        self.story_slug.as_deref() == Some(slug)
    }
}

/// Stories carry their verses, so a verse patch reaches a story's embedded copy too.
impl Projectable for Story {
    fn target(&self) -> &InteractionTarget {
        &self.target
    }

    fn target_mut(&mut self) -> &mut InteractionTarget {
        &mut self.target
    }

    fn is_stale(&self, patch: &ToggleOutcome) -> bool {
        is_stale(&self.target, patch) || self.verses.iter().any(|verse| verse.is_stale(patch))
    }

    fn apply(&mut self, patch: &ToggleOutcome) {
        apply(&mut self.target, patch);
        for verse in &mut self.verses {
            verse.apply(patch);
        }
    }
}

impl Projectable for Creator {
    fn target(&self) -> &InteractionTarget {
        &self.target
    }

    fn target_mut(&mut self) -> &mut InteractionTarget {
        &mut self.target
    }
}

/// Patches the entries of one list that render `patch.key`. Returns how many were replaced.
pub fn project_list<T: Projectable>(list: &mut [Arc<T>], patch: &ToggleOutcome) -> usize {
    let mut replaced = 0;
    for entry in list.iter_mut().filter(|entry| entry.is_stale(patch)) {
        let mut updated = (**entry).clone();
        updated.apply(patch);
        *entry = Arc::new(updated);
        replaced += 1;
    }
    replaced
}

/// Patches every list. Lists without the target are left untouched.
pub fn project<T: Projectable>(
    lists: &mut [&mut Vec<Arc<T>>],
    patch: &ToggleOutcome,
) -> usize {
    lists
        .iter_mut()
        .map(|list| project_list(list.as_mut_slice(), patch))
        .sum()
}

/// Drops the deleted story, and anything belonging to it, from every list.
pub fn remove_story<T: Projectable>(lists: &mut [&mut Vec<Arc<T>>], slug: &str) -> usize {
    lists
        .iter_mut()
        .map(|list| {
            let before = list.len();
            list.retain(|entry| !entry.belongs_to_story(slug));
            before - list.len()
        })
        .sum()
}
