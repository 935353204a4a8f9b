use std::collections::{HashMap, HashSet};

use crate::models::InteractionTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    NotFollowing,
    /// A follow or unfollow request is in flight. `was_following` is the state to roll back to.
    Pending { was_following: bool },
    Following,
}

impl FollowState {
    pub fn is_pending(&self) -> bool {
        matches!(self, FollowState::Pending { .. })
    }
}

/// Usernames the viewer follows, for one session.
///
/// This is the single source of truth for follow state. Per-item `following` flags
/// are derived from it with [`FollowingSet::seed`] and never read back.
#[derive(Debug, Clone, Default)]
pub struct FollowingSet {
    /// Includes optimistic changes of pending requests.
    following: HashSet<String>,
    pending: HashMap<String, bool>,
}

impl FollowingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the set with the server's list. In-flight requests keep their optimistic value.
    pub fn hydrate<I, S>(&mut self, usernames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.following = usernames.into_iter().map(Into::into).collect();
        for (username, was_following) in &self.pending {
            if *was_following {
                self.following.remove(username);
            } else {
                self.following.insert(username.clone());
            }
        }
    }

    pub fn is_following(&self, username: &str) -> bool {
        self.following.contains(username)
    }

    pub fn state(&self, username: &str) -> FollowState {
        match self.pending.get(username) {
            Some(was_following) => FollowState::Pending {
                was_following: *was_following,
            },
            None if self.is_following(username) => FollowState::Following,
            None => FollowState::NotFollowing,
        }
    }

    pub fn len(&self) -> usize {
        self.following.len()
    }

    pub fn is_empty(&self) -> bool {
        self.following.is_empty()
    }

    /// Moves `username` to pending with the opposite state applied optimistically.
    ///
    /// Returns the state before the request, or `None` if a request is already pending.
    pub fn begin(&mut self, username: &str) -> Option<bool> {
        if self.pending.contains_key(username) {
            return None;
        }
        let was_following = self.is_following(username);
        self.pending.insert(username.to_owned(), was_following);
        self.set(username, !was_following);
        Some(was_following)
    }

    /// Settles a pending request with the state the server reported.
    pub fn resolve(&mut self, username: &str, following: bool) {
        self.pending.remove(username);
        self.set(username, following);
    }

    /// Settles a failed request, restoring the state before it.
    pub fn rollback(&mut self, username: &str) {
        if let Some(was_following) = self.pending.remove(username) {
            self.set(username, was_following);
        }
    }

    /// Derives the `following` flag of every target from the set.
    pub fn seed<'a>(&self, targets: impl IntoIterator<Item = &'a mut InteractionTarget>) {
        for target in targets {
            target.flags.following = target
                .owner
                .as_deref()
                .is_some_and(|username| self.is_following(username));
        }
    }

    fn set(&mut self, username: &str, following: bool) {
        if following {
            self.following.insert(username.to_owned());
        } else {
            self.following.remove(username);
        }
    }
}
