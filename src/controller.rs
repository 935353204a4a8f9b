use std::sync::Arc;

use log::{debug, info, warn};

use crate::api::{ContentApi, InteractionApi, ToggleRequest};
use crate::api_models::ServerState;
use crate::error::ActionError;
use crate::guard::InFlightTicket;
use crate::models::{
    flipped, ActionKind, InteractionTarget, PendingToggle, TargetKey, ToggleOutcome,
};
use crate::projection::{self, Projectable};
use crate::scope::Scope;
use crate::search::SearchResults;
use crate::session::Session;

/// Performs like, save & follow toggles with immediate local feedback.
///
/// A toggle runs in three steps. [`begin`](Self::begin) flips the flag and its
/// count synchronously, [`send`](Self::send) issues the one request for the new
/// state, and [`settle`](Self::settle) adopts the server's state or rolls the
/// target back to its snapshot. [`toggle`](Self::toggle) runs all three.
#[derive(Debug)]
pub struct ToggleController<A> {
    api: A,
    session: Arc<Session>,
    scope: Scope,
}

/// A started toggle. Dropping it, settled or not, frees the `(target, action)` pair.
/// Dropping an unsettled follow also rolls the viewer's following set back.
#[derive(Debug)]
pub struct InFlight<'c> {
    pending: PendingToggle,
    // Declared before the ticket: the follow is rolled back before the pair is freed.
    follow: Option<PendingFollow<'c>>,
    _ticket: InFlightTicket<'c>,
}

/// A follow or unfollow pending in the session's following set.
#[derive(Debug)]
struct PendingFollow<'c> {
    session: &'c Session,
    username: String,
    settled: bool,
}

impl PendingFollow<'_> {
    fn resolve(mut self, following: bool) {
        self.session.following().resolve(&self.username, following);
        self.settled = true;
    }
}

impl Drop for PendingFollow<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.following().rollback(&self.username);
        }
    }
}

impl InFlight<'_> {
    pub fn pending(&self) -> &PendingToggle {
        &self.pending
    }

    pub fn request(&self) -> ToggleRequest {
        ToggleRequest {
            key: self.pending.key.clone(),
            action: self.pending.action,
            desired: self.pending.desired_flag,
        }
    }
}

impl<A> ToggleController<A> {
    /// Requests are tied to a child of the session's scope.
    pub fn new(api: A, session: Arc<Session>) -> Self {
        let scope = session.scope().child();
        ToggleController {
            api,
            session,
            scope,
        }
    }

    /// Ties requests to `scope` instead, e.g. the view that renders the targets.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl<A: InteractionApi> ToggleController<A> {
    /// Flips `action` on `target` and snapshots the state before it.
    ///
    /// Nothing is mutated when this fails.
    pub fn begin(
        &self,
        target: &mut InteractionTarget,
        action: ActionKind,
    ) -> Result<InFlight<'_>, ActionError> {
        if !self.session.is_authenticated() {
            return Err(ActionError::Unauthenticated);
        }
        if self.scope.is_cancelled() {
            return Err(ActionError::Cancelled);
        }
        let key = target.key(action)?;
        let Some(ticket) = self.session.in_flight().ticket(&key, action) else {
            debug!("Ignoring {action} of {}: already in flight", key.identifier());
            return Err(ActionError::InFlight(action));
        };

        let (previous_flag, follow) = match &key {
            TargetKey::Creator(username) => {
                let was_following = self
                    .session
                    .following()
                    .begin(username)
                    .ok_or(ActionError::InFlight(action))?;
                let follow = PendingFollow {
                    session: &self.session,
                    username: username.clone(),
                    settled: false,
                };
                (was_following, Some(follow))
            }
            TargetKey::Item(..) => (target.flag(action), None),
        };
        let previous_count = target.count(action);
        let (desired_flag, optimistic_count) = flipped(previous_flag, previous_count);
        target.set(action, desired_flag, optimistic_count);

        Ok(InFlight {
            pending: PendingToggle {
                key,
                action,
                previous_flag,
                previous_count,
                desired_flag,
                optimistic_count,
            },
            follow,
            _ticket: ticket,
        })
    }

    /// Issues the request, unless the scope is cancelled first.
    pub async fn send(&self, in_flight: &InFlight<'_>) -> Result<ServerState, ActionError> {
        tokio::select! {
            biased;
            _ = self.scope.cancelled() => Err(ActionError::Cancelled),
            response = self.api.send_toggle(in_flight.request()) => response,
        }
    }

    /// Applies the response to `target`: the server's state on success, the
    /// snapshot on any failure.
    pub fn settle(
        &self,
        in_flight: InFlight<'_>,
        target: &mut InteractionTarget,
        response: Result<ServerState, ActionError>,
    ) -> Result<ToggleOutcome, ActionError> {
        let InFlight {
            pending,
            follow,
            _ticket,
        } = in_flight;
        let response = match response {
            Ok(_) if self.scope.is_cancelled() => Err(ActionError::Cancelled),
            response => response,
        };

        match response {
            Ok(server) => {
                let outcome = reconcile(&pending, server);
                target.set(outcome.action, outcome.flag, outcome.count);
                if let Some(follow) = follow {
                    follow.resolve(outcome.flag);
                }
                info!(
                    "Reconciled {} of {}: {} ({})",
                    outcome.action,
                    outcome.key.identifier(),
                    outcome.flag,
                    outcome.count
                );
                Ok(outcome)
            }
            Err(error) => {
                target.set(pending.action, pending.previous_flag, pending.previous_count);
                drop(follow);
                warn!(
                    "Rolled back {} of {}: {}",
                    pending.action,
                    pending.key.identifier(),
                    error
                );
                Err(error)
            }
        }
    }

    pub async fn toggle(
        &self,
        target: &mut InteractionTarget,
        action: ActionKind,
    ) -> Result<ToggleOutcome, ActionError> {
        let in_flight = self.begin(target, action)?;
        let response = self.send(&in_flight).await;
        self.settle(in_flight, target, response)
    }

    /// Like [`toggle`](Self::toggle), also keeping every list that renders the
    /// target in step: the optimistic state right away, then the settled one.
    pub async fn toggle_projected<T: Projectable>(
        &self,
        target: &mut InteractionTarget,
        action: ActionKind,
        lists: &mut [&mut Vec<Arc<T>>],
    ) -> Result<ToggleOutcome, ActionError> {
        self.toggle_projected_with(target, action, |patch| {
            projection::project(&mut *lists, patch);
        })
        .await
    }

    /// Like [`toggle_projected`](Self::toggle_projected) for lists of several
    /// element types: `apply` is called with the optimistic patch, then with the
    /// settled or rolled back one.
    pub async fn toggle_projected_with<F>(
        &self,
        target: &mut InteractionTarget,
        action: ActionKind,
        mut apply: F,
    ) -> Result<ToggleOutcome, ActionError>
    where
        F: FnMut(&ToggleOutcome),
    {
        let in_flight = self.begin(target, action)?;
        apply(&in_flight.pending().optimistic());
        let response = self.send(&in_flight).await;
        let rollback = in_flight.pending().rollback();
        let settled = self.settle(in_flight, target, response);
        match &settled {
            Ok(outcome) => apply(outcome),
            Err(_) => apply(&rollback),
        }
        settled
    }
}

/// Server values win when present. A missing count follows whichever flag was kept.
fn reconcile(pending: &PendingToggle, server: ServerState) -> ToggleOutcome {
    let flag = server.flag.unwrap_or(pending.desired_flag);
    let count = server.count.unwrap_or(if flag == pending.desired_flag {
        pending.optimistic_count
    } else {
        pending.previous_count
    });
    ToggleOutcome {
        key: pending.key.clone(),
        action: pending.action,
        flag,
        count,
    }
}

impl<A: ContentApi> ToggleController<A> {
    /// Loads the viewer's following set. Signed-out viewers follow nobody.
    pub async fn hydrate_following(&self) -> Result<usize, ActionError> {
        if !self.session.is_authenticated() {
            return Ok(0);
        }
        let usernames = tokio::select! {
            biased;
            _ = self.scope.cancelled() => return Err(ActionError::Cancelled),
            usernames = self.api.following() => usernames?,
        };
        let count = usernames.len();
        self.session.hydrate_following(usernames);
        Ok(count)
    }

    /// Searches, deriving creators' follow state from the session.
    pub async fn search(&self, query: &str) -> Result<SearchResults, ActionError> {
        let mut results = tokio::select! {
            biased;
            _ = self.scope.cancelled() => return Err(ActionError::Cancelled),
            results = self.api.search(query) => results?,
        };
        results.seed_following(&self.session.following());
        Ok(results)
    }

    /// Deletes a story, then drops it from every list. Lists are untouched on failure.
    pub async fn delete_story<T: Projectable>(
        &self,
        slug: &str,
        lists: &mut [&mut Vec<Arc<T>>],
    ) -> Result<usize, ActionError> {
        if !self.session.is_authenticated() {
            return Err(ActionError::Unauthenticated);
        }
        if slug.is_empty() {
            return Err(ActionError::MissingIdentifier);
        }
        tokio::select! {
            biased;
            _ = self.scope.cancelled() => return Err(ActionError::Cancelled),
            deleted = self.api.delete_story(slug) => deleted?,
        };
        let removed = projection::remove_story(lists, slug);
        info!("Deleted story {slug}, removed {removed} entries");
        Ok(removed)
    }
}
