use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;

use crate::config::Config;
use crate::follow::FollowingSet;
use crate::guard::InFlightGuard;
use crate::scope::Scope;

/// State scoped to one signed-in (or signed-out) viewer.
///
/// Share it by `Arc` with every controller acting for the viewer; ending the
/// session cancels every request still in flight on its behalf.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    following: Mutex<FollowingSet>,
    in_flight: InFlightGuard,
    scope: Scope,
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(token: impl Into<String>) -> Self {
        Session {
            token: Some(token.into()).filter(|token: &String| !token.is_empty()),
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.auth_token {
            Some(token) => Self::signed_in(token.clone()),
            None => Self::signed_out(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn following(&self) -> MutexGuard<'_, FollowingSet> {
        self.following.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn hydrate_following<I, S>(&self, usernames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut following = self.following();
        following.hydrate(usernames);
        info!("Following {} creators", following.len());
    }

    pub fn in_flight(&self) -> &InFlightGuard {
        &self.in_flight
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Signs out: cancels everything still in flight for this viewer.
    pub fn end(&self) {
        self.scope.cancel();
    }
}
