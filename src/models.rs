use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ActionError;

/// Slug (or server id) of a story, verse or creator.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize)]
pub struct TargetId(pub String);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Story,
    Verse,
    Creator,
}

impl TargetKind {
    /// Collection segment used in item URLs. Creators are addressed by username instead.
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            TargetKind::Story => Some("stories"),
            TargetKind::Verse => Some("verses"),
            TargetKind::Creator => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Save,
    Follow,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Like => "like",
            ActionKind::Save => "save",
            ActionKind::Follow => "follow",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub liked: bool,
    pub saved: bool,
    pub following: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub likes: u64,
    pub saves: u64,
    pub shares: u64,
    pub comments: u64,
    pub followers: u64,
}

/// Identifies what a toggle acts on, for dedup and for projecting results into lists.
///
/// Follows act on the creator, so every item by the same creator shares one key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum TargetKey {
    Item(TargetKind, TargetId),
    Creator(String),
}

impl TargetKey {
    /// The identifier placed in the request path.
    pub fn identifier(&self) -> &str {
        match self {
            TargetKey::Item(_, id) => &id.0,
            TargetKey::Creator(username) => username,
        }
    }
}

/// A story, verse or creator as rendered with its interaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionTarget {
    pub id: Option<TargetId>,
    pub kind: TargetKind,
    /// Username of the creator, which is what a follow acts on.
    pub owner: Option<String>,
    pub flags: Flags,
    pub counts: Counts,
}

impl InteractionTarget {
    pub fn new(kind: TargetKind, id: impl Into<String>) -> Self {
        Self {
            id: Some(TargetId(id.into())),
            kind,
            owner: None,
            flags: Flags::default(),
            counts: Counts::default(),
        }
    }

    pub fn with_owner(mut self, username: impl Into<String>) -> Self {
        self.owner = Some(username.into());
        self
    }

    pub fn flag(&self, action: ActionKind) -> bool {
        match action {
            ActionKind::Like => self.flags.liked,
            ActionKind::Save => self.flags.saved,
            ActionKind::Follow => self.flags.following,
        }
    }

    pub fn count(&self, action: ActionKind) -> u64 {
        match action {
            ActionKind::Like => self.counts.likes,
            ActionKind::Save => self.counts.saves,
            ActionKind::Follow => self.counts.followers,
        }
    }

    /// Sets a flag together with its paired count.
    pub fn set(&mut self, action: ActionKind, flag: bool, count: u64) {
        match action {
            ActionKind::Like => {
                self.flags.liked = flag;
                self.counts.likes = count;
            }
            ActionKind::Save => {
                self.flags.saved = flag;
                self.counts.saves = count;
            }
            ActionKind::Follow => {
                self.flags.following = flag;
                self.counts.followers = count;
            }
        }
    }

    /// Resolves the key a toggle of `action` acts on.
    pub fn key(&self, action: ActionKind) -> Result<TargetKey, ActionError> {
        let resolved = match action {
            ActionKind::Follow => self
                .owner
                .as_ref()
                .filter(|username| !username.is_empty())
                .map(|username| TargetKey::Creator(username.clone())),
            ActionKind::Like | ActionKind::Save => self
                .id
                .as_ref()
                .filter(|id| !id.0.is_empty() && self.kind.collection().is_some())
                .map(|id| TargetKey::Item(self.kind, id.clone())),
        };
        resolved.ok_or(ActionError::MissingIdentifier)
    }
}

/// The flag/count pair a toggle moves to when `previous` is flipped locally.
pub fn flipped(previous_flag: bool, previous_count: u64) -> (bool, u64) {
    if previous_flag {
        (false, previous_count.saturating_sub(1))
    } else {
        (true, previous_count.saturating_add(1))
    }
}

/// Snapshot taken when a toggle starts, used for rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub key: TargetKey,
    pub action: ActionKind,
    pub previous_flag: bool,
    pub previous_count: u64,
    pub desired_flag: bool,
    pub optimistic_count: u64,
}

impl PendingToggle {
    pub fn optimistic(&self) -> ToggleOutcome {
        ToggleOutcome {
            key: self.key.clone(),
            action: self.action,
            flag: self.desired_flag,
            count: self.optimistic_count,
        }
    }

    pub fn rollback(&self) -> ToggleOutcome {
        ToggleOutcome {
            key: self.key.clone(),
            action: self.action,
            flag: self.previous_flag,
            count: self.previous_count,
        }
    }
}

/// Final `{flag, count}` of a toggle. Doubles as the patch applied by list projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub key: TargetKey,
    pub action: ActionKind,
    pub flag: bool,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moment {
    pub id: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub target: InteractionTarget,
    pub story_slug: Option<String>,
    pub position: u32,
    pub content: Option<String>,
    pub moments: Vec<Moment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub target: InteractionTarget,
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub verses: Vec<Verse>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn slug(&self) -> Option<&str> {
        self.target.id.as_ref().map(|id| id.0.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    /// `owner` carries the username.
    pub target: InteractionTarget,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Creator {
    pub fn username(&self) -> &str {
        self.target.owner.as_deref().unwrap_or_default()
    }
}
