//! Wire shapes of the platform API. Each response is normalized here, once,
//! into the crate's domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Counts, Creator, Flags, InteractionTarget, Moment, Story, TargetId, TargetKind, Verse,
};

/// Server-reported state after a toggle. Missing fields keep the optimistic value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerState {
    pub flag: Option<bool>,
    pub count: Option<u64>,
}

fn clamp_count(count: i64) -> u64 {
    count.max(0) as u64
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ToggleBody {
    pub(crate) state: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct LikeResponse {
    pub is_liked_by_user: Option<bool>,
    pub likes_count: Option<i64>,
}

impl From<LikeResponse> for ServerState {
    fn from(value: LikeResponse) -> Self {
        ServerState {
            flag: value.is_liked_by_user,
            count: value.likes_count.map(clamp_count),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SaveResponse {
    pub is_saved_by_user: Option<bool>,
    pub saves_count: Option<i64>,
}

impl From<SaveResponse> for ServerState {
    fn from(value: SaveResponse) -> Self {
        ServerState {
            flag: value.is_saved_by_user,
            count: value.saves_count.map(clamp_count),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct FollowResponse {
    pub following: Option<bool>,
    pub followers_count: Option<i64>,
}

impl From<FollowResponse> for ServerState {
    fn from(value: FollowResponse) -> Self {
        ServerState {
            flag: value.following,
            count: value.followers_count.map(clamp_count),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreatorRecord {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub followers_count: i64,
}

impl From<CreatorRecord> for Creator {
    fn from(value: CreatorRecord) -> Self {
        let mut target = InteractionTarget::new(TargetKind::Creator, value.username.clone())
            .with_owner(value.username);
        target.counts.followers = clamp_count(value.followers_count);
        Creator {
            target,
            display_name: value.display_name,
            avatar_url: value.avatar_url,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct MomentRecord {
    pub id: serde_json::Value,
    pub image: String,
}

impl From<MomentRecord> for Moment {
    fn from(value: MomentRecord) -> Self {
        let id = match value.id {
            serde_json::Value::String(id) => id,
            other => other.to_string(),
        };
        Moment {
            id,
            image_url: value.image,
        }
    }
}

/// Interaction fields shared by story and verse records.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct InteractionRecord {
    #[serde(default)]
    pub is_liked_by_user: bool,
    #[serde(default)]
    pub is_saved_by_user: bool,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub saves_count: i64,
    #[serde(default)]
    pub shares_count: i64,
    #[serde(default)]
    pub comments_count: i64,
}

impl InteractionRecord {
    fn into_target(
        self,
        kind: TargetKind,
        slug: String,
        creator: Option<&CreatorRecord>,
    ) -> InteractionTarget {
        InteractionTarget {
            id: Some(TargetId(slug)).filter(|id| !id.0.is_empty()),
            kind,
            owner: creator.map(|creator| creator.username.clone()),
            flags: Flags {
                liked: self.is_liked_by_user,
                saved: self.is_saved_by_user,
                following: false,
            },
            counts: Counts {
                likes: clamp_count(self.likes_count),
                saves: clamp_count(self.saves_count),
                shares: clamp_count(self.shares_count),
                comments: clamp_count(self.comments_count),
                followers: creator
                    .map(|creator| clamp_count(creator.followers_count))
                    .unwrap_or_default(),
            },
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct VerseRecord {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub story_slug: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub moments: Vec<MomentRecord>,
    #[serde(default)]
    pub creator: Option<CreatorRecord>,
    #[serde(flatten)]
    pub interaction: InteractionRecord,
}

impl From<VerseRecord> for Verse {
    fn from(value: VerseRecord) -> Self {
        Verse {
            target: value
                .interaction
                .into_target(TargetKind::Verse, value.slug, value.creator.as_ref()),
            story_slug: value.story_slug,
            position: value.order,
            content: value.content,
            moments: value.moments.into_iter().map(Moment::from).collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct StoryRecord {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub creator: Option<CreatorRecord>,
    #[serde(default)]
    pub verses: Vec<VerseRecord>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub interaction: InteractionRecord,
}

impl From<StoryRecord> for Story {
    fn from(value: StoryRecord) -> Self {
        let story_slug = value.slug.clone();
        let mut verses: Vec<Verse> = value
            .verses
            .into_iter()
            .map(|record| {
                let mut verse = Verse::from(record);
                if verse.story_slug.is_none() && !story_slug.is_empty() {
                    verse.story_slug = Some(story_slug.clone());
                }
                if verse.target.owner.is_none() {
                    verse.target.owner = value.creator.as_ref().map(|c| c.username.clone());
                }
                verse
            })
            .collect();
        verses.sort_by_key(|verse| verse.position);
        Story {
            target: value
                .interaction
                .into_target(TargetKind::Story, value.slug, value.creator.as_ref()),
            title: value.title,
            description: value.description,
            cover_image: value.cover_image,
            verses,
            created_at: value.created_at,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
    #[serde(default)]
    pub verses: Vec<VerseRecord>,
    #[serde(default)]
    pub creators: Vec<CreatorRecord>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FeedPageResponse {
    #[serde(default)]
    pub results: Vec<StoryRecord>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FollowingResponse {
    #[serde(default)]
    pub usernames: Vec<String>,
}
