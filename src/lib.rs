mod api;
mod api_models;
mod config;
mod controller;
mod error;
mod follow;
mod guard;
mod models;
mod projection;
mod scope;
mod search;
mod session;

pub use api::{ContentApi, FeedPage, HttpApi, InteractionApi, ToggleRequest};
pub use api_models::ServerState;
pub use config::Config;
pub use controller::{InFlight, ToggleController};
pub use error::{ActionError, ConfigError};
pub use follow::{FollowState, FollowingSet};
pub use guard::{InFlightGuard, InFlightTicket};
pub use models::{
    ActionKind, Counts, Creator, Flags, InteractionTarget, Moment, PendingToggle, Story, TargetId,
    TargetKey, TargetKind, ToggleOutcome, Verse,
};
pub use projection::{project, project_list, remove_story, Projectable};
pub use scope::Scope;
pub use search::{paginate, Page, SearchResults};
pub use session::Session;
