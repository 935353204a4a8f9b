#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use versefeed::{
    ActionError, ContentApi, FeedPage, InteractionApi, InteractionTarget, SearchResults,
    ServerState, Story, TargetKind, ToggleRequest, Verse,
};

#[derive(Debug, Clone)]
pub enum Reply {
    State(ServerState),
    Status(u16),
    /// Never answers.
    Hang,
}

pub fn state(flag: bool, count: u64) -> Reply {
    Reply::State(ServerState {
        flag: Some(flag),
        count: Some(count),
    })
}

#[derive(Default)]
struct Script {
    calls: Vec<ToggleRequest>,
    replies: VecDeque<Reply>,
    following: Vec<String>,
    search: Option<SearchResults>,
    deleted: Vec<String>,
    delete_status: Option<u16>,
}

/// In-memory API answering from a script. Each toggle call can be held at a gate.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    script: Arc<Mutex<Script>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedApi {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let api = ScriptedApi::default();
        api.script.lock().unwrap().replies.extend(replies);
        api
    }

    /// Every toggle request waits for one `notify_one` on the returned gate.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn with_following(self, usernames: &[&str]) -> Self {
        self.script.lock().unwrap().following = usernames.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn with_search(self, results: SearchResults) -> Self {
        self.script.lock().unwrap().search = Some(results);
        self
    }

    pub fn failing_deletes(self, status: u16) -> Self {
        self.script.lock().unwrap().delete_status = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<ToggleRequest> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.script.lock().unwrap().deleted.clone()
    }
}

impl InteractionApi for ScriptedApi {
    async fn send_toggle(&self, request: ToggleRequest) -> Result<ServerState, ActionError> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(request);
            script.replies.pop_front().unwrap_or(Reply::Status(500))
        };
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match reply {
            Reply::State(state) => Ok(state),
            Reply::Status(status) => Err(ActionError::Status(status)),
            Reply::Hang => std::future::pending().await,
        }
    }
}

impl ContentApi for ScriptedApi {
    async fn search(&self, _query: &str) -> Result<SearchResults, ActionError> {
        Ok(self.script.lock().unwrap().search.clone().unwrap_or_default())
    }

    async fn feed_page(&self, _page: u32) -> Result<FeedPage, ActionError> {
        Ok(FeedPage::default())
    }

    async fn following(&self) -> Result<Vec<String>, ActionError> {
        Ok(self.script.lock().unwrap().following.clone())
    }

    async fn delete_story(&self, slug: &str) -> Result<(), ActionError> {
        let mut script = self.script.lock().unwrap();
        match script.delete_status {
            Some(status) => Err(ActionError::Status(status)),
            None => {
                script.deleted.push(slug.to_owned());
                Ok(())
            }
        }
    }
}

pub fn story(slug: &str, owner: &str) -> Story {
    Story {
        target: InteractionTarget::new(TargetKind::Story, slug).with_owner(owner),
        title: slug.to_owned(),
        description: String::new(),
        cover_image: None,
        verses: vec![Verse {
            target: InteractionTarget::new(TargetKind::Verse, format!("{slug}-1"))
                .with_owner(owner),
            story_slug: Some(slug.to_owned()),
            position: 1,
            content: Some("first".to_owned()),
            moments: Vec::new(),
        }],
        created_at: None,
    }
}
