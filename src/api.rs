use std::future::Future;

use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::api_models::{
    FeedPageResponse, FollowResponse, FollowingResponse, LikeResponse, SaveResponse,
    SearchResponse, ServerState, ToggleBody,
};
use crate::config::Config;
use crate::error::{ActionError, ConfigError};
use crate::models::{ActionKind, Story, TargetKey};
use crate::search::SearchResults;

/// One request for the new desired state of a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest {
    pub key: TargetKey,
    pub action: ActionKind,
    pub desired: bool,
}

/// The endpoint a toggle controller talks to.
pub trait InteractionApi {
    fn send_toggle(
        &self,
        request: ToggleRequest,
    ) -> impl Future<Output = Result<ServerState, ActionError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    pub stories: Vec<Story>,
    pub has_more: bool,
}

/// Read & delete endpoints used around the toggles.
pub trait ContentApi {
    fn search(&self, query: &str)
        -> impl Future<Output = Result<SearchResults, ActionError>> + Send;
    fn feed_page(&self, page: u32) -> impl Future<Output = Result<FeedPage, ActionError>> + Send;
    fn following(&self) -> impl Future<Output = Result<Vec<String>, ActionError>> + Send;
    fn delete_story(&self, slug: &str) -> impl Future<Output = Result<(), ActionError>> + Send;
}

/// `reqwest` client for the platform's REST API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ActionError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|_| ConfigError::Invalid {
            key: crate::config::API_URL_VAR,
            value: config.api_base_url.clone(),
        })?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(HttpApi {
            client,
            base_url,
            token: config.auth_token.clone(),
        })
    }

    /// `{base}/{segments..}/`, with every segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ActionError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        if !status.is_success() {
            warn!("Path: {}, Status: {}", url.path(), status);
            return Err(ActionError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        debug!("Path: {}, Status: {}, Bytes: {}", url.path(), status, body.len());
        if body.iter().all(u8::is_ascii_whitespace) {
            // An empty body carries no server state.
            return Ok(serde_json::from_str("{}")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

impl InteractionApi for HttpApi {
    async fn send_toggle(&self, request: ToggleRequest) -> Result<ServerState, ActionError> {
        let body = ToggleBody {
            state: request.desired,
        };
        let url = match (&request.key, request.action) {
            (TargetKey::Creator(username), ActionKind::Follow) => {
                self.endpoint(&["follow", username.as_str()])
            }
            (TargetKey::Item(kind, id), ActionKind::Like | ActionKind::Save) => {
                let collection = kind.collection().ok_or(ActionError::MissingIdentifier)?;
                let action = match request.action {
                    ActionKind::Like => "toggle-like",
                    _ => "toggle-save",
                };
                self.endpoint(&[collection, id.0.as_str(), action])
            }
            _ => return Err(ActionError::MissingIdentifier),
        };
        let builder = self.request(Method::POST, url).json(&body);
        let state: ServerState = match request.action {
            ActionKind::Like => self.execute::<LikeResponse>(builder).await?.into(),
            ActionKind::Save => self.execute::<SaveResponse>(builder).await?.into(),
            ActionKind::Follow => self.execute::<FollowResponse>(builder).await?.into(),
        };
        Ok(state)
    }
}

impl ContentApi for HttpApi {
    async fn search(&self, query: &str) -> Result<SearchResults, ActionError> {
        let builder = self
            .request(Method::GET, self.endpoint(&["search"]))
            .query(&[("q", query)]);
        let response: SearchResponse = self.execute(builder).await?;
        Ok(response.into())
    }

    async fn feed_page(&self, page: u32) -> Result<FeedPage, ActionError> {
        let builder = self
            .request(Method::GET, self.endpoint(&["stories"]))
            .query(&[("page", page.max(1))]);
        let response: FeedPageResponse = self.execute(builder).await?;
        Ok(FeedPage {
            has_more: response.next.is_some(),
            stories: response.results.into_iter().map(Story::from).collect(),
        })
    }

    async fn following(&self) -> Result<Vec<String>, ActionError> {
        let builder = self.request(Method::GET, self.endpoint(&["following"]));
        let response: FollowingResponse = self.execute(builder).await?;
        Ok(response.usernames)
    }

    async fn delete_story(&self, slug: &str) -> Result<(), ActionError> {
        if slug.is_empty() {
            return Err(ActionError::MissingIdentifier);
        }
        let builder = self.request(Method::DELETE, self.endpoint(&["stories", slug]));
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Failed to delete story {slug}: {status}");
            return Err(ActionError::Status(status.as_u16()));
        }
        Ok(())
    }
}
