use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use versefeed::{
    ActionError, ActionKind, Config, ContentApi, HttpApi, InteractionApi, InteractionTarget,
    ServerState, Session, TargetId, TargetKey, TargetKind, ToggleController, ToggleRequest,
};
use warp::http::StatusCode;
use warp::Filter;

const TOKEN: &str = "secret";

/// Serves a fake platform API under `/api` and returns a config pointing at it.
async fn serve() -> Config {
    let like = warp::post()
        .and(warp::path("api"))
        .and(warp::path("stories"))
        .and(warp::path::param::<String>())
        .and(warp::path("toggle-like"))
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json::<Value>())
        .map(|slug: String, auth: Option<String>, body: Value| {
            if auth.as_deref() != Some("Bearer secret") {
                return warp::reply::with_status(
                    warp::reply::json(&json!({"detail": "unauthorized"})),
                    StatusCode::UNAUTHORIZED,
                );
            }
            let liked = body["state"].as_bool().unwrap_or_default();
            let count = if slug == "low-tide" { 5 } else { 0 };
            warp::reply::with_status(
                warp::reply::json(&json!({"is_liked_by_user": liked, "likes_count": count})),
                StatusCode::OK,
            )
        });

    let save = warp::post()
        .and(warp::path("api"))
        .and(warp::path("verses"))
        .and(warp::path::param::<String>())
        .and(warp::path("toggle-save"))
        .map(|_slug: String| {
            warp::reply::with_status(
                warp::reply::json(&json!({"detail": "boom"})),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        });

    let follow = warp::post()
        .and(warp::path("api"))
        .and(warp::path("follow"))
        .and(warp::path::param::<String>())
        .map(|_username: String| warp::reply::with_status("", StatusCode::OK));

    let search = warp::get()
        .and(warp::path("api"))
        .and(warp::path("search"))
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let q = query.get("q").cloned().unwrap_or_default();
            warp::reply::json(&json!({
                "stories": [{"slug": format!("{q}-story"), "title": "Found", "likes_count": 2}],
                "verses": [{"slug": "v1", "story_slug": format!("{q}-story"), "order": 1}],
                "creators": [{"username": "mira", "followers_count": 12}]
            }))
        });

    let following = warp::get()
        .and(warp::path("api"))
        .and(warp::path("following"))
        .map(|| warp::reply::json(&json!({"usernames": ["mira", "jon"]})));

    let feed = warp::get()
        .and(warp::path("api"))
        .and(warp::path("stories"))
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let page = query.get("page").cloned().unwrap_or_default();
            let next = (page == "1").then_some("/api/stories/?page=2");
            warp::reply::json(&json!({
                "results": [{"slug": format!("page-{page}"), "title": "Paged"}],
                "next": next
            }))
        });

    let delete = warp::delete()
        .and(warp::path("api"))
        .and(warp::path("stories"))
        .and(warp::path::param::<String>())
        .map(|slug: String| {
            let status = if slug == "old" {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::NOT_FOUND
            };
            warp::reply::with_status("", status)
        });

    let routes = like
        .or(save)
        .or(follow)
        .or(search)
        .or(following)
        .or(feed)
        .or(delete);
    let (address, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    Config::new(format!("http://{address}/api")).with_token(TOKEN)
}

fn like(slug: &str, desired: bool) -> ToggleRequest {
    ToggleRequest {
        key: TargetKey::Item(TargetKind::Story, TargetId(slug.to_owned())),
        action: ActionKind::Like,
        desired,
    }
}

#[tokio::test]
async fn like_sends_desired_state_with_auth() {
    let api = HttpApi::new(&serve().await).unwrap();

    let state = api.send_toggle(like("low-tide", true)).await.unwrap();

    assert_eq!(
        state,
        ServerState {
            flag: Some(true),
            count: Some(5)
        }
    );
}

#[tokio::test]
async fn missing_token_is_rejected_by_the_server() {
    let mut config = serve().await;
    config.auth_token = None;
    let api = HttpApi::new(&config).unwrap();

    let error = api.send_toggle(like("low-tide", true)).await.unwrap_err();

    assert!(matches!(error, ActionError::Status(401)));
}

#[tokio::test]
async fn server_errors_become_status_errors() {
    let api = HttpApi::new(&serve().await).unwrap();
    let request = ToggleRequest {
        key: TargetKey::Item(TargetKind::Verse, TargetId("v1".to_owned())),
        action: ActionKind::Save,
        desired: true,
    };

    assert!(matches!(
        api.send_toggle(request).await,
        Err(ActionError::Status(500))
    ));
}

#[tokio::test]
async fn empty_follow_response_carries_no_state() {
    let api = HttpApi::new(&serve().await).unwrap();
    let request = ToggleRequest {
        key: TargetKey::Creator("mira".to_owned()),
        action: ActionKind::Follow,
        desired: true,
    };

    assert_eq!(
        api.send_toggle(request).await.unwrap(),
        ServerState::default()
    );
}

#[tokio::test]
async fn search_normalizes_every_section() {
    let api = HttpApi::new(&serve().await).unwrap();

    let results = api.search("tide").await.unwrap();

    assert_eq!(results.stories[0].slug(), Some("tide-story"));
    assert_eq!(results.stories[0].target.counts.likes, 2);
    assert_eq!(results.verses[0].story_slug.as_deref(), Some("tide-story"));
    assert_eq!(results.creators[0].username(), "mira");
    assert_eq!(results.creators[0].target.counts.followers, 12);
}

#[tokio::test]
async fn feed_pages_report_more() {
    let api = HttpApi::new(&serve().await).unwrap();

    let first = api.feed_page(1).await.unwrap();
    let second = api.feed_page(2).await.unwrap();

    assert_eq!(first.stories[0].slug(), Some("page-1"));
    assert!(first.has_more);
    assert!(!second.has_more);
}

#[tokio::test]
async fn delete_reports_failures() {
    let api = HttpApi::new(&serve().await).unwrap();

    assert!(api.delete_story("old").await.is_ok());
    assert!(matches!(
        api.delete_story("missing").await,
        Err(ActionError::Status(404))
    ));
    assert!(matches!(
        api.delete_story("").await,
        Err(ActionError::MissingIdentifier)
    ));
}

#[tokio::test]
async fn controller_over_http() {
    let config = serve().await;
    let session = Arc::new(Session::from_config(&config));
    let controller = ToggleController::new(HttpApi::new(&config).unwrap(), session.clone());

    assert_eq!(controller.hydrate_following().await.unwrap(), 2);

    let mut story = InteractionTarget::new(TargetKind::Story, "low-tide").with_owner("mira");
    story.set(ActionKind::Like, false, 3);
    let outcome = controller
        .toggle(&mut story, ActionKind::Like)
        .await
        .unwrap();
    assert!(outcome.flag);
    assert_eq!(story.counts.likes, 5);

    let mut verse = InteractionTarget::new(TargetKind::Verse, "v1");
    verse.set(ActionKind::Save, false, 1);
    assert!(controller.toggle(&mut verse, ActionKind::Save).await.is_err());
    assert!(!verse.flags.saved);
    assert_eq!(verse.counts.saves, 1);

    let results = controller.search("tide").await.unwrap();
    assert!(results.creators[0].target.flags.following);
}

#[tokio::test]
async fn unreachable_server_rolls_back() {
    // Nothing listens on the discard port.
    let config = Config::new("http://127.0.0.1:9/api").with_token(TOKEN);
    let controller = ToggleController::new(
        HttpApi::new(&config).unwrap(),
        Arc::new(Session::from_config(&config)),
    );
    let mut story = InteractionTarget::new(TargetKind::Story, "low-tide");
    story.set(ActionKind::Like, false, 7);

    let error = controller
        .toggle(&mut story, ActionKind::Like)
        .await
        .unwrap_err();

    assert!(matches!(error, ActionError::Request(_)));
    assert!(!story.flags.liked);
    assert_eq!(story.counts.likes, 7);
}
