//! `extract` driven end to end through a mocked YouTube Data API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use std::sync::Arc;

use serde_json::json;
use tracklist_core::{
    DetailProvider, ExtractError, ExtractedFrom, ExtractionConfig, ResolutionStatus, SearchProvider,
    VideoKind, YouTubeClient, extract,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::socket_guard::start_mock_server_or_skip;

async fn mount_search_hit(server: &MockServer, query: &str, video_id: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": {"kind": "youtube#video", "videoId": video_id},
                "snippet": {
                    "title": title,
                    "thumbnails": {"default": {"url": format!("https://i.ytimg.com/vi/{video_id}/default.jpg")}}
                }
            }]
        })))
        .mount(server)
        .await;
}

async fn mount_description(server: &MockServer, video_id: &str, description: &str) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("part", "snippet"))
        .and(query_param("id", video_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": video_id, "snippet": {"description": description}}]
        })))
        .mount(server)
        .await;
}

async fn mount_duration(server: &MockServer, duration: &str) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("part", "contentDetails,snippet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "any", "contentDetails": {"duration": duration}}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_youtube_description_resolves_with_isolated_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    mount_description(&server, "mix1", support::THREE_TRACK_DESCRIPTION).await;
    mount_search_hit(&server, "Artist A Song A", "vid-a", "Artist A - Song A (Official Video)").await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Artist B Song B"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_search_hit(&server, "Artist C Song C", "vid-c", "Artist C - Song C (Live)").await;
    mount_duration(&server, "PT3M25S").await;

    let client = Arc::new(YouTubeClient::with_base_url("test-key", server.uri()).unwrap());
    let result = extract(
        "mix1",
        client.as_ref(),
        Arc::clone(&client) as Arc<dyn SearchProvider>,
        Some(Arc::clone(&client) as Arc<dyn DetailProvider>),
        &ExtractionConfig::default(),
    )
    .await
    .unwrap();

    assert!(result.accepted);
    assert_eq!(result.extracted_from, ExtractedFrom::Description);
    assert_eq!(result.len(), 3);

    let first = &result.tracks[0];
    assert_eq!(first.resolution_status, ResolutionStatus::Resolved);
    assert_eq!(first.external_id.as_deref(), Some("vid-a"));
    assert_eq!(first.canonical_url, "https://www.youtube.com/watch?v=vid-a");
    assert_eq!(first.duration_seconds, Some(205));
    assert_eq!(first.video_kind, Some(VideoKind::OfficialMv));
    assert_eq!(
        first.thumbnail_url.as_deref(),
        Some("https://i.ytimg.com/vi/vid-a/default.jpg")
    );

    let second = &result.tracks[1];
    assert_eq!(second.resolution_status, ResolutionStatus::Fallback);
    assert!(second.external_id.is_none());
    assert!(second.duration_seconds.is_none());

    assert_eq!(result.tracks[2].video_kind, Some(VideoKind::Live));
    assert_eq!(result.stats.resolved, 2);
    assert_eq!(result.stats.fallbacks, 1);
}

#[tokio::test]
async fn test_youtube_comments_used_when_description_is_thin() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    mount_description(&server, "mix2", "Thanks for watching! Subscribe for more").await;
    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "mix2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "low",
                    "snippet": {"topLevelComment": {"snippet": {
                        "textDisplay": "banger",
                        "likeCount": 2
                    }}}
                },
                {
                    "id": "top",
                    "snippet": {"topLevelComment": {"snippet": {
                        "textDisplay": "<a href=\"https://www.youtube.com/watch?v=mix2&amp;t=0\">0:00</a> Bonobo - Kerala<br><a href=\"https://www.youtube.com/watch?v=mix2&amp;t=245\">4:05</a> Tycho - Awake<br><a href=\"https://www.youtube.com/watch?v=mix2&amp;t=530\">8:50</a> Emancipator - Soon It Will Be Cold Enough",
                        "likeCount": 310
                    }}}
                }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = Arc::new(YouTubeClient::with_base_url("test-key", server.uri()).unwrap());
    let result = extract(
        "mix2",
        client.as_ref(),
        Arc::clone(&client) as Arc<dyn SearchProvider>,
        None,
        &ExtractionConfig::default(),
    )
    .await
    .unwrap();

    assert!(result.accepted);
    assert_eq!(result.extracted_from, ExtractedFrom::Comments);
    assert_eq!(result.source_ref.as_deref(), Some("top"));
    let seconds: Vec<_> = result.tracks.iter().map(|t| t.candidate.seconds).collect();
    assert_eq!(seconds, vec![Some(0), Some(245), Some(530)]);
    assert!(result.tracks.iter().all(|t| t.is_fallback()));
    assert_eq!(result.stats.comments_scanned, 1);
}

#[tokio::test]
async fn test_youtube_unreachable_text_fails() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = Arc::new(YouTubeClient::with_base_url("test-key", server.uri()).unwrap());
    let err = extract(
        "mix3",
        client.as_ref(),
        Arc::clone(&client) as Arc<dyn SearchProvider>,
        None,
        &ExtractionConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ExtractError::SourceUnavailable { .. }));
}
