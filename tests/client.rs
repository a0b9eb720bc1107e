//! HTTP-level tests for the Sonarr client against a mock server.

use serde_json::json;
use sonarr_provider::sonarr::{AddOptions, ClientError, Series, SonarrClient};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

async fn client(server: &MockServer) -> SonarrClient {
    SonarrClient::new(server.uri(), API_KEY).unwrap()
}

#[tokio::test]
async fn test_requests_carry_api_key_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/system/status"))
        .and(header("X-Api-Key", API_KEY))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_json()))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server).await.get_system_status().await.unwrap();
    assert_eq!(status.app_name, "Sonarr");
    assert_eq!(status.version, "4.0.9.2244");
    assert_eq!(status.to_string(), "Platform: Sonarr, version: 4.0.9.2244");
}

#[tokio::test]
async fn test_base_url_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sonarr/api/v3/series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = SonarrClient::new(format!("{}/sonarr", server.uri()), API_KEY).unwrap();
    assert!(client.get_all_series().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_all_series() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([series_json(1, "Lost"), series_json(2, "The Wire")])),
        )
        .mount(&server)
        .await;

    let series = client(&server).await.get_all_series().await.unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[1].title, "The Wire");
    assert_eq!(series[0].root_folder_path, "/tv");
    assert!(series[0].season_folder);
}

#[tokio::test]
async fn test_get_all_series_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_all_series().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "API error: 401 - Unauthorized");
}

#[tokio::test]
async fn test_get_series_found_and_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_json(7, "Lost")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series/8"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let found = client.get_series(7).await.unwrap().unwrap();
    assert_eq!(found.id, 7);
    assert_eq!(found.to_string(), "Lost");
    assert!(client.get_series(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_series_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_series(7).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_create_series_sends_add_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/series"))
        .and(body_partial_json(json!({
            "tvdbId": 81189,
            "rootFolderPath": "/tv",
            "qualityProfileId": 1,
            "monitored": true,
            "addOptions": {"monitor": "future"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(series_json(12, "Breaking Bad")))
        .expect(1)
        .mount(&server)
        .await;

    let request = Series {
        tvdb_id: 81189,
        root_folder_path: "/tv".to_string(),
        quality_profile_id: 1,
        monitored: true,
        add_options: Some(AddOptions {
            monitor: "future".to_string(),
        }),
        ..Default::default()
    };
    let created = client(&server).await.create_series(&request).await.unwrap();
    assert_eq!(created.id, 12);
    assert_eq!(created.title, "Breaking Bad");
}

#[tokio::test]
async fn test_create_series_requires_created_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/series"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("This series has already been added"),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .create_series(&Series::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "API error: 400 - This series has already been added"
    );
}

#[tokio::test]
async fn test_update_series_preserves_unmodelled_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_json(3, "Lost")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v3/series/3"))
        .and(body_partial_json(json!({
            "qualityProfileId": 4,
            "tags": [2, 5],
            "path": "/tv/Lost"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(series_json(3, "Lost")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let mut series = client.get_series(3).await.unwrap().unwrap();
    series.quality_profile_id = 4;
    client.update_series(&series).await.unwrap();
}

#[tokio::test]
async fn test_update_series_empty_body_returns_input() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v3/series/3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let series = Series {
        id: 3,
        title: "Lost".to_string(),
        ..Default::default()
    };
    let updated = client(&server).await.update_series(&series).await.unwrap();
    assert_eq!(updated, series);
}

#[tokio::test]
async fn test_delete_series() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/series/3"))
        .and(query_param("deleteFiles", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/series/4"))
        .and(query_param("deleteFiles", "false"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/series/5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("locked"))
        .mount(&server)
        .await;

    let client = client(&server).await;
    client.delete_series(3, true).await.unwrap();
    client.delete_series(4, false).await.unwrap();
    let err = client.delete_series(5, true).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_lookup_series_encodes_term() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series/lookup"))
        .and(query_param("term", "breaking bad & friends"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([lookup_json("Breaking Bad", 81189)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .await
        .lookup_series("breaking bad & friends")
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].imdb_id, "tt0903747");
    assert_eq!(results[0].season_count(), 5);
}

#[tokio::test]
async fn test_lookup_series_tolerates_null_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/series/lookup"))
        .and(query_param("term", "dark"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Dark", "tvdbId": 1, "network": null, "imdbId": null}
        ])))
        .mount(&server)
        .await;

    let results = client(&server).await.lookup_series("dark").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Dark");
    assert_eq!(results[0].network, "");
    assert_eq!(results[0].imdb_id, "");
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_system_status().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let client = SonarrClient::new("http://127.0.0.1:1", API_KEY).unwrap();
    let err = client.get_system_status().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
    assert_eq!(err.status(), None);
}
