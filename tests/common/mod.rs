//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "test-api-key";

/// A series the way Sonarr returns it, including fields the crate doesn't model.
pub fn series_json(id: i32, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "sortTitle": title.to_lowercase(),
        "rootFolderPath": "/tv",
        "path": format!("/tv/{}", title),
        "qualityProfileId": 1,
        "monitored": true,
        "seasonFolder": true,
        "tvdbId": 81189,
        "tags": [2, 5],
        "images": [{"coverType": "poster", "url": "/poster.jpg"}]
    })
}

pub fn lookup_json(title: &str, tvdb_id: i32) -> Value {
    json!({
        "title": title,
        "sortTitle": title.to_lowercase(),
        "status": "ended",
        "overview": "A chemist turns to crime.",
        "network": "AMC",
        "year": 2008,
        "tvdbId": tvdb_id,
        "imdbId": "tt0903747",
        "runtime": 47,
        "seasons": [
            {"seasonNumber": 0, "monitored": false},
            {"seasonNumber": 1, "monitored": true}
        ],
        "statistics": {"seasonCount": 5}
    })
}

pub fn status_json() -> Value {
    json!({
        "appName": "Sonarr",
        "version": "4.0.9.2244",
        "osName": "ubuntu",
        "isDocker": true
    })
}

/// Provider config pointing at the mock server.
pub fn provider_config(server: &MockServer) -> Value {
    json!({"url": server.uri(), "api_key": API_KEY})
}
