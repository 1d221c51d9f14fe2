use serde_json::json;
use spytcli::spotify::SpotifyClient;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new(reqwest::Client::new(), &server.uri(), "test-token")
}

#[tokio::test]
async fn test_get_playlist_reads_all_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlists/PL123"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "PL123",
            "name": "Road Trip"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlists/PL123/tracks"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "is_local": true,
                "track": {
                    "id": null,
                    "name": "Demo Tape",
                    "type": "track",
                    "artists": [{ "name": "Garage Band" }],
                    "album": { "name": "" }
                }
            }],
            "next": null,
            "total": 3
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlists/PL123/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "is_local": false,
                    "track": {
                        "id": "t1",
                        "name": "Get Lucky",
                        "type": "track",
                        "artists": [{ "name": "Daft Punk" }, { "name": "Pharrell Williams" }],
                        "album": { "name": "Random Access Memories" }
                    }
                },
                {
                    "is_local": false,
                    "track": {
                        "id": "ep1",
                        "name": "Some Podcast Episode",
                        "type": "episode",
                        "artists": [],
                        "album": null
                    }
                },
                { "is_local": false, "track": null }
            ],
            "next": format!("{}/playlists/PL123/tracks?offset=100", server.uri()),
            "total": 3
        })))
        .mount(&server)
        .await;

    let (name, tracks) = client(&server).get_playlist("PL123").await.unwrap();

    assert_eq!(name, "Road Trip");
    assert_eq!(tracks.len(), 2);

    // Only the first artist is kept
    assert_eq!(tracks[0].artist, "Daft Punk");
    assert_eq!(tracks[0].title, "Get Lucky");
    assert_eq!(tracks[0].album.as_deref(), Some("Random Access Memories"));
    assert_eq!(tracks[0].source_id, "t1");

    // Local files get a synthetic id and no empty album
    assert_eq!(tracks[1].source_id, "local:1");
    assert_eq!(tracks[1].album, None);
}

#[tokio::test]
async fn test_get_playlist_not_found_is_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlists/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).get_playlist("missing").await.unwrap_err();
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_get_playlist_unauthorized_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlists/PL123"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).get_playlist("PL123").await.unwrap_err();
    assert!(err.is_fatal());
}
