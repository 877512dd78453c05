//! Provider tests against mock HTTP servers

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use hachimura_stats::config::{FetchConfig, ProviderKind, RetryPolicy};
use hachimura_stats::fetcher::{
    self, api_sports::ApiSports, balldontlie::BallDontLie, FetchError, SeasonDataSource,
};
use hachimura_stats::models::{GameLine, Location};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff: Duration::ZERO,
        page_delay: Duration::ZERO,
    }
}

fn config(server: &MockServer, provider: ProviderKind, out: &std::path::Path) -> FetchConfig {
    FetchConfig {
        provider,
        api_base: server.uri(),
        api_key: "test-key".to_string(),
        player_name: "Rui Hachimura".to_string(),
        season: 2024,
        out_path: out.to_path_buf(),
        retry: fast_retry(2),
    }
}

fn bdl_row(date: &str, team: &str, home: &str, visitor: &str, pts: u32) -> Value {
    json!({
        "min": "30:41",
        "pts": pts, "reb": 4, "ast": 1,
        "fga": 10, "fgm": 5, "fg3a": 3, "fg3m": 1, "fta": 2, "ftm": 2,
        "team": {"abbreviation": team},
        "game": {
            "date": date,
            "home_team": {"abbreviation": home},
            "visitor_team": {"abbreviation": visitor}
        }
    })
}

#[tokio::test]
async fn balldontlie_season_is_paged_aggregated_and_written() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .and(query_param("search", "Hachimura"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 11, "first_name": "Somebody", "last_name": "Hachimura"},
                {"id": 666, "first_name": "Rui", "last_name": "Hachimura"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(query_param("player_ids[]", "666"))
        .and(query_param("seasons[]", "2024"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                bdl_row("2024-10-22T00:00:00.000Z", "LAL", "LAL", "MIN", 18),
                bdl_row("2024-10-26", "LAL", "SAC", "LAL", 11)
            ],
            "meta": {"total_pages": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [bdl_row("2024-10-22", "LAL", "LAL", "MIN", 2)],
            "meta": {"total_pages": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data").join("games.json");
    let config = config(&server, ProviderKind::BallDontLie, &out);

    let count = fetcher::run(&config).await.unwrap();
    assert_eq!(count, 2);

    let written: Vec<GameLine> =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written[0].date, "2024-10-26");
    assert_eq!(written[0].location, Location::Away);
    assert_eq!(written[0].opponent, "SAC");

    assert_eq!(written[1].date, "2024-10-22");
    assert_eq!(written[1].location, Location::Home);
    assert_eq!(written[1].opponent, "MIN");
    assert_eq!(written[1].points, 20);
    assert_eq!(written[1].minutes_played, 60);
}

#[tokio::test]
async fn rate_limits_are_retried_up_to_the_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let source = BallDontLie::new(&server.uri(), "test-key", fast_retry(2)).unwrap();
    let err = source.find_player("Rui Hachimura").await.unwrap_err();

    match &err {
        FetchError::RetriesExhausted { attempts, status, .. } => {
            assert_eq!(*attempts, 3);
            assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn retry_waits_grow_linearly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        max_retries: 2,
        backoff: Duration::from_millis(150),
        page_delay: Duration::ZERO,
    };
    let source = BallDontLie::new(&server.uri(), "test-key", retry).unwrap();

    let started = Instant::now();
    let err = source.find_player("Rui Hachimura").await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, FetchError::RetriesExhausted { attempts: 3, .. }));
    // 150ms then 300ms; a flat backoff would stop at 300ms total
    assert!(elapsed >= Duration::from_millis(450), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn server_errors_recover_after_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 666, "first_name": "Rui", "last_name": "Hachimura"}]
        })))
        .mount(&server)
        .await;

    let source = BallDontLie::new(&server.uri(), "test-key", fast_retry(2)).unwrap();
    let player = source.find_player("Rui Hachimura").await.unwrap();
    assert_eq!(player.id, 666);
}

#[tokio::test]
async fn client_errors_fail_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let source = BallDontLie::new(&server.uri(), "test-key", fast_retry(5)).unwrap();
    let err = source.find_player("Rui Hachimura").await.unwrap_err();

    match err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "bad key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_search_is_player_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let source = BallDontLie::new(&server.uri(), "test-key", fast_retry(0)).unwrap();
    let err = source.find_player("Rui Hachimura").await.unwrap_err();
    assert!(matches!(err, FetchError::PlayerNotFound { .. }));
}

#[tokio::test]
async fn api_sports_joins_stats_with_team_schedule() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players"))
        .and(query_param("search", "Hachimura"))
        .and(header("x-apisports-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{"id": 882, "firstname": "Rui", "lastname": "Hachimura"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/players/statistics"))
        .and(query_param("id", "882"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                {
                    "team": {"id": 17, "code": "LAL"}, "game": {"id": 500},
                    "min": "34", "points": 21, "totReb": 6, "assists": 2,
                    "fga": 14, "fgm": 8, "tpa": 4, "tpm": 2, "fta": 3, "ftm": 3
                },
                {
                    "team": {"id": 17, "code": "LAL"}, "game": {"id": 501},
                    "min": "28:10", "points": 9, "totReb": 3, "assists": 1,
                    "fga": 9, "fgm": 4, "tpa": 2, "tpm": 1, "fta": 0, "ftm": 0
                },
                {
                    "team": {"id": 17, "code": "LAL"}, "game": {"id": 999},
                    "min": "10", "points": 2
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/players/statistics"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("team", "17"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                {
                    "id": 500,
                    "date": {"start": "2024-10-23T02:00:00.000Z"},
                    "teams": {"visitors": {"id": 24, "code": "MIN"}, "home": {"id": 17, "code": "LAL"}}
                },
                {
                    "id": 501,
                    "date": {"start": "2024-11-04T00:30:00.000Z"},
                    "teams": {"visitors": {"id": 17, "code": "LAL"}, "home": {"id": 38, "code": "TOR"}}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(&server, ProviderKind::ApiSports, &dir.path().join("games.json"));
    let source = ApiSports::new(&config.api_base, &config.api_key, config.retry).unwrap();

    let count = fetcher::run_with(&source, &config).await.unwrap();
    assert_eq!(count, 2);

    let written: Vec<GameLine> =
        serde_json::from_str(&std::fs::read_to_string(&config.out_path).unwrap()).unwrap();

    assert_eq!(written[0].date, "2024-11-03");
    assert_eq!(written[0].location, Location::Away);
    assert_eq!(written[0].opponent, "TOR");
    assert_eq!(written[0].minutes_played, 28);

    assert_eq!(written[1].date, "2024-10-22");
    assert_eq!(written[1].location, Location::Home);
    assert_eq!(written[1].opponent, "MIN");
    assert_eq!(written[1].rebounds, 6);
}
