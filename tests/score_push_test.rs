// Integration tests for score pushes against a mock display server

use mockito::Matcher;
use scorelink::config::PushSettings;
use scorelink::score::{GameMeta, ScoreBoard, ScorePusher, ScoreSnapshot, Side};
use scorelink::service::ServiceAddress;
use serde_json::json;

fn address_of(server: &mockito::Server) -> ServiceAddress {
    let addr = server.socket_address();
    ServiceAddress::new(addr.ip().to_string(), addr.port())
}

fn meta() -> GameMeta {
    GameMeta {
        team_a: "TFC Leipzig".to_string(),
        team_b: "Kickers Halle".to_string(),
        team_a_player: "Anna Berg / Jonas Wolf".to_string(),
        team_b_player: "Mia Roth".to_string(),
        event_name: "MTFV Landesliga 2025".to_string(),
    }
}

#[tokio::test]
async fn test_update_sends_exactly_one_post_with_snapshot() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/scores")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "teamAScore": 4,
            "teamBScore": 2,
            "teamAName": "TFC Leipzig",
            "teamBName": "Kickers Halle",
            "teamAPlayer": "Anna Berg / Jonas Wolf",
            "teamBPlayer": "Mia Roth",
            "eventName": "MTFV Landesliga 2025"
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let pusher = ScorePusher::new(&PushSettings::default()).unwrap();
    let snapshot = ScoreSnapshot {
        team_a_score: 4,
        team_b_score: 2,
        meta: meta(),
    };
    pusher
        .update_scores(&address_of(&server), snapshot)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_push_does_not_affect_next_one() {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("POST", "/scores")
        .match_body(Matcher::PartialJson(json!({ "teamAScore": 1 })))
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/scores")
        .match_body(Matcher::PartialJson(json!({ "teamAScore": 2 })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let pusher = ScorePusher::new(&PushSettings::default()).unwrap();
    let address = address_of(&server);
    let mut board = ScoreBoard::default();

    board.increment(Side::A);
    pusher
        .update_scores(&address, board.snapshot(&meta()))
        .await
        .unwrap();

    board.increment(Side::A);
    pusher
        .update_scores(&address, board.snapshot(&meta()))
        .await
        .unwrap();

    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_rapid_updates_are_independent_posts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/scores")
        .with_status(200)
        .expect(3)
        .create_async()
        .await;

    let pusher = ScorePusher::new(&PushSettings::default()).unwrap();
    let address = address_of(&server);
    let mut board = ScoreBoard::default();

    let handles: Vec<_> = (0..3)
        .map(|_| {
            board.increment(Side::B);
            pusher.update_scores(&address, board.snapshot(&meta()))
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    mock.assert_async().await;
}
