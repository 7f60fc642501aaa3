// API client tests against a mock server

use gmatch_flow::models::MatchStatus;
use gmatch_flow::services::{BackendClient, BackendError};
use mockito::Matcher;

fn client(server: &mockito::ServerGuard) -> BackendClient {
    BackendClient::new(server.url(), None).unwrap()
}

#[tokio::test]
async fn get_status_parses_wire_code() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/match/matching/")
        .with_status(200)
        .with_body(r#"{"success": true, "match_status": 3}"#)
        .create_async()
        .await;

    let res = client(&server).get_status().await.unwrap();
    assert!(res.success);
    assert_eq!(res.match_status, MatchStatus::MyApproved);
}

#[tokio::test]
async fn success_false_surfaces_server_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/match/matching/start/")
        .with_status(200)
        .with_body(r#"{"success": false, "message": "Queue is closed"}"#)
        .create_async()
        .await;

    let err = client(&server).start_matching().await.unwrap_err();
    match err {
        BackendError::ApiError(message) => assert_eq!(message, "Queue is closed"),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn http_error_body_message_is_extracted() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/match/matching/agree/")
        .with_status(409)
        .with_body(r#"{"success": false, "error": "Match already resolved"}"#)
        .create_async()
        .await;

    let err = client(&server).approve_match().await.unwrap_err();
    match err {
        BackendError::ApiError(message) => assert_eq!(message, "Match already resolved"),
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/match/matching/contact/")
        .with_status(401)
        .with_body(r#"{"error": "Authentication required"}"#)
        .create_async()
        .await;

    let err = client(&server).get_contact().await.unwrap_err();
    assert!(matches!(err, BackendError::Unauthorized));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/match/matching/")
        .with_status(200)
        .with_body("<html>definitely not json</html>")
        .create_async()
        .await;

    let err = client(&server).get_status().await.unwrap_err();
    assert!(matches!(err, BackendError::InvalidResponse(_)));
}

#[tokio::test]
async fn match_result_payload_round_trips() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/match/matching/result/")
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "match_status": 2,
                "match_id": 42,
                "compatibility_score": {"overall": 91.2, "time": 4.6, "clean": 4.1},
                "partner": {
                    "property": {
                        "nickname": "calm fox",
                        "student_id": 23,
                        "gender": "F",
                        "is_smoker": false,
                        "dorm_building": "S",
                        "stay_period": 2,
                        "has_fridge": true,
                        "mate_fridge": 0,
                        "has_router": true,
                        "mate_router": 1
                    },
                    "survey": {
                        "scores": {"time": 4.6, "clean": 4.1},
                        "badges": ["early bird", "tidy"]
                    }
                }
            }"#,
        )
        .create_async()
        .await;

    let res = client(&server).get_match_result().await.unwrap();
    assert_eq!(res.match_status, MatchStatus::Matched);
    assert_eq!(res.match_id, Some(42));
    assert_eq!(res.compatibility_score.unwrap().overall(), Some(91.2));
    let partner = res.partner.unwrap();
    assert_eq!(partner.property.nickname, "calm fox");
    assert_eq!(partner.survey.badges.len(), 2);
}

#[tokio::test]
async fn session_token_is_sent_as_cookie() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/match/matching/")
        .match_header("cookie", "sessionid=secret123")
        .with_status(200)
        .with_body(r#"{"success": true, "match_status": 0}"#)
        .create_async()
        .await;

    let client = BackendClient::new(server.url(), Some("secret123".to_string())).unwrap();
    client.get_status().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn every_request_carries_a_request_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/match/matching/rematch/")
        .match_header(
            "x-request-id",
            Matcher::Regex("^[0-9a-f-]{36}$".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"success": true, "match_status": 1}"#)
        .create_async()
        .await;

    client(&server).request_rematch().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn profile_status_gates_on_completeness() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/match/profile/")
        .with_status(200)
        .with_body(r#"{"success": true, "profile_status": 1}"#)
        .create_async()
        .await;

    let res = client(&server).get_profile_status().await.unwrap();
    assert_eq!(res.profile_status, gmatch_flow::models::ProfileStatus::NoSurvey);
}
