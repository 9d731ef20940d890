mod common;

use rocket::http::Status;
use serde_json::Value;
use uuid::Uuid;

use common::{RecordClient, create_closed_loan, session_request, test_client};

#[rocket::async_test]
async fn test_can_get_all_patron_action_sessions() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let first = session_request(&loan_id, "Check-out");
    let second = session_request(&loan_id, "Check-out");
    sessions.create(&first).await;
    sessions.create(&second).await;

    let (records, total) = sessions.get_all().await;
    assert_eq!(total, 2);
    assert_eq!(records.len(), 2);

    let mut patron_ids: Vec<&str> =
        records.iter().map(|r| r["patronId"].as_str().expect("patronId")).collect();
    patron_ids.sort();
    let mut expected = vec![
        first["patronId"].as_str().unwrap(),
        second["patronId"].as_str().unwrap(),
    ];
    expected.sort();
    assert_eq!(patron_ids, expected);
}

#[rocket::async_test]
async fn test_can_get_patron_action_sessions_by_query_and_limit() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    sessions.create(&session_request(&loan_id, "Check-out")).await;
    sessions.create(&session_request(&loan_id, "Check-out")).await;
    sessions.create(&session_request(&loan_id, "Check-in")).await;

    let (records, total) = sessions.get_many("query=actionType%3D%3DCheck-out&limit=1").await;
    assert_eq!(records.len(), 1);
    assert_eq!(total, 2);
    assert_eq!(records[0]["actionType"], "Check-out");

    let (records, total) = sessions.get_many("query=actionType%3D%3DCheck-in").await;
    assert_eq!(records.len(), 1);
    assert_eq!(total, 1);
}

#[rocket::async_test]
async fn test_paging_with_offset() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    for _ in 0..3 {
        sessions.create(&session_request(&loan_id, "Check-in")).await;
    }

    let (page_one, total) = sessions.get_many("offset=0&limit=2").await;
    let (page_two, _) = sessions.get_many("offset=2&limit=2").await;
    assert_eq!(total, 3);
    assert_eq!(page_one.len(), 2);
    assert_eq!(page_two.len(), 1);
    assert!(!page_one.iter().any(|r| r["id"] == page_two[0]["id"]));
}

#[rocket::async_test]
async fn test_bad_list_query_is_rejected() {
    let client = test_client().await;

    let response = client
        .get("/patron-action-session-storage/patron-action-sessions?query=color%3D%3Dred")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert!(body["error"].as_str().unwrap().contains("color"));

    let response = client
        .get("/patron-action-session-storage/patron-action-sessions?limit=-1")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_can_create_patron_action_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let request = session_request(&loan_id, "Check-out");
    let created = sessions.create(&request).await;

    assert_eq!(created["actionType"], "Check-out");
    assert_eq!(created["id"], request["id"]);
    assert_eq!(created["metadata"]["createdByUserId"], common::USER_ID);
    assert!(created["metadata"]["createdDate"].is_string());
}

#[rocket::async_test]
async fn test_create_generates_id_when_missing() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let mut request = session_request(&loan_id, "Check-in");
    request.as_object_mut().unwrap().remove("id");
    let created = sessions.create(&request).await;

    let id = created["id"].as_str().expect("generated id");
    assert!(Uuid::parse_str(id).is_ok());
}

#[rocket::async_test]
async fn test_cannot_create_session_for_unknown_loan() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);

    let request = session_request(&Uuid::new_v4().to_string(), "Check-out");
    let (status, body) = sessions.attempt_create(&request).await;

    assert_eq!(status, Status::UnprocessableEntity);
    assert!(body["error"].as_str().unwrap().contains("loanId"));
}

#[rocket::async_test]
async fn test_cannot_create_duplicate_or_malformed_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let request = session_request(&loan_id, "Check-out");
    sessions.create(&request).await;
    let (status, _) = sessions.attempt_create(&request).await;
    assert_eq!(status, Status::UnprocessableEntity);

    let mut bad_patron = session_request(&loan_id, "Check-out");
    bad_patron["patronId"] = Value::from("not-a-uuid");
    let (status, _) = sessions.attempt_create(&bad_patron).await;
    assert_eq!(status, Status::UnprocessableEntity);
}

#[rocket::async_test]
async fn test_can_get_patron_action_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let request = session_request(&loan_id, "Check-out");
    let id = sessions.create(&request).await["id"].as_str().unwrap().to_string();

    let fetched = sessions.get_by_id(&id).await;
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["patronId"], request["patronId"]);
}

#[rocket::async_test]
async fn test_get_missing_session_is_not_found() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);

    let (status, body) = sessions.attempt_get_by_id(&Uuid::new_v4().to_string()).await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(body, "Not found");
}

#[rocket::async_test]
async fn test_can_delete_patron_action_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let id = sessions.create(&session_request(&loan_id, "Check-out")).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    sessions.delete_by_id(&id).await;

    let (records, total) = sessions.get_all().await;
    assert_eq!(records.len(), 0);
    assert_eq!(total, 0);
}

#[rocket::async_test]
async fn test_cannot_delete_non_existent_patron_action_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);

    let (status, body) = sessions.attempt_delete_by_id(&Uuid::new_v4().to_string()).await;

    assert_eq!(status, Status::NotFound);
    assert_eq!(body, "Not found");
}

#[rocket::async_test]
async fn test_can_delete_all_sessions() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    sessions.create(&session_request(&loan_id, "Check-out")).await;
    sessions.create(&session_request(&loan_id, "Check-in")).await;

    let response = common::with_okapi_headers(client.delete(common::SESSIONS_PATH))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let (_, total) = sessions.get_all().await;
    assert_eq!(total, 0);
}

#[rocket::async_test]
async fn test_can_update_patron_action_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;
    let other_loan_id = create_closed_loan(&client).await;

    let mut request = session_request(&loan_id, "Check-out");
    let created = sessions.create(&request).await;
    let id = created["id"].as_str().unwrap().to_string();

    request["loanId"] = Value::from(other_loan_id.clone());
    request["actionType"] = Value::from("Check-in");
    let (status, _) = sessions.attempt_put_by_id(&request).await;
    assert_eq!(status, Status::NoContent, "Failed to update patron action session");

    let updated = sessions.get_by_id(&id).await;
    assert_eq!(updated["loanId"], other_loan_id.as_str());
    assert_eq!(updated["actionType"], "Check-in");
    assert_eq!(
        updated["metadata"]["createdDate"],
        created["metadata"]["createdDate"]
    );
}

#[rocket::async_test]
async fn test_update_does_not_recheck_loan() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let mut request = session_request(&loan_id, "Check-out");
    sessions.create(&request).await;

    request["loanId"] = Value::from(Uuid::new_v4().to_string());
    let (status, _) = sessions.attempt_put_by_id(&request).await;
    assert_eq!(status, Status::NoContent);
}

#[rocket::async_test]
async fn test_cannot_update_non_existent_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let request = session_request(&loan_id, "Check-out");
    let (status, body) = sessions.attempt_put_by_id(&request).await;

    assert_eq!(status, Status::NotFound);
    assert_eq!(body, "Not found");
}

#[tokio::test]
async fn test_concurrent_reads_see_the_same_session() {
    let client = test_client().await;
    let sessions = RecordClient::sessions(&client);
    let loan_id = create_closed_loan(&client).await;

    let created = sessions.create(&session_request(&loan_id, "Check-out")).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (a, b, c) = tokio::join!(
        sessions.get_by_id(&id),
        sessions.get_by_id(&id),
        sessions.get_all()
    );

    assert_eq!(a, created);
    assert_eq!(b, created);
    assert_eq!(c.1, 1);
}
