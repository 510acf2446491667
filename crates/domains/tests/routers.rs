use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bird_domains::{bird_router, AppState, ExposeInternalErrors};
use bird_storage::DomainCatalog;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::ServiceExt;

fn seed_superhero(db_dir: &Path) {
    let connection = Connection::open(db_dir.join("superhero.sqlite")).unwrap();
    connection
        .execute_batch(
            "CREATE TABLE colour (id INTEGER PRIMARY KEY, colour TEXT);
             CREATE TABLE gender (id INTEGER PRIMARY KEY, gender TEXT);
             CREATE TABLE race (id INTEGER PRIMARY KEY, race TEXT);
             CREATE TABLE alignment (id INTEGER PRIMARY KEY, alignment TEXT);
             CREATE TABLE publisher (id INTEGER PRIMARY KEY, publisher_name TEXT);
             CREATE TABLE superpower (id INTEGER PRIMARY KEY, power_name TEXT);
             CREATE TABLE superhero (
                 id INTEGER PRIMARY KEY,
                 superhero_name TEXT,
                 full_name TEXT,
                 gender_id INTEGER,
                 eye_colour_id INTEGER,
                 hair_colour_id INTEGER,
                 skin_colour_id INTEGER,
                 race_id INTEGER,
                 publisher_id INTEGER,
                 alignment_id INTEGER,
                 height_cm INTEGER,
                 weight_kg INTEGER
             );
             CREATE TABLE hero_power (hero_id INTEGER, power_id INTEGER);

             INSERT INTO colour VALUES (1, 'Blue'), (2, 'Green'), (3, 'No Colour');
             INSERT INTO gender VALUES (1, 'Male'), (2, 'Female');
             INSERT INTO race VALUES (1, 'Human');
             INSERT INTO alignment VALUES (1, 'Good'), (2, 'Bad');
             INSERT INTO publisher VALUES (1, 'Marvel Comics'), (2, 'DC Comics');
             INSERT INTO superpower VALUES (1, 'Flight'), (2, 'Super Strength');
             INSERT INTO superhero VALUES
                 (1, 'A-Bomb', 'Richard Milhouse Jones', 1, 1, 3, 3, 1, 1, 1, 203, 441),
                 (2, 'Ajax', 'Francis Freeman', 1, 2, 3, 3, 1, 1, 2, 193, 90),
                 (3, 'Aquaman', 'Arthur Curry', 1, 1, 3, 3, 1, 2, 1, 185, 146),
                 (4, 'Zod', 'Dru-Zod', 1, 2, 3, 3, 1, 2, 2, 191, 128);
             INSERT INTO hero_power VALUES (1, 2), (3, 1), (3, 2);",
        )
        .unwrap();
}

fn seed_student_club(db_dir: &Path) {
    let connection = Connection::open(db_dir.join("student_club.sqlite")).unwrap();
    connection
        .execute_batch(
            "CREATE TABLE member (
                 member_id TEXT PRIMARY KEY,
                 first_name TEXT,
                 last_name TEXT,
                 position TEXT
             );
             CREATE TABLE event (event_id TEXT PRIMARY KEY, event_name TEXT);
             CREATE TABLE attendance (link_to_event TEXT, link_to_member TEXT);

             INSERT INTO member VALUES
                 ('m1', 'Angela', 'Sanders', 'Member'),
                 ('m2', 'Grant', 'Gilmour', 'Vice President');
             INSERT INTO event VALUES ('e1', 'October Meeting');
             INSERT INTO attendance VALUES ('e1', 'm1'), ('e1', 'm2');",
        )
        .unwrap();
}

/// Fixture app over a data directory holding only the superhero and
/// student_club databases; the other domains stay unavailable.
fn fixture_app(db_dir: &Path) -> Router {
    seed_superhero(db_dir);
    seed_student_club(db_dir);
    let state = AppState {
        catalog: Arc::new(DomainCatalog::open(db_dir, 1)),
        expose_internal_errors: ExposeInternalErrors::Censor,
    };
    bird_router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn heroes_by_eye_colour_returns_matching_rows() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) =
        get_json(app, "/v1/bird/superhero/heroes_by_eye_colour?colour=Blue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"superhero_name": "A-Bomb", "full_name": "Richard Milhouse Jones"},
            {"superhero_name": "Aquaman", "full_name": "Arthur Curry"}
        ])
    );
}

#[tokio::test]
async fn powers_of_hero_resolves_the_join_tables() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(app, "/v1/bird/superhero/powers_of_hero?name=Aquaman").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"power_name": "Flight"}, {"power_name": "Super Strength"}])
    );
}

#[tokio::test]
async fn single_row_endpoints_return_one_object() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) =
        get_json(app, "/v1/bird/superhero/power_count_of_hero?name=Aquaman").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"power_count": 2}));
}

#[tokio::test]
async fn percentage_queries_compute_over_the_whole_table() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) =
        get_json(app, "/v1/bird/superhero/alignment_share?alignment=Bad").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"percentage": 50.0}));
}

#[tokio::test]
async fn list_parameters_expand_into_in_clauses() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(app, "/v1/bird/superhero/heroes_by_ids?ids=1,3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": 1, "superhero_name": "A-Bomb", "full_name": "Richard Milhouse Jones"},
            {"id": 3, "superhero_name": "Aquaman", "full_name": "Arthur Curry"}
        ])
    );
}

#[tokio::test]
async fn bad_list_elements_answer_unprocessable_entity() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(app, "/v1/bird/superhero/heroes_by_ids?ids=1,x").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"], json!({"parameter": "ids", "value": "x"}));
}

#[tokio::test]
async fn missing_parameters_fail_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, _body) = get_json(app, "/v1/bird/superhero/heroes_by_eye_colour").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_single_row_results_answer_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(app, "/v1/bird/superhero/hero_profile?name=Nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("no rows matched the query"));
}

#[tokio::test]
async fn event_attendees_join_members_through_attendance() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(
        app,
        "/v1/bird/student_club/event_attendees?event=October%20Meeting",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"first_name": "Grant", "last_name": "Gilmour", "position": "Vice President"},
            {"first_name": "Angela", "last_name": "Sanders", "position": "Member"}
        ])
    );
}

#[tokio::test]
async fn attendance_counts_group_by_event() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(
        app,
        "/v1/bird/student_club/event_attendance_count?event=October%20Meeting",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"event_name": "October Meeting", "attendee_count": 2})
    );
}

#[tokio::test]
async fn absent_domains_answer_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let app = fixture_app(dir.path());
    let (status, body) = get_json(app, "/v1/bird/financial/card_type_counts").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], json!("domain financial is not available"));
    // Censored by default: no file path leaks into the details.
    assert_eq!(body["details"], Value::Null);
}
