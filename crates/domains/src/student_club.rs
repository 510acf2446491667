//! Endpoints over the `student_club` benchmark database.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use bird_storage::{Domain, SqlParam};

use crate::error::ApiError;
use crate::params::{placeholders, text_list, text_params};
use crate::AppState;

const DOMAIN: Domain = Domain::StudentClub;

#[derive(Deserialize)]
struct EventParams {
    event: String,
}

/// Members who attended the named event.
async fn event_attendees(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT m.first_name, m.last_name, m.position \
             FROM attendance AS a \
             JOIN event AS e ON a.link_to_event = e.event_id \
             JOIN member AS m ON a.link_to_member = m.member_id \
             WHERE e.event_name = ?1 \
             ORDER BY m.last_name, m.first_name",
            vec![SqlParam::Text(params.event)],
        )
        .await
}

async fn event_attendance_count(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT e.event_name, COUNT(a.link_to_member) AS attendee_count \
             FROM event AS e \
             LEFT JOIN attendance AS a ON a.link_to_event = e.event_id \
             WHERE e.event_name = ?1 \
             GROUP BY e.event_id",
            vec![SqlParam::Text(params.event)],
        )
        .await
}

#[derive(Deserialize)]
struct MemberParams {
    first_name: String,
    last_name: String,
}

async fn events_attended_by_member(
    State(state): State<AppState>,
    Query(params): Query<MemberParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT e.event_name, e.event_date, e.type, e.location \
             FROM member AS m \
             JOIN attendance AS a ON a.link_to_member = m.member_id \
             JOIN event AS e ON a.link_to_event = e.event_id \
             WHERE m.first_name = ?1 AND m.last_name = ?2 \
             ORDER BY e.event_date",
            vec![
                SqlParam::Text(params.first_name),
                SqlParam::Text(params.last_name),
            ],
        )
        .await
}

/// Budget lines for the named event, with spend position.
async fn event_budget(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT b.category, b.amount, b.spent, b.remaining \
             FROM budget AS b \
             JOIN event AS e ON b.link_to_event = e.event_id \
             WHERE e.event_name = ?1 \
             ORDER BY b.category",
            vec![SqlParam::Text(params.event)],
        )
        .await
}

/// Budget lines already spent past their allocation.
async fn overspent_budgets(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT e.event_name, b.category, b.amount, b.spent, b.remaining \
             FROM budget AS b \
             JOIN event AS e ON b.link_to_event = e.event_id \
             WHERE b.remaining < 0 \
             ORDER BY b.remaining",
            vec![],
        )
        .await
}

async fn total_expense_of_member(
    State(state): State<AppState>,
    Query(params): Query<MemberParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT m.first_name, m.last_name, SUM(ex.cost) AS total_cost, \
                    COUNT(ex.expense_id) AS expense_count \
             FROM member AS m \
             JOIN expense AS ex ON ex.link_to_member = m.member_id \
             WHERE m.first_name = ?1 AND m.last_name = ?2 \
             GROUP BY m.member_id",
            vec![
                SqlParam::Text(params.first_name),
                SqlParam::Text(params.last_name),
            ],
        )
        .await
}

#[derive(Deserialize)]
struct SourceParams {
    source: String,
}

async fn income_by_source(
    State(state): State<AppState>,
    Query(params): Query<SourceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT source, COUNT(income_id) AS payment_count, SUM(amount) AS total_amount \
             FROM income \
             WHERE source = ?1 \
             GROUP BY source",
            vec![SqlParam::Text(params.source)],
        )
        .await
}

#[derive(Deserialize)]
struct MajorParams {
    major: String,
}

async fn members_by_major(
    State(state): State<AppState>,
    Query(params): Query<MajorParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT m.first_name, m.last_name, m.position \
             FROM member AS m \
             JOIN major AS mj ON m.link_to_major = mj.major_id \
             WHERE mj.major_name = ?1 \
             ORDER BY m.last_name, m.first_name",
            vec![SqlParam::Text(params.major)],
        )
        .await
}

#[derive(Deserialize)]
struct CollegeParams {
    college: String,
}

async fn majors_in_college(
    State(state): State<AppState>,
    Query(params): Query<CollegeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT major_name, department \
             FROM major \
             WHERE college = ?1 \
             ORDER BY major_name",
            vec![SqlParam::Text(params.college)],
        )
        .await
}

#[derive(Deserialize)]
struct ShirtSizeParams {
    size: String,
}

async fn members_by_shirt_size(
    State(state): State<AppState>,
    Query(params): Query<ShirtSizeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT first_name, last_name, t_shirt_size \
             FROM member \
             WHERE t_shirt_size = ?1 \
             ORDER BY last_name, first_name",
            vec![SqlParam::Text(params.size)],
        )
        .await
}

#[derive(Deserialize)]
struct DateRangeParams {
    from: String,
    to: String,
}

async fn events_between(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT event_name, event_date, type, location, status \
             FROM event \
             WHERE event_date >= ?1 AND event_date <= ?2 \
             ORDER BY event_date",
            vec![SqlParam::Text(params.from), SqlParam::Text(params.to)],
        )
        .await
}

#[derive(Deserialize)]
struct StateParams {
    state: String,
}

/// Members whose home zip code lies in the given US state.
async fn members_from_state(
    State(state): State<AppState>,
    Query(params): Query<StateParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT m.first_name, m.last_name, z.city, z.state \
             FROM member AS m \
             JOIN zip_code AS z ON m.zip = z.zip_code \
             WHERE z.state = ?1 \
             ORDER BY m.last_name, m.first_name",
            vec![SqlParam::Text(params.state)],
        )
        .await
}

#[derive(Deserialize)]
struct PositionParams {
    position: String,
}

async fn members_by_position(
    State(state): State<AppState>,
    Query(params): Query<PositionParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT first_name, last_name, email \
             FROM member \
             WHERE position = ?1 \
             ORDER BY last_name, first_name",
            vec![SqlParam::Text(params.position)],
        )
        .await
}

#[derive(Deserialize)]
struct DescriptionParams {
    description: String,
}

async fn average_cost_of_expense(
    State(state): State<AppState>,
    Query(params): Query<DescriptionParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT expense_description, AVG(cost) AS average_cost, \
                    COUNT(expense_id) AS expense_count \
             FROM expense \
             WHERE expense_description = ?1 \
             GROUP BY expense_description",
            vec![SqlParam::Text(params.description)],
        )
        .await
}

#[derive(Deserialize)]
struct CategoriesParams {
    categories: String,
}

/// Spend totals for a comma-separated list of budget categories.
async fn budget_totals_for_categories(
    State(state): State<AppState>,
    Query(params): Query<CategoriesParams>,
) -> Result<Json<Value>, ApiError> {
    let categories = text_list("categories", &params.categories)?;
    let sql = format!(
        "SELECT category, SUM(amount) AS allocated, SUM(spent) AS spent, \
                SUM(remaining) AS remaining \
         FROM budget \
         WHERE category IN ({}) \
         GROUP BY category \
         ORDER BY category",
        placeholders(categories.len())
    );
    state.rows(DOMAIN, sql, text_params(categories)).await
}

/// Attendance share of one event relative to total membership.
async fn event_attendance_share(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT e.event_name, \
                    CAST(COUNT(a.link_to_member) AS REAL) * 100 \
                        / (SELECT COUNT(member_id) FROM member) AS attendance_percentage \
             FROM event AS e \
             LEFT JOIN attendance AS a ON a.link_to_event = e.event_id \
             WHERE e.event_name = ?1 \
             GROUP BY e.event_id",
            vec![SqlParam::Text(params.event)],
        )
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/event_attendees", get(event_attendees))
        .route("/event_attendance_count", get(event_attendance_count))
        .route(
            "/events_attended_by_member",
            get(events_attended_by_member),
        )
        .route("/event_budget", get(event_budget))
        .route("/overspent_budgets", get(overspent_budgets))
        .route("/total_expense_of_member", get(total_expense_of_member))
        .route("/income_by_source", get(income_by_source))
        .route("/members_by_major", get(members_by_major))
        .route("/majors_in_college", get(majors_in_college))
        .route("/members_by_shirt_size", get(members_by_shirt_size))
        .route("/events_between", get(events_between))
        .route("/members_from_state", get(members_from_state))
        .route("/members_by_position", get(members_by_position))
        .route("/average_cost_of_expense", get(average_cost_of_expense))
        .route(
            "/budget_totals_for_categories",
            get(budget_totals_for_categories),
        )
        .route("/event_attendance_share", get(event_attendance_share))
}
