//! Endpoints over the `codebase_community` benchmark database, a Stack
//! Exchange dump. Two column names carry the dataset's own typos
//! (`posts.CreaionDate`, `posts.LasActivityDate`); they are schema facts and
//! used as-is.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use bird_storage::{Domain, SqlParam};

use crate::error::ApiError;
use crate::params::{id_list, int_params, placeholders};
use crate::AppState;

const DOMAIN: Domain = Domain::CodebaseCommunity;

#[derive(Deserialize)]
struct UserParams {
    display_name: String,
}

async fn user_by_display_name(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT Id, DisplayName, Reputation, CreationDate, Location, Age, \
                    Views, UpVotes, DownVotes \
             FROM users \
             WHERE DisplayName = ?1",
            vec![SqlParam::Text(params.display_name)],
        )
        .await
}

#[derive(Deserialize)]
struct TagParams {
    tag: String,
}

/// Questions carrying the given tag, highest scored first.
async fn posts_with_tag(
    State(state): State<AppState>,
    Query(params): Query<TagParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT Id, Title, Score, ViewCount, AnswerCount \
             FROM posts \
             WHERE Tags LIKE '%<' || ?1 || '>%' \
             ORDER BY Score DESC",
            vec![SqlParam::Text(params.tag)],
        )
        .await
}

async fn average_views_for_tag(
    State(state): State<AppState>,
    Query(params): Query<TagParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT AVG(ViewCount) AS average_views, COUNT(Id) AS post_count \
             FROM posts \
             WHERE Tags LIKE '%<' || ?1 || '>%'",
            vec![SqlParam::Text(params.tag)],
        )
        .await
}

async fn badge_count_of_user(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT u.DisplayName, COUNT(b.Id) AS badge_count \
             FROM users AS u \
             LEFT JOIN badges AS b ON b.UserId = u.Id \
             WHERE u.DisplayName = ?1 \
             GROUP BY u.Id",
            vec![SqlParam::Text(params.display_name)],
        )
        .await
}

#[derive(Deserialize)]
struct BadgeParams {
    badge: String,
}

async fn users_with_badge(
    State(state): State<AppState>,
    Query(params): Query<BadgeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT DISTINCT u.DisplayName, u.Reputation \
             FROM badges AS b \
             JOIN users AS u ON b.UserId = u.Id \
             WHERE b.Name = ?1 \
             ORDER BY u.Reputation DESC",
            vec![SqlParam::Text(params.badge)],
        )
        .await
}

#[derive(Deserialize)]
struct LimitParams {
    limit: i64,
}

async fn top_scored_posts(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT p.Id, p.Title, p.Score, u.DisplayName AS owner \
             FROM posts AS p \
             LEFT JOIN users AS u ON p.OwnerUserId = u.Id \
             WHERE p.Title IS NOT NULL \
             ORDER BY p.Score DESC \
             LIMIT ?1",
            vec![SqlParam::Integer(params.limit)],
        )
        .await
}

#[derive(Deserialize)]
struct TitleParams {
    title: String,
}

/// Comments on the post with the given title, newest first.
async fn comments_on_post(
    State(state): State<AppState>,
    Query(params): Query<TitleParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT c.Text, c.Score, c.CreationDate, u.DisplayName AS commenter \
             FROM comments AS c \
             JOIN posts AS p ON c.PostId = p.Id \
             LEFT JOIN users AS u ON c.UserId = u.Id \
             WHERE p.Title = ?1 \
             ORDER BY c.CreationDate DESC",
            vec![SqlParam::Text(params.title)],
        )
        .await
}

#[derive(Deserialize)]
struct YearParams {
    year: i64,
}

/// Posts created in the given year. The creation column is the dataset's
/// misspelled `CreaionDate`.
async fn posts_created_in_year(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT COUNT(Id) AS post_count \
             FROM posts \
             WHERE STRFTIME('%Y', CreaionDate) = CAST(?1 AS TEXT)",
            vec![SqlParam::Integer(params.year)],
        )
        .await
}

#[derive(Deserialize)]
struct LocationParams {
    location: String,
}

async fn users_from_location(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT DisplayName, Reputation, CreationDate \
             FROM users \
             WHERE Location = ?1 \
             ORDER BY Reputation DESC",
            vec![SqlParam::Text(params.location)],
        )
        .await
}

#[derive(Deserialize)]
struct AgeParams {
    minimum_age: i64,
}

async fn users_older_than(
    State(state): State<AppState>,
    Query(params): Query<AgeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT DisplayName, Age, Reputation \
             FROM users \
             WHERE Age > ?1 \
             ORDER BY Age DESC, DisplayName",
            vec![SqlParam::Integer(params.minimum_age)],
        )
        .await
}

#[derive(Deserialize)]
struct PostIdParams {
    post_id: i64,
}

/// Vote tally per vote type for one post.
async fn vote_breakdown_of_post(
    State(state): State<AppState>,
    Query(params): Query<PostIdParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT VoteTypeId, COUNT(Id) AS vote_count \
             FROM votes \
             WHERE PostId = ?1 \
             GROUP BY VoteTypeId \
             ORDER BY VoteTypeId",
            vec![SqlParam::Integer(params.post_id)],
        )
        .await
}

async fn bounty_total_of_post(
    State(state): State<AppState>,
    Query(params): Query<PostIdParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT SUM(BountyAmount) AS bounty_total \
             FROM votes \
             WHERE PostId = ?1 AND BountyAmount IS NOT NULL",
            vec![SqlParam::Integer(params.post_id)],
        )
        .await
}

/// Posts linked to the given post via postLinks.
async fn related_posts(
    State(state): State<AppState>,
    Query(params): Query<PostIdParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT pl.LinkTypeId, rp.Id, rp.Title, rp.Score \
             FROM postLinks AS pl \
             JOIN posts AS rp ON pl.RelatedPostId = rp.Id \
             WHERE pl.PostId = ?1 \
             ORDER BY pl.CreationDate",
            vec![SqlParam::Integer(params.post_id)],
        )
        .await
}

/// Revision history of one post, oldest first.
async fn post_history(
    State(state): State<AppState>,
    Query(params): Query<PostIdParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT PostHistoryTypeId, CreationDate, UserDisplayName, Comment \
             FROM postHistory \
             WHERE PostId = ?1 \
             ORDER BY CreationDate",
            vec![SqlParam::Integer(params.post_id)],
        )
        .await
}

#[derive(Deserialize)]
struct TagCountParams {
    minimum_count: i64,
}

async fn popular_tags(
    State(state): State<AppState>,
    Query(params): Query<TagCountParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT TagName, Count \
             FROM tags \
             WHERE Count > ?1 \
             ORDER BY Count DESC",
            vec![SqlParam::Integer(params.minimum_count)],
        )
        .await
}

/// Answer acceptance rate for questions owned by one user.
async fn acceptance_rate_of_user(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT u.DisplayName, COUNT(p.Id) AS question_count, \
                    CAST(SUM(CASE WHEN p.AcceptedAnswerId IS NOT NULL THEN 1 ELSE 0 END) AS REAL) \
                        * 100 / COUNT(p.Id) AS acceptance_percentage \
             FROM users AS u \
             JOIN posts AS p ON p.OwnerUserId = u.Id AND p.PostTypeId = 1 \
             WHERE u.DisplayName = ?1 \
             GROUP BY u.Id",
            vec![SqlParam::Text(params.display_name)],
        )
        .await
}

#[derive(Deserialize)]
struct UserIdsParams {
    user_ids: String,
}

/// Reputation summaries for a comma-separated list of user ids.
async fn reputation_of_users(
    State(state): State<AppState>,
    Query(params): Query<UserIdsParams>,
) -> Result<Json<Value>, ApiError> {
    let ids = id_list("user_ids", &params.user_ids)?;
    let sql = format!(
        "SELECT Id, DisplayName, Reputation, UpVotes, DownVotes \
         FROM users WHERE Id IN ({}) ORDER BY Id",
        placeholders(ids.len())
    );
    state.rows(DOMAIN, sql, int_params(&ids)).await
}

/// Most recently active posts, per the dataset's `LasActivityDate` column.
async fn recently_active_posts(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT Id, Title, LasActivityDate, Score \
             FROM posts \
             WHERE Title IS NOT NULL \
             ORDER BY LasActivityDate DESC \
             LIMIT ?1",
            vec![SqlParam::Integer(params.limit)],
        )
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user_by_display_name", get(user_by_display_name))
        .route("/posts_with_tag", get(posts_with_tag))
        .route("/average_views_for_tag", get(average_views_for_tag))
        .route("/badge_count_of_user", get(badge_count_of_user))
        .route("/users_with_badge", get(users_with_badge))
        .route("/top_scored_posts", get(top_scored_posts))
        .route("/comments_on_post", get(comments_on_post))
        .route("/posts_created_in_year", get(posts_created_in_year))
        .route("/users_from_location", get(users_from_location))
        .route("/users_older_than", get(users_older_than))
        .route("/vote_breakdown_of_post", get(vote_breakdown_of_post))
        .route("/bounty_total_of_post", get(bounty_total_of_post))
        .route("/related_posts", get(related_posts))
        .route("/post_history", get(post_history))
        .route("/popular_tags", get(popular_tags))
        .route("/acceptance_rate_of_user", get(acceptance_rate_of_user))
        .route("/reputation_of_users", get(reputation_of_users))
        .route("/recently_active_posts", get(recently_active_posts))
}
