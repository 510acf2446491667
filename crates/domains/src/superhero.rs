//! Endpoints over the `superhero` benchmark database.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use bird_storage::{Domain, SqlParam};

use crate::error::ApiError;
use crate::params::{id_list, int_params, placeholders, text_list, text_params};
use crate::AppState;

const DOMAIN: Domain = Domain::Superhero;

#[derive(Deserialize)]
struct NameParams {
    name: String,
}

/// Full profile of one hero, with every lookup table resolved.
async fn hero_profile(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT s.id, s.superhero_name, s.full_name, g.gender, r.race, \
                    a.alignment, p.publisher_name, ec.colour AS eye_colour, \
                    hc.colour AS hair_colour, sc.colour AS skin_colour, \
                    s.height_cm, s.weight_kg \
             FROM superhero AS s \
             LEFT JOIN gender AS g ON s.gender_id = g.id \
             LEFT JOIN race AS r ON s.race_id = r.id \
             LEFT JOIN alignment AS a ON s.alignment_id = a.id \
             LEFT JOIN publisher AS p ON s.publisher_id = p.id \
             LEFT JOIN colour AS ec ON s.eye_colour_id = ec.id \
             LEFT JOIN colour AS hc ON s.hair_colour_id = hc.id \
             LEFT JOIN colour AS sc ON s.skin_colour_id = sc.id \
             WHERE s.superhero_name = ?1",
            vec![SqlParam::Text(params.name)],
        )
        .await
}

#[derive(Deserialize)]
struct ColourParams {
    colour: String,
}

async fn heroes_by_eye_colour(
    State(state): State<AppState>,
    Query(params): Query<ColourParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT s.superhero_name, s.full_name \
             FROM superhero AS s \
             JOIN colour AS c ON s.eye_colour_id = c.id \
             WHERE c.colour = ?1 \
             ORDER BY s.superhero_name",
            vec![SqlParam::Text(params.colour)],
        )
        .await
}

async fn heroes_by_skin_colour(
    State(state): State<AppState>,
    Query(params): Query<ColourParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT s.superhero_name \
             FROM superhero AS s \
             JOIN colour AS c ON s.skin_colour_id = c.id \
             WHERE c.colour = ?1 \
             ORDER BY s.superhero_name",
            vec![SqlParam::Text(params.colour)],
        )
        .await
}

#[derive(Deserialize)]
struct PublisherParams {
    publisher: String,
}

async fn heroes_by_publisher(
    State(state): State<AppState>,
    Query(params): Query<PublisherParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT s.superhero_name, s.full_name \
             FROM superhero AS s \
             JOIN publisher AS p ON s.publisher_id = p.id \
             WHERE p.publisher_name = ?1 \
             ORDER BY s.superhero_name",
            vec![SqlParam::Text(params.publisher)],
        )
        .await
}

/// Powers of one hero, alphabetically.
async fn powers_of_hero(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT sp.power_name \
             FROM superhero AS s \
             JOIN hero_power AS hp ON s.id = hp.hero_id \
             JOIN superpower AS sp ON hp.power_id = sp.id \
             WHERE s.superhero_name = ?1 \
             ORDER BY sp.power_name",
            vec![SqlParam::Text(params.name)],
        )
        .await
}

#[derive(Deserialize)]
struct PowerParams {
    power: String,
}

async fn heroes_with_power(
    State(state): State<AppState>,
    Query(params): Query<PowerParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT s.superhero_name \
             FROM superhero AS s \
             JOIN hero_power AS hp ON s.id = hp.hero_id \
             JOIN superpower AS sp ON hp.power_id = sp.id \
             WHERE sp.power_name = ?1 \
             ORDER BY s.superhero_name",
            vec![SqlParam::Text(params.power)],
        )
        .await
}

async fn power_count_of_hero(
    State(state): State<AppState>,
    Query(params): Query<NameParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT COUNT(hp.power_id) AS power_count \
             FROM superhero AS s \
             JOIN hero_power AS hp ON s.id = hp.hero_id \
             WHERE s.superhero_name = ?1",
            vec![SqlParam::Text(params.name)],
        )
        .await
}

#[derive(Deserialize)]
struct HeroAttributeParams {
    name: String,
    attribute: String,
}

async fn attribute_value_of_hero(
    State(state): State<AppState>,
    Query(params): Query<HeroAttributeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT ha.attribute_value \
             FROM superhero AS s \
             JOIN hero_attribute AS ha ON s.id = ha.hero_id \
             JOIN attribute AS a ON ha.attribute_id = a.id \
             WHERE s.superhero_name = ?1 AND a.attribute_name = ?2",
            vec![SqlParam::Text(params.name), SqlParam::Text(params.attribute)],
        )
        .await
}

#[derive(Deserialize)]
struct AttributeParams {
    attribute: String,
}

async fn average_attribute_value(
    State(state): State<AppState>,
    Query(params): Query<AttributeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT AVG(ha.attribute_value) AS average_value \
             FROM hero_attribute AS ha \
             JOIN attribute AS a ON ha.attribute_id = a.id \
             WHERE a.attribute_name = ?1",
            vec![SqlParam::Text(params.attribute)],
        )
        .await
}

#[derive(Deserialize)]
struct AttributeThresholdParams {
    attribute: String,
    minimum: i64,
}

async fn heroes_with_attribute_above(
    State(state): State<AppState>,
    Query(params): Query<AttributeThresholdParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT s.superhero_name, ha.attribute_value \
             FROM superhero AS s \
             JOIN hero_attribute AS ha ON s.id = ha.hero_id \
             JOIN attribute AS a ON ha.attribute_id = a.id \
             WHERE a.attribute_name = ?1 AND ha.attribute_value > ?2 \
             ORDER BY ha.attribute_value DESC",
            vec![
                SqlParam::Text(params.attribute),
                SqlParam::Integer(params.minimum),
            ],
        )
        .await
}

#[derive(Deserialize)]
struct LimitParams {
    limit: i64,
}

async fn heaviest_heroes(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT superhero_name, weight_kg \
             FROM superhero \
             WHERE weight_kg IS NOT NULL \
             ORDER BY weight_kg DESC \
             LIMIT ?1",
            vec![SqlParam::Integer(params.limit)],
        )
        .await
}

async fn tallest_hero_of_publisher(
    State(state): State<AppState>,
    Query(params): Query<PublisherParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT s.superhero_name, s.height_cm \
             FROM superhero AS s \
             JOIN publisher AS p ON s.publisher_id = p.id \
             WHERE p.publisher_name = ?1 \
             ORDER BY s.height_cm DESC \
             LIMIT 1",
            vec![SqlParam::Text(params.publisher)],
        )
        .await
}

/// Hero count per publisher, busiest first.
async fn publisher_hero_counts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT p.publisher_name, COUNT(s.id) AS hero_count \
             FROM publisher AS p \
             LEFT JOIN superhero AS s ON s.publisher_id = p.id \
             GROUP BY p.id \
             ORDER BY hero_count DESC, p.publisher_name",
            vec![],
        )
        .await
}

#[derive(Deserialize)]
struct AlignmentParams {
    alignment: String,
}

/// Percentage of all heroes that carry the given alignment.
async fn alignment_share(
    State(state): State<AppState>,
    Query(params): Query<AlignmentParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT CAST(SUM(CASE WHEN a.alignment = ?1 THEN 1 ELSE 0 END) AS REAL) \
                    * 100 / COUNT(s.id) AS percentage \
             FROM superhero AS s \
             JOIN alignment AS a ON s.alignment_id = a.id",
            vec![SqlParam::Text(params.alignment)],
        )
        .await
}

#[derive(Deserialize)]
struct RaceParams {
    race: String,
}

async fn heroes_by_race(
    State(state): State<AppState>,
    Query(params): Query<RaceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT s.superhero_name \
             FROM superhero AS s \
             JOIN race AS r ON s.race_id = r.id \
             WHERE r.race = ?1 \
             ORDER BY s.superhero_name",
            vec![SqlParam::Text(params.race)],
        )
        .await
}

async fn average_height_by_race(
    State(state): State<AppState>,
    Query(params): Query<RaceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT AVG(s.height_cm) AS average_height_cm \
             FROM superhero AS s \
             JOIN race AS r ON s.race_id = r.id \
             WHERE r.race = ?1",
            vec![SqlParam::Text(params.race)],
        )
        .await
}

/// Male-to-female ratio among one publisher's heroes.
async fn gender_ratio_of_publisher(
    State(state): State<AppState>,
    Query(params): Query<PublisherParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT CAST(SUM(CASE WHEN g.gender = 'Male' THEN 1 ELSE 0 END) AS REAL) \
                    / SUM(CASE WHEN g.gender = 'Female' THEN 1 ELSE 0 END) AS male_to_female \
             FROM superhero AS s \
             JOIN gender AS g ON s.gender_id = g.id \
             JOIN publisher AS p ON s.publisher_id = p.id \
             WHERE p.publisher_name = ?1",
            vec![SqlParam::Text(params.publisher)],
        )
        .await
}

#[derive(Deserialize)]
struct IdsParams {
    ids: String,
}

async fn heroes_by_ids(
    State(state): State<AppState>,
    Query(params): Query<IdsParams>,
) -> Result<Json<Value>, ApiError> {
    let ids = id_list("ids", &params.ids)?;
    let sql = format!(
        "SELECT id, superhero_name, full_name FROM superhero \
         WHERE id IN ({}) ORDER BY id",
        placeholders(ids.len())
    );
    state.rows(DOMAIN, sql, int_params(&ids)).await
}

#[derive(Deserialize)]
struct PublishersParams {
    publishers: String,
}

/// Hero counts for a comma-separated list of publishers.
async fn hero_counts_for_publishers(
    State(state): State<AppState>,
    Query(params): Query<PublishersParams>,
) -> Result<Json<Value>, ApiError> {
    let names = text_list("publishers", &params.publishers)?;
    let sql = format!(
        "SELECT p.publisher_name, COUNT(s.id) AS hero_count \
         FROM publisher AS p \
         LEFT JOIN superhero AS s ON s.publisher_id = p.id \
         WHERE p.publisher_name IN ({}) \
         GROUP BY p.id \
         ORDER BY p.publisher_name",
        placeholders(names.len())
    );
    state.rows(DOMAIN, sql, text_params(names)).await
}

async fn heroes_without_full_name(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT superhero_name FROM superhero \
             WHERE full_name IS NULL OR full_name = '' \
             ORDER BY superhero_name",
            vec![],
        )
        .await
}

async fn most_common_powers(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT sp.power_name, COUNT(hp.hero_id) AS hero_count \
             FROM superpower AS sp \
             JOIN hero_power AS hp ON hp.power_id = sp.id \
             GROUP BY sp.id \
             ORDER BY hero_count DESC, sp.power_name \
             LIMIT ?1",
            vec![SqlParam::Integer(params.limit)],
        )
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hero_profile", get(hero_profile))
        .route("/heroes_by_eye_colour", get(heroes_by_eye_colour))
        .route("/heroes_by_skin_colour", get(heroes_by_skin_colour))
        .route("/heroes_by_publisher", get(heroes_by_publisher))
        .route("/powers_of_hero", get(powers_of_hero))
        .route("/heroes_with_power", get(heroes_with_power))
        .route("/power_count_of_hero", get(power_count_of_hero))
        .route("/attribute_value_of_hero", get(attribute_value_of_hero))
        .route("/average_attribute_value", get(average_attribute_value))
        .route(
            "/heroes_with_attribute_above",
            get(heroes_with_attribute_above),
        )
        .route("/heaviest_heroes", get(heaviest_heroes))
        .route("/tallest_hero_of_publisher", get(tallest_hero_of_publisher))
        .route("/publisher_hero_counts", get(publisher_hero_counts))
        .route("/alignment_share", get(alignment_share))
        .route("/heroes_by_race", get(heroes_by_race))
        .route("/average_height_by_race", get(average_height_by_race))
        .route("/gender_ratio_of_publisher", get(gender_ratio_of_publisher))
        .route("/heroes_by_ids", get(heroes_by_ids))
        .route(
            "/hero_counts_for_publishers",
            get(hero_counts_for_publishers),
        )
        .route("/heroes_without_full_name", get(heroes_without_full_name))
        .route("/most_common_powers", get(most_common_powers))
}
