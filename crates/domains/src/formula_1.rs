//! Endpoints over the `formula_1` benchmark database.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use bird_storage::{Domain, SqlParam};

use crate::error::ApiError;
use crate::params::{id_list, int_params, placeholders, text_list, text_params};
use crate::AppState;

const DOMAIN: Domain = Domain::Formula1;

#[derive(Deserialize)]
struct RaceParams {
    year: i64,
    race: String,
}

/// Winner of one race, identified by season and race name.
async fn race_winner(
    State(state): State<AppState>,
    Query(params): Query<RaceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT d.forename, d.surname, res.time, res.laps \
             FROM results AS res \
             JOIN races AS r ON res.raceId = r.raceId \
             JOIN drivers AS d ON res.driverId = d.driverId \
             WHERE r.year = ?1 AND r.name = ?2 AND res.positionOrder = 1",
            vec![SqlParam::Integer(params.year), SqlParam::Text(params.race)],
        )
        .await
}

#[derive(Deserialize)]
struct DriverParams {
    forename: String,
    surname: String,
}

async fn driver_win_count(
    State(state): State<AppState>,
    Query(params): Query<DriverParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT COUNT(res.resultId) AS wins \
             FROM results AS res \
             JOIN drivers AS d ON res.driverId = d.driverId \
             WHERE d.forename = ?1 AND d.surname = ?2 AND res.positionOrder = 1",
            vec![
                SqlParam::Text(params.forename),
                SqlParam::Text(params.surname),
            ],
        )
        .await
}

#[derive(Deserialize)]
struct YearParams {
    year: i64,
}

async fn races_in_season(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT r.round, r.name, r.date, c.name AS circuit, c.country \
             FROM races AS r \
             JOIN circuits AS c ON r.circuitId = c.circuitId \
             WHERE r.year = ?1 \
             ORDER BY r.round",
            vec![SqlParam::Integer(params.year)],
        )
        .await
}

#[derive(Deserialize)]
struct CircuitParams {
    circuit: String,
}

async fn races_at_circuit(
    State(state): State<AppState>,
    Query(params): Query<CircuitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT r.year, r.name, r.date \
             FROM races AS r \
             JOIN circuits AS c ON r.circuitId = c.circuitId \
             WHERE c.name = ?1 \
             ORDER BY r.year",
            vec![SqlParam::Text(params.circuit)],
        )
        .await
}

#[derive(Deserialize)]
struct CountryParams {
    country: String,
}

async fn circuits_in_country(
    State(state): State<AppState>,
    Query(params): Query<CountryParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT name, location, lat, lng \
             FROM circuits \
             WHERE country = ?1 \
             ORDER BY name",
            vec![SqlParam::Text(params.country)],
        )
        .await
}

#[derive(Deserialize)]
struct NationalityParams {
    nationality: String,
}

async fn drivers_by_nationality(
    State(state): State<AppState>,
    Query(params): Query<NationalityParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT forename, surname, dob \
             FROM drivers \
             WHERE nationality = ?1 \
             ORDER BY surname, forename",
            vec![SqlParam::Text(params.nationality)],
        )
        .await
}

/// Driver's age in full years on the day of their first race.
async fn driver_age_at_first_race(
    State(state): State<AppState>,
    Query(params): Query<DriverParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT d.forename, d.surname, MIN(r.date) AS first_race, \
                    CAST((JULIANDAY(MIN(r.date)) - JULIANDAY(d.dob)) / 365.25 AS INTEGER) \
                        AS age_at_first_race \
             FROM drivers AS d \
             JOIN results AS res ON res.driverId = d.driverId \
             JOIN races AS r ON res.raceId = r.raceId \
             WHERE d.forename = ?1 AND d.surname = ?2 \
             GROUP BY d.driverId",
            vec![
                SqlParam::Text(params.forename),
                SqlParam::Text(params.surname),
            ],
        )
        .await
}

#[derive(Deserialize)]
struct SeasonDriverParams {
    year: i64,
    forename: String,
    surname: String,
}

async fn driver_points_in_season(
    State(state): State<AppState>,
    Query(params): Query<SeasonDriverParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT SUM(res.points) AS points \
             FROM results AS res \
             JOIN races AS r ON res.raceId = r.raceId \
             JOIN drivers AS d ON res.driverId = d.driverId \
             WHERE r.year = ?1 AND d.forename = ?2 AND d.surname = ?3",
            vec![
                SqlParam::Integer(params.year),
                SqlParam::Text(params.forename),
                SqlParam::Text(params.surname),
            ],
        )
        .await
}

/// Final driver standings of a season, taken after its last round.
async fn season_driver_standings(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT ds.position, d.forename, d.surname, ds.points, ds.wins \
             FROM driverStandings AS ds \
             JOIN drivers AS d ON ds.driverId = d.driverId \
             WHERE ds.raceId = (SELECT raceId FROM races \
                                WHERE year = ?1 ORDER BY round DESC LIMIT 1) \
             ORDER BY ds.position",
            vec![SqlParam::Integer(params.year)],
        )
        .await
}

#[derive(Deserialize)]
struct ConstructorSeasonParams {
    year: i64,
    constructor: String,
}

async fn constructor_points_in_season(
    State(state): State<AppState>,
    Query(params): Query<ConstructorSeasonParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT SUM(res.points) AS points \
             FROM results AS res \
             JOIN races AS r ON res.raceId = r.raceId \
             JOIN constructors AS c ON res.constructorId = c.constructorId \
             WHERE r.year = ?1 AND c.name = ?2",
            vec![
                SqlParam::Integer(params.year),
                SqlParam::Text(params.constructor),
            ],
        )
        .await
}

/// Per-lap leaderboard of one race, ranked by lap time within each lap.
async fn lap_ranking(
    State(state): State<AppState>,
    Query(params): Query<RaceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT lt.lap, d.surname, lt.time, \
                    RANK() OVER (PARTITION BY lt.lap ORDER BY lt.milliseconds) AS lap_rank \
             FROM lapTimes AS lt \
             JOIN races AS r ON lt.raceId = r.raceId \
             JOIN drivers AS d ON lt.driverId = d.driverId \
             WHERE r.year = ?1 AND r.name = ?2 \
             ORDER BY lt.lap, lap_rank",
            vec![SqlParam::Integer(params.year), SqlParam::Text(params.race)],
        )
        .await
}

/// Fastest single lap ever set at a circuit.
async fn fastest_lap_at_circuit(
    State(state): State<AppState>,
    Query(params): Query<CircuitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT d.forename, d.surname, r.year, lt.lap, lt.time \
             FROM lapTimes AS lt \
             JOIN races AS r ON lt.raceId = r.raceId \
             JOIN circuits AS c ON r.circuitId = c.circuitId \
             JOIN drivers AS d ON lt.driverId = d.driverId \
             WHERE c.name = ?1 \
             ORDER BY lt.milliseconds \
             LIMIT 1",
            vec![SqlParam::Text(params.circuit)],
        )
        .await
}

async fn average_pit_stop_duration(
    State(state): State<AppState>,
    Query(params): Query<RaceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT AVG(ps.milliseconds) / 1000.0 AS average_seconds, \
                    COUNT(ps.stop) AS stop_count \
             FROM pitStops AS ps \
             JOIN races AS r ON ps.raceId = r.raceId \
             WHERE r.year = ?1 AND r.name = ?2",
            vec![SqlParam::Integer(params.year), SqlParam::Text(params.race)],
        )
        .await
}

/// Front row (grid positions 1 and 2) of one race's qualifying.
async fn qualifying_front_row(
    State(state): State<AppState>,
    Query(params): Query<RaceParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT q.position, d.forename, d.surname, q.q1, q.q2, q.q3 \
             FROM qualifying AS q \
             JOIN races AS r ON q.raceId = r.raceId \
             JOIN drivers AS d ON q.driverId = d.driverId \
             WHERE r.year = ?1 AND r.name = ?2 AND q.position <= 2 \
             ORDER BY q.position",
            vec![SqlParam::Integer(params.year), SqlParam::Text(params.race)],
        )
        .await
}

/// Share of a driver's races not classified as finished.
async fn driver_retirement_rate(
    State(state): State<AppState>,
    Query(params): Query<DriverParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT CAST(SUM(CASE WHEN s.status != 'Finished' AND s.status NOT LIKE '+%' \
                                  THEN 1 ELSE 0 END) AS REAL) * 100 \
                    / COUNT(res.resultId) AS retirement_percentage, \
                    COUNT(res.resultId) AS race_count \
             FROM results AS res \
             JOIN drivers AS d ON res.driverId = d.driverId \
             JOIN status AS s ON res.statusId = s.statusId \
             WHERE d.forename = ?1 AND d.surname = ?2",
            vec![
                SqlParam::Text(params.forename),
                SqlParam::Text(params.surname),
            ],
        )
        .await
}

async fn drivers_by_ids(
    State(state): State<AppState>,
    Query(params): Query<IdsParams>,
) -> Result<Json<Value>, ApiError> {
    let ids = id_list("ids", &params.ids)?;
    let sql = format!(
        "SELECT driverId, forename, surname, nationality, dob \
         FROM drivers WHERE driverId IN ({}) ORDER BY driverId",
        placeholders(ids.len())
    );
    state.rows(DOMAIN, sql, int_params(&ids)).await
}

#[derive(Deserialize)]
struct IdsParams {
    ids: String,
}

#[derive(Deserialize)]
struct ConstructorsParams {
    constructors: String,
}

/// Career win totals for a comma-separated list of constructors.
async fn constructor_win_totals(
    State(state): State<AppState>,
    Query(params): Query<ConstructorsParams>,
) -> Result<Json<Value>, ApiError> {
    let names = text_list("constructors", &params.constructors)?;
    let sql = format!(
        "SELECT c.name, COUNT(res.resultId) AS wins \
         FROM constructors AS c \
         LEFT JOIN results AS res \
                ON res.constructorId = c.constructorId AND res.positionOrder = 1 \
         WHERE c.name IN ({}) \
         GROUP BY c.constructorId \
         ORDER BY wins DESC, c.name",
        placeholders(names.len())
    );
    state.rows(DOMAIN, sql, text_params(names)).await
}

#[derive(Deserialize)]
struct LimitParams {
    limit: i64,
}

/// Youngest race winners in history, by age on race day.
async fn youngest_winners(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT d.forename, d.surname, r.name AS race, r.date, \
                    (JULIANDAY(r.date) - JULIANDAY(d.dob)) / 365.25 AS age_years \
             FROM results AS res \
             JOIN races AS r ON res.raceId = r.raceId \
             JOIN drivers AS d ON res.driverId = d.driverId \
             WHERE res.positionOrder = 1 AND d.dob IS NOT NULL \
             ORDER BY age_years \
             LIMIT ?1",
            vec![SqlParam::Integer(params.limit)],
        )
        .await
}

async fn season_count_by_circuit(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT c.name, c.country, COUNT(DISTINCT r.year) AS season_count \
             FROM circuits AS c \
             JOIN races AS r ON r.circuitId = c.circuitId \
             GROUP BY c.circuitId \
             ORDER BY season_count DESC, c.name",
            vec![],
        )
        .await
}

#[derive(Deserialize)]
struct GridParams {
    year: i64,
    race: String,
    grid: i64,
}

/// Finishing position of the driver who started from the given grid slot.
async fn finish_from_grid(
    State(state): State<AppState>,
    Query(params): Query<GridParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT d.forename, d.surname, res.grid, res.positionText \
             FROM results AS res \
             JOIN races AS r ON res.raceId = r.raceId \
             JOIN drivers AS d ON res.driverId = d.driverId \
             WHERE r.year = ?1 AND r.name = ?2 AND res.grid = ?3",
            vec![
                SqlParam::Integer(params.year),
                SqlParam::Text(params.race),
                SqlParam::Integer(params.grid),
            ],
        )
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/race_winner", get(race_winner))
        .route("/driver_win_count", get(driver_win_count))
        .route("/races_in_season", get(races_in_season))
        .route("/races_at_circuit", get(races_at_circuit))
        .route("/circuits_in_country", get(circuits_in_country))
        .route("/drivers_by_nationality", get(drivers_by_nationality))
        .route("/driver_age_at_first_race", get(driver_age_at_first_race))
        .route("/driver_points_in_season", get(driver_points_in_season))
        .route("/season_driver_standings", get(season_driver_standings))
        .route(
            "/constructor_points_in_season",
            get(constructor_points_in_season),
        )
        .route("/lap_ranking", get(lap_ranking))
        .route("/fastest_lap_at_circuit", get(fastest_lap_at_circuit))
        .route(
            "/average_pit_stop_duration",
            get(average_pit_stop_duration),
        )
        .route("/qualifying_front_row", get(qualifying_front_row))
        .route("/driver_retirement_rate", get(driver_retirement_rate))
        .route("/drivers_by_ids", get(drivers_by_ids))
        .route("/constructor_win_totals", get(constructor_win_totals))
        .route("/youngest_winners", get(youngest_winners))
        .route("/season_count_by_circuit", get(season_count_by_circuit))
        .route("/finish_from_grid", get(finish_from_grid))
}
