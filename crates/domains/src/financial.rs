//! Endpoints over the `financial` benchmark database (Czech banking
//! dataset: accounts, clients, loans, transactions).

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use bird_storage::{Domain, SqlParam};

use crate::error::ApiError;
use crate::params::{id_list, int_params, placeholders};
use crate::AppState;

const DOMAIN: Domain = Domain::Financial;

#[derive(Deserialize)]
struct StatusParams {
    status: String,
}

/// Loans carrying the given repayment status (A/B/C/D in the dataset).
async fn loans_by_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT loan_id, account_id, date, amount, duration, payments \
             FROM loan \
             WHERE status = ?1 \
             ORDER BY date",
            vec![SqlParam::Text(params.status)],
        )
        .await
}

#[derive(Deserialize)]
struct DurationParams {
    duration: i64,
}

async fn average_loan_by_duration(
    State(state): State<AppState>,
    Query(params): Query<DurationParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT AVG(amount) AS average_amount, COUNT(loan_id) AS loan_count \
             FROM loan \
             WHERE duration = ?1",
            vec![SqlParam::Integer(params.duration)],
        )
        .await
}

#[derive(Deserialize)]
struct DistrictParams {
    district: String,
}

/// Clients living in the named district (`A2` is the district name column).
async fn clients_in_district(
    State(state): State<AppState>,
    Query(params): Query<DistrictParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT c.client_id, c.gender, c.birth_date \
             FROM client AS c \
             JOIN district AS d ON c.district_id = d.district_id \
             WHERE d.A2 = ?1 \
             ORDER BY c.client_id",
            vec![SqlParam::Text(params.district)],
        )
        .await
}

/// Percentage of female clients in the named district.
async fn female_client_share_in_district(
    State(state): State<AppState>,
    Query(params): Query<DistrictParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT CAST(SUM(CASE WHEN c.gender = 'F' THEN 1 ELSE 0 END) AS REAL) \
                    * 100 / COUNT(c.client_id) AS female_percentage \
             FROM client AS c \
             JOIN district AS d ON c.district_id = d.district_id \
             WHERE d.A2 = ?1",
            vec![SqlParam::Text(params.district)],
        )
        .await
}

#[derive(Deserialize)]
struct YearParams {
    year: i64,
}

async fn accounts_opened_in_year(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT a.account_id, a.date, a.frequency, d.A2 AS district \
             FROM account AS a \
             JOIN district AS d ON a.district_id = d.district_id \
             WHERE STRFTIME('%Y', a.date) = CAST(?1 AS TEXT) \
             ORDER BY a.date",
            vec![SqlParam::Integer(params.year)],
        )
        .await
}

#[derive(Deserialize)]
struct FrequencyParams {
    frequency: String,
}

/// Accounts billed with the given statement frequency
/// (e.g. `POPLATEK MESICNE` for monthly issuance).
async fn accounts_by_frequency(
    State(state): State<AppState>,
    Query(params): Query<FrequencyParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT account_id, district_id, date \
             FROM account \
             WHERE frequency = ?1 \
             ORDER BY account_id",
            vec![SqlParam::Text(params.frequency)],
        )
        .await
}

#[derive(Deserialize)]
struct CardTypeParams {
    r#type: String,
}

/// Clients holding a card of the given type, via their disposition.
async fn clients_with_card_type(
    State(state): State<AppState>,
    Query(params): Query<CardTypeParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT c.client_id, c.gender, cd.issued \
             FROM client AS c \
             JOIN disp AS dp ON dp.client_id = c.client_id \
             JOIN card AS cd ON cd.disp_id = dp.disp_id \
             WHERE cd.type = ?1 \
             ORDER BY cd.issued",
            vec![SqlParam::Text(params.r#type)],
        )
        .await
}

async fn card_type_counts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT type, COUNT(card_id) AS card_count \
             FROM card \
             GROUP BY type \
             ORDER BY card_count DESC",
            vec![],
        )
        .await
}

#[derive(Deserialize)]
struct AccountAmountParams {
    account_id: i64,
    minimum: f64,
}

async fn large_transactions_of_account(
    State(state): State<AppState>,
    Query(params): Query<AccountAmountParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT trans_id, date, type, operation, amount, balance \
             FROM trans \
             WHERE account_id = ?1 AND amount > ?2 \
             ORDER BY date",
            vec![
                SqlParam::Integer(params.account_id),
                SqlParam::Real(params.minimum),
            ],
        )
        .await
}

#[derive(Deserialize)]
struct AccountDateParams {
    account_id: i64,
    date: String,
}

/// Account balance as of the last transaction on or before the given date.
async fn balance_on_date(
    State(state): State<AppState>,
    Query(params): Query<AccountDateParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT date, balance \
             FROM trans \
             WHERE account_id = ?1 AND date <= ?2 \
             ORDER BY date DESC, trans_id DESC \
             LIMIT 1",
            vec![
                SqlParam::Integer(params.account_id),
                SqlParam::Text(params.date),
            ],
        )
        .await
}

/// Default rate per district: share of loans with status B or D.
async fn loan_default_rate_by_district(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT d.A2 AS district, COUNT(l.loan_id) AS loan_count, \
                    CAST(SUM(CASE WHEN l.status IN ('B', 'D') THEN 1 ELSE 0 END) AS REAL) \
                        * 100 / COUNT(l.loan_id) AS default_percentage \
             FROM loan AS l \
             JOIN account AS a ON l.account_id = a.account_id \
             JOIN district AS d ON a.district_id = d.district_id \
             GROUP BY d.district_id \
             ORDER BY default_percentage DESC, district",
            vec![],
        )
        .await
}

#[derive(Deserialize)]
struct KSymbolParams {
    k_symbol: String,
}

/// Total and average standing-order amount per `k_symbol` payment category.
async fn order_totals_by_symbol(
    State(state): State<AppState>,
    Query(params): Query<KSymbolParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT COUNT(order_id) AS order_count, SUM(amount) AS total_amount, \
                    AVG(amount) AS average_amount \
             FROM `order` \
             WHERE k_symbol = ?1",
            vec![SqlParam::Text(params.k_symbol)],
        )
        .await
}

#[derive(Deserialize)]
struct BirthDateParams {
    before: String,
}

async fn clients_born_before(
    State(state): State<AppState>,
    Query(params): Query<BirthDateParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT client_id, gender, birth_date \
             FROM client \
             WHERE birth_date < ?1 \
             ORDER BY birth_date",
            vec![SqlParam::Text(params.before)],
        )
        .await
}

#[derive(Deserialize)]
struct LimitParams {
    limit: i64,
}

async fn districts_by_account_count(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT d.A2 AS district, d.A3 AS region, COUNT(a.account_id) AS account_count \
             FROM district AS d \
             JOIN account AS a ON a.district_id = d.district_id \
             GROUP BY d.district_id \
             ORDER BY account_count DESC \
             LIMIT ?1",
            vec![SqlParam::Integer(params.limit)],
        )
        .await
}

#[derive(Deserialize)]
struct AccountIdsParams {
    account_ids: String,
}

/// Loan summaries for a comma-separated list of accounts.
async fn loans_for_accounts(
    State(state): State<AppState>,
    Query(params): Query<AccountIdsParams>,
) -> Result<Json<Value>, ApiError> {
    let ids = id_list("account_ids", &params.account_ids)?;
    let sql = format!(
        "SELECT account_id, loan_id, date, amount, duration, status \
         FROM loan WHERE account_id IN ({}) ORDER BY account_id, date",
        placeholders(ids.len())
    );
    state.rows(DOMAIN, sql, int_params(&ids)).await
}

#[derive(Deserialize)]
struct AccountParams {
    account_id: i64,
}

/// Owner (disposition type OWNER) of one account.
async fn account_owner(
    State(state): State<AppState>,
    Query(params): Query<AccountParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .row(
            DOMAIN,
            "SELECT c.client_id, c.gender, c.birth_date, d.A2 AS district \
             FROM disp AS dp \
             JOIN client AS c ON dp.client_id = c.client_id \
             JOIN district AS d ON c.district_id = d.district_id \
             WHERE dp.account_id = ?1 AND dp.type = 'OWNER'",
            vec![SqlParam::Integer(params.account_id)],
        )
        .await
}

/// Yearly credit and withdrawal totals for one account.
async fn account_yearly_turnover(
    State(state): State<AppState>,
    Query(params): Query<AccountParams>,
) -> Result<Json<Value>, ApiError> {
    state
        .rows(
            DOMAIN,
            "SELECT STRFTIME('%Y', date) AS year, \
                    SUM(CASE WHEN type = 'PRIJEM' THEN amount ELSE 0 END) AS credited, \
                    SUM(CASE WHEN type = 'VYDAJ' THEN amount ELSE 0 END) AS withdrawn \
             FROM trans \
             WHERE account_id = ?1 \
             GROUP BY year \
             ORDER BY year",
            vec![SqlParam::Integer(params.account_id)],
        )
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/loans_by_status", get(loans_by_status))
        .route("/average_loan_by_duration", get(average_loan_by_duration))
        .route("/clients_in_district", get(clients_in_district))
        .route(
            "/female_client_share_in_district",
            get(female_client_share_in_district),
        )
        .route("/accounts_opened_in_year", get(accounts_opened_in_year))
        .route("/accounts_by_frequency", get(accounts_by_frequency))
        .route("/clients_with_card_type", get(clients_with_card_type))
        .route("/card_type_counts", get(card_type_counts))
        .route(
            "/large_transactions_of_account",
            get(large_transactions_of_account),
        )
        .route("/balance_on_date", get(balance_on_date))
        .route(
            "/loan_default_rate_by_district",
            get(loan_default_rate_by_district),
        )
        .route("/order_totals_by_symbol", get(order_totals_by_symbol))
        .route("/clients_born_before", get(clients_born_before))
        .route(
            "/districts_by_account_count",
            get(districts_by_account_count),
        )
        .route("/loans_for_accounts", get(loans_for_accounts))
        .route("/account_owner", get(account_owner))
        .route("/account_yearly_turnover", get(account_yearly_turnover))
}
