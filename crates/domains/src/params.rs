//! Helpers for the comma-separated list parameters some endpoints accept.

use bird_storage::SqlParam;

use crate::error::ApiError;

/// Splits a comma-separated list of integer ids, rejecting empty lists and
/// non-integer elements.
pub fn id_list(name: &'static str, raw: &str) -> Result<Vec<i64>, ApiError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| ApiError::invalid_parameter(name, part))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(ApiError::empty_parameter(name));
    }
    Ok(ids)
}

/// Splits a comma-separated list of text values, rejecting empty lists.
pub fn text_list(name: &'static str, raw: &str) -> Result<Vec<String>, ApiError> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    if values.is_empty() {
        return Err(ApiError::empty_parameter(name));
    }
    Ok(values)
}

/// Renders an `IN`-clause placeholder list: `placeholders(3)` is `"?,?,?"`.
pub fn placeholders(count: usize) -> String {
    let mut out = String::with_capacity(count.saturating_mul(2));
    for index in 0..count {
        if index > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}

pub fn int_params(ids: &[i64]) -> Vec<SqlParam> {
    ids.iter().map(|id| SqlParam::Integer(*id)).collect()
}

pub fn text_params(values: Vec<String>) -> Vec<SqlParam> {
    values.into_iter().map(SqlParam::Text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn id_list_trims_and_parses() {
        assert_eq!(id_list("ids", "1, 2 ,3,").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn id_list_rejects_non_integers() {
        let error = id_list("ids", "1,x,3").unwrap_err();
        assert_eq!(error.status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn id_list_rejects_empty_input() {
        assert!(id_list("ids", " , ,").is_err());
    }

    #[test]
    fn text_list_keeps_order() {
        assert_eq!(
            text_list("names", "Lewis Hamilton, Max Verstappen").unwrap(),
            vec!["Lewis Hamilton".to_owned(), "Max Verstappen".to_owned()]
        );
    }

    #[test]
    fn placeholder_arity_matches_count() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(4), "?,?,?,?");
        assert_eq!(placeholders(0), "");
    }
}
