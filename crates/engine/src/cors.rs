use axum::http::Method;
use std::time::Duration;
use tower_http::cors;

/// Builds the CORS layer for the engine.
///
/// With no configured origins, every origin is allowed and mirrored back in
/// `Access-Control-Allow-Origin`. Otherwise only exact matches against the
/// configured list are allowed; entries may carry leading whitespace when
/// provided as a comma-space-separated list.
pub fn build_cors_layer(cors_allow_origin: &[String]) -> cors::CorsLayer {
    let allow_origin = if cors_allow_origin.is_empty() {
        cors::AllowOrigin::mirror_request()
    } else {
        let allowed_origins = cors_allow_origin.to_owned();
        cors::AllowOrigin::predicate(move |origin_header_value, _req| {
            let origin_str = origin_header_value.to_str().unwrap_or("");
            allowed_origins
                .iter()
                .any(|allowed_origin| allowed_origin.trim() == origin_str)
        })
    };
    cors::CorsLayer::new()
        .max_age(Duration::from_secs(24 * 60 * 60)) // 24 hours
        .allow_headers(cors::AllowHeaders::mirror_request())
        .allow_origin(allow_origin)
        .allow_methods(vec![Method::GET, Method::OPTIONS])
}

#[cfg(test)]
mod test {
    use axum::{
        body::Body,
        http::{HeaderValue, Request},
        Router,
    };
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn preflight(origin: &'static str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .method("OPTIONS")
            .header("Origin", origin)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn cors_allows_all_origins_by_default() {
        let app = Router::new().layer(super::build_cors_layer(&[]));
        let response = app.oneshot(preflight("http://example.com")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("http://example.com"))
        );
    }

    #[tokio::test]
    async fn cors_restricts_to_configured_origins() {
        let app = Router::new().layer(super::build_cors_layer(&[
            "http://localhost:8080".to_string(),
            "http://example.com".to_string(),
        ]));
        let response = app.oneshot(preflight("http://example.com")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("http://example.com"))
        );
    }

    #[tokio::test]
    async fn cors_drops_unlisted_origins() {
        let app =
            Router::new().layer(super::build_cors_layer(&["http://example.com".to_string()]));
        let response = app
            .oneshot(preflight("http://localhost:8080"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("access-control-allow-origin"), None);
    }

    #[tokio::test]
    async fn cors_trims_listed_origins() {
        let app =
            Router::new().layer(super::build_cors_layer(&[" http://example.com".to_string()]));
        let response = app.oneshot(preflight("http://example.com")).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("http://example.com"))
        );
    }
}
