use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bird_storage::Domain;

use crate::{build_cors_layer, EngineState, VERSION};

const MB: usize = 1_048_576;

/// The main router for the engine.
pub struct EngineRouter {
    /// Contains the `/`, `/health` and `/version` routes.
    base_router: Router,
    /// The `/v1/bird/<domain>/<resource>` routes.
    bird_routes: Router,
    /// The CORS layer for the engine.
    cors_layer: Option<CorsLayer>,
}

impl EngineRouter {
    pub fn new(state: EngineState) -> Self {
        let base_router = Router::new()
            .route("/", get(handle_index))
            .route("/health", get(handle_health))
            .route("/version", get(handle_version))
            .with_state(state.clone());

        let bird_routes = bird_domains::bird_router(state);

        Self {
            base_router,
            bird_routes,
            cors_layer: None,
        }
    }

    /// If CORS is enabled, we add a CORS layer to the app.
    pub fn add_cors_layer(&mut self, allow_origin: &[String]) {
        self.cors_layer = Some(build_cors_layer(allow_origin));
    }

    pub fn into_router(self) -> Router {
        let mut app = self.base_router.merge(self.bird_routes);
        if let Some(cors_layer) = self.cors_layer {
            // It is important that this layer is added last, since it only
            // affects the layers that precede it.
            app = app.layer(cors_layer);
        }
        app
            // Request bodies play no role in a GET-only service; keep the
            // limit tight.
            .layer(DefaultBodyLimit::max(MB))
            // Response compression for the larger row sets
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http())
    }

    pub fn into_make_service(self) -> axum::routing::IntoMakeService<Router> {
        self.into_router().into_make_service()
    }
}

/// Health check endpoint
async fn handle_health() -> StatusCode {
    StatusCode::OK
}

async fn handle_version() -> &'static str {
    VERSION
}

/// Service descriptor: name, version and per-domain availability.
async fn handle_index(State(state): State<EngineState>) -> Json<Value> {
    let domains = Domain::ALL
        .into_iter()
        .map(|domain| {
            json!({
                "domain": domain,
                "available": state.catalog.is_available(domain),
            })
        })
        .collect::<Vec<_>>();
    Json(json!({
        "service": "bird-engine",
        "version": VERSION,
        "domains": domains,
    }))
}
