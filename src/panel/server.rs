use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::schema::moderation::LogEntry;
use crate::api::schema::shop::{NewItem, ShopItem};
use crate::error::CoreError;
use crate::managers::moderation::ModerationManager;
use crate::managers::panel::PanelManager;
use crate::managers::shop::ShopManager;
use crate::managers::store::DocumentStore;
use crate::util::{non_negative_price, position_to_index};

/// The panel never hands out more history than this per request.
const LOG_PAGE: usize = 200;

pub struct AppState {
    panel: PanelManager,
    moderation: ModerationManager,
    shop: ShopManager,
}

impl AppState {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            panel: PanelManager::new(Arc::clone(&store)),
            moderation: ModerationManager::new(Arc::clone(&store)),
            shop: ShopManager::new(store),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    server_id: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    ok: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// `CoreError` mapped onto HTTP statuses. Domain rejections surface their own
/// message; system failures are reported generically.
struct PanelError(CoreError);

impl From<CoreError> for PanelError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::NotFound(_) | CoreError::NotATicketChannel => StatusCode::NOT_FOUND,
            CoreError::PermissionDenied | CoreError::MissingRequiredRole => StatusCode::FORBIDDEN,
            CoreError::CooldownActive(_) => StatusCode::TOO_MANY_REQUESTS,
            CoreError::InsufficientFunds | CoreError::SelfTransfer => StatusCode::CONFLICT,
            CoreError::Actuator(_) | CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error = if self.0.is_domain() {
            self.0.to_string()
        } else {
            warn!("panel request failed: {}", self.0);
            "internal error".to_owned()
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logs/:server_id", get(logs))
        .route("/api/shop/:server_id", get(shop_list).post(shop_add))
        .route("/api/shop/:server_id/:position", delete(shop_delete))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn panel_init(store: Arc<DocumentStore>, addr: SocketAddr) {
    let app = router(Arc::new(AppState::new(store)));

    info!("Starting panel server on {}", addr);

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        panic!("Panel server error: {err}");
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, PanelError> {
    state.panel.verify_login(&req.server_id, &req.password).await?;
    Ok(Json(LoginResponse { ok: true }))
}

async fn logs(
    State(state): State<Arc<AppState>>,
    Path(server_id): Path<String>,
) -> Json<Vec<LogEntry>> {
    Json(state.moderation.recent(&server_id, LOG_PAGE).await)
}

async fn shop_list(
    State(state): State<Arc<AppState>>,
    Path(server_id): Path<String>,
) -> Json<Vec<ShopItem>> {
    Json(state.shop.list(&server_id).await)
}

async fn shop_add(
    State(state): State<Arc<AppState>>,
    Path(server_id): Path<String>,
    Json(item): Json<NewItem>,
) -> Result<Json<ShopItem>, PanelError> {
    if item.name.trim().is_empty() {
        return Err(CoreError::Validation("item name cannot be empty".to_owned()).into());
    }
    non_negative_price(item.price)?;

    let item = state.shop.add_item(&server_id, item, Utc::now()).await?;
    Ok(Json(item))
}

/// Deletion addresses items by the same 1-based position the command surface
/// shows; the conversion to the catalog's 0-based index happens here.
async fn shop_delete(
    State(state): State<Arc<AppState>>,
    Path((server_id, position)): Path<(String, i64)>,
) -> Result<Json<ShopItem>, PanelError> {
    let index = position_to_index(position)?;
    let removed = state.shop.remove_item(&server_id, index).await?;
    Ok(Json(removed))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    use super::*;

    async fn state_in(dir: &tempfile::TempDir) -> Arc<AppState> {
        let store = Arc::new(DocumentStore::new(dir.path().join("data.json")));
        Arc::new(AppState::new(store))
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn login_reports_unconfigured_wrong_and_ok() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;
        state.panel.set_password("g1", "hunter2").await.unwrap();
        let app = router(Arc::clone(&state));

        let res = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/login",
                serde_json::json!({"serverId": "unknown", "password": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/login",
                serde_json::json!({"serverId": "g1", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = app
            .oneshot(json_request(
                Method::POST,
                "/api/login",
                serde_json::json!({"serverId": "g1", "password": "hunter2"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn shop_routes_share_the_command_surface_positions() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;
        let app = router(Arc::clone(&state));

        let res = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/shop/g1",
                serde_json::json!({"name": "Trophy", "price": 50}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        // position 1 is the first (and only) item
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/shop/g1/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(state.shop.list("g1").await.is_empty());

        let res = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/shop/g1/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn shop_add_validates_the_payload() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir).await;
        let app = router(state);

        let res = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/shop/g1",
                serde_json::json!({"name": "  ", "price": 10}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app
            .oneshot(json_request(
                Method::POST,
                "/api/shop/g1",
                serde_json::json!({"name": "Trophy", "price": -5}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
