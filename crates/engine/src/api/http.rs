//! HTTP routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use charsheet_domain::StorageKey;
use charsheet_shared::{
    routes, CharacterListResponse, DeleteResponse, ErrorResponse, ExistsResponse, RecordBody,
    SaveQuery, SaveResponse,
};

use crate::app::App;
use crate::use_cases::RecordStoreError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .nest(routes::API_PREFIX, api_routes())
}

fn api_routes() -> Router<Arc<App>> {
    Router::new()
        .route(routes::HEALTH, get(health))
        .route(routes::CHARACTERS, get(list_characters))
        .route(
            routes::CHARACTER,
            get(get_character)
                .put(save_character)
                .post(save_character)
                .delete(delete_character),
        )
        .route(routes::CHARACTER_EXISTS, get(character_exists))
        .route(routes::CHARACTER_RENAME, post(rename_character))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Characters
// =============================================================================

async fn list_characters(
    State(app): State<Arc<App>>,
) -> Result<Json<CharacterListResponse>, ApiError> {
    Ok(Json(app.records.list().await?))
}

async fn get_character(
    State(app): State<Arc<App>>,
    Path(key): Path<String>,
) -> Result<Json<RecordBody>, ApiError> {
    Ok(Json(app.records.get(&key).await?))
}

async fn save_character(
    State(app): State<Arc<App>>,
    Path(key): Path<String>,
    Query(query): Query<SaveQuery>,
    Json(body): Json<RecordBody>,
) -> Result<Json<SaveResponse>, ApiError> {
    let storage_key = app.records.put(&key, body, query.current_key()).await?;
    Ok(Json(SaveResponse::saved(storage_key.into_string())))
}

async fn rename_character(
    State(app): State<Arc<App>>,
    Path((old_key, new_key)): Path<(String, String)>,
    Json(body): Json<RecordBody>,
) -> Result<Json<SaveResponse>, ApiError> {
    let storage_key = app.records.rename(&old_key, &new_key, body).await?;
    Ok(Json(SaveResponse::saved(storage_key.into_string())))
}

async fn character_exists(
    State(app): State<Arc<App>>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = app.records.exists(&key).await?;
    Ok(Json(ExistsResponse {
        exists,
        storage_key: StorageKey::from_name(&key).into_string(),
    }))
}

async fn delete_character(
    State(app): State<Arc<App>>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    app.records.delete(&key).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Conflict,
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Character not found")),
            )
                .into_response(),
            ApiError::Conflict => {
                (StatusCode::CONFLICT, Json(ErrorResponse::name_conflict())).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal error")),
                )
                    .into_response()
            }
        }
    }
}

impl From<RecordStoreError> for ApiError {
    fn from(e: RecordStoreError) -> Self {
        match e {
            RecordStoreError::NotFound(_) => ApiError::NotFound,
            RecordStoreError::Conflict(_) => ApiError::Conflict,
            RecordStoreError::EmptyKey => ApiError::BadRequest(e.to_string()),
            RecordStoreError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_storage::MemoryStorage;
    use crate::use_cases::ConflictPolicy;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let app = App::new(Arc::new(MemoryStorage::new()), ConflictPolicy::Compatible);
        routes().with_state(Arc::new(app))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn save_get_list_and_delete() {
        let router = app();
        let record = json!({"name": "Thorin Oakenshield!", "class": "Fighter", "level": 4});

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/characters/Thorin_Oakenshield_",
            Some(record.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "storageKey": "Thorin_Oakenshield_"}));

        let (status, body) = send(&router, Method::GET, "/api/characters/Thorin_Oakenshield_", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, record);

        let (_, body) = send(&router, Method::GET, "/api/characters", None).await;
        assert_eq!(
            body,
            json!({"characters": [{
                "name": "Thorin Oakenshield!",
                "class": "Fighter",
                "level": 4,
                "storageKey": "Thorin_Oakenshield_"
            }]})
        );

        let (status, body) = send(&router, Method::DELETE, "/api/characters/Thorin_Oakenshield_", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = send(&router, Method::DELETE, "/api/characters/Thorin_Oakenshield_", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Character not found"}));
    }

    #[tokio::test]
    async fn put_is_accepted_like_post() {
        let router = app();
        let (status, _) = send(&router, Method::PUT, "/api/characters/Mira", Some(json!({"name": "Mira"}))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&router, Method::GET, "/api/characters/Mira/exists", None).await;
        assert_eq!(body, json!({"exists": true, "storageKey": "Mira"}));
    }

    #[tokio::test]
    async fn save_with_foreign_current_key_conflicts() {
        let router = app();
        send(&router, Method::POST, "/api/characters/Aria", Some(json!({"name": "Aria"}))).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/characters/Aria?current=Bran",
            Some(json!({"name": "Aria"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({"error": "A character with this name already exists", "exists": true})
        );
    }

    #[tokio::test]
    async fn rename_moves_record() {
        let router = app();
        send(
            &router,
            Method::POST,
            "/api/characters/Aria_Stormborn",
            Some(json!({"name": "Aria Stormborn", "level": 5})),
        )
        .await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/characters/Aria_Stormborn/rename/Aria_Stormwind",
            Some(json!({"name": "Aria Stormwind", "level": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "storageKey": "Aria_Stormwind"}));

        let (status, _) = send(&router, Method::GET, "/api/characters/Aria_Stormborn", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = send(&router, Method::GET, "/api/characters/Aria_Stormwind", None).await;
        assert_eq!(body["name"], "Aria Stormwind");
    }

    #[tokio::test]
    async fn rename_missing_is_not_found() {
        let (status, _) = send(
            &app(),
            Method::POST,
            "/api/characters/ghost/rename/spirit",
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exists_sanitizes_the_key() {
        let (status, body) = send(&app(), Method::GET, "/api/characters/a%20b/exists", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"exists": false, "storageKey": "a_b"}));
    }

    #[test]
    fn storage_failures_hide_details() {
        let err: ApiError =
            RecordStoreError::Storage(crate::infrastructure::ports::RepoError::database(
                "write",
                "/secret/path: permission denied",
            ))
            .into();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
