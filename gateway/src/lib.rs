//! HTTP gateway between the todo UI and a hosted record store.
//!
//! `GET/POST/PUT/DELETE /todos` each translate into a single store call.
//! The record id travels in the JSON body for `PUT` and `DELETE`.

pub mod config;
pub mod error;
pub mod gateway;
pub mod store;
pub mod types;

use std::{any::Any, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use error::GatewayError;
pub use gateway::Gateway;
pub use store::{MemoryStore, RecordStore, RestStore, StoreError};
pub use types::{
    CreateTodoRequest, DeleteAck, DeleteTodoRequest, Patch, Todo, UpdateTodoRequest,
};

/// Router over a fresh `MemoryStore`, open to any origin.
pub fn app() -> Router {
    router(Arc::new(MemoryStore::new()), &[])
}

/// Full router over `store`. An empty `cors_origins` allows any origin.
pub fn router(store: Arc<dyn RecordStore>, cors_origins: &[HeaderValue]) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos)
                .post(create_todo)
                .put(update_todo)
                .delete(delete_todo),
        )
        .with_state(Gateway::new(store))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(cors::Any);
    if origins.is_empty() {
        layer.allow_origin(cors::Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins.iter().cloned()))
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(%detail, "handler panicked");
    GatewayError::Unexpected(detail).into_response()
}

/// Decode a JSON request body; an empty body reads as `{}` so that missing
/// fields are reported by the gateway rather than as a parse failure.
fn decode<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "rejected request body");
        GatewayError::invalid("Invalid request body")
    })
}

async fn list_todos(State(gateway): State<Gateway>) -> Result<Json<Vec<Todo>>, GatewayError> {
    gateway.list().await.map(Json)
}

async fn create_todo(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), GatewayError> {
    let todo = gateway.create(decode(&body)?).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<Json<Todo>, GatewayError> {
    gateway.update(decode(&body)?).await.map(Json)
}

async fn delete_todo(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<Json<DeleteAck>, GatewayError> {
    gateway.delete(decode(&body)?).await?;
    Ok(Json(DeleteAck { success: true }))
}
