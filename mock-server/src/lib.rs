use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const PERMISSIONS: [&str; 3] = ["read", "write", "both"];
pub const DEFAULT_PERMISSIONS: &str = "both";

#[derive(Deserialize)]
pub struct CreateKey {
    pub permissions: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteKey {
    pub key: String,
}

/// Active keys mapped to their permissions.
pub type Keys = Arc<RwLock<HashMap<String, String>>>;

pub fn app() -> Router {
    let keys: Keys = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/v1/key", post(create_key).put(delete_key))
        .route("/api/v1/stats", get(stats))
        .with_state(keys)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_key(State(keys): State<Keys>, Form(input): Form<CreateKey>) -> (StatusCode, String) {
    let permissions = input.permissions.unwrap_or_else(|| DEFAULT_PERMISSIONS.to_string());
    if !PERMISSIONS.contains(&permissions.as_str()) {
        tracing::info!(%permissions, "rejected key request");
        return (
            StatusCode::BAD_REQUEST,
            format!("Invalid permissions '{permissions}'. Expected read, write or both."),
        );
    }

    let key = Uuid::new_v4().simple().to_string();
    keys.write().await.insert(key.clone(), permissions.clone());
    tracing::info!(%permissions, "generated key");
    (StatusCode::OK, format!("Generated key: {key}"))
}

async fn delete_key(State(keys): State<Keys>, Form(input): Form<DeleteKey>) -> (StatusCode, String) {
    match keys.write().await.remove(&input.key) {
        Some(_) => {
            tracing::info!("deleted key");
            (StatusCode::OK, format!("Deleted key {} successfully.", input.key))
        }
        None => (StatusCode::NOT_FOUND, format!("Key {} not found.", input.key)),
    }
}

async fn stats(State(keys): State<Keys>) -> String {
    let active = keys.read().await.len();
    format!("Private Gems: 0\nCached Gem Dependencies: 0\nActive Keys: {active}\n")
}
