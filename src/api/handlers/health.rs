use crate::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{debug, error, info_span, Instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

impl Health {
    fn current(database_ok: bool) -> Self {
        Self {
            commit: GIT_COMMIT_HASH.to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if database_ok { "ok" } else { "error" }.to_string(),
        }
    }

    /// `name:version:short-commit`, short commit empty when unknown.
    fn x_app(&self) -> HeaderMap {
        let short_hash = self
            .commit
            .get(..7)
            .filter(|hash| hash.chars().all(|c| c.is_ascii_hexdigit()));
        let value = format!(
            "{}:{}:{}",
            self.name,
            self.version,
            short_hash.unwrap_or_default()
        );

        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert("X-App", value);
            }
            Err(err) => error!("Failed to build X-App header: {err}"),
        }
        headers
    }
}

/// Acquire a pooled connection and ping it.
async fn database_reachable(pool: &PgPool) -> bool {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );
    let mut conn = match pool.acquire().instrument(acquire_span).await {
        Ok(conn) => conn,
        Err(err) => {
            error!("Failed to acquire database connection: {err}");
            return false;
        }
    };

    let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
    match conn.ping().instrument(ping_span).await {
        Ok(()) => true,
        Err(err) => {
            error!("Failed to ping database: {err}");
            false
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database is reachable", body = Health),
        (status = 503, description = "Database is unreachable", body = Health)
    ),
    tag = "health"
)]
// GET returns the JSON body, OPTIONS only the status and X-App header.
pub async fn health(method: Method, pool: Extension<PgPool>) -> Response {
    let database_ok = database_reachable(&pool).await;
    let health = Health::current(database_ok);
    debug!(database = %health.database, "health probe");

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let headers = health.x_app();

    if method == Method::GET {
        (status, headers, Json(health)).into_response()
    } else {
        (status, headers, Body::empty()).into_response()
    }
}
