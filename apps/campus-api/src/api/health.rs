//! Readiness probe

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health_detailed;
use mongodb::Database;

pub fn router(db: Database) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(db)
}

/// Pings MongoDB; 503 when it does not answer
async fn readiness_check(State(db): State<Database>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async {
            let status = check_health_detailed(&db).await;
            if status.healthy {
                Ok(())
            } else {
                Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
            }
        }),
    )];

    run_health_checks(checks).await
}
