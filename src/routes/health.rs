use actix_web::{HttpResponse, get, web};
use chrono::Utc;

use crate::models::dto::HealthResponse;
use crate::state::AppState;

/// GET /health - 503 si la base ne répond pas
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            false
        }
    };

    let response = HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        time: Utc::now(),
    };

    if database {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use crate::routes::configure_routes;
    use crate::routes::testing;
    use crate::services::mailer::testing::RecordingMailer;
    use crate::services::memory_store::MemoryStore;

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(
            App::new()
                .app_data(testing::state(
                    Arc::new(MemoryStore::new()),
                    Arc::new(RecordingMailer::default()),
                ))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }
}
