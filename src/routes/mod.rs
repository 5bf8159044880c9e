pub mod auth;
pub mod collaborators;
pub mod health;
pub mod projects;
pub mod users;

use actix_web::web;

use crate::error::ApiError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Body JSON illisible ou mal typé: 400 {"message": "Invalid input"}
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected json body");
        ApiError::bad_request("Invalid input").into()
    });
    let path_config = web::PathConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected path parameter");
        ApiError::not_found("Not found").into()
    });

    cfg.service(
        web::scope("/api")
            .app_data(json_config)
            .app_data(path_config)
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(projects::projects_routes)
            .configure(collaborators::collaborators_routes)
            .configure(users::users_routes),
    );
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::cookie::Cookie;
    use actix_web::web;

    use crate::config::{Config, RateLimitConfig};
    use crate::middleware::auth::SESSION_COOKIE;
    use crate::models::users;
    use crate::services::mailer::Mailer;
    use crate::services::memory_store::MemoryStore;
    use crate::services::store::{NewUser, Store};
    use crate::state::AppState;
    use crate::utils::{jwt, password};

    pub const JWT_SECRET: &str = "jwt-test-secret";
    pub const EMAIL_SECRET: &str = "email-test-secret";
    pub const PASSWORD: &str = "Abc123!@";

    pub fn config(max_auth_requests: u32) -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: JWT_SECRET.to_string(),
            email_secret: EMAIL_SECRET.to_string(),
            frontend_url: "http://localhost:5173/".to_string(),
            production: false,
            smtp: None,
            password_hash_iterations: 1000,
            auth_rate_limit: RateLimitConfig {
                max_requests: max_auth_requests,
                window: Duration::from_secs(60),
                trust_proxy: false,
            },
        }
    }

    pub fn state(store: Arc<MemoryStore>, mailer: Arc<dyn Mailer>) -> web::Data<AppState> {
        web::Data::new(AppState::new(config(1000), store, mailer))
    }

    /// Utilisateur vérifié, inséré directement dans le store
    pub async fn verified_user(store: &MemoryStore, username: &str) -> users::Model {
        let user = store
            .insert_user(NewUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password_hash: password::hash_password(PASSWORD, 1000).unwrap(),
            })
            .await
            .unwrap();
        store.seed_verified(user.user_id);
        store.user(user.user_id).unwrap()
    }

    pub fn session(user: &users::Model) -> Cookie<'static> {
        let token = jwt::issue_session_token(JWT_SECRET, user.user_id, &user.role).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }
}
