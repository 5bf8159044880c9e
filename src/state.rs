use std::sync::Arc;

use crate::config::Config;
use crate::middleware::rate_limit::FixedWindowLimiter;
use crate::services::mailer::Mailer;
use crate::services::store::Store;

/// État partagé par tous les workers (injecté via web::Data<AppState>)
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub auth_limiter: FixedWindowLimiter,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        let auth_limiter = FixedWindowLimiter::new(config.auth_rate_limit);
        Self {
            config,
            store,
            mailer,
            auth_limiter,
        }
    }
}
