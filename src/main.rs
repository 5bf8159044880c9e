mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::db_store::DbStore;
use crate::services::mailer::{LogMailer, Mailer, SmtpMailer};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(io::Error::other)?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    tracing::info!("database connected");

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp).map_err(io::Error::other)?),
        None => {
            tracing::warn!("EMAIL_USER / EMAIL_PASS not set, verification emails are only logged");
            Arc::new(LogMailer)
        }
    };

    let bind = (config.host.clone(), config.port);
    let state = web::Data::new(AppState::new(config, Arc::new(DbStore::new(db)), mailer));

    tracing::info!(host = %bind.0, port = bind.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
