// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toute la configuration du serveur est lue UNE SEULE FOIS au démarrage
//   (variables d'environnement + .env) puis passée aux composants via
//   AppState. Aucun handler ne lit std::env directement.
//
// Variables:
//   - DATABASE_URL (obligatoire)
//   - JWT_SECRET (obligatoire) : signature des cookies de session
//   - EMAIL_SECRET (obligatoire) : signature des tokens de vérification email
//   - FRONTEND_URL (obligatoire) : base des liens de vérification
//   - HOST / PORT : défaut 127.0.0.1:3000
//   - APP_ENV=production : cookie "Secure"
//   - EMAIL_USER / EMAIL_PASS / SMTP_HOST : envoi SMTP (optionnel)
//   - PASSWORD_HASH_ITERATIONS : défaut 260000
//   - AUTH_RATE_LIMIT_MAX / AUTH_RATE_LIMIT_WINDOW_SECS : défaut 5 / 60
//   - TRUST_PROXY=true : IP client lue dans X-Forwarded-For (défaut false)
//
// ============================================================================

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::utils::password::DEFAULT_ITERATIONS;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Paramètres SMTP pour l'envoi des emails de vérification
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// Fenêtre fixe du rate limiter des endpoints d'authentification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Identifier le client via X-Forwarded-For / Forwarded (derrière un proxy uniquement)
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub email_secret: String,
    pub frontend_url: String,
    pub production: bool,
    pub smtp: Option<SmtpConfig>,
    pub password_hash_iterations: u32,
    pub auth_rate_limit: RateLimitConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lecture (testable sans toucher à l'env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = parse_or(get("PORT"), "PORT", 3000u16)?;
        let password_hash_iterations = parse_or(
            get("PASSWORD_HASH_ITERATIONS"),
            "PASSWORD_HASH_ITERATIONS",
            DEFAULT_ITERATIONS,
        )?;
        if password_hash_iterations == 0 {
            return Err(ConfigError::Invalid {
                name: "PASSWORD_HASH_ITERATIONS",
                value: "0".to_string(),
            });
        }

        let defaults = RateLimitConfig::default();
        let auth_rate_limit = RateLimitConfig {
            max_requests: parse_or(
                get("AUTH_RATE_LIMIT_MAX"),
                "AUTH_RATE_LIMIT_MAX",
                defaults.max_requests,
            )?,
            window: Duration::from_secs(parse_or(
                get("AUTH_RATE_LIMIT_WINDOW_SECS"),
                "AUTH_RATE_LIMIT_WINDOW_SECS",
                defaults.window.as_secs(),
            )?),
            trust_proxy: parse_or(get("TRUST_PROXY"), "TRUST_PROXY", defaults.trust_proxy)?,
        };

        // SMTP uniquement si les deux identifiants sont fournis
        let smtp = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            jwt_secret: required("JWT_SECRET")?,
            email_secret: required("EMAIL_SECRET")?,
            frontend_url: required("FRONTEND_URL")?,
            production: get("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
            smtp,
            password_hash_iterations,
            auth_rate_limit,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
