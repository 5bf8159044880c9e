//! Rate limiting des endpoints d'authentification (login, register).
//!
//! Compteur à fenêtre fixe par identifiant client (IP): au plus
//! `max_requests` requêtes par `window`. La fenêtre d'un client démarre à sa
//! première requête et repart de zéro une fois écoulée.
//!
//! L'IP est celle de la socket. Les headers X-Forwarded-For / Forwarded ne
//! sont lus que si `TRUST_PROXY=true` (serveur derrière un reverse proxy).
//!
//! Les compteurs vivent dans le process: plusieurs instances derrière un load
//! balancer appliquent chacune leur propre limite.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder, dev::Payload, web};
use futures::future::{Ready, ready};
use parking_lot::Mutex;

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Windows {
    by_client: HashMap<String, Window>,
    last_pruned: Instant,
}

/// Requête acceptée
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admission {
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Requête refusée: limite atteinte pour cette fenêtre
#[derive(Debug, Clone)]
pub struct RateLimitRejection {
    pub identifier: String,
    pub limit: u32,
    pub retry_after: Duration,
}

impl fmt::Display for RateLimitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rate limit of {} requests exceeded for {}, retry in {}s",
            self.limit,
            self.identifier,
            self.retry_after.as_secs()
        )
    }
}

/// Headers RateLimit-Limit / RateLimit-Remaining / RateLimit-Reset
pub fn standard_headers(
    limit: u32,
    remaining: u32,
    reset_after: Duration,
) -> [(&'static str, String); 3] {
    [
        ("RateLimit-Limit", limit.to_string()),
        ("RateLimit-Remaining", remaining.to_string()),
        ("RateLimit-Reset", reset_after.as_secs().max(1).to_string()),
    ]
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<Windows>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window,
            windows: Mutex::new(Windows {
                by_client: HashMap::new(),
                last_pruned: Instant::now(),
            }),
        }
    }

    /// Compte une requête pour `identifier`
    pub fn check(&self, identifier: &str) -> Result<Admission, RateLimitRejection> {
        self.check_at(identifier, Instant::now())
    }

    fn check_at(&self, identifier: &str, now: Instant) -> Result<Admission, RateLimitRejection> {
        let mut windows = self.windows.lock();

        // Purge des fenêtres expirées, au plus une fois par fenêtre
        if now.saturating_duration_since(windows.last_pruned) >= self.window {
            let window = self.window;
            windows
                .by_client
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            windows.last_pruned = now;
        }

        let entry = windows
            .by_client
            .entry(identifier.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started));

        if entry.count >= self.max_requests {
            return Err(RateLimitRejection {
                identifier: identifier.to_string(),
                limit: self.max_requests,
                retry_after: reset_after,
            });
        }

        entry.count += 1;
        Ok(Admission {
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            reset_after,
        })
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.lock().by_client.len()
    }
}

/// IP du client: socket par défaut, headers de proxy seulement si configuré
fn client_identifier(req: &HttpRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extracteur à mettre en premier paramètre des handlers limités.
#[derive(Debug)]
pub struct AuthRateLimit(pub Admission);

impl AuthRateLimit {
    /// Ajoute les headers RateLimit-* à une réponse acceptée
    pub fn apply(&self, response: &mut HttpResponseBuilder) {
        for header in standard_headers(self.0.limit, self.0.remaining, self.0.reset_after) {
            response.insert_header(header);
        }
    }
}

impl FromRequest for AuthRateLimit {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(ApiError::Internal("application state missing".to_string())));
        };

        let identifier = client_identifier(req, state.config.auth_rate_limit.trust_proxy);

        ready(match state.auth_limiter.check(&identifier) {
            Ok(admission) => {
                tracing::debug!(
                    client = %identifier,
                    remaining = admission.remaining,
                    "auth request admitted"
                );
                Ok(AuthRateLimit(admission))
            }
            Err(rejection) => {
                tracing::warn!(client = %rejection.identifier, "auth rate limit exceeded");
                Err(ApiError::TooManyRequests(rejection))
            }
        })
    }
}
