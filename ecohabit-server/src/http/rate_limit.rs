//! Per-client rate limiting middleware
//!
//! Fixed window per client IP: the first request opens a window of
//! `config.window`, at most `config.max_requests` pass inside it, and the
//! count resets when the window ends. Every response carries
//! `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`; rejected
//! ones also carry `Retry-After`.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::time::Instant;

use super::error::ApiError;
use crate::config::RateLimitConfig;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Bucket for requests without connection info
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's window resets
    pub reset_after: Duration,
}

impl Quota {
    fn write_headers(&self, headers: &mut HeaderMap) {
        let reset_secs = ceil_secs(self.reset_after);
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(reset_secs));
        if !self.allowed {
            headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(reset_secs));
        }
    }
}

/// Request counter keyed by client IP
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `client` and report the remaining quota.
    pub fn check(&self, client: IpAddr) -> Quota {
        let now = Instant::now();
        let limit = self.config.max_requests;
        let window = self.config.window;

        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !clients.contains_key(&client) && clients.len() >= self.config.max_entries {
            clients.retain(|_, w| now.duration_since(w.started) < window);
            if clients.len() >= self.config.max_entries {
                tracing::warn!(
                    tracked = clients.len(),
                    "Rate limiter table full, rejecting new client"
                );
                return Quota {
                    allowed: false,
                    limit,
                    remaining: 0,
                    reset_after: window,
                };
            }
        }

        let entry = clients.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = window.saturating_sub(now.duration_since(entry.started));
        if entry.count >= limit {
            return Quota {
                allowed: false,
                limit,
                remaining: 0,
                reset_after,
            };
        }

        entry.count += 1;
        Quota {
            allowed: true,
            limit,
            remaining: limit - entry.count,
            reset_after,
        }
    }
}

/// Middleware: count the request, reject with 429 when over quota.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(UNKNOWN_CLIENT);

    let quota = limiter.check(client);
    let mut response = if quota.allowed {
        next.run(request).await
    } else {
        tracing::warn!(%client, "Rate limit exceeded");
        ApiError::RateLimited.into_response()
    };

    quota.write_headers(response.headers_mut());
    response
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
