//! Limit/offset pagination.
//!
//! A list is windowed only when the client asks for it with `limit` (or a
//! default limit is configured). Paginated responses are wrapped in
//! `{count, next, previous, results}` where `next`/`previous` are absolute
//! URLs of the neighbouring windows.

use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

use crate::config::PaginationSettings;

pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

/// Raw query parameters. Kept as strings so malformed values fall back to
/// defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct LimitOffsetQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    default_limit: Option<i64>,
    max_limit: Option<i64>,
}

impl From<PaginationSettings> for Paginator {
    fn from(settings: PaginationSettings) -> Self {
        Self {
            default_limit: settings.default_limit,
            max_limit: settings.max_limit,
        }
    }
}

impl Paginator {
    pub fn new(default_limit: Option<i64>, max_limit: Option<i64>) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// The requested window, or `None` when the list is not paginated.
    pub fn window(&self, query: &LimitOffsetQuery) -> Option<Window> {
        let requested = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0);

        let limit = requested.or(self.default_limit)?;
        let limit = match self.max_limit {
            Some(max) => limit.min(max),
            None => limit,
        };

        let offset = query
            .offset
            .as_deref()
            .and_then(|o| o.trim().parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(0);

        Some(Window { limit, offset })
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(req: &HttpRequest, window: Window, count: i64, results: Vec<T>) -> Self {
        let base = absolute_path(req);
        let query = req.query_string();

        Self {
            count,
            next: next_link(&base, query, window, count),
            previous: previous_link(&base, query, window),
            results,
        }
    }
}

fn absolute_path(req: &HttpRequest) -> String {
    let conn = req.connection_info();
    format!("{}://{}{}", conn.scheme(), conn.host(), req.path())
}

pub fn next_link(base: &str, query: &str, window: Window, count: i64) -> Option<String> {
    // An end past i64::MAX is past any count
    let end = match window.offset.checked_add(window.limit) {
        Some(end) if end < count => end,
        _ => return None,
    };
    let offset = end.to_string();
    let limit = window.limit.to_string();
    Some(with_query(
        base,
        query,
        &[(LIMIT_PARAM, limit.as_str()), (OFFSET_PARAM, offset.as_str())],
        &[],
    ))
}

pub fn previous_link(base: &str, query: &str, window: Window) -> Option<String> {
    if window.offset <= 0 {
        return None;
    }
    let limit = window.limit.to_string();
    let start = window.offset.saturating_sub(window.limit);
    if start <= 0 {
        return Some(with_query(
            base,
            query,
            &[(LIMIT_PARAM, limit.as_str())],
            &[OFFSET_PARAM],
        ));
    }
    let offset = start.to_string();
    Some(with_query(
        base,
        query,
        &[(LIMIT_PARAM, limit.as_str()), (OFFSET_PARAM, offset.as_str())],
        &[],
    ))
}

/// Rebuild `base?query` with `set` pairs replaced (or appended) and `remove`
/// keys dropped. Other parameters keep their order.
fn with_query(base: &str, query: &str, set: &[(&str, &str)], remove: &[&str]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode(key), decode(value))
        })
        .filter(|(key, _)| !remove.contains(&key.as_str()))
        .collect();

    for (key, value) in set {
        let mut replaced = false;
        pairs.retain_mut(|(k, v)| {
            if k.as_str() != *key {
                return true;
            }
            if replaced {
                return false;
            }
            *v = value.to_string();
            replaced = true;
            true
        });
        if !replaced {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    if pairs.is_empty() {
        return base.to_string();
    }

    let encoded: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("{}?{}", base, encoded.join("&"))
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
