//! Request-level hardening derived from the runtime settings: Host-header
//! validation here, the HSTS response header in the router.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{error::ApiError, state::AppState};

/// Reject requests whose `Host` header matches no allowed host. Skipped in
/// debug mode, mirroring the framework behavior this service replaces.
pub async fn enforce_allowed_hosts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.settings.debug {
        let host = request_host(&request)
            .ok_or_else(|| ApiError::bad_request("missing Host header"))?;
        if !host_allowed(&host, &state.settings.allowed_hosts) {
            tracing::warn!(host = %host, "rejected request for disallowed host");
            return Err(ApiError::bad_request(format!("invalid Host header: {host}")));
        }
    }

    Ok(next.run(request).await)
}

fn request_host(request: &Request) -> Option<String> {
    if let Some(host) = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
    {
        return Some(host.to_string());
    }
    request.uri().host().map(str::to_string)
}

/// A leading-dot entry matches the bare domain and any subdomain; `*` matches
/// everything; anything else matches exactly. Comparison ignores case and an
/// explicit port.
pub fn host_allowed(host: &str, allowed: &[String]) -> bool {
    let host = strip_port(host).to_ascii_lowercase();
    allowed.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        if pattern == "*" {
            true
        } else if let Some(domain) = pattern.strip_prefix('.') {
            host == domain || host.ends_with(&pattern)
        } else {
            host == pattern
        }
    })
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // Bracketed IPv6 literal, with or without a port.
        if let Some(end) = host.find(']') {
            return &host[1..end];
        }
        return host;
    }
    match host.rsplit_once(':') {
        Some((name, port))
            if !name.contains(':') && !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_host_matching() {
        let allowed = hosts(&["127.0.0.1", "blog.example.com"]);
        assert!(host_allowed("127.0.0.1", &allowed));
        assert!(host_allowed("BLOG.example.COM", &allowed));
        assert!(!host_allowed("evil.com", &allowed));
        assert!(!host_allowed("sub.blog.example.com", &allowed));
    }

    #[test]
    fn test_wildcard_subdomain_matching() {
        let allowed = hosts(&[".wasmer.app"]);
        assert!(host_allowed("wasmer.app", &allowed));
        assert!(host_allowed("myblog.wasmer.app", &allowed));
        assert!(host_allowed("deep.nested.wasmer.app", &allowed));
        assert!(!host_allowed("wasmer.app.evil.com", &allowed));
    }

    #[test]
    fn test_star_matches_everything() {
        let allowed = hosts(&["*"]);
        assert!(host_allowed("anything.at.all", &allowed));
    }

    #[test]
    fn test_ports_are_ignored() {
        let allowed = hosts(&["testserver", "[::1]"]);
        assert!(host_allowed("testserver:8080", &allowed));
        assert!(host_allowed("[::1]:8080", &allowed));
        assert!(host_allowed("[::1]", &allowed));
    }
}
