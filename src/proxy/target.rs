//! Proxy exchange addressing: method set, resource paths and target URLs.

use std::fmt;

use axum::http::Method;

/// Version prefix every proxied resource lives under upstream.
pub const API_PREFIX: &str = "/api/v1";

/// Methods the proxy forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl ProxyMethod {
    pub const ALL: [ProxyMethod; 5] = [
        ProxyMethod::Get,
        ProxyMethod::Post,
        ProxyMethod::Put,
        ProxyMethod::Delete,
        ProxyMethod::Patch,
    ];

    pub fn as_method(self) -> Method {
        match self {
            ProxyMethod::Get => Method::GET,
            ProxyMethod::Post => Method::POST,
            ProxyMethod::Put => Method::PUT,
            ProxyMethod::Delete => Method::DELETE,
            ProxyMethod::Patch => Method::PATCH,
        }
    }
}

impl TryFrom<&Method> for ProxyMethod {
    type Error = Method;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(ProxyMethod::Get),
            Method::POST => Ok(ProxyMethod::Post),
            Method::PUT => Ok(ProxyMethod::Put),
            Method::DELETE => Ok(ProxyMethod::Delete),
            Method::PATCH => Ok(ProxyMethod::Patch),
            _ => Err(method.clone()),
        }
    }
}

impl fmt::Display for ProxyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_method(), f)
    }
}

/// Resource group plus optional sub-path, e.g. `documents/42/chunks`.
///
/// The sub-path is kept exactly as it appeared in the request URI (still
/// percent-encoded) and is never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Join a resource group with a raw sub-path. An empty sub-path yields
    /// just the group.
    pub fn new(group: &str, sub_path: &str) -> Self {
        if sub_path.is_empty() {
            Self(group.to_string())
        } else {
            Self(format!("{group}/{sub_path}"))
        }
    }

    /// Derive the resource path from the request path seen by a group's
    /// handler (`/documents`, `/documents/`, `/documents/a/b`).
    pub fn from_request_path(group: &str, path: &str) -> Self {
        let rest = path
            .strip_prefix('/')
            .unwrap_or(path)
            .strip_prefix(group)
            .unwrap_or_default();
        let sub_path = rest.strip_prefix('/').unwrap_or(rest);
        Self::new(group, sub_path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{base}/api/v1/{resource}[?{query}]`, with the query forwarded unmodified.
pub fn target_url(base: &str, resource: &ResourcePath, query: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    match query {
        Some(q) if !q.is_empty() => format!("{base}{API_PREFIX}/{resource}?{q}"),
        _ => format!("{base}{API_PREFIX}/{resource}"),
    }
}
