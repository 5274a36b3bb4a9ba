// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative route manifest and the mounted segment set derived from it.
//!
//! The API layer declares every route the backend exposes as a
//! `{method, path}` pair. At startup the manifest is walked once and the
//! first path segment after the API prefix of each route is collected into
//! [`MountedSegments`], which never changes afterwards.
//!
//! ```text
//! prefix = "/api/v1"
//!
//! POST /api/v1/orders            -> "orders"
//! PUT  /api/v1/orders/{id}/items -> "orders"
//! GET  /api/v1/profile           -> "profile"
//! POST /auth/login               -> (outside prefix, ignored)
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default API version prefix.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// A single route the backend exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub method: String,
    /// Path template, e.g. `/api/v1/orders/{id}`. Absolute URLs are accepted.
    pub path: String,
}

impl Route {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Route {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Static list of the routes the backend mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteManifest {
    routes: Vec<Route>,
}

impl RouteManifest {
    pub fn new(routes: Vec<Route>) -> Self {
        RouteManifest { routes }
    }

    /// Adds a route, builder style.
    pub fn route(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.push(Route::new(method, path));
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Read-only set of first path segments the backend actually mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountedSegments(BTreeSet<String>);

impl MountedSegments {
    /// Walks the manifest once and collects the mounted segments.
    pub fn from_manifest(manifest: &RouteManifest, prefix: &str) -> Self {
        let prefix = normalize_prefix(prefix);
        let segments = manifest
            .routes()
            .iter()
            .filter_map(|route| {
                let path = route_path(&route.path);
                first_segment_after(&path, &prefix).map(str::to_string)
            })
            .collect();
        MountedSegments(segments)
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.0.contains(segment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalizes a prefix to `/segment[/segment...]` with no trailing slash.
///
/// An empty prefix (or `/`) normalizes to the empty string, meaning every
/// path is under the prefix.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Returns the first path segment after `prefix`, if `path` lies under it.
///
/// `prefix` must already be normalized. Query strings and fragments are
/// ignored. Placeholder segments (`{id}`, `:id`) never count.
pub fn first_segment_after<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let rest = path.strip_prefix(prefix)?;
    if !prefix.is_empty() && !rest.is_empty() && !rest.starts_with('/') {
        // "/api/v10" is not under "/api/v1"
        return None;
    }
    let segment = rest.trim_start_matches('/').split('/').next()?;
    if segment.is_empty() || segment.starts_with('{') || segment.starts_with(':') {
        return None;
    }
    Some(segment)
}

fn route_path(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        if let Ok(url) = Url::parse(raw) {
            return url.path().to_string();
        }
    }
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
