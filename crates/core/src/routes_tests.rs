// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    default = { "/api/v1", "/api/v1" },
    trailing = { "/api/v1/", "/api/v1" },
    no_leading = { "api/v1", "/api/v1" },
    root = { "/", "" },
    empty = { "", "" },
)]
fn prefix_normalizes(input: &str, expected: &str) {
    assert_eq!(normalize_prefix(input), expected);
}

#[parameterized(
    simple = { "/api/v1/orders", Some("orders") },
    nested = { "/api/v1/orders/42/items", Some("orders") },
    query = { "/api/v1/notes?draft=1", Some("notes") },
    double_slash = { "/api/v1//notes", Some("notes") },
    bare_prefix = { "/api/v1", None },
    outside = { "/auth/login", None },
    lookalike = { "/api/v10/orders", None },
    placeholder = { "/api/v1/{tenant}/orders", None },
    colon_placeholder = { "/api/v1/:tenant", None },
)]
fn segment_after_prefix(path: &str, expected: Option<&str>) {
    assert_eq!(first_segment_after(path, "/api/v1"), expected);
}

#[test]
fn segment_with_empty_prefix() {
    assert_eq!(first_segment_after("/orders/1", ""), Some("orders"));
}

#[test]
fn segments_from_manifest() {
    let manifest = RouteManifest::default()
        .route("POST", "/api/v1/orders")
        .route("PUT", "/api/v1/orders/{id}")
        .route("GET", "/api/v1/profile")
        .route("POST", "https://api.example.com/api/v1/notes")
        .route("POST", "api/v1/tags")
        .route("POST", "/auth/login");

    let segments = MountedSegments::from_manifest(&manifest, DEFAULT_API_PREFIX);

    assert_eq!(
        segments.iter().collect::<Vec<_>>(),
        vec!["notes", "orders", "profile", "tags"]
    );
    assert!(!segments.contains("auth"));
    assert_eq!(segments.len(), 4);
}

#[test]
fn empty_manifest_mounts_nothing() {
    let segments = MountedSegments::from_manifest(&RouteManifest::default(), "/api/v1");
    assert!(segments.is_empty());
}

#[test]
fn manifest_deserializes_from_list() {
    let json = r#"[{"method":"POST","path":"/api/v1/orders"}]"#;
    let manifest: RouteManifest = serde_json::from_str(json).unwrap();
    assert_eq!(manifest.routes(), &[Route::new("POST", "/api/v1/orders")]);
}
