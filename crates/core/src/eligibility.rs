// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rules deciding whether a write may be deferred while offline.
//!
//! A request is queueable iff:
//! 1. its method is POST, PUT, PATCH or DELETE,
//! 2. its url resolves (against the API base) to the base's origin,
//! 3. the resolved path lies under the API prefix,
//! 4. the first segment after the prefix is mounted by the backend.
//!
//! Queued entries carry their headers, credentials included, so an absolute
//! url pointing at another scheme, host or port is never queued.

use url::Url;

use crate::error::{Error, Result};
use crate::request::{OutgoingRequest, RequestSpec};
use crate::routes::{first_segment_after, normalize_prefix, MountedSegments, RouteManifest};

/// Eligibility contract built once from the route manifest.
#[derive(Debug, Clone)]
pub struct EligibilityContract {
    base: Url,
    prefix: String,
    segments: MountedSegments,
}

impl EligibilityContract {
    /// Builds the contract, deriving the mounted segments from `manifest`.
    pub fn new(api_base: &str, prefix: &str, manifest: &RouteManifest) -> Result<Self> {
        let base = Url::parse(api_base.trim()).map_err(|e| Error::InvalidUrl {
            url: api_base.to_string(),
            reason: e.to_string(),
        })?;
        let prefix = normalize_prefix(prefix);
        let segments = MountedSegments::from_manifest(manifest, &prefix);
        Ok(EligibilityContract {
            base,
            prefix,
            segments,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn segments(&self) -> &MountedSegments {
        &self.segments
    }

    /// Resolves a request url against the API base.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        self.base.join(url.trim()).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns true if the request may be placed in the offline queue.
    pub fn is_queueable(&self, request: &OutgoingRequest) -> bool {
        if request.mutation_method().is_none() {
            return false;
        }
        let Ok(resolved) = self.resolve(&request.url) else {
            return false;
        };
        if resolved.origin() != self.base.origin() {
            return false;
        }
        first_segment_after(resolved.path(), &self.prefix)
            .is_some_and(|segment| self.segments.contains(segment))
    }

    /// Sanitizes a request for persistence. See [`sanitize`].
    pub fn sanitize(&self, request: &OutgoingRequest) -> Result<RequestSpec> {
        sanitize(request)
    }
}

/// Copies only the allow-listed fields of a request.
///
/// The method is upper-cased and the url trimmed; anything else the caller
/// attached never reaches storage.
pub fn sanitize(request: &OutgoingRequest) -> Result<RequestSpec> {
    Ok(RequestSpec {
        url: request.url.trim().to_string(),
        method: request.method.parse()?,
        body: request.body.clone(),
        headers: request.headers.clone(),
        timeout: request.timeout,
    })
}

#[cfg(test)]
#[path = "eligibility_tests.rs"]
mod tests;
