// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ob-core: Shared library for the outbox offline queue
//!
//! This crate provides the data types, the route manifest and eligibility
//! rules, and the storage, encryption and error-reporting seams used by the
//! outbox queue and sync layers.

use std::future::Future;
use std::pin::Pin;

pub mod crypto;
pub mod eligibility;
pub mod error;
pub mod report;
pub mod request;
pub mod routes;
pub mod store;

pub use crypto::{ChaChaCipher, Cipher};
pub use eligibility::{sanitize, EligibilityContract};
pub use error::{Error, Result};
pub use report::{ErrorReporter, ReportContext, TracingReporter};
pub use request::{Headers, MutationMethod, OutgoingRequest, QueuedRequest, RequestSpec};
pub use routes::{MountedSegments, Route, RouteManifest, DEFAULT_API_PREFIX};
pub use store::{KvStore, MemoryStore, StoreLock};

/// Boxed future returned by the collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
