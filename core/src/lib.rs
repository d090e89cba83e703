//! Synchronous API client core for a biodiversity-observation service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! provider's observation endpoints (host-does-IO pattern). The network
//! round-trip is delegated to an `HttpExecutor`, so the core stays
//! deterministic and testable; `UreqExecutor` is provided behind the default
//! `ureq` feature.
//!
//! # Design
//! - `NaturalistClient` is stateless; it holds only an immutable
//!   `ClientConfig` (base URL, credentials, user agent).
//! - Each operation is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), plus a method running both through an
//!   executor.
//! - Optional provider fields are `Option`s on both read and write, so
//!   "unset" never means "zero".
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

mod codec;

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observed_on;
pub mod paging;
pub mod query;
pub mod types;

pub use client::NaturalistClient;
pub use config::ClientConfig;
pub use error::{ApiError, ObservedOnError, Operation};
#[cfg(feature = "ureq")]
pub use http::UreqExecutor;
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, TransportError};
pub use observed_on::parse_observed_on;
pub use paging::{InvalidPagingHeader, PageInfo};
pub use query::{InvalidBoundingBox, ObservationQuery, SortOrder};
pub use types::{
    Comment, CreateObservation, GeoPrivacy, Location, Observation, ObservationPhoto,
    ObservationSummary, ObservationsPage, Photo, ProjectObservation, Rectangle,
    UpdateObservation, UserSummary,
};
