//! Client-side data layer for the course catalog search.
//!
//! # Overview
//! Fetches paged course searches, exact course lookups and FCE records from
//! the catalog backend and folds the results into an observable
//! `SearchState`.
//!
//! # Design
//! - `CatalogClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. It never touches the network.
//! - A `Transport` performs the round-trip. `ReqwestTransport` is the
//!   production implementation; tests plug in fakes.
//! - `SearchState::apply` is the reducer; `SearchStore` wraps it in a watch
//!   channel so the UI can subscribe to snapshots.
//! - `Catalog` ties the three together and owns the pending / fulfilled /
//!   rejected lifecycle of every tracked fetch.
//! - Session and filter values are passed in per call, never read globally.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod id;
pub mod query;
pub mod session;
pub mod state;
pub mod store;
pub mod transport;
pub mod types;

pub use catalog::Catalog;
pub use client::CatalogClient;
pub use config::CatalogConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use id::standardize_id;
pub use query::Query;
pub use session::{Filter, Session};
pub use state::{group_fces, Action, Generation, Operation, SearchState};
pub use store::SearchStore;
#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use types::{Course, CourseKeyed, FceRecord, SearchPage};

/// Build a `Catalog` over reqwest from `config`.
#[cfg(feature = "reqwest-transport")]
pub fn connect(config: &CatalogConfig) -> Result<Catalog<ReqwestTransport>, ApiError> {
    let transport = ReqwestTransport::new(config.request_timeout)?;
    tracing::debug!(base_url = %config.base_url, "catalog client configured");
    Ok(Catalog::new(CatalogClient::new(&config.base_url), transport))
}
