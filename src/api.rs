//! Typed Search Ads REST API: request plumbing, query encoding, selectors, wire adapters,
//! and one service per resource family.
//!
//! Services are borrowed from a [`SearchAdsClient`] (`client.campaigns()`,
//! `client.reports()`, ...) and return the decoded [`ApiResponse`] envelope.

pub mod acl;
pub mod adgroup;
pub mod app;
pub mod campaign;
pub mod geo;
pub mod keyword;
pub mod reporting;

mod client;
mod query;
mod schema;
mod selector;

pub use acl::*;
pub use adgroup::*;
pub use app::*;
pub use campaign::*;
pub use client::*;
pub use geo::*;
pub use keyword::*;
pub use query::*;
pub use reporting::*;
pub use schema::*;
pub use selector::*;
