//! Optional observability for the token manager and the API client.
//!
//! With the `tracing` feature, token flows run inside `search_ads.flow` spans (`flow`,
//! `stage`) and API calls inside `search_ads.request` spans (`method`, `path`, `status`).
//! With the `metrics` feature, `search_ads_flow_total{flow, outcome}` counts every
//! attempt and its result, and `search_ads_api_responses_total{class}` counts API
//! responses by status class. Bearer tokens and assertions never reach either sink.
//! Both features compile to no-ops when disabled.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Client assertion signing.
	Assertion,
	/// Assertion-for-access-token exchange.
	TokenExchange,
	/// Authenticated API request.
	ApiCall,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Assertion => "assertion",
			FlowKind::TokenExchange => "token_exchange",
			FlowKind::ApiCall => "api_call",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Served from cache without regenerating.
	CacheHit,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::CacheHit => "cache_hit",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
