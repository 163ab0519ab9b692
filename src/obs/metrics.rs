// self
use crate::obs::{FlowKind, FlowOutcome};

/// Increments `search_ads_flow_total{flow, outcome}` when the `metrics` feature is enabled.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"search_ads_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Increments `search_ads_api_responses_total{class}` for every API response received.
pub fn record_api_status(status: u16) {
	let class = status_class(status);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("search_ads_api_responses_total", "class" => class).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = class;
	}
}

fn status_class(status: u16) -> &'static str {
	match status {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		401 => "401",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unauthorized_has_its_own_class() {
		assert_eq!(status_class(401), "401");
		assert_eq!(status_class(404), "4xx");
		assert_eq!(status_class(204), "2xx");
		assert_eq!(status_class(503), "5xx");
		assert_eq!(status_class(42), "other");
	}

	#[test]
	fn recording_without_recorder_is_harmless() {
		record_flow_outcome(FlowKind::ApiCall, FlowOutcome::Failure);
		record_api_status(401);
	}
}
