//! Query-string encoding for list and search endpoints.
//!
//! Each request type spells out its own parameters; zero numbers, empty strings, and
//! `false` flags are left out of the query string.

// self
use crate::api::GeoEntityType;

/// Encodes a request type as query-string pairs.
pub trait QueryParams {
	/// Returns the non-empty parameters in wire order.
	fn to_query(&self) -> Vec<(&'static str, String)>;
}
impl<T> QueryParams for &T
where
	T: ?Sized + QueryParams,
{
	fn to_query(&self) -> Vec<(&'static str, String)> {
		(**self).to_query()
	}
}

impl QueryParams for () {
	fn to_query(&self) -> Vec<(&'static str, String)> {
		Vec::new()
	}
}

/// Generic `limit`/`offset` window for list endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
	/// Maximum number of records; the API default applies when zero.
	pub limit: u32,
	/// Zero-based index of the first record.
	pub offset: u32,
}
impl PageQuery {
	/// Creates a window of `limit` records starting at `offset`.
	pub fn new(limit: u32, offset: u32) -> Self {
		Self { limit, offset }
	}
}
impl QueryParams for PageQuery {
	fn to_query(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		push_number(&mut pairs, "limit", self.limit);
		push_number(&mut pairs, "offset", self.offset);

		pairs
	}
}

/// Window for campaign listing; `limit` defaults to 10.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListCampaignsQuery {
	/// Maximum number of campaigns; zero selects the default.
	pub limit: u32,
	/// Zero-based index of the first campaign.
	pub offset: u32,
}
impl ListCampaignsQuery {
	/// Limit sent when the caller leaves it unset.
	pub const DEFAULT_LIMIT: u32 = 10;
}
impl QueryParams for ListCampaignsQuery {
	fn to_query(&self) -> Vec<(&'static str, String)> {
		let limit = if self.limit == 0 { Self::DEFAULT_LIMIT } else { self.limit };

		PageQuery::new(limit, self.offset).to_query()
	}
}

/// Geographic search parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchGeoQuery {
	/// Maximum number of results.
	pub limit: u32,
	/// Zero-based index of the first result.
	pub offset: u32,
	/// Free-text search term.
	pub query: String,
	/// ISO alpha-2 country code narrowing the search.
	pub country_code: String,
	/// Kind of location to search for.
	pub entity: Option<GeoEntityType>,
}
impl QueryParams for SearchGeoQuery {
	fn to_query(&self) -> Vec<(&'static str, String)> {
		let mut pairs = PageQuery::new(self.limit, self.offset).to_query();

		push_text(&mut pairs, "query", &self.query);
		push_text(&mut pairs, "countrycode", &self.country_code);

		if let Some(entity) = self.entity {
			pairs.push(("entity", entity.as_str().to_owned()));
		}

		pairs
	}
}

/// App search parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchAppsQuery {
	/// Maximum number of results.
	pub limit: u32,
	/// Zero-based index of the first result.
	pub offset: u32,
	/// App name or identifier to search for.
	pub query: String,
	/// Restricts results to apps the organization owns.
	pub return_owned_apps: bool,
}
impl QueryParams for SearchAppsQuery {
	fn to_query(&self) -> Vec<(&'static str, String)> {
		let mut pairs = PageQuery::new(self.limit, self.offset).to_query();

		push_text(&mut pairs, "query", &self.query);

		if self.return_owned_apps {
			pairs.push(("returnOwnedApps", "true".into()));
		}

		pairs
	}
}

fn push_number(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: u32) {
	if value != 0 {
		pairs.push((name, value.to_string()));
	}
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &str) {
	if !value.is_empty() {
		pairs.push((name, value.to_owned()));
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn campaign_listing_defaults_limit() {
		assert_eq!(ListCampaignsQuery::default().to_query(), vec![("limit", "10".to_owned())]);
		assert_eq!(
			ListCampaignsQuery { limit: 50, offset: 100 }.to_query(),
			vec![("limit", "50".to_owned()), ("offset", "100".to_owned())]
		);
	}

	#[test]
	fn zero_and_empty_values_are_omitted() {
		assert!(PageQuery::default().to_query().is_empty());
		assert!(SearchAppsQuery::default().to_query().is_empty());

		let geo = SearchGeoQuery {
			query: "san".into(),
			country_code: "US".into(),
			entity: Some(GeoEntityType::Locality),
			..Default::default()
		};

		assert_eq!(
			geo.to_query(),
			vec![
				("query", "san".to_owned()),
				("countrycode", "US".to_owned()),
				("entity", "Locality".to_owned()),
			]
		);
	}

	#[test]
	fn owned_apps_flag_is_sent_only_when_set() {
		let query = SearchAppsQuery {
			query: "puzzle".into(),
			return_owned_apps: true,
			..Default::default()
		};

		assert_eq!(
			query.to_query(),
			vec![("query", "puzzle".to_owned()), ("returnOwnedApps", "true".to_owned())]
		);
	}
}
