//! App Store app lookup.

// self
use crate::{
	_prelude::*,
	api::{ApiResponse, SearchAdsClient, SearchAppsQuery},
};

/// An app that can be promoted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppInfo {
	/// App Store identifier.
	pub adam_id: i64,
	/// App name.
	pub app_name: String,
	/// Storefronts the app is eligible in.
	pub country_or_region_codes: Vec<String>,
	/// Developer name.
	pub developer_name: String,
}

/// `search/apps` endpoint.
#[derive(Clone, Copy, Debug)]
pub struct AppService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> AppService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Searches apps by name or identifier.
	pub async fn search(&self, query: &SearchAppsQuery) -> Result<ApiResponse<Vec<AppInfo>>> {
		self.client.get("search/apps", query).await
	}
}
