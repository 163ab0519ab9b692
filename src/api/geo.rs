//! Geographic entity lookup for ad group targeting.

// self
use crate::{
	_prelude::*,
	api::{ApiResponse, PageQuery, SearchAdsClient, SearchGeoQuery},
};

/// Kind of geographic entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoEntityType {
	/// Country or region.
	Country,
	/// State or province.
	AdminArea,
	/// City.
	Locality,
}
impl GeoEntityType {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Country => "Country",
			Self::AdminArea => "AdminArea",
			Self::Locality => "Locality",
		}
	}
}

/// Identifies one geographic entity to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRequest {
	/// Entity kind.
	pub entity: GeoEntityType,
	/// Entity identifier, e.g. `US|CA|Cupertino`.
	pub id: String,
}

/// A resolved geographic entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchEntity {
	/// Human-readable name.
	pub display_name: String,
	/// Entity kind label.
	pub entity: String,
	/// Identifier usable in targeting dimensions.
	pub id: String,
}

/// `search/geo` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct GeoService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> GeoService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Searches locations by name.
	pub async fn search(&self, query: &SearchGeoQuery) -> Result<ApiResponse<Vec<SearchEntity>>> {
		self.client.get("search/geo", query).await
	}

	/// Resolves entities by identifier.
	pub async fn get(
		&self,
		query: &PageQuery,
		requests: &[GeoRequest],
	) -> Result<ApiResponse<Vec<SearchEntity>>> {
		self.client.post("search/geo", query, requests).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn geo_request_uses_entity_labels() {
		let request = GeoRequest { entity: GeoEntityType::AdminArea, id: "US|CA".into() };

		assert_eq!(
			serde_json::to_value(&request).expect("Geo request should serialize."),
			serde_json::json!({ "entity": "AdminArea", "id": "US|CA" })
		);
	}
}
