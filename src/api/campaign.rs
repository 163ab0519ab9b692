//! Campaigns: the top-level container for budgets, countries, and ad groups.

// self
use crate::{
	_prelude::*,
	api::{
		ApiResponse, DateTime, Email, ListCampaignsQuery, Money, PaymentModel, SearchAdsClient,
		Selector,
	},
};

/// Placement a campaign serves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdChannelType {
	/// App Store search results.
	Search,
	/// Display placements such as the Today tab.
	Display,
}

/// Event the campaign is billed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingEvent {
	/// Cost per tap.
	Taps,
	/// Cost per thousand impressions.
	Impressions,
}

/// Status shown in the Search Ads UI; shared by campaigns and ad groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayStatus {
	/// Serving.
	Running,
	/// Blocked by a serving-state reason.
	OnHold,
	/// Paused by the user.
	Paused,
	/// Deleted.
	Deleted,
}

/// Whether the entity is currently eligible to serve; shared by campaigns and ad groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
	/// Serving.
	Running,
	/// Not serving; see the serving-state reasons.
	NotRunning,
}

/// User-controlled campaign status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
	/// Eligible to serve.
	Enabled,
	/// Paused.
	Paused,
}

/// App Store placement a campaign draws inventory from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplySource {
	/// Search results.
	AppstoreSearchResults,
	/// Search tab.
	AppstoreSearchTab,
	/// Today tab.
	AppstoreTodayTab,
	/// Product pages while browsing.
	AppstoreProductPagesBrowse,
}

/// Line-of-credit invoicing contacts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocInvoiceDetails {
	/// Billing contact address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub billing_contact_email: Option<Email>,
	/// Buyer contact address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub buyer_email: Option<Email>,
	/// Buyer name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub buyer_name: Option<String>,
	/// Client name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_name: Option<String>,
	/// Purchase order number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_number: Option<String>,
}

/// A campaign as returned by the API and as submitted on creation.
///
/// Read-only fields (`id`, timestamps, statuses) are ignored by the API on creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Campaign {
	/// Advertised app's App Store identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub adam_id: Option<i64>,
	/// Placement.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ad_channel_type: Option<AdChannelType>,
	/// Billing event.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub billing_event: Option<BillingEvent>,
	/// Lifetime budget.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub budget_amount: Option<Money>,
	/// Budget order identifiers (line-of-credit organizations).
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub budget_orders: Vec<i64>,
	/// ISO alpha-2 codes of targeted storefronts.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub countries_or_regions: Vec<String>,
	/// Per-storefront reasons the campaign is not serving.
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub country_or_region_serving_state_reasons: BTreeMap<String, Vec<String>>,
	/// Creation instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub creation_time: Option<DateTime>,
	/// Daily spend cap.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub daily_budget_amount: Option<Money>,
	/// Whether the campaign is deleted.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub deleted: bool,
	/// UI status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub display_status: Option<DisplayStatus>,
	/// Scheduled end.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_time: Option<DateTime>,
	/// Campaign identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	/// Invoicing contacts.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub loc_invoice_details: Option<LocInvoiceDetails>,
	/// Last modification instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub modification_time: Option<DateTime>,
	/// Campaign name, unique within the organization.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub name: String,
	/// Owning organization.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub org_id: Option<i64>,
	/// Billing arrangement.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_model: Option<PaymentModel>,
	/// Reasons the campaign is not serving.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub serving_state_reasons: Vec<String>,
	/// Serving status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub serving_status: Option<ServingStatus>,
	/// Scheduled start.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_time: Option<DateTime>,
	/// User-controlled status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<CampaignStatus>,
	/// Inventory sources.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub supply_sources: Vec<SupplySource>,
}

/// Mutable campaign fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
	/// New lifetime budget.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub budget_amount: Option<Money>,
	/// New budget order.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub budget_orders: Option<i64>,
	/// Replacement storefront list.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub countries_or_regions: Vec<String>,
	/// New daily cap.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub daily_budget_amount: Option<Money>,
	/// New invoicing contacts.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub loc_invoice_details: Option<LocInvoiceDetails>,
	/// New name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// New status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<CampaignStatus>,
}

/// Body of a campaign update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
	/// Fields to change.
	pub campaign: CampaignUpdate,
	/// Drops ad group geo targeting when the storefront list changes.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub clear_geo_targeting_on_country_or_region_change: bool,
}
impl From<CampaignUpdate> for UpdateCampaignRequest {
	fn from(campaign: CampaignUpdate) -> Self {
		Self { campaign, clear_geo_targeting_on_country_or_region_change: false }
	}
}

/// `campaigns` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct CampaignService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> CampaignService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Lists campaigns in the current organization.
	pub async fn list(&self, query: &ListCampaignsQuery) -> Result<ApiResponse<Vec<Campaign>>> {
		self.client.get("campaigns", query).await
	}

	/// Fetches one campaign.
	pub async fn get(&self, campaign_id: i64) -> Result<ApiResponse<Campaign>> {
		self.client.get(&format!("campaigns/{campaign_id}"), &()).await
	}

	/// Finds campaigns matching `selector`.
	pub async fn find(&self, selector: &Selector) -> Result<ApiResponse<Vec<Campaign>>> {
		self.client.post("campaigns/find", &(), selector).await
	}

	/// Creates a campaign.
	pub async fn create(&self, campaign: &Campaign) -> Result<ApiResponse<Campaign>> {
		self.client.post("campaigns", &(), campaign).await
	}

	/// Applies `update` to a campaign.
	pub async fn update(
		&self,
		campaign_id: i64,
		update: &UpdateCampaignRequest,
	) -> Result<ApiResponse<Campaign>> {
		self.client.put(&format!("campaigns/{campaign_id}"), update).await
	}

	/// Deletes a campaign.
	pub async fn delete(&self, campaign_id: i64) -> Result<()> {
		self.client.delete(&format!("campaigns/{campaign_id}")).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn campaign_round_trips_api_payload() {
		let campaign: Campaign = serde_json::from_str(
			r#"{
				"id": 1234,
				"orgId": 42,
				"name": "Brand",
				"adamId": 987654,
				"budgetAmount": { "amount": "1000", "currency": "USD" },
				"countriesOrRegions": ["US", "GB"],
				"countryOrRegionServingStateReasons": { "GB": ["APP_NOT_ELIGIBLE"] },
				"creationTime": "2021-03-24T07:23:53.303",
				"displayStatus": "ON_HOLD",
				"servingStatus": "NOT_RUNNING",
				"servingStateReasons": ["NO_PAYMENT_METHOD_ON_FILE"],
				"status": "ENABLED",
				"supplySources": ["APPSTORE_SEARCH_RESULTS"],
				"adChannelType": "SEARCH",
				"billingEvent": "TAPS",
				"paymentModel": "PAYG",
				"deleted": false,
				"endTime": null
			}"#,
		)
		.expect("Campaign payload should decode.");

		assert_eq!(campaign.id, Some(1234));
		assert_eq!(campaign.display_status, Some(DisplayStatus::OnHold));
		assert_eq!(campaign.country_or_region_serving_state_reasons["GB"], ["APP_NOT_ELIGIBLE"]);
		assert_eq!(campaign.end_time, None);

		let json = serde_json::to_value(&campaign).expect("Campaign should serialize.");

		assert_eq!(json["creationTime"], "2021-03-24T07:23:53.303");
		assert!(json.get("deleted").is_none());
		assert!(json.get("endTime").is_none());
	}

	#[test]
	fn update_request_omits_unset_fields() {
		let request = UpdateCampaignRequest::from(CampaignUpdate {
			status: Some(CampaignStatus::Paused),
			..Default::default()
		});

		assert_eq!(
			serde_json::to_value(&request).expect("Update should serialize."),
			serde_json::json!({ "campaign": { "status": "PAUSED" } })
		);
	}
}
