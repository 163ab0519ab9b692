//! Ad groups: bids and audience targeting within a campaign.

// self
use crate::{
	_prelude::*,
	api::{
		ApiResponse, DateTime, DisplayStatus, Money, PageQuery, PaymentModel, SearchAdsClient,
		Selector, ServingStatus,
	},
};

/// User-controlled ad group status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdGroupStatus {
	/// Eligible to serve.
	Enabled,
	/// Paused.
	Paused,
}

/// How bids are charged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingModel {
	/// Cost per click.
	Cpc,
	/// Cost per thousand impressions.
	Cpm,
}

/// Targetable device family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceClass {
	/// iPad.
	Ipad,
	/// iPhone.
	Iphone,
}

/// Targetable gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
	/// Female.
	#[serde(rename = "F")]
	Female,
	/// Male.
	#[serde(rename = "M")]
	Male,
}

/// Inclusive age bracket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeRange {
	/// Lower bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_age: Option<u32>,
	/// Upper bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_age: Option<u32>,
}

/// Inclusion list criterion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Included<T> {
	/// Values to target.
	#[serde(default)]
	pub included: Vec<T>,
}

/// Inclusion and exclusion list criterion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedExcluded<T> {
	/// Values to target.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub included: Vec<T>,
	/// Values to exclude.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub excluded: Vec<T>,
}

/// Hours of the week to serve in, in the user's local time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaypartCriteria {
	/// Hour-of-week slots (0-167).
	pub user_time: Included<u32>,
}

/// Audience refinements for an ad group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetingDimensions {
	/// States or regions.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub admin_area: Option<Included<String>>,
	/// Age brackets.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub age: Option<Included<AgeRange>>,
	/// App Store categories of apps the user has downloaded.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_categories: Option<IncludedExcluded<i64>>,
	/// Users who did or did not download the advertised app.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_downloaders: Option<IncludedExcluded<String>>,
	/// Storefronts.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub country: Option<Included<String>>,
	/// Hours of the week.
	#[serde(rename = "daypart", skip_serializing_if = "Option::is_none")]
	pub day_part: Option<DaypartCriteria>,
	/// Device families.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub device_class: Option<Included<DeviceClass>>,
	/// Genders.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gender: Option<Included<Gender>>,
	/// Cities.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub locality: Option<Included<String>>,
}

/// An ad group as returned by the API and as submitted on creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdGroup {
	/// Lets Apple add relevant keywords automatically.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub automated_keywords_opt_in: bool,
	/// Owning campaign.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub campaign_id: Option<i64>,
	/// Target cost per acquisition.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cpa_goal: Option<Money>,
	/// Creation instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub creation_time: Option<DateTime>,
	/// Bid applied to keywords without their own bid.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_bid_amount: Option<Money>,
	/// Whether the ad group is deleted.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub deleted: bool,
	/// UI status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub display_status: Option<DisplayStatus>,
	/// Scheduled end.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_time: Option<DateTime>,
	/// Ad group identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	/// Last modification instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub modification_time: Option<DateTime>,
	/// Ad group name, unique within the campaign.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub name: String,
	/// Owning organization.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub org_id: Option<i64>,
	/// Billing arrangement.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_model: Option<PaymentModel>,
	/// Bid charging model.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pricing_model: Option<PricingModel>,
	/// Reasons the ad group is not serving.
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
	pub status: Option<AdGroupStatus>,
	/// Audience refinements.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub targeting_dimensions: Option<TargetingDimensions>,
}

/// Mutable ad group fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupUpdate {
	/// New automated-keywords setting.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub automated_keywords_opt_in: Option<bool>,
	/// New CPA goal.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cpa_goal: Option<Money>,
	/// New default bid.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_bid_amount: Option<Money>,
	/// New end.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_time: Option<DateTime>,
	/// New name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// New start.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_time: Option<DateTime>,
	/// New status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<AdGroupStatus>,
	/// Replacement targeting; the API expects the field even when unchanged.
	pub targeting_dimensions: Option<TargetingDimensions>,
}

/// `campaigns/{id}/adgroups` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct AdGroupService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> AdGroupService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Lists the ad groups of a campaign.
	pub async fn list(
		&self,
		campaign_id: i64,
		query: &PageQuery,
	) -> Result<ApiResponse<Vec<AdGroup>>> {
		self.client.get(&format!("campaigns/{campaign_id}/adgroups"), query).await
	}

	/// Fetches one ad group.
	pub async fn get(&self, campaign_id: i64, ad_group_id: i64) -> Result<ApiResponse<AdGroup>> {
		self.client.get(&format!("campaigns/{campaign_id}/adgroups/{ad_group_id}"), &()).await
	}

	/// Finds ad groups of a campaign matching `selector`.
	pub async fn find(
		&self,
		campaign_id: i64,
		selector: &Selector,
	) -> Result<ApiResponse<Vec<AdGroup>>> {
		self.client.post(&format!("campaigns/{campaign_id}/adgroups/find"), &(), selector).await
	}

	/// Creates an ad group in a campaign.
	pub async fn create(
		&self,
		campaign_id: i64,
		ad_group: &AdGroup,
	) -> Result<ApiResponse<AdGroup>> {
		self.client.post(&format!("campaigns/{campaign_id}/adgroups"), &(), ad_group).await
	}

	/// Applies `update` to an ad group.
	pub async fn update(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		update: &AdGroupUpdate,
	) -> Result<ApiResponse<AdGroup>> {
		self.client.put(&format!("campaigns/{campaign_id}/adgroups/{ad_group_id}"), update).await
	}

	/// Deletes an ad group.
	pub async fn delete(&self, campaign_id: i64, ad_group_id: i64) -> Result<()> {
		self.client.delete(&format!("campaigns/{campaign_id}/adgroups/{ad_group_id}")).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn targeting_uses_wire_names() {
		let targeting = TargetingDimensions {
			age: Some(Included { included: vec![AgeRange { min_age: Some(18), max_age: None }] }),
			day_part: Some(DaypartCriteria { user_time: Included { included: vec![1, 2, 3] } }),
			gender: Some(Included { included: vec![Gender::Female] }),
			device_class: Some(Included { included: vec![DeviceClass::Iphone] }),
			..Default::default()
		};

		assert_eq!(
			serde_json::to_value(&targeting).expect("Targeting should serialize."),
			serde_json::json!({
				"age": { "included": [{ "minAge": 18 }] },
				"daypart": { "userTime": { "included": [1, 2, 3] } },
				"deviceClass": { "included": ["IPHONE"] },
				"gender": { "included": ["F"] }
			})
		);
	}

	#[test]
	fn update_always_sends_targeting() {
		let update = AdGroupUpdate { name: Some("Renamed".into()), ..Default::default() };

		assert_eq!(
			serde_json::to_value(&update).expect("Update should serialize."),
			serde_json::json!({ "name": "Renamed", "targetingDimensions": null })
		);
	}
}
