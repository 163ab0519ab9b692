//! Targeting and negative keywords.

// self
use crate::{
	_prelude::*,
	api::{ApiResponse, DateTime, Money, PageQuery, SearchAdsClient, Selector},
};

/// How a keyword is matched against search terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordMatchType {
	/// Close variants, synonyms, and related terms.
	#[serde(alias = "Broad")]
	Broad,
	/// The term and its close variants only.
	#[serde(alias = "Exact")]
	Exact,
}

/// Keyword status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordStatus {
	/// Eligible to serve.
	Active,
	/// Paused.
	Paused,
}

/// A bidded keyword in an ad group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keyword {
	/// Owning ad group.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ad_group_id: Option<i64>,
	/// Bid; the ad group default applies when unset.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bid_amount: Option<Money>,
	/// Owning campaign.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub campaign_id: Option<i64>,
	/// Creation instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub creation_time: Option<DateTime>,
	/// Whether the keyword is deleted.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub deleted: bool,
	/// Keyword identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	/// Match type.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub match_type: Option<KeywordMatchType>,
	/// Last modification instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub modification_time: Option<DateTime>,
	/// Status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<KeywordStatus>,
	/// Keyword text.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub text: String,
}

/// Change to an existing targeting keyword.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordUpdate {
	/// Keyword identifier.
	pub id: i64,
	/// Owning ad group.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ad_group_id: Option<i64>,
	/// New bid.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bid_amount: Option<Money>,
	/// Marks the keyword deleted.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub deleted: bool,
	/// New match type.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub match_type: Option<KeywordMatchType>,
	/// New status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<KeywordStatus>,
}

/// A keyword the campaign or ad group must not serve on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NegativeKeyword {
	/// Owning ad group, for ad group level negatives.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ad_group_id: Option<i64>,
	/// Owning campaign.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub campaign_id: Option<i64>,
	/// Creation instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub creation_time: Option<DateTime>,
	/// Whether the keyword is deleted.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub deleted: bool,
	/// Keyword identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	/// Match type.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub match_type: Option<KeywordMatchType>,
	/// Last modification instant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub modification_time: Option<DateTime>,
	/// Status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<KeywordStatus>,
	/// Keyword text.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub text: String,
}

/// Owner of a set of negative keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NegativeKeywordLevel {
	/// Applies to every ad group of the campaign.
	Campaign(i64),
	/// Applies to a single ad group.
	AdGroup {
		/// Owning campaign.
		campaign_id: i64,
		/// Owning ad group.
		ad_group_id: i64,
	},
}
impl NegativeKeywordLevel {
	fn path(self) -> String {
		match self {
			Self::Campaign(campaign_id) => format!("campaigns/{campaign_id}/negativekeywords"),
			Self::AdGroup { campaign_id, ad_group_id } =>
				format!("campaigns/{campaign_id}/adgroups/{ad_group_id}/negativekeywords"),
		}
	}
}

/// `targetingkeywords` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct KeywordService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> KeywordService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Finds targeting keywords across the ad groups of a campaign.
	pub async fn find(
		&self,
		campaign_id: i64,
		selector: &Selector,
	) -> Result<ApiResponse<Vec<Keyword>>> {
		self.client
			.post(&format!("campaigns/{campaign_id}/adgroups/targetingkeywords/find"), &(), selector)
			.await
	}

	/// Fetches one targeting keyword.
	pub async fn get(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		keyword_id: i64,
	) -> Result<ApiResponse<Keyword>> {
		self.client
			.get(
				&format!(
					"campaigns/{campaign_id}/adgroups/{ad_group_id}/targetingkeywords/{keyword_id}"
				),
				&(),
			)
			.await
	}

	/// Lists the targeting keywords of an ad group.
	pub async fn list(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		query: &PageQuery,
	) -> Result<ApiResponse<Vec<Keyword>>> {
		self.client
			.get(
				&format!("campaigns/{campaign_id}/adgroups/{ad_group_id}/targetingkeywords/"),
				query,
			)
			.await
	}

	/// Adds targeting keywords to an ad group.
	pub async fn create(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		keywords: &[Keyword],
	) -> Result<ApiResponse<Vec<Keyword>>> {
		self.client
			.post(
				&format!("campaigns/{campaign_id}/adgroups/{ad_group_id}/targetingkeywords/bulk"),
				&(),
				keywords,
			)
			.await
	}

	/// Updates targeting keywords of an ad group.
	pub async fn update(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		updates: &[KeywordUpdate],
	) -> Result<ApiResponse<Vec<Keyword>>> {
		self.client
			.put(
				&format!("campaigns/{campaign_id}/adgroups/{ad_group_id}/targetingkeywords/bulk"),
				updates,
			)
			.await
	}
}

/// `negativekeywords` endpoints at campaign and ad group level.
#[derive(Clone, Copy, Debug)]
pub struct NegativeKeywordService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> NegativeKeywordService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Finds campaign level negative keywords.
	pub async fn find(
		&self,
		campaign_id: i64,
		selector: &Selector,
	) -> Result<ApiResponse<Vec<NegativeKeyword>>> {
		self.client
			.post(&format!("campaigns/{campaign_id}/negativekeywords/find"), &(), selector)
			.await
	}

	/// Finds ad group level negative keywords across the ad groups of a campaign.
	pub async fn find_in_ad_groups(
		&self,
		campaign_id: i64,
		selector: &Selector,
	) -> Result<ApiResponse<Vec<NegativeKeyword>>> {
		self.client
			.post(&format!("campaigns/{campaign_id}/adgroups/negativekeywords/find"), &(), selector)
			.await
	}

	/// Fetches one negative keyword.
	pub async fn get(
		&self,
		level: NegativeKeywordLevel,
		keyword_id: i64,
	) -> Result<ApiResponse<NegativeKeyword>> {
		self.client.get(&format!("{}/{keyword_id}", level.path()), &()).await
	}

	/// Lists the negative keywords owned by `level`.
	pub async fn list(
		&self,
		level: NegativeKeywordLevel,
		query: &PageQuery,
	) -> Result<ApiResponse<Vec<NegativeKeyword>>> {
		self.client.get(&format!("{}/", level.path()), query).await
	}

	/// Adds negative keywords to `level`.
	pub async fn create(
		&self,
		level: NegativeKeywordLevel,
		keywords: &[NegativeKeyword],
	) -> Result<ApiResponse<Vec<NegativeKeyword>>> {
		self.client.post(&format!("{}/bulk", level.path()), &(), keywords).await
	}

	/// Updates negative keywords owned by `level`.
	pub async fn update(
		&self,
		level: NegativeKeywordLevel,
		keywords: &[NegativeKeyword],
	) -> Result<ApiResponse<Vec<NegativeKeyword>>> {
		self.client.put(&format!("{}/bulk", level.path()), keywords).await
	}

	/// Deletes negative keywords by identifier; the payload is the number removed.
	pub async fn delete(
		&self,
		level: NegativeKeywordLevel,
		keyword_ids: &[i64],
	) -> Result<ApiResponse<i32>> {
		self.client.post(&format!("{}/delete/bulk", level.path()), &(), keyword_ids).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn negative_keyword_paths_follow_level() {
		assert_eq!(NegativeKeywordLevel::Campaign(5).path(), "campaigns/5/negativekeywords");
		assert_eq!(
			NegativeKeywordLevel::AdGroup { campaign_id: 5, ad_group_id: 9 }.path(),
			"campaigns/5/adgroups/9/negativekeywords"
		);
	}

	#[test]
	fn match_type_accepts_legacy_casing() {
		let keyword: Keyword = serde_json::from_str(
			r#"{"text":"puzzle","matchType":"Exact","bidAmount":{"amount":"1.2","currency":"USD"}}"#,
		)
		.expect("Keyword should decode.");

		assert_eq!(keyword.match_type, Some(KeywordMatchType::Exact));
		assert_eq!(
			serde_json::to_value(&keyword).expect("Keyword should serialize.")["matchType"],
			"EXACT"
		);
	}
}
