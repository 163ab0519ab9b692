//! Performance reports at campaign, ad group, keyword, search term, and creative set level.

// self
use crate::{
	_prelude::*,
	api::{
		AdChannelType, ApiResponse, CampaignStatus, Date, DateTime, DisplayStatus, Money,
		ReportingTimeZone, ReqDate, SearchAdsClient, Selector, ServingStatus, SupplySource,
	},
};

/// Row bucketing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportingGranularity {
	/// One row per hour.
	Hourly,
	/// One row per day.
	Daily,
	/// One row per week.
	Weekly,
	/// One row per month.
	Monthly,
}

/// Dimension rows can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportingGroupBy {
	/// State or region.
	AdminArea,
	/// Age bracket.
	AgeRange,
	/// Country code.
	CountryCode,
	/// Storefront.
	CountryOrRegion,
	/// Device family.
	DeviceClass,
	/// Gender.
	Gender,
	/// City.
	Locality,
}

/// Match type reported for keyword and search term rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportingKeywordMatchType {
	/// Matched by Search Match.
	Auto,
	/// Exact match.
	Exact,
	/// Broad match.
	Broad,
}

/// Origin of a search term row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchTermSource {
	/// Matched by Search Match.
	Auto,
	/// Matched a bidded keyword.
	Targeted,
}

/// Body of every report request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingRequest {
	/// First day included.
	pub start_time: ReqDate,
	/// Last day included.
	pub end_time: ReqDate,
	/// Row bucketing; omit to get totals only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub granularity: Option<ReportingGranularity>,
	/// Time zone used for bucketing.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub time_zone: Option<ReportingTimeZone>,
	/// Grouping dimensions.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub group_by: Vec<ReportingGroupBy>,
	/// Includes the grand totals row.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub return_grand_totals: bool,
	/// Includes rows without any activity.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub return_records_with_no_metrics: bool,
	/// Includes a totals row per record.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub return_row_totals: bool,
	/// Filtering, ordering, and paging of records.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub selector: Option<Selector>,
}
impl ReportingRequest {
	/// Creates a request covering `start_time..=end_time` with no other options.
	pub fn new(start_time: ReqDate, end_time: ReqDate) -> Self {
		Self {
			start_time,
			end_time,
			granularity: None,
			time_zone: None,
			group_by: Vec::new(),
			return_grand_totals: false,
			return_records_with_no_metrics: false,
			return_row_totals: false,
			selector: None,
		}
	}

	/// Buckets rows by `granularity`.
	pub fn granularity(mut self, granularity: ReportingGranularity) -> Self {
		self.granularity = Some(granularity);

		self
	}

	/// Buckets rows in `time_zone`.
	pub fn time_zone(mut self, time_zone: ReportingTimeZone) -> Self {
		self.time_zone = Some(time_zone);

		self
	}

	/// Adds a grouping dimension.
	pub fn group_by(mut self, dimension: ReportingGroupBy) -> Self {
		self.group_by.push(dimension);

		self
	}

	/// Requests grand totals and per-row totals.
	pub fn with_totals(mut self) -> Self {
		self.return_grand_totals = true;
		self.return_row_totals = true;

		self
	}

	/// Includes rows without any activity.
	pub fn with_empty_records(mut self) -> Self {
		self.return_records_with_no_metrics = true;

		self
	}

	/// Filters records with `selector`.
	pub fn selector(mut self, selector: Selector) -> Self {
		self.selector = Some(selector);

		self
	}
}

/// Aggregated metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpendRow {
	/// Average cost per thousand impressions.
	#[serde(rename = "avgCPM")]
	pub avg_cpm: Option<Money>,
	/// Average cost per tap.
	#[serde(rename = "avgCPT")]
	pub avg_cpt: Option<Money>,
	/// Impressions.
	pub impressions: i64,
	/// Spend in the organization's currency.
	pub local_spend: Option<Money>,
	/// Cost per tap-through install.
	#[serde(rename = "tapInstallCPI")]
	pub tap_install_cpi: Option<Money>,
	/// Tap-through install rate.
	pub tap_install_rate: f64,
	/// Tap-through installs.
	pub tap_installs: i64,
	/// Tap-through new downloads.
	pub tap_new_downloads: i64,
	/// Tap-through redownloads.
	#[serde(rename = "tapRedownloads")]
	pub tap_re_downloads: i64,
	/// Taps.
	pub taps: i64,
	/// Average cost per install across attribution types.
	#[serde(rename = "totalAvgCPI")]
	pub total_avg_cpi: Option<Money>,
	/// Install rate across attribution types.
	pub total_install_rate: f64,
	/// Installs across attribution types.
	pub total_installs: i64,
	/// New downloads across attribution types.
	pub total_new_downloads: i64,
	/// Redownloads across attribution types.
	#[serde(rename = "totalRedownloads")]
	pub total_re_downloads: i64,
	/// Tap-through rate.
	pub ttr: f64,
	/// View-through installs.
	pub view_installs: i64,
	/// View-through new downloads.
	pub view_new_downloads: i64,
	/// View-through redownloads.
	#[serde(rename = "viewRedownloads")]
	pub view_re_downloads: i64,
}

/// Metrics for one time bucket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedSpendRow {
	/// Bucket start.
	#[serde(default)]
	pub date: Option<Date>,
	/// Metrics for the bucket.
	#[serde(flatten)]
	pub metrics: SpendRow,
}

/// Suggested bid for a keyword.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeywordBidRecommendation {
	/// Suggested bid.
	pub suggested_bid_amount: Option<Money>,
}

/// Insights attached to keyword rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsightsObject {
	/// Bid recommendation.
	pub bid_recommendation: Option<KeywordBidRecommendation>,
}

/// App advertised by a reported campaign.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CampaignAppDetail {
	/// App name.
	pub app_name: String,
	/// App Store identifier.
	pub adam_id: i64,
}

/// Descriptive fields of a report record; which ones are set depends on the report level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaDataObject {
	/// Ad group identifier.
	pub ad_group_id: Option<i64>,
	/// Ad group name.
	pub ad_group_name: Option<String>,
	/// Whether the ad group is deleted.
	pub ad_group_deleted: Option<bool>,
	/// Campaign identifier.
	pub campaign_id: Option<i64>,
	/// Campaign name.
	pub campaign_name: Option<String>,
	/// Whether the record is deleted.
	pub deleted: Option<bool>,
	/// Campaign status.
	pub campaign_status: Option<CampaignStatus>,
	/// Advertised app.
	pub app: Option<CampaignAppDetail>,
	/// Serving status.
	pub serving_status: Option<ServingStatus>,
	/// Reasons for not serving.
	pub serving_state_reasons: Vec<String>,
	/// Targeted storefronts.
	pub countries_or_regions: Vec<String>,
	/// Last modification instant.
	pub modification_time: Option<DateTime>,
	/// Lifetime budget.
	pub total_budget: Option<Money>,
	/// Daily cap.
	pub daily_budget: Option<Money>,
	/// UI status.
	pub display_status: Option<DisplayStatus>,
	/// Inventory sources.
	pub supply_sources: Vec<SupplySource>,
	/// Placement.
	pub ad_channel_type: Option<AdChannelType>,
	/// Owning organization.
	pub org_id: Option<i64>,
	/// Per-storefront reasons for not serving.
	pub country_or_region_serving_state_reasons: BTreeMap<String, Vec<String>>,
	/// Billing event.
	pub billing_event: Option<String>,
	/// Keyword identifier.
	pub keyword_id: Option<i64>,
	/// Keyword text.
	pub keyword: Option<String>,
	/// Keyword status.
	pub keyword_status: Option<String>,
	/// Keyword UI status.
	pub keyword_display_status: Option<String>,
	/// Match type.
	pub match_type: Option<ReportingKeywordMatchType>,
	/// Storefront of the row.
	pub country_or_region: Option<String>,
	/// Search term text.
	pub search_term_text: Option<String>,
	/// Search term origin.
	pub search_term_source: Option<SearchTermSource>,
}

/// One report record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
	/// Keyword insights.
	pub insights: Option<InsightsObject>,
	/// Per-bucket metrics when a granularity was requested.
	pub granularity: Vec<ExtendedSpendRow>,
	/// Descriptive fields.
	pub metadata: Option<MetaDataObject>,
	/// Whether this row aggregates records below the reporting threshold.
	pub other: bool,
	/// Totals for the record.
	pub total: Option<SpendRow>,
}

/// Totals across every record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrandTotalsRow {
	/// Whether some records were folded into an "other" bucket.
	pub other: bool,
	/// Totals.
	pub total: Option<SpendRow>,
}

/// Records and totals of a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportingDataResponse {
	/// Grand totals, when requested.
	pub grand_totals: Option<GrandTotalsRow>,
	/// Records.
	#[serde(rename = "row")]
	pub rows: Vec<Row>,
}

/// Payload of every report response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportingResponse {
	/// Report content.
	pub reporting_data_response: Option<ReportingDataResponse>,
}

/// `reports` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct ReportingService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> ReportingService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Campaign level report for the organization.
	pub async fn campaigns(
		&self,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run("reports/campaigns".into(), request).await
	}

	/// Ad group level report for a campaign.
	pub async fn ad_groups(
		&self,
		campaign_id: i64,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run(format!("reports/campaigns/{campaign_id}/adgroups"), request).await
	}

	/// Keyword level report for a campaign.
	pub async fn keywords(
		&self,
		campaign_id: i64,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run(format!("reports/campaigns/{campaign_id}/keywords"), request).await
	}

	/// Keyword level report for one ad group.
	pub async fn ad_group_keywords(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run(
			format!("reports/campaigns/{campaign_id}/adgroups/{ad_group_id}/keywords"),
			request,
		)
		.await
	}

	/// Search term level report for a campaign.
	pub async fn search_terms(
		&self,
		campaign_id: i64,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run(format!("reports/campaigns/{campaign_id}/searchterms"), request).await
	}

	/// Search term level report for one ad group.
	pub async fn ad_group_search_terms(
		&self,
		campaign_id: i64,
		ad_group_id: i64,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run(
			format!("reports/campaigns/{campaign_id}/adgroups/{ad_group_id}/searchterms"),
			request,
		)
		.await
	}

	/// Creative set level report for a campaign.
	pub async fn creative_sets(
		&self,
		campaign_id: i64,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.run(format!("reports/campaigns/{campaign_id}/creativesets"), request).await
	}

	async fn run(
		&self,
		path: String,
		request: &ReportingRequest,
	) -> Result<ApiResponse<ReportingResponse>> {
		self.client.post(&path, &(), request).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_serializes_dates_and_flags() {
		let start = ReqDate::from_ymd(2024, 1, 1).expect("Start date should be valid.");
		let end = ReqDate::from_ymd(2024, 1, 7).expect("End date should be valid.");
		let request = ReportingRequest::new(start, end)
			.granularity(ReportingGranularity::Daily)
			.time_zone(ReportingTimeZone::Utc)
			.group_by(ReportingGroupBy::CountryOrRegion)
			.with_empty_records();

		assert_eq!(
			serde_json::to_value(&request).expect("Report request should serialize."),
			serde_json::json!({
				"startTime": "2024-01-01",
				"endTime": "2024-01-07",
				"granularity": "DAILY",
				"timeZone": "UTC",
				"groupBy": ["countryOrRegion"],
				"returnRecordsWithNoMetrics": true
			})
		);
	}

	#[test]
	fn report_rows_decode_metrics_and_buckets() {
		let response: ReportingResponse = serde_json::from_str(
			r#"{
				"reportingDataResponse": {
					"row": [{
						"other": false,
						"granularity": [{
							"date": "2024-01-01",
							"impressions": 120,
							"taps": 12,
							"ttr": 0.1,
							"avgCPT": { "amount": "0.5", "currency": "USD" }
						}],
						"metadata": {
							"campaignId": 1,
							"campaignName": "Brand",
							"campaignStatus": "ENABLED",
							"app": { "appName": "Puzzle", "adamId": 99 }
						}
					}],
					"grandTotals": { "other": false, "total": { "impressions": 120, "taps": 12 } }
				}
			}"#,
		)
		.expect("Report payload should decode.");
		let data = response.reporting_data_response.expect("Report data should be present.");
		let bucket = &data.rows[0].granularity[0];

		assert_eq!(bucket.metrics.impressions, 120);
		assert_eq!(bucket.metrics.avg_cpt, Some(Money::new("0.5", "USD")));
		assert_eq!(bucket.date, Date::parse("2024-01-01"));

		let app = data.rows[0].metadata.as_ref().and_then(|meta| meta.app.as_ref());

		assert_eq!(app.map(|app| app.adam_id), Some(99));
		assert_eq!(
			data.grand_totals.and_then(|totals| totals.total).map(|total| total.taps),
			Some(12)
		);
	}
}
