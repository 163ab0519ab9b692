//! Access-control lists: which organizations the caller can act for.

// self
use crate::{
	_prelude::*,
	api::{ApiResponse, SearchAdsClient},
};

/// Billing arrangement of an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentModel {
	/// Pay as you go.
	#[serde(rename = "PAYG")]
	PayAsYouGo,
	/// Line of credit.
	#[serde(rename = "LOC")]
	LineOfCredit,
}

/// Time zone used when bucketing report rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportingTimeZone {
	/// Coordinated universal time.
	#[serde(rename = "UTC")]
	Utc,
	/// The organization's own time zone.
	#[serde(rename = "ORTZ")]
	Organization,
}

/// Role granted to the API user within an organization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserAclRoleName {
	/// Full account management.
	#[serde(rename = "API Account Manager")]
	AccountManager,
	/// Read-only access to the whole account.
	#[serde(rename = "API Account Read Only")]
	AccountReadOnly,
	/// Read and write access limited to assigned campaigns.
	#[serde(rename = "Limited Access: API Read & Write")]
	LimitedReadWrite,
	/// Read-only access limited to assigned campaigns.
	#[serde(rename = "Limited Access: API Read Only")]
	LimitedReadOnly,
	/// Any role this crate does not model yet.
	#[serde(other)]
	Other,
}

/// One organization the caller has access to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserAcl {
	/// Currency used for budgets and bids.
	pub currency: String,
	/// User-facing organization label.
	pub display_name: String,
	/// Organization identifier; pass it to [`SearchAdsClient::set_org_id`].
	pub org_id: i64,
	/// Organization name.
	pub org_name: String,
	/// Parent organization, for sub-accounts.
	pub parent_org_id: Option<i64>,
	/// Billing arrangement.
	pub payment_model: Option<PaymentModel>,
	/// Roles granted to the caller.
	pub role_names: Vec<UserAclRoleName>,
	/// Reporting time zone.
	pub time_zone: Option<ReportingTimeZone>,
}

/// Identity of the API user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeDetail {
	/// User identifier.
	pub user_id: i64,
	/// Organization the user belongs to.
	pub parent_org_id: i64,
}

/// `acls` and `me` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct AclService<'a> {
	client: &'a SearchAdsClient,
}
impl<'a> AclService<'a> {
	pub(crate) fn new(client: &'a SearchAdsClient) -> Self {
		Self { client }
	}

	/// Lists the organizations and roles available to the caller.
	///
	/// Works without an organization context.
	pub async fn list(&self) -> Result<ApiResponse<Vec<UserAcl>>> {
		self.client.get("acls", &()).await
	}

	/// Returns the caller's user and parent organization identifiers.
	pub async fn me(&self) -> Result<ApiResponse<MeDetail>> {
		self.client.get("me", &()).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn acl_entry_decodes_with_unknown_roles() {
		let acl: UserAcl = serde_json::from_str(
			r#"{
				"currency": "USD",
				"displayName": "Example",
				"orgId": 42,
				"orgName": "Example Org",
				"paymentModel": "LOC",
				"roleNames": ["API Account Manager", "Campaign Auditor"],
				"timeZone": "ORTZ"
			}"#,
		)
		.expect("ACL entry should decode.");

		assert_eq!(acl.org_id, 42);
		assert_eq!(acl.payment_model, Some(PaymentModel::LineOfCredit));
		assert_eq!(acl.role_names, [UserAclRoleName::AccountManager, UserAclRoleName::Other]);
		assert_eq!(acl.time_zone, Some(ReportingTimeZone::Organization));
		assert_eq!(acl.parent_org_id, None);
	}
}
