//! Wire adapters shared by every resource: dates, e-mail addresses, money, and the
//! response envelope.

// std
use std::sync::LazyLock;
// crates.io
use regex::Regex;
use serde::{Deserializer, Serializer, de::Error as _, ser::Error as _};
use time::{
	Date as CalendarDate, PrimitiveDateTime, Time, UtcOffset,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::format_description,
};
// self
use crate::{_prelude::*, api::PageDetail};

const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const HOUR_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day] [hour]");
const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]");
const DATE_TIME_FORMAT_LENIENT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");

// `None` only if the literal below stops compiling, which rejects every address.
static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(
		r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}-]+@[A-Za-z0-9\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}](?:[A-Za-z0-9.~\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}-]*[A-Za-z0-9\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])?\.[A-Za-z\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}](?:[A-Za-z0-9.~\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}-]*[A-Za-z\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}])?\.?$",
	)
	.ok()
});

/// Report row date with hour precision.
///
/// Reads `YYYY-MM-DD` (daily and coarser granularities) or `YYYY-MM-DD HH` (hourly) and
/// always writes `YYYY-MM-DD HH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub PrimitiveDateTime);
impl Date {
	/// Parses either accepted wire form.
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		let (day, hour) = match raw.split_once(' ') {
			Some((day, hour)) => (day, hour.parse::<u8>().ok()?),
			None => (raw, 0),
		};
		let day = CalendarDate::parse(day, DAY_FORMAT).ok()?;
		let hour = Time::from_hms(hour, 0, 0).ok()?;

		Some(Self(PrimitiveDateTime::new(day, hour)))
	}
}
impl Display for Date {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let formatted = self.0.format(HOUR_FORMAT).map_err(|_| std::fmt::Error)?;

		f.write_str(&formatted)
	}
}
impl Serialize for Date {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = self.0.format(HOUR_FORMAT).map_err(S::Error::custom)?;

		serializer.serialize_str(&formatted)
	}
}
impl<'de> Deserialize<'de> for Date {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid report date `{raw}`")))
	}
}

/// Calendar day used in report requests, written as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReqDate(pub CalendarDate);
impl ReqDate {
	/// Builds a request date from calendar components.
	pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
		let month = time::Month::try_from(month).ok()?;

		CalendarDate::from_calendar_date(year, month, day).ok().map(Self)
	}
}
impl From<CalendarDate> for ReqDate {
	fn from(value: CalendarDate) -> Self {
		Self(value)
	}
}
impl Serialize for ReqDate {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = self.0.format(DAY_FORMAT).map_err(S::Error::custom)?;

		serializer.serialize_str(&formatted)
	}
}
impl<'de> Deserialize<'de> for ReqDate {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Date::parse(&raw)
			.map(|date| Self(date.0.date()))
			.ok_or_else(|| D::Error::custom(format!("invalid request date `{raw}`")))
	}
}

/// Instant exchanged with the API.
///
/// Reads RFC 3339 or the offset-less `YYYY-MM-DDTHH:MM:SS.fff` form (taken as UTC) and
/// writes the latter in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(pub OffsetDateTime);
impl DateTime {
	/// Parses either accepted wire form.
	pub fn parse(raw: &str) -> Option<Self> {
		if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
			return Some(Self(instant));
		}

		PrimitiveDateTime::parse(raw, DATE_TIME_FORMAT_LENIENT)
			.ok()
			.map(|local| Self(local.assume_utc()))
	}
}
impl From<OffsetDateTime> for DateTime {
	fn from(value: OffsetDateTime) -> Self {
		Self(value)
	}
}
impl Serialize for DateTime {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted =
			self.0.to_offset(UtcOffset::UTC).format(DATE_TIME_FORMAT).map_err(S::Error::custom)?;

		serializer.serialize_str(&formatted)
	}
}
impl<'de> Deserialize<'de> for DateTime {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date-time `{raw}`")))
	}
}

/// E-mail address validated whenever it crosses the wire.
///
/// Construction is unchecked; serializing or deserializing an address that fails
/// validation is an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Email(String);
impl Email {
	/// Wraps `value` without validating it.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw address.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns `true` if the address passes validation.
	pub fn is_valid(&self) -> bool {
		is_valid_email(&self.0)
	}
}
impl Display for Email {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl Serialize for Email {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		if !self.is_valid() {
			return Err(S::Error::custom(format!("email `{}` failed validation", self.0)));
		}

		serializer.serialize_str(&self.0)
	}
}
impl<'de> Deserialize<'de> for Email {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		if !is_valid_email(&raw) {
			return Err(D::Error::custom(format!("email `{raw}` failed validation")));
		}

		Ok(Self(raw))
	}
}

/// Monetary amount; the API sends amounts as decimal strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
	/// Decimal amount, e.g. `"1.50"`.
	pub amount: String,
	/// ISO 4217 currency code.
	pub currency: String,
}
impl Money {
	/// Creates an amount in `currency`.
	pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
		Self { amount: amount.into(), currency: currency.into() }
	}
}

/// Machine-readable code attached to an error item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorResponseItemMessageCode {
	/// Caller lacks access to the resource.
	Unauthorized,
	/// A date field did not match the expected format.
	InvalidDateFormat,
	/// Any code this crate does not model yet.
	#[serde(other)]
	Other,
}

/// Single error reported by the API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseItem {
	/// Offending field, when the error is field-specific.
	pub field: Option<String>,
	/// Human-readable description.
	pub message: Option<String>,
	/// Machine-readable code.
	pub message_code: Option<ErrorResponseItemMessageCode>,
}

/// The `error` object of a response envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseBody {
	/// Reported errors.
	#[serde(default)]
	pub errors: Vec<ErrorResponseItem>,
}

/// Envelope wrapping every API response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	/// Payload.
	pub data: Option<T>,
	/// Paging details for list and find endpoints.
	pub pagination: Option<PageDetail>,
	/// Error object; populated on success only when it carries no items.
	pub error: Option<ErrorResponseBody>,
}
impl<T> ApiResponse<T> {
	pub(crate) fn empty() -> Self {
		Self { data: None, pagination: None, error: None }
	}

	/// Consumes the envelope and returns the payload.
	pub fn into_data(self) -> Option<T> {
		self.data
	}
}

fn is_valid_email(value: &str) -> bool {
	EMAIL_PATTERN.as_ref().is_some_and(|pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn report_date_reads_both_granularities() {
		let daily = Date::parse("2024-03-05").expect("Daily date should parse.");
		let hourly: Date =
			serde_json::from_str("\"2024-03-05 17\"").expect("Hourly date should deserialize.");

		assert_eq!(daily.0.hour(), 0);
		assert_eq!(hourly.0.hour(), 17);
		assert_eq!(
			serde_json::to_string(&hourly).expect("Date should serialize."),
			"\"2024-03-05 17\""
		);
		assert!(Date::parse("2024-03-05 25").is_none());
		assert!(Date::parse("05/03/2024").is_none());
	}

	#[test]
	fn request_date_writes_day_only() {
		let day = ReqDate::from_ymd(2024, 1, 31).expect("Calendar date should be valid.");

		assert_eq!(serde_json::to_string(&day).expect("ReqDate should serialize."), "\"2024-01-31\"");
		assert!(ReqDate::from_ymd(2024, 2, 30).is_none());
	}

	#[test]
	fn date_time_accepts_rfc3339_and_api_form() {
		let api: DateTime = serde_json::from_str("\"2021-03-24T07:23:53.303\"")
			.expect("API date-time should deserialize.");
		let rfc: DateTime = serde_json::from_str("\"2021-03-24T09:23:53.303+02:00\"")
			.expect("RFC 3339 date-time should deserialize.");

		assert_eq!(api, rfc);
		assert_eq!(
			serde_json::to_string(&rfc).expect("DateTime should serialize."),
			"\"2021-03-24T07:23:53.303\""
		);

		let whole: DateTime = serde_json::from_str("\"2021-03-24T07:23:53\"")
			.expect("Date-time without fraction should deserialize.");

		assert_eq!(
			serde_json::to_string(&whole).expect("DateTime should serialize."),
			"\"2021-03-24T07:23:53.000\""
		);
	}

	#[test]
	fn email_is_validated_both_ways() {
		assert!(EMAIL_PATTERN.is_some());

		let good = Email::new("billing@example.com");

		assert!(good.is_valid());
		assert_eq!(
			serde_json::to_string(&good).expect("Valid email should serialize."),
			"\"billing@example.com\""
		);
		assert!(serde_json::to_string(&Email::new("not-an-email")).is_err());
		assert!(serde_json::from_str::<Email>("\"a@b\"").is_err());
		assert!(serde_json::from_str::<Email>("\"first.last@mail.example.org\"").is_ok());
	}

	#[test]
	fn unknown_message_codes_are_tolerated() {
		let item: ErrorResponseItem = serde_json::from_str(
			"{\"field\":\"name\",\"message\":\"duplicate\",\"messageCode\":\"DUPLICATE_NAME\"}",
		)
		.expect("Error item should deserialize.");

		assert_eq!(item.message_code, Some(ErrorResponseItemMessageCode::Other));
		assert_eq!(item.field.as_deref(), Some("name"));
	}
}
