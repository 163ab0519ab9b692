//! Selector payloads for `find` endpoints and the paging metadata returned by list calls.

// self
use crate::_prelude::*;

/// Predicate operators understood by `find` endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
	/// Value lies between two bounds.
	Between,
	/// Field contains the value.
	Contains,
	/// Field contains every value.
	ContainsAll,
	/// Field contains any of the values.
	ContainsAny,
	/// Field ends with the value.
	#[serde(rename = "ENDSWITH")]
	EndsWith,
	/// Field equals the value.
	Equals,
	/// Field is greater than the value.
	GreaterThan,
	/// Field is less than the value.
	LessThan,
	/// Field starts with the value.
	#[serde(rename = "STARTSWITH")]
	StartsWith,
	/// Field is one of the values.
	In,
	/// Field matches a pattern.
	Like,
	/// Field differs from the value.
	NotEquals,
	/// Field is (or is not) null.
	Is,
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
	/// Smallest first.
	Ascending,
	/// Largest first.
	Descending,
}

/// One filter clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
	/// Field name, e.g. `status`.
	pub field: String,
	/// Comparison to apply.
	pub operator: ConditionOperator,
	/// Operands, always sent as strings.
	pub values: Vec<String>,
}

/// One ordering clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
	/// Field to order by.
	pub field: String,
	/// Direction.
	pub sort_order: SortOrder,
}

/// Window requested by a selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	/// Maximum number of records to return.
	pub limit: u32,
	/// Zero-based index of the first record.
	pub offset: u32,
}

/// Body of every `find` request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
	/// Filter clauses combined with AND.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub conditions: Vec<Condition>,
	/// Restricts the returned fields.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub fields: Vec<String>,
	/// Ordering clauses.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub order_by: Vec<Sorting>,
	/// Result window.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pagination: Option<Pagination>,
}
impl Selector {
	/// Creates an empty selector matching everything.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a filter clause.
	pub fn condition<I, V>(
		mut self,
		field: impl Into<String>,
		operator: ConditionOperator,
		values: I,
	) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<String>,
	{
		self.conditions.push(Condition {
			field: field.into(),
			operator,
			values: values.into_iter().map(Into::into).collect(),
		});

		self
	}

	/// Restricts the response to `fields`.
	pub fn fields<I, V>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<String>,
	{
		self.fields.extend(fields.into_iter().map(Into::into));

		self
	}

	/// Adds an ordering clause.
	pub fn order_by(mut self, field: impl Into<String>, sort_order: SortOrder) -> Self {
		self.order_by.push(Sorting { field: field.into(), sort_order });

		self
	}

	/// Sets the result window.
	pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
		self.pagination = Some(Pagination { limit, offset });

		self
	}

	/// Returns a copy positioned at the page after `page`, or `None` on the last page.
	pub fn next_page(&self, page: &PageDetail) -> Option<Self> {
		let offset = page.next_offset()?;
		let limit = self
			.pagination
			.map(|pagination| pagination.limit)
			.filter(|limit| *limit > 0)
			.unwrap_or(page.items_per_page);

		Some(self.clone().paginate(limit, offset))
	}
}

/// Paging details echoed by list and find endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageDetail {
	/// Number of records matching the request.
	pub total_results: u32,
	/// Zero-based index of the first returned record.
	pub start_index: u32,
	/// Number of records in this page.
	pub items_per_page: u32,
}
impl PageDetail {
	/// Offset of the following page, or `None` once every record has been returned.
	pub fn next_offset(&self) -> Option<u32> {
		if self.items_per_page == 0 {
			return None;
		}

		let next = self.start_index.checked_add(self.items_per_page)?;

		(next < self.total_results).then_some(next)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn selector_serializes_only_populated_parts() {
		let selector = Selector::new()
			.condition("status", ConditionOperator::Equals, ["ENABLED"])
			.order_by("id", SortOrder::Descending)
			.paginate(20, 40);
		let json = serde_json::to_value(&selector).expect("Selector should serialize.");

		assert_eq!(
			json,
			serde_json::json!({
				"conditions": [{ "field": "status", "operator": "EQUALS", "values": ["ENABLED"] }],
				"orderBy": [{ "field": "id", "sortOrder": "DESCENDING" }],
				"pagination": { "limit": 20, "offset": 40 }
			})
		);
		assert_eq!(
			serde_json::to_value(Selector::new()).expect("Empty selector should serialize."),
			serde_json::json!({})
		);
	}

	#[test]
	fn operator_labels_match_the_wire() {
		let labels = [
			ConditionOperator::StartsWith,
			ConditionOperator::ContainsAny,
			ConditionOperator::NotEquals,
		]
		.iter()
		.map(|op| serde_json::to_string(op).expect("Operator should serialize."))
		.collect::<Vec<_>>();

		assert_eq!(labels, ["\"STARTSWITH\"", "\"CONTAINS_ANY\"", "\"NOT_EQUALS\""]);
	}

	#[test]
	fn next_offset_stops_on_last_page() {
		let first = PageDetail { total_results: 45, start_index: 0, items_per_page: 20 };
		let last = PageDetail { total_results: 45, start_index: 40, items_per_page: 5 };

		assert_eq!(first.next_offset(), Some(20));
		assert_eq!(last.next_offset(), None);
		assert_eq!(PageDetail::default().next_offset(), None);
	}

	#[test]
	fn next_page_keeps_filters_and_limit() {
		let selector = Selector::new()
			.condition("name", ConditionOperator::Contains, ["brand"])
			.paginate(20, 0);
		let page = PageDetail { total_results: 45, start_index: 0, items_per_page: 20 };
		let next = selector.next_page(&page).expect("A second page should exist.");

		assert_eq!(next.conditions, selector.conditions);
		assert_eq!(next.pagination, Some(Pagination { limit: 20, offset: 20 }));
	}
}
