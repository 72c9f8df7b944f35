//! Free-text search and structured filter criteria.
//!
//! The two are deliberately separate. A search term matches a record when
//! **any** searchable field contains it. A criteria chain is evaluated
//! strictly left to right, each criterion joined to the running result by the
//! previous criterion's `join_with_next`; `and` does not bind tighter than
//! `or`. With three rows `a or b and c` evaluates as `(a or b) and c`.

use crate::{
    field::{self, FieldDescriptor},
    value, FieldType, Record,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison applied by a [`FilterCriterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    IsEmpty,
    IsNotEmpty,
    /// Inclusive range; the value is a `[low, high]` array
    Between,
}

impl FilterOperator {
    /// Whether the operator needs a comparison value.
    pub fn takes_value(self) -> bool {
        !matches!(self, FilterOperator::IsEmpty | FilterOperator::IsNotEmpty)
    }
}

/// Boolean joiner between a criterion and the next one in the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Joiner {
    #[default]
    And,
    Or,
}

/// One row of a structured filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    /// Field to test
    pub field: String,
    /// Comparison to apply
    pub operator: FilterOperator,
    /// Comparison value, ignored by `isEmpty`/`isNotEmpty`
    #[serde(default)]
    pub value: Value,
    /// How this criterion combines with the next one
    #[serde(default)]
    pub join_with_next: Joiner,
}

impl FilterCriterion {
    /// Create a criterion joined to the next one with `and`.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            join_with_next: Joiner::And,
        }
    }

    /// Builder-style method to set the joiner.
    pub fn join(mut self, joiner: Joiner) -> Self {
        self.join_with_next = joiner;
        self
    }

    /// Builder-style shorthand for `join(Joiner::Or)`.
    pub fn or(self) -> Self {
        self.join(Joiner::Or)
    }

    /// Whether the criterion has everything its operator needs.
    pub fn is_well_formed(&self) -> bool {
        if self.field.trim().is_empty() {
            return false;
        }
        match self.operator {
            FilterOperator::IsEmpty | FilterOperator::IsNotEmpty => true,
            FilterOperator::Between => {
                matches!(&self.value, Value::Array(bounds) if bounds.len() == 2)
            }
            _ => !self.value.is_null(),
        }
    }

    /// Test a record.
    ///
    /// Malformed criteria and fields without a descriptor never match.
    pub fn matches(&self, record: &Record, fields: &[FieldDescriptor]) -> bool {
        if !self.is_well_formed() {
            return false;
        }
        let descriptor = match field::find(fields, &self.field) {
            Some(d) => d,
            None => return false,
        };

        let actual = record.get(&self.field);
        let actual = actual.as_deref();
        let ty = descriptor.field_type;

        match self.operator {
            FilterOperator::IsEmpty => value::is_empty(actual),
            FilterOperator::IsNotEmpty => !value::is_empty(actual),
            FilterOperator::Equals => {
                value::equals(actual, Some(&self.value), ty).unwrap_or(false)
            }
            FilterOperator::NotEquals => {
                if value::is_empty(actual) {
                    return true;
                }
                value::equals(actual, Some(&self.value), ty).is_some_and(|eq| !eq)
            }
            FilterOperator::Contains => text_test(actual, &self.value, |a, b| a.contains(b)),
            FilterOperator::NotContains => !text_test(actual, &self.value, |a, b| a.contains(b)),
            FilterOperator::StartsWith => {
                text_test(actual, &self.value, |a, b| a.starts_with(b))
            }
            FilterOperator::EndsWith => text_test(actual, &self.value, |a, b| a.ends_with(b)),
            FilterOperator::GreaterThan => {
                ordering_test(actual, &self.value, ty, |o| o == Ordering::Greater)
            }
            FilterOperator::GreaterThanOrEquals => {
                ordering_test(actual, &self.value, ty, |o| o != Ordering::Less)
            }
            FilterOperator::LessThan => {
                ordering_test(actual, &self.value, ty, |o| o == Ordering::Less)
            }
            FilterOperator::LessThanOrEquals => {
                ordering_test(actual, &self.value, ty, |o| o != Ordering::Greater)
            }
            FilterOperator::Between => match &self.value {
                Value::Array(bounds) if bounds.len() == 2 => {
                    ordering_test(actual, &bounds[0], ty, |o| o != Ordering::Less)
                        && ordering_test(actual, &bounds[1], ty, |o| o != Ordering::Greater)
                }
                _ => false,
            },
        }
    }
}

/// Case-insensitive text predicate. Missing values never match.
fn text_test(actual: Option<&Value>, expected: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    if value::is_empty(actual) && !matches!(actual, Some(Value::String(_))) {
        return false;
    }
    let haystack = value::display(actual).to_lowercase();
    let needle = value::display(Some(expected)).to_lowercase();
    test(&haystack, &needle)
}

/// Typed ordering predicate. Values that cannot be compared never match.
fn ordering_test(
    actual: Option<&Value>,
    expected: &Value,
    field_type: FieldType,
    test: impl Fn(Ordering) -> bool,
) -> bool {
    value::compare(actual, Some(expected), field_type).is_some_and(test)
}

/// Evaluate a criteria chain left to right.
///
/// An empty chain matches every record.
pub fn matches_all(criteria: &[FilterCriterion], record: &Record, fields: &[FieldDescriptor]) -> bool {
    let mut iter = criteria.iter();
    let first = match iter.next() {
        Some(c) => c,
        None => return true,
    };

    let mut result = first.matches(record, fields);
    let mut joiner = first.join_with_next;
    for criterion in iter {
        let matched = criterion.matches(record, fields);
        result = match joiner {
            Joiner::And => result && matched,
            Joiner::Or => result || matched,
        };
        joiner = criterion.join_with_next;
    }
    result
}

/// An active free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    /// The term as entered
    pub term: String,
    /// Names of the fields the term is matched against
    pub fields: Vec<String>,
}

impl Search {
    /// Build a search over the `filterable` fields among `fields`.
    pub fn new(term: impl Into<String>, fields: &[FieldDescriptor]) -> Self {
        Self {
            term: term.into(),
            fields: fields
                .iter()
                .filter(|f| f.filterable)
                .map(|f| f.name.clone())
                .collect(),
        }
    }

    /// Whether the search is inactive: a blank term matches everything.
    pub fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }

    /// Test a record: any searched field containing the term matches.
    pub fn matches(&self, record: &Record) -> bool {
        if self.is_blank() {
            return true;
        }
        let needle = self.term.trim().to_lowercase();
        self.fields.iter().any(|name| {
            let actual = record.get(name);
            value::display(actual.as_deref())
                .to_lowercase()
                .contains(&needle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fields;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::string("name", "Name"),
            FieldDescriptor::string("city", "City"),
            FieldDescriptor::number("amount", "Amount"),
            FieldDescriptor::date("due", "Due Date"),
            FieldDescriptor::boolean("active", "Active"),
            FieldDescriptor::string("notes", "Notes").not_filterable(),
        ]
    }

    fn acme() -> Record {
        record(json!({
            "id": 1,
            "name": "Acme Corp",
            "city": "Dallas",
            "amount": 250,
            "due": "2024-06-30",
            "active": true,
            "notes": "net 30"
        }))
    }

    fn check(operator: FilterOperator, field: &str, value: Value) -> bool {
        FilterCriterion::new(field, operator, value).matches(&acme(), &fields())
    }

    #[test]
    fn search_matches_any_field() {
        let search = Search::new("dallas", &fields());
        assert!(search.matches(&acme()));

        let search = Search::new("ACME", &fields());
        assert!(search.matches(&acme()));

        let search = Search::new("houston", &fields());
        assert!(!search.matches(&acme()));
    }

    #[test]
    fn search_skips_unfilterable_fields() {
        let search = Search::new("net 30", &fields());
        assert!(!search.fields.contains(&"notes".to_string()));
        assert!(!search.matches(&acme()));
    }

    #[test]
    fn blank_search_matches_everything() {
        assert!(Search::new("", &fields()).matches(&acme()));
        assert!(Search::new("   ", &fields()).matches(&acme()));
        assert!(Search::default().matches(&acme()));
    }

    #[test]
    fn search_matches_numbers_as_text() {
        assert!(Search::new("25", &fields()).matches(&acme()));
    }

    #[test]
    fn text_operators() {
        assert!(check(FilterOperator::Contains, "name", json!("corp")));
        assert!(!check(FilterOperator::NotContains, "name", json!("corp")));
        assert!(check(FilterOperator::NotContains, "name", json!("globex")));
        assert!(check(FilterOperator::StartsWith, "name", json!("acme")));
        assert!(check(FilterOperator::EndsWith, "city", json!("LAS")));
        assert!(!check(FilterOperator::StartsWith, "city", json!("las")));
    }

    #[test]
    fn equality_operators() {
        assert!(check(FilterOperator::Equals, "city", json!("Dallas")));
        assert!(!check(FilterOperator::Equals, "city", json!("dallas")));
        assert!(check(FilterOperator::Equals, "amount", json!("250")));
        assert!(check(FilterOperator::Equals, "active", json!(true)));
        assert!(check(FilterOperator::NotEquals, "active", json!(false)));
        assert!(check(FilterOperator::Equals, "due", json!("2024-06-30")));
    }

    #[test]
    fn ordering_operators() {
        assert!(check(FilterOperator::GreaterThan, "amount", json!(100)));
        assert!(!check(FilterOperator::GreaterThan, "amount", json!(250)));
        assert!(check(FilterOperator::GreaterThanOrEquals, "amount", json!(250)));
        assert!(check(FilterOperator::LessThan, "due", json!("2024-07-01")));
        assert!(check(FilterOperator::LessThanOrEquals, "due", json!("2024-06-30")));
        assert!(!check(FilterOperator::LessThan, "amount", json!("lots")));
    }

    #[test]
    fn between_is_inclusive() {
        assert!(check(FilterOperator::Between, "amount", json!([250, 300])));
        assert!(check(FilterOperator::Between, "amount", json!([100, 250])));
        assert!(!check(FilterOperator::Between, "amount", json!([251, 300])));
        assert!(check(
            FilterOperator::Between,
            "due",
            json!(["2024-06-01", "2024-06-30"])
        ));
    }

    #[test]
    fn non_finite_text_fails_ordering_operators() {
        let rows = [
            record(json!({"id": 1, "amount": "NaN"})),
            record(json!({"id": 2, "amount": "inf"})),
            record(json!({"id": 3, "amount": 5})),
        ];
        let between = FilterCriterion::new("amount", FilterOperator::Between, json!([1, 10]));
        let matched: Vec<String> = rows
            .iter()
            .filter(|r| between.matches(r, &fields()))
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(matched, ["3"]);

        for operator in [
            FilterOperator::GreaterThanOrEquals,
            FilterOperator::LessThanOrEquals,
            FilterOperator::Equals,
        ] {
            let criterion = FilterCriterion::new("amount", operator, json!(5));
            assert!(!criterion.matches(&rows[0], &fields()));
        }
    }

    #[test]
    fn empty_operators() {
        assert!(!check(FilterOperator::IsEmpty, "name", Value::Null));
        assert!(check(FilterOperator::IsNotEmpty, "name", Value::Null));

        let blank = record(json!({"id": 2, "name": "  ", "city": null}));
        let is_empty = |field: &str| {
            FilterCriterion::new(field, FilterOperator::IsEmpty, Value::Null)
                .matches(&blank, &fields())
        };
        assert!(is_empty("name"));
        assert!(is_empty("city"));
        assert!(is_empty("amount"));
    }

    #[test]
    fn unknown_field_never_matches() {
        assert!(!check(FilterOperator::Equals, "country", json!("US")));
        assert!(!check(FilterOperator::IsEmpty, "country", Value::Null));
        assert!(!check(FilterOperator::NotEquals, "country", json!("US")));
    }

    #[test]
    fn malformed_criteria_never_match() {
        assert!(!check(FilterOperator::Equals, "name", Value::Null));
        assert!(!check(FilterOperator::NotEquals, "name", Value::Null));
        assert!(!check(FilterOperator::Between, "amount", json!([1])));
        assert!(!check(FilterOperator::Between, "amount", json!(5)));
        assert!(!check(FilterOperator::Contains, "", json!("x")));
    }

    #[test]
    fn empty_chain_matches() {
        assert!(matches_all(&[], &acme(), &fields()));
    }

    #[test]
    fn chain_evaluates_left_to_right() {
        let a_true = FilterCriterion::new("city", FilterOperator::Equals, json!("Dallas"));
        let b_true = FilterCriterion::new("active", FilterOperator::Equals, json!(true));
        let c_false = FilterCriterion::new("amount", FilterOperator::GreaterThan, json!(1000));

        // true or true and false => (true or true) and false => false.
        // With precedence it would be true or (true and false) => true.
        let chain = vec![a_true.clone().or(), b_true.clone(), c_false.clone()];
        assert!(!matches_all(&chain, &acme(), &fields()));

        // false and true or true => (false and true) or true => true
        let chain = vec![c_false, b_true.or(), a_true];
        assert!(matches_all(&chain, &acme(), &fields()));
    }

    #[test]
    fn last_joiner_is_ignored() {
        let only = FilterCriterion::new("city", FilterOperator::Equals, json!("Austin")).or();
        assert!(!matches_all(&[only], &acme(), &fields()));
    }

    #[test]
    fn criterion_deserializes_with_defaults() {
        let criterion: FilterCriterion = serde_json::from_value(json!({
            "field": "active",
            "operator": "isNotEmpty"
        }))
        .unwrap();
        assert_eq!(criterion.value, Value::Null);
        assert_eq!(criterion.join_with_next, Joiner::And);

        let criterion: FilterCriterion = serde_json::from_value(json!({
            "field": "amount",
            "operator": "greaterThanOrEquals",
            "value": 10,
            "joinWithNext": "or"
        }))
        .unwrap();
        assert_eq!(criterion.operator, FilterOperator::GreaterThanOrEquals);
        assert_eq!(criterion.join_with_next, Joiner::Or);
    }

    #[test]
    fn id_is_searchable_when_described() {
        let mut fields: Vec<FieldDescriptor> = fields();
        fields.push(FieldDescriptor::number("id", "ID"));
        let record = Record::new(77, Fields::new());
        assert!(Search::new("77", &fields).matches(&record));
    }
}
