//! Single-column stable sorting.

use crate::{
    field::{self, FieldDescriptor},
    value::SortKey,
    Record,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction, for header-click toggling.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The active sort of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a new sort spec.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Sort rows in place.
    ///
    /// The sort is stable. Rows whose value is missing or unreadable as the
    /// field type go after all others when ascending, before them when
    /// descending. A field with no descriptor, or one marked unsortable,
    /// leaves the rows untouched.
    pub fn apply(&self, rows: &mut Vec<&Record>, fields: &[FieldDescriptor]) {
        let descriptor = match field::find(fields, &self.field) {
            Some(d) if d.sortable => d,
            _ => return,
        };

        // Keys are computed once per row; records are never modified.
        let mut keyed: Vec<(Option<SortKey>, &Record)> = rows
            .iter()
            .map(|r| {
                let value = r.get(&self.field);
                (SortKey::of(value.as_deref(), descriptor.field_type), *r)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = match (a, b) {
                (Some(a), Some(b)) => a.compare(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        rows.clear();
        rows.extend(keyed.into_iter().map(|(_, r)| r));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| Record::from_value(v).unwrap())
            .collect()
    }

    fn ids(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.id.to_string()).collect()
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::string("name", "Name"),
            FieldDescriptor::number("qty", "Qty"),
            FieldDescriptor::date("created", "Created"),
            FieldDescriptor::boolean("active", "Active"),
            FieldDescriptor::string("code", "Code").not_sortable(),
        ]
    }

    #[test]
    fn strings_sort_case_insensitively() {
        let data = records(vec![
            json!({"id": 1, "name": "Zeta"}),
            json!({"id": 2, "name": "alpha"}),
            json!({"id": 3, "name": "Beta"}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();

        SortSpec::new("name", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["2", "3", "1"]);

        SortSpec::new("name", SortDirection::Desc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["1", "3", "2"]);

        // Stored values keep their case
        assert_eq!(data[1].field("name"), Some(&json!("alpha")));
    }

    #[test]
    fn numbers_sort_numerically() {
        let data = records(vec![
            json!({"id": 1, "qty": 10}),
            json!({"id": 2, "qty": 9}),
            json!({"id": 3, "qty": "100"}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();
        SortSpec::new("qty", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["2", "1", "3"]);
    }

    #[test]
    fn non_finite_numbers_sort_as_unreadable() {
        let data = records(
            (0..60)
                .map(|i| {
                    let qty = match i % 7 {
                        0 => json!("NaN"),
                        3 => json!("inf"),
                        _ => json!(60 - i),
                    };
                    json!({"id": i, "qty": qty})
                })
                .collect(),
        );
        let mut rows: Vec<&Record> = data.iter().collect();
        SortSpec::new("qty", SortDirection::Asc).apply(&mut rows, &fields());

        let numbers: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.field("qty").and_then(Value::as_f64))
            .collect();
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]));

        // Readable numbers first, then the non-finite cells in prior order
        let readable = numbers.len();
        assert!(rows[..readable]
            .iter()
            .all(|r| r.field("qty").is_some_and(Value::is_number)));
        assert!(rows[readable..]
            .iter()
            .all(|r| r.field("qty").is_some_and(Value::is_string)));
    }

    #[test]
    fn dates_sort_chronologically() {
        let data = records(vec![
            json!({"id": 1, "created": "2024-02-01"}),
            json!({"id": 2, "created": "2023-12-31T23:59:59Z"}),
            json!({"id": 3, "created": "2024-01-15"}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();
        SortSpec::new("created", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["2", "3", "1"]);
    }

    #[test]
    fn booleans_sort_false_first() {
        let data = records(vec![
            json!({"id": 1, "active": true}),
            json!({"id": 2, "active": false}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();
        SortSpec::new("active", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["2", "1"]);
    }

    #[test]
    fn equal_keys_keep_prior_order() {
        let data = records(vec![
            json!({"id": 1, "name": "b"}),
            json!({"id": 2, "name": "A"}),
            json!({"id": 3, "name": "B"}),
            json!({"id": 4, "name": "a"}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();

        SortSpec::new("name", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["2", "4", "1", "3"]);

        SortSpec::new("name", SortDirection::Desc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["1", "3", "2", "4"]);
    }

    #[test]
    fn missing_values_go_last_ascending() {
        let data = records(vec![
            json!({"id": 1}),
            json!({"id": 2, "qty": 5}),
            json!({"id": 3, "qty": null}),
            json!({"id": 4, "qty": 1}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();

        SortSpec::new("qty", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["4", "2", "1", "3"]);

        SortSpec::new("qty", SortDirection::Desc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["1", "3", "2", "4"]);
    }

    #[test]
    fn unknown_or_unsortable_field_keeps_order() {
        let data = records(vec![
            json!({"id": 1, "code": "Z", "color": "red"}),
            json!({"id": 2, "code": "A", "color": "blue"}),
        ]);
        let mut rows: Vec<&Record> = data.iter().collect();

        SortSpec::new("color", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["1", "2"]);

        SortSpec::new("code", SortDirection::Asc).apply(&mut rows, &fields());
        assert_eq!(ids(&rows), ["1", "2"]);
    }

    #[test]
    fn direction_toggle_and_serde() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        let spec: SortSpec =
            serde_json::from_value(json!({"field": "name", "direction": "desc"})).unwrap();
        assert_eq!(spec, SortSpec::new("name", SortDirection::Desc));
    }
}
