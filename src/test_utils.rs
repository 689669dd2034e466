//! Test utilities shared by the unit test modules.

#[cfg(test)]
pub mod test {
    use crate::{Column, Field, LogicalType, Schema, Table, Value};

    /// A schema covering every codec-supported primitive type
    pub fn all_types_schema() -> Schema {
        Schema::new(vec![
            Field::new("flag", LogicalType::Bool, false),
            Field::new("small", LogicalType::Int32, true),
            Field::new("big", LogicalType::Int64, false),
            Field::new("ratio", LogicalType::Float32, true),
            Field::new("score", LogicalType::Float64, true),
            Field::new("label", LogicalType::Utf8, true),
            Field::new("seen_at", LogicalType::TimestampMicros, true),
        ])
    }

    /// A table matching [`all_types_schema`], with nulls sprinkled into
    /// every nullable column
    pub fn all_types_table() -> Table {
        Table::try_new(vec![
            (
                "flag".to_string(),
                Column::from_bools(vec![true, false, true, false]),
            ),
            (
                "small".to_string(),
                Column::from_opt_i32s(vec![Some(1), None, Some(-3), Some(7)]),
            ),
            (
                "big".to_string(),
                Column::from_i64s(vec![10, 20, 30, 40]),
            ),
            (
                "ratio".to_string(),
                Column::from_opt_f32s(vec![Some(0.5), Some(1.5), None, Some(-2.25)]),
            ),
            (
                "score".to_string(),
                Column::from_opt_f64s(vec![None, Some(99.5), Some(12.25), None]),
            ),
            (
                "label".to_string(),
                Column::from_opt_strings(vec![
                    Some("alpha".to_string()),
                    Some("beta".to_string()),
                    None,
                    Some("alpha".to_string()),
                ]),
            ),
            (
                "seen_at".to_string(),
                Column::from_opt_timestamps(vec![
                    Some(1_609_459_200_000_000),
                    None,
                    Some(1_612_137_600_000_000),
                    Some(1_614_556_800_000_000),
                ]),
            ),
        ])
        .unwrap()
    }

    /// Rows laid out for partition tests: ids 1..=4 split across two
    /// groups
    pub fn partitioned_table() -> Table {
        Table::try_new(vec![
            ("id".to_string(), Column::from_i64s(vec![1, 2, 3, 4])),
            (
                "grp".to_string(),
                Column::from_strings(vec!["x", "y", "x", "y"]),
            ),
        ])
        .unwrap()
    }

    /// Assert two tables hold the same rows in the same order, comparing
    /// cell values so null placeholders never matter
    pub fn assert_tables_equal(expected: &Table, actual: &Table) {
        assert_eq!(
            expected.column_names(),
            actual.column_names(),
            "tables carry different columns"
        );
        assert_eq!(
            expected.num_rows(),
            actual.num_rows(),
            "tables carry different row counts"
        );
        for (name, col) in expected.columns() {
            let other = actual.column(name).unwrap();
            for row in 0..col.len() {
                assert_eq!(
                    col.value(row),
                    other.value(row),
                    "column '{}' differs at row {}",
                    name,
                    row
                );
            }
        }
    }

    /// Collect one column's cells as values
    pub fn column_values(table: &Table, name: &str) -> Vec<Value> {
        let col = table.column(name).unwrap();
        (0..col.len()).map(|i| col.value(i)).collect()
    }
}
