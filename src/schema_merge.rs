// In: src/schema_merge.rs

//! Schema merge/projection: re-expresses rows written under historical column
//! sets in terms of one target schema.

use crate::error::Result;
use crate::types::{ColumnDefinition, Row, RowSet};
use crate::validation::structure::check_row_width;
use crate::validation::{column_index_map, validate_value};

/// Where a target column's value comes from for one historical batch.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Position in the historical batch's headers.
    Header(usize),
    /// The column did not exist when the batch was written.
    Default,
}

/// Merges `historical` batches, each paired with the schema it was written
/// under, into one batch whose headers are the `target` column ids.
///
/// Shared columns keep their value, revalidated against the target column.
/// Target-only columns take the target default (or null). Columns the target
/// no longer has are dropped. Row ids, versions and deletion markers are kept,
/// and batch order then row order is preserved.
pub fn merge_across_schemas(
    historical: &[(Vec<ColumnDefinition>, RowSet)],
    target: &[ColumnDefinition],
    table_id: Option<&str>,
) -> Result<RowSet> {
    let total_rows = historical.iter().map(|(_, batch)| batch.rows.len()).sum();
    let mut rows = Vec::with_capacity(total_rows);

    for (schema, batch) in historical {
        let sources = plan_sources(schema, batch, target)?;
        for (row_index, row) in batch.rows.iter().enumerate() {
            check_row_width(row, row_index, batch.headers.len())?;
            rows.push(project_row(row, row_index, &sources, target)?);
        }
    }

    log::debug!(
        "merged {} rows from {} historical batches into {} target columns",
        rows.len(),
        historical.len(),
        target.len()
    );
    Ok(RowSet {
        table_id: table_id.map(str::to_string),
        headers: target.iter().map(|c| c.id.clone()).collect(),
        rows,
    })
}

/// A column only counts as present if the batch's own schema declares it and
/// the batch carries it in its headers.
fn plan_sources(
    schema: &[ColumnDefinition],
    batch: &RowSet,
    target: &[ColumnDefinition],
) -> Result<Vec<Source>> {
    let header_index = column_index_map(&batch.headers)?;
    Ok(target
        .iter()
        .map(|column| {
            let declared = schema.iter().any(|c| c.id == column.id);
            match header_index.get(column.id.as_str()) {
                Some(&position) if declared => Source::Header(position),
                _ => Source::Default,
            }
        })
        .collect())
}

fn project_row(
    row: &Row,
    row_index: usize,
    sources: &[Source],
    target: &[ColumnDefinition],
) -> Result<Row> {
    let values = match &row.values {
        Some(values) if !values.is_empty() => Some(
            sources
                .iter()
                .zip(target)
                .enumerate()
                .map(|(column_index, (source, column))| {
                    let raw = match source {
                        Source::Header(position) => values[*position].as_deref(),
                        Source::Default => None,
                    };
                    validate_value(raw, column, row_index, column_index)
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        _ => None,
    };
    Ok(Row {
        row_id: row.row_id,
        version_number: row.version_number,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowSetError;
    use crate::types::ColumnType;

    fn a() -> ColumnDefinition {
        ColumnDefinition::new("A", "a", ColumnType::String)
    }
    fn b() -> ColumnDefinition {
        ColumnDefinition::new("B", "b", ColumnType::Integer)
    }
    fn c() -> ColumnDefinition {
        ColumnDefinition::new("C", "c", ColumnType::Boolean).with_default("false")
    }

    #[test]
    fn test_projection_into_reordered_target_with_defaults() {
        let old = RowSet::for_schema(
            &[a(), b()],
            vec![
                Row::new([Some("x"), Some("1")]).with_id(1, 3),
                Row::new([Some("y"), None]).with_id(2, 3),
            ],
        );
        let merged = merge_across_schemas(&[(vec![a(), b()], old)], &[b(), c(), a()], Some("syn9"))
            .unwrap();

        assert_eq!(merged.headers, vec!["B", "C", "A"]);
        assert_eq!(merged.table_id.as_deref(), Some("syn9"));
        assert_eq!(
            merged.rows[0],
            Row::new([Some("1"), Some("false"), Some("x")]).with_id(1, 3)
        );
        assert_eq!(
            merged.rows[1],
            Row::new([None, Some("false"), Some("y")]).with_id(2, 3)
        );
    }

    #[test]
    fn test_dropped_columns_and_batch_order() {
        let first = RowSet::for_schema(
            &[a(), b()],
            vec![Row::new([Some("x"), Some("1")]).with_id(1, 1)],
        );
        let second = RowSet::new(
            vec!["C".into(), "B".into()],
            vec![
                Row::new([Some("TRUE"), Some("2")]).with_id(2, 2),
                Row::deletion(1).with_id(1, 2),
            ],
        );
        let merged = merge_across_schemas(
            &[(vec![a(), b()], first), (vec![b(), c()], second)],
            &[b(), c()],
            None,
        )
        .unwrap();
        let ids: Vec<_> = merged
            .rows
            .iter()
            .map(|r| (r.row_id, r.version_number))
            .collect();
        assert_eq!(
            ids,
            vec![(Some(1), Some(1)), (Some(2), Some(2)), (Some(1), Some(2))]
        );
        assert_eq!(
            merged.rows[0].values,
            Some(vec![Some("1".into()), Some("false".into())])
        );
        assert_eq!(
            merged.rows[1].values,
            Some(vec![Some("2".into()), Some("true".into())])
        );
        assert!(merged.rows[2].is_deletion());
    }

    #[test]
    fn test_incompatible_historical_value_fails() {
        let old_b = ColumnDefinition::new("B", "b", ColumnType::String);
        let old = RowSet::for_schema(
            &[old_b.clone()],
            vec![Row::new([Some("not a number")]).with_id(1, 1)],
        );
        let err = merge_across_schemas(&[(vec![old_b], old)], &[b()], None).unwrap_err();
        assert!(matches!(
            err,
            RowSetError::ValueValidation {
                column_type: ColumnType::Integer,
                ..
            }
        ));
    }

    #[test]
    fn test_short_historical_row_fails() {
        let b_with_default =
            ColumnDefinition::new("B", "b", ColumnType::Integer).with_default("7");
        let schema = vec![a(), b_with_default];
        let old = RowSet::new(
            vec!["A".into(), "B".into()],
            vec![Row::new([Some("x")]).with_id(1, 1)],
        );
        let err = merge_across_schemas(&[(schema.clone(), old)], &schema, None).unwrap_err();
        assert!(matches!(err, RowSetError::Structural(_)));
    }

    #[test]
    fn test_empty_history_yields_empty_batch() {
        let merged = merge_across_schemas(&[], &[a()], None).unwrap();
        assert!(merged.rows.is_empty());
        assert_eq!(merged.headers, vec!["A"]);
    }
}
