// In: src/assignment.rs

//! The identifier/version assignment protocol.
//!
//! This module never mints identifiers. The external allocator reserves a
//! contiguous, table-exclusive `[minimum_id, maximum_id]` block sized to the
//! number of inserts, and this module consumes it deterministically. Any
//! mismatch between the range and the batch fails loudly so a wrongly-sized
//! range cannot produce duplicate or missing ids.

use crate::error::{Result, RowSetError};
use crate::types::{IdRange, Row, RowSet};

/// Returns a copy of `batch` with every row stamped with `range.version_number`
/// and every row lacking an id given the next id from the range.
///
/// Rows that already carry an id are updates and must reference an id no
/// greater than `range.maximum_update_id`. The input batch is never touched, so
/// a failure leaves nothing half-assigned.
pub fn assign_identifiers(batch: &RowSet, range: &IdRange) -> Result<RowSet> {
    let insert_count = batch.rows.iter().filter(|row| row.row_id.is_none()).count() as u64;
    let allocated = range.allocated_count();

    if insert_count > 0 {
        if allocated == 0 {
            return Err(RowSetError::IdentifierAllocation(
                "range required at least one id but none were allocated".to_string(),
            ));
        }
        if insert_count > allocated {
            return Err(RowSetError::IdentifierAllocation(format!(
                "range required more ids than were allocated (needed {}, allocated {})",
                insert_count, allocated
            )));
        }
    }

    let first_id = range.minimum_id.unwrap_or_default();
    let mut inserted: i64 = 0;
    let mut rows = Vec::with_capacity(batch.rows.len());
    for row in &batch.rows {
        let row_id = match row.row_id {
            Some(existing) => {
                check_update_target(existing, range)?;
                existing
            }
            None => {
                let assigned = first_id.checked_add(inserted).ok_or_else(|| {
                    RowSetError::IdentifierAllocation(format!(
                        "id range starting at {} cannot hold insert {}",
                        first_id, inserted
                    ))
                })?;
                inserted += 1;
                assigned
            }
        };
        rows.push(Row {
            row_id: Some(row_id),
            version_number: Some(range.version_number),
            values: row.values.clone(),
        });
    }

    if allocated > insert_count {
        log::debug!(
            "range [{:?}, {:?}] left {} ids unused",
            range.minimum_id,
            range.maximum_id,
            allocated - insert_count
        );
    }
    log::debug!(
        "assigned version {} to {} rows ({} inserts, {} updates)",
        range.version_number,
        rows.len(),
        insert_count,
        rows.len() as u64 - insert_count
    );

    Ok(RowSet {
        table_id: batch.table_id.clone(),
        headers: batch.headers.clone(),
        rows,
    })
}

fn check_update_target(row_id: i64, range: &IdRange) -> Result<()> {
    let exists = row_id > 0 && range.maximum_update_id.map_or(false, |max| row_id <= max);
    if !exists {
        log::warn!(
            "rejecting update of row {} (maximum update id {:?})",
            row_id,
            range.maximum_update_id
        );
        return Err(RowSetError::IdentifierAllocation(format!(
            "cannot update row {} because it does not exist",
            row_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(
        min: Option<i64>,
        max: Option<i64>,
        max_update: Option<i64>,
        version: i64,
    ) -> IdRange {
        IdRange {
            minimum_id: min,
            maximum_id: max,
            maximum_update_id: max_update,
            version_number: version,
        }
    }

    fn batch(rows: Vec<Row>) -> RowSet {
        RowSet::new(vec!["1".to_string()], rows).with_table_id("syn42")
    }

    #[test]
    fn test_inserts_receive_consecutive_ids_in_order() {
        let input = batch(vec![
            Row::new([Some("a")]),
            Row::new([Some("b")]),
            Row::new([Some("c")]),
        ]);
        let out = assign_identifiers(&input, &range(Some(100), Some(102), None, 7)).unwrap();
        let ids: Vec<_> = out.rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec![Some(100), Some(101), Some(102)]);
        assert!(out.rows.iter().all(|r| r.version_number == Some(7)));
        assert_eq!(out.rows[1].values, input.rows[1].values);
        assert_eq!(out.table_id.as_deref(), Some("syn42"));
    }

    #[test]
    fn test_mixed_inserts_and_updates() {
        let input = batch(vec![
            Row::new([Some("x")]),
            Row { row_id: Some(3), ..Row::new([Some("y")]) },
            Row::new([Some("z")]),
            Row::deletion(4),
        ]);
        let out = assign_identifiers(&input, &range(Some(10), Some(11), Some(9), 2)).unwrap();
        let ids: Vec<_> = out.rows.iter().map(|r| r.row_id.unwrap()).collect();
        assert_eq!(ids, vec![10, 3, 11, 4]);
        assert!(out.rows.iter().all(|r| r.version_number == Some(2)));
        assert!(out.rows[3].is_deletion());
    }

    #[test]
    fn test_update_only_batch_needs_no_range() {
        let input = batch(vec![Row { row_id: Some(8), ..Row::new([Some("y")]) }]);
        let out = assign_identifiers(&input, &range(None, None, Some(8), 5)).unwrap();
        assert_eq!(out.rows[0].row_id, Some(8));
        assert_eq!(out.rows[0].version_number, Some(5));
    }

    #[test]
    fn test_update_beyond_maximum_update_id_fails() {
        let input = batch(vec![Row { row_id: Some(9), ..Row::new([Some("y")]) }]);
        let err = assign_identifiers(&input, &range(None, None, Some(8), 5)).unwrap_err();
        assert!(err.to_string().contains("cannot update row 9"));

        let err = assign_identifiers(&input, &range(None, None, None, 5)).unwrap_err();
        assert!(matches!(err, RowSetError::IdentifierAllocation(_)));
    }

    #[test]
    fn test_non_positive_update_ids_are_rejected() {
        for bad in [0, -3] {
            let input = batch(vec![Row { row_id: Some(bad), ..Row::new([Some("y")]) }]);
            assert!(assign_identifiers(&input, &range(None, None, Some(100), 1)).is_err());
        }
    }

    #[test]
    fn test_missing_range_fails() {
        let input = batch(vec![Row::new([Some("a")])]);
        let err = assign_identifiers(&input, &range(None, None, None, 1)).unwrap_err();
        assert!(err.to_string().contains("none were allocated"));

        let err = assign_identifiers(&input, &range(Some(5), None, None, 1)).unwrap_err();
        assert!(err.to_string().contains("none were allocated"));
    }

    #[test]
    fn test_undersized_range_fails_without_partial_assignment() {
        let input = batch(vec![
            Row::new([Some("a")]),
            Row::new([Some("b")]),
            Row::new([Some("c")]),
        ]);
        let before = input.clone();
        let err = assign_identifiers(&input, &range(Some(1), Some(2), None, 1)).unwrap_err();
        assert!(err.to_string().contains("more ids than were allocated"));
        assert_eq!(input, before);
    }

    #[test]
    fn test_range_ending_at_largest_id() {
        let input = batch(vec![Row::new([Some("a")])]);
        let out =
            assign_identifiers(&input, &range(Some(i64::MAX), Some(i64::MAX), None, 1)).unwrap();
        assert_eq!(out.rows[0].row_id, Some(i64::MAX));

        let input = batch(vec![Row::new([Some("a")]), Row::new([Some("b")])]);
        let out = assign_identifiers(&input, &range(Some(i64::MAX - 1), Some(i64::MAX), None, 1))
            .unwrap();
        let ids: Vec<_> = out.rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec![Some(i64::MAX - 1), Some(i64::MAX)]);
    }

    #[test]
    fn test_full_id_span_counts_as_allocated() {
        let full = range(Some(i64::MIN), Some(i64::MAX), None, 1);
        assert_eq!(full.allocated_count(), u64::MAX);
        let input = batch(vec![Row::new([Some("a")])]);
        let out = assign_identifiers(&input, &full).unwrap();
        assert_eq!(out.rows[0].row_id, Some(i64::MIN));
    }

    #[test]
    fn test_oversized_range_is_accepted() {
        let input = batch(vec![Row::new([Some("a")])]);
        let out = assign_identifiers(&input, &range(Some(50), Some(60), None, 1)).unwrap();
        assert_eq!(out.rows[0].row_id, Some(50));
    }
}
