//! Due expansion - turns one due definition into per-student payment records.
//!
//! Creating a due runs in three stages:
//!
//! 1. [`validate_due_request`] parses the free-form level amounts. Nothing is written
//!    unless the title is non-blank and at least one level has a positive amount.
//! 2. The due and its amounts are inserted together.
//! 3. [`plan_expansion`] produces one payment per enrolled student at each priced level,
//!    or a single `"N/A"` placeholder for a priced level with nobody enrolled. The
//!    planned payments are then written one at a time, in order.
//!
//! Stage 3 is not atomic. A failed write leaves the earlier records in place and
//! surfaces [`Error::PartialExpansion`]. Each planned payment carries an idempotency
//! key, and [`resume_expansion`] re-plans the due and writes only the keys that are
//! still missing, so it is safe to re-run after a failure.

use crate::{
    core::{
        amount::{format_amount, parse_amount_input},
        calendar::DisplayStamp,
        due::{self, DueRecord},
        payment::{self, DUE_CREATED_PAYMENT_TYPE, NewPayment, PLACEHOLDER_STUDENT_ID, PaymentStatus},
    },
    entities::{payment as payment_entity, student},
    errors::{Error, Result},
    store::Store,
};
use chrono::Local;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// A due as submitted by an admin: amounts are the raw text typed per level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueRequest {
    /// Due title
    pub title: String,
    /// Whether the due recurs every academic year
    pub is_recurring: bool,
    /// Raw amount text per level; blank entries are allowed
    pub level_amounts: BTreeMap<String, String>,
}

/// A due request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDue {
    /// Trimmed title
    pub title: String,
    /// Whether the due recurs every academic year
    pub is_recurring: bool,
    /// Levels with a positive amount
    pub level_amounts: BTreeMap<String, f64>,
}

/// Result of writing an expansion.
#[derive(Debug, Clone)]
pub struct ExpansionOutcome {
    /// The due that was expanded
    pub due: DueRecord,
    /// Payment records written by this run
    pub created: Vec<payment_entity::Model>,
    /// Planned records skipped because an earlier run already wrote them
    pub skipped: usize,
}

/// Validates a due request without touching the store.
///
/// Levels whose amount is blank, unparseable or not positive are dropped.
///
/// # Errors
/// - [`Error::EmptyDueTitle`] if the title is blank
/// - [`Error::NoValidAmount`] if no level survives parsing
pub fn validate_due_request(request: &DueRequest) -> Result<ValidatedDue> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(Error::EmptyDueTitle);
    }

    let level_amounts: BTreeMap<String, f64> = request
        .level_amounts
        .iter()
        .filter_map(|(level, raw)| parse_amount_input(raw).map(|amount| (level.clone(), amount)))
        .collect();

    if level_amounts.is_empty() {
        return Err(Error::NoValidAmount);
    }

    Ok(ValidatedDue {
        title: title.to_string(),
        is_recurring: request.is_recurring,
        level_amounts,
    })
}

/// Groups a roster by level, keeping roster order within each level.
#[must_use]
pub fn group_by_level(roster: &[student::Model]) -> BTreeMap<&str, Vec<&student::Model>> {
    let mut groups: BTreeMap<&str, Vec<&student::Model>> = BTreeMap::new();
    for student in roster {
        groups.entry(student.level.as_str()).or_default().push(student);
    }
    groups
}

/// Idempotency key for the payment of one student under one due.
///
/// Uses the student's store ID, which stays stable when the registration number is edited.
#[must_use]
pub fn student_payment_key(due_id: i64, student_ref: i64) -> String {
    format!("{due_id}:student:{student_ref}")
}

/// Idempotency key for the placeholder payment of an empty level under one due.
#[must_use]
pub fn placeholder_payment_key(due_id: i64, level: &str) -> String {
    format!("{due_id}:level:{level}")
}

/// Plans the payment records for a due against a roster.
///
/// Produces `max(1, students at level)` records per priced level: one per student, or one
/// placeholder carrying [`PLACEHOLDER_STUDENT_ID`] and no payee fields.
#[must_use]
pub fn plan_expansion(
    due_id: i64,
    title: &str,
    level_amounts: &BTreeMap<String, f64>,
    roster: &[student::Model],
    stamp: &DisplayStamp,
) -> Vec<NewPayment> {
    let groups = group_by_level(roster);
    let mut planned = Vec::new();

    for (level, amount) in level_amounts {
        let base = NewPayment {
            session: stamp.session.clone(),
            student_id: PLACEHOLDER_STUDENT_ID.to_string(),
            amount: format_amount(*amount),
            due_type: title.to_string(),
            level: level.clone(),
            date: stamp.date.clone(),
            time: stamp.time.clone(),
            status: PaymentStatus::Pending.as_str().to_string(),
            transaction_no: None,
            payment_type: Some(DUE_CREATED_PAYMENT_TYPE.to_string()),
            payee_name: None,
            reg_no: None,
            due_id: Some(due_id),
            idempotency_key: Some(placeholder_payment_key(due_id, level)),
        };

        match groups.get(level.as_str()) {
            Some(students) if !students.is_empty() => {
                planned.extend(students.iter().map(|s| NewPayment {
                    student_id: s.student_id.clone(),
                    payee_name: Some(s.name.clone()),
                    reg_no: Some(s.student_id.clone()),
                    idempotency_key: Some(student_payment_key(due_id, s.id)),
                    ..base.clone()
                }));
            }
            _ => planned.push(base),
        }
    }

    planned
}

/// Creates a due and expands it against the roster, stamping payments with the current
/// local date and time.
///
/// # Errors
/// - Validation errors before anything is written
/// - [`Error::PartialExpansion`] if a payment write fails after the due was stored
pub async fn create_due(
    store: &Store,
    request: &DueRequest,
    roster: &[student::Model],
) -> Result<ExpansionOutcome> {
    create_due_stamped(store, request, roster, &DisplayStamp::now()).await
}

/// Same as [`create_due`] with an explicit display stamp.
pub async fn create_due_stamped(
    store: &Store,
    request: &DueRequest,
    roster: &[student::Model],
    stamp: &DisplayStamp,
) -> Result<ExpansionOutcome> {
    let validated = validate_due_request(request)?;

    let due = due::insert_due(
        store,
        &validated.title,
        validated.is_recurring,
        &validated.level_amounts,
    )
    .await?;

    let planned = plan_expansion(
        due.due.id,
        &due.due.title,
        &due.level_amounts,
        roster,
        stamp,
    );
    info!(
        "Expanding due {} into {} payment record(s)",
        due.due.id,
        planned.len()
    );

    let (created, skipped) = write_planned(store, due.due.id, planned, &HashSet::new()).await?;
    Ok(ExpansionOutcome {
        due,
        created,
        skipped,
    })
}

/// Re-runs the expansion of an existing due, writing only the records that are missing.
///
/// Payments are stamped with the due's creation time so that the session label matches
/// the records written by the first run.
///
/// Only missing records are added. A level placeholder written by an earlier run stays
/// in place even when `roster` now has students at that level, who get their own
/// payments next to it.
///
/// # Errors
/// - [`Error::DueNotFound`] if the due does not exist
/// - [`Error::PartialExpansion`] if a payment write fails
pub async fn resume_expansion(
    store: &Store,
    due_id: i64,
    roster: &[student::Model],
) -> Result<ExpansionOutcome> {
    let due = due::get_due_by_id(store.db(), due_id)
        .await?
        .ok_or(Error::DueNotFound { id: due_id })?;

    let existing: HashSet<String> = payment::get_payments_for_due(store.db(), due_id)
        .await?
        .into_iter()
        .filter_map(|p| p.idempotency_key)
        .collect();

    let stamp = DisplayStamp::at(due.due.created_at.with_timezone(&Local).naive_local());
    let planned = plan_expansion(
        due_id,
        &due.due.title,
        &due.level_amounts,
        roster,
        &stamp,
    );
    info!(
        "Resuming expansion of due {}: {} planned, {} already written",
        due_id,
        planned.len(),
        existing.len()
    );

    let (created, skipped) = write_planned(store, due_id, planned, &existing).await?;
    Ok(ExpansionOutcome {
        due,
        created,
        skipped,
    })
}

/// Writes planned payments sequentially, skipping keys in `existing`.
async fn write_planned(
    store: &Store,
    due_id: i64,
    planned: Vec<NewPayment>,
    existing: &HashSet<String>,
) -> Result<(Vec<payment_entity::Model>, usize)> {
    let mut created = Vec::with_capacity(planned.len());
    let mut skipped = 0;

    for new in planned {
        if new
            .idempotency_key
            .as_ref()
            .is_some_and(|key| existing.contains(key))
        {
            skipped += 1;
            continue;
        }

        match payment::create_payment(store, new).await {
            Ok(record) => created.push(record),
            Err(Error::Database(source)) => {
                warn!(
                    "Payment write failed for due {} after {} record(s): {}",
                    due_id,
                    created.len(),
                    source
                );
                return Err(Error::PartialExpansion {
                    due_id,
                    committed: created.len(),
                    source,
                });
            }
            Err(other) => return Err(other),
        }
    }

    debug!(
        "Due {} expansion wrote {} record(s), skipped {}",
        due_id,
        created.len(),
        skipped
    );
    Ok((created, skipped))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::payment::get_all_payments;
    use crate::entities::payment::Model as PaymentModel;
    use crate::test_utils::{create_test_student, roster_student, setup_test_store, test_stamp};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn request(title: &str, amounts: &[(&str, &str)]) -> DueRequest {
        DueRequest {
            title: title.to_string(),
            is_recurring: false,
            level_amounts: amounts
                .iter()
                .map(|(l, a)| ((*l).to_string(), (*a).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let result = validate_due_request(&request("   ", &[("100 lvl", "2000")]));
        assert!(matches!(result, Err(Error::EmptyDueTitle)));
    }

    #[test]
    fn test_validate_rejects_no_positive_amount() {
        let result = validate_due_request(&request(
            "Library Fee",
            &[("100 lvl", ""), ("200 lvl", "0"), ("300 lvl", "abc")],
        ));
        assert!(matches!(result, Err(Error::NoValidAmount)));
    }

    #[test]
    fn test_validate_keeps_only_positive_levels() {
        let validated = validate_due_request(&request(
            "  Library Fee ",
            &[("100 lvl", "2,000"), ("200 lvl", ""), ("300 lvl", "₦1500.5")],
        ))
        .unwrap();

        assert_eq!(validated.title, "Library Fee");
        assert_eq!(validated.level_amounts.len(), 2);
        assert_eq!(validated.level_amounts["100 lvl"], 2000.0);
        assert_eq!(validated.level_amounts["300 lvl"], 1500.5);
    }

    #[test]
    fn test_plan_one_payment_per_student() {
        let roster = vec![
            roster_student(1, "Ada", "2020/1", "100 lvl"),
            roster_student(2, "Bayo", "2020/2", "100 lvl"),
            roster_student(3, "Chi", "2019/3", "200 lvl"),
        ];
        let amounts = BTreeMap::from([("100 lvl".to_string(), 2000.0)]);

        let planned = plan_expansion(9, "Library Fee", &amounts, &roster, &test_stamp());

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].student_id, "2020/1");
        assert_eq!(planned[0].payee_name.as_deref(), Some("Ada"));
        assert_eq!(planned[0].reg_no.as_deref(), Some("2020/1"));
        assert_eq!(planned[1].student_id, "2020/2");
        for p in &planned {
            assert_eq!(p.amount, "2,000.00");
            assert_eq!(p.status, "Pending");
            assert_eq!(p.due_type, "Library Fee");
            assert_eq!(p.payment_type.as_deref(), Some(DUE_CREATED_PAYMENT_TYPE));
            assert!(p.transaction_no.is_none());
            assert_eq!(p.session, "2024/2025");
        }
        assert_eq!(planned[0].idempotency_key.as_deref(), Some("9:student:1"));
    }

    #[test]
    fn test_plan_placeholder_for_empty_level() {
        let roster = vec![roster_student(1, "Ada", "2020/1", "100 lvl")];
        let amounts = BTreeMap::from([
            ("100 lvl".to_string(), 2000.0),
            ("400 lvl".to_string(), 5000.0),
        ]);

        let planned = plan_expansion(3, "Dept. Dues", &amounts, &roster, &test_stamp());

        assert_eq!(planned.len(), 2);
        let placeholder = &planned[1];
        assert_eq!(placeholder.level, "400 lvl");
        assert_eq!(placeholder.student_id, PLACEHOLDER_STUDENT_ID);
        assert!(placeholder.payee_name.is_none());
        assert!(placeholder.reg_no.is_none());
        assert_eq!(placeholder.amount, "5,000.00");
        assert_eq!(
            placeholder.idempotency_key.as_deref(),
            Some("3:level:400 lvl")
        );
    }

    #[tokio::test]
    async fn test_library_fee_scenario() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_student(&store, "Ada Obi", "2020/1", "100 lvl").await?;
        create_test_student(&store, "Bayo Ade", "2020/2", "100 lvl").await?;
        let roster = crate::core::student::get_all_students(store.db()).await?;

        let outcome = create_due_stamped(
            &store,
            &request("Library Fee", &[("100 lvl", "2000"), ("200 lvl", "")]),
            &roster,
            &test_stamp(),
        )
        .await?;

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(outcome.skipped, 0);
        assert!(outcome.created.iter().all(|p| p.level == "100 lvl"
            && p.status == "Pending"
            && p.amount == "2,000.00"));

        assert_eq!(due::get_all_dues(store.db()).await?.len(), 1);
        assert_eq!(get_all_payments(store.db()).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_validation_failure_writes_nothing() -> Result<()> {
        let store = setup_test_store().await?;

        let result = create_due(&store, &request("Library Fee", &[("100 lvl", "")]), &[]).await;

        assert!(matches!(result, Err(Error::NoValidAmount)));
        assert!(due::get_all_dues(store.db()).await?.is_empty());
        assert!(get_all_payments(store.db()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_resume_writes_only_missing_records() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_student(&store, "Ada Obi", "2020/1", "100 lvl").await?;
        create_test_student(&store, "Bayo Ade", "2020/2", "100 lvl").await?;
        let roster = crate::core::student::get_all_students(store.db()).await?;

        let first = create_due_stamped(
            &store,
            &request("Dept. Dues", &[("100 lvl", "1500"), ("300 lvl", "1500")]),
            &roster,
            &test_stamp(),
        )
        .await?;
        assert_eq!(first.created.len(), 3);

        // Simulate a run that died before its last write
        let lost = first.created.last().unwrap();
        payment::delete_payment(&store, lost.id).await?;

        let resumed = resume_expansion(&store, first.due.due.id, &roster).await?;
        assert_eq!(resumed.created.len(), 1);
        assert_eq!(resumed.skipped, 2);
        assert_eq!(resumed.created[0].idempotency_key, lost.idempotency_key);

        // A second resume is a no-op
        let again = resume_expansion(&store, first.due.due.id, &roster).await?;
        assert!(again.created.is_empty());
        assert_eq!(again.skipped, 3);
        assert_eq!(get_all_payments(store.db()).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_resume_keeps_placeholder_after_level_gains_student() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_student(&store, "Ada Obi", "2020/1", "100 lvl").await?;
        let roster = crate::core::student::get_all_students(store.db()).await?;

        let first = create_due_stamped(
            &store,
            &request("Dept. Dues", &[("100 lvl", "1500"), ("300 lvl", "1500")]),
            &roster,
            &test_stamp(),
        )
        .await?;
        assert_eq!(first.created.len(), 2);

        create_test_student(&store, "Chidi Eze", "2018/7", "300 lvl").await?;
        let roster = crate::core::student::get_all_students(store.db()).await?;

        let resumed = resume_expansion(&store, first.due.due.id, &roster).await?;
        assert_eq!(resumed.created.len(), 1);
        assert_eq!(resumed.created[0].student_id, "2018/7");

        let mut at_300: Vec<String> = get_all_payments(store.db())
            .await?
            .into_iter()
            .filter(|p| p.level == "300 lvl")
            .map(|p| p.student_id)
            .collect();
        at_300.sort();
        assert_eq!(at_300, vec!["2018/7".to_string(), PLACEHOLDER_STUDENT_ID.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_resume_unknown_due() -> Result<()> {
        let store = setup_test_store().await?;
        let result = resume_expansion(&store, 99, &[]).await;
        assert!(matches!(result, Err(Error::DueNotFound { id: 99 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_write_failure_reports_committed_count() {
        let roster = vec![
            roster_student(1, "Ada", "2020/1", "100 lvl"),
            roster_student(2, "Bayo", "2020/2", "100 lvl"),
        ];
        let amounts = BTreeMap::from([("100 lvl".to_string(), 2000.0)]);
        let planned = plan_expansion(5, "Library Fee", &amounts, &roster, &test_stamp());

        let first_written = PaymentModel {
            id: 1,
            session: planned[0].session.clone(),
            student_id: planned[0].student_id.clone(),
            amount: planned[0].amount.clone(),
            due_type: planned[0].due_type.clone(),
            level: planned[0].level.clone(),
            date: planned[0].date.clone(),
            time: planned[0].time.clone(),
            status: planned[0].status.clone(),
            transaction_no: None,
            payment_type: planned[0].payment_type.clone(),
            payee_name: planned[0].payee_name.clone(),
            reg_no: planned[0].reg_no.clone(),
            due_id: Some(5),
            idempotency_key: planned[0].idempotency_key.clone(),
        };

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .append_query_results([vec![first_written]])
            .append_exec_errors([sea_orm::DbErr::Custom("disk full".to_string())])
            .into_connection();
        let store = Store::new(db);

        let result = write_planned(&store, 5, planned, &HashSet::new()).await;

        match result {
            Err(Error::PartialExpansion {
                due_id, committed, ..
            }) => {
                assert_eq!(due_id, 5);
                assert_eq!(committed, 1);
            }
            other => panic!("expected partial expansion, got {other:?}"),
        }
    }
}
