//! Shared test utilities for the dues ledger.
//!
//! This module provides helpers for setting up an in-memory store and building
//! students, payments and an identity provider double with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        calendar::DisplayStamp,
        payment::{DUE_CREATED_PAYMENT_TYPE, NewPayment, PaymentStatus},
        provisioning::{AccountProvisioner, ProvisionError},
        student::{NewStudent, create_student},
    },
    entities::{payment, student},
    errors::Result,
    store::Store,
};
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

/// Password used by every test form; long enough for the default minimum.
pub const TEST_PASSWORD: &str = "secret123";

/// Creates a store over an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_store() -> Result<Store> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(Store::new(db))
}

/// Email derived from a name: `"Ada Obi"` becomes `ada.obi@uni.edu.ng`.
pub fn email_for(name: &str) -> String {
    format!("{}@uni.edu.ng", name.to_lowercase().replace(' ', "."))
}

/// A filled-in student form.
///
/// # Defaults
/// * level: "100 lvl"
/// * `year_of_study`: "2020/2024"
/// * phone: "08030000000"
/// * password: [`TEST_PASSWORD`]
pub fn new_student_form(name: &str, student_id: &str, email: &str) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        student_id: student_id.to_string(),
        level: "100 lvl".to_string(),
        year_of_study: "2020/2024".to_string(),
        email: email.to_string(),
        phone: "08030000000".to_string(),
        password: TEST_PASSWORD.to_string(),
    }
}

/// Creates a student through [`create_student`] with a throwaway provider.
pub async fn create_test_student(
    store: &Store,
    name: &str,
    student_id: &str,
    level: &str,
) -> Result<student::Model> {
    let mut form = new_student_form(name, student_id, &email_for(name));
    form.level = level.to_string();
    create_student(store, &InMemoryProvisioner::default(), 6, form).await
}

/// A student model that never touches the database, for pure planning tests.
pub fn roster_student(id: i64, name: &str, student_id: &str, level: &str) -> student::Model {
    student::Model {
        id,
        name: name.to_string(),
        student_id: student_id.to_string(),
        level: level.to_string(),
        year_of_study: "2020/2024".to_string(),
        email: email_for(name),
        phone: "08030000000".to_string(),
        account_id: None,
        date_created: "Sep 2, 2024".to_string(),
        time_created: "10:30 AM".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 9, 2, 10, 30, 0).unwrap(),
    }
}

/// A fixed stamp in the 2024/2025 session.
pub fn test_stamp() -> DisplayStamp {
    let moment = NaiveDate::from_ymd_opt(2024, 9, 2)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .unwrap();
    DisplayStamp::at(moment)
}

/// A pending due payment for `student_id`.
///
/// # Defaults
/// * amount: "2,000.00"
/// * `due_type`: "Dept. Dues"
/// * level: "100 lvl"
/// * status: "Pending"
pub fn sample_new_payment(student_id: &str) -> NewPayment {
    let stamp = test_stamp();
    NewPayment {
        session: stamp.session,
        student_id: student_id.to_string(),
        amount: "2,000.00".to_string(),
        due_type: "Dept. Dues".to_string(),
        level: "100 lvl".to_string(),
        date: stamp.date,
        time: stamp.time,
        status: PaymentStatus::Pending.as_str().to_string(),
        transaction_no: None,
        payment_type: Some(DUE_CREATED_PAYMENT_TYPE.to_string()),
        payee_name: Some("Test Student".to_string()),
        reg_no: Some(student_id.to_string()),
        due_id: None,
        idempotency_key: None,
    }
}

/// A stored payment row for pure query tests.
///
/// Session is "2024/2025"; every row shares the same date and time.
pub fn payment_row(
    id: i64,
    student_id: &str,
    amount: &str,
    due_type: &str,
    level: &str,
    status: &str,
) -> payment::Model {
    payment::Model {
        id,
        session: "2024/2025".to_string(),
        student_id: student_id.to_string(),
        amount: amount.to_string(),
        due_type: due_type.to_string(),
        level: level.to_string(),
        date: "Jan 1, 2024".to_string(),
        time: "9:00 AM".to_string(),
        status: status.to_string(),
        transaction_no: Some(format!("TX-{id}")),
        payment_type: Some(DUE_CREATED_PAYMENT_TYPE.to_string()),
        payee_name: None,
        reg_no: None,
        due_id: None,
        idempotency_key: None,
    }
}

/// Identity provider double that keeps accounts in memory.
#[derive(Debug, Default)]
pub struct InMemoryProvisioner {
    accounts: Mutex<HashSet<String>>,
    failure: Option<ProvisionError>,
}

impl InMemoryProvisioner {
    /// A provider that rejects every request with `error`.
    pub fn failing(error: ProvisionError) -> Self {
        Self {
            accounts: Mutex::default(),
            failure: Some(error),
        }
    }

    /// Number of accounts created so far.
    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

impl AccountProvisioner for InMemoryProvisioner {
    async fn create_account(
        &self,
        email: &str,
        _password: &str,
    ) -> std::result::Result<String, ProvisionError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let mut accounts = self.accounts.lock().unwrap();
        if !accounts.insert(email.to_string()) {
            return Err(ProvisionError::EmailInUse);
        }
        Ok(format!("acct-{}", accounts.len()))
    }
}
