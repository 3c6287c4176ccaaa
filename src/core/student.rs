//! Student business logic - roster storage, search and per-level due standing.
//!
//! Creating a student validates the form, checks the store for an existing email,
//! provisions a login account and only then writes the record. The email check is
//! best-effort: two submissions racing each other can both pass it, in which case the
//! identity provider's own duplicate rejection is the backstop.

use crate::{
    core::{
        calendar::DisplayStamp,
        provisioning::{AccountProvisioner, provision_error_to_error},
        query::ALL,
    },
    entities::{Student, StudentDue, student, student_due},
    errors::{Error, Result},
    store::{Collection, Store},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// A student's standing for one level's dues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStanding {
    /// All dues for the level are paid
    Paid,
    /// Something is outstanding
    Unpaid,
}

impl DueStanding {
    /// Stored spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Unpaid => "UNPAID",
        }
    }
}

/// Admin form for a new student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudent {
    /// Full name
    pub name: String,
    /// Registration number
    pub student_id: String,
    /// Level label
    pub level: String,
    /// Cohort range
    pub year_of_study: String,
    /// Email, also the account login
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Initial account password
    pub password: String,
}

/// Partial edit of a student. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentUpdate {
    /// Full name
    pub name: Option<String>,
    /// Registration number
    pub student_id: Option<String>,
    /// Level label
    pub level: Option<String>,
    /// Cohort range
    pub year_of_study: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
}

/// Roster search state. `"All"` disables the level and year filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFilter {
    /// Case-insensitive text matched against name, registration number and email
    pub query: String,
    /// Level to show, or `"All"`
    pub level: String,
    /// Cohort to show, or `"All"`
    pub year_of_study: String,
}

impl Default for StudentFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            level: ALL.to_string(),
            year_of_study: ALL.to_string(),
        }
    }
}

/// Loose email shape check: `local@domain.tld` with no whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::MissingField { field });
    }
    Ok(())
}

/// Retrieves the whole roster in creation order.
pub async fn get_all_students(db: &DatabaseConnection) -> Result<Vec<student::Model>> {
    Student::find()
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A student together with their per-level due standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    /// The student row
    pub student: student::Model,
    /// Standings keyed by level, e.g. `"100 lvl" -> "PAID"`
    pub due_standings: BTreeMap<String, String>,
}

impl StudentRecord {
    fn from_parts(student: student::Model, standings: Vec<student_due::Model>) -> Self {
        let due_standings = standings.into_iter().map(|d| (d.level, d.status)).collect();
        Self {
            student,
            due_standings,
        }
    }
}

/// Retrieves the whole roster with due standings, in creation order.
pub async fn get_all_student_records(db: &DatabaseConnection) -> Result<Vec<StudentRecord>> {
    let students = Student::find()
        .order_by_asc(student::Column::Id)
        .find_with_related(StudentDue)
        .all(db)
        .await?;

    Ok(students
        .into_iter()
        .map(|(student, standings)| StudentRecord::from_parts(student, standings))
        .collect())
}

/// Retrieves a specific student by store ID.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_ref: i64,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_ref)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by email, ignoring case.
pub async fn find_student_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<student::Model>> {
    Student::find()
        .filter(student::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a student and their login account.
///
/// # Errors
/// - [`Error::MissingField`] for a blank name, registration number, level or email
/// - [`Error::MalformedIdentity`] for an invalid email
/// - [`Error::WeakPassword`] if the password is shorter than `min_password_length`
/// - [`Error::DuplicateIdentity`] if the email is already on the roster or the provider
///   already has it
/// - [`Error::Provisioning`] for other provider failures
///
/// No record is written when any of these occur.
pub async fn create_student<P>(
    store: &Store,
    provisioner: &P,
    min_password_length: usize,
    new: NewStudent,
) -> Result<student::Model>
where
    P: AccountProvisioner + Sync,
{
    require(&new.name, "name")?;
    require(&new.student_id, "student ID")?;
    require(&new.level, "level")?;
    require(&new.email, "email")?;

    let email = normalize_email(&new.email);
    if !is_valid_email(&email) {
        return Err(Error::MalformedIdentity { email });
    }
    if new.password.chars().count() < min_password_length {
        return Err(Error::WeakPassword {
            min_length: min_password_length,
        });
    }
    if find_student_by_email(store.db(), &email).await?.is_some() {
        return Err(Error::DuplicateIdentity { email });
    }

    let account_id = provisioner
        .create_account(&email, &new.password)
        .await
        .map_err(|e| {
            warn!("Account provisioning rejected {}: {}", email, e);
            provision_error_to_error(e, &email, min_password_length)
        })?;

    let stamp = DisplayStamp::now();
    let created = student::ActiveModel {
        name: Set(new.name.trim().to_string()),
        student_id: Set(new.student_id.trim().to_string()),
        level: Set(new.level.trim().to_string()),
        year_of_study: Set(new.year_of_study.trim().to_string()),
        email: Set(email),
        phone: Set(new.phone.trim().to_string()),
        account_id: Set(Some(account_id)),
        date_created: Set(stamp.date),
        time_created: Set(stamp.time),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(store.db())
    .await?;

    info!("Created student {} ({})", created.id, created.student_id);
    store.notify(Collection::Students);
    Ok(created)
}

/// Applies a partial edit to a student.
///
/// Payments keep referencing the old registration number if it changes.
///
/// # Errors
/// - [`Error::StudentNotFound`] if the student does not exist
/// - [`Error::MissingField`] if a provided field is blank
/// - [`Error::MalformedIdentity`] / [`Error::DuplicateIdentity`] for a bad new email
pub async fn update_student(
    store: &Store,
    student_ref: i64,
    update: StudentUpdate,
) -> Result<student::Model> {
    let existing = get_student_by_id(store.db(), student_ref)
        .await?
        .ok_or(Error::StudentNotFound { id: student_ref })?;

    if let Some(new_id) = update.student_id.as_deref().map(str::trim) {
        if new_id != existing.student_id {
            warn!(
                "Registration number of student {} changes from {} to {}; existing payments keep the old value",
                student_ref, existing.student_id, new_id
            );
        }
    }

    let mut active: student::ActiveModel = existing.into();

    if let Some(name) = update.name {
        require(&name, "name")?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(student_id) = update.student_id {
        require(&student_id, "student ID")?;
        active.student_id = Set(student_id.trim().to_string());
    }
    if let Some(level) = update.level {
        require(&level, "level")?;
        active.level = Set(level.trim().to_string());
    }
    if let Some(year) = update.year_of_study {
        active.year_of_study = Set(year.trim().to_string());
    }
    if let Some(phone) = update.phone {
        active.phone = Set(phone.trim().to_string());
    }
    if let Some(email) = update.email {
        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(Error::MalformedIdentity { email });
        }
        let taken = find_student_by_email(store.db(), &email)
            .await?
            .is_some_and(|other| other.id != student_ref);
        if taken {
            return Err(Error::DuplicateIdentity { email });
        }
        active.email = Set(email);
    }

    let updated = active.update(store.db()).await?;
    info!("Updated student {}", updated.id);
    store.notify(Collection::Students);
    Ok(updated)
}

/// Removes a student and their due standings.
///
/// Payments that reference the student's registration number are left alone.
///
/// # Errors
/// Returns [`Error::StudentNotFound`] if the student does not exist.
pub async fn delete_student(store: &Store, student_ref: i64) -> Result<()> {
    let txn = store.db().begin().await?;

    StudentDue::delete_many()
        .filter(student_due::Column::StudentRef.eq(student_ref))
        .exec(&txn)
        .await?;
    let result = Student::delete_by_id(student_ref).exec(&txn).await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(Error::StudentNotFound { id: student_ref });
    }

    txn.commit().await?;
    info!("Deleted student {}", student_ref);
    store.notify(Collection::Students);
    Ok(())
}

/// Retrieves a student's per-level due standings.
pub async fn get_due_standings(
    db: &DatabaseConnection,
    student_ref: i64,
) -> Result<Vec<student_due::Model>> {
    StudentDue::find()
        .filter(student_due::Column::StudentRef.eq(student_ref))
        .order_by_asc(student_due::Column::Level)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets a student's standing for a level, replacing any previous standing.
///
/// # Errors
/// Returns [`Error::StudentNotFound`] if the student does not exist.
pub async fn set_due_standing(
    store: &Store,
    student_ref: i64,
    level: &str,
    standing: DueStanding,
) -> Result<student_due::Model> {
    if get_student_by_id(store.db(), student_ref).await?.is_none() {
        return Err(Error::StudentNotFound { id: student_ref });
    }

    let existing = StudentDue::find()
        .filter(student_due::Column::StudentRef.eq(student_ref))
        .filter(student_due::Column::Level.eq(level))
        .one(store.db())
        .await?;

    let saved = if let Some(row) = existing {
        let mut active: student_due::ActiveModel = row.into();
        active.status = Set(standing.as_str().to_string());
        active.update(store.db()).await?
    } else {
        student_due::ActiveModel {
            student_ref: Set(student_ref),
            level: Set(level.to_string()),
            status: Set(standing.as_str().to_string()),
            ..Default::default()
        }
        .insert(store.db())
        .await?
    };

    store.notify(Collection::Students);
    Ok(saved)
}

/// Level tabs for the roster screen: `"All"` followed by the configured levels.
#[must_use]
pub fn level_tabs(levels: &[String]) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(levels.iter().cloned())
        .collect()
}

/// Applies the roster search, keeping roster order.
#[must_use]
pub fn filter_students<'a>(
    students: &'a [student::Model],
    filter: &StudentFilter,
) -> Vec<&'a student::Model> {
    let needle = filter.query.trim().to_lowercase();

    students
        .iter()
        .filter(|s| {
            needle.is_empty()
                || s.name.to_lowercase().contains(&needle)
                || s.student_id.to_lowercase().contains(&needle)
                || s.email.to_lowercase().contains(&needle)
        })
        .filter(|s| filter.level == ALL || s.level == filter.level)
        .filter(|s| filter.year_of_study == ALL || s.year_of_study == filter.year_of_study)
        .collect()
}
