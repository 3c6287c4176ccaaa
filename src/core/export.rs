//! CSV export of payments and students.
//!
//! Headers are written bare. Every data field is double-quoted, with embedded quotes
//! doubled, and records are separated by a single `\n` with no trailing newline.

use crate::{
    core::{payment::get_all_payments, query::PaymentQuery, student::get_all_students},
    entities::{payment, student},
    errors::Result,
};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use sea_orm::DatabaseConnection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const STUDENT_HEADER: [&str; 8] = [
    "Name",
    "Student ID",
    "Level",
    "Year of Study",
    "Email",
    "Phone",
    "Date Created",
    "Time Created",
];

fn payment_header(currency: &str) -> String {
    [
        "Academic Session",
        "Student ID",
        &format!("Amount ({currency})"),
        "Type",
        "Level",
        "Date",
        "Time",
        "Status",
        "Transaction No",
        "Payment Type",
        "Payee Name",
        "Reg No",
    ]
    .join(",")
}

fn render<I, R>(header: &str, rows: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(row)?;
    }

    let body = writer.into_inner().map_err(|e| e.into_error())?;
    let body = String::from_utf8_lossy(&body);

    let mut out = header.to_string();
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body.trim_end_matches('\n'));
    }
    Ok(out)
}

/// Renders payments as CSV in the order given. Missing optional fields become empty
/// strings.
pub fn payments_to_csv<'a, I>(payments: I, currency: &str) -> Result<String>
where
    I: IntoIterator<Item = &'a payment::Model>,
{
    let optional = |value: &Option<String>| value.clone().unwrap_or_default();
    let rows = payments.into_iter().map(|p| {
        [
            p.session.clone(),
            p.student_id.clone(),
            p.amount.clone(),
            p.due_type.clone(),
            p.level.clone(),
            p.date.clone(),
            p.time.clone(),
            p.status.clone(),
            optional(&p.transaction_no),
            optional(&p.payment_type),
            optional(&p.payee_name),
            optional(&p.reg_no),
        ]
    });
    render(&payment_header(currency), rows)
}

/// Renders students as CSV.
pub fn students_to_csv(students: &[student::Model]) -> Result<String> {
    let rows = students.iter().map(|s| {
        [
            s.name.as_str(),
            s.student_id.as_str(),
            s.level.as_str(),
            s.year_of_study.as_str(),
            s.email.as_str(),
            s.phone.as_str(),
            s.date_created.as_str(),
            s.time_created.as_str(),
        ]
    });
    render(&STUDENT_HEADER.join(","), rows)
}

/// File name for an export made on `date`, e.g. `payments_2024-03-09.csv`.
#[must_use]
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Writes export contents to `dir/filename`, creating `dir` if needed.
///
/// # Returns
/// The path written
pub fn write_export(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, contents)?;
    info!("Wrote export {} ({} bytes)", path.display(), contents.len());
    Ok(path)
}

/// Exports the payments visible under `query`, in view order, to `dir` under today's
/// (UTC) file name.
pub async fn export_payments(
    db: &DatabaseConnection,
    dir: &Path,
    currency: &str,
    query: &PaymentQuery,
) -> Result<PathBuf> {
    let payments = get_all_payments(db).await?;
    let contents = payments_to_csv(query.apply(&payments), currency)?;
    let filename = export_filename("payments", chrono::Utc::now().date_naive());
    write_export(dir, &filename, &contents)
}

/// Exports every student to `dir` under today's (UTC) file name.
pub async fn export_students(db: &DatabaseConnection, dir: &Path) -> Result<PathBuf> {
    let students = get_all_students(db).await?;
    let contents = students_to_csv(&students)?;
    let filename = export_filename("students", chrono::Utc::now().date_naive());
    write_export(dir, &filename, &contents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::query::{FilterOptions, SortConfig, SortDirection, SortField, Tab};
    use crate::test_utils::{create_test_student, payment_row, sample_new_payment, setup_test_store};

    #[test]
    fn test_payments_csv_quotes_every_field() -> Result<()> {
        let mut row = payment_row(1, "2020/1", "2,000.00", "Dept. Dues", "100 lvl", "Pending");
        row.payee_name = Some("Ada \"Ace\" Obi".to_string());
        row.transaction_no = None;

        let csv = payments_to_csv([&row], "NGN")?;
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Academic Session,Student ID,Amount (NGN),Type,Level,Date,Time,Status,\
             Transaction No,Payment Type,Payee Name,Reg No"
        );
        assert!(lines[1].starts_with("\"2024/2025\",\"2020/1\",\"2,000.00\",\"Dept. Dues\""));
        assert!(lines[1].contains(",\"\","));
        assert!(lines[1].contains("\"Ada \"\"Ace\"\" Obi\""));
        assert!(!csv.ends_with('\n'));
        Ok(())
    }

    #[test]
    fn test_export_follows_filtered_sorted_view() -> Result<()> {
        let rows = vec![
            payment_row(1, "2020/1", "1,000.00", "Dept. Dues", "100 lvl", "Pending"),
            payment_row(2, "2020/2", "500.00", "Library Fee", "100 lvl", "Pending"),
            payment_row(3, "2020/3", "2,500.00", "Dept. Dues", "200 lvl", "Pending"),
            payment_row(4, "2020/4", "300.00", "Dept. Dues", "100 lvl", "Success"),
        ];
        let query = PaymentQuery {
            tab: Tab::Departmental,
            filters: FilterOptions {
                status: "Pending".to_string(),
                ..Default::default()
            },
            sort: SortConfig {
                field: SortField::Amount,
                direction: SortDirection::Descending,
            },
        };

        let csv = payments_to_csv(query.apply(&rows), "NGN")?;
        let student_ids: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split("\",\"").nth(1).unwrap())
            .collect();

        assert_eq!(student_ids, vec!["2020/3", "2020/1"]);
        Ok(())
    }

    #[test]
    fn test_empty_export_is_header_only() -> Result<()> {
        let csv = students_to_csv(&[])?;
        assert_eq!(
            csv,
            "Name,Student ID,Level,Year of Study,Email,Phone,Date Created,Time Created"
        );
        Ok(())
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename("payments", date), "payments_2024-03-09.csv");
    }

    #[test]
    fn test_write_export_creates_directory() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let dir = temp.path().join("nested").join("exports");

        let path = write_export(&dir, "students_2024-01-01.csv", "Name")?;

        assert_eq!(path, dir.join("students_2024-01-01.csv"));
        assert_eq!(fs::read_to_string(&path)?, "Name");
        Ok(())
    }

    #[tokio::test]
    async fn test_export_from_store() -> Result<()> {
        let store = setup_test_store().await?;
        create_test_student(&store, "Ada Obi", "2021/001", "100 lvl").await?;
        crate::core::payment::create_payment(&store, sample_new_payment("2021/001")).await?;
        let temp = tempfile::tempdir()?;

        let students = export_students(store.db(), temp.path()).await?;
        let payments =
            export_payments(store.db(), temp.path(), "NGN", &PaymentQuery::default()).await?;

        let student_csv = fs::read_to_string(students)?;
        assert_eq!(student_csv.lines().count(), 2);
        assert!(student_csv.contains("\"Ada Obi\""));

        let payment_csv = fs::read_to_string(&payments)?;
        assert_eq!(payment_csv.lines().count(), 2);
        assert!(
            payments
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("payments_")
        );
        Ok(())
    }
}
