//! Due business logic - storage of due definitions and their level amounts.
//!
//! Dues are written once by [`crate::core::expansion`] and never edited. A due and its
//! level amounts are inserted in a single database transaction.

use crate::{
    entities::{Due, DueAmount, due, due_amount},
    errors::Result,
    store::{Collection, Store},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::info;

/// A due together with its level to amount map.
#[derive(Debug, Clone, PartialEq)]
pub struct DueRecord {
    /// The due row
    pub due: due::Model,
    /// Amount charged per level
    pub level_amounts: BTreeMap<String, f64>,
}

impl DueRecord {
    fn from_parts(due: due::Model, amounts: Vec<due_amount::Model>) -> Self {
        let level_amounts = amounts.into_iter().map(|a| (a.level, a.amount)).collect();
        Self { due, level_amounts }
    }

    /// Creation timestamp in ISO 8601 form.
    #[must_use]
    pub fn date_created(&self) -> String {
        self.due.created_at.to_rfc3339()
    }
}

/// Retrieves every due with its amounts, oldest first.
pub async fn get_all_dues(db: &DatabaseConnection) -> Result<Vec<DueRecord>> {
    let dues = Due::find()
        .order_by_asc(due::Column::Id)
        .find_with_related(DueAmount)
        .all(db)
        .await?;

    Ok(dues
        .into_iter()
        .map(|(due, amounts)| DueRecord::from_parts(due, amounts))
        .collect())
}

/// Retrieves a specific due with its amounts.
pub async fn get_due_by_id(db: &DatabaseConnection, due_id: i64) -> Result<Option<DueRecord>> {
    let Some(due) = Due::find_by_id(due_id).one(db).await? else {
        return Ok(None);
    };

    let amounts = DueAmount::find()
        .filter(due_amount::Column::DueId.eq(due_id))
        .all(db)
        .await?;

    Ok(Some(DueRecord::from_parts(due, amounts)))
}

/// Inserts a due and its level amounts atomically, then notifies due subscribers.
///
/// Callers validate the title and amounts first; see
/// [`crate::core::expansion::validate_due_request`].
pub async fn insert_due(
    store: &Store,
    title: &str,
    is_recurring: bool,
    level_amounts: &BTreeMap<String, f64>,
) -> Result<DueRecord> {
    let txn = store.db().begin().await?;

    let due = due::ActiveModel {
        title: Set(title.to_string()),
        is_recurring: Set(is_recurring),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (level, amount) in level_amounts {
        due_amount::ActiveModel {
            due_id: Set(due.id),
            level: Set(level.clone()),
            amount: Set(*amount),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(
        "Created due {} '{}' for {} level(s)",
        due.id,
        due.title,
        level_amounts.len()
    );
    store.notify(Collection::Dues);

    Ok(DueRecord {
        due,
        level_amounts: level_amounts.clone(),
    })
}
