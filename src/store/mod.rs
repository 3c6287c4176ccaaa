//! Record store adapter.
//!
//! [`Store`] wraps the database connection together with one change feed per collection.
//! Every write made through `core` bumps the feed of the collection it touched, and
//! [`Store::subscribe`] turns those bumps into full-collection snapshots for listeners.

mod subscription;

pub use subscription::Subscription;

use crate::{
    core::{
        due::{self, DueRecord},
        student::{self, StudentRecord},
    },
    entities::{Payment, payment},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::{collections::BTreeMap, fmt, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// The collections the store exposes to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Student roster
    Students,
    /// Due definitions
    Dues,
    /// Payment records
    Payments,
}

impl Collection {
    /// Collection path name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Dues => "dues",
            Self::Payments => "payments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full contents of one collection, keyed by store ID.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Every student with their per-level due standings
    Students(BTreeMap<i64, StudentRecord>),
    /// Every due with its level amounts
    Dues(BTreeMap<i64, DueRecord>),
    /// Every payment
    Payments(BTreeMap<i64, payment::Model>),
}

impl Snapshot {
    /// Collection this snapshot was taken from.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Students(_) => Collection::Students,
            Self::Dues(_) => Collection::Dues,
            Self::Payments(_) => Collection::Payments,
        }
    }

    /// Number of records in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Students(records) => records.len(),
            Self::Dues(records) => records.len(),
            Self::Payments(records) => records.len(),
        }
    }

    /// Whether the collection was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ChangeFeeds {
    students: watch::Sender<u64>,
    dues: watch::Sender<u64>,
    payments: watch::Sender<u64>,
}

impl ChangeFeeds {
    fn new() -> Self {
        Self {
            students: watch::Sender::new(0),
            dues: watch::Sender::new(0),
            payments: watch::Sender::new(0),
        }
    }
}

/// Handle to the record store. Cheap to clone; clones share the same change feeds.
#[derive(Clone)]
pub struct Store {
    db: Arc<DatabaseConnection>,
    feeds: Arc<ChangeFeeds>,
}

impl Store {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            feeds: Arc::new(ChangeFeeds::new()),
        }
    }

    /// The underlying connection, for reads.
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn feed(&self, collection: Collection) -> &watch::Sender<u64> {
        match collection {
            Collection::Students => &self.feeds.students,
            Collection::Dues => &self.feeds.dues,
            Collection::Payments => &self.feeds.payments,
        }
    }

    /// Marks a collection as changed, waking its subscribers.
    pub fn notify(&self, collection: Collection) {
        self.feed(collection)
            .send_modify(|version| *version = version.wrapping_add(1));
        trace!("Collection {} changed", collection);
    }

    /// Reads the full current contents of a collection.
    pub async fn load_snapshot(&self, collection: Collection) -> Result<Snapshot> {
        let snapshot = match collection {
            Collection::Students => Snapshot::Students(
                student::get_all_student_records(self.db())
                    .await?
                    .into_iter()
                    .map(|r| (r.student.id, r))
                    .collect(),
            ),
            Collection::Dues => Snapshot::Dues(
                due::get_all_dues(self.db())
                    .await?
                    .into_iter()
                    .map(|d| (d.due.id, d))
                    .collect(),
            ),
            Collection::Payments => Snapshot::Payments(
                Payment::find()
                    .order_by_asc(payment::Column::Id)
                    .all(self.db())
                    .await?
                    .into_iter()
                    .map(|p| (p.id, p))
                    .collect(),
            ),
        };
        Ok(snapshot)
    }

    /// Opens a long-lived subscription to a collection.
    ///
    /// `on_snapshot` receives the full collection right away and again after every
    /// change; several quick changes may arrive as a single snapshot. Read failures go
    /// to `on_error` and the listener keeps waiting for the next change. The listener
    /// stops when the returned [`Subscription`] is closed or dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F, E>(
        &self,
        collection: Collection,
        mut on_snapshot: F,
        mut on_error: E,
    ) -> Subscription
    where
        F: FnMut(Snapshot) + Send + 'static,
        E: FnMut(Error) + Send + 'static,
    {
        let mut changes = self.feed(collection).subscribe();
        let store = self.clone();

        let handle = tokio::spawn(async move {
            loop {
                match store.load_snapshot(collection).await {
                    Ok(snapshot) => {
                        trace!("Delivering {} snapshot ({} records)", collection, snapshot.len());
                        on_snapshot(snapshot);
                    }
                    Err(e) => {
                        warn!("Failed to load {} snapshot: {}", collection, e);
                        on_error(Error::Subscription {
                            collection: collection.name(),
                            message: e.to_string(),
                        });
                    }
                }

                if changes.changed().await.is_err() {
                    break;
                }
            }
        });

        debug!("Opened subscription to {}", collection);
        Subscription::new(collection, handle)
    }
}
