// src/integrations/change_feed.rs
//
// Change feed seam
//
// A change feed tells subscribers that rows in a table changed. It carries
// no row data: subscribers refetch. Subscriptions end when their handle drops.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::repositories::MOVIES_TABLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "INSERT"),
            ChangeKind::Update => write!(f, "UPDATE"),
            ChangeKind::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChange {
    pub table: String,
    pub kind: ChangeKind,
    pub row_id: Uuid,
}

/// Rows of `table` owned by `user_id` (`user_id=eq.<id>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub table: String,
    pub user_id: Uuid,
}

impl ChangeFilter {
    pub fn movies_for_user(user_id: Uuid) -> Self {
        Self {
            table: MOVIES_TABLE.to_string(),
            user_id,
        }
    }

    /// Channel name, one per user and table
    pub fn channel(&self) -> String {
        format!("{}_{}", self.table, self.user_id)
    }
}

impl fmt::Display for ChangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:user_id=eq.{}", self.table, self.user_id)
    }
}

pub type ChangeCallback = Arc<dyn Fn(RowChange) + Send + Sync>;

/// Live feed subscription. Dropping it stops delivery.
#[must_use = "dropping a FeedSubscription immediately ends it"]
pub struct FeedSubscription {
    task: Option<JoinHandle<()>>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl FeedSubscription {
    /// Subscription backed by a delivery task
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self {
            task: Some(task),
            on_close: None,
        }
    }

    /// Subscription that runs `on_close` when it ends
    pub fn from_fn(on_close: impl FnOnce() + Send + 'static) -> Self {
        Self {
            task: None,
            on_close: Some(Box::new(on_close)),
        }
    }

    /// Subscription that never delivers anything
    pub fn inert() -> Self {
        Self {
            task: None,
            on_close: None,
        }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }
}

pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, filter: ChangeFilter, on_change: ChangeCallback) -> FeedSubscription;
}
