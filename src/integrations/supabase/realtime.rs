// src/integrations/supabase/realtime.rs
//
// Polling change feed
//
// Background task that snapshots the subscribed rows on an interval and
// reports the difference to the previous snapshot as row changes.
//
// CRITICAL RULES:
// - Runs in background task
// - The first snapshot is the baseline and reports nothing
// - Fetch errors are logged and the previous baseline is kept

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::domain::MovieRecord;
use crate::error::AppResult;
use crate::integrations::change_feed::{
    ChangeCallback, ChangeFeed, ChangeFilter, ChangeKind, FeedSubscription, RowChange,
};
use crate::repositories::{MovieRepository, MOVIES_TABLE};

type Snapshot = HashMap<Uuid, DateTime<Utc>>;

pub struct PollingChangeFeed {
    repository: Arc<dyn MovieRepository>,
    interval: Duration,
}

impl PollingChangeFeed {
    pub fn new(repository: Arc<dyn MovieRepository>, interval: Duration) -> Self {
        Self {
            repository,
            interval,
        }
    }
}

async fn snapshot(repository: &dyn MovieRepository, user_id: Uuid) -> AppResult<Snapshot> {
    let movies: Vec<MovieRecord> = repository.list_for_user(user_id).await?;
    Ok(movies.into_iter().map(|m| (m.id, m.updated_at)).collect())
}

/// Row changes that turn `previous` into `current`
fn diff(table: &str, previous: &Snapshot, current: &Snapshot) -> Vec<RowChange> {
    let mut changes = Vec::new();

    for (id, updated_at) in current {
        let kind = match previous.get(id) {
            None => ChangeKind::Insert,
            Some(before) if before != updated_at => ChangeKind::Update,
            Some(_) => continue,
        };
        changes.push(RowChange {
            table: table.to_string(),
            kind,
            row_id: *id,
        });
    }

    for id in previous.keys().filter(|id| !current.contains_key(*id)) {
        changes.push(RowChange {
            table: table.to_string(),
            kind: ChangeKind::Delete,
            row_id: *id,
        });
    }

    changes
}

impl ChangeFeed for PollingChangeFeed {
    fn subscribe(&self, filter: ChangeFilter, on_change: ChangeCallback) -> FeedSubscription {
        if filter.table != MOVIES_TABLE {
            log::warn!("No change source for table '{}'", filter.table);
            return FeedSubscription::inert();
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("No async runtime; change feed {} disabled", filter);
            return FeedSubscription::inert();
        };

        let repository = Arc::clone(&self.repository);
        let interval = self.interval;

        log::debug!("Change feed subscribed: {}", filter.channel());

        let task = runtime.spawn(async move {
            let mut known = match snapshot(repository.as_ref(), filter.user_id).await {
                Ok(snap) => snap,
                Err(e) => {
                    log::warn!("Change feed baseline for {} failed: {}", filter, e);
                    Snapshot::new()
                }
            };

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let current = match snapshot(repository.as_ref(), filter.user_id).await {
                    Ok(snap) => snap,
                    Err(e) => {
                        log::warn!("Change feed poll for {} failed: {}", filter, e);
                        continue;
                    }
                };

                for change in diff(&filter.table, &known, &current) {
                    log::debug!("[FEED] {} {} {}", change.table, change.kind, change.row_id);
                    on_change(change);
                }
                known = current;
            }
        });

        FeedSubscription::from_task(task)
    }
}
