//! In-memory data source.
//!
//! Holds a `Vec` of records behind a tokio `RwLock` and can play either source shape: a
//! collection endpoint for client-side lists, or a page endpoint that filters and paginates the
//! way a backend would. It also keeps a log of the page parameters it was asked for and can be
//! told to fail its next call, which is what the controller tests lean on.

use crate::{
    core::{
        filters::{ListFilter, matches_search},
        pagination::{Page, PageQuery, page_slice, total_pages},
        source::{CollectionSource, Mutator, PageSource},
    },
    entities::Record,
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Record store kept entirely in memory
#[derive(Debug)]
pub struct InMemorySource<T> {
    records: RwLock<Vec<T>>,
    issued: RwLock<Vec<Vec<(String, String)>>>,
    fetches: AtomicUsize,
    failure: RwLock<Option<String>>,
    latency: RwLock<Option<Duration>>,
}

impl<T: Clone + Record + Send + Sync + 'static> InMemorySource<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
            issued: RwLock::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            failure: RwLock::new(None),
            latency: RwLock::new(None),
        }
    }

    /// Makes the next call (fetch or mutation) fail with `message`.
    pub async fn fail_next(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    /// Delays every fetch by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }

    /// Number of fetches served so far, either shape.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Parameters of every page request received, oldest first.
    pub async fn issued_params(&self) -> Vec<Vec<(String, String)>> {
        self.issued.read().await.clone()
    }

    /// Snapshot of the stored records.
    pub async fn records(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    async fn take_failure(&self) -> Result<()> {
        match self.failure.write().await.take() {
            Some(message) => Err(Error::Source { message }),
            None => Ok(()),
        }
    }

    async fn begin_fetch(&self) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.take_failure().await
    }
}

#[async_trait]
impl<T: Clone + Record + Send + Sync + 'static> CollectionSource<T> for InMemorySource<T> {
    async fn fetch_all(&self) -> Result<Vec<T>> {
        self.begin_fetch().await?;
        let records = self.records.read().await.clone();
        trace!("Serving {} records", records.len());
        Ok(records)
    }
}

#[async_trait]
impl<F> PageSource<F> for InMemorySource<F::Item>
where
    F: ListFilter,
    F::Item: Record,
{
    /// Filters, then slices. Sorting is not supported and is ignored.
    async fn fetch_page(&self, query: &PageQuery<F>) -> Result<Page<F::Item>> {
        self.issued.write().await.push(query.params());
        self.begin_fetch().await?;

        let search = query.search.as_deref().unwrap_or_default();
        let filtered: Vec<F::Item> = self
            .records
            .read()
            .await
            .iter()
            .filter(|item| query.filters.matches(item))
            .filter(|item| matches_search(search, &F::search_fields(item)))
            .cloned()
            .collect();

        debug!(
            "Page {} of {} matching records requested",
            query.page,
            filtered.len()
        );
        Ok(Page {
            items: page_slice(&filtered, query.page, query.page_size).to_vec(),
            total_pages: total_pages(filtered.len() as u64, query.page_size),
        })
    }
}

#[async_trait]
impl<T: Clone + Record + Send + Sync + 'static> Mutator<T> for InMemorySource<T> {
    /// Whole record, id included
    type Draft = T;
    /// Replacement record
    type Patch = T;

    async fn create(&self, draft: T) -> Result<T> {
        self.take_failure().await?;
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|record| record.record_id() == draft.record_id())
        {
            return Err(Error::validation(
                "id",
                format!("record {} already exists", draft.record_id()),
            ));
        }
        records.push(draft.clone());
        Ok(draft)
    }

    async fn update(&self, id: i64, patch: T) -> Result<T> {
        self.take_failure().await?;
        if patch.record_id() != id {
            return Err(Error::validation("id", "patch does not match the record id"));
        }
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|record| record.record_id() == id)
            .ok_or(Error::NotFound {
                entity: "record",
                id,
            })?;
        *slot = patch.clone();
        Ok(patch)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.take_failure().await?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.record_id() != id);
        if records.len() == before {
            return Err(Error::NotFound {
                entity: "record",
                id,
            });
        }
        Ok(())
    }
}
