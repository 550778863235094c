//! Data source seams of the list controllers.
//!
//! A list never talks to a backend directly. Client-side lists read a whole collection through
//! [`CollectionSource`], server-side lists ask a [`PageSource`] for one already-filtered page,
//! and both send changes through a [`Mutator`].

use crate::core::filters::ListFilter;
use crate::core::pagination::{Page, PageQuery};
use crate::errors::Result;
use async_trait::async_trait;

/// Source of a complete, small collection (client-side sourcing).
#[async_trait]
pub trait CollectionSource<T>: Send + Sync {
    /// Fetches every record of the collection.
    async fn fetch_all(&self) -> Result<Vec<T>>;
}

/// Source that filters and paginates on its side (server-side sourcing).
#[async_trait]
pub trait PageSource<F: ListFilter>: Send + Sync {
    /// Fetches the page described by `query`.
    ///
    /// The returned items are final: callers must not filter or slice them again.
    async fn fetch_page(&self, query: &PageQuery<F>) -> Result<Page<F::Item>>;
}

/// Create/update/delete collaborator for one record type.
#[async_trait]
pub trait Mutator<T>: Send + Sync {
    /// Input accepted by [`Mutator::create`]
    type Draft: Send + 'static;
    /// Partial update accepted by [`Mutator::update`]
    type Patch: Send + 'static;

    async fn create(&self, draft: Self::Draft) -> Result<T>;

    async fn update(&self, id: i64, patch: Self::Patch) -> Result<T>;

    async fn delete(&self, id: i64) -> Result<()>;
}
