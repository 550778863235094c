//! Client-side list controller.
//!
//! Fetches the whole collection once and does all filtering and pagination locally. Meant for
//! small, bounded collections (webinars, blog posts, documents, projects). Because the full
//! collection is held locally, a successful mutation is applied to the local copy directly
//! instead of fetching everything again.

use crate::{
    core::{
        deletion::{ConfirmedDelete, DeleteRequest},
        filters::ListFilter,
        list_state::{ListDisplay, ListState, ListView, LoadState},
        pagination::total_pages,
        source::{CollectionSource, Mutator},
    },
    entities::Record,
    errors::Result,
};
use tracing::{debug, error, info, instrument, warn};

/// List whose filtering and pagination happen in memory.
#[derive(Debug)]
pub struct ClientSideList<F: ListFilter> {
    state: ListState<F>,
    items: Vec<F::Item>,
    load: LoadState,
}

impl<F> ClientSideList<F>
where
    F: ListFilter,
    F::Item: Record,
{
    /// Creates an empty list in the `Loading` state.
    pub fn new(page_size: u64) -> Self {
        Self {
            state: ListState::new(page_size),
            items: Vec::new(),
            load: LoadState::Loading,
        }
    }

    pub const fn state(&self) -> &ListState<F> {
        &self.state
    }

    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Every loaded record, unfiltered.
    pub fn items(&self) -> &[F::Item] {
        &self.items
    }

    /// Fetches the full collection, replacing whatever was loaded before.
    ///
    /// On failure the list switches to [`LoadState::Error`] and keeps its previous records;
    /// calling `load` again is the retry.
    #[instrument(skip_all)]
    pub async fn load<S>(&mut self, source: &S) -> Result<()>
    where
        S: CollectionSource<F::Item> + ?Sized,
    {
        self.load = LoadState::Loading;
        match source.fetch_all().await {
            Ok(items) => {
                info!("Loaded {} records", items.len());
                self.items = items;
                self.load = LoadState::Ready;
                self.clamp_page();
                Ok(())
            }
            Err(e) => {
                error!("Failed to load collection: {}", e);
                self.load = LoadState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Changes filter dimensions; always returns to page 1.
    pub fn set_filter(&mut self, update: impl FnOnce(&mut F)) {
        self.state.set_filter(update);
    }

    /// Changes the search text; always returns to page 1.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.state.set_search_query(text);
    }

    /// Moves to `page`, clamped to the pages that exist.
    pub fn set_page(&mut self, page: u64) {
        self.state.set_page(page);
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.current_page().saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.state.current_page().saturating_sub(1));
    }

    /// Current page of the filtered collection.
    pub fn view(&self) -> ListView<F::Item> {
        self.state.derive(&self.items)
    }

    /// What to render for `view`, which should come from [`ClientSideList::view`].
    pub fn display<'a>(&'a self, view: &'a ListView<F::Item>) -> ListDisplay<'a, F::Item> {
        ListDisplay::from_parts(&self.load, &view.items)
    }

    /// Starts the confirmation step for deleting `id`; `None` if no such row is loaded.
    pub fn request_delete(&self, id: i64) -> Option<DeleteRequest> {
        self.items
            .iter()
            .any(|item| item.record_id() == id)
            .then(|| DeleteRequest::new(id))
    }

    /// Deletes a confirmed row through `mutator` and drops it from the local copy.
    ///
    /// If the mutator fails the row stays exactly where it was.
    #[instrument(skip(self, mutator))]
    pub async fn delete<M>(&mut self, mutator: &M, confirmed: ConfirmedDelete) -> Result<()>
    where
        M: Mutator<F::Item> + ?Sized,
    {
        let id = confirmed.id();
        mutator
            .delete(id)
            .await
            .inspect_err(|e| warn!("Delete of record {} failed: {}", id, e))?;
        self.items.retain(|item| item.record_id() != id);
        self.clamp_page();
        debug!("Removed record {} locally", id);
        Ok(())
    }

    /// Creates a record, appends it to the local copy and returns it.
    #[instrument(skip_all)]
    pub async fn create<M>(&mut self, mutator: &M, draft: M::Draft) -> Result<F::Item>
    where
        M: Mutator<F::Item> + ?Sized,
    {
        let created = mutator
            .create(draft)
            .await
            .inspect_err(|e| warn!("Create failed: {}", e))?;
        debug!("Created record {}", created.record_id());
        self.items.push(created.clone());
        Ok(created)
    }

    /// Updates a record and swaps the stored copy for the one the mutator returned.
    #[instrument(skip(self, mutator, patch))]
    pub async fn update<M>(&mut self, mutator: &M, id: i64, patch: M::Patch) -> Result<()>
    where
        M: Mutator<F::Item> + ?Sized,
    {
        let updated = mutator
            .update(id, patch)
            .await
            .inspect_err(|e| warn!("Update of record {} failed: {}", id, e))?;
        match self.items.iter_mut().find(|item| item.record_id() == id) {
            Some(slot) => *slot = updated,
            None => self.items.push(updated),
        }
        self.clamp_page();
        Ok(())
    }

    fn clamp_page(&mut self) {
        let filtered = self
            .items
            .iter()
            .filter(|item| self.state.accepts(item))
            .count() as u64;
        let last = total_pages(filtered, self.state.page_size());
        if self.state.current_page() > last {
            self.state.set_page(last);
        }
    }
}
