//! Server-side list controller.
//!
//! Every state change produces a [`PageRequest`] describing the page the user now wants. The
//! caller (usually [`crate::core::fetcher::PageFetcher`]) sends it to a page source and hands
//! the [`PageResponse`] back to [`ServerSideList::apply`]. The returned page is shown as is:
//! the source has already filtered and paginated it, and slicing it again would drop rows.
//!
//! Requests may overlap. A response is applied only when the query it answers is still the
//! current one and no newer response has been applied; everything else is stale and dropped.

use crate::{
    core::{
        deletion::{ConfirmedDelete, DeleteRequest},
        filters::ListFilter,
        list_state::{ListDisplay, ListState, ListView, LoadState},
        pagination::{Page, PageQuery, Sort},
        source::Mutator,
    },
    entities::Record,
    errors::Result,
};
use tracing::{debug, error, instrument, warn};

/// Identity of one issued request; later requests have larger ids.
pub type RequestId = u64;

/// A page the list wants fetched
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<F> {
    pub id: RequestId,
    pub query: PageQuery<F>,
}

/// What a page source answered for a request
#[derive(Debug)]
pub struct PageResponse<F: ListFilter> {
    pub request: PageRequest<F>,
    pub result: Result<Page<F::Item>>,
}

/// Result of handing a response to the list
#[derive(Debug, PartialEq)]
pub enum ApplyOutcome<F> {
    /// The response now backs the view (rows or error)
    Applied,
    /// The response answered a superseded query and was dropped
    Stale,
    /// The current page no longer exists; fetch this request instead
    Reissued(PageRequest<F>),
}

/// List whose filtering and pagination happen at the source.
#[derive(Debug)]
pub struct ServerSideList<F: ListFilter> {
    state: ListState<F>,
    sort: Option<Sort>,
    next_id: RequestId,
    latest_issued: Option<RequestId>,
    latest_applied: Option<RequestId>,
    items: Vec<F::Item>,
    total_pages: u64,
    load: LoadState,
}

impl<F> ServerSideList<F>
where
    F: ListFilter,
    F::Item: Record,
{
    /// Creates a list in the `Loading` state; call [`ServerSideList::refresh`] for the first page.
    pub fn new(page_size: u64) -> Self {
        Self {
            state: ListState::new(page_size),
            sort: None,
            next_id: 1,
            latest_issued: None,
            latest_applied: None,
            items: Vec::new(),
            total_pages: 1,
            load: LoadState::Loading,
        }
    }

    /// Sets the initial ordering without issuing a request.
    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub const fn state(&self) -> &ListState<F> {
        &self.state
    }

    pub const fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Rows of the last applied page, exactly as the source returned them.
    pub fn items(&self) -> &[F::Item] {
        &self.items
    }

    /// Whether the newest issued request is still unanswered.
    pub fn is_pending(&self) -> bool {
        self.latest_issued.is_some() && self.latest_issued != self.latest_applied
    }

    /// The query that matches the list's current state.
    pub fn current_query(&self) -> PageQuery<F> {
        PageQuery {
            search: self.state.normalized_search(),
            filters: self.state.filters().clone(),
            page: self.state.current_page(),
            page_size: self.state.page_size(),
            sort: self.sort.clone(),
        }
    }

    /// Changes filter dimensions, returns to page 1 and asks for that page.
    pub fn set_filter(&mut self, update: impl FnOnce(&mut F)) -> PageRequest<F> {
        self.state.set_filter(update);
        self.issue()
    }

    /// Changes the search text, returns to page 1 and asks for that page.
    pub fn set_search_query(&mut self, text: impl Into<String>) -> PageRequest<F> {
        self.state.set_search_query(text);
        self.issue()
    }

    /// Asks for `page` (pages below 1 become 1).
    pub fn set_page(&mut self, page: u64) -> PageRequest<F> {
        self.state.set_page(page);
        self.issue()
    }

    /// Changes the ordering, returns to page 1 and asks for that page.
    pub fn set_sort(&mut self, sort: Option<Sort>) -> PageRequest<F> {
        self.sort = sort;
        self.state.set_page(1);
        self.issue()
    }

    /// Asks for the current page again; also the manual retry after an error.
    pub fn refresh(&mut self) -> PageRequest<F> {
        self.issue()
    }

    fn issue(&mut self) -> PageRequest<F> {
        let id = self.next_id;
        self.next_id += 1;
        self.latest_issued = Some(id);
        self.load = LoadState::Loading;
        let request = PageRequest {
            id,
            query: self.current_query(),
        };
        debug!(request_id = id, params = ?request.query.params(), "Issued page request");
        request
    }

    /// Applies a response if it still describes the current state.
    #[instrument(skip_all, fields(request_id = response.request.id))]
    pub fn apply(&mut self, response: PageResponse<F>) -> ApplyOutcome<F> {
        let PageResponse { request, result } = response;
        let superseded = self.latest_applied.is_some_and(|applied| request.id < applied);
        if superseded || request.query != self.current_query() {
            debug!("Discarding stale page response");
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let last_page = page.total_pages.max(1);
                if page.items.is_empty() && self.state.current_page() > last_page {
                    debug!(
                        "Page {} is past the last page {}, stepping back",
                        self.state.current_page(),
                        last_page
                    );
                    self.latest_applied = Some(request.id);
                    self.state.set_page(last_page);
                    return ApplyOutcome::Reissued(self.issue());
                }
                self.items = page.items;
                self.total_pages = last_page;
                self.load = LoadState::Ready;
            }
            Err(e) => {
                error!("Page request failed: {}", e);
                self.load = LoadState::Error(e.to_string());
            }
        }
        self.latest_applied = Some(request.id);
        ApplyOutcome::Applied
    }

    /// The page as last applied.
    pub fn view(&self) -> ListView<F::Item> {
        ListView {
            items: self.items.clone(),
            current_page: self.state.current_page(),
            total_pages: self.total_pages,
            filtered_count: None,
        }
    }

    pub fn display(&self) -> ListDisplay<'_, F::Item> {
        ListDisplay::from_parts(&self.load, &self.items)
    }

    /// Starts the confirmation step for deleting a visible row; `None` if it is not shown.
    pub fn request_delete(&self, id: i64) -> Option<DeleteRequest> {
        self.items
            .iter()
            .any(|item| item.record_id() == id)
            .then(|| DeleteRequest::new(id))
    }

    /// Deletes a confirmed row and returns the re-fetch that will show the result.
    ///
    /// The row stays on screen until the re-fetched page arrives without it. If the mutator
    /// fails nothing changes and no request is issued.
    #[instrument(skip(self, mutator))]
    pub async fn delete<M>(
        &mut self,
        mutator: &M,
        confirmed: ConfirmedDelete,
    ) -> Result<PageRequest<F>>
    where
        M: Mutator<F::Item> + ?Sized,
    {
        let id = confirmed.id();
        mutator
            .delete(id)
            .await
            .inspect_err(|e| warn!("Delete of record {} failed: {}", id, e))?;
        Ok(self.refresh())
    }

    /// Creates a record and returns the re-fetch that will show it.
    #[instrument(skip_all)]
    pub async fn create<M>(&mut self, mutator: &M, draft: M::Draft) -> Result<PageRequest<F>>
    where
        M: Mutator<F::Item> + ?Sized,
    {
        let created = mutator
            .create(draft)
            .await
            .inspect_err(|e| warn!("Create failed: {}", e))?;
        debug!("Created record {}", created.record_id());
        Ok(self.refresh())
    }

    /// Updates a record and returns the re-fetch that will show the change.
    #[instrument(skip(self, mutator, patch))]
    pub async fn update<M>(
        &mut self,
        mutator: &M,
        id: i64,
        patch: M::Patch,
    ) -> Result<PageRequest<F>>
    where
        M: Mutator<F::Item> + ?Sized,
    {
        mutator
            .update(id, patch)
            .await
            .inspect_err(|e| warn!("Update of record {} failed: {}", id, e))?;
        Ok(self.refresh())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::filters::{FilterValue, TransactionFilters, UserFilters};
    use crate::core::list_state::NO_RECORDS;
    use crate::core::source::PageSource;
    use crate::entities::{TransactionStatus, AdminUserModel};
    use crate::errors::Error;
    use crate::core::user::{self, UserPatch};
    use crate::sources::{DbSource, memory::InMemorySource};
    use crate::test_utils::*;

    async fn answer<F, S>(source: &S, request: PageRequest<F>) -> PageResponse<F>
    where
        F: ListFilter,
        S: PageSource<F>,
    {
        let result = source.fetch_page(&request.query).await;
        PageResponse { request, result }
    }

    #[tokio::test]
    async fn test_first_page_is_applied_verbatim() {
        let source = InMemorySource::new(numbered_users(25));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        assert_eq!(list.display(), ListDisplay::Loading);

        let request = list.refresh();
        assert!(list.is_pending());
        let outcome = list.apply(answer(&source, request).await);

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert!(!list.is_pending());
        let view = list.view();
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.filtered_count, None);
        let ids: Vec<i64> = view.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());

        let request = list.set_page(3);
        list.apply(answer(&source, request).await);
        let ids: Vec<i64> = list.items().iter().map(|u| u.id).collect();
        assert_eq!(ids, (21..=25).collect::<Vec<_>>());
    }

    /// Applies every page from 1 to the last one and returns the ids in page order.
    async fn collect_every_page<S>(source: &S, list: &mut ServerSideList<UserFilters>) -> Vec<i64>
    where
        S: PageSource<UserFilters>,
    {
        let request = list.refresh();
        list.apply(answer(source, request).await);
        let mut ids = Vec::new();
        for page in 1..=list.view().total_pages {
            let request = list.set_page(page);
            assert_eq!(list.apply(answer(source, request).await), ApplyOutcome::Applied);
            ids.extend(list.items().iter().map(|u| u.id));
        }
        ids
    }

    #[tokio::test]
    async fn test_pages_cover_filtered_set_once_in_memory() {
        let source = InMemorySource::new(numbered_users(47));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        list.set_filter(|f| f.active = FilterValue::Only(true));

        let ids = collect_every_page(&source, &mut list).await;
        let expected: Vec<i64> = (1..=47).filter(|i| i % 4 != 0).collect();
        assert_eq!(list.view().total_pages, 4);
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_pages_cover_filtered_set_once_in_database() -> Result<()> {
        let db = setup_test_db().await?;
        let mut expected = Vec::new();
        for i in 1..=33 {
            // Underscores in every other address; "_" must match only those
            let email = if i % 2 == 0 {
                format!("user_{i}@fund.io")
            } else {
                format!("user{i}@fund.io")
            };
            let created = create_test_user(&db, &email, &format!("User {i}")).await?;
            if i % 5 == 0 {
                let patch = UserPatch {
                    is_active: Some(false),
                    ..UserPatch::default()
                };
                user::update_user(&db, created.id, patch).await?;
            } else if i % 2 == 0 {
                expected.push(created.id);
            }
        }
        let source = DbSource::new(db);
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(4);
        list.set_filter(|f| f.active = FilterValue::Only(true));
        list.set_search_query("_");

        let ids = collect_every_page(&source, &mut list).await;
        assert_eq!(list.view().total_pages, 4);
        assert_eq!(ids, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_returned_page_is_not_filtered_again() {
        // A backend that ignores the filters; the list must still show what it got
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(2);
        let request = list.set_search_query("nobody");
        let rows = numbered_users(2);
        let outcome = list.apply(PageResponse {
            request,
            result: Ok(Page {
                items: rows.clone(),
                total_pages: 4,
            }),
        });
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(list.items(), &rows[..]);
        assert_eq!(list.view().total_pages, 4);
    }

    #[tokio::test]
    async fn test_status_change_issues_one_request_for_page_one() {
        let source = InMemorySource::new(numbered_transactions(30));
        let mut list: ServerSideList<TransactionFilters> = ServerSideList::new(10);
        let first = list.refresh();
        list.apply(answer(&source, first).await);
        let page_two = list.set_page(2);
        list.apply(answer(&source, page_two).await);

        let request = list.set_filter(|f| f.status = FilterValue::Only(TransactionStatus::Confirmed));
        assert_eq!(request.query.page, 1);
        assert_eq!(
            request.query.filters.status,
            FilterValue::Only(TransactionStatus::Confirmed)
        );
        list.apply(answer(&source, request).await);

        let issued = source.issued_params().await;
        assert_eq!(issued.len(), 3);
        let confirmed: Vec<_> = issued
            .iter()
            .filter(|p| p.contains(&("status".to_string(), "confirmed".to_string())))
            .collect();
        assert_eq!(confirmed.len(), 1);
        assert!(confirmed[0].contains(&("page".to_string(), "1".to_string())));
        assert!(
            list.items()
                .iter()
                .all(|t| t.status == TransactionStatus::Confirmed)
        );
    }

    #[tokio::test]
    async fn test_response_for_previous_filter_is_discarded() {
        let source = InMemorySource::new(numbered_transactions(30));
        let mut list: ServerSideList<TransactionFilters> = ServerSideList::new(10);

        let old = list.refresh();
        let new = list.set_filter(|f| f.status = FilterValue::Only(TransactionStatus::Confirmed));
        let old_response = answer(&source, old).await;
        let new_response = answer(&source, new).await;

        // Newest first, then the late straggler
        assert_eq!(list.apply(new_response), ApplyOutcome::Applied);
        assert_eq!(list.apply(old_response), ApplyOutcome::Stale);
        assert!(
            list.items()
                .iter()
                .all(|t| t.status == TransactionStatus::Confirmed)
        );
    }

    #[tokio::test]
    async fn test_straggler_arriving_first_is_discarded_too() {
        let source = InMemorySource::new(numbered_transactions(30));
        let mut list: ServerSideList<TransactionFilters> = ServerSideList::new(10);

        let old = list.refresh();
        let new = list.set_filter(|f| f.status = FilterValue::Only(TransactionStatus::Failed));
        let old_response = answer(&source, old).await;
        assert_eq!(list.apply(old_response), ApplyOutcome::Stale);
        assert!(list.is_pending());
        assert_eq!(list.display(), ListDisplay::Loading);

        list.apply(answer(&source, new).await);
        assert!(!list.is_pending());
    }

    #[tokio::test]
    async fn test_older_response_with_same_params_cannot_overwrite_newer() {
        let source = InMemorySource::new(numbered_users(5));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let first = list.refresh();
        let second = list.refresh();
        let first_response = answer(&source, first).await;
        let second_response = answer(&source, second).await;

        assert_eq!(list.apply(second_response), ApplyOutcome::Applied);
        assert_eq!(list.apply(first_response), ApplyOutcome::Stale);
    }

    #[tokio::test]
    async fn test_error_state_is_distinct_and_retry_recovers() {
        let source = InMemorySource::new(numbered_users(5));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let request = list.refresh();
        list.apply(answer(&source, request).await);
        assert_eq!(list.items().len(), 5);

        source.fail_next("gateway timeout").await;
        let request = list.refresh();
        list.apply(answer(&source, request).await);
        assert!(matches!(list.display(), ListDisplay::Error(m) if m.contains("gateway timeout")));
        // Previous rows are not thrown away
        assert_eq!(list.items().len(), 5);

        let request = list.refresh();
        list.apply(answer(&source, request).await);
        assert!(matches!(list.display(), ListDisplay::Rows(_)));
    }

    #[tokio::test]
    async fn test_empty_result_shows_placeholder_with_one_page() {
        let source = InMemorySource::new(numbered_users(5));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let request = list.set_search_query("no-such-user");
        list.apply(answer(&source, request).await);

        assert_eq!(list.display(), ListDisplay::Empty(NO_RECORDS));
        assert_eq!(list.view().total_pages, 1);
    }

    #[tokio::test]
    async fn test_delete_waits_for_refetch() -> Result<()> {
        let source = InMemorySource::new(numbered_users(12));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let request = list.refresh();
        list.apply(answer(&source, request).await);

        let confirmation = list.request_delete(3).unwrap();
        let refetch = list.delete(&source, confirmation.confirm()).await?;

        // Still on screen until the source confirms it is gone
        assert!(list.items().iter().any(|u| u.id == 3));
        list.apply(answer(&source, refetch).await);
        assert!(list.items().iter().all(|u| u.id != 3));
        assert_eq!(list.items().len(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_delete_changes_nothing() {
        let source = InMemorySource::new(numbered_users(3));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let request = list.refresh();
        list.apply(answer(&source, request).await);

        source.fail_next("forbidden").await;
        let confirmation = list.request_delete(2).unwrap();
        let result = list.delete(&source, confirmation.confirm()).await;

        assert!(matches!(result, Err(Error::Source { .. })));
        assert!(!list.is_pending());
        assert_eq!(list.load_state(), &LoadState::Ready);
        assert!(list.items().iter().any(|u| u.id == 2));
    }

    #[tokio::test]
    async fn test_deleting_only_row_on_last_page_steps_back() -> Result<()> {
        let source = InMemorySource::new(numbered_users(11));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let request = list.set_page(2);
        list.apply(answer(&source, request).await);
        assert_eq!(list.items().len(), 1);

        let confirmation = list.request_delete(11).unwrap();
        let refetch = list.delete(&source, confirmation.confirm()).await?;
        let outcome = list.apply(answer(&source, refetch).await);

        let ApplyOutcome::Reissued(request) = outcome else {
            panic!("expected a reissued request, got {outcome:?}");
        };
        assert_eq!(request.query.page, 1);
        list.apply(answer(&source, request).await);
        assert_eq!(list.state().current_page(), 1);
        assert_eq!(list.items().len(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_update_trigger_refetch() -> Result<()> {
        let source = InMemorySource::new(numbered_users(2));
        let mut list: ServerSideList<UserFilters> = ServerSideList::new(10);
        let request = list.refresh();
        list.apply(answer(&source, request).await);

        let draft: AdminUserModel = user_record(
            3,
            "new@example.com",
            "Newcomer",
            crate::entities::KycStatus::Pending,
            true,
        );
        let refetch = list.create(&source, draft).await?;
        assert_eq!(list.items().len(), 2);
        list.apply(answer(&source, refetch).await);
        assert_eq!(list.items().len(), 3);

        let mut patch = list.items()[0].clone();
        patch.name = "Changed".to_string();
        let refetch = list.update(&source, patch.id, patch).await?;
        list.apply(answer(&source, refetch).await);
        assert_eq!(list.items()[0].name, "Changed");
        Ok(())
    }

    #[test]
    fn test_sort_change_resets_page_and_is_forwarded() {
        let mut list: ServerSideList<UserFilters> =
            ServerSideList::new(10).with_sort(Sort::asc("email"));
        list.set_page(4);
        let request = list.set_sort(Some(Sort::desc("createdAt")));
        assert_eq!(request.query.page, 1);
        let params = request.query.params();
        assert!(params.contains(&("sortBy".to_string(), "createdAt".to_string())));
        assert!(params.contains(&("sortOrder".to_string(), "desc".to_string())));
    }
}
