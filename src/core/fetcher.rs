//! Async driver for server-side lists.
//!
//! Each dispatched [`PageRequest`] runs as its own tokio task and reports back over an mpsc
//! channel. Dispatching a new request aborts the one still in flight. Aborting is only a saving:
//! a response that slips out before the abort lands is still caught by
//! [`ServerSideList::apply`] as stale.

use crate::{
    core::{
        filters::ListFilter,
        list_state::LoadState,
        server_list::{ApplyOutcome, PageRequest, PageResponse, RequestId, ServerSideList},
        source::PageSource,
    },
    entities::Record,
    errors::{Error, Result},
};
use std::sync::Arc;
use tokio::{sync::mpsc, task::AbortHandle};
use tracing::{debug, trace};

/// Runs page requests against one source, one in flight at a time.
pub struct PageFetcher<S, F: ListFilter> {
    source: Arc<S>,
    in_flight: Option<(RequestId, AbortHandle)>,
    tx: mpsc::UnboundedSender<PageResponse<F>>,
    rx: mpsc::UnboundedReceiver<PageResponse<F>>,
}

impl<S, F> PageFetcher<S, F>
where
    S: PageSource<F> + 'static,
    F: ListFilter,
    F::Item: Record,
{
    pub fn new(source: Arc<S>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            in_flight: None,
            tx,
            rx,
        }
    }

    /// Starts fetching `request`, aborting the previous request if it has not finished.
    pub fn dispatch(&mut self, request: PageRequest<F>) {
        if let Some((id, handle)) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!(request_id = id, "Aborting superseded page request");
                handle.abort();
            }
        }

        let id = request.id;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let result = source.fetch_page(&request.query).await;
            // The fetcher may have been dropped in the meantime
            let _ = tx.send(PageResponse { request, result });
        });
        trace!(request_id = id, "Dispatched page request");
        self.in_flight = Some((id, task.abort_handle()));
    }

    /// Waits for the next response from any dispatched request.
    pub async fn next_response(&mut self) -> Option<PageResponse<F>> {
        self.rx.recv().await
    }

    /// Feeds responses to `list` until its newest request has been applied.
    ///
    /// Stale responses are skipped and step-back requests are dispatched along the way. Every
    /// request the list produced must have been dispatched, or this never returns. Returns the
    /// source's error if the applied response was a failure.
    pub async fn settle(&mut self, list: &mut ServerSideList<F>) -> Result<()> {
        while list.is_pending() {
            let Some(response) = self.next_response().await else {
                break;
            };
            match list.apply(response) {
                ApplyOutcome::Applied | ApplyOutcome::Stale => {}
                ApplyOutcome::Reissued(request) => self.dispatch(request),
            }
        }
        match list.load_state() {
            LoadState::Error(message) => Err(Error::Source {
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Dispatches `request` and settles `list`.
    pub async fn load(
        &mut self,
        list: &mut ServerSideList<F>,
        request: PageRequest<F>,
    ) -> Result<()> {
        self.dispatch(request);
        self.settle(list).await
    }
}

impl<S, F: ListFilter> Drop for PageFetcher<S, F> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.in_flight.take() {
            handle.abort();
        }
    }
}
