//! Two-step deletion.
//!
//! A list hands out a [`DeleteRequest`] for a row it is showing. Only calling
//! [`DeleteRequest::confirm`] produces the [`ConfirmedDelete`] that the list's `delete`
//! operation accepts, so no mutating call can be issued without the confirmation step.

/// Deletion awaiting the user's confirmation
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete request does nothing until it is confirmed"]
pub struct DeleteRequest {
    id: i64,
}

impl DeleteRequest {
    pub(crate) const fn new(id: i64) -> Self {
        Self { id }
    }

    /// Record the confirmation dialog is about
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// The user confirmed.
    pub const fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete { id: self.id }
    }

    /// The user backed out; nothing is sent.
    pub fn cancel(self) {
        tracing::debug!(id = self.id, "delete cancelled");
    }
}

/// Deletion the user has confirmed
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmedDelete {
    id: i64,
}

impl ConfirmedDelete {
    pub const fn id(&self) -> i64 {
        self.id
    }
}
