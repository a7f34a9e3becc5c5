//! Skip request engine
//!
//! Guests may ask the host to skip any queued item. Requests wait for an
//! explicit host decision; the queue mutation itself is the session
//! controller's job (it may need a playback skip first).

use party_core::{ItemId, MemberId, PendingSkipRequest};
use uuid::Uuid;

/// Pending skip requests
#[derive(Debug, Default)]
pub struct SkipRequestEngine {
    pending: Vec<PendingSkipRequest>,
}

impl SkipRequestEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a request; duplicates per (item, member) are ignored
    pub fn request(&mut self, item_id: ItemId, requested_by: MemberId) -> Option<&PendingSkipRequest> {
        if self
            .pending
            .iter()
            .any(|r| r.item_id == item_id && r.requested_by == requested_by)
        {
            return None;
        }
        self.pending.push(PendingSkipRequest::new(item_id, requested_by));
        self.pending.last()
    }

    /// Take a request out for approval
    pub fn approve(&mut self, id: Uuid) -> Option<PendingSkipRequest> {
        self.take(id)
    }

    /// Discard a request
    pub fn reject(&mut self, id: Uuid) -> Option<PendingSkipRequest> {
        self.take(id)
    }

    fn take(&mut self, id: Uuid) -> Option<PendingSkipRequest> {
        let idx = self.pending.iter().position(|r| r.id == id)?;
        Some(self.pending.remove(idx))
    }

    /// Drop all requests targeting an item that left the queue
    pub fn drop_for_item(&mut self, item_id: &ItemId) {
        self.pending.retain(|r| &r.item_id != item_id);
    }

    #[must_use]
    pub fn pending(&self) -> &[PendingSkipRequest] {
        &self.pending
    }
}
