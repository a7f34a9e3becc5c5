//! Ordered queue engine
//!
//! An ordered list of queue items plus a nullable cursor denoting "now
//! playing". All mutations assume single-writer access: the cursor
//! arithmetic reads and writes the same snapshot, so calls must never
//! interleave. The session controller task is that single writer.
//!
//! This engine is purely structural. It never touches vote sets or member
//! data.

use party_core::{DomainError, ItemId, QueueItem};

/// Ordered queue of items with a now-playing cursor
#[derive(Debug, Default)]
pub struct QueueEngine {
    items: Vec<QueueItem>,
    cursor: Option<usize>,
}

impl QueueEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Read surface ===

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in order
    #[must_use]
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// Cloned snapshot of the queue, for state projection
    #[must_use]
    pub fn items_snapshot(&self) -> Vec<QueueItem> {
        self.items.clone()
    }

    /// The item at the cursor
    #[must_use]
    pub fn current(&self) -> Option<&QueueItem> {
        self.cursor.and_then(|c| self.items.get(c))
    }

    #[must_use]
    pub fn current_id(&self) -> Option<ItemId> {
        self.current().map(|i| i.id)
    }

    /// The item immediately after the cursor ("next up")
    #[must_use]
    pub fn next_up(&self) -> Option<&QueueItem> {
        self.cursor.and_then(|c| self.items.get(c + 1))
    }

    #[must_use]
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.position_of(id).is_some()
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Mutable item access, for vote-set updates by the voting engine
    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut QueueItem> {
        self.items.iter_mut().find(|i| &i.id == id)
    }

    /// Find an item by playback catalog track id
    #[must_use]
    pub fn find_by_track(&self, track_id: &str) -> Option<&QueueItem> {
        self.items.iter().find(|i| i.track.track_id == track_id)
    }

    #[must_use]
    pub fn is_current(&self, id: &ItemId) -> bool {
        self.current().is_some_and(|i| &i.id == id)
    }

    #[must_use]
    pub fn is_next_up(&self, id: &ItemId) -> bool {
        self.next_up().is_some_and(|i| &i.id == id)
    }

    /// Whether the item lies before the cursor (already played)
    #[must_use]
    pub fn is_played(&self, id: &ItemId) -> bool {
        match (self.position_of(id), self.cursor) {
            (Some(idx), Some(cur)) => idx < cur,
            _ => false,
        }
    }

    /// Catalog track ids in queue order, for handing to the playback engine
    #[must_use]
    pub fn track_ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.track.track_id.clone()).collect()
    }

    // === Structural mutations ===

    /// Push an item to the end; the first item ever appended becomes current
    pub fn append(&mut self, item: QueueItem) {
        self.items.push(item);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    /// Delete by identifier, preserving cursor semantics
    ///
    /// Removing an item before the cursor shifts the cursor down by one.
    /// Removing the cursor item keeps the cursor at the same numeric
    /// position, which now denotes the item that used to be next, clamped
    /// into bounds (or unset when the queue became empty).
    pub fn remove(&mut self, id: &ItemId) -> Option<QueueItem> {
        let idx = self.position_of(id)?;
        let item = self.items.remove(idx);

        self.cursor = match self.cursor {
            None => None,
            Some(cur) if idx < cur => Some(cur - 1),
            Some(cur) if idx == cur => {
                if self.items.is_empty() {
                    None
                } else {
                    Some(cur.min(self.items.len() - 1))
                }
            }
            Some(cur) => Some(cur),
        };

        Some(item)
    }

    /// Remove and re-append, sharing the removal's cursor rule
    pub fn move_to_end(&mut self, id: &ItemId) -> Result<(), DomainError> {
        let item = self.remove(id).ok_or(DomainError::ItemNotFound(*id))?;
        self.append(item);
        Ok(())
    }

    /// Re-insert an item immediately after the (possibly shifted) cursor
    ///
    /// No-op when the target is the current item. With no cursor the item
    /// moves to the front and becomes current.
    pub fn move_behind_current(&mut self, id: &ItemId) -> Result<(), DomainError> {
        if self.is_current(id) {
            return Ok(());
        }
        let item = self.remove(id).ok_or(DomainError::ItemNotFound(*id))?;

        match self.cursor {
            Some(cur) => {
                let insert_at = (cur + 1).min(self.items.len());
                self.items.insert(insert_at, item);
            }
            None => {
                self.items.insert(0, item);
                self.cursor = Some(0);
            }
        }
        Ok(())
    }

    /// Move the cursor to the next index, returning the new current item
    ///
    /// Returns `None` at the end of the queue; the caller decides what end
    /// of queue means (stop playback, clear now-playing).
    pub fn advance(&mut self) -> Option<&QueueItem> {
        let next = self.cursor? + 1;
        if next < self.items.len() {
            self.cursor = Some(next);
            self.items.get(next)
        } else {
            None
        }
    }

    /// Point the cursor at an existing item (playback reported a jump)
    pub fn jump_to(&mut self, id: &ItemId) -> bool {
        match self.position_of(id) {
            Some(idx) => {
                self.cursor = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Reorder within the upcoming region
    ///
    /// Offsets are relative to just after the cursor (the whole list when no
    /// cursor exists), so the current item can never be addressed. Source
    /// offsets out of range reject the whole operation; the destination is
    /// clamped into the upcoming region after accounting for removals that
    /// precede it.
    pub fn reorder_upcoming(
        &mut self,
        source_offsets: &[usize],
        destination_offset: usize,
    ) -> Result<(), DomainError> {
        let base = self.cursor.map_or(0, |c| c + 1);
        let upcoming_len = self.items.len().saturating_sub(base);

        for &offset in source_offsets {
            if offset >= upcoming_len {
                return Err(DomainError::OffsetOutOfRange {
                    offset,
                    len: upcoming_len,
                });
            }
        }
        if source_offsets.is_empty() {
            return Ok(());
        }

        let mut absolute: Vec<usize> = source_offsets.iter().map(|&o| base + o).collect();
        absolute.sort_unstable();
        absolute.dedup();

        // Removals before the destination shift it left
        let dest_absolute = base + destination_offset;
        let shift = absolute.iter().filter(|&&i| i < dest_absolute).count();

        // Remove highest-first so earlier indices stay valid, then restore
        // the selection's original order
        let mut moved: Vec<QueueItem> = Vec::with_capacity(absolute.len());
        for &idx in absolute.iter().rev() {
            moved.push(self.items.remove(idx));
        }
        moved.reverse();

        let remaining_upcoming = self.items.len().saturating_sub(base);
        let dest = destination_offset
            .saturating_sub(shift)
            .min(remaining_upcoming);

        for (k, item) in moved.into_iter().enumerate() {
            self.items.insert(base + dest + k, item);
        }
        Ok(())
    }
}
