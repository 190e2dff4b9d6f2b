//! Z-order deck of panels.
//!
//! Every node owns exactly one [`PanelHandle`]. The handle is the only way to
//! restack its panel, and dropping it removes the panel from the deck, so a
//! node that is dropped can never leave a stale entry behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(u64);

#[derive(Debug, Clone, Copy)]
struct PanelEntry {
    id: PanelId,
    hidden: bool,
}

#[derive(Debug, Default)]
struct DeckState {
    // bottom .. top
    order: Vec<PanelEntry>,
    next_id: u64,
}

impl DeckState {
    fn position(&self, id: PanelId) -> Option<usize> {
        self.order.iter().position(|entry| entry.id == id)
    }

    fn raise(&mut self, id: PanelId) {
        if let Some(pos) = self.position(id) {
            let entry = self.order.remove(pos);
            self.order.push(entry);
        }
    }

    fn lower(&mut self, id: PanelId) {
        if let Some(pos) = self.position(id) {
            let entry = self.order.remove(pos);
            self.order.insert(0, entry);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PanelDeck {
    inner: Rc<RefCell<DeckState>>,
}

impl PanelDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new panel on top of the deck.
    pub fn create(&self) -> PanelHandle {
        let mut state = self.inner.borrow_mut();
        let id = PanelId(state.next_id);
        state.next_id = state.next_id.saturating_add(1);
        state.order.push(PanelEntry { id, hidden: false });
        PanelHandle {
            id,
            deck: Rc::downgrade(&self.inner),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shown panels from bottom to top.
    pub fn visible_order(&self) -> Vec<PanelId> {
        self.inner
            .borrow()
            .order
            .iter()
            .filter(|entry| !entry.hidden)
            .map(|entry| entry.id)
            .collect()
    }

    pub fn top_visible(&self) -> Option<PanelId> {
        self.inner
            .borrow()
            .order
            .iter()
            .rev()
            .find(|entry| !entry.hidden)
            .map(|entry| entry.id)
    }
}

/// Owned z-order slot of one node.
#[derive(Debug)]
pub struct PanelHandle {
    id: PanelId,
    deck: Weak<RefCell<DeckState>>,
}

impl PanelHandle {
    pub fn id(&self) -> PanelId {
        self.id
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut DeckState) -> T) -> Option<T> {
        let deck = self.deck.upgrade()?;
        let mut state = deck.borrow_mut();
        Some(f(&mut state))
    }

    pub fn top(&self) {
        self.with_state(|state| state.raise(self.id));
    }

    pub fn bottom(&self) {
        self.with_state(|state| state.lower(self.id));
    }

    /// Take the panel off screen without giving up its slot.
    pub fn hide(&self) {
        self.with_state(|state| {
            if let Some(pos) = state.position(self.id) {
                state.order[pos].hidden = true;
                state.lower(self.id);
            }
        });
    }

    /// Put a hidden panel back on screen, on top of the deck.
    pub fn show(&self) {
        self.with_state(|state| {
            if let Some(pos) = state.position(self.id) {
                state.order[pos].hidden = false;
                state.raise(self.id);
            }
        });
    }

    pub fn is_hidden(&self) -> bool {
        self.with_state(|state| {
            state
                .position(self.id)
                .map(|pos| state.order[pos].hidden)
                .unwrap_or(true)
        })
        .unwrap_or(true)
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        if let Some(deck) = self.deck.upgrade() {
            deck.borrow_mut().order.retain(|entry| entry.id != self.id);
        }
    }
}
