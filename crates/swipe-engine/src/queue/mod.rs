//! Card queue with a monotonic cursor
//!
//! Swiped cards stay in the list; the cursor marks the single head card.

use crate::types::{Card, ProductId, ProductRef};
use std::collections::HashSet;

/// Result of advancing the cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance<'a> {
    /// New head card
    Next(&'a Card),
    /// Cursor reached the end of the loaded cards
    Exhausted,
}

impl<'a> Advance<'a> {
    #[inline]
    #[must_use]
    pub fn card(self) -> Option<&'a Card> {
        match self {
            Advance::Next(card) => Some(card),
            Advance::Exhausted => None,
        }
    }
}

/// Ordered candidate cards plus cursor
#[derive(Debug, Clone, Default)]
pub struct CardQueue {
    cards: Vec<Card>,
    current_index: usize,
    seen: HashSet<ProductId>,
}

impl CardQueue {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fetched products as cards, skipping products already queued.
    ///
    /// Returns the number of cards actually added.
    pub fn append(&mut self, products: Vec<ProductRef>) -> usize {
        let before = self.cards.len();
        for product in products {
            if !self.seen.insert(product.id.clone()) {
                tracing::debug!(product_id = %product.id, "skipping duplicate candidate");
                continue;
            }
            let position = self.cards.len();
            self.cards.push(Card::new(product, position));
        }
        self.cards.len() - before
    }

    /// Move past the head card. The cursor never moves beyond `len()`.
    pub fn advance(&mut self) -> Advance<'_> {
        if self.current_index < self.cards.len() {
            self.current_index += 1;
        }
        match self.cards.get(self.current_index) {
            Some(card) => Advance::Next(card),
            None => Advance::Exhausted,
        }
    }

    /// The only interactive card
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&Card> {
        self.cards.get(self.current_index)
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.current_index
    }

    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Head card followed by up to `depth - 1` upcoming cards, for stacked rendering.
    #[must_use]
    pub fn visible_window(&self, depth: usize) -> &[Card] {
        let end = self.cards.len().min(self.current_index.saturating_add(depth));
        &self.cards[self.current_index..end]
    }

    /// Cards already swiped, oldest first
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[Card] {
        &self.cards[..self.current_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products(range: std::ops::Range<usize>) -> Vec<ProductRef> {
        range
            .map(|i| ProductRef::new(format!("p{i}"), format!("Product {i}")))
            .collect()
    }

    #[test]
    fn append_assigns_positions() {
        let mut q = CardQueue::new();
        assert_eq!(q.append(products(0..3)), 3);
        assert_eq!(q.append(products(3..5)), 2);
        let positions: Vec<_> = q.cards().iter().map(|c| c.queue_position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn append_skips_duplicates() {
        let mut q = CardQueue::new();
        q.append(products(0..3));
        assert_eq!(q.append(products(2..4)), 1);
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn advance_until_exhausted() {
        let mut q = CardQueue::new();
        q.append(products(0..2));
        assert_eq!(q.head().unwrap().product.id.0, "p0");
        assert_eq!(q.advance().card().unwrap().product.id.0, "p1");
        assert_eq!(q.advance(), Advance::Exhausted);
        assert_eq!(q.remaining(), 0);
        assert_eq!(q.current_index(), 2);

        // Saturates at the end
        assert_eq!(q.advance(), Advance::Exhausted);
        assert_eq!(q.current_index(), 2);
    }

    #[test]
    fn exhausted_queue_resumes_after_append() {
        let mut q = CardQueue::new();
        q.append(products(0..1));
        q.advance();
        assert!(q.head().is_none());
        q.append(products(1..2));
        assert_eq!(q.head().unwrap().product.id.0, "p1");
    }

    #[test]
    fn visible_window_starts_at_head() {
        let mut q = CardQueue::new();
        q.append(products(0..5));
        q.advance();
        let window: Vec<_> = q.visible_window(3).iter().map(|c| c.queue_position).collect();
        assert_eq!(window, vec![1, 2, 3]);
        assert_eq!(q.history().len(), 1);

        q.advance();
        q.advance();
        q.advance();
        assert_eq!(q.visible_window(3).len(), 1);
    }
}
