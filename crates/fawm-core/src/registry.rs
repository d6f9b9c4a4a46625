//! Growable ordered registry of frame handles.
//!
//! Two registries exist at runtime: every live frame in creation order, and
//! the mapped frames in front-to-back stacking order. Elements are plain
//! handles, so a frame can sit in both without duplicating its state.

/// Number of slots added whenever capacity runs out.
const GROWTH_CHUNK: usize = 8;

/// An ordered collection of `Copy` handles with identity-based removal.
///
/// Callers must not insert the same handle twice; no duplicate detection is
/// performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Copy + PartialEq> Registry<T> {
    /// An empty registry with zero capacity.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn ensure_room(&mut self) {
        if self.items.len() == self.items.capacity() {
            self.items.reserve_exact(GROWTH_CHUNK);
        }
    }

    /// Add an item after every existing one.
    pub fn append(&mut self, item: T) {
        self.ensure_room();
        self.items.push(item);
    }

    /// Add an item before every existing one.
    pub fn prepend(&mut self, item: T) {
        self.ensure_room();
        self.items.insert(0, item);
    }

    /// Remove the first element equal to `item`. Absent items are a no-op.
    ///
    /// Returns whether something was removed.
    pub fn remove(&mut self, item: T) -> bool {
        match self.position(item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove `item` wherever it is and put it at the front.
    pub fn move_to_front(&mut self, item: T) {
        self.remove(item);
        self.prepend(item);
    }

    /// First element matching `pred`, scanning front to back.
    pub fn search<P>(&self, mut pred: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().copied().find(|item| pred(item))
    }

    pub fn position(&self, item: T) -> Option<usize> {
        self.items.iter().position(|&other| other == item)
    }

    pub fn contains(&self, item: T) -> bool {
        self.position(item).is_some()
    }

    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + ExactSizeIterator + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
