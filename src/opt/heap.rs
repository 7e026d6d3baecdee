use crate::layers::error::Error;

/// Binary min-heap over dense item indices with decrease-key.
///
/// Each item's score lives in the heap's own score table and stays readable
/// after the item is popped, which is how Dijkstra keeps its tentative
/// distances. A position table makes `decrease_if_smaller` logarithmic.
/// Ties are never swapped, so equal scores keep their relative heap order.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<S> {
    heap: Vec<usize>,
    position: Vec<Option<usize>>,
    scores: Vec<Option<S>>,
}

impl<S: Copy + Ord> IndexedMinHeap<S> {
    /// A heap that can hold items `0..capacity`; larger items grow the tables
    pub fn with_capacity(capacity: usize) -> Self {
        IndexedMinHeap {
            heap: Vec::with_capacity(capacity),
            position: vec![None; capacity],
            scores: vec![None; capacity],
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: usize) -> bool {
        matches!(self.position.get(item), Some(Some(_)))
    }

    /// Last score recorded for `item`, whether or not it is still queued
    pub fn score(&self, item: usize) -> Option<S> {
        self.scores.get(item).copied().flatten()
    }

    /// Forget every item and score
    pub fn clear(&mut self) {
        self.heap.clear();
        self.position.iter_mut().for_each(|p| *p = None);
        self.scores.iter_mut().for_each(|s| *s = None);
    }

    pub fn insert(&mut self, item: usize, score: S) -> Result<(), Error> {
        if self.contains(item) {
            return Err(Error::AlreadyInHeap(item));
        }
        if item >= self.position.len() {
            self.position.resize(item + 1, None);
            self.scores.resize(item + 1, None);
        }
        self.scores[item] = Some(score);
        self.position[item] = Some(self.heap.len());
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
        Ok(())
    }

    /// Remove and return the item with the lowest score
    pub fn pop_min(&mut self) -> Result<usize, Error> {
        if self.heap.is_empty() {
            return Err(Error::EmptyHeap);
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let min = self.heap.pop().ok_or(Error::EmptyHeap)?;
        self.position[min] = None;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    /// Lower the score of a queued item if `score` beats it.
    ///
    /// Returns whether the score changed.
    pub fn decrease_if_smaller(&mut self, item: usize, score: S) -> Result<bool, Error> {
        let idx = match self.position.get(item) {
            Some(&Some(idx)) => idx,
            _ => return Err(Error::NotInHeap(item)),
        };
        match self.scores[item] {
            Some(current) if score >= current => Ok(false),
            _ => {
                self.scores[item] = Some(score);
                self.sift_up(idx);
                Ok(true)
            }
        }
    }

    fn key(&self, idx: usize) -> Option<S> {
        self.scores[self.heap[idx]]
    }

    // None sorts below Some, but every queued item has a score
    fn less(&self, a: usize, b: usize) -> bool {
        self.key(a) < self.key(b)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = Some(a);
        self.position[self.heap[b]] = Some(b);
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.less(idx, parent) {
                break;
            }
            self.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap(idx, smallest);
            idx = smallest;
        }
    }

    /// Whether every parent scores no higher than its children and the
    /// position table agrees with the heap
    pub fn is_valid(&self) -> bool {
        (1..self.heap.len()).all(|i| !self.less(i, (i - 1) / 2))
            && self
                .heap
                .iter()
                .enumerate()
                .all(|(i, &item)| self.position[item] == Some(i))
    }
}
