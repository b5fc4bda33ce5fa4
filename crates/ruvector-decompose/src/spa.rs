//! Sparse accumulator (SPA).
//!
//! Accumulates scalar contributions keyed by row and hands them back in
//! ascending row order without ever sorting. Rows live in an
//! [`IndexedMinHeap`] whose id and key are both the row number, so "update
//! row `r`" is an index operation and the heap minimum is always the lowest
//! row still pending.
//!
//! A single accumulator is reused for every column of one sparse LU run:
//! seeded, scanned, drained, repeat.

use crate::heap::IndexedMinHeap;
use crate::scalar::Scalar;

/// Sparse accumulator over rows `[0, rows)`.
#[derive(Debug, Clone)]
pub struct Spa<T> {
    heap: IndexedMinHeap<T>,
    /// Entries already visited by [`next_up_to`](Self::next_up_to), in
    /// visit order. They are out of the heap until [`restore`](Self::restore).
    parked: Vec<(usize, T)>,
    /// `parked_at[row]` is the slot of `row` in `parked`, or [`NOT_PARKED`].
    parked_at: Vec<usize>,
}

const NOT_PARKED: usize = usize::MAX;

impl<T: Scalar> Spa<T> {
    /// Empty accumulator for rows `[0, rows)`.
    pub fn new(rows: usize) -> Self {
        Self {
            heap: IndexedMinHeap::with_capacity(rows),
            parked: Vec::new(),
            parked_at: vec![NOT_PARKED; rows],
        }
    }

    /// Number of rows currently holding a value (zero values included).
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len() + self.parked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` at `row`, replacing any previous value.
    pub fn set(&mut self, row: usize, value: T) {
        debug_assert!(!self.is_parked(row), "row {row} is parked");
        self.heap.insert(row, row, value);
    }

    /// Value at `row`, or zero if nothing has been stored there.
    pub fn get(&self, row: usize) -> T {
        if let Some(v) = self.heap.value(row) {
            return v.clone();
        }
        match self.parked_at.get(row) {
            Some(&slot) if slot != NOT_PARKED => self.parked[slot].1.clone(),
            _ => T::zero(),
        }
    }

    /// `spa[row] += value`, creating the row if absent.
    ///
    /// The stored entry is kept even if the sum is zero; zeros are only
    /// filtered when the accumulator is read out.
    pub fn accumulate(&mut self, row: usize, value: T) {
        debug_assert!(!self.is_parked(row), "row {row} is parked");
        match self.heap.value_mut(row) {
            Some(v) => *v = v.add(&value),
            None => self.heap.insert(row, row, value),
        }
    }

    /// Exchange the values held at rows `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        match (self.heap.remove(a), self.heap.remove(b)) {
            (Some((_, va)), Some((_, vb))) => {
                self.heap.insert(a, a, vb);
                self.heap.insert(b, b, va);
            }
            (Some((_, va)), None) => self.heap.insert(b, b, va),
            (None, Some((_, vb))) => self.heap.insert(a, a, vb),
            (None, None) => {}
        }
    }

    /// Call `f(row, &value)` for every non-zero entry with
    /// `from <= row <= to`, in ascending row order.
    ///
    /// The accumulator's contents are unchanged afterwards.
    pub fn for_each<F: FnMut(usize, &T)>(&mut self, from: usize, to: usize, mut f: F) {
        let mut visited = Vec::new();
        while let Some((row, _, _)) = self.heap.peek() {
            if row > to {
                break;
            }
            let Some((_, value)) = self.heap.remove(row) else {
                break;
            };
            if row >= from && !value.is_zero() {
                f(row, &value);
            }
            visited.push((row, value));
        }
        for (row, value) in visited {
            self.heap.insert(row, row, value);
        }
    }

    /// Advance an ascending scan: return the lowest pending row `<= to` with
    /// a non-zero value, parking every entry it passes.
    ///
    /// Between calls the caller may [`accumulate`](Self::accumulate) into
    /// rows above the last one returned; those rows are picked up by later
    /// calls in order. [`restore`](Self::restore) ends the scan.
    pub fn next_up_to(&mut self, to: usize) -> Option<(usize, T)> {
        loop {
            let (row, _, _) = self.heap.peek()?;
            if row > to {
                return None;
            }
            let (_, value) = self.heap.remove(row)?;
            let hit = (!value.is_zero()).then(|| value.clone());
            self.parked_at[row] = self.parked.len();
            self.parked.push((row, value));
            if let Some(v) = hit {
                return Some((row, v));
            }
        }
    }

    /// Return every parked entry to the heap.
    pub fn restore(&mut self) {
        for (row, value) in self.parked.drain(..) {
            self.parked_at[row] = NOT_PARKED;
            self.heap.insert(row, row, value);
        }
    }

    /// Remove and return every non-zero entry in ascending row order,
    /// leaving the accumulator empty.
    pub fn drain(&mut self) -> Vec<(usize, T)> {
        self.restore();
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some((row, _, value)) = self.heap.extract_min() {
            if !value.is_zero() {
                out.push((row, value));
            }
        }
        out
    }

    /// Discard everything. O(len).
    pub fn clear(&mut self) {
        self.heap.clear();
        for (row, _) in self.parked.drain(..) {
            self.parked_at[row] = NOT_PARKED;
        }
    }

    fn is_parked(&self, row: usize) -> bool {
        self.parked_at.get(row).is_some_and(|&slot| slot != NOT_PARKED)
    }
}
