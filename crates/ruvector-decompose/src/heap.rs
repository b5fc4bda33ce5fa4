//! Index-addressable binary min-heap.
//!
//! Entries are identified by a caller-chosen id in `[0, capacity)`. A
//! position array maps each id to its slot in the heap, so updating or
//! removing "the entry for id `r`" is an array lookup followed by a sift,
//! never a search.

/// Marker for an id that is not in the heap.
const VACANT: usize = usize::MAX;

/// Binary min-heap keyed by `usize`, with one optional entry per id.
///
/// Ties on the key are broken by id, so extraction order is fully
/// deterministic.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<V> {
    /// Heap-ordered ids.
    heap: Vec<usize>,
    /// Priority of each id; meaningful only while the id is present.
    keys: Vec<usize>,
    values: Vec<Option<V>>,
    /// Slot of each id in `heap`, or `VACANT`.
    position: Vec<usize>,
}

impl<V> IndexedMinHeap<V> {
    /// Empty heap accepting ids in `[0, capacity)`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            keys: vec![0; capacity],
            values: (0..capacity).map(|_| None).collect(),
            position: vec![VACANT; capacity],
        }
    }

    /// Largest id + 1.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.position.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: usize) -> bool {
        self.position[id] != VACANT
    }

    /// Key of `id`, if present.
    #[inline]
    pub fn key(&self, id: usize) -> Option<usize> {
        self.contains(id).then(|| self.keys[id])
    }

    #[inline]
    pub fn value(&self, id: usize) -> Option<&V> {
        self.values[id].as_ref()
    }

    #[inline]
    pub fn value_mut(&mut self, id: usize) -> Option<&mut V> {
        self.values[id].as_mut()
    }

    /// Insert `id` with `key`, or replace the entry already stored for it.
    ///
    /// # Panics
    ///
    /// Panics if `id >= capacity`.
    pub fn insert(&mut self, id: usize, key: usize, value: V) {
        if self.contains(id) {
            let old = self.keys[id];
            self.keys[id] = key;
            self.values[id] = Some(value);
            let slot = self.position[id];
            if key < old {
                self.sift_up(slot);
            } else {
                self.sift_down(slot);
            }
            return;
        }
        self.keys[id] = key;
        self.values[id] = Some(value);
        let slot = self.heap.len();
        self.heap.push(id);
        self.position[id] = slot;
        self.sift_up(slot);
    }

    /// Lower the key of a present id.
    ///
    /// Returns `false`, leaving the heap untouched, if `id` is absent or
    /// `key` is larger than its current key.
    pub fn decrease_key(&mut self, id: usize, key: usize) -> bool {
        if !self.contains(id) || key > self.keys[id] {
            return false;
        }
        self.keys[id] = key;
        self.sift_up(self.position[id]);
        true
    }

    /// `(id, key, &value)` of the minimum entry.
    pub fn peek(&self) -> Option<(usize, usize, &V)> {
        let &id = self.heap.first()?;
        let value = self.values[id].as_ref()?;
        Some((id, self.keys[id], value))
    }

    /// Remove and return the minimum entry as `(id, key, value)`.
    pub fn extract_min(&mut self) -> Option<(usize, usize, V)> {
        let &id = self.heap.first()?;
        self.remove(id).map(|(key, value)| (id, key, value))
    }

    /// Remove `id` wherever it sits in the heap.
    pub fn remove(&mut self, id: usize) -> Option<(usize, V)> {
        let slot = self.position[id];
        if slot == VACANT {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap_slots(slot, last);
        self.heap.pop();
        self.position[id] = VACANT;
        if slot < self.heap.len() {
            // The entry moved into `slot` may need to travel either way.
            self.sift_up(slot);
            self.sift_down(slot);
        }
        let value = self.values[id].take()?;
        Some((self.keys[id], value))
    }

    /// Remove every entry. Runs in O(len), not O(capacity).
    pub fn clear(&mut self) {
        for id in self.heap.drain(..) {
            self.position[id] = VACANT;
            self.values[id] = None;
        }
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        let (ia, ib) = (self.heap[a], self.heap[b]);
        (self.keys[ia], ia) < (self.keys[ib], ib)
    }

    #[inline]
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = a;
        self.position[self.heap[b]] = b;
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.less(idx, parent) {
                self.swap_slots(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let size = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut smallest = idx;

            if left < size && self.less(left, smallest) {
                smallest = left;
            }
            if right < size && self.less(right, smallest) {
                smallest = right;
            }

            if smallest == idx {
                break;
            }

            self.swap_slots(idx, smallest);
            idx = smallest;
        }
    }
}
