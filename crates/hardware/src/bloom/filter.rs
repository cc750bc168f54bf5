//! Bloom filter variants used by retention-aware maintenance policies.

use super::hash::H3Hasher;

/// A classic Bloom filter: supports insert and membership test, never
/// removal. Used to remember "this row's retention time was measured weak"
/// without storing full row ids.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    hasher: H3Hasher,
    bits: Vec<bool>,
}

impl BloomFilter {
    /// Builds an empty filter with `2^size_bits` slots and `num_hashes`
    /// independent hash functions, seeded from `seed`.
    #[must_use]
    pub fn new(seed: u64, size_bits: u32, num_hashes: usize) -> Self {
        Self {
            hasher: H3Hasher::new(seed, num_hashes, size_bits),
            bits: vec![false; 1usize << size_bits],
        }
    }

    fn slots(&self, key: u32) -> impl Iterator<Item = usize> + '_ {
        (0..self.hasher.num_hashes()).map(move |i| self.hasher.hash(i, key) as usize)
    }

    /// Marks `key` as present.
    pub fn insert(&mut self, key: u32) {
        for slot in self.slots(key).collect::<Vec<_>>() {
            self.bits[slot] = true;
        }
    }

    /// True if `key` may be present (false positives possible, false
    /// negatives never).
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.slots(key).all(|slot| self.bits[slot])
    }

    /// Clears every slot, forgetting everything inserted.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = false);
    }
}

/// A Bloom filter with per-slot saturating counters instead of bits, so a
/// key can be removed without disturbing others that happen to share a slot.
#[derive(Debug, Clone)]
pub struct CountingBloomFilter {
    hasher: H3Hasher,
    counters: Vec<u8>,
    max_counter_value: u8,
}

impl CountingBloomFilter {
    /// Builds an empty counting filter; counters saturate at `max_counter_value`.
    #[must_use]
    pub fn new(seed: u64, size_bits: u32, num_hashes: usize, max_counter_value: u8) -> Self {
        Self {
            hasher: H3Hasher::new(seed, num_hashes, size_bits),
            counters: vec![0; 1usize << size_bits],
            max_counter_value,
        }
    }

    fn slots(&self, key: u32) -> impl Iterator<Item = usize> + '_ {
        (0..self.hasher.num_hashes()).map(move |i| self.hasher.hash(i, key) as usize)
    }

    /// Increments every slot `key` hashes to, saturating at `max_counter_value`.
    pub fn insert(&mut self, key: u32) {
        for slot in self.slots(key).collect::<Vec<_>>() {
            self.counters[slot] = self.counters[slot].saturating_add(1).min(self.max_counter_value);
        }
    }

    /// Decrements every slot `key` hashes to, saturating at zero.
    pub fn remove(&mut self, key: u32) {
        for slot in self.slots(key).collect::<Vec<_>>() {
            self.counters[slot] = self.counters[slot].saturating_sub(1);
        }
    }

    /// True iff every slot `key` hashes to has saturated at
    /// `max_counter_value`, i.e. `key` has been inserted at least
    /// `max_counter_value` times (modulo hash collisions with other keys).
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.slots(key).all(|slot| self.counters[slot] >= self.max_counter_value)
    }
}

/// Two counting filters, active and passive, swapped on an epoch boundary.
///
/// Inserts land in both so membership survives a swap; a swap clears the
/// filter that becomes passive, bounding how long a stale "weak row" mark
/// can linger after the row's retention has actually recovered (e.g. after
/// a temperature drop).
#[derive(Debug, Clone)]
pub struct DualCountingBloomFilter {
    filters: [CountingBloomFilter; 2],
    active: usize,
    base_seed: u64,
    epoch: u64,
    size_bits: u32,
    num_hashes: usize,
    max_counter_value: u8,
}

impl DualCountingBloomFilter {
    /// Builds a dual filter from two independently-seeded counting filters.
    #[must_use]
    pub fn new(seed: u64, size_bits: u32, num_hashes: usize, max_counter_value: u8) -> Self {
        Self {
            filters: [
                CountingBloomFilter::new(seed, size_bits, num_hashes, max_counter_value),
                CountingBloomFilter::new(seed ^ 1, size_bits, num_hashes, max_counter_value),
            ],
            active: 0,
            base_seed: seed,
            epoch: 1,
            size_bits,
            num_hashes,
            max_counter_value,
        }
    }

    /// Inserts into both the active and passive filter.
    pub fn insert(&mut self, key: u32) {
        self.filters[0].insert(key);
        self.filters[1].insert(key);
    }

    /// True if the active filter believes `key` is present.
    #[must_use]
    pub fn contains(&self, key: u32) -> bool {
        self.filters[self.active].contains(key)
    }

    /// Swaps which filter is active, reseeding the filter that becomes
    /// passive so it can start accumulating the next epoch fresh. The
    /// reseed is still a deterministic function of the original seed and
    /// the epoch counter, never wall-clock entropy.
    pub fn swap_epoch(&mut self) {
        let passive = 1 - self.active;
        self.epoch += 1;
        self.filters[passive] = CountingBloomFilter::new(
            self.base_seed ^ self.epoch,
            self.size_bits,
            self.num_hashes,
            self.max_counter_value,
        );
        self.active = passive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_keys_are_always_reported_present() {
        let mut f = BloomFilter::new(1, 10, 3);
        for key in 0..50 {
            f.insert(key);
        }
        for key in 0..50 {
            assert!(f.contains(key));
        }
    }

    #[test]
    fn clear_forgets_every_inserted_key() {
        let mut f = BloomFilter::new(1, 10, 3);
        f.insert(7);
        f.clear();
        // A cleared filter may still collide by chance on some other key,
        // but slot 7's own hash positions are now definitely zeroed unless
        // another insert touched them, which none has.
        assert!(!f.bits.iter().all(|&b| b));
    }

    #[test]
    fn counting_filter_contains_only_once_every_slot_saturates() {
        let mut f = CountingBloomFilter::new(1, 10, 3, 3);
        assert!(!f.contains(42));
        f.insert(42);
        assert!(!f.contains(42));
        f.insert(42);
        assert!(!f.contains(42));
        f.insert(42);
        assert!(f.contains(42));
    }

    #[test]
    fn counting_filter_remove_reverses_a_matching_insert() {
        let mut f = CountingBloomFilter::new(1, 10, 3, 1);
        f.insert(42);
        assert!(f.contains(42));
        f.remove(42);
        assert!(!f.contains(42));
    }

    #[test]
    fn counting_filter_insert_on_an_already_saturated_bucket_is_a_no_op() {
        let mut f = CountingBloomFilter::new(1, 10, 3, 2);
        f.insert(42);
        f.insert(42);
        f.insert(42); // a third insert must not push the counter past max_counter_value
        assert!(f.contains(42));
        f.remove(42);
        assert!(!f.contains(42));
    }

    #[test]
    fn dual_filter_keeps_membership_across_a_swap() {
        let mut f = DualCountingBloomFilter::new(1, 10, 3, 1);
        f.insert(42);
        assert!(f.contains(42));
        f.swap_epoch();
        // membership is now tracked by what was the passive filter, which
        // also received the insert above.
        assert!(f.contains(42));
    }
}
