use crate::detail::Detail;
use crate::storage::Rank;
use std::collections::BTreeMap;

/// In-memory front shared by the database-backed storages.
///
/// Three buffers amortize round-trips to the table: `to_add` holds pending
/// inserts, `max_cache` the prefetched top of the table, `to_delete` the
/// names of prefetched rows already handed out. All ordering uses the same
/// [`Rank`] as the in-memory storage, so the cached variants are
/// placement-for-placement equivalent to it.
///
/// The cache itself never talks to the table. `push` and `pop` report when
/// the owner must sync: after `push`, when `to_add` overflowed the
/// configured capacity; after `pop`, when the winner came from `max_cache`
/// and drained it.
#[derive(Debug)]
pub struct BoxCache {
    capacity: usize,
    seq: u64,
    to_add: BTreeMap<Rank, Detail>,
    max_cache: BTreeMap<Rank, Detail>,
    to_delete: Vec<String>,
}

impl BoxCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seq: 0,
            to_add: BTreeMap::new(),
            max_cache: BTreeMap::new(),
            to_delete: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffer an insert. True means the buffer overflowed its capacity.
    pub fn push(&mut self, detail: Detail) -> bool {
        let rank = self.rank(&detail);
        self.to_add.insert(rank, detail);
        self.to_add.len() > self.capacity
    }

    /// The largest buffered rectangle. Ties between the two buffer heads
    /// resolve toward `max_cache`.
    pub fn peek(&self) -> Option<&Detail> {
        match (
            self.to_add.last_key_value(),
            self.max_cache.last_key_value(),
        ) {
            (None, None) => None,
            (Some((_, add)), None) => Some(add),
            (None, Some((_, max))) => Some(max),
            (Some((add_rank, add)), Some((max_rank, max))) => {
                match max_rank.size.total_cmp(&add_rank.size).is_ge() {
                    true => Some(max),
                    false => Some(add),
                }
            }
        }
    }

    /// Remove and return the largest buffered rectangle. A winner from
    /// `to_add` never reached the table, so it is simply dropped from the
    /// buffer; a winner from `max_cache` is remembered in `to_delete` for
    /// the next sync. True means `max_cache` drained and a refill is due.
    pub fn pop(&mut self) -> (Option<Detail>, bool) {
        let from_max = match (
            self.to_add.last_key_value(),
            self.max_cache.last_key_value(),
        ) {
            (None, None) => return (None, false),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some((add_rank, _)), Some((max_rank, _))) => {
                max_rank.size.total_cmp(&add_rank.size).is_ge()
            }
        };
        match from_max {
            true => {
                let (_, detail) = self.max_cache.pop_last().expect("head checked above");
                self.to_delete.push(detail.name.clone());
                let drained = self.max_cache.is_empty();
                (Some(detail), drained)
            }
            false => {
                let (_, detail) = self.to_add.pop_last().expect("head checked above");
                (Some(detail), false)
            }
        }
    }

    /// Take all pending inserts, leaving the buffer empty.
    pub fn drain_adds(&mut self) -> Vec<Detail> {
        std::mem::take(&mut self.to_add).into_values().collect()
    }

    /// Take all pending delete names, leaving the buffer empty.
    pub fn drain_deletes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.to_delete)
    }

    /// Replace `max_cache` with freshly fetched rows, given in descending
    /// min-side order as the table returns them.
    pub fn reload(&mut self, rows: Vec<Detail>) {
        self.max_cache.clear();
        for detail in rows {
            let rank = self.rank(&detail);
            self.max_cache.insert(rank, detail);
        }
    }

    fn rank(&mut self, detail: &Detail) -> Rank {
        self.seq += 1;
        Rank {
            size: detail.min_side(),
            seq: self.seq,
        }
    }
}
