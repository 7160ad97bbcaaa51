mod cache;
mod database;
mod memory;
mod partitioned;

pub use cache::*;
pub use database::*;
pub use memory::*;
pub use partitioned::*;

use crate::algorithm::PackError;
use crate::detail::Detail;

/// Max-priority multiset of boxes keyed by the shorter side.
///
/// `peek_max` must be stable: the same storage state always yields the same
/// rectangle, and popping right after peeking removes exactly that one.
#[async_trait::async_trait]
pub trait BoxStorage: Send {
    async fn add(&mut self, detail: Detail) -> Result<(), PackError>;
    /// the stored rectangle maximizing min(width, height), not removed
    async fn peek_max(&self) -> Result<Option<Detail>, PackError>;
    /// as peek, and remove it
    async fn pop_max(&mut self) -> Result<Option<Detail>, PackError>;
}

/// Priority of a stored box: shorter side first, insertion order second.
/// A greater rank means a larger min side; among equal min sides the
/// earlier insertion ranks greater, so equal keys leave storage in FIFO
/// order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rank {
    pub size: f64,
    pub seq: u64,
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Rank {}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.size
            .total_cmp(&other.size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
