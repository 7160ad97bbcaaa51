use crate::algorithm::PackError;
use crate::detail::Detail;
use crate::storage::BoxStorage;
use crate::storage::Rank;
use std::collections::BTreeMap;

/// Box storage held entirely in memory: an ordered map over [`Rank`],
/// O(log N) per operation.
#[derive(Debug, Default)]
pub struct InMemoryBoxStorage {
    boxes: BTreeMap<Rank, Detail>,
    seq: u64,
}

impl InMemoryBoxStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// stored boxes in descending priority order
    pub fn boxes(&self) -> impl Iterator<Item = &Detail> {
        self.boxes.values().rev()
    }

    fn rank(&mut self, detail: &Detail) -> Rank {
        self.seq += 1;
        Rank {
            size: detail.min_side(),
            seq: self.seq,
        }
    }
}

#[async_trait::async_trait]
impl BoxStorage for InMemoryBoxStorage {
    async fn add(&mut self, detail: Detail) -> Result<(), PackError> {
        let rank = self.rank(&detail);
        self.boxes.insert(rank, detail);
        Ok(())
    }

    async fn peek_max(&self) -> Result<Option<Detail>, PackError> {
        Ok(self.boxes.last_key_value().map(|(_, d)| d.clone()))
    }

    async fn pop_max(&mut self) -> Result<Option<Detail>, PackError> {
        Ok(self.boxes.pop_last().map(|(_, d)| d))
    }
}
