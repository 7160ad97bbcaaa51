use super::database::copy_details;
use super::database::delete_names;
use super::database::row_to_detail;
use super::database::INSERT_BATCH;
use super::database::SELECT_COLUMNS;
use crate::algorithm::PackError;
use crate::detail::Detail;
use crate::storage::BoxCache;
use crate::storage::BoxStorage;
use std::sync::Arc;
use tokio_postgres::Client;

/// Box storage backed by a range-partitioned PostgreSQL table.
///
/// Partition boundaries follow the arrival distribution of the harmonic
/// streams: a normal box above detail index n typically has min side around
/// 1/n^gamma, so consecutive index blocks of `boxes_per_partition` details
/// map to consecutive min_size ranges and the partitions fill roughly
/// uniformly. The prefetch walks partitions from the largest range down,
/// which touches only as many partitions as the cache needs.
pub struct PartitionedBoxStorage {
    client: Arc<Client>,
    table: String,
    cache: BoxCache,
    partitions: Vec<(f64, f64)>,
}

impl PartitionedBoxStorage {
    #[allow(clippy::too_many_arguments)]
    pub async fn new(
        client: Arc<Client>,
        table: &str,
        cache_size: usize,
        n0: usize,
        gamma: f64,
        max_placed: usize,
        boxes_per_partition: usize,
    ) -> Result<Self, PackError> {
        if gamma <= 0.0 {
            return Err(PackError::InvalidConfiguration(
                "gamma must be positive".to_string(),
            ));
        }
        if n0 == 0 {
            return Err(PackError::InvalidConfiguration(
                "n0 must be a positive integer".to_string(),
            ));
        }
        if boxes_per_partition == 0 {
            return Err(PackError::InvalidConfiguration(
                "boxes_per_partition must be a positive integer".to_string(),
            ));
        }
        if cache_size == 0 {
            return Err(PackError::InvalidConfiguration(
                "cache_size must be a positive integer".to_string(),
            ));
        }
        let this = Self {
            client,
            table: table.to_string(),
            cache: BoxCache::new(cache_size),
            partitions: Self::partition_ranges(n0, gamma, max_placed, boxes_per_partition),
        };
        this.install().await?;
        Ok(this)
    }

    /// Partition i covers min_size in [(1/(n0+(i+1)B))^gamma,
    /// (1/(n0+iB))^gamma), with the first range topped at 1 and the last
    /// floored at 0 so the whole (0, 1] axis is covered.
    pub fn partition_ranges(
        n0: usize,
        gamma: f64,
        max_placed: usize,
        boxes_per_partition: usize,
    ) -> Vec<(f64, f64)> {
        let count = std::cmp::max(1, max_placed.div_ceil(boxes_per_partition));
        (0..count)
            .map(|i| {
                let first = (n0 + i * boxes_per_partition) as f64;
                let last = (n0 + (i + 1) * boxes_per_partition) as f64;
                let lo = match i + 1 == count {
                    true => 0.0,
                    false => (1.0 / last).powf(gamma),
                };
                let hi = match i {
                    0 => 1.0,
                    _ => (1.0 / first).powf(gamma),
                };
                (lo, hi)
            })
            .collect()
    }

    async fn install(&self) -> Result<(), PackError> {
        log::info!(
            "creating partitioned boxes table ({}, {} partitions)",
            self.table,
            self.partitions.len()
        );
        let mut ddl = format!(
            "
            DROP TABLE IF EXISTS {table} CASCADE;
            CREATE TABLE {table} (
                id             BIGSERIAL,
                bottom_left_x  DOUBLE PRECISION,
                bottom_left_y  DOUBLE PRECISION,
                top_right_x    DOUBLE PRECISION,
                top_right_y    DOUBLE PRECISION,
                min_size       DOUBLE PRECISION,
                name           TEXT,
                detail_type    TEXT,
                PRIMARY KEY (id, min_size)
            ) PARTITION BY RANGE (min_size);
            CREATE INDEX idx_{table}_min_size ON {table} (min_size);
            ",
            table = self.table
        );
        for (i, (lo, hi)) in self.partitions.iter().enumerate() {
            ddl.push_str(&format!(
                "CREATE TABLE {table}_{n} PARTITION OF {table} FOR VALUES FROM ({lo}) TO ({hi});\n",
                table = self.table,
                n = i + 1,
                lo = lo,
                hi = hi
            ));
        }
        self.client.batch_execute(&ddl).await?;
        Ok(())
    }

    async fn sync(&mut self) -> Result<(), PackError> {
        let adds = self.cache.drain_adds();
        let deletes = self.cache.drain_deletes();
        log::debug!(
            "syncing partitioned box storage ({} inserts, {} deletes)",
            adds.len(),
            deletes.len()
        );
        for chunk in adds.chunks(INSERT_BATCH) {
            copy_details(&self.client, &self.table, chunk).await?;
        }
        if !deletes.is_empty() {
            delete_names(&self.client, &self.table, &deletes).await?;
        }
        self.refill().await
    }

    /// Walk partitions in range order, largest min sides first, until the
    /// cache is full or the partitions run out.
    async fn refill(&mut self) -> Result<(), PackError> {
        let mut details = Vec::new();
        let mut remaining = self.cache.capacity();
        for index in 1..=self.partitions.len() {
            if remaining == 0 {
                break;
            }
            let sql = format!(
                "{}{}_{} ORDER BY min_size DESC LIMIT {}",
                SELECT_COLUMNS, self.table, index, remaining
            );
            let rows = self.client.query(&sql, &[]).await?;
            remaining -= rows.len();
            for row in rows.iter() {
                details.push(row_to_detail(row)?);
            }
        }
        self.cache.reload(details);
        Ok(())
    }
}

#[async_trait::async_trait]
impl BoxStorage for PartitionedBoxStorage {
    async fn add(&mut self, detail: Detail) -> Result<(), PackError> {
        if self.cache.push(detail) {
            self.sync().await?;
        }
        Ok(())
    }

    async fn peek_max(&self) -> Result<Option<Detail>, PackError> {
        Ok(self.cache.peek().cloned())
    }

    async fn pop_max(&mut self) -> Result<Option<Detail>, PackError> {
        let (detail, drained) = self.cache.pop();
        if drained {
            self.sync().await?;
        }
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_count_is_ceiling_of_quota() {
        assert!(PartitionedBoxStorage::partition_ranges(100, 4.0 / 3.0, 10, 4).len() == 3);
        assert!(PartitionedBoxStorage::partition_ranges(100, 4.0 / 3.0, 8, 4).len() == 2);
        assert!(PartitionedBoxStorage::partition_ranges(100, 4.0 / 3.0, 0, 4).len() == 1);
    }

    #[test]
    fn ranges_are_contiguous_and_descending() {
        let gamma = 4.0 / 3.0;
        let ranges = PartitionedBoxStorage::partition_ranges(100, gamma, 10, 4);
        assert!(ranges[0].1 == 1.0);
        assert!(ranges[ranges.len() - 1].0 == 0.0);
        for pair in ranges.windows(2) {
            assert!(pair[0].0 == pair[1].1);
            assert!(pair[0].0 > pair[1].0);
        }
        // interior bound: block boundary at n0 + B details
        assert!(ranges[0].0 == (1.0f64 / 104.0).powf(gamma));
        assert!(ranges[1].1 == (1.0f64 / 104.0).powf(gamma));
    }

    #[test]
    fn single_partition_covers_everything() {
        let ranges = PartitionedBoxStorage::partition_ranges(10, 2.0, 5, 100);
        assert!(ranges == vec![(0.0, 1.0)]);
    }
}
