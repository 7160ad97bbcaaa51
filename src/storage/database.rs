use crate::algorithm::PackError;
use crate::detail::Detail;
use crate::storage::BoxCache;
use crate::storage::BoxStorage;
use const_format::concatcp;
use std::sync::Arc;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::Type;
use tokio_postgres::Client;

/// column list shared by DDL, COPY, and SELECT statements
pub(super) const COLUMNS: &str =
    "bottom_left_x, bottom_left_y, top_right_x, top_right_y, min_size, name, detail_type";
pub(super) const SELECT_COLUMNS: &str = concatcp!("SELECT ", COLUMNS, " FROM ");
/// rows per COPY command; each command commits as a unit
pub(super) const INSERT_BATCH: usize = 1_000_000;

fn column_types() -> &'static [Type] {
    &[
        Type::FLOAT8,
        Type::FLOAT8,
        Type::FLOAT8,
        Type::FLOAT8,
        Type::FLOAT8,
        Type::TEXT,
        Type::TEXT,
    ]
}

/// Box storage backed by a PostgreSQL table, fronted by a [`BoxCache`].
/// Construction drops and recreates the table: storage state is never
/// reused across runs.
pub struct DatabaseBoxStorage {
    client: Arc<Client>,
    table: String,
    cache: BoxCache,
}

impl DatabaseBoxStorage {
    pub async fn new(
        client: Arc<Client>,
        table: &str,
        cache_size: usize,
    ) -> Result<Self, PackError> {
        if cache_size == 0 {
            return Err(PackError::InvalidConfiguration(
                "cache_size must be a positive integer".to_string(),
            ));
        }
        let this = Self {
            client,
            table: table.to_string(),
            cache: BoxCache::new(cache_size),
        };
        this.install().await?;
        Ok(this)
    }

    async fn install(&self) -> Result<(), PackError> {
        log::info!("creating boxes table ({})", self.table);
        self.client
            .batch_execute(&format!(
                "
                DROP TABLE IF EXISTS {table};
                CREATE TABLE {table} (
                    id             BIGSERIAL PRIMARY KEY,
                    bottom_left_x  DOUBLE PRECISION,
                    bottom_left_y  DOUBLE PRECISION,
                    top_right_x    DOUBLE PRECISION,
                    top_right_y    DOUBLE PRECISION,
                    min_size       DOUBLE PRECISION,
                    name           TEXT,
                    detail_type    TEXT
                );
                CREATE INDEX idx_{table}_min_size ON {table} (min_size);
                ",
                table = self.table
            ))
            .await?;
        Ok(())
    }

    /// Flush pending inserts and deletes, then prefetch the top of the
    /// table again. A no-op sync (empty buffers) only re-reads the top.
    async fn sync(&mut self) -> Result<(), PackError> {
        let adds = self.cache.drain_adds();
        let deletes = self.cache.drain_deletes();
        log::debug!(
            "syncing box storage ({} inserts, {} deletes)",
            adds.len(),
            deletes.len()
        );
        for chunk in adds.chunks(INSERT_BATCH) {
            copy_details(&self.client, &self.table, chunk).await?;
        }
        if !deletes.is_empty() {
            delete_names(&self.client, &self.table, &deletes).await?;
        }
        let sql = format!(
            "{}{} ORDER BY min_size DESC LIMIT {}",
            SELECT_COLUMNS,
            self.table,
            self.cache.capacity()
        );
        let rows = self.client.query(&sql, &[]).await?;
        let details = rows
            .iter()
            .map(row_to_detail)
            .collect::<Result<Vec<_>, _>>()?;
        self.cache.reload(details);
        Ok(())
    }
}

#[async_trait::async_trait]
impl BoxStorage for DatabaseBoxStorage {
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

/// COPY a batch of boxes into the table over the binary protocol.
pub(super) async fn copy_details(
    client: &Client,
    table: &str,
    details: &[Detail],
) -> Result<(), PackError> {
    let sql = format!("COPY {} ({}) FROM STDIN BINARY", table, COLUMNS);
    let sink = client.copy_in(&sql).await?;
    let writer = BinaryCopyInWriter::new(sink, column_types());
    futures::pin_mut!(writer);
    for detail in details {
        let min_size = detail.min_side();
        let kind = detail.detail_type.as_str();
        writer
            .as_mut()
            .write(&[
                &detail.bottom_left.0,
                &detail.bottom_left.1,
                &detail.top_right.0,
                &detail.top_right.1,
                &min_size,
                &detail.name,
                &kind,
            ])
            .await?;
    }
    writer.finish().await?;
    Ok(())
}

/// Erase rows by name in one statement.
pub(super) async fn delete_names(
    client: &Client,
    table: &str,
    names: &[String],
) -> Result<(), PackError> {
    let sql = format!("DELETE FROM {} WHERE name = ANY($1)", table);
    client.execute(&sql, &[&names]).await?;
    Ok(())
}

pub(super) fn row_to_detail(row: &tokio_postgres::Row) -> Result<Detail, PackError> {
    let kind: &str = row.try_get(6)?;
    Ok(Detail {
        bottom_left: (row.try_get(0)?, row.try_get(1)?),
        top_right: (row.try_get(2)?, row.try_get(3)?),
        name: row.try_get(5)?,
        detail_type: kind.parse()?,
    })
}
