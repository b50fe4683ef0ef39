use std::fmt::Display;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::{
    FixedSizeListArray, Float32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{connect, Connection, DistanceType};

use ragdb_core::error::{Error, Result};
use ragdb_core::types::{Chunk, ScoredChunk};

use crate::schema::chunks_schema;

/// Durable chunk store. Content and embedding land in one record-batch
/// append, so a chunk is either fully present or absent. Ids are assigned
/// monotonically from the largest id seen at open; the store is
/// append-only.
pub struct ChunkStore {
    db: Connection,
    table_name: String,
    dim: usize,
    next_id: AtomicI64,
}

impl ChunkStore {
    /// Connect and make sure the chunks table exists with a vector column
    /// of width `dim`.
    pub async fn open(db_dir: &Path, table_name: &str, dim: usize) -> Result<Self> {
        let db = connect(db_dir.to_string_lossy().as_ref())
            .execute()
            .await
            .map_err(read_err)?;
        let names = db.table_names().execute().await.map_err(read_err)?;
        if !names.contains(&table_name.to_string()) {
            let schema = chunks_schema(dim);
            let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
            db.create_table(table_name, Box::new(iter))
                .execute()
                .await
                .map_err(write_err)?;
        }
        let store = Self {
            db,
            table_name: table_name.to_string(),
            dim,
            next_id: AtomicI64::new(1),
        };
        let max_id = store.max_id().await?;
        store.next_id.store(max_id + 1, Ordering::SeqCst);
        tracing::info!(table = table_name, dim, next_id = max_id + 1, "chunk store opened");
        Ok(store)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Persist one chunk and return it with its assigned id. Dimension is
    /// checked before anything is written; a mismatch is a configuration
    /// fault, not a write failure.
    pub async fn add_chunk(&self, content: &str, embedding: &[f32]) -> Result<Chunk> {
        if content.is_empty() {
            return Err(Error::Validation("chunk content must not be empty".to_string()));
        }
        self.check_dim(embedding)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let batch = self.chunk_batch(id, content, embedding)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(read_err)?;
        table.add(reader).execute().await.map_err(write_err)?;
        tracing::debug!(id, bytes = content.len(), "inserted chunk");
        Ok(Chunk { id, content: content.to_string(), embedding: embedding.to_vec() })
    }

    /// Exact nearest-neighbor search: rank every stored chunk by cosine
    /// distance, cap at `top_k`, then drop candidates at or above
    /// `threshold`. The filter runs after ranking and capping so a tighter
    /// threshold can shrink the result but never reorder it. Ties resolve
    /// by ascending id. An empty result is a valid outcome.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<ScoredChunk>> {
        if top_k == 0 {
            return Err(Error::Validation("top_k must be a positive integer".to_string()));
        }
        self.check_dim(query_embedding)?;

        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(read_err)?;
        let mut stream = table
            .vector_search(query_embedding.to_vec())
            .map_err(read_err)?
            .distance_type(DistanceType::Cosine)
            .limit(top_k)
            .execute()
            .await
            .map_err(read_err)?;

        let mut results = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(read_err)? {
            let ids = column::<Int64Array>(&batch, "id")?;
            let contents = column::<StringArray>(&batch, "content")?;
            let vectors = column::<FixedSizeListArray>(&batch, "vector")?;
            let distances = column::<Float32Array>(&batch, "_distance")?;
            for i in 0..batch.num_rows() {
                let list = vectors.value(i);
                let embedding = list
                    .as_primitive::<arrow_array::types::Float32Type>()
                    .values()
                    .iter()
                    .copied()
                    .collect::<Vec<f32>>();
                results.push(ScoredChunk {
                    chunk: Chunk {
                        id: ids.value(i),
                        content: contents.value(i).to_string(),
                        embedding,
                    },
                    distance: distances.value(i),
                });
            }
        }

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.id.cmp(&b.chunk.id))
        });
        results.retain(|r| r.distance < threshold);
        Ok(results)
    }

    /// Number of stored chunks.
    pub async fn count(&self) -> Result<usize> {
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(read_err)?;
        table.count_rows(None).await.map_err(read_err)
    }

    fn check_dim(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: embedding.len() });
        }
        Ok(())
    }

    fn chunk_batch(&self, id: i64, content: &str, embedding: &[f32]) -> Result<RecordBatch> {
        let schema = chunks_schema(self.dim);
        let vectors: Vec<Option<Vec<Option<f32>>>> =
            vec![Some(embedding.iter().map(|&x| Some(x)).collect())];
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![id])),
                Arc::new(StringArray::from(vec![content.to_string()])),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), self.dim as i32)),
            ],
        )
        .map_err(write_err)
    }

    async fn max_id(&self) -> Result<i64> {
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(read_err)?;
        let mut stream = table
            .query()
            .select(Select::columns(&["id"]))
            .execute()
            .await
            .map_err(read_err)?;
        let mut max = 0i64;
        while let Some(batch) = stream.try_next().await.map_err(read_err)? {
            let ids = column::<Int64Array>(&batch, "id")?;
            for i in 0..batch.num_rows() {
                max = max.max(ids.value(i));
            }
        }
        Ok(max)
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::StorageReadFailed(format!("column '{name}' missing or mistyped")))
}

fn read_err(e: impl Display) -> Error {
    Error::StorageReadFailed(e.to_string())
}

fn write_err(e: impl Display) -> Error {
    Error::StorageWriteFailed(e.to_string())
}
