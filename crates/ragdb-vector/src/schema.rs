use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow schema of the chunks table. The vector column's width is fixed at
/// table creation and never changes for the lifetime of a store.
pub fn chunks_schema(dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("content", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim as i32),
            true,
        ),
    ]))
}
