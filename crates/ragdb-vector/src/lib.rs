//! LanceDB-backed chunk store: durable content + embedding pairs with exact
//! nearest-neighbor search under cosine distance.

pub mod schema;
pub mod store;

pub use store::ChunkStore;
