//! Pipeline controller: embeds the question, searches the store, assembles
//! context, invokes generation and shapes the structured response.

pub mod context;
pub mod ingest;
pub mod orchestrator;
pub mod service;

pub use ingest::{add_documents, IngestItem, IngestReport};
pub use orchestrator::{QueryOptions, QueryOutcome, RetrievalOrchestrator};
pub use service::RetrievalService;
