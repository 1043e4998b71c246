//! Retrieval side of the pipeline.
//!
//! This module provides:
//! - `ChunkRetriever`: similarity search over pre-indexed policy chunks
//! - `SupabaseRetriever`: the RPC-backed implementation
//! - `build_context_block`: renders matches into the prompt's context section

mod context_builder;
mod store;
mod supabase;

pub use context_builder::{
    build_context_block, product_type_label, NO_CONTEXT_PLACEHOLDER, UNKNOWN_PRODUCT_TYPE,
};
pub use store::{ChunkRetriever, MatchParams, RetrievedChunk};
pub use supabase::SupabaseRetriever;
