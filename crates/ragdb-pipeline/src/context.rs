use ragdb_core::types::ScoredChunk;

/// Concatenate retrieved chunk contents in rank order, separated by a blank
/// line. Rank order is the store's order; nothing is re-sorted here.
pub fn assemble_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdb_core::types::Chunk;

    fn scored(id: i64, content: &str, distance: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk { id, content: content.to_string(), embedding: vec![] },
            distance,
        }
    }

    #[test]
    fn joins_in_rank_order_with_blank_lines() {
        let chunks = vec![scored(2, "closest", 0.1), scored(1, "runner up", 0.4)];
        assert_eq!(assemble_context(&chunks), "closest\n\nrunner up");
    }

    #[test]
    fn empty_input_is_empty_context() {
        assert_eq!(assemble_context(&[]), "");
    }
}
