//! In-memory vector index — cosine similarity over chunk embeddings.

use causerie_core::RetrievalError;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]. Returns 0.0 for empty, mismatched, or
/// zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// A ranked chunk: its text and cosine score against the query.
#[derive(Debug, Clone)]
pub struct RankedChunk {
    pub content: String,
    pub score: f32,
}

/// An ephemeral per-request index over chunk embeddings.
pub struct VectorIndex {
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings (parallel vectors).
    pub fn new(chunks: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self, RetrievalError> {
        if chunks.is_empty() {
            return Err(RetrievalError::Index("no chunks to index".into()));
        }
        if chunks.len() != embeddings.len() {
            return Err(RetrievalError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        Ok(Self { chunks, embeddings })
    }

    /// Rank all chunks against a query embedding, best first, keeping at
    /// most `k`.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<RankedChunk> {
        let mut ranked: Vec<RankedChunk> = self
            .chunks
            .iter()
            .zip(self.embeddings.iter())
            .map(|(content, embedding)| RankedChunk {
                content: content.clone(),
                score: cosine_similarity(embedding, query),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_or_zero_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2) → similarity ≈ 0.7071
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn top_k_ranks_by_similarity() {
        let index = VectorIndex::new(
            vec!["orthogonal".into(), "identical".into(), "partial".into()],
            vec![
                vec![0.0, 1.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.5, 0.5, 0.0],
            ],
        )
        .unwrap();

        let ranked = index.top_k(&[1.0, 0.0, 0.0], 10);
        assert_eq!(ranked[0].content, "identical");
        assert_eq!(ranked[1].content, "partial");
        assert_eq!(ranked[2].content, "orthogonal");
    }

    #[test]
    fn top_k_respects_limit() {
        let chunks: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
        let embeddings: Vec<Vec<f32>> = (0..10).map(|i| vec![1.0, i as f32 * 0.1]).collect();
        let index = VectorIndex::new(chunks, embeddings).unwrap();
        assert_eq!(index.top_k(&[1.0, 0.0], 3).len(), 3);
    }

    #[test]
    fn empty_index_is_an_error() {
        assert!(matches!(
            VectorIndex::new(vec![], vec![]),
            Err(RetrievalError::Index(_))
        ));
    }

    #[test]
    fn mismatched_lengths_are_an_error() {
        assert!(matches!(
            VectorIndex::new(vec!["a".into()], vec![]),
            Err(RetrievalError::Index(_))
        ));
    }
}
