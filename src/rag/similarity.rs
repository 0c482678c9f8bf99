use crate::embeddings::EmbedError;

/// Guard added to both norms so degenerate all-zero vectors score 0.0
/// instead of dividing by zero.
const NORM_EPSILON: f32 = 1e-12;

/// Cosine similarity of two same-dimension vectors.
///
/// A dimension mismatch is an error, never a garbage score.
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, EmbedError> {
    if query.len() != candidate.len() {
        return Err(EmbedError::DimensionMismatch {
            expected: query.len(),
            actual: candidate.len(),
        });
    }

    let dot: f32 = query.iter().zip(candidate).map(|(a, b)| a * b).sum();
    Ok(dot / (l2_norm(query) + NORM_EPSILON) / (l2_norm(candidate) + NORM_EPSILON))
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}
