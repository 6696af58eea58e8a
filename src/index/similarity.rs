

/// Cosine similarity in `[-1, 1]`. Mismatched lengths, empty or zero vectors
/// score 0.
pub fn cosine_similarity(vec1: &[f32], vec2: &[f32]) -> f64 {
    if vec1.len() != vec2.len() || vec1.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm1 = 0.0f64;
    let mut norm2 = 0.0f64;
    for (a, b) in vec1.iter().zip(vec2) {
        let (a, b) = (f64::from(*a), f64::from(*b));
        dot += a * b;
        norm1 += a * a;
        norm2 += b * b;
    }

    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }

    dot / (norm1 * norm2).sqrt()
}


/// `1 - cosine_similarity`: 0 for identical direction, 2 for opposite.
pub fn cosine_distance(vec1: &[f32], vec2: &[f32]) -> f32 {
    (1.0 - cosine_similarity(vec1, vec2)) as f32
}
