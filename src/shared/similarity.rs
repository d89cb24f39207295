use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("Vector lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("Cosine similarity is undefined for a zero-magnitude vector")]
    ZeroMagnitude,
}

/// Cosine similarity of two raw (non-normalized) vectors.
/// A zero-magnitude vector is an error, not a NaN.
pub fn cosine(left: &[f32], right: &[f32]) -> Result<f64, SimilarityError> {
    if left.len() != right.len() {
        return Err(SimilarityError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut left_sq = 0.0f64;
    let mut right_sq = 0.0f64;
    for (a, b) in left.iter().zip(right.iter()) {
        let a = *a as f64;
        let b = *b as f64;
        dot += a * b;
        left_sq += a * a;
        right_sq += b * b;
    }

    if left_sq == 0.0 || right_sq == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }
    Ok(dot / (left_sq.sqrt() * right_sq.sqrt()))
}

#[test]
fn cosine_identical() {
    let v = [0.5f32, -1.25, 3.0];
    let score = cosine(&v, &v).unwrap();
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn cosine_orthogonal() {
    let score = cosine(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
    assert!(score.abs() < 1e-9);
}

#[test]
fn cosine_opposite() {
    let score = cosine(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
    assert!((score + 1.0).abs() < 1e-9);
}

#[test]
fn cosine_zero_vector_is_an_error() {
    assert_eq!(
        cosine(&[0.0, 0.0], &[1.0, 2.0]),
        Err(SimilarityError::ZeroMagnitude)
    );
}

#[test]
fn cosine_length_mismatch_is_an_error() {
    assert_eq!(
        cosine(&[1.0], &[1.0, 2.0]),
        Err(SimilarityError::LengthMismatch { left: 1, right: 2 })
    );
}
