use std::fmt;

/// Error returned by [`AffineMatrix::inverse`](super::AffineMatrix::inverse)
/// when the determinant is too close to zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SingularMatrixError {
    pub determinant: f32,
}

impl fmt::Display for SingularMatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matrix is not invertible (determinant {})", self.determinant)
    }
}

impl std::error::Error for SingularMatrixError {}
