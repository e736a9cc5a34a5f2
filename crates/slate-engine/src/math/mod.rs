//! 2D affine matrix algebra.
//!
//! Convention: `outer.multiply_matrix(inner)` applies `inner` to a point
//! first and `outer` second, i.e. matrices act on column vectors.

mod error;
mod matrix;

pub use error::SingularMatrixError;
pub use matrix::{AffineMatrix, SINGULAR_EPSILON};
