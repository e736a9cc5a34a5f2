use core::ops::{Add, Mul, Sub};

use crate::coords::Vec2;

use super::SingularMatrixError;

/// Matrices with `|determinant| <= SINGULAR_EPSILON` are treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-6;

/// 3×3 homogeneous 2D transform, stored row-major (`mRC` = row R, column C).
///
/// Affine transforms keep the bottom row at `[0, 0, 1]`; the type does not
/// enforce that, and [`multiply_vector`](Self::multiply_vector) divides by
/// the homogeneous `w` so projective matrices still behave.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineMatrix {
    pub m00: f32,
    pub m01: f32,
    pub m02: f32,
    pub m10: f32,
    pub m11: f32,
    pub m12: f32,
    pub m20: f32,
    pub m21: f32,
    pub m22: f32,
}

impl AffineMatrix {
    pub const IDENTITY: AffineMatrix = AffineMatrix::identity();

    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        m00: f32, m01: f32, m02: f32,
        m10: f32, m11: f32, m12: f32,
        m20: f32, m21: f32, m22: f32,
    ) -> Self {
        Self { m00, m01, m02, m10, m11, m12, m20, m21, m22 }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new(
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
        )
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(
            0.0, 0.0, 0.0,
            0.0, 0.0, 0.0,
            0.0, 0.0, 0.0,
        )
    }

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(
            1.0, 0.0, x,
            0.0, 1.0, y,
            0.0, 0.0, 1.0,
        )
    }

    #[inline]
    pub const fn scale(x: f32, y: f32) -> Self {
        Self::new(
            x, 0.0, 0.0,
            0.0, y, 0.0,
            0.0, 0.0, 1.0,
        )
    }

    /// Counter-clockwise rotation by `angle` radians.
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            cos, -sin, 0.0,
            sin, cos, 0.0,
            0.0, 0.0, 1.0,
        )
    }

    /// Builds a matrix from the canvas `setTransform(a, b, c, d, e, f)` form.
    #[inline]
    pub const fn from_canvas_2x3(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self::new(
            a, c, e,
            b, d, f,
            0.0, 0.0, 1.0,
        )
    }

    /// The `(a, b, c, d, e, f)` arguments for a canvas-style `setTransform`.
    ///
    /// The bottom row is dropped.
    #[inline]
    pub const fn to_canvas_2x3(self) -> (f32, f32, f32, f32, f32, f32) {
        (self.m00, self.m10, self.m01, self.m11, self.m02, self.m12)
    }

    // ── element-wise ──────────────────────────────────────────────────────

    #[inline]
    pub fn add(self, m: Self) -> Self {
        self.zip_with(m, |a, b| a + b)
    }

    #[inline]
    pub fn sub(self, m: Self) -> Self {
        self.zip_with(m, |a, b| a - b)
    }

    #[inline]
    pub fn scalar_multiply(self, value: f32) -> Self {
        self.zip_with(self, |a, _| a * value)
    }

    #[inline]
    pub fn transpose(self) -> Self {
        Self::new(
            self.m00, self.m10, self.m20,
            self.m01, self.m11, self.m21,
            self.m02, self.m12, self.m22,
        )
    }

    #[inline]
    pub fn trace(self) -> f32 {
        self.m00 + self.m11 + self.m22
    }

    // ── products ──────────────────────────────────────────────────────────

    /// Standard matrix product `self · m`; `m` is applied to points first.
    pub fn multiply_matrix(self, m: Self) -> Self {
        let a = self;
        Self::new(
            a.m00 * m.m00 + a.m01 * m.m10 + a.m02 * m.m20,
            a.m00 * m.m01 + a.m01 * m.m11 + a.m02 * m.m21,
            a.m00 * m.m02 + a.m01 * m.m12 + a.m02 * m.m22,
            a.m10 * m.m00 + a.m11 * m.m10 + a.m12 * m.m20,
            a.m10 * m.m01 + a.m11 * m.m11 + a.m12 * m.m21,
            a.m10 * m.m02 + a.m11 * m.m12 + a.m12 * m.m22,
            a.m20 * m.m00 + a.m21 * m.m10 + a.m22 * m.m20,
            a.m20 * m.m01 + a.m21 * m.m11 + a.m22 * m.m21,
            a.m20 * m.m02 + a.m21 * m.m12 + a.m22 * m.m22,
        )
    }

    /// Transforms a point, dividing through by the homogeneous `w`.
    pub fn multiply_vector(self, p: Vec2) -> Vec2 {
        let w = self.m20 * p.x + self.m21 * p.y + self.m22;
        let x = (self.m00 * p.x + self.m01 * p.y + self.m02) / w;
        let y = (self.m10 * p.x + self.m11 * p.y + self.m12) / w;
        Vec2::new(x, y)
    }

    // ── inversion ─────────────────────────────────────────────────────────

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(self) -> f32 {
        self.m00 * cofactor(self.m11, self.m12, self.m21, self.m22)
            - self.m01 * cofactor(self.m10, self.m12, self.m20, self.m22)
            + self.m02 * cofactor(self.m10, self.m11, self.m20, self.m21)
    }

    #[inline]
    pub fn is_invertible(self) -> bool {
        self.determinant().abs() > SINGULAR_EPSILON
    }

    /// Inverse via adjugate / determinant.
    pub fn inverse(self) -> Result<Self, SingularMatrixError> {
        let c00 = cofactor(self.m11, self.m12, self.m21, self.m22);
        let c01 = -cofactor(self.m10, self.m12, self.m20, self.m22);
        let c02 = cofactor(self.m10, self.m11, self.m20, self.m21);

        let determinant = self.m00 * c00 + self.m01 * c01 + self.m02 * c02;
        if determinant.abs() <= SINGULAR_EPSILON || !determinant.is_finite() {
            return Err(SingularMatrixError { determinant });
        }

        let c10 = -cofactor(self.m01, self.m02, self.m21, self.m22);
        let c11 = cofactor(self.m00, self.m02, self.m20, self.m22);
        let c12 = -cofactor(self.m00, self.m01, self.m20, self.m21);

        let c20 = cofactor(self.m01, self.m02, self.m11, self.m12);
        let c21 = -cofactor(self.m00, self.m02, self.m10, self.m12);
        let c22 = cofactor(self.m00, self.m01, self.m10, self.m11);

        // Adjugate is the transposed cofactor matrix.
        Ok(Self::new(
            c00, c10, c20,
            c01, c11, c21,
            c02, c12, c22,
        )
        .scalar_multiply(1.0 / determinant))
    }

    /// Element-wise comparison within `eps`.
    pub fn approx_eq(self, other: Self, eps: f32) -> bool {
        self.elements()
            .iter()
            .zip(other.elements().iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    #[inline]
    fn elements(self) -> [f32; 9] {
        [
            self.m00, self.m01, self.m02,
            self.m10, self.m11, self.m12,
            self.m20, self.m21, self.m22,
        ]
    }

    #[inline]
    fn zip_with(self, m: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let [a0, a1, a2, a3, a4, a5, a6, a7, a8] = self.elements();
        let [b0, b1, b2, b3, b4, b5, b6, b7, b8] = m.elements();
        Self::new(
            f(a0, b0), f(a1, b1), f(a2, b2),
            f(a3, b3), f(a4, b4), f(a5, b5),
            f(a6, b6), f(a7, b7), f(a8, b8),
        )
    }
}

/// 2×2 determinant `| a b ; c d |`.
#[inline]
fn cofactor(a: f32, b: f32, c: f32, d: f32) -> f32 {
    a * d - b * c
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Add for AffineMatrix {
    type Output = AffineMatrix;
    #[inline]
    fn add(self, rhs: AffineMatrix) -> AffineMatrix {
        AffineMatrix::add(self, rhs)
    }
}

impl Sub for AffineMatrix {
    type Output = AffineMatrix;
    #[inline]
    fn sub(self, rhs: AffineMatrix) -> AffineMatrix {
        AffineMatrix::sub(self, rhs)
    }
}

impl Mul for AffineMatrix {
    type Output = AffineMatrix;
    #[inline]
    fn mul(self, rhs: AffineMatrix) -> AffineMatrix {
        self.multiply_matrix(rhs)
    }
}

impl Mul<f32> for AffineMatrix {
    type Output = AffineMatrix;
    #[inline]
    fn mul(self, rhs: f32) -> AffineMatrix {
        self.scalar_multiply(rhs)
    }
}

impl Mul<Vec2> for AffineMatrix {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        self.multiply_vector(rhs)
    }
}
