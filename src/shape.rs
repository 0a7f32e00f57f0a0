//! The morphing implicit field.
//!
//! The surface being triangulated is the iso-contour of an algebraic scalar
//! field described by 12 coefficients over the polynomial basis
//!
//! ```text
//! [x⁵, x⁴, y⁴, z⁴, x²y², x²z², y²z², xyz, x², y², z², 1]
//! ```
//!
//! [`ShapeLibrary`] holds a fixed table of named shapes and interpolates
//! between consecutive entries over elapsed time, cycling through the table.
//! [`ShapeField`] evaluates the field and its analytic gradient; the
//! integration stage uses the sign of the field for its collision test and
//! the gradient for bounce normals.

use glam::Vec3;

/// Seconds each shape is held before transitioning to the next one.
pub const SHAPE_PERIOD: f32 = 13.0;

/// Coefficient vectors for the shapes the animation morphs between.
///
/// Basis: x⁵, x⁴, y⁴, z⁴, x²y², x²z², y²z², xyz, x², y², z², 1.
const SHAPES: [(&str, [f32; 12]); 7] = [
    (
        "helix",
        [0.0, -2.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 6.0, 0.0, 0.0, 0.0],
    ),
    (
        "transition-a",
        [0.0, 8.0, 0.5, 0.5, 4.0, 4.0, -1.4, 0.0, 0.0, 0.0, 0.0, 0.0],
    ),
    (
        "transition-b",
        [0.0, 16.0, 1.0, 1.0, 8.0, 8.0, -2.0, 0.0, -6.0, 0.0, 0.0, 0.0],
    ),
    (
        "date",
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.3, -0.95],
    ),
    (
        "torus",
        [
            0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 0.0, -1.01125, -1.01125, 0.94875, 0.225032,
        ],
    ),
    (
        "kiss",
        [-0.5, -0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0],
    ),
    (
        "cayley",
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 16.0, 4.0, 4.0, 4.0, -1.0],
    ),
];

/// A concrete 12-coefficient field, ready for evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeField {
    /// Coefficients over the algebraic basis.
    pub coefficients: [f32; 12],
}

impl ShapeField {
    /// Wrap a raw coefficient vector.
    pub fn new(coefficients: [f32; 12]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the scalar field at `p`.
    pub fn eval(&self, p: Vec3) -> f32 {
        let c = &self.coefficients;
        let (x, y, z) = (p.x, p.y, p.z);
        let (x2, y2, z2) = (x * x, y * y, z * z);
        c[0] * x2 * x2 * x
            + c[1] * x2 * x2
            + c[2] * y2 * y2
            + c[3] * z2 * z2
            + c[4] * x2 * y2
            + c[5] * x2 * z2
            + c[6] * y2 * z2
            + c[7] * x * y * z
            + c[8] * x2
            + c[9] * y2
            + c[10] * z2
            + c[11]
    }

    /// Analytic gradient of the field at `p`.
    pub fn gradient(&self, p: Vec3) -> Vec3 {
        let c = &self.coefficients;
        let (x, y, z) = (p.x, p.y, p.z);
        let (x2, y2, z2) = (x * x, y * y, z * z);
        Vec3::new(
            5.0 * c[0] * x2 * x2
                + 4.0 * c[1] * x2 * x
                + 2.0 * c[4] * x * y2
                + 2.0 * c[5] * x * z2
                + c[7] * y * z
                + 2.0 * c[8] * x,
            4.0 * c[2] * y2 * y
                + 2.0 * c[4] * x2 * y
                + 2.0 * c[6] * y * z2
                + c[7] * x * z
                + 2.0 * c[9] * y,
            4.0 * c[3] * z2 * z
                + 2.0 * c[5] * x2 * z
                + 2.0 * c[6] * y2 * z
                + c[7] * x * y
                + 2.0 * c[10] * z,
        )
    }

    /// Unit surface normal at `p`, or `None` where the gradient vanishes.
    pub fn normal(&self, p: Vec3) -> Option<Vec3> {
        self.gradient(p).try_normalize()
    }
}

/// The fixed table of named shapes and its time-based interpolation.
///
/// Each shape is held for [`SHAPE_PERIOD`] seconds. During the final second
/// of each period the coefficients blend linearly into the next shape; the
/// rest of the period the blend endpoints coincide, so the shape is held
/// exactly.
#[derive(Clone, Debug, Default)]
pub struct ShapeLibrary;

impl ShapeLibrary {
    /// Number of shapes in the table.
    pub fn len(&self) -> usize {
        SHAPES.len()
    }

    /// Whether the table is empty. It never is.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Name of the shape held at elapsed time `t`.
    pub fn name_at(&self, t: f32) -> &'static str {
        SHAPES[(t / SHAPE_PERIOD) as usize % SHAPES.len()].0
    }

    /// Interpolated field coefficients for elapsed time `t`.
    pub fn field_at(&self, t: f32) -> ShapeField {
        let from = (t / SHAPE_PERIOD) as usize % SHAPES.len();
        let to = ((t + 1.0) / SHAPE_PERIOD) as usize % SHAPES.len();
        let u = (t + 1.0) % SHAPE_PERIOD;

        let a = &SHAPES[from].1;
        let b = &SHAPES[to].1;
        if from == to {
            // Outside the blend window the endpoints coincide; return the
            // table entry so the held shape is bit-exact.
            return ShapeField::new(*a);
        }
        let mut coefficients = [0.0f32; 12];
        for i in 0..12 {
            coefficients[i] = (1.0 - u) * a[i] + u * b[i];
        }
        ShapeField::new(coefficients)
    }
}
