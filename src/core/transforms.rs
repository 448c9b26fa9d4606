//! Coordinate transformations between a global frame and the fixed local frame.
//!
//! The local frame follows the site survey convention: origin at (0, 0, 0)
//! with axes equal to the standard basis. Callers supply only the global
//! origin; the local frame itself is not configurable.

use std::ops::{Add, Sub};

/// A point (or vector) in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// Origin of any frame, (0, 0, 0).
    pub const ZERO: Point3D = Point3D::new(0.0, 0.0, 0.0);

    /// Creates a new point from its coordinates.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinates as an `[x, y, z]` array.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Point3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length of the point treated as a vector.
    #[inline]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns true if every component differs from `other` by at most `tolerance`.
    pub fn approx_eq(self, other: Point3D, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(coords: [f64; 3]) -> Self {
        Self::new(coords[0], coords[1], coords[2])
    }
}

impl From<Point3D> for [f64; 3] {
    fn from(p: Point3D) -> Self {
        p.to_array()
    }
}

impl Add for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// An origin plus three orthonormal basis vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    pub origin: Point3D,
    pub x_axis: Point3D,
    pub y_axis: Point3D,
    pub z_axis: Point3D,
}

impl CoordinateFrame {
    /// Origin at zero, axes equal to the standard basis.
    pub const STANDARD: CoordinateFrame = CoordinateFrame {
        origin: Point3D::ZERO,
        x_axis: Point3D::new(1.0, 0.0, 0.0),
        y_axis: Point3D::new(0.0, 1.0, 0.0),
        z_axis: Point3D::new(0.0, 0.0, 1.0),
    };

    /// Change-of-basis matrix whose columns are the frame axes.
    ///
    /// Indexed as `m[row][col]`.
    pub fn change_of_basis(&self) -> [[f64; 3]; 3] {
        let (x, y, z) = (self.x_axis, self.y_axis, self.z_axis);
        [[x.x, y.x, z.x], [x.y, y.y, z.y], [x.z, y.z, z.z]]
    }

    /// Checks that the axes have unit length and are mutually orthogonal.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let axes = [self.x_axis, self.y_axis, self.z_axis];
        let unit = axes.iter().all(|a| (a.norm() - 1.0).abs() <= tolerance);
        let orthogonal = axes[0].dot(axes[1]).abs() <= tolerance
            && axes[0].dot(axes[2]).abs() <= tolerance
            && axes[1].dot(axes[2]).abs() <= tolerance;
        unit && orthogonal
    }
}

/// The local frame every transform maps into.
pub const LOCAL_FRAME: CoordinateFrame = CoordinateFrame::STANDARD;

/// Multiply a 3x3 matrix by a column vector.
fn mat_vec(m: &[[f64; 3]; 3], v: Point3D) -> Point3D {
    let v = v.to_array();
    let row = |r: &[f64; 3]| r[0] * v[0] + r[1] * v[1] + r[2] * v[2];
    Point3D::new(row(&m[0]), row(&m[1]), row(&m[2]))
}

/// Convert a point given in the global frame to the local frame.
///
/// Computes `M * (global_coordinates - global_origin) + local_origin`, where
/// `M` has the local axes as columns. Since the local frame is the standard
/// basis this reduces to `global_coordinates - global_origin`.
///
/// # Example
///
/// ```
/// use dataset_prep::core::transforms::{global_to_local, Point3D};
///
/// let local = global_to_local(Point3D::new(10.0, 20.0, 0.0), Point3D::new(11.0, 22.0, 3.0));
/// assert_eq!(local, Point3D::new(1.0, 2.0, 3.0));
/// ```
pub fn global_to_local(global_origin: Point3D, global_coordinates: Point3D) -> Point3D {
    let m = LOCAL_FRAME.change_of_basis();
    mat_vec(&m, global_coordinates - global_origin) + LOCAL_FRAME.origin
}
