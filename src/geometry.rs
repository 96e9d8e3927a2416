//! Small geometric helpers shared by the navigation model.
//!
//! All math is carried out in `f64`, the precision the slicing toolkit works
//! in, using glam's double-precision types.

use glam::{DMat3, DMat4, DVec3};

use crate::{enums::Orientation, navigation::NavigationError};

/// Vectors shorter than this are treated as zero-length.
pub const EPSILON: f64 = 1e-9;

/// Build a 3x3 matrix from row-major rows.
pub fn mat3_from_rows(rows: [[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(&rows).transpose()
}

/// Fixed base rotation of each orientation's reslice axes.
///
/// Columns are the in-plane x axis, the in-plane y axis and the plane normal.
pub fn base_rotation(orientation: Orientation) -> DMat3 {
    match orientation {
        Orientation::Axial => DMat3::IDENTITY,
        // +90 degrees about X
        Orientation::Coronal => mat3_from_rows([[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]]),
        // about X, then about Y
        Orientation::Sagittal => {
            mat3_from_rows([[0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]])
        }
    }
}

/// Rotation of `degrees` about the Y axis.
///
/// Row-major: `[[cos, 0, sin], [0, 1, 0], [-sin, 0, cos]]`.
pub fn rotation_about_y(degrees: f64) -> DMat3 {
    DMat3::from_rotation_y(degrees.to_radians())
}

/// Rigid transform `T(translation) * R(rotation)`.
pub fn rigid_transform(rotation: DMat3, translation: DVec3) -> DMat4 {
    DMat4::from_cols(
        rotation.x_axis.extend(0.0),
        rotation.y_axis.extend(0.0),
        rotation.z_axis.extend(0.0),
        translation.extend(1.0),
    )
}

/// Export a matrix as row-major homogeneous rows.
pub fn to_row_major(matrix: &DMat4) -> [[f64; 4]; 4] {
    matrix.transpose().to_cols_array_2d()
}

/// Signed angle in degrees from `v1` to `v2`, counterclockwise positive
/// when looking down `-normal` (right-hand rule about `normal`).
///
/// Both vectors are compared after projection onto the plane orthogonal to
/// `normal`. A zero-length vector has no direction, so the angle is undefined.
pub fn signed_angle_degrees(v1: DVec3, v2: DVec3, normal: DVec3) -> Result<f64, NavigationError> {
    let n = normal.normalize_or_zero();
    let a = v1 - n * v1.dot(n);
    let b = v2 - n * v2.dot(n);
    if a.length() < EPSILON || b.length() < EPSILON {
        return Err(NavigationError::DegenerateRotationInput);
    }
    let sin = a.cross(b).dot(n);
    let cos = a.dot(b);
    Ok(sin.atan2(cos).to_degrees())
}
