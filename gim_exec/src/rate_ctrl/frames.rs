//! Frame transform and quaternion primitives for RateCtrl.
//!
//! Two different Euler sequences are in use and the asymmetry is deliberate:
//! the vehicle-to-gimbal transform uses a 3-1-2 sequence matching the
//! physical order of the gimbal joints (azimuth, roll, elevation), while
//! orientation quaternions are decomposed with the conventional 3-2-1
//! aerospace sequence.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Threshold on `1 - w^2` below which a quaternion is treated as the identity
/// rotation, where the rotation axis is undefined.
pub const ROT_VEC_SINGULARITY_LIMIT: f64 = 1e-12;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a rotation matrix from a vector of Euler angles using a 3-1-2
/// rotation sequence.
///
/// The input vector is `[roll, pitch, yaw]` in radians. Applied to the gimbal
/// joint angles this gives the vehicle-to-gimbal transform.
pub fn mat_from_euler312(euler_rad: Vector3<f64>) -> Matrix3<f64> {
    let cos_phi = euler_rad.x.cos();
    let sin_phi = euler_rad.x.sin();
    let cos_theta = euler_rad.y.cos();
    let sin_theta = euler_rad.y.sin();
    let cos_psi = euler_rad.z.cos();
    let sin_psi = euler_rad.z.sin();

    Matrix3::new(
        cos_theta * cos_psi - sin_psi * sin_phi * sin_theta,
        cos_theta * sin_psi + cos_psi * sin_phi * sin_theta,
        -sin_theta * cos_phi,
        -sin_psi * cos_phi,
        cos_psi * cos_phi,
        sin_phi,
        cos_psi * sin_theta + cos_theta * sin_psi * sin_phi,
        sin_psi * sin_theta - cos_theta * cos_psi * sin_phi,
        cos_theta * cos_phi,
    )
}

/// Convert a unit quaternion to a rotation vector.
///
/// The scalar part's sign is folded into the result so that `q` and `-q`
/// (the same physical rotation) produce the same vector. Quaternions within
/// [`ROT_VEC_SINGULARITY_LIMIT`] of the identity return the zero vector.
pub fn quat_to_rotation_vector(quat: UnitQuaternion<f64>) -> Vector3<f64> {
    let mut scaler = 1.0 - quat.w * quat.w;
    if scaler > ROT_VEC_SINGULARITY_LIMIT {
        scaler = 1.0 / scaler.sqrt();
        if quat.w < 0.0 {
            scaler *= -1.0;
        }
        Vector3::new(quat.i * scaler, quat.j * scaler, quat.k * scaler)
    }
    else {
        Vector3::zeros()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Unit;

    /// Check that a matrix is orthonormal: unit rows, mutually orthogonal,
    /// determinant of one.
    fn assert_orthonormal(m: &Matrix3<f64>) {
        let should_be_eye = m * m.transpose();
        assert!(
            (should_be_eye - Matrix3::identity()).abs().max() < 1e-12,
            "M * M^T is not the identity: {}",
            should_be_eye
        );
        assert!((m.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_euler312_matrix_orthonormal() {
        let cases = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.1, -0.2, 0.3),
            Vector3::new(-1.0, 0.5, -2.5),
            Vector3::new(3.0, -3.0, 3.0),
        ];

        for euler in cases.iter() {
            assert_orthonormal(&mat_from_euler312(*euler));
        }
    }

    #[test]
    fn test_euler312_yaw_only() {
        // With zero roll and pitch the 312 matrix reduces to a plain rotation
        // about z
        let psi = 0.2f64;
        let m = mat_from_euler312(Vector3::new(0.0, 0.0, psi));

        let expected = Matrix3::new(
            psi.cos(), psi.sin(), 0.0,
            -psi.sin(), psi.cos(), 0.0,
            0.0, 0.0, 1.0,
        );

        assert!((m - expected).abs().max() < 1e-12);
    }

    #[test]
    fn test_rotation_vector_identity_is_zero() {
        let vec = quat_to_rotation_vector(UnitQuaternion::identity());
        assert_eq!(vec, Vector3::zeros());
    }

    #[test]
    fn test_rotation_vector_axis_recovery() {
        // For a rotation well away from the identity the result points along
        // the rotation axis
        let axis = Unit::new_normalize(Vector3::new(1.0, -2.0, 0.5));
        let quat = UnitQuaternion::from_axis_angle(&axis, 0.8);

        let vec = quat_to_rotation_vector(quat);
        let dir = vec.normalize();

        assert!((dir - axis.into_inner()).norm() < 1e-9);
    }

    #[test]
    fn test_rotation_vector_double_cover() {
        // q and -q describe the same rotation and must produce the same
        // vector, which is what the sign fold on the scalar part is for
        let axis = Unit::new_normalize(Vector3::new(0.0, 1.0, 1.0));
        let quat = UnitQuaternion::from_axis_angle(&axis, 2.0);
        let neg = UnitQuaternion::new_unchecked(-quat.into_inner());

        let a = quat_to_rotation_vector(quat);
        let b = quat_to_rotation_vector(neg);

        assert!((a - b).norm() < 1e-12);
    }
}
