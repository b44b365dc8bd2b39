// atlas_core/src/geometry/quaternion.rs

use nalgebra::{Matrix3, Matrix3x4, Quaternion, Vector3};

// Quaternion components are ordered scalar-first (w, x, y, z) everywhere in
// this crate, matching the pose state layout [p; q] with q(0) = w.

/// Rotates `v` by the quaternion `q`, expressed as the full quadratic
/// expansion `(w^2 - |q_v|^2) v + 2 (q_v . v) q_v + 2 w (q_v x v)`.
///
/// For a unit quaternion this is the usual frame rotation. The expansion is
/// kept in this raw form (rather than going through `UnitQuaternion`) so that
/// [`rotate_jacobian`] is its exact derivative with respect to all four
/// quaternion components, which is what the covariance propagation needs.
pub fn rotate(q: &Quaternion<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    let w = q.w;
    let qv = q.imag();
    v * (w * w - qv.norm_squared()) + qv * (2.0 * qv.dot(v)) + qv.cross(v) * (2.0 * w)
}

/// Analytic 3x4 derivative of [`rotate`] with respect to the quaternion,
/// columns ordered (w, x, y, z):
///
/// - d/dw     = 2 (w v + q_v x v)
/// - d/dq_v   = 2 ((q_v . v) I + q_v v^T - v q_v^T - w [v]x)
pub fn rotate_jacobian(q: &Quaternion<f64>, v: &Vector3<f64>) -> Matrix3x4<f64> {
    let w = q.w;
    let qv = q.imag();

    let col_w = (v * w + qv.cross(v)) * 2.0;
    let block = (Matrix3::identity() * qv.dot(v) + qv * v.transpose()
        - v * qv.transpose()
        - skew(v) * w)
        * 2.0;

    let mut jac = Matrix3x4::zeros();
    jac.set_column(0, &col_w);
    jac.fixed_view_mut::<3, 3>(0, 1).copy_from(&block);
    jac
}

/// Cross-product matrix `[v]x` such that `[v]x u = v x u`.
fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}
