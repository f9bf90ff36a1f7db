//! Bone rotations are stored as three Euler angles (radians), one per
//! animation channel.

use cgmath::Quaternion;

/// Quaternion for the Euler angles `(x, y, z)`, applied x first, then y,
/// then z (ie. `qz * qy * qx`).
pub fn quat_from_euler(x: f32, y: f32, z: f32) -> Quaternion<f32> {
    let (sx, cx) = (x * 0.5).sin_cos();
    let (sy, cy) = (y * 0.5).sin_cos();
    let (sz, cz) = (z * 0.5).sin_cos();

    Quaternion::new(
        cx * cy * cz + sx * sy * sz,
        sx * cy * cz - cx * sy * sz,
        cx * sy * cz + sx * cy * sz,
        cx * cy * sz - sx * sy * cz,
    )
}

#[cfg(test)]
fn assert_close(a: cgmath::Vector3<f32>, b: cgmath::Vector3<f32>) {
    use cgmath::InnerSpace;
    assert!((a - b).magnitude() < 1e-5, "{:?} != {:?}", a, b);
}

#[test]
fn test_single_axis() {
    use cgmath::vec3;
    use std::f32::consts::FRAC_PI_2;

    let q = quat_from_euler(0.0, 0.0, FRAC_PI_2);
    assert_close(q * vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0));

    let q = quat_from_euler(FRAC_PI_2, 0.0, 0.0);
    assert_close(q * vec3(0.0, 1.0, 0.0), vec3(0.0, 0.0, 1.0));

    let q = quat_from_euler(0.0, FRAC_PI_2, 0.0);
    assert_close(q * vec3(0.0, 0.0, 1.0), vec3(1.0, 0.0, 0.0));
}

#[test]
fn test_order_is_x_then_y_then_z() {
    use cgmath::vec3;
    use std::f32::consts::FRAC_PI_2;

    let q = quat_from_euler(FRAC_PI_2, FRAC_PI_2, 0.0);
    // x: (0,1,0) -> (0,0,1); then y: (0,0,1) -> (1,0,0).
    assert_close(q * vec3(0.0, 1.0, 0.0), vec3(1.0, 0.0, 0.0));
}

#[test]
fn test_zero_is_identity() {
    assert_eq!(quat_from_euler(0.0, 0.0, 0.0), Quaternion::new(1.0, 0.0, 0.0, 0.0));
}
