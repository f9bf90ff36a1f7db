//! Pose the skeleton.
//!
//! Each frame of a sequence gives every bone a local rotation and position
//! relative to its parent. To get a bone's local-to-world transform we
//! compose those up the tree:
//!
//!      A       A's local-to-parent = a, B's = b, etc.
//!     / \      D's local-to-world = a c d
//!    B   C
//!       /
//!      D
//!
//! Parents always come before their children, so one pass in bone order
//! does it.

pub mod pose;

pub use self::pose::PoseEvaluator;

use cgmath::{Matrix4, Quaternion, Vector3};
use crate::errors::Result;
use crate::studio::{Bone, Frame};

/// Blend between two frames. `t = 0` gives `curr`, `t = 1` gives `next`.
///
/// Rotations are blended component-wise and NOT renormalized, so in between
/// frames they can pick up a little scale. That's how the engine does it.
pub fn blend_frames(curr: &Frame, next: &Frame, t: f32) -> Frame {
    let s = 1.0 - t;
    let rotations = curr.rotations.iter().zip(&next.rotations)
        .map(|(&a, &b)| a * s + b * t)
        .collect();
    let positions = curr.positions.iter().zip(&next.positions)
        .map(|(&a, &b)| a * s + b * t)
        .collect();
    Frame { rotations, positions }
}

/// Local-to-parent matrix: rotate, then translate.
pub fn local_matrix(rotation: Quaternion<f32>, position: Vector3<f32>) -> Matrix4<f32> {
    let mut m = Matrix4::from(rotation);
    m.w = position.extend(1.0);
    m
}

/// Computes every bone's local-to-world matrix for a (possibly blended)
/// frame.
pub fn world_matrices(bones: &[Bone], frame: &Frame) -> Result<Vec<Matrix4<f32>>> {
    if frame.rotations.len() < bones.len() || frame.positions.len() < bones.len() {
        out_of_range!("frame has {} bones, skeleton has {}",
            frame.rotations.len().min(frame.positions.len()), bones.len());
    }

    let mut world: Vec<Matrix4<f32>> = Vec::with_capacity(bones.len());
    for (i, bone) in bones.iter().enumerate() {
        let local = local_matrix(frame.rotations[i], frame.positions[i]);
        let mat = match bone.parent {
            None => local,
            Some(p) => {
                if p >= i {
                    out_of_range!("bone {} has parent {} which isn't posed yet", i, p);
                }
                world[p] * local
            }
        };
        world.push(mat);
    }
    Ok(world)
}

#[cfg(test)]
pub fn test_bone(name: &str, parent: Option<usize>) -> Bone {
    use crate::util::name::Name;
    Bone {
        name: Name::from(name),
        parent,
        flags: 0,
        value: [0.0; 6],
        scale: [1.0; 6],
    }
}

#[cfg(test)]
fn translation(m: &Matrix4<f32>) -> Vector3<f32> {
    m.w.truncate()
}

#[test]
fn test_chain_composes_translations() {
    use cgmath::{vec3, One};

    let bones = vec![
        test_bone("root", None),
        test_bone("a", Some(0)),
        test_bone("b", Some(1)),
    ];
    let frame = Frame {
        rotations: vec![Quaternion::one(); 3],
        positions: vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)],
    };

    let world = world_matrices(&bones, &frame).unwrap();
    assert_eq!(translation(&world[1]), vec3(1.0, 0.0, 0.0));
    assert_eq!(translation(&world[2]), vec3(1.0, 1.0, 0.0));
}

#[test]
fn test_parent_rotation_moves_child() {
    use cgmath::{vec3, InnerSpace, One};
    use crate::studio::rotation::quat_from_euler;
    use std::f32::consts::FRAC_PI_2;

    let bones = vec![test_bone("root", None), test_bone("arm", Some(0))];
    let frame = Frame {
        rotations: vec![quat_from_euler(0.0, 0.0, FRAC_PI_2), Quaternion::one()],
        positions: vec![vec3(0.0, 0.0, 5.0), vec3(2.0, 0.0, 0.0)],
    };

    let world = world_matrices(&bones, &frame).unwrap();
    // The arm's x offset gets turned onto y.
    let got = translation(&world[1]);
    assert!((got - vec3(0.0, 2.0, 5.0)).magnitude() < 1e-5, "{:?}", got);
}

#[test]
fn test_blend_endpoints_are_exact() {
    use crate::studio::rotation::quat_from_euler;
    use cgmath::vec3;

    let a = Frame {
        rotations: vec![quat_from_euler(0.3, -0.2, 1.1)],
        positions: vec![vec3(1.0, 2.0, 3.0)],
    };
    let b = Frame {
        rotations: vec![quat_from_euler(-0.7, 0.4, 0.1)],
        positions: vec![vec3(-4.0, 0.5, 8.0)],
    };
    assert_eq!(blend_frames(&a, &b, 0.0), a);
    assert_eq!(blend_frames(&a, &b, 1.0), b);

    let mid = blend_frames(&a, &b, 0.5);
    assert_eq!(mid.positions[0], vec3(-1.5, 1.25, 5.5));
}

#[test]
fn test_blend_is_not_renormalized() {
    use cgmath::{vec3, InnerSpace};
    use crate::studio::rotation::quat_from_euler;
    use std::f32::consts::PI;

    let a = Frame { rotations: vec![quat_from_euler(0.0, 0.0, 0.0)], positions: vec![vec3(0.0, 0.0, 0.0)] };
    let b = Frame { rotations: vec![quat_from_euler(0.0, 0.0, PI / 2.0)], positions: vec![vec3(0.0, 0.0, 0.0)] };
    let mid = blend_frames(&a, &b, 0.5);
    assert!(mid.rotations[0].magnitude() < 0.99);
}

#[test]
fn test_bad_parent() {
    use cgmath::{vec3, One};

    let bones = vec![test_bone("a", Some(1)), test_bone("b", None)];
    let frame = Frame {
        rotations: vec![Quaternion::one(); 2],
        positions: vec![vec3(0.0, 0.0, 0.0); 2],
    };
    assert!(world_matrices(&bones, &frame).is_err());
}
