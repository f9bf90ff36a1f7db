//! Playback of a model's sequences.

use cgmath::Matrix4;
use crate::errors::Result;
use crate::skeleton::{blend_frames, world_matrices};
use crate::studio::{Model, Sequence};

/// Plays one sequence of a model on a loop and poses the skeleton for the
/// current time.
///
/// Only borrows the model, so any number of evaluators can play the same
/// model at once.
pub struct PoseEvaluator<'a> {
    model: &'a Model,
    sequence: usize,
    /// Seconds since the start of the sequence.
    elapsed: f32,
    /// Fractional frame number corresponding to `elapsed`.
    current_frame: f32,
}

impl<'a> PoseEvaluator<'a> {
    /// Starts at time 0 of the first sequence.
    pub fn new(model: &'a Model) -> PoseEvaluator<'a> {
        PoseEvaluator {
            model,
            sequence: 0,
            elapsed: 0.0,
            current_frame: 0.0,
        }
    }

    pub fn sequence(&self) -> usize { self.sequence }
    pub fn current_frame(&self) -> f32 { self.current_frame }
    pub fn elapsed(&self) -> f32 { self.elapsed }

    /// Switches to another sequence and rewinds to its start.
    pub fn set_sequence(&mut self, sequence: usize) -> Result<()> {
        if sequence >= self.model.sequences.len() {
            out_of_range!("sequence {}, but the model has {}",
                sequence, self.model.sequences.len());
        }
        self.sequence = sequence;
        self.elapsed = 0.0;
        self.current_frame = 0.0;
        Ok(())
    }

    fn active(&self) -> Result<&'a Sequence> {
        match self.model.sequences.get(self.sequence) {
            Some(seq) => Ok(seq),
            None => out_of_range!("sequence {}, but the model has {}",
                self.sequence, self.model.sequences.len()),
        }
    }

    /// Length of the active sequence in seconds.
    pub fn duration(&self) -> Result<f32> {
        let seq = self.active()?;
        if !(seq.fps > 0.0) {
            bad_format!("sequence {} has frame rate {}", seq.name, seq.fps);
        }
        Ok(seq.frames.len() as f32 / seq.fps)
    }

    /// Moves the clock forward by `dt` seconds. Reaching the end of the
    /// sequence jumps back to the start; the overshoot is dropped.
    pub fn advance(&mut self, dt: f32) -> Result<()> {
        let duration = self.duration()?;
        let num_frames = self.active()?.frames.len() as f32;

        self.elapsed += dt;
        if self.elapsed >= duration {
            self.elapsed = 0.0;
        }
        self.current_frame = num_frames * self.elapsed / duration;
        Ok(())
    }

    /// Local-to-world matrix of every bone at the current time, blending
    /// the two frames on either side of it.
    pub fn evaluate(&self) -> Result<Vec<Matrix4<f32>>> {
        let seq = self.active()?;
        let num_frames = seq.frames.len();
        if num_frames == 0 {
            out_of_range!("sequence {} has no frames", seq.name);
        }

        let i = self.current_frame.floor();
        if !(i >= 0.0) || i as usize > num_frames {
            out_of_range!("frame {} of sequence {} with {} frames",
                self.current_frame, seq.name, num_frames);
        }
        let t = self.current_frame - i;
        // Just short of the end, the frame number can round up to
        // `num_frames`, which is the same as frame 0.
        let i = i as usize % num_frames;
        let j = (i + 1) % num_frames;

        let frame = blend_frames(&seq.frames[i], &seq.frames[j], t);
        world_matrices(&self.model.bones, &frame)
    }

    /// Poses the skeleton for the current time, then advances the clock.
    pub fn tick(&mut self, dt: f32) -> Result<Vec<Matrix4<f32>>> {
        let pose = self.evaluate()?;
        self.advance(dt)?;
        Ok(pose)
    }
}

#[cfg(test)]
fn test_model() -> Model {
    use crate::skeleton::test_bone;
    use crate::studio::Frame;
    use crate::util::name::Name;
    use cgmath::{vec3, One, Quaternion};

    // The child slides along x: 0, 1, 2, 3.
    let frames = (0..4)
        .map(|f| Frame {
            rotations: vec![Quaternion::one(); 2],
            positions: vec![vec3(0.0, 0.0, 1.0), vec3(f as f32, 0.0, 0.0)],
        })
        .collect();

    Model {
        name: Name::from("test"),
        bones: vec![test_bone("root", None), test_bone("child", Some(0))],
        textures: vec![],
        meshes: vec![],
        sequences: vec![
            Sequence { name: Name::from("slide"), fps: 4.0, frames, ground_speed: 0.0 },
            Sequence { name: Name::from("broken"), fps: 0.0, frames: vec![], ground_speed: 0.0 },
        ],
    }
}

#[test]
fn test_evaluate_on_frames() {
    use cgmath::vec3;

    let model = test_model();
    let mut eval = PoseEvaluator::new(&model);

    let pose = eval.evaluate().unwrap();
    assert_eq!(pose.len(), 2);
    assert_eq!(pose[1].w.truncate(), vec3(0.0, 0.0, 1.0));

    // 4 frames at 4 fps: one frame per quarter second.
    eval.advance(0.5).unwrap();
    assert_eq!(eval.current_frame(), 2.0);
    let pose = eval.evaluate().unwrap();
    assert_eq!(pose[1].w.truncate(), vec3(2.0, 0.0, 1.0));
}

#[test]
fn test_evaluate_between_frames() {
    let model = test_model();
    let mut eval = PoseEvaluator::new(&model);

    eval.advance(0.125).unwrap();
    assert_eq!(eval.current_frame(), 0.5);
    let x = eval.evaluate().unwrap()[1].w.x;
    assert!((x - 0.5).abs() < 1e-6);
}

#[test]
fn test_last_frame_blends_toward_first() {
    let model = test_model();
    let mut eval = PoseEvaluator::new(&model);

    eval.advance(0.875).unwrap();
    assert_eq!(eval.current_frame(), 3.5);
    // Halfway between frame 3 (x=3) and frame 0 (x=0).
    let x = eval.evaluate().unwrap()[1].w.x;
    assert!((x - 1.5).abs() < 1e-6);
}

#[test]
fn test_loops_back_to_start() {
    let model = test_model();
    let mut eval = PoseEvaluator::new(&model);
    let duration = eval.duration().unwrap();
    assert_eq!(duration, 1.0);

    eval.advance(duration).unwrap();
    assert_eq!(eval.elapsed(), 0.0);
    assert_eq!(eval.current_frame(), 0.0);

    // Overshoot isn't carried over.
    eval.advance(0.75).unwrap();
    eval.advance(0.5).unwrap();
    assert_eq!(eval.current_frame(), 0.0);
}

#[test]
fn test_frame_rounding_up_to_the_end() {
    use crate::studio::Frame;
    use crate::util::name::Name;
    use cgmath::{vec3, One, Quaternion};

    let frames = (0..9)
        .map(|f| Frame {
            rotations: vec![Quaternion::one()],
            positions: vec![vec3(f as f32, 0.0, 0.0)],
        })
        .collect();
    let model = Model {
        name: Name::from("test"),
        bones: vec![crate::skeleton::test_bone("root", None)],
        textures: vec![],
        meshes: vec![],
        sequences: vec![Sequence { name: Name::from("s"), fps: 10.0, frames, ground_speed: 0.0 }],
    };
    let mut eval = PoseEvaluator::new(&model);

    // The last time before the duration; 9 * elapsed / 0.9 rounds to 9.
    let duration = eval.duration().unwrap();
    let last = f32::from_bits(duration.to_bits() - 1);
    eval.advance(last).unwrap();
    assert!(eval.elapsed() < duration);
    assert!(eval.current_frame() <= 9.0);

    // Frame 8 blending into frame 0, all but done.
    let x = eval.evaluate().unwrap()[0].w.x;
    assert!(x.abs() < 1e-3, "{}", x);
}

#[test]
fn test_tick_poses_before_advancing() {
    let model = test_model();
    let mut eval = PoseEvaluator::new(&model);

    let pose = eval.tick(0.25).unwrap();
    assert_eq!(pose[1].w.x, 0.0);
    assert_eq!(eval.current_frame(), 1.0);
    let pose = eval.tick(0.25).unwrap();
    assert_eq!(pose[1].w.x, 1.0);
}

#[test]
fn test_set_sequence() {
    use crate::errors::ErrorKind;

    let model = test_model();
    let mut eval = PoseEvaluator::new(&model);
    eval.advance(0.5).unwrap();

    assert!(eval.set_sequence(2).is_err());
    assert_eq!(eval.sequence(), 0);

    eval.set_sequence(1).unwrap();
    assert_eq!(eval.sequence(), 1);
    assert_eq!(eval.current_frame(), 0.0);

    // Zero frame rate and no frames.
    match eval.advance(0.1) {
        Err(e) => assert!(match e.kind() { ErrorKind::Format(_) => true, _ => false }),
        Ok(()) => panic!("advanced a sequence with fps 0"),
    }
    match eval.evaluate() {
        Err(e) => assert!(match e.kind() { ErrorKind::OutOfRange(_) => true, _ => false }),
        Ok(_) => panic!("evaluated a sequence with no frames"),
    }
}

#[test]
fn test_loaded_model_plays() {
    use crate::studio::load_model;
    use crate::studio::test_file::{TestBone, TestFile, TestSequence};

    let file = TestFile {
        name: "walker".into(),
        bones: vec![
            TestBone::new("root", -1, [0.0, 0.0, 0.0]),
            TestBone::new("foot", 0, [0.0, 0.0, -4.0]),
        ],
        textures: vec![],
        skin_refs: vec![],
        positions: vec![],
        normals: vec![],
        vertex_bones: vec![],
        meshes: vec![],
        sequences: vec![TestSequence {
            name: "step".into(),
            fps: 2.0,
            num_frames: 2,
            seq_group: 0,
            anims: vec![(1, 1, vec![(2, 2, vec![0, 6])])],
        }],
    };
    let model = load_model(&file.build()).unwrap();
    let mut eval = PoseEvaluator::new(&model);

    eval.advance(0.25).unwrap();
    let pose = eval.evaluate().unwrap();
    assert!((pose[1].w.y - 3.0).abs() < 1e-6);
    assert_eq!(pose[1].w.z, -4.0);
}
