//! Skeletal animation sequences.
//!
//! A sequence's animation data starts with one `mstudioanim_t` record per
//! bone: six u16 offsets, one per channel (position x,y,z, rotation x,y,z),
//! relative to the start of that record. An offset of 0 means the channel
//! isn't animated and holds the bone's rest value.
//!
//! A non-zero offset points to a run-length compressed stream of int16
//! values, made of spans. Each span is a header (two bytes, `valid` and
//! `total`) followed by `valid` values and covers `total` frames. Frames past
//! `valid` in a span repeat its last stored value.
//!
//!      |  valid=3, total=5      valid=1, total=2
//!      | [h][a][b][c]           [h][d]
//!      |  a  b  c  c  c          d  d
//!      |_________________________________ frame
//!
//! The decoded value for a channel is `value + raw * scale` with the bone's
//! `value` and `scale` for that channel.

use cgmath::{Quaternion, Vector3};
use crate::errors::Result;
use crate::studio::bone::Bone;
use crate::studio::header::Header;
use crate::studio::rotation::quat_from_euler;
use crate::util::cur::{at_offset, count, table_at, Cur};
use crate::util::name::Name;

pub const SEQ_DESC_SIZE: usize = 176;
pub const ANIM_SIZE: usize = 12;

/// Frame count limit for one sequence. Frames where no channel is animated
/// don't read anything from the file, so the stored count can't be checked
/// against the buffer size.
pub const MAX_FRAMES: usize = 8192;

pub struct Sequence {
    pub name: Name,
    pub fps: f32,
    /// One frame for every frame of the clip.
    pub frames: Vec<Frame>,
    /// Root motion speed. Always 0: linear movement isn't applied.
    pub ground_speed: f32,
}

/// The pose of the whole skeleton at one frame, before applying the
/// hierarchy. Indexed like the bones.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rotations: Vec<Quaternion<f32>>,
    pub positions: Vec<Vector3<f32>>,
}

/// One of a bone's six animated channels.
#[derive(Debug, Copy, Clone)]
pub enum Channel<'a> {
    /// The channel holds the bone's rest value for all time.
    Constant,
    /// Span stream starting at the cursor.
    Spans(Cur<'a>),
}

impl<'a> Channel<'a> {
    /// Reads channel `idx` of the bone's animation record at `anim`.
    pub fn read(anim: Cur<'a>, idx: usize) -> Result<Channel<'a>> {
        let off = anim.nth::<u16>(idx)?;
        Ok(match off {
            0 => Channel::Constant,
            off => Channel::Spans(anim + off),
        })
    }

    /// Raw stored value for `frame`, or `None` for a constant channel.
    pub fn sample(&self, frame: usize) -> Result<Option<i16>> {
        let mut cur = match *self {
            Channel::Constant => return Ok(None),
            Channel::Spans(cur) => cur,
        };

        // Find the span that covers the frame.
        let mut k = frame;
        loop {
            let (valid, total) = cur.next::<(u8, u8)>()?;
            let (valid, total) = (valid as usize, total as usize);

            if k < total {
                if valid == 0 {
                    bad_format!("span covering frame {} has no values", frame);
                }
                // Past the stored values the last one holds.
                let idx = k.min(valid - 1);
                return Ok(Some(cur.nth::<i16>(idx)?));
            }

            k -= total;
            cur.jump_forward(2 * valid);
        }
    }

    /// Decoded value of the channel: the bone's rest value plus the scaled
    /// stored value.
    pub fn value_at(&self, bone: &Bone, channel: usize, frame: usize) -> Result<f32> {
        Ok(match self.sample(frame)? {
            None => bone.value[channel],
            Some(raw) => bone.value[channel] + raw as f32 * bone.scale[channel],
        })
    }
}

pub fn read_sequences(cur: Cur, hdr: &Header, bones: &[Bone]) -> Result<Vec<Sequence>> {
    if hdr.num_seqs == 0 {
        return Ok(vec![]);
    }

    let table = table_at(cur, hdr.seq_index, hdr.num_seqs, SEQ_DESC_SIZE)?;
    let mut sequences = Vec::with_capacity(hdr.num_seqs);
    for i in 0..hdr.num_seqs {
        if let Some(seq) = read_sequence(cur, table + i * SEQ_DESC_SIZE, bones)? {
            sequences.push(seq);
        }
    }
    Ok(sequences)
}

fn read_sequence(base: Cur, cur: Cur, bones: &[Bone]) -> Result<Option<Sequence>> {
    fields!(cur, mstudioseqdesc {
        label: (name(32)),
        fps: f32,
        flags: i32,
        activity: i32,
        act_weight: i32,
        num_events: i32,
        event_index: i32,
        num_frames: i32,
        num_pivots: i32,
        pivot_index: i32,
        motion_type: i32,
        motion_bone: i32,
        linear_movement: (f32, f32, f32),
        auto_move_pos_index: i32,
        auto_move_angle_index: i32,
        bbmin: (f32, f32, f32),
        bbmax: (f32, f32, f32),
        num_blends: i32,
        anim_index: i32,
        blend_type: [i32; 2],
        blend_start: [f32; 2],
        blend_end: [f32; 2],
        blend_parent: i32,
        seq_group: i32,
    });

    if seq_group != 0 {
        warn!("sequence {} is stored in sequence group file {}; skipping it",
            label, seq_group);
        return Ok(None);
    }
    if num_blends > 1 {
        debug!("sequence {} has {} blends; only the first is used", label, num_blends);
    }

    let num_frames = count("frame", num_frames)?;
    let anim = at_offset(base, anim_index)?;
    let frames = build_frames(anim, bones, num_frames)?;

    debug!("sequence {}: {} frames at {} fps", label, num_frames, fps);

    Ok(Some(Sequence {
        name: label,
        fps,
        frames,
        ground_speed: 0.0,
    }))
}

/// Decodes every frame of an animation, starting at the table of per-bone
/// animation records at `anim`.
pub fn build_frames(anim: Cur, bones: &[Bone], num_frames: usize) -> Result<Vec<Frame>> {
    if num_frames > MAX_FRAMES {
        bad_format!("{} frames, at most {} are supported", num_frames, MAX_FRAMES);
    }

    // The channel streams don't change from frame to frame; look them up once.
    let channels = (0..bones.len())
        .map(|i| read_channels(anim + i * ANIM_SIZE))
        .collect::<Result<Vec<_>>>()?;

    let mut frames = Vec::with_capacity(num_frames);
    for frame in 0..num_frames {
        let mut rotations = Vec::with_capacity(bones.len());
        let mut positions = Vec::with_capacity(bones.len());

        for (bone, chans) in bones.iter().zip(&channels) {
            let mut v = [0.0f32; 6];
            for (j, chan) in chans.iter().enumerate() {
                v[j] = chan.value_at(bone, j, frame)?;
            }
            positions.push(Vector3::new(v[0], v[1], v[2]));
            rotations.push(quat_from_euler(v[3], v[4], v[5]));
        }

        frames.push(Frame { rotations, positions });
    }
    Ok(frames)
}

fn read_channels(rec: Cur) -> Result<[Channel; 6]> {
    let mut chans = [Channel::Constant; 6];
    for (j, chan) in chans.iter_mut().enumerate() {
        *chan = Channel::read(rec, j)?;
    }
    Ok(chans)
}

#[cfg(test)]
fn spans_bytes(spans: &[(u8, u8, &[i16])]) -> Vec<u8> {
    let mut buf = vec![];
    for &(valid, total, values) in spans {
        buf.push(valid);
        buf.push(total);
        for v in values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }
    buf
}

#[test]
fn test_last_valid_value_holds() {
    let buf = spans_bytes(&[(2, 5, &[10, 20][..])]);
    let chan = Channel::Spans(Cur::new(&buf));
    let got = (0..5).map(|f| chan.sample(f).unwrap()).collect::<Vec<_>>();
    assert_eq!(got, vec![Some(10), Some(20), Some(20), Some(20), Some(20)]);
}

#[test]
fn test_walks_spans() {
    let buf = spans_bytes(&[(3, 3, &[1, 2, 3][..]), (1, 4, &[-7][..]), (2, 2, &[5, 6][..])]);
    let chan = Channel::Spans(Cur::new(&buf));
    let got = (0..9).map(|f| chan.sample(f).unwrap().unwrap()).collect::<Vec<_>>();
    assert_eq!(got, vec![1, 2, 3, -7, -7, -7, -7, 5, 6]);

    // Past the last span.
    assert!(chan.sample(9).is_err());
}

#[test]
fn test_empty_covering_span() {
    let buf = spans_bytes(&[(0, 4, &[0i16; 0][..])]);
    assert!(Channel::Spans(Cur::new(&buf)).sample(0).is_err());
}

#[test]
fn test_value_scaling() {
    let bone = Bone {
        name: Name::from("b"),
        parent: None,
        flags: 0,
        value: [1.0, 2.0, 3.0, 0.5, 0.0, 0.0],
        scale: [0.5, 0.5, 0.5, 0.25, 0.25, 0.25],
    };
    let buf = spans_bytes(&[(1, 1, &[4][..])]);
    let chan = Channel::Spans(Cur::new(&buf));
    assert_eq!(chan.value_at(&bone, 0, 0).unwrap(), 3.0);
    assert_eq!(chan.value_at(&bone, 3, 0).unwrap(), 1.5);
    // Constant channels use the rest value unscaled.
    assert_eq!(Channel::Constant.value_at(&bone, 1, 7).unwrap(), 2.0);
}

#[test]
fn test_read_channel_offsets() {
    // Record with channel 2 pointing just past it.
    let mut buf = vec![0u8; ANIM_SIZE];
    buf[4..6].copy_from_slice(&(ANIM_SIZE as u16).to_le_bytes());
    buf.extend(spans_bytes(&[(1, 3, &[9][..])]));

    let rec = Cur::new(&buf);
    assert!(match Channel::read(rec, 0).unwrap() { Channel::Constant => true, _ => false });
    assert_eq!(Channel::read(rec, 2).unwrap().sample(2).unwrap(), Some(9));
}
