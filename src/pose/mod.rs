//! Print a posed skeleton.

use cgmath::Matrix4;
use clap::ArgMatches;
use crate::errors::Result;
use crate::skeleton::PoseEvaluator;
use crate::studio::{load_model, Model};
use crate::util::read_file;
use std::path::Path;

pub fn main(matches: &ArgMatches) -> Result<()> {
    let path = Path::new(matches.value_of_os("INPUT").unwrap());
    let buf = read_file(path)?;
    let model = load_model(&buf)?;

    if model.sequences.is_empty() {
        bail!("{} has no sequences", path.display());
    }

    let seq = match matches.value_of("SEQUENCE") {
        Some(s) => find_sequence(&model, s)?,
        None => 0,
    };
    let time = match matches.value_of("TIME") {
        Some(t) => parse_time(t)?,
        None => 0.0,
    };

    let mut eval = PoseEvaluator::new(&model);
    eval.set_sequence(seq)?;
    // Like playback, running past the end wraps back to the start.
    if time > 0.0 {
        eval.advance(time)?;
    }
    let pose = eval.evaluate()?;

    println!("Sequence {:?} at {}s (frame {})",
        model.sequences[seq].name, eval.elapsed(), eval.current_frame());
    for (i, (bone, mat)) in model.bones.iter().zip(&pose).enumerate() {
        println!("  Bone {}: {:?}", i, bone.name);
        print_matrix(mat);
    }

    Ok(())
}

/// Looks a sequence up by name, then by index.
fn find_sequence(model: &Model, s: &str) -> Result<usize> {
    if let Some(i) = model.sequences.iter().position(|seq| seq.name.to_string() == s) {
        return Ok(i);
    }
    match s.parse::<usize>() {
        Ok(i) => Ok(i),
        Err(_) => bail!("no sequence named {:?}", s),
    }
}

fn parse_time(s: &str) -> Result<f32> {
    match s.parse::<f32>() {
        Ok(t) if t.is_finite() && t >= 0.0 => Ok(t),
        _ => bail!("expected a non-negative number of seconds, found {:?}", s),
    }
}

fn print_matrix(m: &Matrix4<f32>) {
    // cgmath is column-major; print it the way it's usually written.
    for row in 0..4 {
        println!("    [{:10.4} {:10.4} {:10.4} {:10.4}]",
            m.x[row], m.y[row], m.z[row], m.w[row]);
    }
}

#[test]
fn test_parse_time() {
    assert_eq!(parse_time("0.5").unwrap(), 0.5);
    assert!(parse_time("-1").is_err());
    assert!(parse_time("soon").is_err());
}
