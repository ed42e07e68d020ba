//! Inspect command - decode a .rec file and print it

use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use demorec_core::replay::{BinaryReader, FORMAT_VERSION, FrameFields, Recording};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Recording to decode (.rec)
    pub file: PathBuf,

    /// Number of frames to print (0 = header only)
    #[arg(short, long, default_value_t = 5)]
    pub frames: usize,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open recording: {}", args.file.display()))?;
    let mut reader = BinaryReader::new(BufReader::new(file));
    let recording = reader
        .read_recording()
        .with_context(|| format!("Failed to decode recording: {}", args.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    print_recording(&mut out, &recording, args.frames)?;
    Ok(())
}

/// Human-readable dump of the header, summary counts and the first frames.
pub fn print_recording(
    out: &mut impl Write,
    recording: &Recording,
    frames: usize,
) -> std::io::Result<()> {
    let header = &recording.header;
    writeln!(out, "=== Recording (v{FORMAT_VERSION}) ===")?;
    writeln!(out, "Player: {}", header.name)?;
    writeln!(out, "Timestamp: {}", header.timestamp)?;
    writeln!(
        out,
        "Start: ({:.2}, {:.2}, {:.2})  pitch {:.2}  yaw {:.2}",
        header.position.x, header.position.y, header.position.z, header.angles.x, header.angles.y
    )?;
    writeln!(out, "Ticks: {}", recording.tick_count())?;
    writeln!(out, "Keyframes: {}", recording.keyframe_count())?;

    let shown = frames.min(recording.frames.len());
    if shown == 0 {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:>6}  {:>8}  {:>28}  {:>20}  {:>6}  {:>6}",
        "frame", "buttons", "origin", "predicted vel", "weapon", "fields"
    )?;
    for (index, frame) in recording.frames.iter().take(shown).enumerate() {
        let origin = format!(
            "({:.1}, {:.1}, {:.1})",
            frame.origin.x, frame.origin.y, frame.origin.z
        );
        let predicted = format!(
            "({:.0}, {:.0})",
            frame.predicted_velocity.x, frame.predicted_velocity.y
        );
        writeln!(
            out,
            "{:>6}  {:>#8x}  {:>28}  {:>20}  {:>6}  {:>6}",
            index,
            frame.buttons.bits(),
            origin,
            predicted,
            frame.weapon,
            field_letters(frame.fields)
        )?;
    }
    if shown < recording.frames.len() {
        writeln!(out, "... {} more", recording.frames.len() - shown)?;
    }
    Ok(())
}

fn field_letters(fields: FrameFields) -> String {
    let mut letters = String::new();
    if fields.contains(FrameFields::ORIGIN) {
        letters.push('O');
    }
    if fields.contains(FrameFields::ANGLES) {
        letters.push('A');
    }
    if fields.contains(FrameFields::VELOCITY) {
        letters.push('V');
    }
    if letters.is_empty() {
        letters.push('-');
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::*;
    use demorec_core::replay::{Frame, RecordingHeader};

    fn sample() -> Recording {
        let mut recording = Recording::new(RecordingHeader {
            timestamp: 42,
            name: "alice".into(),
            ..RecordingHeader::default()
        });
        recording.frames = vec![Frame::default(); 3];
        recording.frames[0].fields = FrameFields::ORIGIN | FrameFields::VELOCITY;
        recording
    }

    #[test]
    fn test_field_letters() {
        assert_eq!(field_letters(FrameFields::empty()), "-");
        assert_eq!(field_letters(FrameFields::all()), "OAV");
    }

    #[test]
    fn test_print_recording() {
        let mut out = Vec::new();
        print_recording(&mut out, &sample(), 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Player: alice"));
        assert!(text.contains("Ticks: 3"));
        assert!(text.contains("Keyframes: 1"));
        assert!(text.contains("... 1 more"));
    }

    #[test]
    fn test_print_header_only() {
        let mut out = Vec::new();
        print_recording(&mut out, &sample(), 0).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("buttons"));
    }
}
