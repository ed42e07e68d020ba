//! Binary recording writer
//!
//! Writes `.rec` files in the version 2 layout.

use crate::replay::types::*;
use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Vec2, Vec3};
use std::io::{self, Write};

/// Writer for the binary recording format
pub struct BinaryWriter<W: Write> {
    writer: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a complete recording to the output
    pub fn write_recording(&mut self, recording: &Recording) -> io::Result<()> {
        self.write_header(&recording.header)?;

        let tick_count = i32::try_from(recording.frames.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many frames"))?;
        self.writer.write_i32::<LittleEndian>(tick_count)?;
        // Bookmarks are not produced.
        self.writer.write_i32::<LittleEndian>(0)?;

        for frame in &recording.frames {
            self.write_frame(frame)?;
        }
        Ok(())
    }

    fn write_header(&mut self, header: &RecordingHeader) -> io::Result<()> {
        let name = header.name.as_bytes();
        if name.len() > MAX_NAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("participant name is {} bytes (max {MAX_NAME_LEN})", name.len()),
            ));
        }

        self.writer.write_i32::<LittleEndian>(MAGIC)?;
        self.writer.write_u8(FORMAT_VERSION)?;
        self.writer.write_i32::<LittleEndian>(header.timestamp)?;
        self.writer.write_u8(name.len() as u8)?;
        self.writer.write_all(name)?;
        self.write_vec3(header.position)?;
        self.write_vec2(header.angles)?;
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        self.writer.write_i32::<LittleEndian>(frame.buttons.bits())?;
        self.writer.write_i32::<LittleEndian>(frame.impulse)?;
        self.write_vec3(frame.actual_velocity)?;
        self.write_vec3(frame.predicted_velocity)?;
        self.write_vec2(frame.predicted_angles)?;
        self.write_vec3(frame.origin)?;
        self.writer.write_i32::<LittleEndian>(frame.weapon)?;
        self.writer.write_i32::<LittleEndian>(frame.subtype)?;
        self.writer.write_i32::<LittleEndian>(frame.seed)?;
        self.writer.write_i32::<LittleEndian>(frame.fields.bits())?;

        if frame.fields.contains(FrameFields::ORIGIN) {
            self.write_vec3(frame.at_origin)?;
        }
        if frame.fields.contains(FrameFields::ANGLES) {
            self.write_vec3(frame.at_angles)?;
        }
        if frame.fields.contains(FrameFields::VELOCITY) {
            self.write_vec3(frame.at_velocity)?;
        }
        Ok(())
    }

    fn write_vec3(&mut self, v: Vec3) -> io::Result<()> {
        self.writer.write_f32::<LittleEndian>(v.x)?;
        self.writer.write_f32::<LittleEndian>(v.y)?;
        self.writer.write_f32::<LittleEndian>(v.z)
    }

    fn write_vec2(&mut self, v: Vec2) -> io::Result<()> {
        self.writer.write_f32::<LittleEndian>(v.x)?;
        self.writer.write_f32::<LittleEndian>(v.y)
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Encodes a recording into a fresh buffer.
pub fn encode_recording(recording: &Recording) -> io::Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_recording(recording)?;
    Ok(writer.into_inner())
}
