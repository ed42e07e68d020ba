//! Binary recording reader
//!
//! Reads `.rec` files, trusting the version byte to select the layout.

use crate::replay::types::*;
use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Vec2, Vec3};
use std::io::{self, Read};

/// Errors raised while decoding a recording.
#[derive(Debug, thiserror::Error)]
pub enum RecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("not a recording (magic {0:#010x})")]
    BadMagic(u32),
    #[error("unsupported recording version {0} (expected {FORMAT_VERSION})")]
    UnsupportedVersion(u8),
    #[error("participant name is not valid UTF-8")]
    InvalidName(#[from] std::string::FromUtf8Error),
    #[error("invalid {what} count {count}")]
    InvalidCount { what: &'static str, count: i32 },
}

/// Reader for the binary recording format
pub struct BinaryReader<R: Read> {
    reader: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a complete recording from the input
    pub fn read_recording(&mut self) -> Result<Recording, RecError> {
        let header = self.read_header()?;

        let tick_count = self.read_count("tick")?;
        let bookmarks = self.reader.read_i32::<LittleEndian>()?;
        if bookmarks != 0 {
            return Err(RecError::InvalidCount {
                what: "bookmark",
                count: bookmarks,
            });
        }

        let mut frames = Vec::with_capacity(tick_count.min(1 << 16));
        for _ in 0..tick_count {
            frames.push(self.read_frame()?);
        }

        Ok(Recording { header, frames })
    }

    /// Read only the header, leaving the reader positioned at the tick count.
    pub fn read_header(&mut self) -> Result<RecordingHeader, RecError> {
        let magic = self.reader.read_i32::<LittleEndian>()?;
        if magic != MAGIC {
            return Err(RecError::BadMagic(magic as u32));
        }

        let version = self.reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(RecError::UnsupportedVersion(version));
        }

        let timestamp = self.reader.read_i32::<LittleEndian>()?;
        let name_len = self.reader.read_u8()? as usize;
        let mut name = vec![0u8; name_len];
        self.reader.read_exact(&mut name)?;
        let name = String::from_utf8(name)?;

        let position = self.read_vec3()?;
        let angles = self.read_vec2()?;

        Ok(RecordingHeader {
            timestamp,
            name,
            position,
            angles,
        })
    }

    fn read_count(&mut self, what: &'static str) -> Result<usize, RecError> {
        let count = self.reader.read_i32::<LittleEndian>()?;
        usize::try_from(count).map_err(|_| RecError::InvalidCount { what, count })
    }

    fn read_frame(&mut self) -> Result<Frame, RecError> {
        let mut frame = Frame {
            buttons: Buttons::from_bits_retain(self.reader.read_i32::<LittleEndian>()?),
            impulse: self.reader.read_i32::<LittleEndian>()?,
            actual_velocity: self.read_vec3()?,
            predicted_velocity: self.read_vec3()?,
            predicted_angles: self.read_vec2()?,
            origin: self.read_vec3()?,
            weapon: self.reader.read_i32::<LittleEndian>()?,
            subtype: self.reader.read_i32::<LittleEndian>()?,
            seed: self.reader.read_i32::<LittleEndian>()?,
            fields: FrameFields::from_bits_truncate(self.reader.read_i32::<LittleEndian>()?),
            ..Frame::default()
        };

        if frame.fields.contains(FrameFields::ORIGIN) {
            frame.at_origin = self.read_vec3()?;
        }
        if frame.fields.contains(FrameFields::ANGLES) {
            frame.at_angles = self.read_vec3()?;
        }
        if frame.fields.contains(FrameFields::VELOCITY) {
            frame.at_velocity = self.read_vec3()?;
        }
        Ok(frame)
    }

    fn read_vec3(&mut self) -> io::Result<Vec3> {
        Ok(Vec3::new(
            self.reader.read_f32::<LittleEndian>()?,
            self.reader.read_f32::<LittleEndian>()?,
            self.reader.read_f32::<LittleEndian>()?,
        ))
    }

    fn read_vec2(&mut self) -> io::Result<Vec2> {
        Ok(Vec2::new(
            self.reader.read_f32::<LittleEndian>()?,
            self.reader.read_f32::<LittleEndian>()?,
        ))
    }
}

/// Decodes a recording from an in-memory buffer.
pub fn decode_recording(bytes: &[u8]) -> Result<Recording, RecError> {
    BinaryReader::new(bytes).read_recording()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::binary::encode_recording;

    fn sample() -> Recording {
        let mut recording = Recording::new(RecordingHeader {
            timestamp: 42,
            name: "Željko".to_string(),
            position: Vec3::new(-100.5, 20.0, 64.0),
            angles: Vec2::new(3.0, -170.0),
        });
        recording.frames.push(Frame {
            buttons: Buttons::ATTACK | Buttons::JUMP,
            weapon: 7,
            origin: Vec3::new(-100.5, 20.0, 64.0),
            fields: FrameFields::ORIGIN | FrameFields::VELOCITY,
            at_origin: Vec3::new(-100.5, 20.0, 64.0),
            at_velocity: Vec3::new(250.0, 0.0, 0.0),
            ..Frame::default()
        });
        recording.frames.push(Frame {
            predicted_velocity: Vec3::new(450.0, -450.0, 0.0),
            predicted_angles: Vec2::new(1.0, 2.0),
            fields: FrameFields::ANGLES,
            at_angles: Vec3::new(1.0, 2.0, 0.0),
            ..Frame::default()
        });
        recording
    }

    #[test]
    fn test_decode_written_recording() {
        let recording = sample();
        let bytes = encode_recording(&recording).unwrap();
        assert_eq!(decode_recording(&bytes).unwrap(), recording);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = encode_recording(&sample()).unwrap();
        bytes[0] = 0;
        assert!(matches!(decode_recording(&bytes), Err(RecError::BadMagic(_))));
    }

    #[test]
    fn test_rejects_other_versions() {
        let mut bytes = encode_recording(&sample()).unwrap();
        bytes[4] = 1;
        assert!(matches!(
            decode_recording(&bytes),
            Err(RecError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_truncated_file_is_io_error() {
        let bytes = encode_recording(&sample()).unwrap();
        let err = decode_recording(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, RecError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_header_only() {
        let bytes = encode_recording(&sample()).unwrap();
        let header = BinaryReader::new(bytes.as_slice()).read_header().unwrap();
        assert_eq!(header.name, "Željko");
        assert_eq!(header.angles, Vec2::new(3.0, -170.0));
    }
}
