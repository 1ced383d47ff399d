//! Wire messages for render consumers of the simulation.
//!
//! Plain arrays instead of math types keep this crate free of engine
//! dependencies. Vectors are `[x, y, z]`, quaternions `[x, y, z, w]`.

use std::io::{self, Read, Write};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const PROTOCOL_VERSION: u32 = 1;
/// Frames larger than this are rejected when reading.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("frame of {0} bytes exceeds limit")]
    FrameTooLarge(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentFrame {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub orientation: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegFrame {
    pub end_effector: [f64; 3],
    pub is_grounded: bool,
    pub is_moving: bool,
    pub is_disabled: bool,
    pub segments: Vec<SegmentFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiderFrame {
    pub spider: Uuid,
    pub tick: u64,
    pub position: [f64; 3],
    pub orientation: [f64; 4],
    pub on_ground: bool,
    pub legs: Vec<LegFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Step { leg: u32, position: [f64; 3] },
    HitGround { position: [f64; 3], impact_speed: f64 },
    Knockback { direction: [f64; 3], strength: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub spider: Uuid,
    pub tick: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimMessage {
    Hello { version: u32, spider_count: u32 },
    Frame(SpiderFrame),
    Event(EventFrame),
}

pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(msg)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Writes `msg` prefixed with its length as a little-endian `u32`.
pub fn write_framed<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> Result<(), ProtocolError> {
    let bytes = encode(msg)?;
    let len = u32::try_from(bytes.len()).map_err(|_| ProtocolError::FrameTooLarge(bytes.len() as u64))?;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(len as u64));
    }
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Reads one length-prefixed message. `Ok(None)` on a clean end of stream.
pub fn read_framed<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>, ProtocolError> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(len_bytes);
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge(len as u64));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    decode(&buf).map(Some)
}
