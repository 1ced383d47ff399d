//! Conversion from poses to wire frames, and the sink frames are written to.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bevy_ecs::prelude::Resource;
use parking_lot::Mutex;
use protocol::{LegFrame, SegmentFrame, SimMessage, SpiderFrame};
use spider::{Quatd, SpiderPose, Vec3d};
use tracing::warn;

use crate::context::SpiderId;

pub fn vec3(v: Vec3d) -> [f64; 3] {
    v.to_array()
}

pub fn quat(q: Quatd) -> [f64; 4] {
    q.to_array()
}

pub fn spider_frame(id: SpiderId, tick: u64, pose: &SpiderPose) -> SpiderFrame {
    SpiderFrame {
        spider: id.0,
        tick,
        position: vec3(pose.position),
        orientation: quat(pose.orientation),
        on_ground: pose.on_ground,
        legs: pose
            .legs
            .iter()
            .map(|leg| LegFrame {
                end_effector: vec3(leg.end_effector),
                is_grounded: leg.is_grounded,
                is_moving: leg.is_moving,
                is_disabled: leg.is_disabled,
                segments: leg
                    .segments
                    .iter()
                    .map(|s| SegmentFrame { start: vec3(s.start), end: vec3(s.end), orientation: quat(s.orientation) })
                    .collect(),
            })
            .collect(),
    }
}

/// Destination for length-prefixed [`SimMessage`]s. The first write error is logged and
/// further output is dropped; the simulation keeps running.
#[derive(Resource)]
pub struct FrameSink {
    out: Box<dyn Write + Send + Sync>,
    written: u64,
    failed: bool,
}

impl FrameSink {
    pub fn new(out: impl Write + Send + Sync + 'static) -> Self {
        Self { out: Box::new(out), written: 0, failed: false }
    }

    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn send(&mut self, msg: &SimMessage) {
        if self.failed {
            return;
        }
        match protocol::write_framed(&mut self.out, msg) {
            Ok(()) => self.written += 1,
            Err(error) => {
                warn!(%error, "frame sink failed, dropping further output");
                self.failed = true;
            }
        }
    }

    pub fn flush(&mut self) {
        if let Err(error) = self.out.flush() {
            warn!(%error, "frame sink flush failed");
        }
    }
}

/// In-memory writer whose bytes stay readable through clones.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
