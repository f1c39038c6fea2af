//! Overlays a Catmull-Rom guidance curve and a live aim point onto video
//! frames read from shared memory.
//!
//! Two threads touch shared state: the message bus dispatch thread writes the
//! aim point into a [`TargetChannel`], and the [`RenderLoop`] reads it once
//! per frame. Frames are copied out of the segment before any drawing.

pub mod config;
pub mod display;
pub mod draw;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod shm;
pub mod source;
pub mod spline;
pub mod target;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{direction_handler, RenderLoop, RunSummary};
pub use render::Overlay;
pub use session::{Direction, LocalSession, Message, Session};
pub use shm::{LocalSharedMemory, SharedMemory};
pub use source::SharedFrameSource;
pub use spline::{CurveSegment, Spline};
pub use target::{TargetChannel, TargetPoint};
pub use types::{Color, Frame, Point};
