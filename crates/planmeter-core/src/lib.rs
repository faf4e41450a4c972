//! Planmeter Core Library
//!
//! Platform-agnostic logic for measuring lines drawn over a blueprint raster:
//! pixel-to-real-world conversion, tooltip coordination and the draw session
//! state machine. Rendering and hit-testing belong to the host.

pub mod calibration;
pub mod config;
pub mod events;
pub mod geometry;
pub mod layer;
pub mod overlay;
pub mod session;
pub mod tooltip;
pub mod viewport;

pub use calibration::{Calibration, LengthFormat, ScaleRatio, UnitError, convert};
pub use config::{ConfigError, ViewerConfig};
pub use events::{EventSource, ListenerKey, ListenerRegistry, Topic};
pub use geometry::{GeometryKind, SketchGeometry, START_HINT, continue_hint};
pub use layer::{Measurement, MeasurementLayer};
pub use overlay::{MemoryOverlayHost, OverlayError, OverlayHost, OverlayId, OverlayOptions, Positioning};
pub use session::{DrawSessionController, DrawState, Session, SessionError};
pub use tooltip::{Tooltip, TooltipManager, TooltipMode};
pub use viewport::{PixelProjection, StaticImageLayer, Viewport};
