//! Overlay abstraction: visual elements pinned to view coordinates.
//!
//! The host owns the actual elements (DOM nodes in the browser, records in
//! memory for tests and headless replay). Positions are view coordinates; the
//! host applies the offset and alignment when placing them on screen.

mod memory;

pub use memory::{MemoryOverlay, MemoryOverlayHost};

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overlay errors raised by the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("Overlay not found: {0}")]
    NotFound(OverlayId),
    #[error("Overlay host error: {0}")]
    Host(String),
}

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Handle to an element attached by an [`OverlayHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// Which point of the element sits on the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Positioning {
    #[default]
    TopLeft,
    CenterLeft,
    BottomCenter,
}

impl Positioning {
    /// CSS transform that realises the alignment.
    pub fn css_transform(self) -> &'static str {
        match self {
            Positioning::TopLeft => "none",
            Positioning::CenterLeft => "translate(0, -50%)",
            Positioning::BottomCenter => "translate(-50%, -100%)",
        }
    }
}

/// Options for a new overlay element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Space-separated style classes.
    pub class: String,
    /// Screen-pixel offset from the anchor.
    pub offset: (f64, f64),
    pub positioning: Positioning,
}

/// Host side of the overlay primitive.
pub trait OverlayHost {
    /// Attach a new, unpositioned element.
    fn create(&mut self, options: &OverlayOptions) -> OverlayResult<OverlayId>;

    /// Replace the element's text.
    fn set_content(&mut self, id: OverlayId, text: &str) -> OverlayResult<()>;

    /// Move the element; `None` takes it off screen.
    fn set_position(&mut self, id: OverlayId, position: Option<Point>) -> OverlayResult<()>;

    /// Replace the element's style classes.
    fn set_class(&mut self, id: OverlayId, class: &str) -> OverlayResult<()>;

    /// Change the screen-pixel offset.
    fn set_offset(&mut self, id: OverlayId, offset: (f64, f64)) -> OverlayResult<()>;

    /// Detach and drop the element.
    fn remove(&mut self, id: OverlayId) -> OverlayResult<()>;
}
