//! In-memory overlay host.

use super::{OverlayError, OverlayHost, OverlayId, OverlayOptions, OverlayResult, Positioning};
use kurbo::Point;
use std::collections::BTreeMap;

/// Recorded state of one attached element.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryOverlay {
    pub content: String,
    pub position: Option<Point>,
    pub class: String,
    pub offset: (f64, f64),
    pub positioning: Positioning,
    /// Number of `set_position` calls received.
    pub moves: usize,
}

impl MemoryOverlay {
    /// Check whether a style class is present.
    pub fn has_class(&self, class: &str) -> bool {
        self.class.split_whitespace().any(|c| c == class)
    }
}

/// In-memory overlay host for testing and headless replay.
#[derive(Debug, Default)]
pub struct MemoryOverlayHost {
    overlays: BTreeMap<OverlayId, MemoryOverlay>,
    next_id: u64,
    removed: usize,
    failing: bool,
    failing_removes: usize,
}

impl MemoryOverlayHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attached element.
    pub fn get(&self, id: OverlayId) -> Option<&MemoryOverlay> {
        self.overlays.get(&id)
    }

    /// Number of attached elements.
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Check if no elements are attached.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Total elements removed.
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    /// Make every following call fail, simulating a broken host.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Make the next `count` calls to `remove` fail.
    pub fn fail_next_removes(&mut self, count: usize) {
        self.failing_removes = count;
    }

    fn check(&self) -> OverlayResult<()> {
        if self.failing {
            Err(OverlayError::Host("host unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn overlay_mut(&mut self, id: OverlayId) -> OverlayResult<&mut MemoryOverlay> {
        self.check()?;
        self.overlays.get_mut(&id).ok_or(OverlayError::NotFound(id))
    }
}

impl OverlayHost for MemoryOverlayHost {
    fn create(&mut self, options: &OverlayOptions) -> OverlayResult<OverlayId> {
        self.check()?;
        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.overlays.insert(
            id,
            MemoryOverlay {
                content: String::new(),
                position: None,
                class: options.class.clone(),
                offset: options.offset,
                positioning: options.positioning,
                moves: 0,
            },
        );
        Ok(id)
    }

    fn set_content(&mut self, id: OverlayId, text: &str) -> OverlayResult<()> {
        self.overlay_mut(id)?.content = text.to_string();
        Ok(())
    }

    fn set_position(&mut self, id: OverlayId, position: Option<Point>) -> OverlayResult<()> {
        let overlay = self.overlay_mut(id)?;
        overlay.position = position;
        overlay.moves += 1;
        Ok(())
    }

    fn set_class(&mut self, id: OverlayId, class: &str) -> OverlayResult<()> {
        self.overlay_mut(id)?.class = class.to_string();
        Ok(())
    }

    fn set_offset(&mut self, id: OverlayId, offset: (f64, f64)) -> OverlayResult<()> {
        self.overlay_mut(id)?.offset = offset;
        Ok(())
    }

    fn remove(&mut self, id: OverlayId) -> OverlayResult<()> {
        self.check()?;
        if self.failing_removes > 0 {
            self.failing_removes -= 1;
            return Err(OverlayError::Host("remove failed".to_string()));
        }
        self.overlays.remove(&id).ok_or(OverlayError::NotFound(id))?;
        self.removed += 1;
        Ok(())
    }
}
