//! Tooltip manager: the help hint and the measurement labels.
//!
//! The manager is the only owner of tooltip elements. Exactly one help tooltip
//! and one live measurement tooltip exist at a time; finalized measurements are
//! pinned where the sketch ended and never touched again until teardown.

use crate::overlay::{OverlayHost, OverlayId, OverlayOptions, OverlayResult, Positioning};
use kurbo::Point;

const HELP_CLASS: &str = "tooltip";
const HELP_HIDDEN_CLASS: &str = "tooltip hidden";
const MEASURE_CLASS: &str = "tooltip tooltip-measure";
const STATIC_CLASS: &str = "tooltip tooltip-static";

const HELP_OFFSET: (f64, f64) = (15.0, 0.0);
const MEASURE_OFFSET: (f64, f64) = (0.0, -15.0);
const STATIC_OFFSET: (f64, f64) = (0.0, -7.0);

/// Display mode of a tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipMode {
    /// Pointer-following help hint.
    FloatingHint,
    /// Measurement following the sketch's last vertex.
    LiveMeasurement,
    /// Measurement pinned at the end of a finished sketch.
    FinalizedMeasurement,
}

/// A positioned label.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    id: OverlayId,
    mode: TooltipMode,
    text: Option<String>,
    anchor: Option<Point>,
    visible: bool,
}

impl Tooltip {
    fn new(id: OverlayId, mode: TooltipMode, visible: bool) -> Self {
        Self {
            id,
            mode,
            text: None,
            anchor: None,
            visible,
        }
    }

    /// Host element handle.
    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn mode(&self) -> TooltipMode {
        self.mode
    }

    /// Text content, `None` while blank.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Owns the help and measurement tooltips and their host elements.
#[derive(Debug)]
pub struct TooltipManager<O: OverlayHost> {
    host: O,
    help: Option<Tooltip>,
    measurement: Option<Tooltip>,
    finalized: Vec<Tooltip>,
}

impl<O: OverlayHost> TooltipManager<O> {
    /// Create a manager over an overlay host. No elements are attached yet.
    pub fn new(host: O) -> Self {
        Self {
            host,
            help: None,
            measurement: None,
            finalized: Vec::new(),
        }
    }

    /// Read-only access to the overlay host.
    pub fn host(&self) -> &O {
        &self.host
    }

    pub fn help(&self) -> Option<&Tooltip> {
        self.help.as_ref()
    }

    /// The live measurement tooltip, if created.
    pub fn measurement(&self) -> Option<&Tooltip> {
        self.measurement.as_ref()
    }

    /// Measurements frozen by previous sessions, oldest first.
    pub fn finalized(&self) -> &[Tooltip] {
        &self.finalized
    }

    /// Create the help tooltip (hidden) if absent.
    pub fn ensure_help(&mut self) -> OverlayResult<()> {
        if self.help.is_none() {
            let id = self.host.create(&OverlayOptions {
                class: HELP_HIDDEN_CLASS.to_string(),
                offset: HELP_OFFSET,
                positioning: Positioning::CenterLeft,
            })?;
            log::debug!("Created help tooltip {}", id);
            self.help = Some(Tooltip::new(id, TooltipMode::FloatingHint, false));
        }
        Ok(())
    }

    /// Create a blank measurement tooltip if absent.
    pub fn ensure_measurement(&mut self) -> OverlayResult<()> {
        if self.measurement.is_none() {
            let id = self.host.create(&OverlayOptions {
                class: MEASURE_CLASS.to_string(),
                offset: MEASURE_OFFSET,
                positioning: Positioning::BottomCenter,
            })?;
            log::debug!("Created measurement tooltip {}", id);
            self.measurement = Some(Tooltip::new(id, TooltipMode::LiveMeasurement, true));
        }
        Ok(())
    }

    /// Show the help hint at `anchor`.
    pub fn show_help(&mut self, anchor: Point, text: &str) -> OverlayResult<()> {
        self.ensure_help()?;
        let Some(help) = self.help.as_mut() else {
            return Ok(());
        };

        if help.text.as_deref() != Some(text) {
            self.host.set_content(help.id, text)?;
            help.text = Some(text.to_string());
        }
        self.host.set_position(help.id, Some(anchor))?;
        help.anchor = Some(anchor);
        if !help.visible {
            self.host.set_class(help.id, HELP_CLASS)?;
            help.visible = true;
        }
        Ok(())
    }

    /// Hide the help hint. The element is kept for the next `show_help`.
    pub fn hide_help(&mut self) -> OverlayResult<()> {
        if let Some(help) = self.help.as_mut() {
            if help.visible {
                self.host.set_class(help.id, HELP_HIDDEN_CLASS)?;
                help.visible = false;
            }
        }
        Ok(())
    }

    /// Move the live measurement tooltip to `anchor` with new text.
    pub fn update_measurement(&mut self, anchor: Point, text: &str) -> OverlayResult<()> {
        self.ensure_measurement()?;
        let Some(measurement) = self.measurement.as_mut() else {
            return Ok(());
        };

        self.host.set_content(measurement.id, text)?;
        self.host.set_position(measurement.id, Some(anchor))?;
        measurement.text = Some(text.to_string());
        measurement.anchor = Some(anchor);
        Ok(())
    }

    /// Freeze the live measurement where it is and start a blank one.
    pub fn finalize_measurement(&mut self) -> OverlayResult<()> {
        if let Some(mut measurement) = self.measurement.take() {
            self.host.set_class(measurement.id, STATIC_CLASS)?;
            self.host.set_offset(measurement.id, STATIC_OFFSET)?;
            measurement.mode = TooltipMode::FinalizedMeasurement;
            log::debug!(
                "Finalized tooltip {} at {:?}: {}",
                measurement.id,
                measurement.anchor,
                measurement.text.as_deref().unwrap_or("")
            );
            self.finalized.push(measurement);
        }
        self.ensure_measurement()
    }

    /// Detach every element this manager created. Safe to call repeatedly.
    ///
    /// Every removal is attempted; the first host error is returned afterwards.
    pub fn detach_all(&mut self) -> OverlayResult<()> {
        let ids: Vec<OverlayId> = self
            .help
            .take()
            .into_iter()
            .chain(self.measurement.take())
            .chain(self.finalized.drain(..))
            .map(|tooltip| tooltip.id)
            .collect();

        let mut first_error = None;
        for id in ids {
            if let Err(err) = self.host.remove(id) {
                log::error!("Failed to detach {}: {}", id, err);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::MemoryOverlayHost;

    fn manager() -> TooltipManager<MemoryOverlayHost> {
        TooltipManager::new(MemoryOverlayHost::new())
    }

    #[test]
    fn test_help_created_hidden() {
        let mut tm = manager();
        tm.ensure_help().unwrap();

        let help = tm.help().unwrap();
        assert!(!help.is_visible());
        assert_eq!(help.mode(), TooltipMode::FloatingHint);
        let element = tm.host().get(help.id()).unwrap();
        assert!(element.has_class("hidden"));
        assert_eq!(element.offset, HELP_OFFSET);
        assert_eq!(element.positioning, Positioning::CenterLeft);
    }

    #[test]
    fn test_show_help_is_idempotent() {
        let mut tm = manager();
        tm.show_help(Point::new(1.0, 1.0), "Click to start drawing").unwrap();
        tm.show_help(Point::new(2.0, 3.0), "Click to start drawing").unwrap();

        assert_eq!(tm.host().len(), 1);
        let help = tm.help().unwrap();
        assert!(help.is_visible());
        assert_eq!(help.anchor(), Some(Point::new(2.0, 3.0)));
        assert_eq!(help.text(), Some("Click to start drawing"));
        assert!(!tm.host().get(help.id()).unwrap().has_class("hidden"));
    }

    #[test]
    fn test_hide_help_keeps_element() {
        let mut tm = manager();
        tm.show_help(Point::ZERO, "hint").unwrap();
        tm.hide_help().unwrap();

        let help = tm.help().unwrap();
        assert!(!help.is_visible());
        assert!(tm.host().get(help.id()).unwrap().has_class("hidden"));
        assert_eq!(tm.host().len(), 1);
    }

    #[test]
    fn test_hide_without_help_is_noop() {
        let mut tm = manager();
        tm.hide_help().unwrap();
        assert!(tm.host().is_empty());
    }

    #[test]
    fn test_update_measurement() {
        let mut tm = manager();
        tm.update_measurement(Point::new(100.0, 0.0), "1.27 m").unwrap();

        let m = tm.measurement().unwrap();
        assert_eq!(m.mode(), TooltipMode::LiveMeasurement);
        assert_eq!(m.text(), Some("1.27 m"));
        let element = tm.host().get(m.id()).unwrap();
        assert_eq!(element.content, "1.27 m");
        assert_eq!(element.position, Some(Point::new(100.0, 0.0)));
        assert_eq!(element.positioning, Positioning::BottomCenter);
    }

    #[test]
    fn test_finalize_freezes_and_replaces() {
        let mut tm = manager();
        tm.update_measurement(Point::new(100.0, 0.0), "1.27 m").unwrap();
        let old_id = tm.measurement().unwrap().id();

        tm.finalize_measurement().unwrap();

        let frozen = &tm.finalized()[0];
        assert_eq!(frozen.id(), old_id);
        assert_eq!(frozen.mode(), TooltipMode::FinalizedMeasurement);
        let element = tm.host().get(old_id).unwrap();
        assert!(element.has_class("tooltip-static"));
        assert_eq!(element.offset, STATIC_OFFSET);

        let fresh = tm.measurement().unwrap();
        assert_ne!(fresh.id(), old_id);
        assert_eq!(fresh.text(), None);

        tm.update_measurement(Point::new(5.0, 5.0), "0.09 m").unwrap();
        let element = tm.host().get(old_id).unwrap();
        assert_eq!(element.content, "1.27 m");
        assert_eq!(element.position, Some(Point::new(100.0, 0.0)));
        assert_eq!(element.moves, 1);
    }

    #[test]
    fn test_detach_all_once() {
        let mut tm = manager();
        tm.show_help(Point::ZERO, "hint").unwrap();
        tm.update_measurement(Point::ZERO, "0.00 m").unwrap();
        tm.finalize_measurement().unwrap();

        tm.detach_all().unwrap();
        assert!(tm.host().is_empty());
        assert_eq!(tm.host().removed_count(), 3);

        tm.detach_all().unwrap();
        assert_eq!(tm.host().removed_count(), 3);
    }

    #[test]
    fn test_detach_all_continues_past_failure() {
        let mut tm = manager();
        tm.show_help(Point::ZERO, "hint").unwrap();
        tm.update_measurement(Point::ZERO, "0.00 m").unwrap();
        tm.finalize_measurement().unwrap();
        tm.host.fail_next_removes(1);

        let result = tm.detach_all();
        assert!(matches!(result, Err(crate::overlay::OverlayError::Host(_))));
        assert_eq!(tm.host().removed_count(), 2);
        assert_eq!(tm.host().len(), 1);
        assert!(tm.help().is_none());
        assert!(tm.measurement().is_none());
        assert!(tm.finalized().is_empty());
    }
}
