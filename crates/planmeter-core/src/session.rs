//! Draw session controller.
//!
//! Coordinates one line-drawing interaction at a time: the host reports when a
//! sketch starts, changes and ends, and the controller keeps the tooltips in
//! step. All calls run to completion on the UI thread, in delivery order.

use crate::calibration::{Calibration, LengthFormat, UnitError};
use crate::events::{EventSource, ListenerKey, Topic};
use crate::geometry::{START_HINT, SketchGeometry, continue_hint};
use crate::layer::{Measurement, MeasurementLayer};
use crate::overlay::{OverlayError, OverlayHost};
use crate::tooltip::TooltipManager;
use kurbo::Point;
use thiserror::Error;

/// Session controller errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidInput(#[from] UnitError),
    #[error("Precondition violated: {0}")]
    PreconditionViolation(&'static str),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// One in-progress line drawing.
#[derive(Debug, Clone)]
pub struct Session {
    geometry: SketchGeometry,
    /// Geometry-change subscription, released when the session ends.
    listener: ListenerKey,
}

impl Session {
    pub fn geometry(&self) -> &SketchGeometry {
        &self.geometry
    }

    pub fn listener(&self) -> ListenerKey {
        self.listener
    }
}

/// State of the draw interaction.
#[derive(Debug, Clone, Default)]
pub enum DrawState {
    /// No sketch in progress.
    #[default]
    Idle,
    /// A sketch is being drawn.
    Active(Session),
}

/// Coordinates draw sessions with the tooltip manager.
pub struct DrawSessionController<S: EventSource, O: OverlayHost> {
    events: S,
    tooltips: TooltipManager<O>,
    state: DrawState,
    calibration: Calibration,
    format: LengthFormat,
    layer: MeasurementLayer,
    pointer_listener: Option<ListenerKey>,
    disposed: bool,
}

impl<S: EventSource, O: OverlayHost> DrawSessionController<S, O> {
    /// Attach to a host: listen for pointer moves and create both tooltips.
    pub fn new(
        mut events: S,
        overlays: O,
        calibration: Calibration,
        format: LengthFormat,
    ) -> SessionResult<Self> {
        calibration.validate()?;

        let mut tooltips = TooltipManager::new(overlays);
        tooltips.ensure_measurement()?;
        tooltips.ensure_help()?;
        let pointer_listener = events.subscribe(Topic::PointerMove);

        log::info!(
            "Draw session controller attached ({} dpi, 1:{})",
            calibration.dpi,
            calibration.scale.factor()
        );

        Ok(Self {
            events,
            tooltips,
            state: DrawState::Idle,
            calibration,
            format,
            layer: MeasurementLayer::new(),
            pointer_listener: Some(pointer_listener),
            disposed: false,
        })
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            DrawState::Active(session) => Some(session),
            DrawState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, DrawState::Active(_))
    }

    pub fn tooltips(&self) -> &TooltipManager<O> {
        &self.tooltips
    }

    pub fn events(&self) -> &S {
        &self.events
    }

    /// Finished measurements.
    pub fn layer(&self) -> &MeasurementLayer {
        &self.layer
    }

    fn ensure_attached(&self) -> SessionResult<()> {
        if self.disposed {
            log::warn!("Event received after dispose");
            return Err(SessionError::PreconditionViolation("controller has been disposed"));
        }
        Ok(())
    }

    /// Convert and format the length of `geometry`.
    fn measure(&self, geometry: &SketchGeometry) -> SessionResult<(f64, f64, String)> {
        let length_px = geometry.length();
        let length = self.calibration.convert(length_px)?;
        Ok((length_px, length, self.format.format(length)))
    }

    /// Begin a session at the first placed vertex.
    pub fn start(&mut self, first_point: Point) -> SessionResult<()> {
        self.ensure_attached()?;
        if self.is_active() {
            log::warn!("Draw start while a session is active");
            return Err(SessionError::PreconditionViolation("a draw session is already active"));
        }

        self.tooltips.ensure_measurement()?;
        let listener = self.events.subscribe(Topic::GeometryChange);
        log::info!("Draw session started at ({:.1}, {:.1})", first_point.x, first_point.y);

        self.state = DrawState::Active(Session {
            geometry: SketchGeometry::line(first_point),
            listener,
        });
        Ok(())
    }

    /// Update the help hint for a pointer move. Drags (pans) are ignored.
    pub fn pointer_move(&mut self, point: Point, dragging: bool) -> SessionResult<()> {
        self.ensure_attached()?;
        if dragging {
            return Ok(());
        }

        let hint = match &self.state {
            DrawState::Active(session) => continue_hint(session.geometry.kind()),
            DrawState::Idle => START_HINT,
        };
        self.tooltips.show_help(point, hint)?;
        Ok(())
    }

    /// Re-measure the sketch after the host changed its geometry.
    pub fn geometry_changed(&mut self, geometry: SketchGeometry) -> SessionResult<()> {
        self.ensure_attached()?;
        if !self.is_active() {
            log::warn!("Geometry change without an active session");
            return Err(SessionError::PreconditionViolation("no active draw session"));
        }
        let Some(anchor) = geometry.last_coordinate() else {
            return Err(SessionError::PreconditionViolation("sketch geometry has no vertices"));
        };

        let (length_px, _, label) = self.measure(&geometry)?;
        log::debug!("Sketch length {:.2} px -> {}", length_px, label);
        self.tooltips.update_measurement(anchor, &label)?;

        if let DrawState::Active(session) = &mut self.state {
            session.geometry = geometry;
        }
        Ok(())
    }

    /// End the session, pinning its measurement.
    pub fn finish(&mut self) -> SessionResult<Measurement> {
        self.ensure_attached()?;
        let session = match std::mem::take(&mut self.state) {
            DrawState::Active(session) => session,
            DrawState::Idle => {
                log::warn!("Draw end without an active session");
                return Err(SessionError::PreconditionViolation("no active draw session"));
            }
        };
        self.events.unsubscribe(session.listener);

        let (length_px, length, label) = self.measure(&session.geometry)?;
        let blank = self
            .tooltips
            .measurement()
            .is_none_or(|tooltip| tooltip.text().is_none());
        if blank {
            if let Some(anchor) = session.geometry.last_coordinate() {
                self.tooltips.update_measurement(anchor, &label)?;
            }
        }
        self.tooltips.finalize_measurement()?;

        log::info!("Draw session finished: {}", label);
        let measurement = Measurement::new(session.geometry, length_px, length, label);
        self.layer.add(measurement.clone());
        Ok(measurement)
    }

    /// Hide the help hint when the pointer leaves the viewport.
    pub fn mouse_leave(&mut self) -> SessionResult<()> {
        self.ensure_attached()?;
        self.tooltips.hide_help()?;
        Ok(())
    }

    /// Release every subscription and detach every tooltip.
    ///
    /// Runs at most once; later calls return `Ok(())`. Also runs on drop.
    pub fn dispose(&mut self) -> SessionResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        if let DrawState::Active(session) = std::mem::take(&mut self.state) {
            log::info!("Disposing with an active draw session");
            self.events.unsubscribe(session.listener);
        }
        if let Some(listener) = self.pointer_listener.take() {
            self.events.unsubscribe(listener);
        }
        self.tooltips.detach_all()?;
        log::debug!("Draw session controller disposed");
        Ok(())
    }
}

impl<S: EventSource, O: OverlayHost> Drop for DrawSessionController<S, O> {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::error!("Failed to dispose draw session controller: {}", err);
        }
    }
}
