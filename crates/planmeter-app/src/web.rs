//! WebAssembly entry point and DOM overlay host.
//!
//! The page's mapping library renders the blueprint and runs the line-drawing
//! interaction; it forwards its notifications to [`BlueprintMeasure`]. Tooltips
//! are plain `div`s placed over the map container.
//!
//! Listener lifetimes are owned by the controller: it asks the page to attach
//! and detach the forwarding handlers through a [`MapEvents`] object.

use kurbo::{Point, Size, Vec2};
use planmeter_core::overlay::OverlayResult;
use planmeter_core::{
    DrawSessionController, EventSource, ListenerKey, OverlayError, OverlayHost, OverlayId,
    OverlayOptions, Positioning, SketchGeometry, StaticImageLayer, Topic, ViewerConfig, Viewport,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

fn host_error(err: JsValue) -> OverlayError {
    OverlayError::Host(format!("{:?}", err))
}

#[wasm_bindgen]
extern "C" {
    /// Page object that wires the mapping library's events to this module.
    ///
    /// `on(type)` attaches the handler forwarding `type` events
    /// (`"pointermove"` or `"change"`) and returns the library's listener key;
    /// `unByKey(key)` detaches it.
    pub type MapEvents;

    #[wasm_bindgen(method, catch)]
    fn on(this: &MapEvents, topic: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = unByKey)]
    fn un_by_key(this: &MapEvents, key: &JsValue) -> Result<(), JsValue>;
}

/// Event source backed by the page's [`MapEvents`] callbacks.
pub struct JsEventSource {
    events: MapEvents,
    keys: HashMap<ListenerKey, JsValue>,
    next_id: u64,
}

impl JsEventSource {
    pub fn new(events: MapEvents) -> Self {
        Self {
            events,
            keys: HashMap::new(),
            next_id: 0,
        }
    }
}

impl EventSource for JsEventSource {
    fn subscribe(&mut self, topic: Topic) -> ListenerKey {
        self.next_id += 1;
        let key = ListenerKey::new(self.next_id, topic);
        let js_key = self.events.on(topic.name()).unwrap_or_else(|err| {
            log::error!("Failed to listen for '{}': {:?}", topic.name(), err);
            JsValue::UNDEFINED
        });
        self.keys.insert(key, js_key);
        key
    }

    fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        let Some(js_key) = self.keys.remove(&key) else {
            return false;
        };
        if !js_key.is_undefined() {
            if let Err(err) = self.events.un_by_key(&js_key) {
                log::error!("Failed to release {}: {:?}", key, err);
            }
        }
        true
    }
}

struct DomOverlay {
    element: HtmlElement,
    position: Option<Point>,
    offset: (f64, f64),
    positioning: Positioning,
}

/// Overlay host backed by absolutely positioned DOM elements.
///
/// Not Send/Sync: DOM handles live on the single UI thread.
pub struct DomOverlayHost {
    document: Document,
    container: HtmlElement,
    viewport: Rc<RefCell<Viewport>>,
    overlays: HashMap<OverlayId, DomOverlay>,
    next_id: u64,
}

impl DomOverlayHost {
    /// Create a host that appends tooltips to `container`.
    pub fn new(document: Document, container: HtmlElement, viewport: Rc<RefCell<Viewport>>) -> Self {
        Self {
            document,
            container,
            viewport,
            overlays: HashMap::new(),
            next_id: 0,
        }
    }

    fn place(&self, overlay: &DomOverlay) -> OverlayResult<()> {
        let style = overlay.element.style();
        match overlay.position {
            Some(position) => {
                let pixel = self.viewport.borrow().coordinate_to_pixel(position);
                style
                    .set_property("left", &format!("{}px", pixel.x + overlay.offset.0))
                    .map_err(host_error)?;
                style
                    .set_property("top", &format!("{}px", pixel.y + overlay.offset.1))
                    .map_err(host_error)?;
                style.remove_property("display").map_err(host_error)?;
            }
            None => {
                style.set_property("display", "none").map_err(host_error)?;
            }
        }
        Ok(())
    }

    /// Reposition every element after the viewport changed.
    pub fn relayout(&self) -> OverlayResult<()> {
        for overlay in self.overlays.values() {
            self.place(overlay)?;
        }
        Ok(())
    }

    fn overlay_mut(&mut self, id: OverlayId) -> OverlayResult<&mut DomOverlay> {
        self.overlays.get_mut(&id).ok_or(OverlayError::NotFound(id))
    }
}

impl OverlayHost for DomOverlayHost {
    fn create(&mut self, options: &OverlayOptions) -> OverlayResult<OverlayId> {
        let element: HtmlElement = self
            .document
            .create_element("div")
            .map_err(host_error)?
            .dyn_into()
            .map_err(|_| OverlayError::Host("created element is not an HtmlElement".to_string()))?;
        element.set_class_name(&options.class);

        let style = element.style();
        style.set_property("position", "absolute").map_err(host_error)?;
        style
            .set_property("transform", options.positioning.css_transform())
            .map_err(host_error)?;
        style.set_property("display", "none").map_err(host_error)?;
        self.container.append_child(&element).map_err(host_error)?;

        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.overlays.insert(
            id,
            DomOverlay {
                element,
                position: None,
                offset: options.offset,
                positioning: options.positioning,
            },
        );
        Ok(id)
    }

    fn set_content(&mut self, id: OverlayId, text: &str) -> OverlayResult<()> {
        self.overlay_mut(id)?.element.set_inner_text(text);
        Ok(())
    }

    fn set_position(&mut self, id: OverlayId, position: Option<Point>) -> OverlayResult<()> {
        self.overlay_mut(id)?.position = position;
        let overlay = self.overlays.get(&id).ok_or(OverlayError::NotFound(id))?;
        self.place(overlay)
    }

    fn set_class(&mut self, id: OverlayId, class: &str) -> OverlayResult<()> {
        self.overlay_mut(id)?.element.set_class_name(class);
        Ok(())
    }

    fn set_offset(&mut self, id: OverlayId, offset: (f64, f64)) -> OverlayResult<()> {
        self.overlay_mut(id)?.offset = offset;
        let overlay = self.overlays.get(&id).ok_or(OverlayError::NotFound(id))?;
        self.place(overlay)
    }

    fn remove(&mut self, id: OverlayId) -> OverlayResult<()> {
        let overlay = self.overlays.remove(&id).ok_or(OverlayError::NotFound(id))?;
        log::debug!("Removing {} ({:?})", id, overlay.positioning);
        overlay.element.remove();
        Ok(())
    }
}

/// Measurement widget driven by the page's mapping library.
///
/// Two coordinate spaces are in play. `pointer_move`, `pan` and `zoom_at`
/// take screen pixels relative to the container (origin top-left, y down),
/// as delivered by DOM pointer events. `draw_start` and `geometry_change`
/// take view coordinates (image pixels, y up), as produced by the mapping
/// library's sketch geometry.
#[wasm_bindgen]
pub struct BlueprintMeasure {
    controller: DrawSessionController<JsEventSource, DomOverlayHost>,
    viewport: Rc<RefCell<Viewport>>,
    image: StaticImageLayer,
}

#[wasm_bindgen]
impl BlueprintMeasure {
    /// Attach to the element with id `container_id`, listening through
    /// `events`, optionally with a JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        events: MapEvents,
        config_json: Option<String>,
    ) -> Result<BlueprintMeasure, JsError> {
        let config = match config_json {
            Some(json) => ViewerConfig::from_json(&json)?,
            None => ViewerConfig::default(),
        };

        let window = web_sys::window().ok_or_else(|| JsError::new("No window object"))?;
        let document = window.document().ok_or_else(|| JsError::new("No document"))?;
        let container: HtmlElement = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsError::new(&format!("No element with id '{}'", container_id)))?
            .dyn_into()
            .map_err(|_| JsError::new("Container is not an HtmlElement"))?;

        let size = Size::new(
            f64::from(container.client_width()),
            f64::from(container.client_height()),
        );
        let viewport = Rc::new(RefCell::new(config.viewport(size)));
        let host = DomOverlayHost::new(document, container, Rc::clone(&viewport));

        let controller = DrawSessionController::new(
            JsEventSource::new(events),
            host,
            config.calibration,
            config.length_format.clone(),
        )?;
        let image = config.image_layer();
        log::info!("Blueprint measure attached to #{} ({})", container_id, image.url);

        Ok(Self { controller, viewport, image })
    }

    /// URL of the blueprint raster.
    #[wasm_bindgen(getter)]
    pub fn image_url(&self) -> String {
        self.image.url.clone()
    }

    /// Raster extent as `[min_x, min_y, max_x, max_y]` in view coordinates.
    #[wasm_bindgen(getter)]
    pub fn image_extent(&self) -> Vec<f64> {
        let extent = self.image.extent;
        vec![extent.x0, extent.y0, extent.x1, extent.y1]
    }

    /// Pointer moved to a screen pixel inside the container.
    pub fn pointer_move(&mut self, px: f64, py: f64, dragging: bool) -> Result<(), JsError> {
        let coordinate = self.viewport.borrow().pixel_to_coordinate(Point::new(px, py));
        self.controller.pointer_move(coordinate, dragging)?;
        Ok(())
    }

    /// The drawing interaction placed its first vertex (view coordinates).
    pub fn draw_start(&mut self, x: f64, y: f64) -> Result<(), JsError> {
        self.controller.start(Point::new(x, y))?;
        Ok(())
    }

    /// The sketch geometry changed; `coordinates` is flat `[x0, y0, x1, y1, ...]`.
    pub fn geometry_change(&mut self, coordinates: &[f64]) -> Result<(), JsError> {
        if coordinates.len() % 2 != 0 {
            return Err(JsError::new("Coordinate array has odd length"));
        }
        let points = coordinates
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect();
        self.controller.geometry_changed(SketchGeometry::LineString(points))?;
        Ok(())
    }

    /// The drawing interaction finished; returns the converted length.
    pub fn draw_end(&mut self) -> Result<f64, JsError> {
        let measurement = self.controller.finish()?;
        Ok(measurement.length)
    }

    pub fn mouse_out(&mut self) -> Result<(), JsError> {
        self.controller.mouse_leave()?;
        Ok(())
    }

    /// Pan by a screen-pixel delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), JsError> {
        self.viewport.borrow_mut().pan(Vec2::new(dx, dy));
        self.controller.tooltips().host().relayout()?;
        Ok(())
    }

    /// Zoom by `delta` levels around a screen pixel.
    pub fn zoom_at(&mut self, px: f64, py: f64, delta: f64) -> Result<(), JsError> {
        self.viewport.borrow_mut().zoom_at(Point::new(px, py), delta);
        self.controller.tooltips().host().relayout()?;
        Ok(())
    }

    /// Show the whole blueprint.
    pub fn fit(&mut self) -> Result<(), JsError> {
        self.viewport.borrow_mut().fit_extent();
        self.controller.tooltips().host().relayout()?;
        Ok(())
    }

    /// The container was resized.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), JsError> {
        self.viewport.borrow_mut().set_size(Size::new(width, height));
        self.controller.tooltips().host().relayout()?;
        Ok(())
    }

    /// Finished measurements as JSON.
    pub fn measurements_json(&self) -> Result<String, JsError> {
        Ok(self.controller.layer().to_json()?)
    }

    /// Detach all tooltips and listeners.
    pub fn dispose(&mut self) -> Result<(), JsError> {
        self.controller.dispose()?;
        Ok(())
    }
}

/// Initialize logging for the WASM module.
#[wasm_bindgen(start)]
pub fn run_wasm() -> Result<(), JsValue> {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info)
        .map_err(|e| JsValue::from_str(&format!("Failed to initialize logger: {}", e)))?;

    log::info!("Starting Planmeter (WASM)");
    Ok(())
}
