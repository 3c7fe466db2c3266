use gtk::cairo;
use gtk::prelude::*;
use gtk::glib;
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use super::animation::{Rgb, BACKGROUND, LABEL_BORDER, LABEL_TEXT, MARKER_FILL};
use super::camera::{ZoomTransform, WHEEL_NOTCH_STEP, WHEEL_PIXEL_STEP};
use super::world::CountryFeature;
use super::live::LiveMap;
use super::projection::{Projection, CANVAS_HEIGHT, CANVAS_WIDTH};
use super::scene::{self, Scene};
use crate::data::MedicineOrigin;

const LABEL_PADDING: f64 = 4.0;
const LABEL_OFFSET: f64 = -35.0;
const LABEL_FONT_SIZE: f64 = 12.0;

struct MapState {
    projection: Projection,
    features: Vec<CountryFeature>,
    origin: Option<MedicineOrigin>,
    generation: u64,
    scene: Scene,
    live: LiveMap,
    transform: ZoomTransform,
    /// Pointer and the canvas point grabbed at drag start.
    drag: Option<((f64, f64), (f64, f64))>,
    pinch: Option<(ZoomTransform, (f64, f64))>,
}

impl MapState {
    fn new(now: f64) -> Self {
        let scene = Scene::default();
        let live = LiveMap::new(&scene, ZoomTransform::IDENTITY, now);
        Self {
            projection: Projection::default(),
            features: Vec::new(),
            origin: None,
            generation: 0,
            scene,
            live,
            transform: ZoomTransform::IDENTITY,
            drag: None,
            pinch: None,
        }
    }

    /// Take `origin` as result number `generation`. Re-renders, restarting
    /// every animation, unless that generation is already on screen.
    fn show(&mut self, origin: Option<&MedicineOrigin>, generation: u64, now: f64) -> bool {
        if self.generation == generation {
            return false;
        }
        self.generation = generation;
        self.origin = origin.cloned();
        self.render(now);
        true
    }

    /// Rebuild the display list and replace the live layer.
    fn render(&mut self, now: f64) {
        self.scene = scene::render(&self.features, self.origin.as_ref(), &self.projection);
        self.live = LiveMap::new(&self.scene, self.transform, now);
        tracing::debug!(
            regions = self.scene.regions.len(),
            marker = self.scene.marker.is_some(),
            "map rendered"
        );
    }
}

/// World map drawn on a fit-scaled 800×500 canvas.
#[derive(Clone)]
pub struct MapWidget {
    area: gtk::DrawingArea,
    state: Rc<RefCell<MapState>>,
}

impl MapWidget {
    pub fn new() -> Self {
        // Create drawing area
        let area = gtk::DrawingArea::builder()
            .content_width(CANVAS_WIDTH as i32)
            .content_height(CANVAS_HEIGHT as i32)
            .hexpand(true)
            .vexpand(true)
            .build();
        area.add_css_class("world-map");
        area.set_cursor_from_name(Some("move"));

        let state = Rc::new(RefCell::new(MapState::new(now())));

        let widget = Self { area, state };
        widget.connect_draw();
        widget.connect_tick();
        widget.connect_pointer();
        widget.connect_drag();
        widget.connect_scroll();
        widget.connect_pinch();
        widget
    }

    pub fn widget(&self) -> &gtk::DrawingArea {
        &self.area
    }

    pub fn set_features(&self, features: Vec<CountryFeature>) {
        let mut state = self.state.borrow_mut();
        state.features = features;
        state.render(now());
        self.area.queue_draw();
    }

    /// Show `origin`, or clear the marker. A no-op when `generation` is
    /// already displayed.
    pub fn set_origin(&self, origin: Option<&MedicineOrigin>, generation: u64) {
        if self.state.borrow_mut().show(origin, generation, now()) {
            self.area.queue_draw();
        }
    }

    fn connect_draw(&self) {
        let state = self.state.clone();
        self.area.set_draw_func(move |_, cr, width, height| {
            let state = state.borrow();
            let t = now();
            let fit = Fit::new(width as f64, height as f64);

            cr.translate(fit.offset_x, fit.offset_y);
            cr.scale(fit.scale, fit.scale);
            cr.rectangle(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
            set_rgb(cr, BACKGROUND, 1.0);
            let _ = cr.fill_preserve();
            cr.clip();

            let camera = state.transform;
            cr.translate(camera.x, camera.y);
            cr.scale(camera.k, camera.k);

            draw_regions(cr, &state.scene, &state.live, t);

            if let Some(marker) = &state.scene.marker {
                let (x, y) = marker.point;
                if let Some((radius, opacity)) = state.live.pulse(t) {
                    cr.new_path();
                    cr.arc(x, y, radius, 0.0, 2.0 * PI);
                    set_rgb(cr, MARKER_FILL, opacity);
                    cr.set_line_width(2.0);
                    let _ = cr.stroke();
                }

                let scale = state.live.marker_scale(t);
                if scale > 1e-6 {
                    let _ = cr.save();
                    cr.translate(x, y);
                    cr.scale(scale, scale);
                    draw_pin(cr);
                    draw_label(cr, &marker.label);
                    let _ = cr.restore();
                }
            }
        });
    }

    fn connect_tick(&self) {
        let state = self.state.clone();
        self.area.add_tick_callback(move |area, clock| {
            let t = clock.frame_time() as f64 / 1_000_000.0;
            let mut state = state.borrow_mut();
            let state = &mut *state;

            let moved = match state.live.camera(t) {
                Some(transform) => {
                    state.transform = transform;
                    true
                }
                None => false,
            };
            if moved || state.live.is_animating(t) {
                area.queue_draw();
            }
            glib::ControlFlow::Continue
        });
    }

    fn connect_pointer(&self) {
        let motion = gtk::EventControllerMotion::new();

        let state = self.state.clone();
        let area = self.area.clone();
        motion.connect_motion(move |_, x, y| {
            let mut state = state.borrow_mut();
            let state = &mut *state;
            let canvas = Fit::new(area.width() as f64, area.height() as f64).to_canvas(x, y);
            let world = state.transform.invert(canvas);
            let region = state.scene.region_at(state.live.paint_order(), world);
            if region != state.live.hovered() {
                state.live.hover(region, now());
                area.queue_draw();
            }
        });

        let state = self.state.clone();
        let area = self.area.clone();
        motion.connect_leave(move |_| {
            state.borrow_mut().live.hover(None, now());
            area.queue_draw();
        });

        self.area.add_controller(motion);
    }

    fn connect_drag(&self) {
        let drag = gtk::GestureDrag::new();

        let state = self.state.clone();
        let area = self.area.clone();
        drag.connect_drag_begin(move |_, x, y| {
            let mut state = state.borrow_mut();
            let pointer = Fit::new(area.width() as f64, area.height() as f64).to_canvas(x, y);
            let grabbed = state.transform.invert(pointer);
            state.drag = Some((pointer, grabbed));
            state.live.interrupt_camera();
        });

        let state = self.state.clone();
        let area = self.area.clone();
        drag.connect_drag_update(move |gesture, dx, dy| {
            let Some((sx, sy)) = gesture.start_point() else {
                return;
            };
            let mut state = state.borrow_mut();
            let Some((_, grabbed)) = state.drag else {
                return;
            };
            let pointer =
                Fit::new(area.width() as f64, area.height() as f64).to_canvas(sx + dx, sy + dy);
            state.transform = state.transform.pan(pointer, grabbed);
            area.queue_draw();
        });

        let state = self.state.clone();
        drag.connect_drag_end(move |_, _, _| {
            state.borrow_mut().drag = None;
        });

        self.area.add_controller(drag);
    }

    fn connect_scroll(&self) {
        let scroll = gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::VERTICAL);

        // Scroll events carry no position, so zoom about the last known pointer.
        let pointer = Rc::new(RefCell::new((CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0)));
        let tracker = gtk::EventControllerMotion::new();
        let last = pointer.clone();
        let area = self.area.clone();
        tracker.connect_motion(move |_, x, y| {
            *last.borrow_mut() = Fit::new(area.width() as f64, area.height() as f64).to_canvas(x, y);
        });
        self.area.add_controller(tracker);

        let state = self.state.clone();
        let area = self.area.clone();
        scroll.connect_scroll(move |controller, _dx, dy| {
            let step = match controller.unit() {
                gdk::ScrollUnit::Surface => WHEEL_PIXEL_STEP,
                _ => WHEEL_NOTCH_STEP,
            };
            let mut state = state.borrow_mut();
            state.live.interrupt_camera();
            state.transform = state.transform.zoom_about(*pointer.borrow(), -dy * step);
            area.queue_draw();
            glib::Propagation::Stop
        });

        self.area.add_controller(scroll);
    }

    fn connect_pinch(&self) {
        let zoom = gtk::GestureZoom::new();

        let state = self.state.clone();
        let area = self.area.clone();
        zoom.connect_begin(move |gesture, _| {
            let Some((x, y)) = gesture.bounding_box_center() else {
                return;
            };
            let mut state = state.borrow_mut();
            let centre = Fit::new(area.width() as f64, area.height() as f64).to_canvas(x, y);
            let grabbed = state.transform.invert(centre);
            state.pinch = Some((state.transform, grabbed));
            state.live.interrupt_camera();
        });

        let state = self.state.clone();
        let area = self.area.clone();
        zoom.connect_scale_changed(move |gesture, scale| {
            let Some((x, y)) = gesture.bounding_box_center() else {
                return;
            };
            let mut state = state.borrow_mut();
            let Some((origin, grabbed)) = state.pinch else {
                return;
            };
            let centre = Fit::new(area.width() as f64, area.height() as f64).to_canvas(x, y);
            state.transform = ZoomTransform::pinch(&origin, centre, grabbed, scale);
            area.queue_draw();
        });

        let state = self.state.clone();
        zoom.connect_end(move |_, _| {
            state.borrow_mut().pinch = None;
        });

        self.area.add_controller(zoom);
    }
}

impl Default for MapWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> f64 {
    glib::monotonic_time() as f64 / 1_000_000.0
}

/// Centred, aspect-preserving fit of the canvas into the widget.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fit {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Fit {
    fn new(width: f64, height: f64) -> Self {
        let scale = (width / CANVAS_WIDTH).min(height / CANVAS_HEIGHT).max(f64::EPSILON);
        Self {
            scale,
            offset_x: (width - CANVAS_WIDTH * scale) / 2.0,
            offset_y: (height - CANVAS_HEIGHT * scale) / 2.0,
        }
    }

    fn to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.offset_x) / self.scale, (y - self.offset_y) / self.scale)
    }
}

fn set_rgb(cr: &cairo::Context, color: Rgb, alpha: f64) {
    cr.set_source_rgba(color.r, color.g, color.b, alpha);
}

fn trace_shape(cr: &cairo::Context, shape: &geo::MultiPolygon<f64>) {
    for polygon in &shape.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut coords = ring.0.iter();
            if let Some(first) = coords.next() {
                cr.move_to(first.x, first.y);
                for c in coords {
                    cr.line_to(c.x, c.y);
                }
                cr.close_path();
            }
        }
    }
}

fn draw_regions(cr: &cairo::Context, scene: &Scene, live: &LiveMap, t: f64) {
    cr.set_fill_rule(cairo::FillRule::EvenOdd);
    for &idx in live.paint_order() {
        let Some(region) = scene.regions.get(idx) else {
            continue;
        };
        let style = live.region_style(idx, region.highlighted, t);

        let _ = cr.save();
        if style.scale != 1.0 {
            let (cx, cy) = region.centroid;
            cr.translate(cx, cy);
            cr.scale(style.scale, style.scale);
            cr.translate(-cx, -cy);
        }

        if style.shadow > 0.0 {
            let _ = cr.save();
            cr.translate(0.0, 4.0);
            cr.new_path();
            trace_shape(cr, &region.shape);
            cr.set_source_rgba(0.0, 0.0, 0.0, 0.1 * style.shadow);
            let _ = cr.fill();
            let _ = cr.restore();
        }

        cr.new_path();
        trace_shape(cr, &region.shape);
        set_rgb(cr, style.fill, 1.0);
        let _ = cr.fill_preserve();
        set_rgb(cr, style.stroke, 1.0);
        cr.set_line_width(style.stroke_width);
        let _ = cr.stroke();
        let _ = cr.restore();
    }
}

fn pin_path(cr: &cairo::Context) {
    cr.new_path();
    cr.move_to(0.0, 0.0);
    cr.curve_to(-5.0, -10.0, -10.0, -12.0, -10.0, -20.0);
    cr.arc(0.0, -20.0, 10.0, PI, 2.0 * PI);
    cr.curve_to(10.0, -12.0, 5.0, -10.0, 0.0, 0.0);
    cr.close_path();
}

/// Teardrop pin with its tip at the origin.
fn draw_pin(cr: &cairo::Context) {
    // Shadow
    let _ = cr.save();
    cr.translate(0.0, 4.0);
    pin_path(cr);
    cr.set_source_rgba(0.0, 0.0, 0.0, 0.2);
    let _ = cr.fill();
    let _ = cr.restore();

    pin_path(cr);
    set_rgb(cr, MARKER_FILL, 1.0);
    let _ = cr.fill_preserve();
    cr.set_source_rgb(1.0, 1.0, 1.0);
    cr.set_line_width(1.5);
    let _ = cr.stroke();

    cr.new_path();
    cr.arc(0.0, -20.0, 3.0, 0.0, 2.0 * PI);
    cr.set_source_rgb(1.0, 1.0, 1.0);
    let _ = cr.fill();
}

fn rounded_rect(cr: &cairo::Context, x: f64, y: f64, width: f64, height: f64, radius: f64) {
    let r = radius.min(width / 2.0).min(height / 2.0);
    cr.new_path();
    cr.arc(x + width - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + width - r, y + height - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + height - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 1.5 * PI);
    cr.close_path();
}

/// Country label centred above the pin on a box sized to the text.
fn draw_label(cr: &cairo::Context, text: &str) {
    let _ = cr.save();
    cr.translate(0.0, LABEL_OFFSET);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(LABEL_FONT_SIZE);

    let Ok(extents) = cr.text_extents(text) else {
        let _ = cr.restore();
        return;
    };
    let start_x = -extents.x_advance() / 2.0;

    rounded_rect(
        cr,
        start_x + extents.x_bearing() - LABEL_PADDING,
        extents.y_bearing() - LABEL_PADDING,
        extents.width() + LABEL_PADDING * 2.0,
        extents.height() + LABEL_PADDING * 2.0,
        4.0,
    );
    cr.set_source_rgb(1.0, 1.0, 1.0);
    let _ = cr.fill_preserve();
    set_rgb(cr, LABEL_BORDER, 1.0);
    cr.set_line_width(1.0);
    let _ = cr.stroke();

    cr.move_to(start_x, 0.0);
    set_rgb(cr, LABEL_TEXT, 1.0);
    let _ = cr.show_text(text);
    let _ = cr.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_origin, Coordinates};
    use crate::map::animation::{CAMERA_FOCUS_SECS, CAMERA_RESET_SECS};
    use crate::map::world::tests::sample_world;

    fn loaded_state() -> MapState {
        let mut state = MapState::new(0.0);
        state.features = sample_world();
        state.render(0.0);
        state
    }

    fn paris() -> MedicineOrigin {
        MedicineOrigin {
            country: "France".to_string(),
            country_code: "FRA".to_string(),
            city: Some("Paris".to_string()),
            coordinates: Coordinates { lat: 48.85, lng: 2.35 },
            ..sample_origin("Aspirin")
        }
    }

    #[test]
    fn new_origin_restarts_marker_pulse_and_camera() {
        let mut state = loaded_state();
        assert!(state.show(Some(&sample_origin("Penicillin")), 1, 0.0));
        assert!(state.live.pulse(10.0).is_some());
        assert!(state.live.marker_scale(10.0) > 0.0);

        assert!(state.show(Some(&paris()), 2, 10.0));
        assert_eq!(state.live.elapsed(10.0), 0.0);
        assert_eq!(state.live.marker_scale(10.0), 0.0);
        assert_eq!(state.live.pulse(10.0), None);

        let marker = state.scene.marker.clone().unwrap();
        assert_eq!(marker.point, state.projection.project(2.35, 48.85));
        assert_eq!(marker.label, "FRANCE");
        assert_eq!(
            state.live.camera(10.0 + CAMERA_FOCUS_SECS),
            Some(ZoomTransform::focus(marker.point))
        );
    }

    #[test]
    fn clearing_origin_stops_pulse_and_resets_camera() {
        let mut state = loaded_state();
        state.show(Some(&sample_origin("Penicillin")), 1, 0.0);
        state.transform = ZoomTransform::focus(state.scene.marker.clone().unwrap().point);

        assert!(state.show(None, 2, 20.0));
        assert!(state.scene.marker.is_none());
        assert_eq!(state.live.pulse(25.0), None);
        assert_eq!(state.live.camera(20.0 + CAMERA_RESET_SECS), Some(ZoomTransform::IDENTITY));
    }

    #[test]
    fn same_generation_is_not_rerendered_but_a_repeat_lookup_is() {
        let mut state = loaded_state();
        state.show(Some(&paris()), 1, 0.0);
        assert!(!state.show(Some(&paris()), 1, 5.0));
        assert_eq!(state.live.elapsed(5.0), 5.0);

        // Same record from a fresh lookup refocuses after the user panned away.
        state.transform = ZoomTransform { k: 1.0, x: -200.0, y: 0.0 };
        assert!(state.show(Some(&paris()), 2, 6.0));
        assert_eq!(state.live.elapsed(6.0), 0.0);
        let marker = state.scene.marker.clone().unwrap();
        assert_eq!(
            state.live.camera(6.0 + CAMERA_FOCUS_SECS),
            Some(ZoomTransform::focus(marker.point))
        );
    }

    #[test]
    fn fit_letterboxes_wide_widgets() {
        let fit = Fit::new(1600.0, 500.0);
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.offset_x, 400.0);
        assert_eq!(fit.offset_y, 0.0);
        assert_eq!(fit.to_canvas(400.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn fit_scales_down_small_widgets() {
        let fit = Fit::new(400.0, 400.0);
        assert_eq!(fit.scale, 0.5);
        assert_eq!(fit.offset_y, 75.0);
        assert_eq!(fit.to_canvas(200.0, 200.0), (400.0, 250.0));
    }
}
