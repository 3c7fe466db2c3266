//! Time-dependent state layered over a [`Scene`]: fill transition, hover
//! tweens and paint order, marker drop, pulse ring and camera moves.
//!
//! A `LiveMap` belongs to exactly one scene. Rendering a new scene replaces
//! it, which drops every running animation with it.

use super::animation::{
    self, cubic_in_out, lerp, progress, Rgb, CAMERA_FOCUS_SECS, CAMERA_RESET_SECS, FILL_SECS,
    HOVER_SCALE, HOVER_SECS,
};
use super::camera::{CameraMove, ZoomTransform};
use super::scene::Scene;

#[derive(Debug, Clone, Copy)]
struct HoverTween {
    from: f64,
    to: f64,
    start: f64,
}

impl HoverTween {
    const REST: Self = Self { from: 0.0, to: 0.0, start: f64::NEG_INFINITY };

    fn value(&self, now: f64) -> f64 {
        lerp(self.from, self.to, cubic_in_out(progress(now - self.start, 0.0, HOVER_SECS)))
    }

    fn retarget(&mut self, to: f64, now: f64) {
        *self = Self { from: self.value(now), to, start: now };
    }

    fn is_running(&self, now: f64) -> bool {
        now - self.start < HOVER_SECS
    }
}

/// Per-region styling at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
    pub fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub scale: f64,
    /// Drop-shadow opacity.
    pub shadow: f64,
}

pub struct LiveMap {
    started: f64,
    order: Vec<usize>,
    hover: Vec<HoverTween>,
    hovered: Option<usize>,
    camera: Option<(CameraMove, f64)>,
    has_marker: bool,
}

impl LiveMap {
    /// Start the live layer for `scene` at time `now` (seconds), moving the
    /// camera from `current` towards the marker or back to identity.
    pub fn new(scene: &Scene, current: ZoomTransform, now: f64) -> Self {
        let camera = match &scene.marker {
            Some(marker) => CameraMove::new(current, ZoomTransform::focus(marker.point), CAMERA_FOCUS_SECS),
            None => CameraMove::new(current, ZoomTransform::IDENTITY, CAMERA_RESET_SECS),
        };
        Self {
            started: now,
            order: (0..scene.regions.len()).collect(),
            hover: vec![HoverTween::REST; scene.regions.len()],
            hovered: None,
            camera: Some((camera, now)),
            has_marker: scene.marker.is_some(),
        }
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.started).max(0.0)
    }

    /// Region indices bottom to top.
    pub fn paint_order(&self) -> &[usize] {
        &self.order
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Pointer moved onto `region` (or off every region).
    pub fn hover(&mut self, region: Option<usize>, now: f64) {
        if region == self.hovered {
            return;
        }
        if let Some(prev) = self.hovered.and_then(|idx| self.hover.get_mut(idx)) {
            prev.retarget(0.0, now);
        }
        if let Some(idx) = region {
            if let Some(tween) = self.hover.get_mut(idx) {
                tween.retarget(1.0, now);
                self.order.retain(|&i| i != idx);
                self.order.push(idx);
            }
        }
        self.hovered = region;
    }

    pub fn region_style(&self, idx: usize, highlighted: bool, now: f64) -> RegionStyle {
        let h = self.hover.get(idx).map_or(0.0, |tween| tween.value(now));
        RegionStyle {
            fill: animation::region_fill(highlighted, self.elapsed(now)),
            stroke: animation::REGION_STROKE.mix(animation::REGION_STROKE_HOVER, h),
            stroke_width: lerp(
                animation::REGION_STROKE_WIDTH,
                animation::REGION_STROKE_WIDTH_HOVER,
                h,
            ),
            scale: lerp(1.0, HOVER_SCALE, h),
            shadow: h,
        }
    }

    pub fn marker_scale(&self, now: f64) -> f64 {
        animation::marker_scale(self.elapsed(now))
    }

    pub fn pulse(&self, now: f64) -> Option<(f64, f64)> {
        if !self.has_marker {
            return None;
        }
        animation::pulse(self.elapsed(now))
    }

    /// A user gesture takes over the camera.
    pub fn interrupt_camera(&mut self) {
        if self.camera.take().is_some() {
            tracing::debug!("camera move interrupted by user");
        }
    }

    /// Camera transform for this frame, if a move is running.
    pub fn camera(&mut self, now: f64) -> Option<ZoomTransform> {
        let (camera, start) = self.camera?;
        let (transform, done) = camera.at(now - start);
        if done {
            self.camera = None;
        }
        Some(transform)
    }

    /// Whether the next frame differs from this one.
    pub fn is_animating(&self, now: f64) -> bool {
        self.has_marker
            || self.camera.is_some()
            || self.elapsed(now) < FILL_SECS
            || self.hover.iter().any(|tween| tween.is_running(now))
    }
}
