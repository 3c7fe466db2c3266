//! Pan/zoom camera over the logical canvas.
//!
//! User gestures are clamped so the canvas always covers the viewport;
//! programmatic moves (focusing an origin, resetting) are not, and animate
//! along a smooth zoom path that pulls out before travelling far.

use std::f64::consts::SQRT_2;

use super::animation::cubic_in_out;
use super::projection::{CANVAS_HEIGHT, CANVAS_WIDTH};

pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 8.0;
pub const FOCUS_SCALE: f64 = 2.0;

/// Wheel notches and touchpad pixels are converted to a power-of-two zoom step.
pub const WHEEL_NOTCH_STEP: f64 = 0.2;
pub const WHEEL_PIXEL_STEP: f64 = 0.002;

/// `screen = k * canvas + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0, y: 0.0 };

    pub fn apply(&self, (px, py): (f64, f64)) -> (f64, f64) {
        (px * self.k + self.x, py * self.k + self.y)
    }

    pub fn invert(&self, (px, py): (f64, f64)) -> (f64, f64) {
        ((px - self.x) / self.k, (py - self.y) / self.k)
    }

    /// Translate in canvas units (scaled by `k`).
    fn translate(&self, tx: f64, ty: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + self.k * tx,
            y: self.y + self.k * ty,
        }
    }

    /// Centre on canvas point `(px, py)` at [`FOCUS_SCALE`].
    pub fn focus((px, py): (f64, f64)) -> Self {
        Self {
            k: FOCUS_SCALE,
            x: CANVAS_WIDTH / 2.0 - FOCUS_SCALE * px,
            y: CANVAS_HEIGHT / 2.0 - FOCUS_SCALE * py,
        }
    }

    /// Move so that canvas point `world` sits under viewport point `pointer`.
    fn anchor(&self, pointer: (f64, f64), world: (f64, f64)) -> Self {
        let (sx, sy) = self.apply(world);
        if (sx, sy) == pointer {
            return *self;
        }
        Self {
            k: self.k,
            x: self.x + pointer.0 - sx,
            y: self.y + pointer.1 - sy,
        }
    }

    /// Keep the whole viewport inside the canvas.
    pub fn constrain(&self) -> Self {
        let (x0, y0) = self.invert((0.0, 0.0));
        let (x1, y1) = self.invert((CANVAS_WIDTH, CANVAS_HEIGHT));
        let dx1 = x1 - CANVAS_WIDTH;
        let dy1 = y1 - CANVAS_HEIGHT;
        self.translate(settle(x0, dx1), settle(y0, dy1))
    }

    /// Zoom by `2^delta` keeping `pointer` fixed, clamped to the scale range.
    pub fn zoom_about(&self, pointer: (f64, f64), delta: f64) -> Self {
        let k = (self.k * delta.exp2()).clamp(MIN_SCALE, MAX_SCALE);
        let world = self.invert(pointer);
        Self { k, ..*self }.anchor(pointer, world).constrain()
    }

    /// Scale relative to `origin`'s scale, keeping `world` under `pointer`.
    pub fn pinch(origin: &Self, pointer: (f64, f64), world: (f64, f64), factor: f64) -> Self {
        let k = (origin.k * factor).clamp(MIN_SCALE, MAX_SCALE);
        Self { k, ..*origin }.anchor(pointer, world).constrain()
    }

    /// Drag so that `world` follows `pointer`.
    pub fn pan(&self, pointer: (f64, f64), world: (f64, f64)) -> Self {
        self.anchor(pointer, world).constrain()
    }
}

fn settle(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else {
        let low = d0.min(0.0);
        if low != 0.0 {
            low
        } else {
            d1.max(0.0)
        }
    }
}

/// Smooth zoom between two views, each given as (centre x, centre y, width).
#[derive(Debug, Clone, Copy)]
struct ZoomPath {
    from: [f64; 3],
    delta: (f64, f64),
    d1: f64,
    r0: f64,
    s: f64,
}

const RHO: f64 = SQRT_2;

impl ZoomPath {
    fn new(from: [f64; 3], to: [f64; 3]) -> Self {
        let rho2 = RHO * RHO;
        let rho4 = rho2 * rho2;
        let (w0, w1) = (from[2], to[2]);
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let d2 = dx * dx + dy * dy;

        if d2 < 1e-12 {
            return Self {
                from,
                delta: (dx, dy),
                d1: 0.0,
                r0: 0.0,
                s: (w1 / w0).ln() / RHO,
            };
        }

        let d1 = d2.sqrt();
        let b0 = (w1 * w1 - w0 * w0 + rho4 * d2) / (2.0 * w0 * rho2 * d1);
        let b1 = (w1 * w1 - w0 * w0 - rho4 * d2) / (2.0 * w1 * rho2 * d1);
        let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
        let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();
        Self {
            from,
            delta: (dx, dy),
            d1,
            r0,
            s: (r1 - r0) / RHO,
        }
    }

    fn at(&self, t: f64) -> [f64; 3] {
        let [ux0, uy0, w0] = self.from;
        let (dx, dy) = self.delta;
        let s = t * self.s;

        if self.d1 == 0.0 {
            return [ux0 + t * dx, uy0 + t * dy, w0 * (RHO * s).exp()];
        }

        let cosh_r0 = self.r0.cosh();
        let u = w0 / (RHO * RHO * self.d1) * (cosh_r0 * (RHO * s + self.r0).tanh() - self.r0.sinh());
        [ux0 + u * dx, uy0 + u * dy, w0 * cosh_r0 / (RHO * s + self.r0).cosh()]
    }
}

/// An animated camera move from the current transform to a target.
#[derive(Debug, Clone, Copy)]
pub struct CameraMove {
    target: ZoomTransform,
    path: ZoomPath,
    duration: f64,
}

impl CameraMove {
    pub fn new(from: ZoomTransform, target: ZoomTransform, duration: f64) -> Self {
        let p = (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
        let w = CANVAS_WIDTH.max(CANVAS_HEIGHT);
        let view = |t: &ZoomTransform| {
            let (cx, cy) = t.invert(p);
            [cx, cy, w / t.k]
        };
        Self {
            target,
            path: ZoomPath::new(view(&from), view(&target)),
            duration,
        }
    }

    pub fn target(&self) -> ZoomTransform {
        self.target
    }

    /// Transform at `elapsed` seconds, and whether the move has finished.
    pub fn at(&self, elapsed: f64) -> (ZoomTransform, bool) {
        if self.duration <= 0.0 || elapsed >= self.duration {
            return (self.target, true);
        }
        let t = cubic_in_out(elapsed.max(0.0) / self.duration);
        let [cx, cy, width] = self.path.at(t);
        let k = CANVAS_WIDTH.max(CANVAS_HEIGHT) / width;
        let transform = ZoomTransform {
            k,
            x: CANVAS_WIDTH / 2.0 - cx * k,
            y: CANVAS_HEIGHT / 2.0 - cy * k,
        };
        (transform, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: ZoomTransform, b: ZoomTransform) -> bool {
        (a.k - b.k).abs() < 1e-6 && (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn focus_centres_point_at_double_scale() {
        let t = ZoomTransform::focus((399.727_728_6, 159.560_666_3));
        assert_eq!(t.k, 2.0);
        let (sx, sy) = t.apply((399.727_728_6, 159.560_666_3));
        assert!((sx - 400.0).abs() < 1e-9 && (sy - 250.0).abs() < 1e-9);
    }

    #[test]
    fn identity_is_already_constrained() {
        assert_eq!(ZoomTransform::IDENTITY.constrain(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn panning_at_unit_scale_is_pinned() {
        let t = ZoomTransform::IDENTITY.pan((150.0, 80.0), (100.0, 40.0));
        assert!(close(t, ZoomTransform::IDENTITY));
    }

    #[test]
    fn panning_past_the_edge_is_clamped() {
        let zoomed = ZoomTransform { k: 2.0, x: -400.0, y: -250.0 };
        let t = zoomed.pan((900.0, 250.0), zoomed.invert((0.0, 250.0)));
        assert!(close(t, ZoomTransform { k: 2.0, x: 0.0, y: -250.0 }));
    }

    #[test]
    fn wheel_zoom_keeps_pointer_fixed() {
        let pointer = (400.0, 250.0);
        let before = ZoomTransform::IDENTITY.invert(pointer);
        let t = ZoomTransform::IDENTITY.zoom_about(pointer, 1.0);
        assert_eq!(t.k, 2.0);
        let (sx, sy) = t.apply(before);
        assert!((sx - pointer.0).abs() < 1e-9 && (sy - pointer.1).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let max = ZoomTransform::IDENTITY.zoom_about((10.0, 10.0), 10.0);
        assert_eq!(max.k, MAX_SCALE);
        let min = max.zoom_about((10.0, 10.0), -10.0);
        assert!(close(min, ZoomTransform::IDENTITY));
    }

    #[test]
    fn camera_move_reaches_target() {
        let target = ZoomTransform::focus((120.0, 300.0));
        let camera = CameraMove::new(ZoomTransform::IDENTITY, target, 1.5);

        let (start, done) = camera.at(0.0);
        assert!(!done);
        assert!(close(start, ZoomTransform::IDENTITY));

        let (mid, _) = camera.at(0.75);
        assert!(mid.k > 0.0 && mid.k.is_finite());

        assert_eq!(camera.at(1.5), (target, true));
    }

    #[test]
    fn pure_zoom_move_interpolates_scale() {
        let target = ZoomTransform::focus((400.0, 250.0));
        let camera = CameraMove::new(ZoomTransform::IDENTITY, target, 1.0);
        let (mid, _) = camera.at(0.5);
        assert!((mid.k - SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn reset_move_returns_to_identity() {
        let camera = CameraMove::new(ZoomTransform::focus((100.0, 100.0)), ZoomTransform::IDENTITY, 1.0);
        assert_eq!(camera.at(2.0).0, ZoomTransform::IDENTITY);
    }
}
