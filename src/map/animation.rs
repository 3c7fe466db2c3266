//! Easing curves, colours and timing for the map's transitions.

use std::f64::consts::TAU;

pub const FILL_SECS: f64 = 0.8;
pub const HOVER_SECS: f64 = 0.25;
pub const MARKER_DELAY_SECS: f64 = 0.4;
pub const MARKER_SECS: f64 = 0.8;
pub const PULSE_DELAY_SECS: f64 = 1.0;
pub const PULSE_PERIOD_SECS: f64 = 2.0;
pub const PULSE_MAX_RADIUS: f64 = 25.0;
pub const CAMERA_FOCUS_SECS: f64 = 1.5;
pub const CAMERA_RESET_SECS: f64 = 1.0;

/// Scale applied to a hovered region about its centroid.
pub const HOVER_SCALE: f64 = 1.03;

const ELASTIC_AMPLITUDE: f64 = 1.2;
const ELASTIC_PERIOD: f64 = 0.4;

/// Symmetric cubic easing, the default for every transition on the map.
pub fn cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Elastic ease-out used for the marker drop. Overshoots past 1 before settling.
pub fn elastic_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let a = ELASTIC_AMPLITUDE.max(1.0);
    let p = ELASTIC_PERIOD / TAU;
    let s = (1.0 / a).asin() * p;
    1.0 - a * tpmt(t) * ((t + s) / p).sin()
}

// 2^(-10x), rescaled so that tpmt(0) = 1 and tpmt(1) = 0.
fn tpmt(x: f64) -> f64 {
    ((-10.0 * x).exp2() - 0.000_976_562_5) * 1.000_977_517_106_549_4
}

/// Linear progress of a transition `elapsed` seconds after a `delay`.
pub fn progress(elapsed: f64, delay: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((elapsed - delay) / duration).clamp(0.0, 1.0)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f64 / 255.0,
            g: ((hex >> 8) & 0xff) as f64 / 255.0,
            b: (hex & 0xff) as f64 / 255.0,
        }
    }

    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
        }
    }
}

pub const REGION_INITIAL: Rgb = Rgb::from_hex(0xf1f5f9);
pub const REGION_NEUTRAL: Rgb = Rgb::from_hex(0xf8fafc);
pub const REGION_HIGHLIGHT: Rgb = Rgb::from_hex(0xdbeafe);
pub const REGION_STROKE: Rgb = Rgb::from_hex(0xcbd5e1);
pub const REGION_STROKE_HOVER: Rgb = Rgb::from_hex(0x3b82f6);
pub const REGION_STROKE_WIDTH: f64 = 0.5;
pub const REGION_STROKE_WIDTH_HOVER: f64 = 1.5;

pub const MARKER_FILL: Rgb = Rgb::from_hex(0xef4444);
pub const LABEL_TEXT: Rgb = Rgb::from_hex(0x1e293b);
pub const LABEL_BORDER: Rgb = Rgb::from_hex(0xe2e8f0);
pub const BACKGROUND: Rgb = Rgb::from_hex(0xf8fafc);

/// Pulse ring radius and opacity at `elapsed` seconds since the render.
/// `None` before the first cycle starts.
pub fn pulse(elapsed: f64) -> Option<(f64, f64)> {
    if elapsed < PULSE_DELAY_SECS {
        return None;
    }
    let cycle = (elapsed - PULSE_DELAY_SECS) % PULSE_PERIOD_SECS;
    let t = cubic_in_out(cycle / PULSE_PERIOD_SECS);
    Some((PULSE_MAX_RADIUS * t, 1.0 - t))
}

/// Marker scale at `elapsed` seconds since the render.
pub fn marker_scale(elapsed: f64) -> f64 {
    if elapsed <= MARKER_DELAY_SECS {
        return 0.0;
    }
    elastic_out(progress(elapsed, MARKER_DELAY_SECS, MARKER_SECS))
}

/// Region fill `elapsed` seconds after the render.
pub fn region_fill(highlighted: bool, elapsed: f64) -> Rgb {
    let target = if highlighted { REGION_HIGHLIGHT } else { REGION_NEUTRAL };
    REGION_INITIAL.mix(target, cubic_in_out(progress(elapsed, 0.0, FILL_SECS)))
}
