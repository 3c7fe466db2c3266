//! Fixed Mercator projection onto the 800×500 logical canvas.

use std::f64::consts::FRAC_PI_4;

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 500.0;

/// Mercator is undefined at the poles; latitudes are clamped to the
/// square-map limit so every projected point stays finite.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    /// (lng, lat) in degrees that lands on `translate`.
    center: (f64, f64),
    translate: (f64, f64),
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: 130.0,
            center: (0.0, 20.0),
            translate: (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
        }
    }
}

impl Projection {
    /// Project (lng, lat) in degrees to canvas coordinates.
    pub fn project(&self, lng: f64, lat: f64) -> (f64, f64) {
        let (mx, my) = mercator(lng, lat);
        let (cx, cy) = mercator(self.center.0, self.center.1);
        (
            self.translate.0 + self.scale * (mx - cx),
            self.translate.1 - self.scale * (my - cy),
        )
    }

    pub fn project_coord(&self, coord: geo::Coord<f64>) -> geo::Coord<f64> {
        let (x, y) = self.project(coord.x, coord.y);
        geo::Coord { x, y }
    }
}

fn mercator(lng: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let y = (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (lng.to_radians(), y)
}
