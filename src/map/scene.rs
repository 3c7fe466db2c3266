use geo::{Centroid, Contains, MapCoords, MultiPolygon, Point};

use super::world::CountryFeature;
use super::projection::Projection;
use crate::data::MedicineOrigin;

/// Display list for one state of the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub regions: Vec<Region>,
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    /// Canvas coordinates.
    pub shape: MultiPolygon<f64>,
    /// Pivot for the hover scale.
    pub centroid: (f64, f64),
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub point: (f64, f64),
    pub label: String,
}

/// Build the scene for `features` with an optional current origin.
pub fn render(
    features: &[CountryFeature],
    origin: Option<&MedicineOrigin>,
    projection: &Projection,
) -> Scene {
    let regions = features
        .iter()
        .map(|feature| {
            let shape = feature.shape.map_coords(|c| projection.project_coord(c));
            let centroid = shape
                .centroid()
                .map(|p| (finite_or_zero(p.x()), finite_or_zero(p.y())))
                .unwrap_or((0.0, 0.0));
            Region {
                highlighted: origin.is_some_and(|o| o.country_code == feature.id),
                id: feature.id.clone(),
                shape,
                centroid,
            }
        })
        .collect();

    let marker = origin.map(|o| Marker {
        point: projection.project(o.coordinates.lng, o.coordinates.lat),
        label: o.country.to_uppercase(),
    });

    Scene { regions, marker }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

impl Scene {
    /// Index of the region under canvas point `(x, y)`, searching `order`
    /// from the top of the paint stack down.
    pub fn region_at(&self, order: &[usize], (x, y): (f64, f64)) -> Option<usize> {
        let point = Point::new(x, y);
        order
            .iter()
            .rev()
            .copied()
            .find(|&idx| self.regions.get(idx).is_some_and(|r| r.shape.contains(&point)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_origin;
    use crate::map::world::tests::sample_world;

    #[test]
    fn highlights_region_with_matching_id() {
        let origin = sample_origin("Penicillin");
        let scene = render(&sample_world(), Some(&origin), &Projection::default());
        let highlighted: Vec<_> = scene
            .regions
            .iter()
            .filter(|r| r.highlighted)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(highlighted, vec!["GBR"]);
    }

    #[test]
    fn unknown_code_still_places_marker() {
        let mut origin = sample_origin("Quinine");
        origin.country_code = "XXX".to_string();
        origin.country = "Peru".to_string();

        let scene = render(&sample_world(), Some(&origin), &Projection::default());
        assert!(scene.regions.iter().all(|r| !r.highlighted));
        let marker = scene.marker.unwrap();
        assert_eq!(marker.label, "PERU");
    }

    #[test]
    fn marker_point_matches_projection() {
        let origin = sample_origin("Penicillin");
        let scene = render(&[], Some(&origin), &Projection::default());
        let (x, y) = scene.marker.unwrap().point;
        assert!((x - 399.727_728_6).abs() < 1e-6);
        assert!((y - 159.560_666_3).abs() < 1e-6);
        assert!(scene.regions.is_empty());
    }

    #[test]
    fn no_origin_means_no_marker_or_highlight() {
        let scene = render(&sample_world(), None, &Projection::default());
        assert!(scene.marker.is_none());
        assert!(scene.regions.iter().all(|r| !r.highlighted));
    }

    #[test]
    fn rendering_is_deterministic() {
        let origin = sample_origin("Penicillin");
        let projection = Projection::default();
        assert_eq!(
            render(&sample_world(), Some(&origin), &projection),
            render(&sample_world(), Some(&origin), &projection)
        );
    }

    #[test]
    fn hit_testing_follows_paint_order() {
        let scene = render(&sample_world(), None, &Projection::default());
        let london = Projection::default().project(-0.12, 51.5);
        assert_eq!(scene.region_at(&[0, 1], london), Some(0));
        assert_eq!(scene.region_at(&[1, 0], london), Some(0));
        assert_eq!(scene.region_at(&[0, 1], (0.0, 0.0)), None);
    }

    #[test]
    fn centroid_lies_inside_square_region() {
        let scene = render(&sample_world(), None, &Projection::default());
        let france = &scene.regions[1];
        let (cx, cy) = france.centroid;
        assert!(france.shape.contains(&Point::new(cx, cy)));
    }
}
