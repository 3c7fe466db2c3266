use geo::{Geometry, MultiPolygon};
use geojson::{feature::Id, GeoJson};

use crate::error::GeoError;

/// One world region from the boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Compared against `MedicineOrigin::country_code`.
    pub id: String,
    pub name: String,
    /// Longitude/latitude degrees.
    pub shape: MultiPolygon<f64>,
}

/// Fetch the boundary dataset. Failure is cosmetic: the map just stays empty.
pub async fn load_world(url: &str) -> Vec<CountryFeature> {
    match fetch_world(url).await {
        Ok(features) => {
            tracing::info!(count = features.len(), "loaded world boundaries");
            features
        }
        Err(e) => {
            tracing::warn!("world boundaries unavailable, map will be empty: {}", e);
            Vec::new()
        }
    }
}

async fn fetch_world(url: &str) -> Result<Vec<CountryFeature>, GeoError> {
    let text = reqwest::get(url).await?.error_for_status()?.text().await?;
    parse_features(&text)
}

pub fn parse_features(text: &str) -> Result<Vec<CountryFeature>, GeoError> {
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(GeoError::NotFeatureCollection);
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let id = match &feature.id {
            Some(Id::String(id)) => id.clone(),
            Some(Id::Number(id)) => id.to_string(),
            None => String::new(),
        };
        let name = feature
            .property("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let shape = match Geometry::<f64>::try_from(geometry.value) {
            Ok(Geometry::Polygon(polygon)) => polygon.into(),
            Ok(Geometry::MultiPolygon(multi)) => multi,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(id = %id, "skipping unreadable geometry: {}", e);
                continue;
            }
        };

        features.push(CountryFeature { id, name, shape });
    }
    Ok(features)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geo::polygon;

    /// Two unit-ish squares standing in for real countries.
    pub(crate) fn sample_world() -> Vec<CountryFeature> {
        vec![
            CountryFeature {
                id: "GBR".to_string(),
                name: "England".to_string(),
                shape: polygon![
                    (x: -5.0, y: 50.0), (x: 2.0, y: 50.0), (x: 2.0, y: 55.0), (x: -5.0, y: 55.0)
                ]
                .into(),
            },
            CountryFeature {
                id: "FRA".to_string(),
                name: "France".to_string(),
                shape: polygon![
                    (x: -4.0, y: 43.0), (x: 7.0, y: 43.0), (x: 7.0, y: 50.0), (x: -4.0, y: 50.0)
                ]
                .into(),
            },
        ]
    }

    #[test]
    fn reads_string_and_numeric_ids() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "GBR", "properties": {"name": "England"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type": "Feature", "id": 250, "properties": {},
                 "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]]]}},
                {"type": "Feature", "id": "PT", "properties": {"name": "Point"},
                 "geometry": {"type": "Point", "coordinates": [0,0]}}
            ]
        }"#;

        let features = parse_features(text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id, "GBR");
        assert_eq!(features[0].name, "England");
        assert_eq!(features[1].id, "250");
        assert_eq!(features[1].name, "");
    }

    #[test]
    fn rejects_bare_geometry() {
        let text = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(matches!(parse_features(text), Err(GeoError::NotFeatureCollection)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_features("<html>"), Err(GeoError::Parse(_))));
    }

    #[tokio::test]
    async fn unreachable_source_yields_empty_world() {
        assert!(load_world("http://127.0.0.1:9/world.geojson").await.is_empty());
    }
}
