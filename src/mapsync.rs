/// Map sync adapter: translates the committed snapshot into a map-layer
/// update.
///
/// The core produces both halves of the update (the GeoJSON feature
/// collection built from the snapshot's distributed points, and the paint
/// scheme derived from the risk level) and hands them to whatever rendering
/// collaborator implements `MapLayerSink`. It never renders anything itself.

use crate::model::{RiskLevel, TelemetrySnapshot};
use serde::Serialize;

// ---------------------------------------------------------------------------
// GeoJSON output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: PointProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// GeoJSON position order: (lon, lat).
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointProperties {
    pub runoff_mm: f64,
}

/// One complete layer update: features plus the risk-derived paint scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapUpdate {
    pub features: FeatureCollection,
    pub point_color: &'static str,
    pub point_opacity: f64,
}

/// Rendering collaborator seam. Implemented outside the core.
pub trait MapLayerSink {
    fn apply_update(&mut self, update: &MapUpdate);
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Circle color for the risk point layer.
pub fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "#dc2626",
        RiskLevel::Warning => "#f59e0b",
        RiskLevel::Safe => "#22c55e",
    }
}

/// Circle opacity: visible from WARNING upward, hidden when safe.
pub fn risk_opacity(level: RiskLevel) -> f64 {
    if level >= RiskLevel::Warning { 0.4 } else { 0.0 }
}

/// Builds the layer update for a committed snapshot.
pub fn build_update(snapshot: &TelemetrySnapshot) -> MapUpdate {
    let features = snapshot
        .points
        .iter()
        .map(|p| Feature {
            kind: "Feature",
            geometry: PointGeometry {
                kind: "Point",
                coordinates: [p.lon, p.lat],
            },
            properties: PointProperties {
                runoff_mm: p.runoff_mm,
            },
        })
        .collect();

    MapUpdate {
        features: FeatureCollection {
            kind: "FeatureCollection",
            features,
        },
        point_color: risk_color(snapshot.risk_level),
        point_opacity: risk_opacity(snapshot.risk_level),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DistributedPoint;

    fn snapshot_with(level: RiskLevel, points: Vec<DistributedPoint>) -> TelemetrySnapshot {
        let mut snap = TelemetrySnapshot::initial();
        snap.risk_level = level;
        snap.points = points;
        snap
    }

    #[test]
    fn test_paint_scheme_per_level() {
        assert_eq!(risk_color(RiskLevel::Safe), "#22c55e");
        assert_eq!(risk_color(RiskLevel::Warning), "#f59e0b");
        assert_eq!(risk_color(RiskLevel::Critical), "#dc2626");

        assert_eq!(risk_opacity(RiskLevel::Safe), 0.0, "safe points are hidden");
        assert_eq!(risk_opacity(RiskLevel::Warning), 0.4);
        assert_eq!(risk_opacity(RiskLevel::Critical), 0.4);
    }

    #[test]
    fn test_features_use_lon_lat_order() {
        let snap = snapshot_with(
            RiskLevel::Warning,
            vec![DistributedPoint {
                lat: 29.956,
                lon: 78.18,
                runoff_mm: 42.3,
            }],
        );

        let update = build_update(&snap);
        assert_eq!(update.features.features.len(), 1);

        let feature = &update.features.features[0];
        assert_eq!(feature.geometry.coordinates, [78.18, 29.956], "GeoJSON order is (lon, lat)");
        assert_eq!(feature.properties.runoff_mm, 42.3);
    }

    #[test]
    fn test_update_serializes_as_geojson() {
        let snap = snapshot_with(
            RiskLevel::Critical,
            vec![DistributedPoint {
                lat: 1.0,
                lon: 2.0,
                runoff_mm: 3.0,
            }],
        );

        let json = serde_json::to_value(build_update(&snap)).unwrap();
        assert_eq!(json["features"]["type"], "FeatureCollection");
        assert_eq!(json["features"]["features"][0]["type"], "Feature");
        assert_eq!(json["features"]["features"][0]["geometry"]["type"], "Point");
        assert_eq!(json["point_color"], "#dc2626");
    }

    #[test]
    fn test_empty_point_set_yields_empty_collection() {
        let update = build_update(&snapshot_with(RiskLevel::Safe, Vec::new()));
        assert!(update.features.features.is_empty());
        assert_eq!(update.point_opacity, 0.0);
    }
}
