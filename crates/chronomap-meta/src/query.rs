//! Zoom-filtered views over a dimension's waypoints.
//!
//! A [`PointsView`] holds the dimension's waypoint list as it was when the
//! query started, so a concurrent reload never changes a response halfway
//! through serialization. IDs are positions in the filtered output and are
//! only meaningful within one response.

use std::sync::Arc;

use serde::ser::{Serialize, Serializer};

use crate::waypoint::{Waypoint, WaypointList};

/// Zoom level assumed when a client does not send a usable one.
pub const DEFAULT_ZOOM_LEVEL: i32 = 100;

/// One waypoint as sent to the map client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VisiblePoint<'a> {
    /// Position within this query's output.
    pub id: usize,
    /// Display name.
    pub name: &'a str,
    /// Phonetic reading.
    #[serde(rename = "hira")]
    pub reading: &'a str,
    /// Description.
    pub detail: &'a str,
    /// Numeric waypoint kind.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Color specification.
    pub color: &'a str,
    /// World X coordinate.
    pub x: i32,
    /// World Z coordinate.
    pub z: i32,
}

/// Whether a waypoint is shown at `zoom_level`.
pub fn is_visible(waypoint: &Waypoint, zoom_level: i32) -> bool {
    i64::from(waypoint.zoom_threshold) <= i64::from(zoom_level)
}

/// Waypoints of one dimension visible at a given zoom level.
#[derive(Debug, Clone)]
pub struct PointsView {
    waypoints: Arc<WaypointList>,
    zoom_level: i32,
}

impl PointsView {
    /// Build a view over a dimension's waypoint list.
    pub const fn new(waypoints: Arc<WaypointList>, zoom_level: i32) -> Self {
        Self {
            waypoints,
            zoom_level,
        }
    }

    /// Visible waypoints in original order, numbered from zero.
    pub fn iter(&self) -> impl Iterator<Item = VisiblePoint<'_>> {
        self.waypoints
            .iter()
            .filter(|wp| is_visible(wp, self.zoom_level))
            .zip(0_usize..)
            .map(|(wp, id)| VisiblePoint {
                id,
                name: &wp.name,
                reading: &wp.reading,
                detail: &wp.detail,
                kind: wp.kind.code(),
                color: wp.color.as_str(),
                x: wp.x,
                z: wp.z,
            })
    }

    /// Number of visible waypoints.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl Serialize for PointsView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::palette::ColorSpec;
    use crate::waypoint::WaypointKind;

    fn waypoint(name: &str, zoom_threshold: u32) -> Waypoint {
        Waypoint {
            name: name.to_owned(),
            reading: String::new(),
            detail: String::new(),
            station_id: String::new(),
            kind: WaypointKind::Train,
            color: ColorSpec::parse("#00f").unwrap(),
            x: 1,
            z: -2,
            zoom_threshold,
        }
    }

    fn view(zoom: i32) -> PointsView {
        let list = vec![waypoint("a", 10), waypoint("b", 70), waypoint("c", 30)];
        PointsView::new(Arc::new(WaypointList::from(list)), zoom)
    }

    fn names(view: &PointsView) -> Vec<&str> {
        view.iter().map(|p| p.name).collect()
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(names(&view(70)), ["a", "b", "c"]);
        assert_eq!(names(&view(100)), ["a", "b", "c"]);
        assert_eq!(names(&view(69)), ["a", "c"]);
    }

    #[test]
    fn ids_are_dense_over_filtered_output() {
        let ids: Vec<_> = view(30).iter().map(|p| p.id).collect();
        assert_eq!(ids, [0, 1]);
        assert_eq!(names(&view(30)), ["a", "c"]);
    }

    #[test]
    fn negative_zoom_hides_everything() {
        assert!(view(-1).is_empty());
        assert_eq!(view(0).len(), 0);
    }

    #[test]
    fn serializes_client_shape() {
        let json = serde_json::to_value(view(10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 0,
                "name": "a",
                "hira": "",
                "detail": "",
                "type": 2,
                "color": "#00f",
                "x": 1,
                "z": -2,
            }])
        );
    }
}
