//! Point geometry in the canonical spatial reference system.
//!
//! All geometries are normalized to SRID 4326 on ingestion: a source value
//! may arrive as WKT (`POINT(13.40 52.52)`) or EWKT with a leading SRID tag
//! (`SRID=4326;POINT(13.40 52.52)`); any declared SRID is overridden rather
//! than reprojected, since every source is assumed to already share the
//! canonical system. Distances are planar, in coordinate units, consistent
//! with what the stored geometry's distance operator returns.

use serde::{Deserialize, Serialize};

/// Spatial reference system shared by all canonical geometry.
pub const SRID: u32 = 4326;

/// A 2-D point in the canonical SRS. `x` is longitude, `y` latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Planar Euclidean distance to `other`, in coordinate units.
    #[inline]
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Coordinate along `axis` (0 = x, 1 = y).
    #[inline]
    pub(crate) fn coord(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }
}

/// Parse a WKT or EWKT `POINT` into the canonical SRS.
///
/// Returns `None` for anything that is not a well-formed point: records with
/// unparseable geometry stay in the canonical dataset, they just never take
/// part in nearest-neighbor work.
pub fn parse_point(text: &str) -> Option<GeoPoint> {
    let mut body = text.trim();

    // Strip an EWKT "SRID=n;" tag; the declared value is ignored.
    if prefix_ci(body, "srid=") {
        let (_, rest) = body.split_once(';')?;
        body = rest.trim();
    }

    if !prefix_ci(body, "point") {
        return None;
    }
    let body = body[5..].trim_start();

    let inner = body.strip_prefix('(')?.strip_suffix(')')?;
    let mut coords = inner.split_whitespace();
    let x: f64 = coords.next()?.parse().ok()?;
    let y: f64 = coords.next()?.parse().ok()?;
    if coords.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(GeoPoint::new(x, y))
}

/// ASCII case-insensitive prefix test, safe on any byte content.
fn prefix_ci(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
