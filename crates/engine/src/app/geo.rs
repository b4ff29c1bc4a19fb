use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Linear projection scale around the reference origin. One degree of
/// latitude maps to this many scene units, so a 0.1-unit avatar step is
/// roughly two meters of campus.
pub const SCENE_UNITS_PER_DEGREE: f64 = 5000.0;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Geographic position in degrees. Longitude first, matching the
/// `[lon, lat]` order of the campus config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_meters(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Scene-space position in f64 units relative to the reference origin.
/// `x` grows east, `y` up, `z` grows south (forward at heading 0 is -z).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Axis-aligned geographic rectangle. Fixed after configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.south_west.lon
            && point.lon <= self.north_east.lon
            && point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
    }

    /// Clamps each axis independently. Idempotent.
    pub fn clamp(&self, point: GeoPoint) -> GeoPoint {
        GeoPoint {
            lon: point.lon.clamp(self.south_west.lon, self.north_east.lon),
            lat: point.lat.clamp(self.south_west.lat, self.north_east.lat),
        }
    }
}

/// Bidirectional mapping between geographic coordinates and the local
/// scene plane. Equirectangular around a fixed origin: offsets are linear
/// in degrees, with longitude corrected by `cos(origin.lat)` once so the
/// projection stays exactly invertible.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateBridge {
    origin: GeoPoint,
    lon_scale: f64,
    lat_scale: f64,
}

impl CoordinateBridge {
    pub fn new(origin: GeoPoint) -> Self {
        let cos_origin_lat = origin.lat.to_radians().cos();
        Self {
            origin,
            lon_scale: SCENE_UNITS_PER_DEGREE * cos_origin_lat,
            lat_scale: SCENE_UNITS_PER_DEGREE,
        }
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Projects a geographic point onto the scene plane (`y` = 0).
    pub fn to_local(&self, geo: GeoPoint) -> LocalPoint {
        LocalPoint {
            x: (geo.lon - self.origin.lon) * self.lon_scale,
            y: 0.0,
            z: (self.origin.lat - geo.lat) * self.lat_scale,
        }
    }

    /// Inverse of [`to_local`](Self::to_local). Ignores `y`.
    pub fn to_geo(&self, local: LocalPoint) -> GeoPoint {
        GeoPoint {
            lon: self.origin.lon + local.x / self.lon_scale,
            lat: self.origin.lat - local.z / self.lat_scale,
        }
    }

    /// Approximate meters per scene unit at the origin latitude.
    pub fn meters_per_unit(&self) -> f64 {
        EARTH_RADIUS_METERS * PI / 180.0 / self.lat_scale
    }
}

/// Scene heading (radians, counter-clockwise yaw, 0 = north) to map
/// bearing (degrees clockwise from north).
pub fn bearing_degrees_from_heading(heading_radians: f64) -> f64 {
    -heading_radians.to_degrees()
}
