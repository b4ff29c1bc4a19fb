use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use bluejay_engine::{Collectible, GeoBounds, GeoPoint};

/// Buildings count as "nearby" for informational lookups inside this
/// radius.
pub(crate) const BUILDING_LOOKUP_RADIUS_METERS: f64 = 50.0;

fn default_zoom() -> f64 {
    18.0
}

fn default_pitch_degrees() -> f64 {
    75.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ViewDefaults {
    #[serde(default = "default_zoom")]
    pub(crate) zoom: f64,
    #[serde(default = "default_pitch_degrees")]
    pub(crate) pitch_degrees: f64,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            pitch_degrees: default_pitch_degrees(),
        }
    }
}

/// Informational record for a campus building. Plain data handed to the
/// UI collaborator; nothing in the simulation collides with it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct BuildingInfo {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) location: GeoPoint,
    pub(crate) description: String,
    #[serde(rename = "type")]
    pub(crate) building_type: String,
    pub(crate) year_built: u32,
    pub(crate) height_meters: f64,
}

impl BuildingInfo {
    /// One-line blurb for logs and info popups.
    pub(crate) fn summary(&self) -> String {
        format!(
            "{} ({}, built {}, {:.0}m): {}",
            self.name, self.building_type, self.year_built, self.height_meters, self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct CampusConfig {
    pub(crate) name: String,
    pub(crate) origin: GeoPoint,
    pub(crate) bounds: GeoBounds,
    #[serde(default)]
    pub(crate) view: ViewDefaults,
    pub(crate) collectibles: Vec<Collectible>,
    #[serde(default)]
    pub(crate) buildings: Vec<BuildingInfo>,
}

#[derive(Debug, Error)]
pub(crate) enum CampusConfigError {
    #[error("failed to read campus config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid campus config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },
}

/// Loads the campus config if present. A missing file is not an error;
/// the compiled-in default campus takes over.
pub(crate) fn load_campus_config(path: &Path) -> Result<Option<CampusConfig>, CampusConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CampusConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let config: CampusConfig =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
            CampusConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
    Ok(Some(config))
}

/// The building closest to `point`, if any sits within the lookup
/// radius.
pub(crate) fn nearest_building(
    point: GeoPoint,
    buildings: &[BuildingInfo],
    max_distance_meters: f64,
) -> Option<&BuildingInfo> {
    buildings
        .iter()
        .map(|building| (building, point.distance_meters(building.location)))
        .filter(|(_, distance)| *distance <= max_distance_meters)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(building, _)| building)
}

fn collectible(id: &str, name: &str, lon: f64, lat: f64, reward: u32) -> Collectible {
    Collectible {
        id: id.to_string(),
        name: name.to_string(),
        location: GeoPoint::new(lon, lat),
        reward,
        collected: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn building(
    id: &str,
    name: &str,
    lon: f64,
    lat: f64,
    description: &str,
    building_type: &str,
    year_built: u32,
    height_meters: f64,
) -> BuildingInfo {
    BuildingInfo {
        id: id.to_string(),
        name: name.to_string(),
        location: GeoPoint::new(lon, lat),
        description: description.to_string(),
        building_type: building_type.to_string(),
        year_built,
        height_meters,
    }
}

/// The Elizabethtown College campus, used whenever no config file is
/// deployed.
pub(crate) fn default_campus() -> CampusConfig {
    CampusConfig {
        name: "Elizabethtown College".to_string(),
        origin: GeoPoint::new(-76.589503, 40.149641),
        bounds: GeoBounds::new(
            GeoPoint::new(-76.596720, 40.143198),
            GeoPoint::new(-76.581853, 40.153440),
        ),
        view: ViewDefaults::default(),
        collectibles: vec![
            collectible("item1", "Blue Jay Feather", -76.5920, 40.1535, 10),
            collectible("item2", "Campus Map", -76.5930, 40.1525, 5),
            collectible("item3", "College Pennant", -76.5910, 40.1530, 15),
            collectible("item4", "Library Book", -76.5935, 40.1535, 20),
            collectible("item5", "Science Beaker", -76.5918, 40.1528, 25),
        ],
        buildings: vec![
            building(
                "brossman-commons",
                "Brossman Commons",
                -76.5924,
                40.1532,
                "Student center with dining facilities, bookstore, and meeting spaces.",
                "Student Center",
                2002,
                15.0,
            ),
            building(
                "high-library",
                "High Library",
                -76.5935,
                40.1535,
                "The main campus library with study spaces, computer labs, and extensive collections.",
                "Academic",
                1990,
                20.0,
            ),
            building(
                "nicarry-hall",
                "Nicarry Hall",
                -76.5915,
                40.1525,
                "Home to many academic departments including Business, Education, and Social Sciences.",
                "Academic",
                1972,
                12.0,
            ),
            building(
                "leffler-chapel",
                "Leffler Chapel and Performance Center",
                -76.5905,
                40.1540,
                "Venue for concerts, lectures, and campus events with a beautiful auditorium.",
                "Performance",
                1995,
                18.0,
            ),
            building(
                "hackman-apartments",
                "Hackman Apartments",
                -76.5945,
                40.1520,
                "Student apartment-style housing for upperclassmen.",
                "Residential",
                1988,
                12.0,
            ),
            building(
                "zug-hall",
                "Zug Memorial Hall",
                -76.5918,
                40.1528,
                "Houses the Music Department with practice rooms and performance spaces.",
                "Academic",
                1957,
                14.0,
            ),
            building(
                "hoover-center",
                "Hoover Center for Business",
                -76.5930,
                40.1526,
                "Modern facility for business education with technology-enhanced classrooms.",
                "Academic",
                2006,
                16.0,
            ),
        ],
    }
}
