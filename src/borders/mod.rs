//! Per-year borders overlay: parsing, styling and the loader state machine.

mod fetch;
mod loader;

pub use fetch::{BorderSource, FetchWorker, HttpSource};
pub use loader::{BorderLoader, Completion, FetchOutcome, FetchRequest, LoaderState};

#[cfg(test)]
pub(crate) use fetch::testing::CannedSource;

use crate::colour::{name_to_colour, Fill};
use crate::map::{ring_contains, BBox, FeatureGrid};
use crate::years::Year;
use geojson::{Feature, GeoJson, Geometry, JsonObject, Value};
use glam::DVec2;
use rayon::prelude::*;
use thiserror::Error;

/// Property holding the sovereign/subject entity, preferred for colouring
const COLOUR_KEY: &str = "SUBJECTO";
/// Region name; colour fallback and hover label
const NAME_KEY: &str = "NAME";

/// Grid cell size in degrees for hover/fill lookups
const GRID_CELL_DEGREES: f64 = 5.0;

/// Why a year's borders could not be shown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("invalid GeoJSON: {0}")]
    Parse(String),
    #[error("document is not a feature collection")]
    NotACollection,
}

/// Polygon with exterior ring and holes, in (lon, lat)
#[derive(Clone, Debug)]
pub struct Polygon {
    pub exterior: Vec<DVec2>,
    pub holes: Vec<Vec<DVec2>>,
}

impl Polygon {
    pub fn contains(&self, p: DVec2) -> bool {
        ring_contains(&self.exterior, p) && !self.holes.iter().any(|hole| ring_contains(hole, p))
    }

    /// Every ring, exterior first
    pub fn rings(&self) -> impl Iterator<Item = &[DVec2]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }
}

/// One styled area of a borders dataset
#[derive(Clone, Debug)]
pub struct Region {
    /// Colour key: SUBJECTO, falling back to NAME
    pub name: Option<String>,
    /// Hover label: NAME only
    pub label: Option<String>,
    pub fill: Fill,
    pub polygons: Vec<Polygon>,
    pub bbox: BBox,
}

impl Region {
    pub fn contains(&self, p: DVec2) -> bool {
        self.bbox.contains(p) && self.polygons.iter().any(|poly| poly.contains(p))
    }
}

/// Point feature, drawn as a marker that shows `label` on hover
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub label: Option<String>,
    pub at: DVec2,
}

/// Colour key and label of a feature
fn feature_names(feature: &Feature) -> (Option<String>, Option<String>) {
    let props = feature.properties.as_ref();
    let label = props.and_then(|p| text_property(p, NAME_KEY));
    let name = props
        .and_then(|p| text_property(p, COLOUR_KEY))
        .or_else(|| label.clone());
    (name, label)
}

/// Non-empty string property; other JSON types count as absent
fn text_property(props: &JsonObject, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn to_point(c: &[f64]) -> Option<DVec2> {
    (c.len() >= 2).then(|| DVec2::new(c[0], c[1]))
}

fn to_ring(coords: &[Vec<f64>]) -> Vec<DVec2> {
    coords.iter().filter_map(|c| to_point(c)).collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon {
        exterior: to_ring(exterior),
        holes: holes.iter().map(|h| to_ring(h)).collect(),
    })
}

/// A feature's geometry split by kind
#[derive(Default)]
struct Shapes {
    polygons: Vec<Polygon>,
    points: Vec<DVec2>,
    lines: Vec<Vec<DVec2>>,
}

impl Shapes {
    fn of(feature: &Feature) -> Self {
        let mut shapes = Self::default();
        if let Some(geometry) = &feature.geometry {
            shapes.collect(geometry);
        }
        shapes
    }

    fn collect(&mut self, geometry: &Geometry) {
        match &geometry.value {
            Value::Point(c) => self.points.extend(to_point(c)),
            Value::MultiPoint(points) => self.points.extend(points.iter().filter_map(|c| to_point(c))),
            Value::LineString(coords) => self.lines.push(to_ring(coords)),
            Value::MultiLineString(lines) => self.lines.extend(lines.iter().map(|l| to_ring(l))),
            Value::Polygon(rings) => self.polygons.extend(to_polygon(rings)),
            Value::MultiPolygon(polygons) => self.polygons.extend(polygons.iter().filter_map(|p| to_polygon(p))),
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    self.collect(g);
                }
            }
        }
    }

    fn region(self, name: Option<String>, label: Option<String>) -> Option<Region> {
        if self.polygons.is_empty() {
            return None;
        }
        let bbox = self
            .polygons
            .iter()
            .map(|poly| BBox::of_points(&poly.exterior))
            .fold(BBox::EMPTY, BBox::union);

        Some(Region {
            fill: name_to_colour(name.as_deref()),
            name,
            label,
            polygons: self.polygons,
            bbox,
        })
    }
}

/// Everything one feature contributes to a layer
struct Styled {
    region: Option<Region>,
    markers: Vec<Marker>,
    lines: Vec<Vec<DVec2>>,
}

fn style_feature(feature: &Feature) -> Styled {
    let mut shapes = Shapes::of(feature);
    let (name, label) = feature_names(feature);

    let markers = shapes
        .points
        .drain(..)
        .map(|at| Marker {
            label: label.clone(),
            at,
        })
        .collect();
    let lines = std::mem::take(&mut shapes.lines)
        .into_iter()
        .filter(|line| line.len() >= 2)
        .collect();

    Styled {
        region: shapes.region(name, label),
        markers,
        lines,
    }
}

/// The overlay currently installed on the map (at most one exists)
#[derive(Debug)]
pub struct BorderLayer {
    pub year: Year,
    /// Loader generation that produced this layer
    pub generation: u64,
    pub regions: Vec<Region>,
    pub markers: Vec<Marker>,
    /// Line features, drawn like region outlines
    pub lines: Vec<Vec<DVec2>>,
    grid: FeatureGrid,
}

impl BorderLayer {
    pub fn new(year: Year, generation: u64, regions: Vec<Region>) -> Self {
        let grid = FeatureGrid::build(regions.iter().map(|r| &r.bbox), GRID_CELL_DEGREES);
        Self {
            year,
            generation,
            regions,
            markers: Vec::new(),
            lines: Vec::new(),
            grid,
        }
    }

    /// Parse a response body into a styled layer.
    /// The body is parsed in place, so it is taken mutably. Large years take
    /// hundreds of milliseconds here; call it off the UI thread.
    pub fn parse(year: Year, generation: u64, body: &mut [u8]) -> Result<Self, LoadError> {
        let doc: GeoJson =
            simd_json::serde::from_slice(body).map_err(|e| LoadError::Parse(e.to_string()))?;
        let GeoJson::FeatureCollection(collection) = doc else {
            return Err(LoadError::NotACollection);
        };

        let styled: Vec<Styled> = collection.features.par_iter().map(style_feature).collect();

        let mut regions = Vec::new();
        let mut markers = Vec::new();
        let mut lines = Vec::new();
        for feature in styled {
            regions.extend(feature.region);
            markers.extend(feature.markers);
            lines.extend(feature.lines);
        }

        let mut layer = Self::new(year, generation, regions);
        layer.markers = markers;
        layer.lines = lines;
        Ok(layer)
    }

    /// Topmost region containing (lon, lat); later features draw over earlier ones
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<&Region> {
        let p = DVec2::new(lon, lat);
        self.grid
            .candidates(p)
            .iter()
            .rev()
            .map(|&idx| &self.regions[idx])
            .find(|region| region.contains(p))
    }
}
