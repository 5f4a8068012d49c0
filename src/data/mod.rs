use crate::map::{BaseMap, BaseSource, LineString};
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Build the base layer: Natural Earth coastlines from `path` if given and
/// readable, otherwise the built-in outline
pub fn load_base_map(path: Option<&Path>) -> BaseMap {
    if let Some(path) = path {
        match load_coastlines(path) {
            Ok(base) if base.has_data() => return base,
            Ok(_) => warn!("no coastlines found in {}", path.display()),
            Err(e) => warn!("failed to load coastlines: {:#}", e),
        }
    }
    builtin_base_map()
}

/// Load coastline GeoJSON from disk
pub fn load_coastlines(path: &Path) -> Result<BaseMap> {
    let mut content = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut content)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut base = BaseMap::new(BaseSource::NaturalEarth);
    process_geojson_lines(&geojson, |line| base.add_coastline(line));
    info!("loaded coastlines from {}", path.display());
    Ok(base)
}

/// Feed every line-like geometry to `add_line`; polygons contribute their exterior ring
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => process_geometry_lines(geometry, &mut add_line),
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add_line(to_line(l))),
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for exterior in polygons.iter().filter_map(|rings| rings.first()) {
                add_line(to_line(exterior));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Coarse continent outlines, enough to orient the borders overlay
const LANDMASSES: &[&[(f64, f64)]] = &[
    // North America
    &[
        (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0), (-125.0, 48.0),
        (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0), (-97.0, 25.0), (-97.0, 28.0),
        (-82.0, 24.0), (-80.0, 25.0), (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0),
        (-67.0, 45.0), (-55.0, 47.0), (-58.0, 55.0), (-64.0, 60.0), (-80.0, 63.0),
        (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0), (-168.0, 65.0),
    ],
    // South America
    &[
        (-80.0, 10.0), (-70.0, 12.0), (-60.0, 8.0), (-50.0, 0.0), (-35.0, -5.0),
        (-39.0, -15.0), (-41.0, -22.0), (-48.0, -26.0), (-58.0, -38.0), (-65.0, -42.0),
        (-68.0, -52.0), (-75.0, -50.0), (-72.0, -30.0), (-70.0, -18.0), (-81.0, -5.0),
        (-80.0, 10.0),
    ],
    // Europe
    &[
        (-9.0, 37.0), (-5.0, 36.0), (0.0, 38.0), (3.0, 43.0), (8.0, 44.0),
        (12.0, 44.0), (18.0, 40.0), (24.0, 37.0), (26.0, 40.0), (29.0, 41.0),
        (40.0, 43.0), (40.0, 55.0), (30.0, 60.0), (25.0, 65.0), (20.0, 70.0),
        (10.0, 71.0), (5.0, 62.0), (8.0, 57.0), (-2.0, 50.0), (-5.0, 48.0),
        (-1.0, 45.0), (-9.0, 43.0), (-9.0, 37.0),
    ],
    // Africa
    &[
        (-17.0, 21.0), (-16.0, 12.0), (-10.0, 5.0), (5.0, 5.0), (10.0, 2.0),
        (13.0, -10.0), (15.0, -27.0), (20.0, -35.0), (30.0, -31.0), (35.0, -22.0),
        (40.0, -12.0), (42.0, -1.0), (51.0, 11.0), (43.0, 12.0), (35.0, 25.0),
        (32.0, 31.0), (20.0, 31.0), (10.0, 37.0), (-5.0, 36.0), (-10.0, 30.0),
        (-17.0, 21.0),
    ],
    // Asia
    &[
        (29.0, 41.0), (36.0, 36.0), (35.0, 30.0), (43.0, 13.0), (56.0, 22.0),
        (60.0, 25.0), (67.0, 24.0), (73.0, 18.0), (78.0, 8.0), (80.0, 15.0),
        (88.0, 22.0), (94.0, 17.0), (98.0, 8.0), (104.0, 1.0), (109.0, 12.0),
        (108.0, 21.0), (117.0, 23.0), (122.0, 31.0), (119.0, 39.0), (127.0, 40.0),
        (129.0, 35.0), (135.0, 43.0), (141.0, 52.0), (156.0, 57.0), (170.0, 65.0),
        (180.0, 68.0), (140.0, 73.0), (110.0, 77.0), (70.0, 73.0), (60.0, 69.0),
        (40.0, 67.0), (40.0, 55.0),
    ],
    // Australia
    &[
        (114.0, -22.0), (122.0, -18.0), (130.0, -12.0), (137.0, -12.0), (142.0, -11.0),
        (146.0, -19.0), (153.0, -26.0), (150.0, -37.0), (141.0, -38.0), (135.0, -34.0),
        (124.0, -33.0), (115.0, -34.0), (114.0, -22.0),
    ],
];

/// Base layer from the built-in outline
pub fn builtin_base_map() -> BaseMap {
    let mut base = BaseMap::new(BaseSource::Builtin);
    for outline in LANDMASSES {
        base.add_coastline(outline.to_vec());
    }
    base
}
