mod basemap;
mod geometry;
mod overlay;
mod projection;
mod spatial;

pub use basemap::{BaseMap, BaseSource, LineString};
pub use overlay::{draw_markers, draw_outlines, fill_cells, marker_cell, FillCache, FILL_OPACITY};
pub use projection::Viewport;
pub use spatial::{ring_contains, BBox, FeatureGrid};
