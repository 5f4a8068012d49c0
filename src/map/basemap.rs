use crate::braille::BrailleCanvas;
use crate::map::geometry::draw_polyline;
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Where the coastlines came from, shown in the attribution line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseSource {
    NaturalEarth,
    Builtin,
}

impl BaseSource {
    pub fn attribution(self) -> &'static str {
        match self {
            BaseSource::NaturalEarth => "Made with Natural Earth",
            BaseSource::Builtin => "Simplified outline",
        }
    }
}

/// Backdrop under the borders overlay: coastlines only
pub struct BaseMap {
    coastlines: Vec<LineString>,
    pub source: BaseSource,
    pub visible: bool,
}

impl BaseMap {
    pub fn new(source: BaseSource) -> Self {
        Self {
            coastlines: Vec::new(),
            source,
            visible: true,
        }
    }

    pub fn add_coastline(&mut self, line: LineString) {
        if line.len() >= 2 {
            self.coastlines.push(line);
        }
    }

    pub fn has_data(&self) -> bool {
        !self.coastlines.is_empty()
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Draw coastlines onto a canvas sized to the viewport
    pub fn render(&self, canvas: &mut BrailleCanvas, viewport: &Viewport) {
        if !self.visible {
            return;
        }
        for line in &self.coastlines {
            draw_polyline(canvas, viewport, line.iter().copied());
        }
    }
}
