use crate::borders::{BorderLoader, Completion, FetchWorker, Region};
use crate::config::Config;
use crate::map::{marker_cell, BaseMap, FillCache, Viewport};
use crate::playback::{Playback, Toggle};
use crate::slider::{Slider, Track};
use crate::years::Year;
use std::time::Instant;

/// Rows below the map: timeline track and status line
pub const TIMELINE_ROWS: u16 = 2;

/// Application state; every event handler works on this
pub struct App {
    pub viewport: Viewport,
    pub base_map: BaseMap,
    pub slider: Slider,
    pub loader: BorderLoader,
    pub playback: Playback,
    pub fills: FillCache,
    pub show_landing: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for the hover label
    pub mouse_pos: Option<(u16, u16)>,
    fetcher: FetchWorker,
    term_width: u16,
    term_height: u16,
}

/// Map area in character cells for a terminal size (border and timeline removed)
fn map_cells(width: usize, height: usize) -> (usize, usize) {
    (
        width.saturating_sub(2),
        height.saturating_sub(2 + TIMELINE_ROWS as usize),
    )
}

/// Terminal cell to Braille pixel inside the map border
#[inline(always)]
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    ((col.saturating_sub(1) as i32) * 2, (row.saturating_sub(1) as i32) * 4)
}

impl App {
    pub fn new(width: usize, height: usize, config: &Config, base_map: BaseMap, fetcher: FetchWorker) -> Self {
        // Braille gives 2x4 resolution per character
        let (cols, rows) = map_cells(width, height);

        Self {
            viewport: Viewport::historical(cols * 2, rows * 4),
            base_map,
            slider: Slider::new(config.start_index),
            loader: BorderLoader::new(config.data_url.clone()),
            playback: Playback::new(config.interval()),
            fills: FillCache::default(),
            show_landing: !config.no_landing,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            fetcher,
            term_width: width as u16,
            term_height: height as u16,
        }
    }

    /// Load the year the slider starts on
    pub fn start(&mut self) {
        self.load_year(self.slider.year());
    }

    /// Ask the loader for `year` and dispatch the fetch if one is needed
    fn load_year(&mut self, year: Year) {
        if let Some(request) = self.loader.request(year) {
            self.fetcher.submit(request);
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let (cols, rows) = map_cells(width, height);
        self.viewport.width = cols * 2;
        self.viewport.height = rows * 4;
        self.term_width = width as u16;
        self.term_height = height as u16;
    }

    /// Timeline track layout for the current terminal width
    pub fn track(&self) -> Track {
        Track::fit(self.term_width)
    }

    /// Map size in character cells
    pub fn map_size(&self) -> (usize, usize) {
        (self.viewport.width / 2, self.viewport.height / 4)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn dismiss_landing(&mut self) {
        self.show_landing = false;
    }

    /// Move the slider to `index` (user input) and load that year
    pub fn select_index(&mut self, index: usize) {
        if self.slider.set(index) {
            self.load_year(self.slider.year());
        }
    }

    /// Step the slider by `delta` (user input) and load that year
    pub fn step_year(&mut self, delta: i32) {
        if self.slider.step(delta) {
            self.load_year(self.slider.year());
        }
    }

    pub fn first_year(&mut self) {
        self.select_index(0);
    }

    pub fn last_year(&mut self) {
        self.select_index(usize::MAX);
    }

    /// Play/pause button
    pub fn toggle_playback(&mut self, now: Instant) {
        if let Toggle::Started { rewound: Some(year) } = self.playback.toggle(&mut self.slider, now) {
            self.load_year(year);
        }
    }

    /// Per-frame housekeeping: fire the playback timer and apply finished fetches
    pub fn tick(&mut self, now: Instant) -> Vec<Completion> {
        if let Some(year) = self.playback.poll(&mut self.slider, now) {
            self.load_year(year);
        }

        let mut completions = Vec::new();
        while let Some(outcome) = self.fetcher.try_recv() {
            completions.push(self.loader.complete(outcome));
        }
        completions
    }

    /// Recompute cell fills if the view or layer changed
    pub fn refresh_fills(&mut self) {
        let (cols, rows) = self.map_size();
        self.fills.refresh(self.loader.layer(), &self.viewport, cols, rows);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    pub fn reset_view(&mut self) {
        self.viewport = Viewport::historical(self.viewport.width, self.viewport.height);
    }

    /// Left click: on the timeline track it moves the slider, on the map it starts a drag
    pub fn click(&mut self, col: u16, row: u16) {
        if row == self.term_height.saturating_sub(TIMELINE_ROWS) {
            if let Some(index) = self.track().index_at_column(col) {
                self.select_index(index);
            }
            return;
        }
        self.last_mouse = Some((col, row));
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
            self.last_mouse = Some((x, y));
        }
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Map cell (inside the border) under the mouse cursor
    fn hovered_cell(&self) -> Option<(u16, u16)> {
        let (col, row) = self.mouse_pos?;
        let (cols, rows) = self.map_size();
        if col == 0 || row == 0 || col as usize > cols || row as usize > rows {
            return None;
        }
        Some((col - 1, row - 1))
    }

    /// Region under the mouse cursor, if the cursor is over the map
    pub fn hovered_region(&self) -> Option<&Region> {
        let (col, row) = self.hovered_cell()?;
        let (lon, lat) = self.viewport.cell_center(col as usize, row as usize);
        self.loader.region_at(lon, lat)
    }

    /// Tooltip text under the cursor: a point marker's name wins over the
    /// region it sits in
    pub fn hovered_label(&self) -> Option<&str> {
        let (col, row) = self.hovered_cell()?;
        let cell = (col as i32, row as i32);
        let marker = self.loader.layer().and_then(|layer| {
            layer
                .markers
                .iter()
                .rev()
                .find(|m| m.label.is_some() && marker_cell(m, &self.viewport) == cell)
        });
        match marker {
            Some(marker) => marker.label.as_deref(),
            None => self.hovered_region()?.label.as_deref(),
        }
    }

    /// Current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}
