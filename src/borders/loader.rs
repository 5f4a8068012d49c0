use super::{BorderLayer, LoadError, Region};
use crate::years::{resource_locator, Year};
use log::{debug, error, info};

/// A fetch the caller must perform for the loader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub year: Year,
    /// Monotonic token; only the newest one may install a layer
    pub generation: u64,
    pub url: String,
}

/// Result of performing a [`FetchRequest`]: the layer is already parsed
/// and styled, so applying it is cheap
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub layer: Result<BorderLayer, LoadError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading { year: Year, generation: u64 },
}

/// What applying a completion did
#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    Installed { year: Year, regions: usize },
    Failed { year: Year, error: LoadError },
    /// A newer request was issued after this one; nothing changed
    Stale { year: Year },
}

/// Tracks the selected year and swaps the single overlay layer.
///
/// The year pointer moves as soon as a request is issued and is not
/// rolled back if that request fails, so asking for the same year
/// again is a no-op until another year is selected.
pub struct BorderLoader {
    base_url: String,
    current_year: Option<Year>,
    generation: u64,
    state: LoaderState,
    layer: Option<BorderLayer>,
}

impl BorderLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            current_year: None,
            generation: 0,
            state: LoaderState::Idle,
            layer: None,
        }
    }

    pub fn current_year(&self) -> Option<Year> {
        self.current_year
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Whether the loading indicator should be shown
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoaderState::Loading { .. })
    }

    pub fn layer(&self) -> Option<&BorderLayer> {
        self.layer.as_ref()
    }

    /// Select `year`. Returns the fetch to perform, or `None` when `year` is
    /// already the tracked year (including while its fetch is in flight).
    pub fn request(&mut self, year: Year) -> Option<FetchRequest> {
        if self.current_year == Some(year) {
            return None;
        }

        self.current_year = Some(year);
        self.layer = None;
        self.generation += 1;
        self.state = LoaderState::Loading {
            year,
            generation: self.generation,
        };

        let url = resource_locator(&self.base_url, year);
        info!("loading borders for {} from {}", year, url);
        Some(FetchRequest {
            year,
            generation: self.generation,
            url,
        })
    }

    /// Apply a finished fetch
    pub fn complete(&mut self, outcome: FetchOutcome) -> Completion {
        let FetchRequest {
            year, generation, ..
        } = outcome.request;

        if generation != self.generation {
            debug!(
                "dropping stale borders for {} (generation {}, newest {})",
                year, generation, self.generation
            );
            return Completion::Stale { year };
        }

        // Clear again before installing so two layers never coexist
        self.layer = None;
        self.state = LoaderState::Idle;

        match outcome.layer {
            Ok(layer) => {
                let regions = layer.regions.len();
                info!("installed {} regions for {}", regions, year);
                self.layer = Some(layer);
                Completion::Installed { year, regions }
            }
            Err(e) => {
                error!("failed to load borders for {}: {}", year, e);
                Completion::Failed { year, error: e }
            }
        }
    }

    /// Region under a geographic point in the installed layer
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<&Region> {
        self.layer.as_ref()?.region_at(lon, lat)
    }
}
