use std::fmt;

/// Host that serves one world-borders GeoJSON file per catalog year
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/aourednik/historical-basemaps/master/geojson";

/// A historical year: negative is BC, positive is AD
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(pub i32);

impl Year {
    pub fn is_bc(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.is_bc() {
            format!("{} BC", self.0.unsigned_abs())
        } else {
            format!("{} AD", self.0)
        };
        f.pad(&label)
    }
}

/// Every year the data host has a borders file for, oldest first.
/// Slider positions map 1:1 onto this table.
pub const CATALOG: [Year; 26] = [
    Year(-2000), Year(-1000), Year(-500), Year(-400), Year(-323), Year(-200), Year(-100),
    Year(100), Year(200), Year(300), Year(400), Year(500),
    Year(600), Year(700), Year(800), Year(900), Year(1000),
    Year(1100), Year(1200), Year(1300), Year(1400), Year(1500),
    Year(1600), Year(1700), Year(1800), Year(1900),
];

/// Slider position shown on startup (1400 AD)
pub const DEFAULT_INDEX: usize = 20;

/// Last valid slider position
#[inline(always)]
pub const fn last_index() -> usize {
    CATALOG.len() - 1
}

/// Year at a slider position, if the position exists
#[inline(always)]
pub fn year_at(index: usize) -> Option<Year> {
    CATALOG.get(index).copied()
}

/// Label text for a year: "500 BC", "300 AD"
pub fn format_year(year: Year) -> String {
    year.to_string()
}

/// Remote file for a year's borders.
/// BC files are named by absolute value with a `bc` prefix, AD files by the plain year.
pub fn resource_locator(base: &str, year: Year) -> String {
    let base = base.trim_end_matches('/');
    if year.is_bc() {
        format!("{}/world_bc{}.geojson", base, year.0.unsigned_abs())
    } else {
        format!("{}/world_{}.geojson", base, year.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_year() {
        assert_eq!(format_year(Year(-500)), "500 BC");
        assert_eq!(format_year(Year(300)), "300 AD");
        assert_eq!(format_year(Year(-323)), "323 BC");
        assert_eq!(format!("{:>8}", Year(900)), "  900 AD");
    }

    #[test]
    fn test_resource_locator_bc() {
        let url = resource_locator(DEFAULT_DATA_URL, Year(-400));
        assert!(url.ends_with("world_bc400.geojson"));
        assert!(url.starts_with(DEFAULT_DATA_URL));
    }

    #[test]
    fn test_resource_locator_ad() {
        let url = resource_locator(DEFAULT_DATA_URL, Year(900));
        assert!(url.ends_with("/world_900.geojson"));
    }

    #[test]
    fn test_resource_locator_trailing_slash() {
        assert_eq!(
            resource_locator("http://localhost:8000/", Year(-2000)),
            "http://localhost:8000/world_bc2000.geojson"
        );
    }

    #[test]
    fn test_catalog_shape() {
        assert_eq!(CATALOG.len(), 26);
        assert_eq!(last_index(), 25);
        assert_eq!(year_at(DEFAULT_INDEX), Some(Year(1400)));
        assert_eq!(year_at(26), None);
        assert!(CATALOG.windows(2).all(|w| w[0] < w[1]));
    }
}
