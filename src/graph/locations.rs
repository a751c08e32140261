//! Static nation and state bounding-box tables
//!
//! Named-location download requests carry ISO-style abbreviations that are
//! resolved here. The boxes are generous outlines, not borders: they only
//! have to cover every grid tile the area touches.

use crate::core::BoundingBox;

const fn bb(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> BoundingBox {
    BoundingBox {
        min_lat,
        min_lon,
        max_lat,
        max_lon,
    }
}

#[rustfmt::skip]
const NATIONS: &[(&str, BoundingBox)] = &[
    ("US", bb(24.5, -125.0, 49.4, -66.9)),
    ("CA", bb(41.7, -141.0, 83.1, -52.6)),
    ("MX", bb(14.5, -118.4, 32.7, -86.7)),
    ("GB", bb(49.9, -8.6, 60.9, 1.8)),
    ("IE", bb(51.4, -10.5, 55.4, -6.0)),
    ("FR", bb(41.3, -5.1, 51.1, 9.6)),
    ("DE", bb(47.3, 5.9, 55.1, 15.0)),
    ("NL", bb(50.8, 3.4, 53.6, 7.2)),
    ("BE", bb(49.5, 2.5, 51.5, 6.4)),
    ("LU", bb(49.4, 5.7, 50.2, 6.5)),
    ("CH", bb(45.8, 6.0, 47.8, 10.5)),
    ("AT", bb(46.4, 9.5, 49.0, 17.2)),
    ("IT", bb(35.5, 6.6, 47.1, 18.5)),
    ("ES", bb(36.0, -9.3, 43.8, 3.3)),
    ("PT", bb(36.9, -9.5, 42.2, -6.2)),
    ("DK", bb(54.6, 8.0, 57.8, 12.7)),
    ("NO", bb(58.0, 4.6, 71.2, 31.1)),
    ("SE", bb(55.3, 11.1, 69.1, 24.2)),
    ("FI", bb(59.8, 20.5, 70.1, 31.6)),
    ("PL", bb(49.0, 14.1, 54.8, 24.2)),
    ("CZ", bb(48.6, 12.1, 51.1, 18.9)),
    ("SK", bb(47.7, 16.8, 49.6, 22.6)),
    ("HU", bb(45.7, 16.1, 48.6, 22.9)),
    ("AU", bb(-43.6, 113.3, -10.7, 153.6)),
    ("NZ", bb(-47.3, 166.4, -34.4, 178.6)),
    ("JP", bb(24.0, 122.9, 45.5, 145.8)),
    ("KR", bb(33.1, 126.1, 38.6, 129.6)),
];

#[rustfmt::skip]
const US_STATES: &[(&str, BoundingBox)] = &[
    ("AL", bb(30.2, -88.5, 35.0, -84.9)),
    ("AK", bb(51.2, -179.1, 71.4, -129.9)),
    ("AZ", bb(31.3, -114.8, 37.0, -109.0)),
    ("AR", bb(33.0, -94.6, 36.5, -89.6)),
    ("CA", bb(32.5, -124.4, 42.0, -114.1)),
    ("CO", bb(37.0, -109.1, 41.0, -102.0)),
    ("CT", bb(40.9, -73.7, 42.1, -71.8)),
    ("DE", bb(38.4, -75.8, 39.8, -75.0)),
    ("DC", bb(38.8, -77.1, 39.0, -76.9)),
    ("FL", bb(24.4, -87.6, 31.0, -80.0)),
    ("GA", bb(30.4, -85.6, 35.0, -80.8)),
    ("HI", bb(18.9, -160.3, 22.2, -154.8)),
    ("ID", bb(42.0, -117.2, 49.0, -111.0)),
    ("IL", bb(36.9, -91.5, 42.5, -87.0)),
    ("IN", bb(37.8, -88.1, 41.8, -84.8)),
    ("IA", bb(40.4, -96.6, 43.5, -90.1)),
    ("KS", bb(37.0, -102.1, 40.0, -94.6)),
    ("KY", bb(36.5, -89.6, 39.1, -81.9)),
    ("LA", bb(28.9, -94.0, 33.0, -88.8)),
    ("ME", bb(43.1, -71.1, 47.5, -66.9)),
    ("MD", bb(37.9, -79.5, 39.7, -75.0)),
    ("MA", bb(41.2, -73.5, 42.9, -69.9)),
    ("MI", bb(41.7, -90.4, 48.3, -82.4)),
    ("MN", bb(43.5, -97.2, 49.4, -89.5)),
    ("MS", bb(30.2, -91.7, 35.0, -88.1)),
    ("MO", bb(36.0, -95.8, 40.6, -89.1)),
    ("MT", bb(44.4, -116.1, 49.0, -104.0)),
    ("NE", bb(40.0, -104.1, 43.0, -95.3)),
    ("NV", bb(35.0, -120.0, 42.0, -114.0)),
    ("NH", bb(42.7, -72.6, 45.3, -70.6)),
    ("NJ", bb(38.9, -75.6, 41.4, -73.9)),
    ("NM", bb(31.3, -109.1, 37.0, -103.0)),
    ("NY", bb(40.5, -79.8, 45.0, -71.9)),
    ("NC", bb(33.8, -84.3, 36.6, -75.5)),
    ("ND", bb(45.9, -104.1, 49.0, -96.6)),
    ("OH", bb(38.4, -84.8, 42.0, -80.5)),
    ("OK", bb(33.6, -103.0, 37.0, -94.4)),
    ("OR", bb(42.0, -124.6, 46.3, -116.5)),
    ("PA", bb(39.7, -80.5, 42.3, -74.7)),
    ("RI", bb(41.1, -71.9, 42.0, -71.1)),
    ("SC", bb(32.0, -83.4, 35.2, -78.5)),
    ("SD", bb(42.5, -104.1, 45.9, -96.4)),
    ("TN", bb(35.0, -90.3, 36.7, -81.6)),
    ("TX", bb(25.8, -106.6, 36.5, -93.5)),
    ("UT", bb(37.0, -114.1, 42.0, -109.0)),
    ("VT", bb(42.7, -73.4, 45.0, -71.5)),
    ("VA", bb(36.5, -83.7, 39.5, -75.2)),
    ("WA", bb(45.5, -124.8, 49.0, -116.9)),
    ("WV", bb(37.2, -82.6, 40.6, -77.7)),
    ("WI", bb(42.5, -92.9, 47.1, -86.8)),
    ("WY", bb(41.0, -111.1, 45.0, -104.1)),
];

/// Bounding box for a nation abbreviation, case-insensitive
pub fn nation_bounds(code: &str) -> Option<BoundingBox> {
    lookup(NATIONS, code)
}

/// Bounding box for a US state abbreviation, case-insensitive
pub fn state_bounds(code: &str) -> Option<BoundingBox> {
    lookup(US_STATES, code)
}

fn lookup(table: &[(&str, BoundingBox)], code: &str) -> Option<BoundingBox> {
    table
        .iter()
        .find(|(abbrev, _)| abbrev.eq_ignore_ascii_case(code))
        .map(|(_, bounds)| *bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(nation_bounds("de").is_some());
        assert!(nation_bounds("DE").is_some());
        assert!(state_bounds("mi").is_some());
        assert!(nation_bounds("ZZ").is_none());
    }

    #[test]
    fn test_boxes_are_well_formed() {
        for (code, bounds) in NATIONS.iter().chain(US_STATES.iter()) {
            assert!(bounds.min_lat < bounds.max_lat, "{code}");
            assert!(bounds.min_lon < bounds.max_lon, "{code}");
        }
    }
}
