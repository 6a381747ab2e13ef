use crate::geo::GeoPoint;

/// A provincial capital of Iran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capital {
    pub name: &'static str,
    pub province: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u32,
}

/// Population band used to style the capital picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationTier {
    Large,
    Medium,
    Small,
}

impl Capital {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Picker label, e.g. `"Tabriz (East Azerbaijan)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.province)
    }

    /// Name used when fetching weather for this capital.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.province)
    }

    pub fn tier(&self) -> PopulationTier {
        if self.population > 1_000_000 {
            PopulationTier::Large
        } else if self.population > 500_000 {
            PopulationTier::Medium
        } else {
            PopulationTier::Small
        }
    }
}

const fn capital(
    name: &'static str,
    province: &'static str,
    latitude: f64,
    longitude: f64,
    population: u32,
) -> Capital {
    Capital {
        name,
        province,
        latitude,
        longitude,
        population,
    }
}

/// Reference list; order matters for the matcher's tie-break.
pub static CAPITALS: [Capital; 31] = [
    capital("Tehran", "Tehran", 35.6892, 51.3890, 8_694_000),
    capital("Mashhad", "Razavi Khorasan", 36.2605, 59.6168, 3_001_184),
    capital("Isfahan", "Isfahan", 32.6546, 51.6680, 1_961_260),
    capital("Karaj", "Alborz", 35.8327, 50.9916, 1_592_492),
    capital("Shiraz", "Fars", 29.5918, 52.5837, 1_565_572),
    capital("Tabriz", "East Azerbaijan", 38.0662, 46.2919, 1_558_693),
    capital("Qom", "Qom", 34.6401, 50.8764, 1_201_158),
    capital("Kermanshah", "Kermanshah", 34.3142, 47.0650, 946_651),
    capital("Urmia", "West Azerbaijan", 37.5527, 45.0761, 736_224),
    capital("Zahedan", "Sistan and Baluchestan", 29.4963, 60.8629, 694_612),
    capital("Rasht", "Gilan", 37.2808, 49.5832, 679_995),
    capital("Kerman", "Kerman", 30.2839, 57.0834, 515_114),
    capital("Hamadan", "Hamadan", 34.7992, 48.5146, 554_406),
    capital("Arak", "Markazi", 34.0917, 49.7014, 520_944),
    capital("Yazd", "Yazd", 31.8974, 54.3569, 529_673),
    capital("Ardabil", "Ardabil", 38.2498, 48.2933, 529_374),
    capital("Bandar Abbas", "Hormozgan", 27.1865, 56.2808, 526_648),
    capital("Esfahak", "South Khorasan", 32.8749, 59.2183, 240_696),
    capital("Ilam", "Ilam", 33.6374, 46.4227, 193_442),
    capital("Bojnord", "North Khorasan", 37.4747, 57.3290, 178_867),
    capital("Sanandaj", "Kurdistan", 35.3150, 46.9983, 412_767),
    capital("Yasuj", "Kohgiluyeh and Boyer-Ahmad", 30.6682, 51.5880, 134_532),
    capital("Gorgan", "Golestan", 36.8427, 54.4439, 350_676),
    capital("Shahrekord", "Chaharmahal and Bakhtiari", 32.3255, 50.8647, 190_441),
    capital("Bushehr", "Bushehr", 28.9684, 50.8385, 223_504),
    capital("Zanjan", "Zanjan", 36.6736, 48.4787, 430_871),
    capital("Semnan", "Semnan", 35.5769, 53.3923, 185_129),
    capital("Sari", "Mazandaran", 36.5633, 53.0601, 309_820),
    capital("Ahvaz", "Khuzestan", 31.3183, 48.6706, 1_184_788),
    capital("Khorramabad", "Lorestan", 33.4877, 48.3558, 373_416),
    capital("Birjand", "South Khorasan", 32.8749, 59.2183, 203_636),
];

/// Capitals ordered largest population first, for the picker.
pub fn by_population() -> Vec<&'static Capital> {
    let mut sorted: Vec<&'static Capital> = CAPITALS.iter().collect();
    // Stable sort keeps list order among equal populations.
    sorted.sort_by(|a, b| b.population.cmp(&a.population));
    sorted
}

/// Case-insensitive lookup by capital name.
pub fn find(name: &str) -> Option<&'static Capital> {
    let name = name.trim();
    CAPITALS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_is_sorted_by_population_descending() {
        let sorted = by_population();
        assert_eq!(sorted.len(), CAPITALS.len());
        assert_eq!(sorted[0].name, "Tehran");
        assert_eq!(sorted[1].name, "Mashhad");
        assert!(sorted.windows(2).all(|w| w[0].population >= w[1].population));
    }

    #[test]
    fn find_ignores_case_and_whitespace() {
        assert_eq!(find("  bandar abbas ").map(|c| c.province), Some("Hormozgan"));
        assert!(find("Paris").is_none());
    }

    #[test]
    fn tiers_follow_population_bands() {
        assert_eq!(find("Tehran").map(Capital::tier), Some(PopulationTier::Large));
        assert_eq!(find("Urmia").map(Capital::tier), Some(PopulationTier::Medium));
        assert_eq!(find("Ilam").map(Capital::tier), Some(PopulationTier::Small));
    }

    #[test]
    fn label_includes_province() {
        assert_eq!(CAPITALS[5].label(), "Tabriz (East Azerbaijan)");
        assert_eq!(CAPITALS[5].display_name(), "Tabriz, East Azerbaijan");
    }
}
