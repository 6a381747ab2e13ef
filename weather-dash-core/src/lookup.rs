//! Static display tables: weather icons, condition names, compass points,
//! country flags and names.

/// Terminal glyph for an OpenWeatherMap icon code (`"01d"`, `"10n"`, ...).
pub fn icon_glyph(code: &str) -> &'static str {
    match code {
        "01d" => "☀️",
        "01n" => "🌙",
        "02d" => "🌤️",
        "02n" => "☁️",
        "03d" | "03n" | "04d" | "04n" => "☁️",
        "09d" | "09n" => "🌧️",
        "10d" => "🌦️",
        "10n" => "🌧️",
        "11d" | "11n" => "⛈️",
        "13d" | "13n" => "❄️",
        "50d" | "50n" => "🌫️",
        _ => "❔",
    }
}

/// Generic condition name for an icon code.
pub fn icon_description(code: &str) -> &'static str {
    match code.get(..2) {
        Some("01") => "Clear Sky",
        Some("02") => "Few Clouds",
        Some("03") => "Scattered Clouds",
        Some("04") => "Broken Clouds",
        Some("09") => "Shower Rain",
        Some("10") => "Rain",
        Some("11") => "Thunderstorm",
        Some("13") => "Snow",
        Some("50") => "Mist",
        _ => "Unknown",
    }
}

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % COMPASS.len();
    COMPASS[index]
}

/// Country codes that get a flag in suggestion lists.
const FLAGGED: &[&str] = &[
    "IR", "US", "GB", "CA", "AU", "DE", "FR", "IT", "ES", "NL", "BE", "CH", "AT", "SE", "NO", "DK",
    "FI", "PL", "CZ", "SK", "HU", "RO", "BG", "HR", "SI", "RS", "BA", "MK", "AL", "ME", "GR", "TR",
    "CY", "MT", "PT", "LU", "IE", "IS", "LI", "MC", "SM", "VA", "AD", "RU", "UA", "BY", "MD", "LT",
    "LV", "EE", "CN", "JP", "KR", "IN", "PK", "AF", "BD", "LK", "MV", "NP", "BT", "TH", "MY", "SG",
    "ID", "PH", "VN", "KH", "LA", "MM", "BR", "AR", "CL", "PE", "CO", "VE", "UY", "PY", "BO", "EC",
    "MX", "GT", "BZ", "SV", "HN", "NI", "CR", "PA", "CU", "JM", "EG", "SA", "AE", "QA", "BH", "KW",
    "OM", "YE", "JO", "LB", "SY", "IQ", "IL", "PS", "ZA", "NG", "KE", "ET", "MA", "DZ", "TN", "LY",
    "SD", "GH", "CI", "SN", "ML", "BF", "NE", "TD",
];

const GLOBE: &str = "🌍";

/// Flag emoji for a two-letter country code, or a globe when unknown.
pub fn country_flag(code: &str) -> String {
    let code = code.to_ascii_uppercase();
    if !FLAGGED.contains(&code.as_str()) {
        return GLOBE.to_string();
    }
    code.chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

/// English country name for a two-letter code; the code itself when unknown.
pub fn country_name(code: &str) -> &str {
    match code {
        "IR" => "Iran",
        "US" => "United States",
        "GB" => "United Kingdom",
        "CA" => "Canada",
        "AU" => "Australia",
        "DE" => "Germany",
        "FR" => "France",
        "IT" => "Italy",
        "ES" => "Spain",
        "NL" => "Netherlands",
        "BE" => "Belgium",
        "CH" => "Switzerland",
        "AT" => "Austria",
        "SE" => "Sweden",
        "NO" => "Norway",
        "DK" => "Denmark",
        "FI" => "Finland",
        "PL" => "Poland",
        "CZ" => "Czech Republic",
        "SK" => "Slovakia",
        "HU" => "Hungary",
        "RO" => "Romania",
        "BG" => "Bulgaria",
        "HR" => "Croatia",
        "SI" => "Slovenia",
        "RS" => "Serbia",
        "BA" => "Bosnia and Herzegovina",
        "MK" => "North Macedonia",
        "AL" => "Albania",
        "ME" => "Montenegro",
        "GR" => "Greece",
        "TR" => "Turkey",
        "CY" => "Cyprus",
        "MT" => "Malta",
        "PT" => "Portugal",
        "LU" => "Luxembourg",
        "IE" => "Ireland",
        "IS" => "Iceland",
        "RU" => "Russia",
        "UA" => "Ukraine",
        "BY" => "Belarus",
        "MD" => "Moldova",
        "LT" => "Lithuania",
        "LV" => "Latvia",
        "EE" => "Estonia",
        "CN" => "China",
        "JP" => "Japan",
        "KR" => "South Korea",
        "IN" => "India",
        "PK" => "Pakistan",
        "AF" => "Afghanistan",
        "BD" => "Bangladesh",
        "LK" => "Sri Lanka",
        "TH" => "Thailand",
        "MY" => "Malaysia",
        "SG" => "Singapore",
        "ID" => "Indonesia",
        "PH" => "Philippines",
        "VN" => "Vietnam",
        "BR" => "Brazil",
        "AR" => "Argentina",
        "CL" => "Chile",
        "PE" => "Peru",
        "CO" => "Colombia",
        "MX" => "Mexico",
        "EG" => "Egypt",
        "SA" => "Saudi Arabia",
        "AE" => "United Arab Emirates",
        "QA" => "Qatar",
        "BH" => "Bahrain",
        "KW" => "Kuwait",
        "OM" => "Oman",
        "JO" => "Jordan",
        "LB" => "Lebanon",
        "SY" => "Syria",
        "IQ" => "Iraq",
        "IL" => "Israel",
        "ZA" => "South Africa",
        "NG" => "Nigeria",
        "KE" => "Kenya",
        "ET" => "Ethiopia",
        "MA" => "Morocco",
        "DZ" => "Algeria",
        "TN" => "Tunisia",
        "LY" => "Libya",
        other => other,
    }
}
