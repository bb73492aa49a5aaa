use serde::{Deserialize, Serialize};

/// Geographic query location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components rounded to two decimal places, the precision the API matches on.
    pub fn rounded(&self) -> Self {
        Self {
            latitude: round_2dp(self.latitude),
            longitude: round_2dp(self.longitude),
        }
    }

    /// The `geo:{lat};{lng}` path segment used by the feed endpoint.
    pub fn path_segment(&self) -> String {
        let r = self.rounded();
        format!("geo:{:.2};{:.2}", r.latitude, r.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = self.rounded();
        write!(f, "{:.2}, {:.2}", r.latitude, r.longitude)
    }
}

fn round_2dp(v: f64) -> f64 {
    // Adding 0.0 turns -0.0 into 0.0 so "-0.00" never reaches the URL.
    (v * 100.0).round() / 100.0 + 0.0
}

/// Decoded feed for one station.
///
/// Created fresh per fetch and never mutated afterwards; display formatting
/// happens in [`crate::forecast`] and produces separate records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub aqi: i64,
    pub idx: i64,
    #[serde(rename = "dominentpol")]
    pub dominant_pollutant: String,
    pub attributions: Vec<Attribution>,
    pub city: City,
    pub iaqi: InstantValues,
    pub time: ObservationTime,
    pub forecast: Forecast,
    pub debug: DebugInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// `[latitude, longitude]` of the station.
    pub geo: [f64; 2],
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub location: String,
}

/// Instantaneous values. Stations omit sensors they don't have.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstantValues {
    #[serde(rename = "h", default)]
    pub humidity: Option<Measurement>,
    #[serde(rename = "p", default)]
    pub pressure: Option<Measurement>,
    #[serde(default)]
    pub pm25: Option<Measurement>,
    #[serde(rename = "t", default)]
    pub temperature: Option<Measurement>,
    #[serde(rename = "w", default)]
    pub wind: Option<Measurement>,
    #[serde(rename = "wg", default)]
    pub wind_gust: Option<Measurement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationTime {
    /// Local time string, e.g. `"2024-06-05 14:00:00"`.
    #[serde(rename = "s")]
    pub local: String,
    #[serde(rename = "tz")]
    pub timezone: String,
    #[serde(rename = "v")]
    pub epoch: i64,
    pub iso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub daily: ForecastBlock,
}

/// Daily forecasts per pollutant, in the order the API sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBlock {
    pub o3: Vec<ForecastDayEntry>,
    pub pm10: Vec<ForecastDayEntry>,
    pub pm25: Vec<ForecastDayEntry>,
}

impl ForecastBlock {
    pub fn entries(&self, pollutant: Pollutant) -> &[ForecastDayEntry] {
        match pollutant {
            Pollutant::Ozone => &self.o3,
            Pollutant::Pm10 => &self.pm10,
            Pollutant::Pm25 => &self.pm25,
        }
    }
}

/// Raw forecast entry as sent by the API; `day` is `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDayEntry {
    #[serde(rename = "avg")]
    pub average: i64,
    pub day: String,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub sync: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Ozone,
    Pm10,
    Pm25,
}

impl Pollutant {
    /// Key used by the API in the forecast block.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Ozone => "o3",
            Pollutant::Pm10 => "pm10",
            Pollutant::Pm25 => "pm25",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Ozone => "Ozone",
            Pollutant::Pm10 => "PM10",
            Pollutant::Pm25 => "PM2.5",
        }
    }

    pub const fn all() -> &'static [Pollutant] {
        &[Pollutant::Ozone, Pollutant::Pm10, Pollutant::Pm25]
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity band of an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unsafe,
    Unknown,
}

impl AqiLevel {
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151.. => Self::Unsafe,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unsafe => "Unsafe",
            Self::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_rounds_to_two_decimals() {
        let c = Coordinate::new(34.0522, -118.2437);
        assert_eq!(c.path_segment(), "geo:34.05;-118.24");
    }

    #[test]
    fn path_segment_pads_and_drops_negative_zero() {
        assert_eq!(Coordinate::new(10.0, -0.001).path_segment(), "geo:10.00;0.00");
        assert_eq!(Coordinate::new(-0.004, 0.005).rounded().latitude, 0.0);
    }

    #[test]
    fn rounded_keeps_nearest_hundredth() {
        let r = Coordinate::new(51.5074, -0.1278).rounded();
        assert_eq!(r.latitude, 51.51);
        assert_eq!(r.longitude, -0.13);
    }

    #[test]
    fn aqi_level_bands() {
        assert_eq!(AqiLevel::from_aqi(0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_aqi(50), AqiLevel::Good);
        assert_eq!(AqiLevel::from_aqi(51), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_aqi(150), AqiLevel::UnhealthyForSensitiveGroups);
        assert_eq!(AqiLevel::from_aqi(151), AqiLevel::Unsafe);
        assert_eq!(AqiLevel::from_aqi(-1), AqiLevel::Unknown);
    }
}
