//! Plain-text rendering of a report.

use std::fmt;

use aqi_core::{AirQualityReport, Pollutant, model::Measurement};

/// A report together with the forecasts to print.
pub struct ReportView<'a> {
    pub report: &'a AirQualityReport,
    pub pollutants: &'a [Pollutant],
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let reading = &report.reading;

        writeln!(f, "{} ({})", report.city_label(), report.coordinate)?;
        if let Some(station) = report.station_name() {
            writeln!(f, "Station: {station}")?;
        }
        writeln!(
            f,
            "AQI: {} - {} (dominant: {})",
            reading.aqi,
            report.level.description(),
            reading.dominant_pollutant
        )?;
        writeln!(f, "Observed: {} {}", reading.time.local, reading.time.timezone)?;

        let iaqi = &reading.iaqi;
        let values = [
            ("PM2.5", iaqi.pm25),
            ("Temperature", iaqi.temperature),
            ("Humidity", iaqi.humidity),
            ("Pressure", iaqi.pressure),
            ("Wind", iaqi.wind),
            ("Wind gust", iaqi.wind_gust),
        ];
        for (label, value) in values {
            if let Some(Measurement { v }) = value {
                writeln!(f, "  {label:<12} {v}")?;
            }
        }

        for pollutant in self.pollutants {
            let entries = report.forecast.entries(*pollutant);
            let sent = reading.forecast.daily.entries(*pollutant).len();
            writeln!(
                f,
                "\n{pollutant} ({}) forecast, {} of {sent} days in range:",
                pollutant.as_str(),
                entries.len()
            )?;
            for e in entries {
                writeln!(
                    f,
                    "  {:<10} {:<15} avg {:>3}  max {:>3}  min {:>3}",
                    e.weekday, e.day, e.average, e.max, e.min
                )?;
            }
        }

        Ok(())
    }
}
