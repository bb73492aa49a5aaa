//! The fetch workflow: location, request, decode, normalize, publish.
//!
//! Each fetch takes a generation number when it starts. A finished fetch only
//! replaces the displayed report if no newer fetch has started since, so a
//! slow request can't overwrite a fresher one.

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    client::AirQualitySource,
    error::FetchError,
    forecast::NormalizedForecast,
    location::LocationProvider,
    model::{AirQualityReading, AqiLevel, Coordinate},
};

/// Display-ready result of one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReport {
    pub coordinate: Coordinate,
    pub reading: AirQualityReading,
    pub forecast: NormalizedForecast,
    pub level: AqiLevel,
    /// Reference date the forecast window was built around.
    pub reference_date: NaiveDate,
}

impl AirQualityReport {
    pub fn new(coordinate: Coordinate, reading: AirQualityReading, reference_date: NaiveDate) -> Self {
        Self {
            coordinate,
            forecast: reading.forecast.daily.normalize(reference_date),
            level: AqiLevel::from_aqi(reading.aqi),
            reading,
            reference_date,
        }
    }

    /// `"{city name} {location}"`.
    pub fn city_label(&self) -> String {
        let city = &self.reading.city;
        format!("{} {}", city.name, city.location).trim().to_string()
    }

    /// Name of the first attributed station, if any.
    pub fn station_name(&self) -> Option<&str> {
        self.reading.attributions.first().map(|a| a.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The report is now the displayed one.
    Published(AirQualityReport),
    /// A newer fetch started while this one ran; the report was discarded.
    Superseded { generation: u64 },
}

#[derive(Debug)]
pub struct AirQualityService {
    source: Arc<dyn AirQualitySource>,
    locator: Arc<dyn LocationProvider>,
    generation: AtomicU64,
    current: RwLock<Option<AirQualityReport>>,
}

impl AirQualityService {
    pub fn new(source: Arc<dyn AirQualitySource>, locator: Arc<dyn LocationProvider>) -> Self {
        Self {
            source,
            locator,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Currently displayed report.
    pub fn current(&self) -> Option<AirQualityReport> {
        self.current.read().clone()
    }

    /// Locate, then fetch. `Ok(None)` when no location is available; no request is made then.
    pub async fn refresh(&self) -> Result<Option<FetchOutcome>, FetchError> {
        let Some(coordinate) = self.locator.request_location().await else {
            info!("no location available; skipping air-quality fetch");
            return Ok(None);
        };

        self.fetch_for(coordinate).await.map(Some)
    }

    /// Fetch for an explicit coordinate, normalizing around today's local date.
    pub async fn fetch_for(&self, coordinate: Coordinate) -> Result<FetchOutcome, FetchError> {
        self.fetch_for_date(coordinate, Local::now().date_naive()).await
    }

    pub async fn fetch_for_date(
        &self,
        coordinate: Coordinate,
        reference_date: NaiveDate,
    ) -> Result<FetchOutcome, FetchError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let coordinate = coordinate.rounded();
        debug!(generation, %coordinate, "starting air-quality fetch");

        let reading = self.source.fetch(coordinate).await?;
        let report = AirQualityReport::new(coordinate, reading, reference_date);

        Ok(self.publish(generation, report))
    }

    /// Run [`Self::fetch_for`] on the runtime without blocking the caller.
    pub fn spawn_fetch(
        self: &Arc<Self>,
        coordinate: Coordinate,
    ) -> JoinHandle<Result<FetchOutcome, FetchError>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.fetch_for(coordinate).await })
    }

    /// Run [`Self::refresh`] on the runtime without blocking the caller.
    pub fn spawn_refresh(self: &Arc<Self>) -> JoinHandle<Result<Option<FetchOutcome>, FetchError>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.refresh().await })
    }

    fn publish(&self, generation: u64, report: AirQualityReport) -> FetchOutcome {
        let mut current = self.current.write();

        // Checked under the write lock so two completions can't interleave.
        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest {
            debug!(generation, latest, "discarding superseded air-quality fetch");
            return FetchOutcome::Superseded { generation };
        }

        info!(generation, aqi = report.reading.aqi, city = %report.city_label(), "published air-quality report");
        *current = Some(report.clone());
        FetchOutcome::Published(report)
    }
}
