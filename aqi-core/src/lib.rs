//! Core library for the `aqi` air-quality tool.
//!
//! This crate defines:
//! - Configuration (API host and token)
//! - The feed client and its failure taxonomy
//! - Decoding of feed responses into typed readings
//! - Forecast windowing for display
//! - One-shot location lookup and the fetch service tying it all together
//!
//! It is used by `aqi-cli`, but a GUI front end can drive [`AirQualityService`]
//! the same way.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod forecast;
pub mod location;
pub mod model;
pub mod service;

pub use client::{AirQualitySource, AqiClient};
pub use config::Config;
pub use decode::decode;
pub use error::FetchError;
pub use forecast::{ForecastDisplay, ForecastWindow, NormalizedForecast, normalize};
pub use location::{
    DeviceLocator, FixReceiver, FixSender, FixedLocation, LocationProvider, LocationSource,
    location_fix,
};
pub use model::{
    AirQualityReading, AqiLevel, Coordinate, ForecastBlock, ForecastDayEntry, Pollutant,
};
pub use service::{AirQualityReport, AirQualityService, FetchOutcome};
