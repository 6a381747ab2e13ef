//! Device position acquisition.
//!
//! A [`PositionSource`] is whatever can report where this machine is (a GPS
//! receiver, an OS location service, a fixed configured fix). [`DeviceLocator`]
//! wraps one with the request policy: one shot, bounded by a timeout, and
//! answered from a recent cached fix when one is young enough.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{fmt::Debug, time::Duration};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{config::DeviceConfig, geo::GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePosition {
    pub point: GeoPoint,
    pub accuracy_m: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyLevel {
    High,
    Medium,
    Low,
}

impl DevicePosition {
    pub fn accuracy_level(&self) -> AccuracyLevel {
        if self.accuracy_m < 100.0 {
            AccuracyLevel::High
        } else if self.accuracy_m < 1000.0 {
            AccuracyLevel::Medium
        } else {
            AccuracyLevel::Low
        }
    }
}

impl AccuracyLevel {
    pub fn label(&self) -> &'static str {
        match self {
            AccuracyLevel::High => "High accuracy",
            AccuracyLevel::Medium => "Medium accuracy",
            AccuracyLevel::Low => "Low accuracy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Location access denied by user")]
    PermissionDenied,
    #[error("Location information unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Device location is not supported")]
    Unsupported,
}

impl DeviceError {
    pub fn code(&self) -> &'static str {
        match self {
            DeviceError::PermissionDenied => "PERMISSION_DENIED",
            DeviceError::PositionUnavailable => "POSITION_UNAVAILABLE",
            DeviceError::Timeout => "TIMEOUT",
            DeviceError::Unsupported => "UNSUPPORTED",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            DeviceError::PermissionDenied => {
                "Please allow location access in your system settings to use precise GPS location."
            }
            DeviceError::PositionUnavailable => {
                "Your device location is currently unavailable. This might be due to poor GPS signal."
            }
            DeviceError::Timeout => {
                "Location request took too long. Your GPS might be taking time to get a signal."
            }
            DeviceError::Unsupported => "This device does not provide location services.",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            DeviceError::PermissionDenied => {
                "You can still search for locations manually or use the auto-detected IP location."
            }
            DeviceError::PositionUnavailable => {
                "Try moving to an area with better signal or use manual location search."
            }
            DeviceError::Timeout => "Please try again or use manual location search.",
            DeviceError::Unsupported => {
                "Configure a [device] position or search for locations manually."
            }
        }
    }
}

/// Anything that can report the device's position.
#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<DevicePosition, DeviceError>;
}

/// A position fixed in configuration or on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    pub point: GeoPoint,
    pub accuracy_m: f64,
}

impl From<DeviceConfig> for FixedPosition {
    fn from(cfg: DeviceConfig) -> Self {
        Self {
            point: cfg.point(),
            accuracy_m: cfg.accuracy_m,
        }
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<DevicePosition, DeviceError> {
        Ok(DevicePosition {
            point: self.point,
            accuracy_m: self.accuracy_m,
            timestamp: Utc::now(),
        })
    }
}

/// Used when the machine has no way to locate itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

#[async_trait]
impl PositionSource for NoPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<DevicePosition, DeviceError> {
        Err(DeviceError::Unsupported)
    }
}

#[derive(Debug)]
pub struct DeviceLocator {
    source: Box<dyn PositionSource>,
    options: PositionOptions,
    last_fix: Mutex<Option<DevicePosition>>,
}

impl DeviceLocator {
    pub fn new(source: impl PositionSource + 'static) -> Self {
        Self::with_options(source, PositionOptions::default())
    }

    pub fn with_options(source: impl PositionSource + 'static, options: PositionOptions) -> Self {
        Self {
            source: Box::new(source),
            options,
            last_fix: Mutex::new(None),
        }
    }

    /// Locator for a configured device position, or one that reports `Unsupported`.
    pub fn from_config(device: Option<DeviceConfig>) -> Self {
        match device {
            Some(cfg) => Self::new(FixedPosition::from(cfg)),
            None => Self::new(NoPositionSource),
        }
    }

    /// One-shot position request. Failures are not retried.
    pub async fn locate(&self) -> Result<DevicePosition, DeviceError> {
        let mut last_fix = self.last_fix.lock().await;

        if let Some(fix) = *last_fix {
            let age = Utc::now().signed_duration_since(fix.timestamp);
            if age.to_std().is_ok_and(|age| age <= self.options.maximum_age) {
                debug!("Using cached device position ({}s old)", age.num_seconds());
                return Ok(fix);
            }
        }

        let result = tokio::time::timeout(
            self.options.timeout,
            self.source.current_position(&self.options),
        )
        .await
        .unwrap_or(Err(DeviceError::Timeout));

        match result {
            Ok(fix) => {
                info!(
                    "Device position obtained: {} ({} m)",
                    fix.point,
                    fix.accuracy_m.round()
                );
                *last_fix = Some(fix);
                Ok(fix)
            }
            Err(e) => {
                warn!("Device position failed: {} ({})", e, e.code());
                Err(e)
            }
        }
    }
}
