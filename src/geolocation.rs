//! Player position fixes and the tracking switch.
//!
//! The host device delivers fixes on its own cadence. Proximity evaluation
//! runs only while tracking is on and a fix is available.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoPoint;

/// A position report from the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Reported accuracy radius in metres, when the device provides one.
    #[serde(default)]
    pub accuracy_m: Option<f64>,
}

impl PositionFix {
    /// A fix without an accuracy estimate.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            accuracy_m: None,
        }
    }

    /// The fix as a map coordinate.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Why no position is available. Each kind maps to its own user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The user refused location access.
    #[error("Could not get your location. Location access was denied. Please enable location permissions in your browser settings.")]
    PermissionDenied,
    /// The device could not determine a position.
    #[error("Could not get your location. Location information is unavailable.")]
    PositionUnavailable,
    /// No position arrived in time.
    #[error("Could not get your location. Location request timed out.")]
    Timeout,
    /// The device has no position service at all.
    #[error("Geolocation is not supported by this device.")]
    Unsupported,
}

impl GeolocationError {
    /// Classifies a W3C geolocation error code.
    ///
    /// Codes other than 1–3 are treated as an unavailable position.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}

/// Gate between the device position watch and the proximity engine.
#[derive(Debug, Default, Clone)]
pub struct PositionTracker {
    tracking: bool,
    last_fix: Option<PositionFix>,
    last_error: Option<GeolocationError>,
}

impl PositionTracker {
    /// A stopped tracker with no fix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts accepting updates.
    pub fn start(&mut self) {
        debug!("position tracking started");
        self.tracking = true;
    }

    /// Stops delivering fixes. Updates pushed afterwards are dropped.
    pub fn stop(&mut self) {
        debug!("position tracking stopped");
        self.tracking = false;
    }

    /// Whether updates are currently accepted.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// The most recent usable fix, cleared by a later error.
    #[must_use]
    pub const fn last_fix(&self) -> Option<PositionFix> {
        self.last_fix
    }

    /// The most recent failure, for the user-facing message.
    #[must_use]
    pub const fn last_error(&self) -> Option<GeolocationError> {
        self.last_error
    }

    /// Records an update from the device and returns the fix that should
    /// be evaluated, if any.
    pub fn push(&mut self, update: Result<PositionFix, GeolocationError>) -> Option<PositionFix> {
        if !self.tracking {
            return None;
        }
        match update {
            Ok(fix) if fix.lat.is_finite() && fix.lng.is_finite() => {
                self.last_fix = Some(fix);
                self.last_error = None;
                Some(fix)
            }
            Ok(_) => {
                warn!("ignoring non-finite position fix");
                None
            }
            Err(e) => {
                warn!("position unavailable: {e}");
                self.last_fix = None;
                self.last_error = Some(e);
                None
            }
        }
    }
}
