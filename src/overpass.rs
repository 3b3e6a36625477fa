//! Point-of-interest lookup against the Overpass map data service.
//!
//! The engine only needs `{id, lat, lng, name, category, tags}` per
//! feature. Ways and relations are reduced to the mean of their member
//! coordinates.

use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::location::{LocationId, Tags};
use crate::POI_CATEGORIES;

/// Public Overpass interpreter endpoint.
pub const OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Failures raised while fetching points of interest.
#[derive(Debug, Error)]
pub enum PoiError {
    /// The request could not be sent or its body not read.
    #[error("point-of-interest request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("point-of-interest service answered with HTTP {0}")]
    Status(u16),
    /// The body was not an Overpass JSON response.
    #[error("point-of-interest response was malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A named geographic feature returned by the map data service.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiFeature {
    /// Source element id.
    pub id: LocationId,
    /// Node position, or the centre of a way or relation.
    pub point: GeoPoint,
    /// The `name` tag, or `"Unnamed"`.
    pub name: String,
    /// The `amenity` tag, or `"unknown"`.
    pub category: String,
    /// All tags of the element.
    pub tags: Tags,
}

/// Source of points of interest around a coordinate.
pub trait PoiSource {
    /// Fetches features around `origin`.
    ///
    /// # Errors
    /// Returns [`PoiError`] when the service cannot be reached or answers
    /// with something unreadable.
    fn fetch(&self, origin: GeoPoint) -> Result<Vec<PoiFeature>, PoiError>;
}

/// Builds the Overpass QL query for `categories` within `outer_radius_m`
/// metres of `origin`.
///
/// # Examples
/// ```
/// use voices::geo::GeoPoint;
/// use voices::overpass::build_query;
/// let q = build_query(GeoPoint::new(1.5, 2.5), 2000.0, &["cafe"]);
/// assert!(q.contains(r#"nwr["amenity"="cafe"](around:2000,1.5,2.5);"#));
/// assert!(q.starts_with("[out:json][timeout:25];"));
/// ```
#[must_use]
pub fn build_query(origin: GeoPoint, outer_radius_m: f64, categories: &[&str]) -> String {
    let clauses: String = categories
        .iter()
        .map(|category| {
            format!(
                "nwr[\"amenity\"=\"{category}\"](around:{outer_radius_m},{},{});",
                origin.lat, origin.lng
            )
        })
        .collect();
    format!("[out:json][timeout:25];({clauses});out geom;")
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
struct RawCoord {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawMember {
    #[serde(rename = "type")]
    kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    geometry: Vec<RawCoord>,
    #[serde(default)]
    members: Vec<RawMember>,
    #[serde(default)]
    tags: Tags,
}

fn mean_point(points: impl Iterator<Item = (f64, f64)>) -> Option<GeoPoint> {
    let (count, lat_sum, lng_sum) = points.fold((0_u32, 0.0, 0.0), |(n, lat, lng), (a, b)| {
        (n + 1, lat + a, lng + b)
    });
    (count > 0).then(|| {
        let n = f64::from(count);
        GeoPoint::new(lat_sum / n, lng_sum / n)
    })
}

impl RawElement {
    fn point(&self) -> Option<GeoPoint> {
        let point = match self.kind.as_str() {
            "node" => self.lat.zip(self.lon).map(|(lat, lng)| GeoPoint::new(lat, lng)),
            "way" => mean_point(self.geometry.iter().map(|c| (c.lat, c.lon))),
            "relation" => mean_point(
                self.members
                    .iter()
                    .filter(|m| m.kind == "node")
                    .filter_map(|m| m.lat.zip(m.lon)),
            ),
            _ => None,
        }?;
        (point.lat.is_finite() && point.lng.is_finite()).then_some(point)
    }

    fn into_feature(self) -> Option<PoiFeature> {
        let point = self.point()?;
        let name = self
            .tags
            .get("name")
            .cloned()
            .unwrap_or_else(|| "Unnamed".to_owned());
        let category = self
            .tags
            .get("amenity")
            .cloned()
            .unwrap_or_else(|| "unknown".to_owned());
        Some(PoiFeature {
            id: LocationId(self.id),
            point,
            name,
            category,
            tags: self.tags,
        })
    }
}

/// Decodes an Overpass JSON response, dropping elements without usable
/// coordinates.
///
/// # Errors
/// Returns [`PoiError::Decode`] when `body` is not an Overpass response.
pub fn parse_elements(body: &str) -> Result<Vec<PoiFeature>, PoiError> {
    let response: RawResponse = serde_json::from_str(body)?;
    let total = response.elements.len();
    let features: Vec<_> = response
        .elements
        .into_iter()
        .filter_map(RawElement::into_feature)
        .collect();
    debug!("decoded {} of {total} point-of-interest elements", features.len());
    Ok(features)
}

/// Keeps features whose distance from `origin` lies within
/// `inner_m..=outer_m` metres.
#[must_use]
pub fn filter_band(
    origin: GeoPoint,
    features: Vec<PoiFeature>,
    inner_m: f64,
    outer_m: f64,
) -> Vec<PoiFeature> {
    features
        .into_iter()
        .filter(|feature| {
            let metres = origin.distance_km(feature.point) * 1000.0;
            (inner_m..=outer_m).contains(&metres)
        })
        .collect()
}

/// Blocking HTTP client for the Overpass interpreter.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    outer_radius_m: f64,
    categories: Vec<String>,
}

impl OverpassClient {
    /// Client for the public endpoint querying the default categories.
    ///
    /// # Errors
    /// Returns [`PoiError::Http`] when the HTTP client cannot be built.
    pub fn new(outer_radius_m: f64) -> Result<Self, PoiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            endpoint: OVERPASS_ENDPOINT.to_owned(),
            outer_radius_m,
            categories: POI_CATEGORIES.iter().map(|&c| c.to_owned()).collect(),
        })
    }

    /// Queries another interpreter, such as a mirror.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replaces the requested amenity categories.
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }
}

impl PoiSource for OverpassClient {
    fn fetch(&self, origin: GeoPoint) -> Result<Vec<PoiFeature>, PoiError> {
        let categories: Vec<&str> = self.categories.iter().map(String::as_str).collect();
        let query = build_query(origin, self.outer_radius_m, &categories);
        info!(
            "querying points of interest around {:.4},{:.4}",
            origin.lat, origin.lng
        );
        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PoiError::Status(status.as_u16()));
        }
        parse_elements(&response.text()?)
    }
}
