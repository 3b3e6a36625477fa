//! Map fixtures positioned relative to an origin.

use std::collections::BTreeMap;

use voices::location::Tags;
use voices::overpass::PoiFeature;
use voices::{BossLocation, GeoPoint, Location, LocationId, SpriteRef};

/// Null Island, the default origin for scenarios.
pub const ORIGIN: GeoPoint = GeoPoint::new(0.0, 0.0);

fn tags(name: &str, category: &str) -> Tags {
    BTreeMap::from([
        ("amenity".to_owned(), category.to_owned()),
        ("name".to_owned(), name.to_owned()),
    ])
}

/// A regular location `metres` away from `origin` along `bearing_deg`.
///
/// # Examples
/// ```
/// use test_utils::{location_at, ORIGIN};
/// let cafe = location_at(7, ORIGIN, 90.0, 20.0);
/// assert!((ORIGIN.distance_km(cafe.point()) - 0.02).abs() < 1e-6);
/// ```
#[must_use]
pub fn location_at(id: i64, origin: GeoPoint, bearing_deg: f64, metres: f64) -> Location {
    let point = origin.destination(bearing_deg, metres);
    let name = format!("Cafe {id}");
    Location {
        id: LocationId(id),
        lat: point.lat,
        lng: point.lng,
        tags: tags(&name, "cafe"),
        name,
        category: "cafe".to_owned(),
        sprite_ref: SpriteRef::face(1),
    }
}

/// A boss location `metres` away from `origin` along `bearing_deg`.
#[must_use]
pub fn boss_at(id: i64, origin: GeoPoint, bearing_deg: f64, metres: f64) -> BossLocation {
    let point = origin.destination(bearing_deg, metres);
    let name = format!("Chapel {id}");
    BossLocation {
        id: LocationId(id),
        lat: point.lat,
        lng: point.lng,
        tags: tags(&name, "place_of_worship"),
        name,
        category: "place_of_worship".to_owned(),
        boss_sprite_ref: SpriteRef::boss(1),
        distance_from_origin: origin.distance_km(point),
    }
}

/// Boss locations due north of `origin`, one per entry of `metres`, with
/// ids starting at 100. The order given is kept; rank them explicitly when
/// the test needs it.
#[must_use]
pub fn boss_ladder(origin: GeoPoint, metres: &[f64]) -> Vec<BossLocation> {
    (100..)
        .zip(metres)
        .map(|(id, &m)| boss_at(id, origin, 0.0, m))
        .collect()
}

/// A raw point-of-interest feature as a source would return it.
#[must_use]
pub fn feature_at(
    id: i64,
    origin: GeoPoint,
    bearing_deg: f64,
    metres: f64,
    category: &str,
) -> PoiFeature {
    let name = format!("{category} {id}");
    PoiFeature {
        id: LocationId(id),
        point: origin.destination(bearing_deg, metres),
        tags: tags(&name, category),
        name,
        category: category.to_owned(),
    }
}
