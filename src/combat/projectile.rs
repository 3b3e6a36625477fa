//! Thrown projectiles and their ballistics.

use std::time::Duration;

use glam::Vec3;

use super::PresentationMode;
use crate::numeric::count_to_f32;
use crate::vector_math::vec_normalize;
use crate::{
    IMMERSIVE_GRAVITY, IMMERSIVE_THROW_BOOST, PROJECTILE_FLOOR, SCREEN_GRAVITY,
    SCREEN_THROW_BOOST, THROW_FORCE,
};

/// Elevation search range for [`ThrowProfile::aim`], in radians.
const AIM_MIN_ELEVATION: f32 = -1.2;
const AIM_MAX_ELEVATION: f32 = 1.4;
const AIM_STEPS: usize = 104;

/// Identifier unique within one encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u32);

/// A thrown object in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Identity within the encounter.
    pub id: ProjectileId,
    /// Scene position.
    pub position: Vec3,
    /// Units per second.
    pub velocity: Vec3,
    /// Encounter clock reading at launch.
    pub created_at: Duration,
}

impl Projectile {
    /// Semi-implicit Euler step under constant downward `gravity`.
    pub fn integrate(&mut self, gravity: f32, delta_seconds: f32) {
        self.velocity.y += gravity * delta_seconds;
        self.position += self.velocity * delta_seconds;
    }

    /// Whether the projectile fell out of the world without hitting.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.position.y < PROJECTILE_FLOOR
    }
}

/// Ballistic parameters of the current presentation mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowProfile {
    /// Vertical acceleration, negative downwards.
    pub gravity: f32,
    /// Launch speed along the aim direction.
    pub force: f32,
    /// Launch speed added straight up.
    pub upward_boost: f32,
}

impl ThrowProfile {
    /// Ballistics used while the host presents in `mode`.
    #[must_use]
    pub const fn for_mode(mode: PresentationMode) -> Self {
        match mode {
            PresentationMode::Immersive => Self {
                gravity: IMMERSIVE_GRAVITY,
                force: THROW_FORCE,
                upward_boost: IMMERSIVE_THROW_BOOST,
            },
            PresentationMode::Screen => Self {
                gravity: SCREEN_GRAVITY,
                force: THROW_FORCE,
                upward_boost: SCREEN_THROW_BOOST,
            },
        }
    }

    /// Launch velocity for a throw along `forward`.
    #[must_use]
    pub fn launch_velocity(&self, forward: Vec3) -> Vec3 {
        vec_normalize(forward) * self.force + Vec3::Y * self.upward_boost
    }

    /// Forward direction whose throw from `origin` passes through `target`,
    /// ignoring target motion.
    ///
    /// Prefers the flattest arc. Targets out of range get the elevation
    /// that carries the projectile farthest towards them.
    #[must_use]
    pub fn aim(&self, origin: Vec3, target: Vec3) -> Vec3 {
        let offset = target - origin;
        let flat = Vec3::new(offset.x, 0.0, offset.z);
        let reach = flat.length();
        if !offset.is_finite() || reach <= f32::EPSILON {
            return vec_normalize(offset);
        }
        let heading = flat / reach;
        // Height of the arc above the target once it has covered `reach`.
        let clearance = |elevation: f32| {
            let (sin, cos) = elevation.sin_cos();
            let t = reach / (self.force * cos);
            (self.force * sin + self.upward_boost) * t + 0.5 * self.gravity * t * t - offset.y
        };
        let direction = |elevation: f32| {
            let (sin, cos) = elevation.sin_cos();
            heading * cos + Vec3::Y * sin
        };

        let step = (AIM_MAX_ELEVATION - AIM_MIN_ELEVATION) / count_to_f32(AIM_STEPS);
        let mut previous = AIM_MIN_ELEVATION;
        if clearance(previous) >= 0.0 {
            return direction(previous);
        }
        let mut best = (previous, clearance(previous));
        for i in 1..=AIM_STEPS {
            let elevation = AIM_MIN_ELEVATION + step * count_to_f32(i);
            let height = clearance(elevation);
            if height >= 0.0 {
                let (mut below, mut above) = (previous, elevation);
                for _ in 0..24 {
                    let mid = 0.5 * (below + above);
                    if clearance(mid) >= 0.0 {
                        above = mid;
                    } else {
                        below = mid;
                    }
                }
                return direction(above);
            }
            if height > best.1 {
                best = (elevation, height);
            }
            previous = elevation;
        }
        direction(best.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    fn gravity_bends_the_path() {
        let mut projectile = Projectile {
            id: ProjectileId(0),
            position: Vec3::ZERO,
            velocity: Vec3::new(10.0, 0.0, 0.0),
            created_at: Duration::ZERO,
        };
        projectile.integrate(-10.0, 0.1);
        assert_relative_eq!(projectile.velocity.y, -1.0);
        assert_relative_eq!(projectile.position.x, 1.0);
        assert_relative_eq!(projectile.position.y, -0.1);
    }

    #[rstest]
    #[case::immersive(PresentationMode::Immersive, -9.8, 2.0)]
    #[case::screen(PresentationMode::Screen, -15.0, 7.0)]
    fn mode_selects_gravity_and_boost(
        #[case] mode: PresentationMode,
        #[case] gravity: f32,
        #[case] boost: f32,
    ) {
        let profile = ThrowProfile::for_mode(mode);
        assert_relative_eq!(profile.gravity, gravity);
        let velocity = profile.launch_velocity(Vec3::new(0.0, 0.0, -3.0));
        assert_relative_eq!(velocity.z, -10.0);
        assert_relative_eq!(velocity.y, boost);
    }

    #[rstest]
    #[case::immersive(PresentationMode::Immersive)]
    #[case::screen(PresentationMode::Screen)]
    fn aimed_throw_passes_near_the_target(#[case] mode: PresentationMode) {
        let profile = ThrowProfile::for_mode(mode);
        let origin = Vec3::new(0.0, 1.6, 0.0);
        let target = Vec3::new(3.0, 2.0, -6.0);
        let mut projectile = Projectile {
            id: ProjectileId(0),
            position: origin,
            velocity: profile.launch_velocity(profile.aim(origin, target)),
            created_at: Duration::ZERO,
        };
        let closest = (0..240)
            .map(|_| {
                projectile.integrate(profile.gravity, 1.0 / 120.0);
                projectile.position.distance(target)
            })
            .fold(f32::INFINITY, f32::min);
        assert!(closest < 0.5, "closest approach {closest}");
    }

    #[rstest]
    fn out_of_range_targets_get_the_longest_throw() {
        let profile = ThrowProfile::for_mode(PresentationMode::Screen);
        let aim = profile.aim(Vec3::ZERO, Vec3::new(40.0, 0.0, 0.0));
        assert!(aim.x > 0.0);
        let elevation = aim.y.atan2(aim.x);
        assert!((0.3..1.0).contains(&elevation), "elevation {elevation}");
    }
}
