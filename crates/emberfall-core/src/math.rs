//! Rotation and ray helpers.
//!
//! World space is Z-up with +X forward and +Y right. Rotations are expressed as
//! a [`Rotator`] in degrees and converted to a `glam::Quat` for transforms.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch/yaw/roll rotation in degrees.
///
/// - `yaw` turns about +Z (0 faces +X, 90 faces +Y)
/// - `pitch` raises the nose toward +Z
/// - `roll` banks about the forward axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    /// Nose-up angle in degrees.
    pub pitch: f32,
    /// Heading angle in degrees.
    pub yaw: f32,
    /// Bank angle in degrees.
    pub roll: f32,
}

impl Rotator {
    /// The identity rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a rotator from pitch, yaw and roll in degrees.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotation that faces along `direction`, with zero roll.
    ///
    /// A zero vector yields [`Rotator::ZERO`].
    ///
    /// # Example
    ///
    /// ```
    /// use emberfall_core::math::Rotator;
    /// use glam::Vec3;
    ///
    /// let r = Rotator::from_direction(Vec3::new(0.0, 10.0, 0.0));
    /// assert!((r.yaw - 90.0).abs() < 1e-4);
    /// assert_eq!(r.pitch, 0.0);
    /// ```
    #[must_use]
    pub fn from_direction(direction: Vec3) -> Self {
        if direction == Vec3::ZERO {
            return Self::ZERO;
        }
        let horizontal = direction.x.hypot(direction.y);
        Self {
            pitch: direction.z.atan2(horizontal).to_degrees(),
            yaw: direction.y.atan2(direction.x).to_degrees(),
            roll: 0.0,
        }
    }

    /// Converts a quaternion back into pitch/yaw/roll.
    #[must_use]
    pub fn from_quat(rotation: Quat) -> Self {
        let (yaw, pitch, roll) = rotation.to_euler(EulerRot::ZYX);
        Self {
            pitch: -pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }

    /// Converts to a quaternion (yaw, then pitch, then roll).
    #[must_use]
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.yaw.to_radians(),
            -self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// Keeps only the yaw component.
    #[must_use]
    pub const fn yaw_only(self) -> Self {
        Self::new(0.0, self.yaw, 0.0)
    }

    /// Unit vector this rotation faces along.
    #[must_use]
    pub fn forward(self) -> Vec3 {
        self.to_quat() * Vec3::X
    }

    /// Unit vector to the right of [`forward`](Self::forward).
    #[must_use]
    pub fn right(self) -> Vec3 {
        self.to_quat() * Vec3::Y
    }
}

/// A world-space ray cast from the mouse cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorRay {
    /// Ray start (camera position under the cursor).
    pub origin: Vec3,
    /// Normalized ray direction.
    pub direction: Vec3,
}

impl CursorRay {
    /// Creates a ray, normalizing `direction`.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `origin` aimed at `target`.
    #[must_use]
    pub fn toward(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the first intersection with a sphere, if any.
    #[must_use]
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let to_origin = self.origin - center;
        let b = to_origin.dot(self.direction);
        let c = to_origin.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        let far = -b + sqrt_d;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            // Origin inside the sphere
            Some(0.0)
        } else {
            None
        }
    }

    /// Distance to a horizontal plane at height `z`, if the ray descends onto it.
    #[must_use]
    pub fn intersect_ground(&self, z: f32) -> Option<f32> {
        if self.direction.z >= 0.0 {
            return None;
        }
        let t = (z - self.origin.z) / self.direction.z;
        (t >= 0.0).then_some(t)
    }
}
