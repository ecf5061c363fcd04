//! Small fixed-size vector types
//!
//! `Vec2` carries a stick sample through calibration and filtering;
//! `Vector6` is the 6-DoF command the flight controller consumes. Both are
//! plain `Copy` structs of `f32` with the handful of operations the layers
//! need. Square roots go through `libm` so results are identical with and
//! without `std`.

use core::ops::{Add, Mul, Neg, Sub};

/// Two-axis stick sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// Horizontal axis
    pub x: f32,
    /// Vertical axis
    pub y: f32,
}

impl Vec2 {
    /// Origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create from components
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length
    #[inline]
    pub fn magnitude(self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y)
    }

    /// Component-wise absolute value
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(libm::fabsf(self.x), libm::fabsf(self.y))
    }

    /// Component-wise product
    #[inline]
    pub fn hadamard(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Clamp each component to `[min, max]`
    #[inline]
    pub fn clamp(self, min: f32, max: f32) -> Self {
        Self::new(self.x.clamp(min, max), self.y.clamp(min, max))
    }

    /// Both components finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Six-degree-of-freedom control command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector6 {
    /// Rotation about the lateral axis
    pub pitch: f32,
    /// Rotation about the vertical axis
    pub yaw: f32,
    /// Rotation about the longitudinal axis
    pub roll: f32,
    /// Lateral translation
    pub strafe_x: f32,
    /// Vertical translation
    pub strafe_y: f32,
    /// Forward/backward translation
    pub throttle: f32,
}

impl Vector6 {
    /// Number of components
    pub const AXES: usize = 6;

    /// All components zero
    pub const ZERO: Self = Self::splat(0.0);

    /// All components set to `value`
    pub const fn splat(value: f32) -> Self {
        Self {
            pitch: value,
            yaw: value,
            roll: value,
            strafe_x: value,
            strafe_y: value,
            throttle: value,
        }
    }

    /// Build from `[pitch, yaw, roll, strafe_x, strafe_y, throttle]`
    pub const fn from_array(v: [f32; 6]) -> Self {
        Self {
            pitch: v[0],
            yaw: v[1],
            roll: v[2],
            strafe_x: v[3],
            strafe_y: v[4],
            throttle: v[5],
        }
    }

    /// Components in `[pitch, yaw, roll, strafe_x, strafe_y, throttle]` order
    pub const fn to_array(self) -> [f32; 6] {
        [self.pitch, self.yaw, self.roll, self.strafe_x, self.strafe_y, self.throttle]
    }

    /// Apply `f` to every component
    #[inline]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        let mut v = self.to_array();
        for c in v.iter_mut() {
            *c = f(*c);
        }
        Self::from_array(v)
    }

    /// Combine two vectors component by component
    #[inline]
    pub fn zip_map(self, other: Self, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        let a = self.to_array();
        let b = other.to_array();
        let mut out = [0.0; 6];
        for i in 0..Self::AXES {
            out[i] = f(a[i], b[i]);
        }
        Self::from_array(out)
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        let a = self.to_array();
        let b = other.to_array();
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    /// Euclidean length
    #[inline]
    pub fn length(self) -> f32 {
        libm::sqrtf(self.dot(self))
    }

    /// Clamp each component to `[min, max]`
    #[inline]
    pub fn clamp(self, min: f32, max: f32) -> Self {
        self.map(|c| c.clamp(min, max))
    }

    /// Largest absolute component
    #[inline]
    pub fn max_abs(self) -> f32 {
        self.to_array().iter().fold(0.0f32, |m, c| m.max(libm::fabsf(*c)))
    }

    /// All components finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }
}

impl Add for Vector6 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.zip_map(rhs, |a, b| a + b)
    }
}

impl Sub for Vector6 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.zip_map(rhs, |a, b| a - b)
    }
}

impl Mul<f32> for Vector6 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        self.map(|c| c * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_ops() {
        let a = Vec2::new(3.0, 4.0);
        assert_eq!(a.magnitude(), 5.0);
        assert_eq!(a - Vec2::new(1.0, 1.0), Vec2::new(2.0, 3.0));
        assert_eq!(a * 2.0, Vec2::new(6.0, 8.0));
        assert_eq!((-a).abs(), a);
        assert_eq!(Vec2::new(2.0, -3.0).clamp(-1.0, 1.0), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn vector6_array_order() {
        let v = Vector6::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(v.pitch, 1.0);
        assert_eq!(v.throttle, 6.0);
        assert_eq!(v.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn vector6_algebra() {
        let a = Vector6::splat(1.0);
        let b = Vector6::splat(2.0);
        assert_eq!(a.dot(b), 12.0);
        assert_eq!((b - a), a);
        assert_eq!((a + a), b);
        assert_eq!(a * 3.0, Vector6::splat(3.0));
        assert!((Vector6::splat(1.0).length() - 6.0f32.sqrt()).abs() < 1e-6);
        assert_eq!(Vector6::splat(-4.0).clamp(-1.0, 1.0), Vector6::splat(-1.0));
        assert_eq!(Vector6::from_array([0.0, -3.0, 1.0, 0.0, 0.0, 2.0]).max_abs(), 3.0);
    }
}
