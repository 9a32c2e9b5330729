//! Element types with no built-in provider, used to exercise the
//! registration, synthesis and conversion paths.

use num_traits::{NumCast, ToPrimitive};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Dual number for forward-mode differentiation.
/// val: real part
/// eps: infinitesimal part
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Dual {
    pub val: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(val: f64, eps: f64) -> Self {
        Self { val, eps }
    }

    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.0)
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.val + rhs.val, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.val - rhs.val, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.val * rhs.val, self.val * rhs.eps + self.eps * rhs.val)
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let denom = rhs.val * rhs.val;
        Self::new(
            self.val / rhs.val,
            (self.eps * rhs.val - self.val * rhs.eps) / denom,
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.val, -self.eps)
    }
}

// Readback drops the infinitesimal part.
impl ToPrimitive for Dual {
    fn to_i64(&self) -> Option<i64> {
        self.val.to_i64()
    }
    fn to_u64(&self) -> Option<u64> {
        self.val.to_u64()
    }
    fn to_f64(&self) -> Option<f64> {
        Some(self.val)
    }
}

impl NumCast for Dual {
    fn from<N: ToPrimitive>(n: N) -> Option<Self> {
        n.to_f64().map(Self::constant)
    }
}

/// A length in whole meters. Division truncates like `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Meters(pub i64);

impl Add for Meters {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Meters(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Meters(self.0 - rhs.0)
    }
}

impl Mul for Meters {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Meters(self.0 * rhs.0)
    }
}

impl Div for Meters {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Meters(self.0 / rhs.0)
    }
}

impl Rem for Meters {
    type Output = Self;
    fn rem(self, rhs: Self) -> Self {
        Meters(self.0 % rhs.0)
    }
}

impl Neg for Meters {
    type Output = Self;
    fn neg(self) -> Self {
        Meters(-self.0)
    }
}

impl ToPrimitive for Meters {
    fn to_i64(&self) -> Option<i64> {
        Some(self.0)
    }
    fn to_u64(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }
}

impl NumCast for Meters {
    fn from<N: ToPrimitive>(n: N) -> Option<Self> {
        n.to_i64().map(Meters)
    }
}

impl From<bool> for Meters {
    fn from(flag: bool) -> Self {
        Meters(flag.into())
    }
}

/// Carries no arithmetic at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque(pub String);
