use crate::capability::{Capabilities, Capability};
use crate::convert::Primitive;
use crate::error::{ConversionError, NumericError, Result};
use std::any::type_name;
use std::cmp::Ordering;
use std::fmt::Debug;

/// A type that can be used as the element of a numeric provider.
/// Must be clonable, debug-printable and shareable across threads.
pub trait Scalar: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> Scalar for T {}

/// The capability hierarchy for one closed element type `T`.
///
/// Each layer has a handful of primitive methods whose default is an
/// `Unsupported` error; everything else has a default derived from those
/// primitives. A provider implements the primitives of the layers it
/// declares in [`capabilities`](Self::capabilities) and may override any
/// derived method with a faster direct operation.
///
/// Defaults that could compute an approximation for a type that never
/// claimed the layer (the floating and rounding families, which go through
/// `f64`) check the declared capabilities first.
///
/// The default `from_i32`, `to_i32`, `from_f64` and `to_f64` go through the
/// process-wide conversion bridge ([`crate::try_convert`]). Providers whose
/// type is only known to an isolated [`Registry`](crate::Registry) override
/// them; synthesized providers do. Every other default works from the
/// provider's own methods.
pub trait NumericProvider<T: Scalar>: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Fails with `Unsupported` unless the provider declares `capability`.
    fn require(&self, capability: Capability, operation: &'static str) -> Result<()> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(NumericError::unsupported::<T>(capability, operation))
        }
    }

    // --- Ordering ---

    fn compare(&self, _x: &T, _y: &T) -> Result<Ordering> {
        Err(NumericError::unsupported::<T>(Capability::Ordering, "compare"))
    }

    fn equals(&self, x: &T, y: &T) -> Result<bool> {
        Ok(self.compare(x, y)? == Ordering::Equal)
    }

    fn hash_of(&self, _x: &T) -> Result<u64> {
        Err(NumericError::unsupported::<T>(Capability::Ordering, "hash_of"))
    }

    fn max(&self, x: T, y: T) -> Result<T> {
        Ok(match self.compare(&x, &y)? {
            Ordering::Less => y,
            _ => x,
        })
    }

    fn min(&self, x: T, y: T) -> Result<T> {
        Ok(match self.compare(&x, &y)? {
            Ordering::Greater => y,
            _ => x,
        })
    }

    // --- Enumeration ---

    fn from_i32(&self, n: i32) -> Result<T> {
        self.require(Capability::Enumeration, "from_i32")?;
        Ok(crate::try_convert::<i32, T>(n)?)
    }

    fn to_i32(&self, x: &T) -> Result<i32> {
        self.require(Capability::Enumeration, "to_i32")?;
        Ok(crate::try_convert::<T, i32>(x.clone())?)
    }

    fn successor(&self, x: &T) -> Result<T> {
        let n = self.to_i32(x)?;
        let next = n
            .checked_add(1)
            .ok_or_else(|| NumericError::overflow::<T>("successor"))?;
        self.from_i32(next)
    }

    fn predecessor(&self, x: &T) -> Result<T> {
        let n = self.to_i32(x)?;
        let previous = n
            .checked_sub(1)
            .ok_or_else(|| NumericError::overflow::<T>("predecessor"))?;
        self.from_i32(previous)
    }

    // --- Num ---

    fn add(&self, _x: &T, _y: &T) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Num, "add"))
    }

    fn subtract(&self, _x: &T, _y: &T) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Num, "subtract"))
    }

    fn multiply(&self, _x: &T, _y: &T) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Num, "multiply"))
    }

    fn zero(&self) -> Result<T> {
        self.from_i32(0)
    }

    fn one(&self) -> Result<T> {
        self.from_i32(1)
    }

    fn negate(&self, x: &T) -> Result<T> {
        let zero = self.zero()?;
        self.subtract(&zero, x)
    }

    /// `-1`, `0` or `1` according to the sign of `x`.
    fn sign(&self, x: &T) -> Result<T> {
        let zero = self.zero()?;
        match self.compare(x, &zero)? {
            Ordering::Less => self.from_i32(-1),
            Ordering::Equal => Ok(zero),
            Ordering::Greater => self.one(),
        }
    }

    fn abs(&self, x: &T) -> Result<T> {
        let sign = self.sign(x)?;
        self.multiply(x, &sign)
    }

    /// `x` raised to a natural power by repeated squaring.
    fn power(&self, x: &T, exponent: u32) -> Result<T> {
        let mut result = self.one()?;
        let mut base = x.clone();
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = self.multiply(&result, &base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = self.multiply(&base, &base)?;
            }
        }
        Ok(result)
    }

    // --- Integral ---

    /// Division truncated toward zero.
    fn quotient(&self, _x: &T, _y: &T) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Integral, "quotient"))
    }

    /// Remainder of [`quotient`](Self::quotient); takes the sign of `x`.
    fn remainder(&self, _x: &T, _y: &T) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Integral, "remainder"))
    }

    fn quot_rem(&self, x: &T, y: &T) -> Result<(T, T)> {
        Ok((self.quotient(x, y)?, self.remainder(x, y)?))
    }

    /// Flooring division and modulus derived from the truncating pair.
    ///
    /// When the remainder is non-zero and its sign differs from the
    /// divisor's, the quotient is one too large and the remainder is off by
    /// exactly `y`.
    fn div_mod(&self, x: &T, y: &T) -> Result<(T, T)> {
        let (q, r) = self.quot_rem(x, y)?;
        let zero = self.zero()?;
        let r_sign = self.compare(&r, &zero)?;
        let y_sign = self.compare(y, &zero)?;
        if r_sign != Ordering::Equal && r_sign != y_sign {
            let one = self.one()?;
            Ok((self.subtract(&q, &one)?, self.add(&r, y)?))
        } else {
            Ok((q, r))
        }
    }

    /// Division floored toward negative infinity.
    fn divide(&self, x: &T, y: &T) -> Result<T> {
        Ok(self.div_mod(x, y)?.0)
    }

    /// Remainder of [`divide`](Self::divide); takes the sign of `y`.
    fn modulus(&self, x: &T, y: &T) -> Result<T> {
        Ok(self.div_mod(x, y)?.1)
    }

    /// Non-negative greatest common divisor.
    fn gcd(&self, x: &T, y: &T) -> Result<T> {
        let zero = self.zero()?;
        let mut a = self.abs(x)?;
        let mut b = self.abs(y)?;
        while !self.equals(&b, &zero)? {
            let r = self.remainder(&a, &b)?;
            a = b;
            b = r;
        }
        Ok(a)
    }

    fn lcm(&self, x: &T, y: &T) -> Result<T> {
        let zero = self.zero()?;
        if self.equals(x, &zero)? || self.equals(y, &zero)? {
            return Ok(zero);
        }
        let g = self.gcd(x, y)?;
        let reduced = self.quotient(x, &g)?;
        let product = self.multiply(&reduced, y)?;
        self.abs(&product)
    }

    // --- Fractional ---

    fn reciprocal(&self, _x: &T) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Fractional, "reciprocal"))
    }

    fn divide_fractional(&self, x: &T, y: &T) -> Result<T> {
        let inverse = self.reciprocal(y)?;
        self.multiply(x, &inverse)
    }

    fn from_f64(&self, n: f64) -> Result<T> {
        self.require(Capability::Fractional, "from_f64")?;
        Ok(crate::try_convert::<f64, T>(n)?)
    }

    fn to_f64(&self, x: &T) -> Result<f64> {
        self.require(Capability::Fractional, "to_f64")?;
        Ok(crate::try_convert::<T, f64>(x.clone())?)
    }

    /// Builds a `T` from any built-in numeric value with this provider's own
    /// literals and ring operations. On types without the fractional layer
    /// floats truncate toward zero.
    fn from_primitive(&self, value: Primitive) -> Result<T> {
        self.require(Capability::Num, "from_primitive")?;
        build_primitive(self, value)
    }

    // --- Floating ---

    fn pi(&self) -> Result<T> {
        self.require(Capability::Floating, "pi")?;
        self.from_f64(std::f64::consts::PI)
    }

    fn exp(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "exp", x, f64::exp)
    }

    fn sqrt(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "sqrt", x, f64::sqrt)
    }

    /// Natural logarithm.
    fn log(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "log", x, f64::ln)
    }

    fn log_base(&self, x: &T, base: &T) -> Result<T> {
        via_f64_binary(self, Capability::Floating, "log_base", x, base, f64::log)
    }

    fn pow(&self, x: &T, y: &T) -> Result<T> {
        via_f64_binary(self, Capability::Floating, "pow", x, y, f64::powf)
    }

    fn sin(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "sin", x, f64::sin)
    }

    fn cos(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "cos", x, f64::cos)
    }

    fn tan(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "tan", x, f64::tan)
    }

    fn asin(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "asin", x, f64::asin)
    }

    fn acos(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "acos", x, f64::acos)
    }

    fn atan(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "atan", x, f64::atan)
    }

    fn sinh(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "sinh", x, f64::sinh)
    }

    fn cosh(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "cosh", x, f64::cosh)
    }

    fn tanh(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::Floating, "tanh", x, f64::tanh)
    }

    /// Four-quadrant arctangent of `y / x`.
    fn atan2(&self, y: &T, x: &T) -> Result<T> {
        via_f64_binary(self, Capability::Floating, "atan2", y, x, f64::atan2)
    }

    // --- RealFrac ---

    fn truncate(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::RealFrac, "truncate", x, f64::trunc)
    }

    /// Rounds half-way cases to the even neighbour.
    fn round(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::RealFrac, "round", x, f64::round_ties_even)
    }

    fn ceiling(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::RealFrac, "ceiling", x, f64::ceil)
    }

    fn floor(&self, x: &T) -> Result<T> {
        via_f64(self, Capability::RealFrac, "floor", x, f64::floor)
    }

    // --- RealFloat ---

    fn is_nan(&self, x: &T) -> Result<bool> {
        test_f64(self, "is_nan", x, f64::is_nan)
    }

    fn is_infinite(&self, x: &T) -> Result<bool> {
        test_f64(self, "is_infinite", x, f64::is_infinite)
    }

    fn is_negative_zero(&self, x: &T) -> Result<bool> {
        test_f64(self, "is_negative_zero", x, |v| v == 0.0 && v.is_sign_negative())
    }

    fn is_denormalized(&self, x: &T) -> Result<bool> {
        test_f64(self, "is_denormalized", x, f64::is_subnormal)
    }

    /// Whether `T` is an IEEE 754 binary format. Bridged types are not.
    fn is_ieee(&self) -> Result<bool> {
        self.require(Capability::RealFloat, "is_ieee")?;
        Ok(false)
    }

    // --- Bounded ---

    fn min_value(&self) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Bounded, "min_value"))
    }

    fn max_value(&self) -> Result<T> {
        Err(NumericError::unsupported::<T>(Capability::Bounded, "max_value"))
    }
}

fn build_primitive<T, P>(provider: &P, value: Primitive) -> Result<T>
where
    T: Scalar,
    P: NumericProvider<T> + ?Sized,
{
    let fractional = provider.supports(Capability::Fractional);
    if let (Primitive::Float(v), true) = (value, fractional) {
        return provider.from_f64(v);
    }
    let out_of_range = || {
        NumericError::from(ConversionError::OutOfRange {
            from: value.kind_name(),
            to: type_name::<T>(),
        })
    };
    let (negative, magnitude) = value.integer_parts().ok_or_else(out_of_range)?;
    if let Ok(small) = i32::try_from(magnitude) {
        return provider.from_i32(if negative { -small } else { small });
    }
    if fractional {
        return provider.from_f64(value.as_f64());
    }
    assemble_integer(provider, negative, magnitude).map_err(|err| match err {
        NumericError::Overflow { .. } | NumericError::Conversion(_) => out_of_range(),
        other => other,
    })
}

/// Rebuilds `±magnitude` digit by digit (base 2^16) from `from_i32`, so
/// integers wider than `i32` reach any ring. Negative values accumulate
/// downward so the type's minimum is reachable.
fn assemble_integer<T, P>(provider: &P, negative: bool, magnitude: u128) -> Result<T>
where
    T: Scalar,
    P: NumericProvider<T> + ?Sized,
{
    const DIGIT_BITS: u32 = 16;
    let base = provider.from_i32(1 << DIGIT_BITS)?;
    let digits = (u128::BITS - magnitude.leading_zeros()).div_ceil(DIGIT_BITS);
    let mut acc = provider.zero()?;
    for index in (0..digits).rev() {
        let digit = ((magnitude >> (index * DIGIT_BITS)) & 0xFFFF) as i32;
        let digit = provider.from_i32(digit)?;
        acc = provider.multiply(&acc, &base)?;
        acc = if negative {
            provider.subtract(&acc, &digit)?
        } else {
            provider.add(&acc, &digit)?
        };
    }
    Ok(acc)
}

fn via_f64<T, P>(
    provider: &P,
    capability: Capability,
    operation: &'static str,
    x: &T,
    f: fn(f64) -> f64,
) -> Result<T>
where
    T: Scalar,
    P: NumericProvider<T> + ?Sized,
{
    provider.require(capability, operation)?;
    let value = provider.to_f64(x)?;
    provider.from_f64(f(value))
}

fn via_f64_binary<T, P>(
    provider: &P,
    capability: Capability,
    operation: &'static str,
    x: &T,
    y: &T,
    f: fn(f64, f64) -> f64,
) -> Result<T>
where
    T: Scalar,
    P: NumericProvider<T> + ?Sized,
{
    provider.require(capability, operation)?;
    let a = provider.to_f64(x)?;
    let b = provider.to_f64(y)?;
    provider.from_f64(f(a, b))
}

fn test_f64<T, P>(provider: &P, operation: &'static str, x: &T, f: fn(f64) -> bool) -> Result<bool>
where
    T: Scalar,
    P: NumericProvider<T> + ?Sized,
{
    provider.require(Capability::RealFloat, operation)?;
    Ok(f(provider.to_f64(x)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Truncating integer arithmetic on `i64` through the defaults only:
    /// just the primitives are implemented.
    struct MinimalIntegral;

    impl NumericProvider<i64> for MinimalIntegral {
        fn capabilities(&self) -> Capabilities {
            Capabilities::of(&[Capability::Integral])
        }
        fn compare(&self, x: &i64, y: &i64) -> Result<Ordering> {
            Ok(x.cmp(y))
        }
        fn from_i32(&self, n: i32) -> Result<i64> {
            Ok(i64::from(n))
        }
        fn add(&self, x: &i64, y: &i64) -> Result<i64> {
            Ok(x + y)
        }
        fn subtract(&self, x: &i64, y: &i64) -> Result<i64> {
            Ok(x - y)
        }
        fn multiply(&self, x: &i64, y: &i64) -> Result<i64> {
            Ok(x * y)
        }
        fn quotient(&self, x: &i64, y: &i64) -> Result<i64> {
            if *y == 0 {
                return Err(NumericError::division_by_zero("quotient"));
            }
            Ok(x / y)
        }
        fn remainder(&self, x: &i64, y: &i64) -> Result<i64> {
            if *y == 0 {
                return Err(NumericError::division_by_zero("remainder"));
            }
            Ok(x % y)
        }
    }

    #[test]
    fn derived_floor_division_diverges_from_truncation_on_negatives() {
        let p = MinimalIntegral;
        assert_eq!(p.quotient(&-7, &2).unwrap(), -3);
        assert_eq!(p.remainder(&-7, &2).unwrap(), -1);
        assert_eq!(p.divide(&-7, &2).unwrap(), -4);
        assert_eq!(p.modulus(&-7, &2).unwrap(), 1);
        assert_eq!(p.div_mod(&7, &-2).unwrap(), (-4, -1));
        assert_eq!(p.div_mod(&-7, &-2).unwrap(), (3, -1));
        assert_eq!(p.div_mod(&6, &-3).unwrap(), (-2, 0));
    }

    #[test]
    fn derived_division_laws_hold_over_a_grid() {
        let p = MinimalIntegral;
        for x in -25i64..=25 {
            for y in (-7i64..=7).filter(|y| *y != 0) {
                let (q, r) = p.quot_rem(&x, &y).unwrap();
                assert_eq!(q * y + r, x, "quot/rem law for {x}, {y}");
                let (d, m) = p.div_mod(&x, &y).unwrap();
                assert_eq!(d * y + m, x, "div/mod law for {x}, {y}");
                assert!(m == 0 || m.signum() == y.signum(), "mod sign for {x}, {y}");
            }
        }
    }

    #[test]
    fn derived_ring_methods_use_the_primitives() {
        let p = MinimalIntegral;
        assert_eq!(p.negate(&5).unwrap(), -5);
        assert_eq!(p.sign(&-9).unwrap(), -1);
        assert_eq!(p.sign(&0).unwrap(), 0);
        assert_eq!(p.abs(&-9).unwrap(), 9);
        assert_eq!(p.power(&3, 5).unwrap(), 243);
        assert_eq!(p.power(&3, 0).unwrap(), 1);
        assert_eq!(p.gcd(&-12, &18).unwrap(), 6);
        assert_eq!(p.lcm(&4, &-6).unwrap(), 12);
        assert_eq!(p.max(3, 8).unwrap(), 8);
        assert_eq!(p.min(3, 8).unwrap(), 3);
        assert!(p.equals(&4, &4).unwrap());
    }

    #[test]
    fn derived_division_reports_zero_divisor() {
        let p = MinimalIntegral;
        assert!(matches!(
            p.divide(&1, &0),
            Err(NumericError::Domain { .. })
        ));
        assert!(matches!(
            p.modulus(&1, &0),
            Err(NumericError::Domain { .. })
        ));
    }

    #[test]
    fn undeclared_layers_are_unsupported_not_approximated() {
        let p = MinimalIntegral;
        assert!(matches!(
            p.sqrt(&4),
            Err(NumericError::Unsupported {
                capability: Capability::Floating,
                ..
            })
        ));
        assert!(matches!(
            p.reciprocal(&4),
            Err(NumericError::Unsupported {
                capability: Capability::Fractional,
                ..
            })
        ));
        assert!(matches!(
            p.max_value(),
            Err(NumericError::Unsupported {
                capability: Capability::Bounded,
                ..
            })
        ));
        assert!(matches!(p.is_nan(&1), Err(NumericError::Unsupported { .. })));
    }

    #[test]
    fn from_primitive_is_built_from_the_providers_own_literals() {
        let p = MinimalIntegral;
        assert_eq!(p.from_primitive(Primitive::Signed(-12)).unwrap(), -12);
        assert_eq!(p.from_primitive(Primitive::Unsigned(1 << 40)).unwrap(), 1 << 40);
        assert_eq!(p.from_primitive(Primitive::Signed(i64::MIN.into())).unwrap(), i64::MIN);
        assert_eq!(p.from_primitive(Primitive::Signed(i64::MAX.into())).unwrap(), i64::MAX);
        assert_eq!(p.from_primitive(Primitive::Float(9.99)).unwrap(), 9);
        assert!(matches!(
            p.from_primitive(Primitive::Float(f64::INFINITY)),
            Err(NumericError::Conversion(ConversionError::OutOfRange { .. }))
        ));
    }
}
