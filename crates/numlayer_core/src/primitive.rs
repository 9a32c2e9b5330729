//! Hand-written providers for the built-in numeric types.
//!
//! Integer providers use checked arithmetic and report `Overflow` instead
//! of wrapping. Float providers follow IEEE semantics (infinities and NaN
//! propagate) except that an exact zero divisor is a domain error.

use crate::capability::{Capabilities, Capability};
use crate::convert::reinterpret;
use crate::error::{ConversionError, NumericError, Result};
use crate::traits::{NumericProvider, Scalar};
use num_traits::FloatConst;
use std::any::TypeId;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub(crate) fn hash_value<H: Hash + ?Sized>(value: &H) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

macro_rules! integral_common {
    ($t:ty) => {
        fn capabilities(&self) -> Capabilities {
            Capabilities::of(&[Capability::Integral, Capability::Bounded])
        }

        #[inline]
        fn compare(&self, x: &$t, y: &$t) -> Result<Ordering> {
            Ok(x.cmp(y))
        }

        #[inline]
        fn equals(&self, x: &$t, y: &$t) -> Result<bool> {
            Ok(x == y)
        }

        fn hash_of(&self, x: &$t) -> Result<u64> {
            Ok(hash_value(x))
        }

        fn from_i32(&self, n: i32) -> Result<$t> {
            <$t>::try_from(n)
                .map_err(|_| NumericError::from(ConversionError::out_of_range::<i32, $t>()))
        }

        fn to_i32(&self, x: &$t) -> Result<i32> {
            i32::try_from(*x)
                .map_err(|_| NumericError::from(ConversionError::out_of_range::<$t, i32>()))
        }

        fn successor(&self, x: &$t) -> Result<$t> {
            x.checked_add(1)
                .ok_or_else(|| NumericError::overflow::<$t>("successor"))
        }

        fn predecessor(&self, x: &$t) -> Result<$t> {
            x.checked_sub(1)
                .ok_or_else(|| NumericError::overflow::<$t>("predecessor"))
        }

        #[inline]
        fn add(&self, x: &$t, y: &$t) -> Result<$t> {
            x.checked_add(*y)
                .ok_or_else(|| NumericError::overflow::<$t>("add"))
        }

        #[inline]
        fn subtract(&self, x: &$t, y: &$t) -> Result<$t> {
            x.checked_sub(*y)
                .ok_or_else(|| NumericError::overflow::<$t>("subtract"))
        }

        #[inline]
        fn multiply(&self, x: &$t, y: &$t) -> Result<$t> {
            x.checked_mul(*y)
                .ok_or_else(|| NumericError::overflow::<$t>("multiply"))
        }

        fn zero(&self) -> Result<$t> {
            Ok(0)
        }

        fn one(&self) -> Result<$t> {
            Ok(1)
        }

        fn negate(&self, x: &$t) -> Result<$t> {
            x.checked_neg()
                .ok_or_else(|| NumericError::overflow::<$t>("negate"))
        }

        fn power(&self, x: &$t, exponent: u32) -> Result<$t> {
            x.checked_pow(exponent)
                .ok_or_else(|| NumericError::overflow::<$t>("power"))
        }

        fn quotient(&self, x: &$t, y: &$t) -> Result<$t> {
            if *y == 0 {
                return Err(NumericError::division_by_zero("quotient"));
            }
            x.checked_div(*y)
                .ok_or_else(|| NumericError::overflow::<$t>("quotient"))
        }

        fn remainder(&self, x: &$t, y: &$t) -> Result<$t> {
            if *y == 0 {
                return Err(NumericError::division_by_zero("remainder"));
            }
            // MIN % -1 is mathematically zero.
            Ok(x.wrapping_rem(*y))
        }

        fn min_value(&self) -> Result<$t> {
            Ok(<$t>::MIN)
        }

        fn max_value(&self) -> Result<$t> {
            Ok(<$t>::MAX)
        }
    };
}

macro_rules! signed_provider {
    ($name:ident, $t:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl NumericProvider<$t> for $name {
            integral_common!($t);

            fn abs(&self, x: &$t) -> Result<$t> {
                x.checked_abs()
                    .ok_or_else(|| NumericError::overflow::<$t>("abs"))
            }

            fn sign(&self, x: &$t) -> Result<$t> {
                Ok(x.signum())
            }

            fn div_mod(&self, x: &$t, y: &$t) -> Result<($t, $t)> {
                if *y == 0 {
                    return Err(NumericError::division_by_zero("div_mod"));
                }
                let q = x
                    .checked_div(*y)
                    .ok_or_else(|| NumericError::overflow::<$t>("div_mod"))?;
                let r = x.wrapping_rem(*y);
                if r != 0 && ((r < 0) != (*y < 0)) {
                    Ok((q - 1, r + *y))
                } else {
                    Ok((q, r))
                }
            }
        }
    };
}

macro_rules! unsigned_provider {
    ($name:ident, $t:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl NumericProvider<$t> for $name {
            integral_common!($t);

            fn abs(&self, x: &$t) -> Result<$t> {
                Ok(*x)
            }

            fn sign(&self, x: &$t) -> Result<$t> {
                Ok(if *x == 0 { 0 } else { 1 })
            }

            fn div_mod(&self, x: &$t, y: &$t) -> Result<($t, $t)> {
                if *y == 0 {
                    return Err(NumericError::division_by_zero("div_mod"));
                }
                Ok((x / y, x % y))
            }
        }
    };
}

macro_rules! floating_provider {
    ($name:ident, $t:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl NumericProvider<$t> for $name {
            fn capabilities(&self) -> Capabilities {
                Capabilities::of(&[Capability::RealFloat, Capability::Bounded])
            }

            #[inline]
            fn compare(&self, x: &$t, y: &$t) -> Result<Ordering> {
                x.partial_cmp(y).ok_or(NumericError::Domain {
                    operation: "compare",
                    reason: "NaN is unordered",
                })
            }

            #[inline]
            fn equals(&self, x: &$t, y: &$t) -> Result<bool> {
                Ok(x == y)
            }

            fn hash_of(&self, x: &$t) -> Result<u64> {
                // 0.0 and -0.0 compare equal.
                let normalized = if *x == 0.0 { 0.0 } else { *x };
                Ok(hash_value(&normalized.to_bits()))
            }

            fn from_i32(&self, n: i32) -> Result<$t> {
                Ok(n as $t)
            }

            fn to_i32(&self, x: &$t) -> Result<i32> {
                num_traits::cast::<$t, i32>(*x)
                    .ok_or_else(|| NumericError::from(ConversionError::out_of_range::<$t, i32>()))
            }

            fn successor(&self, x: &$t) -> Result<$t> {
                Ok(x + 1.0)
            }

            fn predecessor(&self, x: &$t) -> Result<$t> {
                Ok(x - 1.0)
            }

            #[inline]
            fn add(&self, x: &$t, y: &$t) -> Result<$t> {
                Ok(x + y)
            }

            #[inline]
            fn subtract(&self, x: &$t, y: &$t) -> Result<$t> {
                Ok(x - y)
            }

            #[inline]
            fn multiply(&self, x: &$t, y: &$t) -> Result<$t> {
                Ok(x * y)
            }

            fn zero(&self) -> Result<$t> {
                Ok(0.0)
            }

            fn one(&self) -> Result<$t> {
                Ok(1.0)
            }

            fn negate(&self, x: &$t) -> Result<$t> {
                Ok(-x)
            }

            fn sign(&self, x: &$t) -> Result<$t> {
                if *x == 0.0 || x.is_nan() {
                    Ok(*x)
                } else {
                    Ok(x.signum())
                }
            }

            fn abs(&self, x: &$t) -> Result<$t> {
                Ok(x.abs())
            }

            fn power(&self, x: &$t, exponent: u32) -> Result<$t> {
                Ok(match i32::try_from(exponent) {
                    Ok(n) => x.powi(n),
                    Err(_) => x.powf(exponent as $t),
                })
            }

            fn reciprocal(&self, x: &$t) -> Result<$t> {
                if *x == 0.0 {
                    return Err(NumericError::division_by_zero("reciprocal"));
                }
                Ok(1.0 / x)
            }

            fn divide_fractional(&self, x: &$t, y: &$t) -> Result<$t> {
                if *y == 0.0 {
                    return Err(NumericError::division_by_zero("divide_fractional"));
                }
                Ok(x / y)
            }

            fn from_f64(&self, n: f64) -> Result<$t> {
                Ok(n as $t)
            }

            fn to_f64(&self, x: &$t) -> Result<f64> {
                Ok(f64::from(*x))
            }

            fn pi(&self) -> Result<$t> {
                Ok(<$t as FloatConst>::PI())
            }

            fn exp(&self, x: &$t) -> Result<$t> {
                Ok(x.exp())
            }

            fn sqrt(&self, x: &$t) -> Result<$t> {
                Ok(x.sqrt())
            }

            fn log(&self, x: &$t) -> Result<$t> {
                Ok(x.ln())
            }

            fn log_base(&self, x: &$t, base: &$t) -> Result<$t> {
                Ok(x.log(*base))
            }

            fn pow(&self, x: &$t, y: &$t) -> Result<$t> {
                Ok(x.powf(*y))
            }

            fn sin(&self, x: &$t) -> Result<$t> {
                Ok(x.sin())
            }

            fn cos(&self, x: &$t) -> Result<$t> {
                Ok(x.cos())
            }

            fn tan(&self, x: &$t) -> Result<$t> {
                Ok(x.tan())
            }

            fn asin(&self, x: &$t) -> Result<$t> {
                Ok(x.asin())
            }

            fn acos(&self, x: &$t) -> Result<$t> {
                Ok(x.acos())
            }

            fn atan(&self, x: &$t) -> Result<$t> {
                Ok(x.atan())
            }

            fn sinh(&self, x: &$t) -> Result<$t> {
                Ok(x.sinh())
            }

            fn cosh(&self, x: &$t) -> Result<$t> {
                Ok(x.cosh())
            }

            fn tanh(&self, x: &$t) -> Result<$t> {
                Ok(x.tanh())
            }

            fn atan2(&self, y: &$t, x: &$t) -> Result<$t> {
                Ok(y.atan2(*x))
            }

            fn truncate(&self, x: &$t) -> Result<$t> {
                Ok(x.trunc())
            }

            fn round(&self, x: &$t) -> Result<$t> {
                Ok(x.round_ties_even())
            }

            fn ceiling(&self, x: &$t) -> Result<$t> {
                Ok(x.ceil())
            }

            fn floor(&self, x: &$t) -> Result<$t> {
                Ok(x.floor())
            }

            fn is_nan(&self, x: &$t) -> Result<bool> {
                Ok(x.is_nan())
            }

            fn is_infinite(&self, x: &$t) -> Result<bool> {
                Ok(x.is_infinite())
            }

            fn is_negative_zero(&self, x: &$t) -> Result<bool> {
                Ok(*x == 0.0 && x.is_sign_negative())
            }

            fn is_denormalized(&self, x: &$t) -> Result<bool> {
                Ok(x.is_subnormal())
            }

            fn is_ieee(&self) -> Result<bool> {
                Ok(true)
            }

            fn min_value(&self) -> Result<$t> {
                Ok(<$t>::MIN)
            }

            fn max_value(&self) -> Result<$t> {
                Ok(<$t>::MAX)
            }
        }
    };
}

signed_provider!(I8Provider, i8);
signed_provider!(I16Provider, i16);
signed_provider!(I32Provider, i32);
signed_provider!(I64Provider, i64);
signed_provider!(I128Provider, i128);
signed_provider!(IsizeProvider, isize);

unsigned_provider!(U8Provider, u8);
unsigned_provider!(U16Provider, u16);
unsigned_provider!(U32Provider, u32);
unsigned_provider!(U64Provider, u64);
unsigned_provider!(U128Provider, u128);
unsigned_provider!(UsizeProvider, usize);

floating_provider!(F32Provider, f32);
floating_provider!(F64Provider, f64);

macro_rules! specializations {
    ($($t:ty => $provider:ident),+ $(,)?) => {
        /// The hand-written provider for `T`, if `T` is a built-in numeric type.
        pub fn specialization<T: Scalar>() -> Option<Arc<dyn NumericProvider<T>>> {
            $(
                if TypeId::of::<T>() == TypeId::of::<$t>() {
                    let provider: Arc<dyn NumericProvider<$t>> = Arc::new($provider);
                    return reinterpret(provider);
                }
            )+
            None
        }

        pub fn is_primitive<T: 'static>() -> bool {
            let id = TypeId::of::<T>();
            false $(|| id == TypeId::of::<$t>())+
        }
    };
}

specializations!(
    i8 => I8Provider,
    i16 => I16Provider,
    i32 => I32Provider,
    i64 => I64Provider,
    i128 => I128Provider,
    isize => IsizeProvider,
    u8 => U8Provider,
    u16 => U16Provider,
    u32 => U32Provider,
    u64 => U64Provider,
    u128 => U128Provider,
    usize => UsizeProvider,
    f32 => F32Provider,
    f64 => F64Provider,
);
