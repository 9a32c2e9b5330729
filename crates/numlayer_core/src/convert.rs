//! Conversion bridge.
//!
//! `try_convert_with` turns a value of any type `A` into a `B`, trying in
//! order:
//!
//! 1. a direct widening/narrowing cast when both are built-in numeric types;
//! 2. a conversion registered for the `(A, B)` pair in a [`ConverterTable`];
//! 3. the convertible path: text is parsed, and values that can present
//!    themselves as a [`Primitive`] (built-ins, or types that exposed
//!    `ToInteger`/`ToFloat` operators) are rebuilt as `B` from that
//!    intermediate value, through a cast, `String` formatting, or `B`'s
//!    `FromInteger`/`FromFloat` operators.
//!
//! Every expected failure comes back as a `ConversionError` value.

use crate::error::{ConversionError, ConversionResult};
use crate::synth::OperatorCatalog;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Moves `value` into `D` when `S` and `D` are the same type.
pub(crate) fn reinterpret<S: 'static, D: 'static>(value: S) -> Option<D> {
    let boxed: Box<dyn Any> = Box::new(value);
    boxed.downcast::<D>().ok().map(|value| *value)
}

/// A built-in numeric value widened to the largest type of its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
}

macro_rules! primitive_from {
    ($($t:ty => $variant:ident as $wide:ty),+ $(,)?) => {
        $(impl From<$t> for Primitive {
            fn from(value: $t) -> Self {
                Primitive::$variant(value as $wide)
            }
        })+

        impl Primitive {
            /// Reads a built-in numeric value out of `value`, if it is one.
            pub fn read(value: &dyn Any) -> Option<Primitive> {
                $(if let Some(v) = value.downcast_ref::<$t>() {
                    return Some(Primitive::from(*v));
                })+
                None
            }
        }
    };
}

primitive_from!(
    i8 => Signed as i128,
    i16 => Signed as i128,
    i32 => Signed as i128,
    i64 => Signed as i128,
    i128 => Signed as i128,
    isize => Signed as i128,
    u8 => Unsigned as u128,
    u16 => Unsigned as u128,
    u32 => Unsigned as u128,
    u64 => Unsigned as u128,
    u128 => Unsigned as u128,
    usize => Unsigned as u128,
    f32 => Float as f64,
    f64 => Float as f64,
);

macro_rules! builtin_targets {
    ($($t:ty),+ $(,)?) => {
        impl Primitive {
            /// Casts to `B` when `B` is a built-in numeric type; `None` otherwise.
            pub fn cast<B: 'static>(self) -> Option<ConversionResult<B>> {
                $(if TypeId::of::<B>() == TypeId::of::<$t>() {
                    let converted: Option<$t> = match self {
                        Primitive::Signed(v) => num_traits::cast(v),
                        Primitive::Unsigned(v) => num_traits::cast(v),
                        Primitive::Float(v) => num_traits::cast(v),
                    };
                    let result = converted.ok_or(ConversionError::OutOfRange {
                        from: self.kind_name(),
                        to: type_name::<B>(),
                    });
                    return reinterpret(result);
                })+
                None
            }
        }

        /// Parses `text` as `B` when `B` is a built-in numeric type.
        fn parse_as<B: 'static>(text: &str) -> Option<ConversionResult<B>> {
            $(if TypeId::of::<B>() == TypeId::of::<$t>() {
                let result = text.trim().parse::<$t>().map_err(|_| ConversionError::Parse {
                    to: type_name::<B>(),
                    input: text.to_string(),
                });
                return reinterpret(result);
            })+
            None
        }
    };
}

builtin_targets!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl Primitive {
    pub(crate) fn kind_name(self) -> &'static str {
        match self {
            Primitive::Signed(_) => "i128",
            Primitive::Unsigned(_) => "u128",
            Primitive::Float(_) => "f64",
        }
    }

    /// The value as an `i64` when it is integral and in range.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Primitive::Signed(v) => i64::try_from(v).ok(),
            Primitive::Unsigned(v) => i64::try_from(v).ok(),
            Primitive::Float(v) => {
                let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
                (v.fract() == 0.0 && in_range).then_some(v as i64)
            }
        }
    }

    /// Sign and magnitude of the value, truncating floats toward zero.
    /// `None` for NaN, infinities and floats beyond `u128`.
    pub(crate) fn integer_parts(self) -> Option<(bool, u128)> {
        match self {
            Primitive::Signed(v) => Some((v < 0, v.unsigned_abs())),
            Primitive::Unsigned(v) => Some((false, v)),
            Primitive::Float(v) => {
                let whole = v.trunc();
                (whole.is_finite() && whole.abs() < u128::MAX as f64)
                    .then(|| (whole < 0.0, whole.abs() as u128))
            }
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Primitive::Signed(v) => v as f64,
            Primitive::Unsigned(v) => v as f64,
            Primitive::Float(v) => v,
        }
    }

    fn render(self) -> String {
        match self {
            Primitive::Signed(v) => v.to_string(),
            Primitive::Unsigned(v) => v.to_string(),
            Primitive::Float(v) => v.to_string(),
        }
    }
}

fn read_text(value: &dyn Any) -> Option<&str> {
    if let Some(text) = value.downcast_ref::<String>() {
        return Some(text.as_str());
    }
    value.downcast_ref::<&'static str>().copied()
}

/// Rebuilds `B` from an intermediate primitive value.
fn rebuild<B: 'static>(value: Primitive, operators: &OperatorCatalog) -> Option<ConversionResult<B>> {
    if let Some(result) = value.cast::<B>() {
        return Some(result);
    }
    if TypeId::of::<B>() == TypeId::of::<String>() {
        return reinterpret(Ok::<String, ConversionError>(value.render()));
    }
    operators.build_from_primitive::<B>(value)
}

pub type Converter<A, B> = Arc<dyn Fn(A) -> ConversionResult<B> + Send + Sync>;

/// Type-provided conversions, keyed by `(source, target)` type.
#[derive(Default)]
pub struct ConverterTable {
    converters: RwLock<HashMap<(TypeId, TypeId), Arc<dyn Any + Send + Sync>>>,
}

impl ConverterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A, B, F>(&self, convert: F)
    where
        A: 'static,
        B: 'static,
        F: Fn(A) -> ConversionResult<B> + Send + Sync + 'static,
    {
        let converter: Converter<A, B> = Arc::new(convert);
        self.converters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((TypeId::of::<A>(), TypeId::of::<B>()), Arc::new(converter));
    }

    pub fn register_from<A: 'static, B: From<A> + 'static>(&self) {
        self.register(|value: A| Ok(B::from(value)));
    }

    pub fn register_try_from<A: 'static, B: TryFrom<A> + 'static>(&self) {
        self.register(|value: A| {
            B::try_from(value).map_err(|_| ConversionError::out_of_range::<A, B>())
        });
    }

    pub fn lookup<A: 'static, B: 'static>(&self) -> Option<Converter<A, B>> {
        self.converters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(TypeId::of::<A>(), TypeId::of::<B>()))
            .and_then(|entry| entry.downcast_ref::<Converter<A, B>>())
            .cloned()
    }
}

pub fn try_convert_with<A: 'static, B: 'static>(
    value: A,
    converters: &ConverterTable,
    operators: &OperatorCatalog,
) -> ConversionResult<B> {
    if TypeId::of::<A>() == TypeId::of::<B>() {
        if let Some(same) = reinterpret::<A, B>(value) {
            return Ok(same);
        }
        return Err(ConversionError::no_path::<A, B>());
    }

    let primitive = Primitive::read(&value);
    if let Some(result) = primitive.and_then(|p| p.cast::<B>()) {
        return result;
    }

    if let Some(convert) = converters.lookup::<A, B>() {
        return convert(value);
    }

    if let Some(text) = read_text(&value) {
        if let Some(result) = parse_as::<B>(text) {
            return result;
        }
    }

    let view = primitive.or_else(|| operators.read_primitive(&value));
    if let Some(result) = view.and_then(|p| rebuild::<B>(p, operators)) {
        return result;
    }

    Err(ConversionError::no_path::<A, B>())
}
