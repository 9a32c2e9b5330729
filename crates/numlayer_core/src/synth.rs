//! Generic fallback: providers synthesized from exposed operators.
//!
//! Rust has no runtime reflection, so a type makes its arithmetic
//! discoverable by exposing operators to an [`OperatorCatalog`], keyed by
//! the type and the operator name. Each operator is stored as a compiled
//! [`OperatorFn`]; discovery looks the operators up by name, checks that
//! the stored callable has the operator's signature, and freezes the result
//! in an [`OperatorTable`]. The table backs a [`SynthesizedProvider`] whose
//! remaining methods come from the trait defaults.

use crate::capability::{Capabilities, Capability};
use crate::convert::Primitive;
use crate::error::{ConversionError, ConversionResult, NumericError, Result, SynthesisError};
use crate::primitive::hash_value;
use crate::traits::{NumericProvider, Scalar};
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Negate,
    Compare,
    Quotient,
    Remainder,
    Divide,
    FromInteger,
    ToInteger,
    FromFloat,
    ToFloat,
    Hash,
}

impl Operator {
    /// Operators a type must expose before a provider can be synthesized,
    /// in the order they are looked up.
    pub const REQUIRED: [Operator; 5] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Compare,
        Operator::FromInteger,
    ];

    pub fn signature(self) -> Signature {
        match self {
            Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Quotient
            | Operator::Remainder
            | Operator::Divide => Signature::Binary,
            Operator::Negate => Signature::Unary,
            Operator::Compare => Signature::Comparison,
            Operator::FromInteger => Signature::FromInteger,
            Operator::ToInteger => Signature::ToInteger,
            Operator::FromFloat => Signature::FromFloat,
            Operator::ToFloat => Signature::ToFloat,
            Operator::Hash => Signature::Hash,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signature {
    Binary,
    Unary,
    Comparison,
    FromInteger,
    ToInteger,
    FromFloat,
    ToFloat,
    Hash,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Signature::Binary => "`fn(&T, &T) -> T`",
            Signature::Unary => "`fn(&T) -> T`",
            Signature::Comparison => "`fn(&T, &T) -> Option<Ordering>`",
            Signature::FromInteger => "`fn(i64) -> Option<T>`",
            Signature::ToInteger => "`fn(&T) -> Option<i64>`",
            Signature::FromFloat => "`fn(f64) -> Option<T>`",
            Signature::ToFloat => "`fn(&T) -> Option<f64>`",
            Signature::Hash => "`fn(&T) -> u64`",
        };
        f.write_str(text)
    }
}

pub type BinaryFn<T> = Arc<dyn Fn(&T, &T) -> T + Send + Sync>;
pub type UnaryFn<T> = Arc<dyn Fn(&T) -> T + Send + Sync>;
pub type ComparisonFn<T> = Arc<dyn Fn(&T, &T) -> Option<Ordering> + Send + Sync>;
pub type FromIntegerFn<T> = Arc<dyn Fn(i64) -> Option<T> + Send + Sync>;
pub type ToIntegerFn<T> = Arc<dyn Fn(&T) -> Option<i64> + Send + Sync>;
pub type FromFloatFn<T> = Arc<dyn Fn(f64) -> Option<T> + Send + Sync>;
pub type ToFloatFn<T> = Arc<dyn Fn(&T) -> Option<f64> + Send + Sync>;
pub type HashFn<T> = Arc<dyn Fn(&T) -> u64 + Send + Sync>;

/// A compiled operator, tagged with its signature.
pub enum OperatorFn<T> {
    Binary(BinaryFn<T>),
    Unary(UnaryFn<T>),
    Comparison(ComparisonFn<T>),
    FromInteger(FromIntegerFn<T>),
    ToInteger(ToIntegerFn<T>),
    FromFloat(FromFloatFn<T>),
    ToFloat(ToFloatFn<T>),
    Hash(HashFn<T>),
}

impl<T> Clone for OperatorFn<T> {
    fn clone(&self) -> Self {
        match self {
            OperatorFn::Binary(f) => OperatorFn::Binary(Arc::clone(f)),
            OperatorFn::Unary(f) => OperatorFn::Unary(Arc::clone(f)),
            OperatorFn::Comparison(f) => OperatorFn::Comparison(Arc::clone(f)),
            OperatorFn::FromInteger(f) => OperatorFn::FromInteger(Arc::clone(f)),
            OperatorFn::ToInteger(f) => OperatorFn::ToInteger(Arc::clone(f)),
            OperatorFn::FromFloat(f) => OperatorFn::FromFloat(Arc::clone(f)),
            OperatorFn::ToFloat(f) => OperatorFn::ToFloat(Arc::clone(f)),
            OperatorFn::Hash(f) => OperatorFn::Hash(Arc::clone(f)),
        }
    }
}

impl<T> OperatorFn<T> {
    pub fn binary(f: impl Fn(&T, &T) -> T + Send + Sync + 'static) -> Self {
        OperatorFn::Binary(Arc::new(f))
    }

    pub fn unary(f: impl Fn(&T) -> T + Send + Sync + 'static) -> Self {
        OperatorFn::Unary(Arc::new(f))
    }

    pub fn comparison(f: impl Fn(&T, &T) -> Option<Ordering> + Send + Sync + 'static) -> Self {
        OperatorFn::Comparison(Arc::new(f))
    }

    pub fn from_integer(f: impl Fn(i64) -> Option<T> + Send + Sync + 'static) -> Self {
        OperatorFn::FromInteger(Arc::new(f))
    }

    pub fn to_integer(f: impl Fn(&T) -> Option<i64> + Send + Sync + 'static) -> Self {
        OperatorFn::ToInteger(Arc::new(f))
    }

    pub fn from_float(f: impl Fn(f64) -> Option<T> + Send + Sync + 'static) -> Self {
        OperatorFn::FromFloat(Arc::new(f))
    }

    pub fn to_float(f: impl Fn(&T) -> Option<f64> + Send + Sync + 'static) -> Self {
        OperatorFn::ToFloat(Arc::new(f))
    }

    pub fn hash(f: impl Fn(&T) -> u64 + Send + Sync + 'static) -> Self {
        OperatorFn::Hash(Arc::new(f))
    }

    pub fn signature(&self) -> Signature {
        match self {
            OperatorFn::Binary(_) => Signature::Binary,
            OperatorFn::Unary(_) => Signature::Unary,
            OperatorFn::Comparison(_) => Signature::Comparison,
            OperatorFn::FromInteger(_) => Signature::FromInteger,
            OperatorFn::ToInteger(_) => Signature::ToInteger,
            OperatorFn::FromFloat(_) => Signature::FromFloat,
            OperatorFn::ToFloat(_) => Signature::ToFloat,
            OperatorFn::Hash(_) => Signature::Hash,
        }
    }

    fn into_binary(self) -> Option<BinaryFn<T>> {
        match self {
            OperatorFn::Binary(f) => Some(f),
            _ => None,
        }
    }

    fn into_unary(self) -> Option<UnaryFn<T>> {
        match self {
            OperatorFn::Unary(f) => Some(f),
            _ => None,
        }
    }

    fn into_comparison(self) -> Option<ComparisonFn<T>> {
        match self {
            OperatorFn::Comparison(f) => Some(f),
            _ => None,
        }
    }

    fn into_from_integer(self) -> Option<FromIntegerFn<T>> {
        match self {
            OperatorFn::FromInteger(f) => Some(f),
            _ => None,
        }
    }

    fn into_to_integer(self) -> Option<ToIntegerFn<T>> {
        match self {
            OperatorFn::ToInteger(f) => Some(f),
            _ => None,
        }
    }

    fn into_from_float(self) -> Option<FromFloatFn<T>> {
        match self {
            OperatorFn::FromFloat(f) => Some(f),
            _ => None,
        }
    }

    fn into_to_float(self) -> Option<ToFloatFn<T>> {
        match self {
            OperatorFn::ToFloat(f) => Some(f),
            _ => None,
        }
    }

    fn into_hash(self) -> Option<HashFn<T>> {
        match self {
            OperatorFn::Hash(f) => Some(f),
            _ => None,
        }
    }
}

/// Operators exposed by element types, keyed by `(type, operator)`.
#[derive(Default)]
pub struct OperatorCatalog {
    entries: RwLock<HashMap<(TypeId, Operator), Arc<dyn Any + Send + Sync>>>,
}

impl OperatorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exposes `f` as `operator` on `T`, replacing any earlier entry.
    /// Providers already synthesized for `T` keep the operators they were
    /// built with.
    pub fn expose<T: Send + Sync + 'static>(&self, operator: Operator, f: OperatorFn<T>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((TypeId::of::<T>(), operator), Arc::new(f));
    }

    pub fn expose_all<T: Send + Sync + 'static>(
        &self,
        operators: impl IntoIterator<Item = (Operator, OperatorFn<T>)>,
    ) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (operator, f) in operators {
            entries.insert((TypeId::of::<T>(), operator), Arc::new(f));
        }
    }

    pub fn contains<T: 'static>(&self, operator: Operator) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(TypeId::of::<T>(), operator))
    }

    pub fn locate<T: 'static>(&self, operator: Operator) -> Option<OperatorFn<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(TypeId::of::<T>(), operator))
            .and_then(|entry| entry.downcast_ref::<OperatorFn<T>>())
            .cloned()
    }

    /// Looks up `operator` and checks it has the expected signature.
    fn find<T: 'static, F>(
        &self,
        operator: Operator,
        pick: fn(OperatorFn<T>) -> Option<F>,
    ) -> std::result::Result<Option<F>, SynthesisError> {
        match self.locate::<T>(operator) {
            None => Ok(None),
            Some(f) => pick(f).map(Some).ok_or(SynthesisError::SignatureMismatch {
                type_name: type_name::<T>(),
                operator,
                expected: operator.signature(),
            }),
        }
    }

    fn require<T: 'static, F>(
        &self,
        operator: Operator,
        pick: fn(OperatorFn<T>) -> Option<F>,
    ) -> std::result::Result<F, SynthesisError> {
        self.find(operator, pick)?
            .ok_or(SynthesisError::MissingOperator {
                type_name: type_name::<T>(),
                operator,
            })
    }

    /// Presents `value` as a primitive through its `ToInteger`/`ToFloat`
    /// operators. Integral values prefer the integer reading.
    pub(crate) fn read_primitive<T: 'static>(&self, value: &T) -> Option<Primitive> {
        let integer = self
            .locate::<T>(Operator::ToInteger)
            .and_then(OperatorFn::into_to_integer)
            .and_then(|f| f(value));
        let float = self
            .locate::<T>(Operator::ToFloat)
            .and_then(OperatorFn::into_to_float)
            .and_then(|f| f(value));
        match (integer, float) {
            (Some(i), Some(f)) if i as f64 == f => Some(Primitive::Signed(i.into())),
            (Some(i), None) => Some(Primitive::Signed(i.into())),
            (_, Some(f)) => Some(Primitive::Float(f)),
            (None, None) => None,
        }
    }

    /// Builds a `T` from a primitive through its `FromInteger`/`FromFloat`
    /// operators; `None` when `T` exposes neither.
    pub(crate) fn build_from_primitive<T: 'static>(
        &self,
        value: Primitive,
    ) -> Option<ConversionResult<T>> {
        let from_integer = self
            .locate::<T>(Operator::FromInteger)
            .and_then(OperatorFn::into_from_integer);
        let from_float = self
            .locate::<T>(Operator::FromFloat)
            .and_then(OperatorFn::into_from_float);
        if from_integer.is_none() && from_float.is_none() {
            return None;
        }
        let built = match (value.as_i64(), &from_integer, &from_float) {
            (Some(n), Some(f), _) => f(n),
            (_, _, Some(f)) => f(value.as_f64()),
            _ => None,
        };
        Some(built.ok_or(ConversionError::OutOfRange {
            from: value.kind_name(),
            to: type_name::<T>(),
        }))
    }
}

/// `Add`, `Subtract`, `Multiply`, `Negate` and `Compare` from the std
/// operator traits.
pub fn ring_operators<T>() -> Vec<(Operator, OperatorFn<T>)>
where
    T: Scalar + Add<Output = T> + Sub<Output = T> + Mul<Output = T> + Neg<Output = T> + PartialOrd,
{
    vec![
        (Operator::Add, OperatorFn::binary(|x: &T, y: &T| x.clone() + y.clone())),
        (Operator::Subtract, OperatorFn::binary(|x: &T, y: &T| x.clone() - y.clone())),
        (Operator::Multiply, OperatorFn::binary(|x: &T, y: &T| x.clone() * y.clone())),
        (Operator::Negate, OperatorFn::unary(|x: &T| -x.clone())),
        (Operator::Compare, OperatorFn::comparison(|x: &T, y: &T| x.partial_cmp(y))),
    ]
}

/// `Quotient` and `Remainder` from `Div` and `Rem`, which must truncate
/// toward zero.
pub fn integral_operators<T>() -> Vec<(Operator, OperatorFn<T>)>
where
    T: Scalar + Div<Output = T> + Rem<Output = T>,
{
    vec![
        (Operator::Quotient, OperatorFn::binary(|x: &T, y: &T| x.clone() / y.clone())),
        (Operator::Remainder, OperatorFn::binary(|x: &T, y: &T| x.clone() % y.clone())),
    ]
}

/// `Divide` from an exact `Div`.
pub fn fractional_operators<T>() -> Vec<(Operator, OperatorFn<T>)>
where
    T: Scalar + Div<Output = T>,
{
    vec![(Operator::Divide, OperatorFn::binary(|x: &T, y: &T| x.clone() / y.clone()))]
}

/// Literal construction and readback through `num_traits` casts.
pub fn cast_operators<T>() -> Vec<(Operator, OperatorFn<T>)>
where
    T: Scalar + num_traits::NumCast,
{
    vec![
        (Operator::FromInteger, OperatorFn::from_integer(|n| <T as num_traits::NumCast>::from(n))),
        (Operator::ToInteger, OperatorFn::to_integer(|x: &T| x.to_i64())),
        (Operator::FromFloat, OperatorFn::from_float(|v| <T as num_traits::NumCast>::from(v))),
        (Operator::ToFloat, OperatorFn::to_float(|x: &T| x.to_f64())),
    ]
}

/// `Hash` from `std::hash::Hash`. The hash must agree with `Compare`:
/// values that compare equal hash equal.
pub fn hash_operators<T>() -> Vec<(Operator, OperatorFn<T>)>
where
    T: Scalar + Hash,
{
    vec![(Operator::Hash, OperatorFn::hash(|x: &T| hash_value(x)))]
}

/// Operators discovered for `T`, frozen once built.
///
/// Readback (`ToInteger`, `ToFloat`) and `Hash` are optional. Without them
/// the provider still claims the enumeration layer, since `successor` and
/// `predecessor` only need `Add`, `Subtract` and `FromInteger`, but `to_i32`
/// fails with a `MissingOperator` error naming what to expose.
pub struct OperatorTable<T> {
    add: BinaryFn<T>,
    subtract: BinaryFn<T>,
    multiply: BinaryFn<T>,
    compare: ComparisonFn<T>,
    from_integer: FromIntegerFn<T>,
    negate: Option<UnaryFn<T>>,
    quotient: Option<BinaryFn<T>>,
    remainder: Option<BinaryFn<T>>,
    divide: Option<BinaryFn<T>>,
    to_integer: Option<ToIntegerFn<T>>,
    from_float: Option<FromFloatFn<T>>,
    to_float: Option<ToFloatFn<T>>,
    hash: Option<HashFn<T>>,
}

impl<T: Scalar> OperatorTable<T> {
    pub fn discover(catalog: &OperatorCatalog) -> std::result::Result<Self, SynthesisError> {
        // Reports the first missing operator in `Operator::REQUIRED` order.
        Ok(Self {
            add: catalog.require(Operator::Add, OperatorFn::into_binary)?,
            subtract: catalog.require(Operator::Subtract, OperatorFn::into_binary)?,
            multiply: catalog.require(Operator::Multiply, OperatorFn::into_binary)?,
            compare: catalog.require(Operator::Compare, OperatorFn::into_comparison)?,
            from_integer: catalog.require(Operator::FromInteger, OperatorFn::into_from_integer)?,
            negate: catalog.find(Operator::Negate, OperatorFn::into_unary)?,
            quotient: catalog.find(Operator::Quotient, OperatorFn::into_binary)?,
            remainder: catalog.find(Operator::Remainder, OperatorFn::into_binary)?,
            divide: catalog.find(Operator::Divide, OperatorFn::into_binary)?,
            to_integer: catalog.find(Operator::ToInteger, OperatorFn::into_to_integer)?,
            from_float: catalog.find(Operator::FromFloat, OperatorFn::into_from_float)?,
            to_float: catalog.find(Operator::ToFloat, OperatorFn::into_to_float)?,
            hash: catalog.find(Operator::Hash, OperatorFn::into_hash)?,
        })
    }

    /// Layers the discovered operators can back.
    pub fn capabilities(&self) -> Capabilities {
        let mut layers = Capabilities::of(&[Capability::Num]);
        if self.quotient.is_some() && self.remainder.is_some() {
            layers = layers.with(Capability::Integral);
        }
        if self.divide.is_some() {
            layers = layers.with(Capability::Fractional);
            if self.from_float.is_some() && self.to_float.is_some() {
                layers = layers.with(Capability::RealFloat);
            }
        }
        layers
    }

    pub fn has(&self, operator: Operator) -> bool {
        match operator {
            Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Compare
            | Operator::FromInteger => true,
            Operator::Negate => self.negate.is_some(),
            Operator::Quotient => self.quotient.is_some(),
            Operator::Remainder => self.remainder.is_some(),
            Operator::Divide => self.divide.is_some(),
            Operator::ToInteger => self.to_integer.is_some(),
            Operator::FromFloat => self.from_float.is_some(),
            Operator::ToFloat => self.to_float.is_some(),
            Operator::Hash => self.hash.is_some(),
        }
    }
}

pub struct SynthesizedProvider<T> {
    table: OperatorTable<T>,
    capabilities: Capabilities,
}

impl<T: Scalar> SynthesizedProvider<T> {
    pub fn new(table: OperatorTable<T>) -> Self {
        let capabilities = table.capabilities();
        Self {
            table,
            capabilities,
        }
    }

    pub fn table(&self) -> &OperatorTable<T> {
        &self.table
    }

    fn ensure_nonzero(&self, divisor: &T, operation: &'static str) -> Result<()> {
        let zero = self.zero()?;
        if self.equals(divisor, &zero)? {
            Err(NumericError::division_by_zero(operation))
        } else {
            Ok(())
        }
    }

    fn checked_binary(
        &self,
        f: &Option<BinaryFn<T>>,
        capability: Capability,
        operation: &'static str,
        x: &T,
        y: &T,
    ) -> Result<T> {
        let f = f
            .as_ref()
            .ok_or_else(|| NumericError::unsupported::<T>(capability, operation))?;
        self.ensure_nonzero(y, operation)?;
        Ok(f(x, y))
    }

    /// The error for a float conversion whose operator is absent.
    fn missing_float_operator(&self, operator: Operator, operation: &'static str) -> NumericError {
        if self.supports(Capability::Fractional) {
            NumericError::missing_operator::<T>(operator, operation)
        } else {
            NumericError::unsupported::<T>(Capability::Fractional, operation)
        }
    }
}

/// Discovers `T`'s operators in `catalog` and builds a provider over them.
pub fn synthesize<T: Scalar>(
    catalog: &OperatorCatalog,
) -> std::result::Result<SynthesizedProvider<T>, SynthesisError> {
    OperatorTable::discover(catalog).map(SynthesizedProvider::new)
}

impl<T: Scalar> NumericProvider<T> for SynthesizedProvider<T> {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn compare(&self, x: &T, y: &T) -> Result<Ordering> {
        (self.table.compare)(x, y).ok_or(NumericError::Domain {
            operation: "compare",
            reason: "operands are unordered",
        })
    }

    /// Uses the `Hash` operator when exposed, otherwise hashes the numeric
    /// readback, with `-0.0` folded into `0.0`.
    fn hash_of(&self, x: &T) -> Result<u64> {
        if let Some(f) = &self.table.hash {
            return Ok(f(x));
        }
        if let Some(v) = self.table.to_float.as_ref().and_then(|f| f(x)) {
            let v = if v == 0.0 { 0.0 } else { v };
            return Ok(hash_value(&v.to_bits()));
        }
        if let Some(n) = self.table.to_integer.as_ref().and_then(|f| f(x)) {
            return Ok(hash_value(&n));
        }
        Err(NumericError::missing_operator::<T>(Operator::Hash, "hash_of"))
    }

    fn from_i32(&self, n: i32) -> Result<T> {
        (self.table.from_integer)(n.into())
            .ok_or_else(|| NumericError::from(ConversionError::out_of_range::<i32, T>()))
    }

    fn to_i32(&self, x: &T) -> Result<i32> {
        let f = self
            .table
            .to_integer
            .as_ref()
            .ok_or_else(|| NumericError::missing_operator::<T>(Operator::ToInteger, "to_i32"))?;
        f(x)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| NumericError::from(ConversionError::out_of_range::<T, i32>()))
    }

    fn successor(&self, x: &T) -> Result<T> {
        let one = self.one()?;
        self.add(x, &one)
    }

    fn predecessor(&self, x: &T) -> Result<T> {
        let one = self.one()?;
        self.subtract(x, &one)
    }

    fn add(&self, x: &T, y: &T) -> Result<T> {
        Ok((self.table.add)(x, y))
    }

    fn subtract(&self, x: &T, y: &T) -> Result<T> {
        Ok((self.table.subtract)(x, y))
    }

    fn multiply(&self, x: &T, y: &T) -> Result<T> {
        Ok((self.table.multiply)(x, y))
    }

    fn negate(&self, x: &T) -> Result<T> {
        match &self.table.negate {
            Some(f) => Ok(f(x)),
            None => {
                let zero = self.zero()?;
                self.subtract(&zero, x)
            }
        }
    }

    fn quotient(&self, x: &T, y: &T) -> Result<T> {
        self.checked_binary(&self.table.quotient, Capability::Integral, "quotient", x, y)
    }

    fn remainder(&self, x: &T, y: &T) -> Result<T> {
        self.checked_binary(&self.table.remainder, Capability::Integral, "remainder", x, y)
    }

    fn reciprocal(&self, x: &T) -> Result<T> {
        let one = self.one()?;
        self.divide_fractional(&one, x)
    }

    fn divide_fractional(&self, x: &T, y: &T) -> Result<T> {
        self.checked_binary(
            &self.table.divide,
            Capability::Fractional,
            "divide_fractional",
            x,
            y,
        )
    }

    fn from_f64(&self, n: f64) -> Result<T> {
        let f = self
            .table
            .from_float
            .as_ref()
            .ok_or_else(|| self.missing_float_operator(Operator::FromFloat, "from_f64"))?;
        f(n).ok_or_else(|| NumericError::from(ConversionError::out_of_range::<f64, T>()))
    }

    fn to_f64(&self, x: &T) -> Result<f64> {
        let f = self
            .table
            .to_float
            .as_ref()
            .ok_or_else(|| self.missing_float_operator(Operator::ToFloat, "to_f64"))?;
        f(x).ok_or_else(|| NumericError::from(ConversionError::out_of_range::<T, f64>()))
    }
}
