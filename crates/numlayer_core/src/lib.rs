//! The `numlayer_core` crate resolves, caches and serves numeric providers:
//! one object per element type `T` that carries every arithmetic operation
//! a generic algorithm needs, from comparison up to IEEE predicates.
//!
//! Key components:
//! - **Traits**: `Scalar` (element type bound) and `NumericProvider` (the layered operation set).
//! - **Primitive**: hand-written providers for the built-in integer and float types.
//! - **Synth**: providers built from the operators a user type exposes.
//! - **Registry**: per-type resolution, cached once, with explicit overrides.
//! - **Convert**: the fallible conversion bridge between numeric types.

pub mod capability;
pub mod convert;
pub mod enumeration;
pub mod error;
pub mod primitive;
pub mod registry;
pub mod synth;
pub mod traits;

#[cfg(test)]
mod fixtures;

pub use capability::{Capabilities, Capability};
pub use convert::{ConverterTable, Primitive};
pub use enumeration::Enumeration;
pub use error::{ConversionError, ConversionResult, NumericError, Result, SynthesisError};
pub use registry::{Provider, ProviderKind, Registry, RegistrySettings};
pub use synth::{Operator, OperatorCatalog, OperatorFn, Signature};
pub use traits::{NumericProvider, Scalar};

/// The provider for `T` from the process-wide registry.
pub fn default<T: Scalar>() -> Result<Provider<T>> {
    Registry::global().provider::<T>()
}

/// Registers `provider` for `T` in the process-wide registry.
/// Must happen before anything resolves `T`.
pub fn set_default<T, P>(provider: P) -> Result<()>
where
    T: Scalar,
    P: NumericProvider<T> + 'static,
{
    Registry::global().set_default::<T, P>(provider)
}

pub fn try_convert<A: 'static, B: 'static>(value: A) -> ConversionResult<B> {
    Registry::global().try_convert(value)
}

/// Makes `T`'s operators discoverable by the process-wide registry.
pub fn expose<T: Scalar>(operators: impl IntoIterator<Item = (Operator, OperatorFn<T>)>) {
    Registry::global().expose(operators);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Dual;
    use crate::synth::{cast_operators, fractional_operators, ring_operators};

    #[test]
    fn process_wide_entry_points_share_one_registry() -> anyhow::Result<()> {
        expose(ring_operators::<Dual>());
        expose(fractional_operators::<Dual>());
        expose(cast_operators::<Dual>());

        let dual = default::<Dual>()?;
        assert!(dual.same_instance(&default::<Dual>()?));
        assert!(dual.supports(Capability::RealFloat));
        assert_eq!(dual.from_i32(2)?, Dual::constant(2.0));
        assert_eq!(try_convert::<u16, Dual>(7), Ok(Dual::constant(7.0)));
        assert_eq!(dual.to_f64(&Dual::new(1.25, 3.0))?, 1.25);
        Ok(())
    }

    #[test]
    fn builtin_defaults_resolve_without_setup() -> anyhow::Result<()> {
        let p = default::<u64>()?;
        assert_eq!(p.kind(), ProviderKind::Primitive);
        assert_eq!(p.gcd(&84, &36)?, 12);
        assert_eq!(try_convert::<&'static str, u64>("18"), Ok(18));
        Ok(())
    }

    #[test]
    fn late_registration_on_the_global_registry_fails() -> anyhow::Result<()> {
        default::<i128>()?;
        let result = set_default::<i128, _>(primitive::I128Provider);
        assert!(matches!(result, Err(NumericError::AlreadyResolved { .. })));
        Ok(())
    }
}
