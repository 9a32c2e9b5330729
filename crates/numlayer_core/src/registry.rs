//! Per-type provider resolution and caching.

use crate::convert::{try_convert_with, ConverterTable};
use crate::enumeration::{self, Enumeration};
use crate::error::{ConversionResult, NumericError, Result, SynthesisError};
use crate::primitive;
use crate::synth::{self, Operator, OperatorCatalog, OperatorFn};
use crate::traits::{NumericProvider, Scalar};
use log::debug;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Use the hand-written providers for built-in numeric types.
    /// When off, built-ins go through operator synthesis like any other type.
    pub primitive_specializations: bool,
    /// Build providers from exposed operators for types with no registered
    /// or primitive provider.
    pub allow_synthesis: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            primitive_specializations: true,
            allow_synthesis: true,
        }
    }
}

/// Where a resolved provider came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    Registered,
    Primitive,
    Synthesized,
}

/// Shared handle to the provider resolved for `T`.
pub struct Provider<T: Scalar> {
    inner: Arc<dyn NumericProvider<T>>,
    kind: ProviderKind,
}

impl<T: Scalar> Provider<T> {
    pub fn new(inner: Arc<dyn NumericProvider<T>>, kind: ProviderKind) -> Self {
        Self { inner, kind }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Whether both handles point at the same provider instance.
    pub fn same_instance(&self, other: &Provider<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn as_arc(&self) -> &Arc<dyn NumericProvider<T>> {
        &self.inner
    }

    pub fn enumerate_from(&self, start: T) -> Result<Enumeration<'_, T>> {
        enumeration::enumerate_from(self.inner.as_ref(), start)
    }

    pub fn enumerate_from_to(&self, start: T, end: T) -> Result<Enumeration<'_, T>> {
        enumeration::enumerate_from_to(self.inner.as_ref(), start, end)
    }
}

impl<T: Scalar> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            kind: self.kind,
        }
    }
}

impl<T: Scalar> Deref for Provider<T> {
    type Target = dyn NumericProvider<T>;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl<T: Scalar> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("type", &type_name::<T>())
            .field("kind", &self.kind)
            .field("capabilities", &self.inner.capabilities())
            .finish()
    }
}

type Resolution<T> = Result<Provider<T>>;
type Cell<T> = OnceLock<Resolution<T>>;

/// Provider cache plus the operator catalog and converter table that
/// resolution and conversion consult.
///
/// Each element type gets one cell, created on first use and never removed
/// (short of [`clear`](Self::clear)). A cell is filled at most once, either
/// by [`set_default`](Self::set_default) or by the first
/// [`provider`](Self::provider) call; a failed resolution is cached like a
/// success so later callers get the same error without re-running discovery.
pub struct Registry {
    settings: RegistrySettings,
    cells: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    operators: OperatorCatalog,
    converters: ConverterTable,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_settings(RegistrySettings::default())
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            settings,
            cells: RwLock::new(HashMap::new()),
            operators: OperatorCatalog::new(),
            converters: ConverterTable::new(),
        }
    }

    /// The process-wide registry, with default settings.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn settings(&self) -> RegistrySettings {
        self.settings
    }

    pub fn operators(&self) -> &OperatorCatalog {
        &self.operators
    }

    pub fn converters(&self) -> &ConverterTable {
        &self.converters
    }

    /// Shorthand for exposing a batch of operators on `T`.
    pub fn expose<T: Scalar>(&self, operators: impl IntoIterator<Item = (Operator, OperatorFn<T>)>) {
        self.operators.expose_all(operators);
    }

    fn existing_cell<T: Scalar>(&self) -> Option<Arc<Cell<T>>> {
        let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
        cells
            .get(&TypeId::of::<T>())
            .and_then(|entry| Arc::clone(entry).downcast::<Cell<T>>().ok())
    }

    fn cell<T: Scalar>(&self) -> Arc<Cell<T>> {
        if let Some(cell) = self.existing_cell::<T>() {
            return cell;
        }
        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        let key = TypeId::of::<T>();
        if let Some(cell) = cells
            .get(&key)
            .and_then(|entry| Arc::clone(entry).downcast::<Cell<T>>().ok())
        {
            return cell;
        }
        let cell: Arc<Cell<T>> = Arc::new(OnceLock::new());
        cells.insert(key, cell.clone());
        cell
    }

    /// The provider for `T`, resolving it on first use.
    ///
    /// Resolution order: a provider registered with `set_default`, the
    /// primitive specialization for built-in types, then synthesis from the
    /// operators `T` exposed. Resolution runs outside the map lock and at
    /// most once per type; concurrent first callers wait for the winner.
    pub fn provider<T: Scalar>(&self) -> Result<Provider<T>> {
        let cell = self.cell::<T>();
        cell.get_or_init(|| self.resolve::<T>()).clone()
    }

    fn resolve<T: Scalar>(&self) -> Resolution<T> {
        let type_name = type_name::<T>();

        if self.settings.primitive_specializations {
            if let Some(provider) = primitive::specialization::<T>() {
                debug!("resolved primitive numeric provider for `{type_name}`");
                return Ok(Provider::new(provider, ProviderKind::Primitive));
            }
        }

        let synthesized = if self.settings.allow_synthesis {
            synth::synthesize::<T>(&self.operators)
        } else {
            Err(SynthesisError::Disabled { type_name })
        };

        match synthesized {
            Ok(provider) => {
                debug!(
                    "synthesized numeric provider for `{type_name}` with layers {:?}",
                    provider.capabilities()
                );
                Ok(Provider::new(Arc::new(provider), ProviderKind::Synthesized))
            }
            Err(cause) => {
                debug!("caching resolution failure for `{type_name}`: {cause}");
                Err(NumericError::Resolution { type_name, cause })
            }
        }
    }

    /// Registers `provider` as the provider for `T`.
    ///
    /// Fails with `AlreadyResolved` once `T` has been resolved or registered.
    pub fn set_default<T, P>(&self, provider: P) -> Result<()>
    where
        T: Scalar,
        P: NumericProvider<T> + 'static,
    {
        let type_name = type_name::<T>();
        let provider = Provider::new(Arc::new(provider), ProviderKind::Registered);
        self.cell::<T>()
            .set(Ok(provider))
            .map_err(|_| NumericError::AlreadyResolved { type_name })?;
        debug!("registered numeric provider for `{type_name}`");
        Ok(())
    }

    /// Whether `T`'s cell has been filled, successfully or not.
    pub fn is_resolved<T: Scalar>(&self) -> bool {
        self.existing_cell::<T>()
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Drops every cached provider and failure.
    pub fn clear(&mut self) {
        self.cells
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn try_convert<A: 'static, B: 'static>(&self, value: A) -> ConversionResult<B> {
        try_convert_with(value, &self.converters, &self.operators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, Capability};
    use crate::convert::Primitive;
    use crate::fixtures::{Meters, Opaque};
    use crate::synth::{cast_operators, integral_operators, ring_operators};
    use std::cmp::Ordering;
    use std::error::Error as _;

    fn assert_err_contains<T: fmt::Debug>(result: Result<T>, needle: &str) -> anyhow::Result<()> {
        match result {
            Ok(value) => anyhow::bail!("expected an error mentioning {needle:?}, got {value:?}"),
            Err(err) => {
                let message = err.to_string();
                anyhow::ensure!(
                    message.contains(needle),
                    "error {message:?} does not mention {needle:?}"
                );
                Ok(())
            }
        }
    }

    fn expose_meters(registry: &Registry) {
        registry.expose(ring_operators::<Meters>());
        registry.expose(integral_operators::<Meters>());
        registry.expose(cast_operators::<Meters>());
    }

    /// Saturating arithmetic on `i8`, standing in for a user override.
    struct SaturatingI8;

    impl NumericProvider<i8> for SaturatingI8 {
        fn capabilities(&self) -> Capabilities {
            Capabilities::of(&[Capability::Num])
        }
        fn compare(&self, x: &i8, y: &i8) -> Result<Ordering> {
            Ok(x.cmp(y))
        }
        fn from_i32(&self, n: i32) -> Result<i8> {
            Ok(n.clamp(i8::MIN.into(), i8::MAX.into()) as i8)
        }
        fn add(&self, x: &i8, y: &i8) -> Result<i8> {
            Ok(x.saturating_add(*y))
        }
        fn subtract(&self, x: &i8, y: &i8) -> Result<i8> {
            Ok(x.saturating_sub(*y))
        }
        fn multiply(&self, x: &i8, y: &i8) -> Result<i8> {
            Ok(x.saturating_mul(*y))
        }
    }

    #[test]
    fn repeated_lookups_return_the_same_instance() -> anyhow::Result<()> {
        let registry = Registry::new();
        assert!(!registry.is_resolved::<i32>());
        let first = registry.provider::<i32>()?;
        let second = registry.provider::<i32>()?;
        assert!(first.same_instance(&second));
        assert_eq!(first.kind(), ProviderKind::Primitive);
        assert!(registry.is_resolved::<i32>());
        assert_eq!(first.add(&2, &3)?, 5);
        Ok(())
    }

    #[test]
    fn concurrent_first_lookups_agree_on_one_instance() -> anyhow::Result<()> {
        let registry = Registry::new();
        expose_meters(&registry);
        let handles: Vec<Provider<Meters>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.provider::<Meters>()))
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .collect::<Result<_>>()
        })?;
        let first = &handles[0];
        assert_eq!(first.kind(), ProviderKind::Synthesized);
        assert!(handles.iter().all(|handle| handle.same_instance(first)));
        Ok(())
    }

    #[test]
    fn synthesized_provider_serves_user_types() -> anyhow::Result<()> {
        let registry = Registry::new();
        expose_meters(&registry);
        let meters = registry.provider::<Meters>()?;
        assert!(meters.supports(Capability::Integral));
        assert_eq!(meters.modulus(&Meters(-7), &Meters(3))?, Meters(2));
        let walk: Vec<Meters> = meters
            .enumerate_from_to(Meters(1), Meters(3))?
            .collect::<Result<_>>()?;
        assert_eq!(walk, vec![Meters(1), Meters(2), Meters(3)]);
        Ok(())
    }

    #[test]
    fn isolated_registry_builds_literals_from_its_own_operators() -> anyhow::Result<()> {
        let registry = Registry::new();
        expose_meters(&registry);
        let meters = registry.provider::<Meters>()?;
        assert!(!Registry::global().operators().contains::<Meters>(Operator::FromInteger));

        assert_eq!(meters.from_primitive(Primitive::Signed(5))?, Meters(5));
        assert_eq!(meters.from_primitive(Primitive::Float(-2.7))?, Meters(-2));
        assert_eq!(
            meters.from_primitive(Primitive::Unsigned(5_000_000_000))?,
            Meters(5_000_000_000)
        );
        assert_eq!(
            meters.from_primitive(Primitive::Signed(-(1 << 40) - 3))?,
            Meters(-(1 << 40) - 3)
        );
        assert_err_contains(
            meters.from_primitive(Primitive::Float(f64::NAN)),
            "does not fit",
        )?;
        Ok(())
    }

    #[test]
    fn resolution_failure_is_cached_and_explains_itself() -> anyhow::Result<()> {
        let mut registry = Registry::new();
        assert_err_contains(registry.provider::<Meters>(), "`Add`")?;

        // exposing operators later does not revive a cached failure
        expose_meters(&registry);
        let err = registry.provider::<Meters>().unwrap_err();
        assert!(matches!(
            err,
            NumericError::Resolution {
                cause: SynthesisError::MissingOperator {
                    operator: Operator::Add,
                    ..
                },
                ..
            }
        ));
        assert!(err.source().is_some());
        assert!(registry.is_resolved::<Meters>());

        registry.clear();
        assert!(!registry.is_resolved::<Meters>());
        assert!(registry.provider::<Meters>().is_ok());
        Ok(())
    }

    #[test]
    fn type_with_no_arithmetic_gets_a_descriptive_error() -> anyhow::Result<()> {
        let registry = Registry::new();
        assert_err_contains(registry.provider::<Opaque>(), "Opaque")?;
        assert_err_contains(registry.provider::<Opaque>(), "exposes no `Add` operator")?;
        Ok(())
    }

    #[test]
    fn registration_before_resolution_wins() -> anyhow::Result<()> {
        let registry = Registry::new();
        registry.set_default::<i8, _>(SaturatingI8)?;
        let provider = registry.provider::<i8>()?;
        assert_eq!(provider.kind(), ProviderKind::Registered);
        assert_eq!(provider.add(&120, &100)?, i8::MAX);
        assert_eq!(provider.negate(&i8::MIN)?, i8::MAX);
        Ok(())
    }

    #[test]
    fn registration_after_resolution_fails_loudly() -> anyhow::Result<()> {
        let registry = Registry::new();
        let before = registry.provider::<i8>()?;
        let err = registry.set_default::<i8, _>(SaturatingI8).unwrap_err();
        assert!(matches!(err, NumericError::AlreadyResolved { .. }));
        assert!(registry.provider::<i8>()?.same_instance(&before));

        registry.set_default::<i16, _>(primitive::I16Provider)?;
        assert_err_contains(
            registry.set_default::<i16, _>(primitive::I16Provider),
            "already resolved",
        )?;
        Ok(())
    }

    #[test]
    fn disabling_specializations_routes_builtins_through_synthesis() -> anyhow::Result<()> {
        let registry = Registry::with_settings(RegistrySettings {
            primitive_specializations: false,
            ..RegistrySettings::default()
        });
        assert_err_contains(registry.provider::<u32>(), "no numeric provider")?;

        registry.expose(ring_operators::<i64>());
        registry.expose(integral_operators::<i64>());
        registry.expose(cast_operators::<i64>());
        let provider = registry.provider::<i64>()?;
        assert_eq!(provider.kind(), ProviderKind::Synthesized);
        assert_eq!(provider.div_mod(&-7, &2)?, (-4, 1));
        Ok(())
    }

    #[test]
    fn disabling_synthesis_leaves_only_known_providers() -> anyhow::Result<()> {
        let registry = Registry::with_settings(RegistrySettings {
            allow_synthesis: false,
            ..RegistrySettings::default()
        });
        expose_meters(&registry);
        assert!(matches!(
            registry.provider::<Meters>(),
            Err(NumericError::Resolution {
                cause: SynthesisError::Disabled { .. },
                ..
            })
        ));
        assert_eq!(registry.provider::<f64>()?.kind(), ProviderKind::Primitive);
        Ok(())
    }

    #[test]
    fn registry_conversion_uses_its_own_tables() {
        let registry = Registry::new();
        registry.converters().register_from::<bool, Meters>();
        assert_eq!(registry.try_convert::<bool, Meters>(false), Ok(Meters(0)));
        assert!(Registry::new().try_convert::<bool, Meters>(false).is_err());
    }
}
