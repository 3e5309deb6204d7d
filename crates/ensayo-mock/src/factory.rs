//! Creates mock surfaces from targets.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::contract::{Component, ComponentLoader, Contract, TargetIdentity, TargetRef};
use crate::error::{MockError, Result};
use crate::surface::{MockSurface, SurfaceKind};

/// Entry point for mocks, stubs and spies.
///
/// Named targets need a [`ComponentLoader`]; everything else works on a
/// default factory.
#[derive(Clone, Default)]
pub struct MockFactory {
    loader: Option<Arc<dyn ComponentLoader>>,
}

impl MockFactory {
    /// Creates a factory without a loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the loader used for [`TargetRef::Named`].
    #[must_use]
    pub fn with_loader(mut self, loader: impl ComponentLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Mock mirroring the target's contract. Unstubbed methods return
    /// `null`; a component target stays available to `call_through`.
    ///
    /// # Errors
    /// Returns [`MockError::Load`] if a named target cannot be resolved.
    pub fn create_mock(&self, target: impl Into<TargetRef>) -> Result<MockSurface> {
        let surface = match target.into() {
            TargetRef::Contract(contract) => {
                let name = contract.name().to_string();
                MockSurface::new(
                    SurfaceKind::Mock,
                    TargetIdentity::Contract(name),
                    Some(method_set(&contract)),
                    None,
                    None,
                )
            }
            target => {
                let component = self.resolve(target)?;
                let contract = component.contract();
                MockSurface::new(
                    SurfaceKind::Mock,
                    TargetIdentity::Component(contract.name().to_string()),
                    Some(method_set(&contract)),
                    Some(component),
                    None,
                )
            }
        };
        Ok(surface)
    }

    /// Free-standing stub accepting any method name.
    #[must_use]
    pub fn create_stub(&self) -> MockSurface {
        MockSurface::new(SurfaceKind::Stub, TargetIdentity::Anonymous, None, None, None)
    }

    /// Spy over a live target. Every call is logged; unstubbed calls
    /// return the original's real result.
    ///
    /// # Errors
    /// - [`MockError::NoOriginal`] for a contract-only target
    /// - [`MockError::UnknownMethod`] if `method` is not in the contract
    /// - [`MockError::Load`] if a named target cannot be resolved
    pub fn create_spy(&self, target: impl Into<TargetRef>, method: &str) -> Result<MockSurface> {
        let target = target.into();
        if let TargetRef::Contract(contract) = &target {
            return Err(MockError::no_original(contract.name(), method));
        }
        let component = self.resolve(target)?;
        let contract = component.contract();
        if !contract.has_method(method) {
            return Err(MockError::unknown_method(contract.name(), method));
        }
        Ok(MockSurface::new(
            SurfaceKind::Spy,
            TargetIdentity::Component(contract.name().to_string()),
            Some(method_set(&contract)),
            Some(component),
            Some(method.to_string()),
        ))
    }

    /// Surface with the contract's shape and no behavior.
    #[must_use]
    pub fn create_empty_mock(&self, contract: &Contract) -> MockSurface {
        MockSurface::new(
            SurfaceKind::Empty,
            TargetIdentity::Contract(contract.name().to_string()),
            Some(method_set(contract)),
            None,
            None,
        )
    }

    fn resolve(&self, target: TargetRef) -> Result<Arc<dyn Component>> {
        match target {
            TargetRef::Component(component) => Ok(component),
            TargetRef::Named(name) => {
                let loader = self
                    .loader
                    .as_ref()
                    .ok_or_else(|| ensayo_core::LoadError::failed(&name, "no component loader configured"))?;
                let component = loader.load_component(&name)?;
                tracing::debug!(target_name = %name, "mock target loaded");
                Ok(component)
            }
            TargetRef::Contract(contract) => Err(MockError::no_original(contract.name(), "")),
        }
    }
}

impl fmt::Debug for MockFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockFactory")
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

fn method_set(contract: &Contract) -> BTreeSet<String> {
    contract.methods().clone()
}
