//! Component contracts and target resolution.
//!
//! A [`Component`] is anything a spec may want to replace: it exposes a
//! [`Contract`] (its name and method set) and dynamic dispatch over
//! `serde_json::Value` arguments.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use ensayo_core::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape of a component: its name and the methods it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    name: String,
    methods: BTreeSet<String>,
}

impl Contract {
    /// Creates a contract.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    /// Contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method names, sorted.
    #[must_use]
    pub fn methods(&self) -> &BTreeSet<String> {
        &self.methods
    }

    /// Returns true if the contract declares `method`.
    #[must_use]
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains(method)
    }
}

/// A replaceable collaborator.
pub trait Component: Send + Sync {
    /// The component's contract.
    fn contract(&self) -> Contract;

    /// Invokes `method` with `args`. Errors are plain messages.
    fn invoke(&self, method: &str, args: &[Value]) -> std::result::Result<Value, String>;
}

/// Resolves qualified component names.
pub trait ComponentLoader: Send + Sync {
    /// Loads the component registered under `qualified_name`.
    ///
    /// # Errors
    /// Returns [`LoadError`] when the name is unknown or construction fails.
    fn load_component(&self, qualified_name: &str) -> std::result::Result<Arc<dyn Component>, LoadError>;
}

impl<F> ComponentLoader for F
where
    F: Fn(&str) -> std::result::Result<Arc<dyn Component>, LoadError> + Send + Sync,
{
    fn load_component(&self, qualified_name: &str) -> std::result::Result<Arc<dyn Component>, LoadError> {
        self(qualified_name)
    }
}

type Constructor = Arc<dyn Fn() -> std::result::Result<Arc<dyn Component>, String> + Send + Sync>;

/// Name-to-constructor loader.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `qualified_name`, replacing any
    /// previous one.
    pub fn register<F>(&mut self, qualified_name: impl Into<String>, constructor: F)
    where
        F: Fn() -> std::result::Result<Arc<dyn Component>, String> + Send + Sync + 'static,
    {
        self.constructors.insert(qualified_name.into(), Arc::new(constructor));
    }

    /// Registers a ready-made instance that is shared by every load.
    pub fn register_instance(&mut self, qualified_name: impl Into<String>, component: Arc<dyn Component>) {
        self.register(qualified_name, move || Ok(Arc::clone(&component)));
    }

    /// Returns true if `qualified_name` is registered.
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.constructors.contains_key(qualified_name)
    }
}

impl ComponentLoader for ComponentRegistry {
    fn load_component(&self, qualified_name: &str) -> std::result::Result<Arc<dyn Component>, LoadError> {
        let constructor = self
            .constructors
            .get(qualified_name)
            .ok_or_else(|| LoadError::not_found(qualified_name))?;
        constructor().map_err(|reason| LoadError::failed(qualified_name, reason))
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry").field("components", &names).finish()
    }
}

/// What a mock stands in for.
#[derive(Clone)]
pub enum TargetRef {
    /// A live implementation.
    Component(Arc<dyn Component>),
    /// A contract with no implementation.
    Contract(Contract),
    /// A qualified name resolved through a [`ComponentLoader`].
    Named(String),
}

impl TargetRef {
    /// Wraps a concrete component.
    pub fn component<C: Component + 'static>(component: C) -> Self {
        Self::Component(Arc::new(component))
    }

    /// Refers to a component by qualified name.
    #[must_use]
    pub fn named(qualified_name: impl Into<String>) -> Self {
        Self::Named(qualified_name.into())
    }
}

impl From<Contract> for TargetRef {
    fn from(contract: Contract) -> Self {
        Self::Contract(contract)
    }
}

impl From<Arc<dyn Component>> for TargetRef {
    fn from(component: Arc<dyn Component>) -> Self {
        Self::Component(component)
    }
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(c) => f.debug_tuple("Component").field(&c.contract().name()).finish(),
            Self::Contract(c) => f.debug_tuple("Contract").field(c).finish(),
            Self::Named(n) => f.debug_tuple("Named").field(n).finish(),
        }
    }
}

/// Identity of the thing a surface replaces, for messages and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum TargetIdentity {
    /// Free-standing stub.
    Anonymous,
    /// Built from a contract only.
    Contract(String),
    /// Backed by a component.
    Component(String),
}

impl TargetIdentity {
    /// Display name of the target.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Anonymous => "stub",
            Self::Contract(name) | Self::Component(name) => name,
        }
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
