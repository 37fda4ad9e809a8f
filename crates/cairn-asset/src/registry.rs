//! Configurator registry for path-scoped group/label assignment

use cairn_core::{path, CairnError, Result};
use once_cell::sync::OnceCell;
use std::fmt;

/// Which group an assignment targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTarget {
    /// Exact group name, optionally created from the first template when missing
    Named { name: String, force_create: bool },
    /// First group whose name contains the keyword
    Keyword(String),
}

/// Group, labels and address prefix a configurator chose for one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDecision {
    pub group: GroupTarget,
    pub labels: Vec<String>,
    pub address_prefix: Option<String>,
}

impl AssignmentDecision {
    /// Target an existing group by exact name
    pub fn to_group(name: impl Into<String>) -> Self {
        Self {
            group: GroupTarget::Named {
                name: name.into(),
                force_create: false,
            },
            labels: Vec::new(),
            address_prefix: None,
        }
    }

    /// Target the first group whose name contains `keyword`
    pub fn to_group_matching(keyword: impl Into<String>) -> Self {
        Self {
            group: GroupTarget::Keyword(keyword.into()),
            labels: Vec::new(),
            address_prefix: None,
        }
    }

    /// Create the named group if it does not exist yet
    pub fn create_group(mut self) -> Self {
        if let GroupTarget::Named { force_create, .. } = &mut self.group {
            *force_create = true;
        }
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_address_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.address_prefix = Some(prefix.into());
        self
    }
}

/// What a configurator decided for an asset path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Assign(AssignmentDecision),
    /// Leave the asset alone
    Skip,
    /// The asset breaks the naming convention this configurator expects
    Reject(String),
}

/// Assigns distribution settings to assets under one path prefix
pub trait AssetConfigurator: Send + Sync {
    fn configure(&self, asset_path: &str) -> Decision;
}

type ConfiguratorFactory = Box<dyn Fn() -> Box<dyn AssetConfigurator> + Send + Sync>;

/// A path prefix and the configurator responsible for it
pub struct ConfiguratorBinding {
    prefix: String,
    configurator: Box<dyn AssetConfigurator>,
}

impl ConfiguratorBinding {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn configurator(&self) -> &dyn AssetConfigurator {
        self.configurator.as_ref()
    }
}

impl fmt::Debug for ConfiguratorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguratorBinding")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Registry mapping path prefixes to configurators
///
/// Configurators are registered as factories and instantiated once, on the
/// first lookup. From then on the registry is sealed. Lookup order is longest
/// prefix first; prefixes of equal length keep their registration order.
#[derive(Default)]
pub struct ConfiguratorRegistry {
    factories: Vec<(String, ConfiguratorFactory)>,
    bindings: OnceCell<Vec<ConfiguratorBinding>>,
}

impl ConfiguratorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configurator factory for every asset path containing `prefix`
    pub fn register<F, C>(&mut self, prefix: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: AssetConfigurator + 'static,
    {
        let prefix = path::normalize(&prefix.into());
        if self.bindings.get().is_some() {
            return Err(CairnError::ConfigError(format!(
                "cannot register \"{}\": the configurator registry is already in use",
                prefix
            )));
        }
        if self.factories.iter().any(|(p, _)| *p == prefix) {
            return Err(CairnError::DuplicateConfigurator(prefix));
        }

        let factory: ConfiguratorFactory =
            Box::new(move || Box::new(factory()) as Box<dyn AssetConfigurator>);
        self.factories.push((prefix, factory));
        Ok(())
    }

    /// All bindings in lookup order, instantiating configurators on first use
    pub fn bindings(&self) -> &[ConfiguratorBinding] {
        self.bindings.get_or_init(|| {
            let mut bindings: Vec<ConfiguratorBinding> = self
                .factories
                .iter()
                .map(|(prefix, factory)| ConfiguratorBinding {
                    prefix: prefix.clone(),
                    configurator: factory(),
                })
                .collect();
            // stable: equal lengths keep registration order
            bindings.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
            bindings
        })
    }

    /// The first binding whose prefix is contained in the asset path
    pub fn resolve_binding(&self, asset_path: &str) -> Option<&ConfiguratorBinding> {
        let normalized = path::normalize(asset_path);
        self.bindings()
            .iter()
            .find(|b| normalized.contains(b.prefix.as_str()))
    }

    /// The configurator responsible for an asset path
    pub fn resolve(&self, asset_path: &str) -> Option<&dyn AssetConfigurator> {
        self.resolve_binding(asset_path).map(|b| b.configurator())
    }

    /// Registered prefixes in lookup order
    pub fn prefixes(&self) -> Vec<&str> {
        self.bindings().iter().map(|b| b.prefix()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ConfiguratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefixes: Vec<&str> = self.factories.iter().map(|(p, _)| p.as_str()).collect();
        f.debug_struct("ConfiguratorRegistry")
            .field("prefixes", &prefixes)
            .field("sealed", &self.bindings.get().is_some())
            .finish()
    }
}
