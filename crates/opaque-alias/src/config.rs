use crate::catalog::RouteCatalog;
use crate::error::ConfigError;
use derive_getters::Getters;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use strum::{IntoEnumIterator, IntoStaticStr};

/// Semantic category of the value an alias stands in for.
///
/// The lowercase name is embedded as the first segment of every generic
/// token. `Order` tokens carry no marker at all.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Product,
    Admin,
    Profile,
    Orders,
    Order,
}

lazy_static! {
    static ref ENTITY_TYPE_VARIANTS: Vec<EntityType> = EntityType::iter().collect();
}

impl EntityType {
    pub fn variants() -> &'static [EntityType] {
        &ENTITY_TYPE_VARIANTS
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Role of the user presenting a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    random_part_length: usize,
    route_length: usize,
}

impl GeneratorConfig {
    pub const MIN_LENGTH: usize = 8;
    pub const MAX_LENGTH: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Length of the random middle segment of generic tokens.
    pub fn with_random_part_length(mut self, len: usize) -> std::result::Result<Self, ConfigError> {
        Self::check_length(len)?;
        self.random_part_length = len;
        Ok(self)
    }

    /// Length of the random path segment of route aliases (leading '/' excluded).
    pub fn with_route_length(mut self, len: usize) -> std::result::Result<Self, ConfigError> {
        Self::check_length(len)?;
        self.route_length = len;
        Ok(self)
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), ConfigError> {
        Self::check_length(self.random_part_length)?;
        Self::check_length(self.route_length)
    }

    fn check_length(len: usize) -> std::result::Result<(), ConfigError> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(ConfigError::InvalidLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            random_part_length: 16,
            route_length: 24,
        }
    }
}

/// Route access rules applied by the validator.
///
/// Public prefixes are never aliased. Everything under `admin_prefix`
/// needs the admin role, and the authenticated prefixes need a signed-in
/// user.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPolicy {
    public_prefixes: Vec<String>,
    admin_prefix: String,
    authenticated_prefixes: Vec<String>,
    order_id_prefix: String,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        self.public_prefixes.push(non_empty(prefix.into())?);
        Ok(self)
    }

    pub fn with_authenticated_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        self.authenticated_prefixes.push(non_empty(prefix.into())?);
        Ok(self)
    }

    pub fn with_admin_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        self.admin_prefix = non_empty(prefix.into())?;
        Ok(self)
    }

    pub fn with_order_id_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        self.order_id_prefix = non_empty(prefix.into())?;
        Ok(self)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn is_admin(&self, real_route: &str) -> bool {
        real_route.starts_with(self.admin_prefix.as_str())
    }

    pub fn requires_auth(&self, real_route: &str) -> bool {
        self.authenticated_prefixes
            .iter()
            .any(|p| real_route.starts_with(p.as_str()))
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), ConfigError> {
        // An empty prefix would match every path.
        let all = self
            .public_prefixes
            .iter()
            .chain(self.authenticated_prefixes.iter())
            .chain([&self.admin_prefix, &self.order_id_prefix]);
        for prefix in all {
            if prefix.is_empty() {
                return Err(ConfigError::EmptyString);
            }
        }
        Ok(())
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            public_prefixes: owned(&[
                "/products",
                "/product/",
                "/categories",
                "/search",
                "/login",
                "/cart",
            ]),
            admin_prefix: "/admin".to_string(),
            authenticated_prefixes: owned(&[
                "/profile",
                "/orders",
                "/order/",
                "/checkout",
                "/wishlist",
            ]),
            order_id_prefix: "ORD-".to_string(),
        }
    }
}

/// Size limits for untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    max_param_length: usize,
    max_input_length: usize,
}

impl InputLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_param_length(mut self, len: usize) -> std::result::Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::EmptyString);
        }
        self.max_param_length = len;
        Ok(self)
    }

    pub fn with_max_input_length(mut self, len: usize) -> std::result::Result<Self, ConfigError> {
        if len == 0 {
            return Err(ConfigError::EmptyString);
        }
        self.max_input_length = len;
        Ok(self)
    }
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_param_length: 100,
            max_input_length: 1000,
        }
    }
}

/// Names of the three records a mapping store persists.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    id_mappings: String,
    reverse_mappings: String,
    route_mappings: String,
}

impl StorageKeys {
    pub fn new(
        id_mappings: impl Into<String>,
        reverse_mappings: impl Into<String>,
        route_mappings: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        let keys = Self {
            id_mappings: id_mappings.into(),
            reverse_mappings: reverse_mappings.into(),
            route_mappings: route_mappings.into(),
        };
        keys.validate()?;
        Ok(keys)
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), ConfigError> {
        let (a, b, c) = (&self.id_mappings, &self.reverse_mappings, &self.route_mappings);
        if a.is_empty() || b.is_empty() || c.is_empty() {
            return Err(ConfigError::EmptyString);
        }
        if a == b || b == c || a == c {
            return Err(ConfigError::DuplicateStorageKey);
        }
        Ok(())
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            id_mappings: "secureIdMappings".to_string(),
            reverse_mappings: "reverseIdMappings".to_string(),
            route_mappings: "secureRouteMappings".to_string(),
        }
    }
}

/// Everything an [`AliasManager`](crate::AliasManager) needs, loadable
/// from a JSON document. Missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    generator: GeneratorConfig,
    access: AccessPolicy,
    limits: InputLimits,
    storage: StorageKeys,
    catalog: RouteCatalog,
}

impl AliasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(document: &str) -> std::result::Result<Self, ConfigError> {
        let config: AliasConfig =
            serde_json::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_access(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }

    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_storage(mut self, storage: StorageKeys) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_catalog(mut self, catalog: RouteCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.generator.validate()?;
        self.access.validate()?;
        self.storage.validate()?;
        if self.limits.max_param_length == 0 || self.limits.max_input_length == 0 {
            return Err(ConfigError::EmptyString);
        }
        Ok(())
    }
}

fn non_empty(value: String) -> std::result::Result<String, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::EmptyString);
    }
    Ok(value)
}
