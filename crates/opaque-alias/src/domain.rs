use crate::{
    backend::KeyValueBackend,
    catalog::RouteCatalog,
    config::{AliasConfig, EntityType, UserRole},
    error::{ConfigError, Result},
    generator::IdGenerator,
    routes::RouteSecurity,
    store::MappingStore,
    validator::{RouteAccess, SecurityValidator},
};
use derive_getters::Getters;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// AliasManager wires the generator, the mapping store, route aliasing
/// and validation together from one [`AliasConfig`].
///
/// It is cheap to clone; clones share the same store.
#[derive(Debug, Clone, Getters)]
pub struct AliasManager {
    generator: IdGenerator,
    store: Arc<MappingStore>,
    routes: RouteSecurity,
    validator: SecurityValidator,
}

impl AliasManager {
    pub fn init(
        backend: Arc<dyn KeyValueBackend>,
        config: AliasConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let generator = IdGenerator::new(config.generator().clone());
        let store = Arc::new(MappingStore::new(backend, config.storage().clone()));
        let policy = Arc::new(config.access().clone());
        let catalog: Arc<RouteCatalog> = Arc::new(config.catalog().clone());
        let routes = RouteSecurity::new(store.clone(), generator.clone(), catalog, policy.clone());
        let validator =
            SecurityValidator::new(store.clone(), routes.clone(), policy, config.limits().clone());

        Ok(Self {
            generator,
            store,
            routes,
            validator,
        })
    }

    pub fn init_default_config(
        backend: Arc<dyn KeyValueBackend>,
    ) -> std::result::Result<Self, ConfigError> {
        Self::init(backend, AliasConfig::default())
    }

    // Generator

    pub fn generate_secure_id(&self, real_id: &str, entity_type: EntityType) -> Result<String> {
        self.generator.generate_secure_id(real_id, entity_type)
    }

    pub fn generate_secure_route(&self) -> Result<String> {
        self.generator.generate_secure_route()
    }

    pub fn is_valid_secure_id_format(&self, token: &str) -> bool {
        IdGenerator::is_valid_secure_id_format(token)
    }

    pub fn extract_entity_type(&self, token: &str) -> Option<EntityType> {
        IdGenerator::extract_entity_type(token)
    }

    /// Returns the existing alias of `real_id` or mints and stores a new one.
    ///
    /// Prefer this over `generate_secure_id` + `store_id_mapping`, which
    /// leaves the previous alias resolvable when called twice for the same id.
    pub fn get_or_create_secure_id(&self, real_id: &str, entity_type: EntityType) -> Result<String> {
        self.store.get_or_insert_id(real_id, || {
            self.generator.generate_secure_id(real_id, entity_type)
        })
    }

    // Store

    pub fn store_id_mapping(&self, real_id: &str, secure_id: &str) {
        self.store.store_id_mapping(real_id, secure_id)
    }

    pub fn get_secure_id_from_real(&self, real_id: &str) -> Option<String> {
        self.store.get_secure_id_from_real(real_id)
    }

    pub fn get_real_id_from_secure(&self, secure_id: &str) -> Option<String> {
        self.store.get_real_id_from_secure(secure_id)
    }

    /// Forgets id aliases, typically on sign-out. Route aliases survive.
    pub fn reset_mappings(&self) {
        self.store.reset_mappings()
    }

    // Routes

    pub fn get_secure_route(&self, real_route: &str) -> Result<String> {
        self.routes.get_secure_route(real_route)
    }

    pub fn get_real_route(&self, secure_route: &str) -> Option<String> {
        self.routes.get_real_route(secure_route)
    }

    pub fn initialize_secure_routes(&self) -> Result<BTreeMap<String, String>> {
        self.routes.initialize_secure_routes()
    }

    pub fn is_public_route(&self, path: &str) -> bool {
        self.routes.is_public_route(path)
    }

    pub fn is_valid_secure_route(&self, secure_route: &str) -> bool {
        self.routes.is_valid_secure_route(secure_route)
    }

    pub fn get_secured_routes_list(&self) -> Vec<String> {
        self.routes.get_secured_routes_list()
    }

    // Validation

    pub fn is_valid_secure_id(&self, token: &str) -> bool {
        self.validator.is_valid_secure_id(token)
    }

    pub fn is_valid_secure_order_id(&self, token: &str) -> bool {
        self.validator.is_valid_secure_order_id(token)
    }

    pub fn is_valid_secure_product_id(&self, token: &str) -> bool {
        self.validator.is_valid_secure_product_id(token)
    }

    pub fn validate_secure_route(&self, path: &str) -> bool {
        self.validator.validate_secure_route(path)
    }

    pub fn validate_route_access(&self, path: &str, role: Option<UserRole>) -> RouteAccess {
        self.validator.validate_route_access(path, role)
    }

    pub fn validate_url_params<I, K, V>(&self, params: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        V: AsRef<str>,
    {
        self.validator.validate_url_params(params)
    }

    pub fn validate_url_param_values(&self, params: &Map<String, Value>) -> bool {
        self.validator.validate_url_param_values(params)
    }

    pub fn sanitize_input(&self, value: &str) -> String {
        self.validator.sanitize_input(value)
    }

    pub fn sanitize_value(&self, value: &Value) -> String {
        self.validator.sanitize_value(value)
    }

    pub fn validate_and_sanitize_data(&self, data: &Value) -> Option<Map<String, Value>> {
        self.validator.validate_and_sanitize_data(data)
    }
}
