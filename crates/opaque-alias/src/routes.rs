use crate::{
    catalog::RouteCatalog,
    config::AccessPolicy,
    error::{Error, Result},
    generator::IdGenerator,
    store::MappingStore,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lazily assigns stable aliases to the routes of a [`RouteCatalog`].
#[derive(Debug, Clone)]
pub struct RouteSecurity {
    store: Arc<MappingStore>,
    generator: IdGenerator,
    catalog: Arc<RouteCatalog>,
    policy: Arc<AccessPolicy>,
}

impl RouteSecurity {
    pub fn new(
        store: Arc<MappingStore>,
        generator: IdGenerator,
        catalog: Arc<RouteCatalog>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            store,
            generator,
            catalog,
            policy,
        }
    }

    /// Returns the alias of `real_route`, creating it on first use.
    ///
    /// Works for any absolute route, not only catalog entries. Once created
    /// the alias never changes. A route that does not start with `/` is
    /// rejected with [`Error::InvalidFormat`].
    pub fn get_secure_route(&self, real_route: &str) -> Result<String> {
        if !real_route.starts_with('/') {
            return Err(Error::InvalidFormat);
        }
        self.store
            .get_or_insert_route(real_route, || self.generator.generate_secure_route())
    }

    pub fn get_real_route(&self, secure_route: &str) -> Option<String> {
        self.store.get_real_route_from_secure(secure_route)
    }

    /// Makes sure every catalog route has an alias and returns them all.
    ///
    /// Only routes without an alias cause a write, so repeated calls are
    /// cheap and return the same map.
    pub fn initialize_secure_routes(&self) -> Result<BTreeMap<String, String>> {
        let mut aliases = BTreeMap::new();
        for path in self.catalog.paths() {
            let secure = self.get_secure_route(path)?;
            aliases.insert(path.to_string(), secure);
        }
        tracing::debug!(routes = aliases.len(), "Route aliases initialized");
        Ok(aliases)
    }

    pub fn is_public_route(&self, path: &str) -> bool {
        self.policy.is_public(path)
    }

    pub fn is_valid_secure_route(&self, secure_route: &str) -> bool {
        self.get_real_route(secure_route).is_some()
    }

    pub fn get_secured_routes_list(&self) -> Vec<String> {
        self.catalog.paths().map(str::to_string).collect()
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::catalog::{CatalogRoute, RouteSection};

    fn routes_with(catalog: RouteCatalog) -> (Arc<MappingStore>, RouteSecurity) {
        let store = Arc::new(MappingStore::with_default_keys(Arc::new(MemoryBackend::new())));
        let routes = RouteSecurity::new(
            store.clone(),
            IdGenerator::default(),
            Arc::new(catalog),
            Arc::new(AccessPolicy::default()),
        );
        (store, routes)
    }

    #[test]
    fn test_get_secure_route_is_stable() {
        let (_, routes) = routes_with(RouteCatalog::default());
        let first = routes.get_secure_route("/admin").unwrap();
        let second = routes.get_secure_route("/admin").unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with('/'));
        assert_eq!(routes.get_real_route(&first).as_deref(), Some("/admin"));
        assert!(routes.is_valid_secure_route(&first));
    }

    #[test]
    fn test_get_secure_route_rejects_relative_routes() {
        let (store, routes) = routes_with(RouteCatalog::default());
        assert!(matches!(routes.get_secure_route("admin"), Err(Error::InvalidFormat)));
        assert!(matches!(routes.get_secure_route(""), Err(Error::InvalidFormat)));
        assert_eq!(store.stats().routes, 0);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (store, routes) = routes_with(RouteCatalog::default());
        let first = routes.initialize_secure_routes().unwrap();
        let second = routes.initialize_secure_routes().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), routes.catalog().len());
        assert_eq!(store.stats().routes, routes.catalog().len());
        assert_eq!(store.stats().reverse, routes.catalog().len());
    }

    #[test]
    fn test_initialize_keeps_existing_aliases() {
        let (store, routes) = routes_with(RouteCatalog::default());
        store.store_route_mapping("/faq", "/kept");

        let aliases = routes.initialize_secure_routes().unwrap();
        assert_eq!(aliases.get("/faq").map(String::as_str), Some("/kept"));
    }

    #[test]
    fn test_unknown_alias_is_invalid() {
        let (_, routes) = routes_with(RouteCatalog::default());
        assert!(!routes.is_valid_secure_route("/nothing-here"));
        assert_eq!(routes.get_real_route("nothing-here"), None);
    }

    #[test]
    fn test_secured_routes_list_follows_catalog() {
        let catalog = RouteCatalog::new(vec![
            CatalogRoute::new("/admin", RouteSection::Admin),
            CatalogRoute::new("/contact", RouteSection::Info),
        ])
        .unwrap();
        let (_, routes) = routes_with(catalog);
        assert_eq!(routes.get_secured_routes_list(), vec!["/admin", "/contact"]);
    }

    #[test]
    fn test_public_routes() {
        let (_, routes) = routes_with(RouteCatalog::default());
        assert!(routes.is_public_route("/products"));
        assert!(routes.is_public_route("/cart"));
        assert!(!routes.is_public_route("/admin/produits"));
    }
}
