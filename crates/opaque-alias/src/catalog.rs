//! The catalog of application routes that are served behind aliases.
//!
//! The catalog is plain data. The compiled-in default describes the
//! storefront; deployments can ship their own list through
//! [`AliasConfig::from_json`](crate::AliasConfig::from_json).

use crate::error::ConfigError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, IntoStaticStr};

/// Which part of the application a route belongs to.
///
/// Routes in the `Admin` section are restricted to administrators even when
/// they fall outside the policy's admin prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RouteSection {
    Admin,
    Account,
    Auth,
    Catalog,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRoute {
    pub path: String,
    pub section: RouteSection,
}

impl CatalogRoute {
    pub fn new(path: impl Into<String>, section: RouteSection) -> Self {
        Self {
            path: path.into(),
            section,
        }
    }
}

/// Ordered, duplicate-free list of real route paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogRoute>", into = "Vec<CatalogRoute>")]
pub struct RouteCatalog {
    routes: Vec<CatalogRoute>,
}

const DEFAULT_ROUTES: &[(&str, RouteSection)] = &[
    ("/admin", RouteSection::Admin),
    ("/admin/produits", RouteSection::Admin),
    ("/admin/commandes", RouteSection::Admin),
    ("/admin/utilisateurs", RouteSection::Admin),
    ("/admin/categories", RouteSection::Admin),
    ("/admin/promotions", RouteSection::Admin),
    ("/admin/statistiques", RouteSection::Admin),
    ("/admin/parametres", RouteSection::Admin),
    ("/profile", RouteSection::Account),
    ("/orders", RouteSection::Account),
    ("/checkout", RouteSection::Account),
    ("/wishlist", RouteSection::Account),
    ("/register", RouteSection::Auth),
    ("/forgot-password", RouteSection::Auth),
    ("/reset-password", RouteSection::Auth),
    ("/order/:orderId", RouteSection::Account),
    ("/flash-sale/:saleId", RouteSection::Catalog),
    ("/promotions", RouteSection::Catalog),
    ("/nouveautes", RouteSection::Catalog),
    ("/about", RouteSection::Info),
    ("/contact", RouteSection::Info),
    ("/faq", RouteSection::Info),
    ("/conditions", RouteSection::Info),
    ("/privacy", RouteSection::Info),
];

lazy_static! {
    static ref DEFAULT_CATALOG: RouteCatalog = RouteCatalog {
        routes: DEFAULT_ROUTES
            .iter()
            .map(|(path, section)| CatalogRoute::new(*path, *section))
            .collect(),
    };
}

impl RouteCatalog {
    pub fn new(routes: Vec<CatalogRoute>) -> std::result::Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if route.path.is_empty() {
                return Err(ConfigError::EmptyString);
            }
            if !route.path.starts_with('/') {
                return Err(ConfigError::RouteNotAbsolute(route.path.clone()));
            }
            if !seen.insert(route.path.as_str()) {
                return Err(ConfigError::DuplicateRoute(route.path.clone()));
            }
        }
        Ok(Self { routes })
    }

    pub fn from_json(document: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn routes(&self) -> &[CatalogRoute] {
        &self.routes
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.path.as_str())
    }

    pub fn section_of(&self, path: &str) -> Option<RouteSection> {
        self.routes.iter().find(|r| r.path == path).map(|r| r.section)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.section_of(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

impl TryFrom<Vec<CatalogRoute>> for RouteCatalog {
    type Error = ConfigError;

    fn try_from(routes: Vec<CatalogRoute>) -> std::result::Result<Self, Self::Error> {
        Self::new(routes)
    }
}

impl From<RouteCatalog> for Vec<CatalogRoute> {
    fn from(catalog: RouteCatalog) -> Self {
        catalog.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = RouteCatalog::default();
        assert!(catalog.contains("/admin/produits"));
        assert!(catalog.contains("/order/:orderId"));
        assert_eq!(catalog.section_of("/faq"), Some(RouteSection::Info));
        assert!(catalog.paths().all(|p| p.starts_with('/')));

        let unique: HashSet<&str> = catalog.paths().collect();
        assert_eq!(unique.len(), catalog.len());
    }

    #[test]
    fn test_catalog_rejects_relative_and_duplicate_paths() {
        let relative = RouteCatalog::new(vec![CatalogRoute::new("admin", RouteSection::Admin)]);
        assert!(matches!(relative, Err(ConfigError::RouteNotAbsolute(_))));

        let duplicate = RouteCatalog::new(vec![
            CatalogRoute::new("/faq", RouteSection::Info),
            CatalogRoute::new("/faq", RouteSection::Info),
        ]);
        assert!(matches!(duplicate, Err(ConfigError::DuplicateRoute(_))));
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = RouteCatalog::from_json(
            r#"[{"path": "/admin", "section": "admin"}, {"path": "/faq", "section": "info"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.paths().collect::<Vec<_>>(), vec!["/admin", "/faq"]);

        let invalid = RouteCatalog::from_json(r#"[{"path": "faq", "section": "info"}]"#);
        assert!(matches!(invalid, Err(ConfigError::Parse(_))));
    }
}
