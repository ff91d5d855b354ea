use crate::{
    catalog::RouteSection,
    config::{AccessPolicy, EntityType, InputLimits, UserRole},
    generator::IdGenerator,
    routes::RouteSecurity,
    sanitize,
    store::MappingStore,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

const ROUTE_NOT_FOUND: &str = "Route not found or unauthorized";
const ADMIN_REQUIRED: &str = "Administrator access required";

/// Outcome of [`SecurityValidator::validate_route_access`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RouteAccess {
    pub is_valid: bool,
    pub is_public: bool,
    pub requires_auth: bool,
    pub real_route: Option<String>,
    pub error: Option<String>,
}

impl RouteAccess {
    fn public() -> Self {
        Self {
            is_valid: true,
            is_public: true,
            ..Self::default()
        }
    }

    fn granted(real_route: String, requires_auth: bool) -> Self {
        Self {
            is_valid: true,
            requires_auth,
            real_route: Some(real_route),
            ..Self::default()
        }
    }

    fn denied(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Checks presented aliases and routes before callers trust them.
///
/// An alias passes when it is well formed and present in the store. That is
/// obfuscation, not authentication: the mapping table lives with the
/// client, so anything that must be protected still needs a server-side
/// credential check.
#[derive(Debug, Clone)]
pub struct SecurityValidator {
    store: Arc<MappingStore>,
    routes: RouteSecurity,
    policy: Arc<AccessPolicy>,
    limits: InputLimits,
}

impl SecurityValidator {
    pub fn new(
        store: Arc<MappingStore>,
        routes: RouteSecurity,
        policy: Arc<AccessPolicy>,
        limits: InputLimits,
    ) -> Self {
        Self {
            store,
            routes,
            policy,
            limits,
        }
    }

    /// Well formed and known to the store.
    pub fn is_valid_secure_id(&self, token: &str) -> bool {
        IdGenerator::is_valid_secure_id_format(token) && self.store.has_secure_id(token)
    }

    /// Additionally requires the unlabeled order shape and a real id that
    /// carries the configured order prefix.
    pub fn is_valid_secure_order_id(&self, token: &str) -> bool {
        self.is_valid_secure_id(token)
            && IdGenerator::extract_entity_type(token) == Some(EntityType::Order)
            && self
                .store
                .get_real_id_from_secure(token)
                .is_some_and(|real| real.starts_with(self.policy.order_id_prefix().as_str()))
    }

    pub fn is_valid_secure_product_id(&self, token: &str) -> bool {
        self.is_valid_secure_id(token)
            && IdGenerator::extract_entity_type(token) == Some(EntityType::Product)
    }

    pub fn validate_secure_route(&self, path: &str) -> bool {
        !path.is_empty() && self.routes.is_valid_secure_route(path)
    }

    pub fn validate_route_access(&self, path: &str, role: Option<UserRole>) -> RouteAccess {
        if self.policy.is_public(path) {
            tracing::trace!(path, "Public route");
            return RouteAccess::public();
        }

        let Some(real_route) = self.routes.get_real_route(path) else {
            tracing::trace!("Unknown route alias");
            return RouteAccess::denied(ROUTE_NOT_FOUND);
        };

        if self.is_admin_route(&real_route) {
            if role == Some(UserRole::Admin) {
                return RouteAccess::granted(real_route, true);
            }
            tracing::trace!(role = ?role, "Admin route refused");
            return RouteAccess::denied(ADMIN_REQUIRED);
        }

        let requires_auth = self.policy.requires_auth(&real_route);
        RouteAccess::granted(real_route, requires_auth)
    }

    fn is_admin_route(&self, real_route: &str) -> bool {
        self.policy.is_admin(real_route)
            || self.routes.catalog().section_of(real_route) == Some(RouteSection::Admin)
    }

    pub fn validate_url_params<I, K, V>(&self, params: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        V: AsRef<str>,
    {
        sanitize::validate_url_params(params, &self.limits)
    }

    /// JSON flavour of [`validate_url_params`](Self::validate_url_params).
    /// Non-string values fail.
    pub fn validate_url_param_values(&self, params: &Map<String, Value>) -> bool {
        sanitize::validate_url_param_values(params, &self.limits)
    }

    pub fn sanitize_input(&self, value: &str) -> String {
        sanitize::sanitize_input(value, &self.limits)
    }

    pub fn sanitize_value(&self, value: &Value) -> String {
        sanitize::sanitize_value(value, &self.limits)
    }

    pub fn validate_and_sanitize_data(&self, data: &Value) -> Option<Map<String, Value>> {
        sanitize::validate_and_sanitize_data(data, &self.limits)
    }

    pub fn limits(&self) -> &InputLimits {
        &self.limits
    }
}
