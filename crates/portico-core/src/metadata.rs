//! Compiled handler metadata.
//!
//! [`HandlerMetadata`] is the per-(controller, action) view of middleware,
//! auth, and role declarations after class-level defaults and method-level
//! overrides are merged. The matching engine computes it on first
//! resolution of a key and caches it for the process lifetime.

use crate::registry::{ActionEntry, ControllerEntry};
use crate::route::AuthRequirement;

/// Merged middleware/auth/role metadata for one handler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandlerMetadata {
    /// Deduplicated middleware names, class-level first.
    pub middleware: Vec<String>,
    /// Effective auth requirement after method-level override. May still
    /// be `Inherit` when neither level declared anything.
    pub auth: AuthRequirement,
    /// Effective roles: method-level overrides win over class defaults.
    pub roles: Vec<String>,
}

impl HandlerMetadata {
    /// Merges class-level defaults with method-level declarations.
    ///
    /// Middleware concatenates (class first) and deduplicates. Auth and
    /// roles follow override semantics: a method-level value replaces the
    /// class default, absence inherits it.
    #[must_use]
    pub fn resolve(controller: &ControllerEntry, action: &ActionEntry) -> Self {
        let mut middleware: Vec<String> = Vec::new();
        for name in controller
            .middleware_names()
            .iter()
            .chain(action.middleware_names())
        {
            if !middleware.contains(name) {
                middleware.push(name.clone());
            }
        }

        let auth = match action.auth_requirement() {
            AuthRequirement::Inherit => controller.auth_requirement(),
            declared => declared,
        };

        let roles = if action.role_overrides().is_empty() {
            controller.default_roles().to_vec()
        } else {
            action.role_overrides().to_vec()
        };

        Self {
            middleware,
            auth,
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionEntry;

    #[test]
    fn class_defaults_flow_through() {
        let controller = ControllerEntry::new("Admin")
            .middleware(["auth", "audit"])
            .auth(AuthRequirement::Required)
            .roles(["admin"]);
        let action = ActionEntry::noop("index");

        let meta = HandlerMetadata::resolve(&controller, &action);
        assert_eq!(meta.middleware, vec!["auth", "audit"]);
        assert_eq!(meta.auth, AuthRequirement::Required);
        assert_eq!(meta.roles, vec!["admin"]);
    }

    #[test]
    fn method_level_overrides_win() {
        let controller = ControllerEntry::new("Admin")
            .middleware(["auth"])
            .auth(AuthRequirement::Required)
            .roles(["admin"]);
        let action = ActionEntry::noop("ping")
            .middleware(["throttle"])
            .auth(AuthRequirement::NotRequired)
            .roles(["anyone"]);

        let meta = HandlerMetadata::resolve(&controller, &action);
        assert_eq!(meta.middleware, vec!["auth", "throttle"]);
        assert_eq!(meta.auth, AuthRequirement::NotRequired);
        assert_eq!(meta.roles, vec!["anyone"]);
    }

    #[test]
    fn duplicate_middleware_collapses() {
        let controller = ControllerEntry::new("Admin").middleware(["auth", "audit"]);
        let action = ActionEntry::noop("index").middleware(["audit", "auth", "throttle"]);

        let meta = HandlerMetadata::resolve(&controller, &action);
        assert_eq!(meta.middleware, vec!["auth", "audit", "throttle"]);
    }

    #[test]
    fn inherit_everywhere_stays_inherit() {
        let controller = ControllerEntry::new("Public");
        let action = ActionEntry::noop("index");

        let meta = HandlerMetadata::resolve(&controller, &action);
        assert_eq!(meta.auth, AuthRequirement::Inherit);
        assert!(meta.roles.is_empty());
        assert!(meta.middleware.is_empty());
    }
}
