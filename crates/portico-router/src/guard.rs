//! Security gating for convention-inferred matches.
//!
//! Declared routes are trusted; inferred ones are not. Before the engine
//! accepts a controller reached purely by URL convention, the guard checks
//! its namespace against a blacklist (and a whitelist, when one is
//! configured) and restricts the reachable actions to an eligible roster.
//! Rosters are computed once per controller and cached for the process
//! lifetime; the entry API collapses concurrent first lookups for the same
//! controller into a single computation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use portico_core::{ActionVisibility, ControllerEntry};

/// Configuration for the convention-inference gate.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Namespace prefixes never reachable by convention inference.
    pub namespace_blacklist: Vec<String>,
    /// When non-empty, only these namespace prefixes are reachable.
    pub namespace_whitelist: Vec<String>,
    /// When `true`, only actions carrying the explicit routable marker are
    /// eligible.
    pub strict_actions: bool,
    /// Conventional suffix tried after the raw controller-name candidate.
    pub controller_suffix: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            namespace_blacklist: Vec::new(),
            namespace_whitelist: Vec::new(),
            strict_actions: false,
            controller_suffix: "Controller".to_string(),
        }
    }
}

/// Returns `true` if `namespace` falls under `prefix`.
///
/// `"app.internal"` falls under `"app.internal"` and `"app"`, but not
/// under `"app.int"`.
fn namespace_matches(namespace: &str, prefix: &str) -> bool {
    namespace == prefix
        || (namespace.len() > prefix.len()
            && namespace.starts_with(prefix)
            && namespace.as_bytes()[prefix.len()] == b'.')
}

/// The gate applied to every convention-inferred candidate.
pub(crate) struct ConventionGuard {
    config: GuardConfig,
    rosters: DashMap<String, Arc<Vec<String>>>,
    introspections: AtomicU64,
}

impl ConventionGuard {
    pub(crate) fn new(config: GuardConfig) -> Self {
        Self {
            config,
            rosters: DashMap::new(),
            introspections: AtomicU64::new(0),
        }
    }

    pub(crate) fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Blacklist check, then whitelist check when one is configured.
    pub(crate) fn namespace_permitted(&self, namespace: &str) -> bool {
        if self
            .config
            .namespace_blacklist
            .iter()
            .any(|p| namespace_matches(namespace, p))
        {
            return false;
        }
        if self.config.namespace_whitelist.is_empty() {
            return true;
        }
        self.config
            .namespace_whitelist
            .iter()
            .any(|p| namespace_matches(namespace, p))
    }

    /// Returns the cached eligible-action roster for a controller,
    /// computing it on first use.
    pub(crate) fn eligible_actions(&self, controller: &ControllerEntry) -> Arc<Vec<String>> {
        self.rosters
            .entry(controller.name().to_string())
            .or_insert_with(|| {
                self.introspections.fetch_add(1, Ordering::Relaxed);
                Arc::new(self.compute_roster(controller))
            })
            .clone()
    }

    /// Number of roster computations performed so far.
    pub(crate) fn introspections(&self) -> u64 {
        self.introspections.load(Ordering::Relaxed)
    }

    fn compute_roster(&self, controller: &ControllerEntry) -> Vec<String> {
        controller
            .actions()
            .filter(|a| a.visibility() == ActionVisibility::Public)
            .filter(|a| !self.config.strict_actions || a.is_routable())
            .map(|a| a.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::ActionEntry;

    fn guard(config: GuardConfig) -> ConventionGuard {
        ConventionGuard::new(config)
    }

    #[test]
    fn blacklist_rejects_prefix_and_exact_match() {
        let g = guard(GuardConfig {
            namespace_blacklist: vec!["app.internal".to_string()],
            ..GuardConfig::default()
        });
        assert!(!g.namespace_permitted("app.internal"));
        assert!(!g.namespace_permitted("app.internal.jobs"));
        assert!(g.namespace_permitted("app.internals"));
        assert!(g.namespace_permitted("app.public"));
    }

    #[test]
    fn whitelist_restricts_when_configured() {
        let g = guard(GuardConfig {
            namespace_whitelist: vec!["app.web".to_string()],
            ..GuardConfig::default()
        });
        assert!(g.namespace_permitted("app.web"));
        assert!(g.namespace_permitted("app.web.admin"));
        assert!(!g.namespace_permitted("app.api"));
    }

    #[test]
    fn blacklist_wins_over_whitelist() {
        let g = guard(GuardConfig {
            namespace_blacklist: vec!["app.web.admin".to_string()],
            namespace_whitelist: vec!["app.web".to_string()],
            ..GuardConfig::default()
        });
        assert!(g.namespace_permitted("app.web"));
        assert!(!g.namespace_permitted("app.web.admin"));
    }

    #[test]
    fn roster_excludes_internal_actions() {
        let g = guard(GuardConfig::default());
        let controller = ControllerEntry::new("Users")
            .action(ActionEntry::noop("show"))
            .action(ActionEntry::noop("helper").internal());

        let roster = g.eligible_actions(&controller);
        assert_eq!(roster.as_slice(), ["show".to_string()]);
    }

    #[test]
    fn strict_mode_requires_the_routable_marker() {
        let g = guard(GuardConfig {
            strict_actions: true,
            ..GuardConfig::default()
        });
        let controller = ControllerEntry::new("Users")
            .action(ActionEntry::noop("show").routable())
            .action(ActionEntry::noop("edit"));

        let roster = g.eligible_actions(&controller);
        assert_eq!(roster.as_slice(), ["show".to_string()]);
    }

    #[test]
    fn roster_is_computed_once_per_controller() {
        let g = guard(GuardConfig::default());
        let controller = ControllerEntry::new("Users").action(ActionEntry::noop("show"));

        g.eligible_actions(&controller);
        g.eligible_actions(&controller);
        assert_eq!(g.introspections(), 1);
    }
}
