//! End-to-end resolution tests.
//!
//! These tests exercise the full resolution pipeline over a realistic
//! registry: declared routes, convention inference with longest-join
//! tie-breaks, the namespace gate, strict mode, REST fallbacks, and the
//! match cache.

use std::sync::Arc;

use http::Method;
use portico_core::{
    ActionEntry, AuthRequirement, ControllerEntry, ControllerRegistry, HandlerId, MatchSource,
    MemoryStore, RouteDefinition, StoreConfig,
};
use portico_router::{GuardConfig, RouteLoader, Router, RouterConfig};

/// Builds a registry covering the interesting shapes: nested controller
/// names, overlapping action joins, namespaced internals.
fn registry() -> Arc<ControllerRegistry> {
    let mut registry = ControllerRegistry::new();
    registry
        .register(
            ControllerEntry::new("Users")
                .namespace("app.web")
                .prefix("/users")
                .middleware(["session"])
                .auth(AuthRequirement::Required)
                .roles(["member"])
                .action(ActionEntry::noop("index").path("/").get().routable())
                .action(
                    ActionEntry::noop("show")
                        .path("/{id}")
                        .get()
                        .constraint("id", r"\d+")
                        .named("users.show")
                        .routable(),
                )
                .action(ActionEntry::noop("store").routable())
                .action(ActionEntry::noop("helper").internal()),
        )
        .expect("registers Users");
    registry
        .register(
            ControllerEntry::new("Foo")
                .namespace("app.web")
                .action(ActionEntry::noop("bar"))
                .action(ActionEntry::noop("barBaz")),
        )
        .expect("registers Foo");
    registry
        .register(
            ControllerEntry::new("Admin")
                .namespace("app.web")
                .action(ActionEntry::noop("toolsRun")),
        )
        .expect("registers Admin");
    registry
        .register(
            ControllerEntry::new("AdminTools")
                .namespace("app.web")
                .action(ActionEntry::noop("run")),
        )
        .expect("registers AdminTools");
    registry
        .register(
            ControllerEntry::new("PagesController")
                .namespace("app.web")
                .action(ActionEntry::noop("about")),
        )
        .expect("registers PagesController");
    registry
        .register(
            ControllerEntry::new("Secrets")
                .namespace("app.internal")
                .action(ActionEntry::noop("index")),
        )
        .expect("registers Secrets");
    registry
        .register(
            ControllerEntry::new("Base")
                .namespace("app.web")
                .abstract_base()
                .action(ActionEntry::noop("index")),
        )
        .expect("registers Base");
    Arc::new(registry)
}

fn guard() -> GuardConfig {
    GuardConfig {
        namespace_blacklist: vec!["app.internal".to_string()],
        ..GuardConfig::default()
    }
}

fn router_with(registry: &Arc<ControllerRegistry>, config: RouterConfig) -> Router {
    let collection = RouteLoader::new()
        .load(registry)
        .expect("collection loads");
    Router::new(collection, Arc::clone(registry), config, None).expect("router builds")
}

fn default_router(registry: &Arc<ControllerRegistry>) -> Router {
    router_with(
        registry,
        RouterConfig {
            guard: guard(),
            ..RouterConfig::default()
        },
    )
}

#[test]
fn declared_route_resolves_with_params_and_metadata() {
    let registry = registry();
    let router = default_router(&registry);

    let result = router.resolve(&Method::GET, "/users/42").expect("match");
    assert_eq!(result.handler, HandlerId::new("Users", "show"));
    assert_eq!(result.params.get("id"), Some("42"));
    assert_eq!(result.middleware, vec!["session"]);
    assert!(result.auth_required);
    assert_eq!(result.roles, vec!["member"]);
    assert_eq!(result.route_name.as_deref(), Some("users.show"));
    assert_eq!(result.source, MatchSource::Declared);
}

#[test]
fn constraint_mismatch_falls_through_to_convention() {
    let registry = registry();
    let router = default_router(&registry);

    // "alice" fails the \d+ constraint on the discovered route; inference
    // finds no action named "alice" either and lands on the GET fallback.
    let result = router.resolve(&Method::GET, "/users/alice").expect("match");
    assert_eq!(result.handler, HandlerId::new("Users", "index"));
    assert_eq!(result.params.get("id"), Some("alice"));
    assert_eq!(result.source, MatchSource::Convention);
}

#[test]
fn convention_resolves_class_action_and_id() {
    let registry = registry();
    let router = default_router(&registry);

    let result = router.resolve(&Method::GET, "/foo/bar/42").expect("match");
    assert_eq!(result.handler, HandlerId::new("Foo", "bar"));
    assert_eq!(result.params.get("id"), Some("42"));
    assert_eq!(result.source, MatchSource::Convention);
}

#[test]
fn longer_action_join_wins() {
    let registry = registry();
    let router = default_router(&registry);

    // "barBaz" must win over "bar" with "baz" left as a parameter.
    let result = router.resolve(&Method::GET, "/foo/bar/baz").expect("match");
    assert_eq!(result.handler, HandlerId::new("Foo", "barBaz"));
    assert!(result.params.is_empty());
}

#[test]
fn longer_controller_join_wins() {
    let registry = registry();
    let router = default_router(&registry);

    let result = router
        .resolve(&Method::GET, "/admin/tools/run")
        .expect("match");
    assert_eq!(result.handler, HandlerId::new("AdminTools", "run"));
}

#[test]
fn controller_suffix_candidate_is_tried() {
    let registry = registry();
    let router = default_router(&registry);

    let result = router.resolve(&Method::GET, "/pages/about").expect("match");
    assert_eq!(result.handler, HandlerId::new("PagesController", "about"));
}

#[test]
fn multiple_leftover_segments_bind_indexed_params() {
    let registry = registry();
    let router = default_router(&registry);

    let result = router
        .resolve(&Method::GET, "/foo/bar/2024/03/09")
        .expect("match");
    assert_eq!(result.handler, HandlerId::new("Foo", "bar"));
    assert_eq!(result.params.get("arg0"), Some("2024"));
    assert_eq!(result.params.get("arg1"), Some("03"));
    assert_eq!(result.params.get("arg2"), Some("09"));
}

#[test]
fn blacklisted_namespace_is_never_inferred() {
    let registry = registry();
    let router = default_router(&registry);

    assert!(router.resolve(&Method::GET, "/secrets").is_none());
    assert!(router.resolve(&Method::GET, "/secrets/index").is_none());
}

#[test]
fn whitelist_excludes_everything_else() {
    let registry = registry();
    let router = router_with(
        &registry,
        RouterConfig {
            guard: GuardConfig {
                namespace_whitelist: vec!["app.api".to_string()],
                ..GuardConfig::default()
            },
            ..RouterConfig::default()
        },
    );

    assert!(router.resolve(&Method::GET, "/foo/bar").is_none());
}

#[test]
fn abstract_base_controllers_are_skipped() {
    let registry = registry();
    let router = default_router(&registry);

    assert!(router.resolve(&Method::GET, "/base").is_none());
}

#[test]
fn internal_actions_are_unreachable_by_convention() {
    let registry = registry();
    let router = default_router(&registry);

    // "helper" is internal, so the segment becomes a fallback parameter
    // instead of an action name.
    let result = router
        .resolve(&Method::GET, "/users/helper")
        .expect("match");
    assert_eq!(result.handler, HandlerId::new("Users", "index"));
    assert_eq!(result.params.get("id"), Some("helper"));
}

#[test]
fn strict_mode_requires_the_routable_marker() {
    let registry = registry();
    let router = router_with(
        &registry,
        RouterConfig {
            guard: GuardConfig {
                strict_actions: true,
                namespace_blacklist: vec!["app.internal".to_string()],
                ..GuardConfig::default()
            },
            ..RouterConfig::default()
        },
    );

    // Foo::bar carries no marker; Users::store does.
    assert!(router.resolve(&Method::GET, "/foo/bar").is_none());
    let result = router.resolve(&Method::POST, "/users").expect("match");
    assert_eq!(result.handler, HandlerId::new("Users", "store"));
}

#[test]
fn rest_fallback_maps_verbs_to_actions() {
    let registry = registry();
    let router = default_router(&registry);

    // POST with zero remaining segments resolves to "store".
    let result = router.resolve(&Method::POST, "/users").expect("match");
    assert_eq!(result.handler, HandlerId::new("Users", "store"));
    assert!(result.params.is_empty());

    // Foo has no "destroy" action, so DELETE finds nothing.
    assert!(router.resolve(&Method::DELETE, "/foo").is_none());
}

#[test]
fn rest_fallback_binds_remaining_segments() {
    let mut extra = ControllerRegistry::new();
    extra
        .register(
            ControllerEntry::new("Reports")
                .namespace("app.web")
                .action(ActionEntry::noop("index")),
        )
        .expect("registers");
    let extra = Arc::new(extra);
    let router = default_router(&extra);

    let result = router
        .resolve(&Method::GET, "/reports/2024")
        .expect("match");
    assert_eq!(result.handler, HandlerId::new("Reports", "index"));
    assert_eq!(result.params.get("id"), Some("2024"));
}

#[test]
fn constraint_differentiated_routes_resolve_in_insertion_order() {
    let registry = registry();
    let collection = RouteLoader::new()
        .declare(
            RouteDefinition::new("/people/{id}", HandlerId::new("Users", "show"))
                .verb(Method::GET)
                .constraint("id", r"\d+"),
        )
        .declare(
            RouteDefinition::new("/people/{slug}", HandlerId::new("Users", "index"))
                .verb(Method::GET)
                .constraint("slug", "[a-z-]+"),
        )
        .load(&registry)
        .expect("same-shape routes with distinct constraints load");
    let router = Router::new(
        collection,
        Arc::clone(&registry),
        RouterConfig {
            guard: guard(),
            ..RouterConfig::default()
        },
        None,
    )
    .expect("builds");

    let numeric = router.resolve(&Method::GET, "/people/42").expect("match");
    assert_eq!(numeric.handler, HandlerId::new("Users", "show"));
    assert_eq!(numeric.params.get("id"), Some("42"));

    let slug = router.resolve(&Method::GET, "/people/alice").expect("match");
    assert_eq!(slug.handler, HandlerId::new("Users", "index"));
    assert_eq!(slug.params.get("slug"), Some("alice"));
}

#[test]
fn declared_routes_win_over_convention() {
    let registry = registry();
    let collection = RouteLoader::new()
        .declare(
            RouteDefinition::new("/foo/bar", HandlerId::new("Users", "index")).verb(Method::GET),
        )
        .load(&registry)
        .expect("loads");
    let router = Router::new(
        collection,
        Arc::clone(&registry),
        RouterConfig {
            guard: guard(),
            ..RouterConfig::default()
        },
        None,
    )
    .expect("builds");

    let result = router.resolve(&Method::GET, "/foo/bar").expect("match");
    assert_eq!(result.handler, HandlerId::new("Users", "index"));
    assert_eq!(result.source, MatchSource::Declared);
}

#[test]
fn verb_mismatch_on_declared_route_continues_to_convention() {
    let registry = registry();
    let router = default_router(&registry);

    // The discovered route for Users::store does not exist (no path), and
    // /users only allows GET as a declared route; POST flows through to
    // convention inference.
    let result = router.resolve(&Method::POST, "/users").expect("match");
    assert_eq!(result.source, MatchSource::Convention);
}

#[test]
fn cosmetic_suffix_is_stripped_before_matching() {
    let registry = registry();
    let router = default_router(&registry);

    let result = router
        .resolve(&Method::GET, "/foo/bar/42.html")
        .expect("match");
    assert_eq!(result.handler, HandlerId::new("Foo", "bar"));
    assert_eq!(result.params.get("id"), Some("42"));
}

#[test]
fn cache_hit_skips_introspection_and_preserves_contents() {
    let registry = registry();
    let collection = RouteLoader::new().load(&registry).expect("loads");
    let store = Arc::new(MemoryStore::new(StoreConfig::default()));
    let router = Router::new(
        collection,
        Arc::clone(&registry),
        RouterConfig {
            guard: guard(),
            ..RouterConfig::default()
        },
        Some(store.clone()),
    )
    .expect("builds");

    let first = router.resolve(&Method::GET, "/foo/bar/42").expect("match");
    let after_first = router.introspections();

    let second = router.resolve(&Method::GET, "/foo/bar/42").expect("match");
    assert_eq!(router.introspections(), after_first);
    assert_eq!(store.stats().hits, 1);

    assert_eq!(second.handler, first.handler);
    assert_eq!(second.params.to_pairs(), first.params.to_pairs());
    assert_eq!(second.middleware, first.middleware);
    assert_eq!(second.auth_required, first.auth_required);
    assert_eq!(second.roles, first.roles);
    assert_eq!(second.route_name, first.route_name);
    assert_eq!(second.source, MatchSource::Cache);
}

#[test]
fn nothing_matches_returns_none() {
    let registry = registry();
    let router = default_router(&registry);

    assert!(router.resolve(&Method::GET, "/no/such/route").is_none());
    assert!(router.resolve(&Method::OPTIONS, "/foo").is_none());
}
