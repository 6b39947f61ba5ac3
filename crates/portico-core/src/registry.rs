//! Controller registry.
//!
//! Portico has no runtime reflection: every controller registers itself
//! once at startup, supplying the metadata a dynamic framework would
//! scrape from annotations. Class-level registration carries a path
//! prefix, a logical group, default middleware, and default auth/role
//! values; each action carries its own path suffix, verbs, stable name,
//! parameter constraints, overrides, and the business invoker.
//!
//! The route loader and the matching engine both read this table; neither
//! enumerates anything at request time beyond cached lookups.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;

use crate::action::{erase, Action, ErasedAction, Empty, NoContent};
use crate::context::RequestContext;
use crate::error::{PorticoResult, RegistryError};
use crate::route::AuthRequirement;

/// Visibility of an action for convention routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionVisibility {
    /// Reachable by convention inference (subject to strict mode).
    Public,
    /// Never reachable by convention inference; declared routes may still
    /// target it.
    Internal,
}

/// One registered action on a controller.
#[derive(Clone)]
pub struct ActionEntry {
    name: String,
    visibility: ActionVisibility,
    routable: bool,
    path: Option<String>,
    verbs: Vec<Method>,
    route_name: Option<String>,
    constraints: HashMap<String, String>,
    middleware: Vec<String>,
    auth: AuthRequirement,
    roles: Vec<String>,
    handler: Arc<dyn ErasedAction>,
}

impl std::fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEntry")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("routable", &self.routable)
            .field("path", &self.path)
            .field("verbs", &self.verbs)
            .finish_non_exhaustive()
    }
}

impl ActionEntry {
    /// Registers a typed action under the given name.
    #[must_use]
    pub fn new<A, Req, Res>(name: impl Into<String>, action: A) -> Self
    where
        A: Action<Req, Res>,
        Req: serde::de::DeserializeOwned + Send + 'static,
        Res: serde::Serialize + Send + 'static,
    {
        Self::erased(name, erase(action))
    }

    /// Registers an already-erased action.
    #[must_use]
    pub fn erased(name: impl Into<String>, handler: Arc<dyn ErasedAction>) -> Self {
        Self {
            name: name.into(),
            visibility: ActionVisibility::Public,
            routable: false,
            path: None,
            verbs: Vec::new(),
            route_name: None,
            constraints: HashMap::new(),
            middleware: Vec::new(),
            auth: AuthRequirement::Inherit,
            roles: Vec::new(),
            handler,
        }
    }

    /// Registers a placeholder action that returns an empty body.
    ///
    /// Useful while scaffolding a controller before its logic exists.
    #[must_use]
    pub fn noop(name: impl Into<String>) -> Self {
        struct Noop;
        impl Action<Empty, NoContent> for Noop {
            async fn call(&self, _ctx: &RequestContext, _req: Empty) -> PorticoResult<NoContent> {
                Ok(NoContent {})
            }
        }
        Self::new(name, Noop)
    }

    /// Sets the method-level path suffix.
    ///
    /// When absent, discovery derives the suffix from the action name.
    #[must_use]
    pub fn path(mut self, suffix: impl Into<String>) -> Self {
        self.path = Some(suffix.into());
        self
    }

    /// Adds an allowed verb.
    #[must_use]
    pub fn verb(mut self, verb: Method) -> Self {
        if !self.verbs.contains(&verb) {
            self.verbs.push(verb);
        }
        self
    }

    /// Verb shorthand: GET.
    #[must_use]
    pub fn get(self) -> Self {
        self.verb(Method::GET)
    }

    /// Verb shorthand: POST.
    #[must_use]
    pub fn post(self) -> Self {
        self.verb(Method::POST)
    }

    /// Verb shorthand: PUT.
    #[must_use]
    pub fn put(self) -> Self {
        self.verb(Method::PUT)
    }

    /// Verb shorthand: PATCH.
    #[must_use]
    pub fn patch(self) -> Self {
        self.verb(Method::PATCH)
    }

    /// Verb shorthand: DELETE.
    #[must_use]
    pub fn delete(self) -> Self {
        self.verb(Method::DELETE)
    }

    /// Sets the stable route name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    /// Adds a regex constraint for a named parameter.
    #[must_use]
    pub fn constraint(mut self, param: impl Into<String>, regex: impl Into<String>) -> Self {
        self.constraints.insert(param.into(), regex.into());
        self
    }

    /// Appends middleware names, deduplicating.
    #[must_use]
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.middleware.contains(&name) {
                self.middleware.push(name);
            }
        }
        self
    }

    /// Overrides the class-level authentication requirement.
    #[must_use]
    pub fn auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    /// Overrides the class-level role list.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Hides this action from convention inference.
    #[must_use]
    pub fn internal(mut self) -> Self {
        self.visibility = ActionVisibility::Internal;
        self
    }

    /// Marks this action as explicitly routable (the strict-mode marker).
    #[must_use]
    pub fn routable(mut self) -> Self {
        self.routable = true;
        self
    }

    /// Returns the action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the visibility.
    #[must_use]
    pub fn visibility(&self) -> ActionVisibility {
        self.visibility
    }

    /// Returns `true` if the action carries the routable marker.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        self.routable
    }

    /// Returns the method-level path suffix, if set.
    #[must_use]
    pub fn path_suffix(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the declared verbs (may be empty; loader defaults to GET).
    #[must_use]
    pub fn verbs(&self) -> &[Method] {
        &self.verbs
    }

    /// Returns the stable route name, if set.
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Returns the parameter constraints.
    #[must_use]
    pub fn constraints(&self) -> &HashMap<String, String> {
        &self.constraints
    }

    /// Returns the method-level middleware list.
    #[must_use]
    pub fn middleware_names(&self) -> &[String] {
        &self.middleware
    }

    /// Returns the method-level auth requirement.
    #[must_use]
    pub fn auth_requirement(&self) -> AuthRequirement {
        self.auth
    }

    /// Returns the method-level role overrides (empty means inherit).
    #[must_use]
    pub fn role_overrides(&self) -> &[String] {
        &self.roles
    }

    /// Returns the business invoker.
    #[must_use]
    pub fn handler(&self) -> Arc<dyn ErasedAction> {
        Arc::clone(&self.handler)
    }
}

/// One registered controller and its actions.
#[derive(Debug, Clone)]
pub struct ControllerEntry {
    name: String,
    namespace: String,
    abstract_base: bool,
    prefix: Option<String>,
    group: Option<String>,
    middleware: Vec<String>,
    auth: AuthRequirement,
    roles: Vec<String>,
    actions: Vec<ActionEntry>,
}

impl ControllerEntry {
    /// Creates a controller registration with the given name.
    ///
    /// The name is what convention inference resolves URL segments
    /// against, e.g. `"Users"` for `/users/...`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            abstract_base: false,
            prefix: None,
            group: None,
            middleware: Vec::new(),
            auth: AuthRequirement::Inherit,
            roles: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Sets the dot-separated namespace, checked by the convention gate.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the class-level path prefix for discovered routes.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the logical group name.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Appends class-level middleware names, deduplicating.
    #[must_use]
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.middleware.contains(&name) {
                self.middleware.push(name);
            }
        }
        self
    }

    /// Sets the class-level default auth requirement.
    #[must_use]
    pub fn auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the class-level default roles.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Marks this controller as an abstract base, never matched by
    /// convention inference.
    #[must_use]
    pub fn abstract_base(mut self) -> Self {
        self.abstract_base = true;
        self
    }

    /// Adds an action.
    #[must_use]
    pub fn action(mut self, action: ActionEntry) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns the controller name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace_str(&self) -> &str {
        &self.namespace
    }

    /// Returns `true` if this controller is an abstract base.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.abstract_base
    }

    /// Returns the class-level path prefix.
    #[must_use]
    pub fn path_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the logical group name.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the class-level middleware list.
    #[must_use]
    pub fn middleware_names(&self) -> &[String] {
        &self.middleware
    }

    /// Returns the class-level default auth requirement.
    #[must_use]
    pub fn auth_requirement(&self) -> AuthRequirement {
        self.auth
    }

    /// Returns the class-level default roles.
    #[must_use]
    pub fn default_roles(&self) -> &[String] {
        &self.roles
    }

    /// Looks up an action by name.
    #[must_use]
    pub fn find_action(&self, name: &str) -> Option<&ActionEntry> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Iterates over registered actions in registration order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionEntry> {
        self.actions.iter()
    }
}

/// Insertion-ordered table of registered controllers.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: IndexMap<String, ControllerEntry>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller.
    ///
    /// Duplicate controller names and duplicate action names within one
    /// controller are fatal at startup.
    pub fn register(&mut self, controller: ControllerEntry) -> Result<(), RegistryError> {
        if self.controllers.contains_key(controller.name()) {
            return Err(RegistryError::DuplicateController {
                name: controller.name().to_string(),
            });
        }
        for (i, action) in controller.actions.iter().enumerate() {
            if controller.actions[..i].iter().any(|a| a.name == action.name) {
                return Err(RegistryError::DuplicateAction {
                    controller: controller.name().to_string(),
                    action: action.name.clone(),
                });
            }
        }
        self.controllers
            .insert(controller.name().to_string(), controller);
        Ok(())
    }

    /// Looks up a controller by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ControllerEntry> {
        self.controllers.get(name)
    }

    /// Returns the number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Returns `true` if no controllers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Iterates over controllers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ControllerEntry> {
        self.controllers.values()
    }
}
