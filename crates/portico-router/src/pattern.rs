//! Path templates and compiled routes.
//!
//! A pattern like `/users/{id}` is parsed into segments once at load time.
//! Matching walks segments in lockstep with the request path and runs any
//! per-parameter regex constraints, which are compiled (anchored) up front
//! so the per-request cost is a single `is_match`.

use std::collections::HashMap;

use regex::Regex;

use portico_core::{LoadError, Params, RouteDefinition};

/// A segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    /// A literal segment (e.g. `users`).
    Literal(String),
    /// A named parameter segment (e.g. `{id}`).
    Param(String),
}

/// A parsed path template.
#[derive(Debug, Clone)]
pub(crate) struct PathPattern {
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    /// Parses a pattern string into segments.
    pub(crate) fn parse(pattern: &str) -> Result<Self, LoadError> {
        let mut segments = Vec::new();
        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            if raw.starts_with('{') || raw.ends_with('}') {
                let name = raw
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .ok_or_else(|| LoadError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("unbalanced braces in segment {raw:?}"),
                    })?;
                if name.is_empty() {
                    return Err(LoadError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: "empty parameter name".to_string(),
                    });
                }
                if segments
                    .iter()
                    .any(|s| matches!(s, PatternSegment::Param(n) if n == name))
                {
                    return Err(LoadError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("duplicate parameter name {name:?}"),
                    });
                }
                segments.push(PatternSegment::Param(name.to_string()));
            } else {
                segments.push(PatternSegment::Literal(raw.to_string()));
            }
        }
        Ok(Self { segments })
    }

    /// Returns the names of all parameter segments.
    pub(crate) fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PatternSegment::Param(name) => Some(name.as_str()),
            PatternSegment::Literal(_) => None,
        })
    }

    /// Matches a request path, extracting parameters on success.
    pub(crate) fn match_path(&self, path: &str) -> Option<Params> {
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if actual.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, value) in self.segments.iter().zip(actual) {
            match segment {
                PatternSegment::Literal(expected) => {
                    if expected != value {
                        return None;
                    }
                }
                PatternSegment::Param(name) => params.push(name.clone(), value),
            }
        }
        Some(params)
    }
}

/// A route definition with its pattern and constraints compiled.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRoute {
    pub(crate) definition: RouteDefinition,
    pattern: PathPattern,
    constraints: HashMap<String, Regex>,
}

impl CompiledRoute {
    /// Compiles a definition's pattern and constraint regexes.
    ///
    /// Constraints naming a parameter absent from the pattern are a load
    /// error, as is a constraint that fails to compile.
    pub(crate) fn compile(definition: RouteDefinition) -> Result<Self, LoadError> {
        let pattern = PathPattern::parse(&definition.pattern)?;

        let mut constraints = HashMap::new();
        for (param, raw) in &definition.constraints {
            if !pattern.param_names().any(|n| n == param) {
                return Err(LoadError::InvalidConstraint {
                    pattern: definition.pattern.clone(),
                    param: param.clone(),
                    reason: "no such parameter in pattern".to_string(),
                });
            }
            // Anchor so "\d+" means the whole segment, not a substring.
            let regex =
                Regex::new(&format!("^(?:{raw})$")).map_err(|e| LoadError::InvalidConstraint {
                    pattern: definition.pattern.clone(),
                    param: param.clone(),
                    reason: e.to_string(),
                })?;
            constraints.insert(param.clone(), regex);
        }

        Ok(Self {
            definition,
            pattern,
            constraints,
        })
    }

    /// Matches a path against the pattern and constraints, ignoring the
    /// verb. The engine checks the verb separately so a pattern hit with
    /// the wrong verb is observable as its own condition.
    ///
    /// A constraint failure is a pattern miss, not an error: the engine
    /// continues to the next candidate.
    pub(crate) fn path_params(&self, path: &str) -> Option<Params> {
        let params = self.pattern.match_path(path)?;
        for (name, regex) in &self.constraints {
            let value = params.get(name)?;
            if !regex.is_match(value) {
                return None;
            }
        }
        Some(params)
    }
}
