//! Dependency graph validation.
//!
//! Optional check run by [`ContainerBuilder::build()`](crate::container::ContainerBuilder::build)
//! when [`Settings::validate_on_build`](crate::settings::Settings) is set.
//! Two passes over the registrations, each reporting every violation it
//! finds:
//! - Edge pass: each declared dependency is registered and lives at least
//!   as long as its consumer
//! - Cycle pass: no token reaches itself through its dependencies
//!
//! Factory registrations declare no dependencies and are leaves here.

use std::collections::HashMap;

use sijill_support::rendering::suggest_similar;
use tracing::{debug, instrument, warn};

use crate::error::{CycleError, LifetimeMismatchError, NotRegisteredError, SijillError};
use crate::lifetime::Lifetime;
use crate::token::TokenKey;

/// What validation needs to know about one registration.
#[derive(Debug, Clone)]
pub(crate) struct DependencyInfo {
    pub key: TokenKey,
    pub dependencies: Vec<TokenKey>,
    pub lifetime: Lifetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

pub(crate) struct GraphValidator {
    nodes: HashMap<TokenKey, DependencyInfo>,
    max_suggestions: usize,
}

impl GraphValidator {
    pub fn new(nodes: HashMap<TokenKey, DependencyInfo>, max_suggestions: usize) -> Self {
        Self { nodes, max_suggestions }
    }

    /// Returns every violation, in registration order. Empty means valid.
    #[instrument(skip(self), name = "graph_validation", fields(tokens = self.nodes.len()))]
    pub fn validate(&self) -> Vec<SijillError> {
        let mut ordered: Vec<&DependencyInfo> = self.nodes.values().collect();
        ordered.sort_by_key(|info| info.key.id());

        let mut violations = Vec::new();
        for info in &ordered {
            self.check_edges(info, &mut violations);
        }

        let mut visits = HashMap::new();
        let mut path = Vec::new();
        for info in &ordered {
            self.find_cycles(info.key, &mut visits, &mut path, &mut violations);
        }

        debug!(violations = violations.len(), "Dependency graph checked");
        violations
    }

    fn check_edges(&self, consumer: &DependencyInfo, violations: &mut Vec<SijillError>) {
        for dep in &consumer.dependencies {
            match self.nodes.get(dep) {
                Some(dependency) if consumer.lifetime > dependency.lifetime => {
                    warn!(
                        consumer = %consumer.key,
                        consumer_lifetime = %consumer.lifetime,
                        dependency = %dependency.key,
                        dependency_lifetime = %dependency.lifetime,
                        "Captive dependency"
                    );
                    violations.push(SijillError::LifetimeMismatch(LifetimeMismatchError {
                        consumer: consumer.key,
                        consumer_lifetime: consumer.lifetime,
                        dependency: dependency.key,
                        dependency_lifetime: dependency.lifetime,
                    }));
                }
                Some(_) => {}
                None => {
                    let names: Vec<&str> = self.nodes.keys().map(|k| k.name()).collect();
                    violations.push(SijillError::NotRegistered(NotRegisteredError {
                        requested: *dep,
                        required_by: Some(consumer.key),
                        suggestions: suggest_similar(dep.name(), &names, self.max_suggestions),
                    }));
                }
            }
        }
    }

    /// Depth-first search. A dependency found `InProgress` closes a cycle
    /// made of the path suffix starting at it.
    fn find_cycles(
        &self,
        key: TokenKey,
        visits: &mut HashMap<TokenKey, Visit>,
        path: &mut Vec<TokenKey>,
        violations: &mut Vec<SijillError>,
    ) {
        match visits.get(&key) {
            Some(Visit::Done) => return,
            Some(Visit::InProgress) => {
                let start = path.iter().position(|k| *k == key).unwrap_or(0);
                let mut chain = path[start..].to_vec();
                chain.push(key);

                warn!(cycle = ?chain, "Cyclic dependency detected");
                violations.push(SijillError::CyclicDependency(CycleError { chain }));
                return;
            }
            None => {}
        }

        // Missing tokens were reported by the edge pass.
        let Some(info) = self.nodes.get(&key) else {
            return;
        };

        visits.insert(key, Visit::InProgress);
        path.push(key);
        for dep in &info.dependencies {
            self.find_cycles(*dep, visits, path, violations);
        }
        path.pop();
        visits.insert(key, Visit::Done);
    }
}
