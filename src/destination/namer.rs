//! Destination naming
//!
//! Durable destinations are named `<prefix>.<qualified context>.<counter>`,
//! with `TEST` as the default prefix. Each naming context has its own counter,
//! shared by every kind requested in that context. Counters only grow, so a
//! name is never handed out twice even after its destination is removed.
//!
//! Temporary destinations get an opaque uuid-based token instead.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use super::DestinationKind;

/// The logical scope a name is generated for, e.g. a test case or a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamingContext {
    qualified_name: String,
}

impl NamingContext {
    /// Build a context from a scope and a case name. Anything after the first
    /// whitespace in `case` is dropped, so parameterized case descriptions
    /// collapse onto the same context.
    pub fn new(scope: &str, case: &str) -> Self {
        let case = case.split_whitespace().next().unwrap_or_default();
        let qualified_name = match (scope.is_empty(), case.is_empty()) {
            (true, _) => case.to_string(),
            (false, true) => scope.to_string(),
            (false, false) => format!("{scope}.{case}"),
        };
        Self { qualified_name }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}

#[derive(Debug)]
pub struct DestinationNamer {
    prefix: String,
    counters: Mutex<HashMap<String, u64>>,
}

impl Default for DestinationNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl DestinationNamer {
    pub const DEFAULT_PREFIX: &'static str = "TEST";

    pub fn new() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Produce the next name for `kind` in `context`.
    pub fn next(&self, context: &NamingContext, kind: DestinationKind) -> String {
        let sequence = self.bump(context);
        if kind.is_temporary() {
            format!("{}:{}", kind.as_str(), Uuid::new_v4().simple())
        } else {
            format!("{}.{}.{}", self.prefix, context.qualified_name, sequence)
        }
    }

    fn bump(&self, context: &NamingContext) -> u64 {
        // counters stay valid across a poisoned lock
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = counters
            .entry(context.qualified_name.clone())
            .or_insert(0);
        let current = *counter;
        *counter += 1;
        current
    }
}
