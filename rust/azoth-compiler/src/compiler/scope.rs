//! Compile-time scope state threaded through every lowering call.
//!
//! The scope is an explicit value: each call receives the ambient state and
//! returns the state for whatever follows it in source order. Branching
//! constructs lower siblings from the same base scope and recombine the
//! results with [`Scope::merge`].

use crate::ExpandOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    /// Enclosing module name; `None` at the top level.
    pub module: Option<String>,
    /// Enclosing function name; set while lowering a function body.
    pub function: Option<String>,
    /// Source filename, for diagnostics.
    pub file: String,
    /// Set inside contexts where named local bindings are disallowed.
    pub no_local_naming: bool,
    /// Modules scheduled for compilation, in definition order. Append-only.
    pub scheduled: Vec<String>,
    pub opts: ExpandOptions,
    counter: u32,
    /// Variable binding table: name → hygiene id (`None` = forced literal name).
    vars: HashMap<String, Option<u32>>,
    /// Alias table: short name → full module name.
    aliases: HashMap<String, String>,
}

impl Scope {
    pub fn new(file: impl Into<String>) -> Self {
        Self::with_options(file, ExpandOptions::default())
    }

    pub fn with_options(file: impl Into<String>, opts: ExpandOptions) -> Self {
        Self {
            module: None,
            function: None,
            file: file.into(),
            no_local_naming: false,
            scheduled: Vec::new(),
            opts,
            counter: 0,
            vars: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Current hygiene counter value.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Advance the hygiene counter and return a fresh identifier id.
    pub fn next_id(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    /// Bind `name` hygienically, returning its fresh id.
    pub fn bind(&mut self, name: &str) -> u32 {
        let id = self.next_id();
        self.vars.insert(name.to_string(), Some(id));
        id
    }

    /// Bind `name` to its literal written form, bypassing hygiene.
    pub fn bind_forced(&mut self, name: &str) {
        self.vars.insert(name.to_string(), None);
    }

    /// Look up a binding. `Some(None)` means a forced literal binding.
    pub fn lookup(&self, name: &str) -> Option<Option<u32>> {
        self.vars.get(name).copied()
    }

    pub fn add_alias(&mut self, name: String, target: String) {
        self.aliases.insert(name, target);
    }

    pub fn resolve_alias(&self, segment: &str) -> Option<&str> {
        self.aliases.get(segment).map(String::as_str)
    }

    /// Record a module for compilation after lowering completes.
    pub fn schedule(&mut self, name: String) {
        self.scheduled.push(name);
    }

    /// True in module scope outside any function body, the required context
    /// for attribute access and definitions.
    pub fn module_scope(&self) -> bool {
        self.module.is_some() && self.function.is_none()
    }

    /// Recombine this (base) scope with a scope explored in a branch.
    ///
    /// Bindings, aliases, module nesting and flags come from the base, so
    /// branch-local bindings never leak. The hygiene counter takes the
    /// maximum advance seen on either side, keeping identifiers generated
    /// after the merge collision-free. The scheduled-module list is
    /// append-only and the explored side descends from the base, so the
    /// longer list wins.
    pub fn merge(&self, explored: &Scope) -> Scope {
        let mut merged = self.clone();
        merged.counter = self.counter.max(explored.counter);
        if explored.scheduled.len() > merged.scheduled.len() {
            merged.scheduled = explored.scheduled.clone();
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let mut scope = Scope::new("test.az");
        let a = scope.next_id();
        let b = scope.bind("x");
        assert!(b > a);
        assert_eq!(scope.counter(), b);
    }

    #[test]
    fn test_merge_takes_max_counter() {
        let mut base = Scope::new("test.az");
        base.next_id();
        let mut left = base.clone();
        let mut right = base.clone();
        left.next_id();
        right.next_id();
        right.next_id();
        let merged = base.merge(&left).merge(&right);
        assert_eq!(merged.counter(), right.counter());
    }

    #[test]
    fn test_merge_keeps_base_bindings() {
        let base = Scope::new("test.az");
        let mut branch = base.clone();
        branch.bind("leaky");
        let merged = base.merge(&branch);
        assert_eq!(merged.lookup("leaky"), None);
        assert_eq!(merged.counter(), branch.counter());
    }

    #[test]
    fn test_merge_keeps_longer_schedule() {
        let mut base = Scope::new("test.az");
        base.schedule("A".to_string());
        let mut branch = base.clone();
        branch.schedule("A.B".to_string());
        let merged = base.merge(&branch);
        assert_eq!(merged.scheduled, vec!["A".to_string(), "A.B".to_string()]);
    }

    #[test]
    fn test_forced_binding_shadows_hygienic() {
        let mut scope = Scope::new("test.az");
        scope.bind("x");
        scope.bind_forced("x");
        assert_eq!(scope.lookup("x"), Some(None));
    }

    #[test]
    fn test_module_scope_predicate() {
        let mut scope = Scope::new("test.az");
        assert!(!scope.module_scope());
        scope.module = Some("Net".to_string());
        assert!(scope.module_scope());
        scope.function = Some("connect".to_string());
        assert!(!scope.module_scope());
    }
}
