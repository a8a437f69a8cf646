//! §4.4 "Scopes" — a stack of [`Namespace`]s, each resolving a name in
//! itself before falling back to its parent; the outermost scope is the
//! function/program's top level. The system namespace lives outside this
//! chain entirely (consulted only by `Sys*` opcodes), matching spec.md's
//! "system variables are never shadowed by a local of the same name" rule.

use crate::namespace::Namespace;

pub struct ScopeStack {
    scopes: Vec<Namespace<u32>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Namespace::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Namespace::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn declare(&mut self, name: &str, slot: u32) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name, slot);
    }

    /// Resolve `name` from the innermost scope outward.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.scopes.iter().rev().find_map(|s| s.get(name).copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut stack = ScopeStack::new();
        stack.declare("x", 0);
        stack.push_scope();
        stack.declare("x", 8);
        assert_eq!(stack.resolve("x"), Some(8));
        stack.pop_scope();
        assert_eq!(stack.resolve("x"), Some(0));
    }

    #[test]
    fn outer_scope_visible_through_inner() {
        let mut stack = ScopeStack::new();
        stack.declare("y", 16);
        stack.push_scope();
        assert_eq!(stack.resolve("y"), Some(16));
    }

    #[test]
    fn cannot_pop_the_outermost_scope() {
        let mut stack = ScopeStack::new();
        stack.pop_scope();
        assert_eq!(stack.depth(), 1);
    }
}
