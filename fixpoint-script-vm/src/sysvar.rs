//! §9 redesign guidance: a system variable's lifecycle is a tagged enum —
//! `Alive { storage }` or `Disabled` — rather than a live pointer plus a
//! separate boolean flag the original tracks independently (and can, in
//! principle, desynchronise). `SYSENABLE`/`SYSDISABLE` drive the
//! transition and run the type's create/destroy hook exactly once per
//! edge.

use std::any::Any;

pub type SysStorage = Box<dyn Any + Send>;

pub enum SysVarState {
    Alive { storage: SysStorage },
    Disabled,
}

pub struct SysVar {
    pub type_name: String,
    pub state: SysVarState,
}

impl SysVar {
    pub fn new_disabled(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            state: SysVarState::Disabled,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.state, SysVarState::Alive { .. })
    }

    pub fn storage(&self) -> Option<&SysStorage> {
        match &self.state {
            SysVarState::Alive { storage } => Some(storage),
            SysVarState::Disabled => None,
        }
    }

    pub fn storage_mut(&mut self) -> Option<&mut SysStorage> {
        match &mut self.state {
            SysVarState::Alive { storage } => Some(storage),
            SysVarState::Disabled => None,
        }
    }

    /// `Disabled -> Alive`, running `create` to produce backing storage.
    /// A no-op (returns `false`) if already alive.
    pub fn enable(&mut self, create: impl FnOnce() -> SysStorage) -> bool {
        if self.is_alive() {
            return false;
        }
        self.state = SysVarState::Alive { storage: create() };
        true
    }

    /// `Alive -> Disabled`, running `destroy` on the outgoing storage. A
    /// no-op (returns `false`) if already disabled.
    pub fn disable(&mut self, destroy: impl FnOnce(SysStorage)) -> bool {
        match std::mem::replace(&mut self.state, SysVarState::Disabled) {
            SysVarState::Alive { storage } => {
                destroy(storage);
                true
            }
            SysVarState::Disabled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_then_disable_runs_hooks_exactly_once() {
        let mut var = SysVar::new_disabled("Timer");
        let mut created = 0;
        let mut destroyed = 0;
        assert!(var.enable(|| {
            created += 1;
            Box::new(0u32)
        }));
        assert!(var.is_alive());
        assert!(!var.enable(|| {
            created += 1;
            Box::new(0u32)
        }));
        assert_eq!(created, 1);

        assert!(var.disable(|_| destroyed += 1));
        assert!(!var.is_alive());
        assert!(!var.disable(|_| destroyed += 1));
        assert_eq!(destroyed, 1);
    }
}
