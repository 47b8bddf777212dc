use statig::prelude::*;
use tracing::{debug, info};

/// Coarse finder lifecycle: *empty* until a token is activated, *active*
/// afterwards. There is no terminal state — activation re-enters *active*
/// for a new token at any time.
#[derive(Debug, Default)]
pub struct FinderLifecycle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Activate { token: String },
    Clear,
}

#[state_machine(initial = "State::empty()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl FinderLifecycle {
    #[state]
    fn empty(&mut self, event: &LifecycleEvent) -> Response<State> {
        match event {
            LifecycleEvent::Activate { token } => {
                info!(token = %token, "finder activated");
                Transition(State::active())
            }
            LifecycleEvent::Clear => Handled,
        }
    }

    #[state]
    fn active(&mut self, event: &LifecycleEvent) -> Response<State> {
        match event {
            LifecycleEvent::Activate { token } => {
                debug!(token = %token, "finder re-activated");
                Handled
            }
            LifecycleEvent::Clear => Transition(State::empty()),
        }
    }
}

/// Owning wrapper so the finder can drive and query the machine without
/// leaking generated state types.
pub struct Lifecycle {
    machine: statig::blocking::StateMachine<FinderLifecycle>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            machine: FinderLifecycle::default().state_machine(),
        }
    }

    pub fn activate(&mut self, token: &str) {
        self.machine.handle(&LifecycleEvent::Activate {
            token: token.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.machine.handle(&LifecycleEvent::Clear);
    }

    pub fn is_active(&self) -> bool {
        matches!(self.machine.state(), State::Active {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_activates() {
        let mut lifecycle = Lifecycle::new();
        assert!(!lifecycle.is_active());
        lifecycle.activate("runtime");
        assert!(lifecycle.is_active());
    }

    #[test]
    fn reactivation_stays_active_and_clear_empties() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.activate("runtime");
        lifecycle.activate("configuration");
        assert!(lifecycle.is_active());
        lifecycle.clear();
        assert!(!lifecycle.is_active());
    }
}
