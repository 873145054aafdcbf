//! Screen transitions and the in-flight (`busy`) gate.
//!
//! A screen change happens in two steps: the engine accepts a request and
//! parks it as pending, which raises `busy`; after [`TRANSITION_DELAY`] the
//! caller completes it, which applies the change and lowers `busy`. While a
//! transition is pending every intent is ignored.

use std::time::Duration;

use crate::model::CategoryId;

/// Delay between accepting a screen change and applying it.
pub const TRANSITION_DELAY: Duration = Duration::from_millis(300);

/// A screen change waiting to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// `Home → Quiz` for a category (multi-category mode).
    OpenCategory(CategoryId),
    /// `Home → Quiz` (single-category mode).
    Start,
    /// `Quiz → Results`, committing the live selection.
    Finish,
    /// `Results → Quiz` with the session reset.
    Restart,
    /// `Quiz | Results → Home` (multi-category mode).
    Home,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TransitionGate {
    pending: Option<Transition>,
}

impl TransitionGate {
    pub(crate) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn pending(&self) -> Option<&Transition> {
        self.pending.as_ref()
    }

    /// Park `transition`. Returns false if another one is already in flight.
    pub(crate) fn begin(&mut self, transition: Transition) -> bool {
        if self.pending.is_some() {
            return false;
        }
        tracing::debug!(?transition, "transition started");
        self.pending = Some(transition);
        true
    }

    pub(crate) fn take(&mut self) -> Option<Transition> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_while_busy() {
        let mut gate = TransitionGate::default();
        assert!(!gate.is_busy());
        assert!(gate.begin(Transition::Finish));
        assert!(gate.is_busy());
        assert!(!gate.begin(Transition::Home));
        assert_eq!(gate.pending(), Some(&Transition::Finish));
        assert_eq!(gate.take(), Some(Transition::Finish));
        assert!(!gate.is_busy());
    }
}
