/// State machine seam implemented by entity status enums.
///
/// Implementors encode the full transition table; managers call
/// `can_transition_to` before applying any status change so invalid
/// transitions are rejected in one place.
pub trait LifecycleState: Send + Sync + Clone + std::fmt::Debug {
    /// Check if this is a terminal state
    fn is_terminal(&self) -> bool;

    /// Check if transition to another state is valid
    fn can_transition_to(&self, next: &Self) -> bool;
}
