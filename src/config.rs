/// Names the automaton reserves for the states it creates on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomatonConfig {
    /// Name of the sole state of a freshly created automaton.
    pub initial_state_name: String,
    /// Name of the absorbing state added by [`Automaton::complete`](crate::Automaton::complete).
    pub sink_state_name: String,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            initial_state_name: "epsilon".to_string(),
            sink_state_name: "junkyard".to_string(),
        }
    }
}
