use rustc_hash::FxHashSet;
use tracing::trace;

use crate::{state::StateId, Automaton};

impl Automaton {
    /// Runs `word` from the initial state. Symbols outside the alphabet and missing
    /// edges reject the word.
    pub fn is_accepted(&self, word: &str) -> bool {
        let mut state = self.initial_state();
        for symbol in word.chars() {
            if !self.alphabet().contains(&symbol) {
                return false;
            }
            match self.walk_edge(state, symbol) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_terminal(state)
    }

    /// Swaps accepting and non-accepting states.
    ///
    /// This only complements the language of a complete automaton; see
    /// [`Automaton::complemented`].
    pub fn complement(&mut self) {
        let rejecting: Vec<StateId> = self
            .state_ids()
            .filter(|&id| !self.is_terminal(id))
            .collect();
        let accepting: Vec<StateId> = self.accepting_states().collect();
        for id in accepting {
            self.remove_terminal_state(id);
        }
        for id in rejecting {
            self.mark_terminal(id);
        }
    }

    /// A complete copy of `self` recognizing the complement language.
    pub fn complemented(&self) -> Automaton {
        let mut complement = self.clone();
        complement.complete();
        complement.complement();
        complement
    }

    /// Whether the recognized language is infinite, i.e. some reachable cycle can
    /// still lead to an accepting state.
    pub fn has_loop(&self) -> bool {
        let productive = self.co_accessible_states();
        let initial = self.initial_state();
        let mut visited = FxHashSet::default();
        let mut on_stack = FxHashSet::default();
        let mut stack = vec![(initial, self.successors(initial))];
        visited.insert(initial);
        on_stack.insert(initial);
        while let Some((state, pending)) = stack.last_mut() {
            let state = *state;
            let Some(next) = pending.pop() else {
                on_stack.remove(&state);
                stack.pop();
                continue;
            };
            if on_stack.contains(&next) {
                trace!(from = self.label(state), to = self.label(next), "back edge");
                if productive.contains(&next) {
                    return true;
                }
            } else if visited.insert(next) {
                on_stack.insert(next);
                stack.push((next, self.successors(next)));
            }
        }
        false
    }

    /// Whether no accepting state is reachable.
    pub fn is_empty_language(&self) -> bool {
        !self
            .accessible_states()
            .into_iter()
            .any(|id| self.is_terminal(id))
    }

    fn successors(&self, id: StateId) -> Vec<StateId> {
        self.edges(id)
            .filter(|(symbol, _)| self.alphabet().contains(symbol))
            .map(|(_, target)| target)
            .collect()
    }
}
