use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{Automaton, Symbol};

/// Acceptance flag and labelled edges of one state, keyed by canonical label.
type CanonicalForm = BTreeMap<String, (bool, BTreeMap<Symbol, String>)>;

impl Automaton {
    /// Isomorphism test on the part of the automata reachable from their initial states.
    ///
    /// Every reachable state is labelled with the word that first reaches it in a
    /// breadth-first search exploring symbols in ascending order. Such labels do not
    /// depend on state names, so two automata are isomorphic exactly when they agree on
    /// the set of labels, on which labels accept and on where every labelled edge goes.
    pub fn semantic_eq(&self, other: &Automaton) -> bool {
        self.canonical_form() == other.canonical_form()
    }

    fn canonical_form(&self) -> CanonicalForm {
        let mut labels = FxHashMap::default();
        let mut queue = VecDeque::new();
        let mut form = CanonicalForm::new();
        labels.insert(self.initial_state(), String::new());
        queue.push_back(self.initial_state());
        while let Some(state) = queue.pop_front() {
            let label = labels[&state].clone();
            let mut edges = BTreeMap::new();
            for &symbol in self.alphabet() {
                let Some(target) = self.walk_edge(state, symbol) else {
                    continue;
                };
                let target_label = labels
                    .entry(target)
                    .or_insert_with(|| {
                        queue.push_back(target);
                        format!("{label}{symbol}")
                    })
                    .clone();
                edges.insert(symbol, target_label);
            }
            trace!(label = %label, edges = edges.len(), "labelled state");
            form.insert(label, (self.is_terminal(state), edges));
        }
        form
    }
}
