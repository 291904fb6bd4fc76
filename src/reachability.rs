use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::{state::StateId, Automaton, Symbol};

impl Automaton {
    /// Gives every state an edge on every symbol of the alphabet.
    ///
    /// Missing edges, and edges into states that were removed, are redirected to a
    /// non-accepting sink state with a self-loop on each symbol. The sink is only
    /// created when at least one edge is missing, which makes the operation idempotent.
    pub fn complete(&mut self) {
        let alphabet: Vec<Symbol> = self.alphabet().iter().copied().collect();
        let mut missing: Vec<(StateId, Symbol)> = Vec::new();
        for id in self.state_ids() {
            for &symbol in &alphabet {
                if self.live_edge(id, symbol).is_none() {
                    missing.push((id, symbol));
                }
            }
        }
        if missing.is_empty() {
            return;
        }
        let sink = self.sink_state();
        debug!(
            sink = self.label(sink),
            edges = missing.len(),
            "completing automaton"
        );
        for (id, symbol) in missing {
            self.link(id, symbol, sink);
        }
        for symbol in alphabet {
            self.link(sink, symbol, sink);
        }
    }

    /// The state named after the configured sink if it is already an absorbing,
    /// non-accepting state, or a newly registered one otherwise.
    fn sink_state(&mut self) -> StateId {
        let base = self.config().sink_state_name.clone();
        if let Some(id) = self.state_id(&base) {
            let absorbing = self.edges(id).all(|(_, target)| target == id);
            if absorbing && !self.is_terminal(id) && id != self.initial_state() {
                return id;
            }
        }
        let name = self.fresh_name(&base);
        self.add_state(&name)
    }

    /// States reachable from the initial state.
    pub fn accessible_states(&self) -> FxHashSet<StateId> {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(self.initial_state());
        queue.push_back(self.initial_state());
        while let Some(state) = queue.pop_front() {
            for &symbol in self.alphabet() {
                if let Some(target) = self.walk_edge(state, symbol) {
                    if visited.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        visited
    }

    /// States from which some accepting state can be reached.
    pub fn co_accessible_states(&self) -> FxHashSet<StateId> {
        let mut predecessors: FxHashMap<StateId, Vec<StateId>> = FxHashMap::default();
        for id in self.state_ids() {
            for (_, target) in self.edges(id) {
                predecessors.entry(target).or_default().push(id);
            }
        }
        let mut visited: FxHashSet<StateId> = self.accepting_states().collect();
        let mut queue: VecDeque<StateId> = visited.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            for &source in predecessors.get(&state).into_iter().flatten() {
                if visited.insert(source) {
                    queue.push_back(source);
                }
            }
        }
        visited
    }

    /// Removes every state that cannot be reached from the initial state.
    pub fn reduce_non_accessible_states(&mut self) {
        let accessible = self.accessible_states();
        let unreachable: Vec<StateId> = self
            .state_ids()
            .filter(|id| !accessible.contains(id))
            .collect();
        if unreachable.is_empty() {
            return;
        }
        debug!(removed = unreachable.len(), "pruning non accessible states");
        for id in unreachable {
            trace!(state = self.label(id), "removing state");
            self.detach(id);
        }
    }
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;

    use crate::{Automaton, AutomatonConfig};

    fn partial() -> Automaton {
        let mut dfa = Automaton::new();
        dfa.add_symbol('b');
        dfa.add_edge("epsilon", 'a', "a");
        dfa.add_terminal_state("a");
        dfa
    }

    #[test]
    fn complete_adds_sink() {
        let mut dfa = partial();
        assert!(!dfa.is_complete());
        dfa.complete();
        assert!(dfa.is_complete());
        let sink = dfa.resolve("junkyard").unwrap();
        assert!(!dfa.is_terminal(sink));
        assert_snapshot!(dfa.to_string(), @r"
        initial: epsilon
        alphabet: {a, b}
        accepting: {a}
        a: {a -> junkyard, b -> junkyard}
        epsilon: {a -> a, b -> junkyard}
        junkyard: {a -> junkyard, b -> junkyard}
        ");
    }

    #[test]
    fn complete_is_idempotent() {
        let mut once = partial();
        once.complete();
        let mut twice = once.clone();
        twice.complete();
        assert_eq!(once, twice);
    }

    #[test]
    fn complete_on_total_automaton_adds_nothing() {
        let mut dfa = Automaton::new();
        dfa.add_edge("epsilon", 'a', "epsilon");
        let before = dfa.clone();
        dfa.complete();
        assert_eq!(dfa, before);
        assert_eq!(dfa.state_id("junkyard"), None);
    }

    #[test]
    fn complete_with_empty_alphabet_adds_nothing() {
        let mut dfa = Automaton::new();
        dfa.add_state("lonely");
        dfa.complete();
        assert_eq!(dfa.state_count(), 2);
    }

    #[test]
    fn complete_reuses_sink_after_alphabet_grows() {
        let mut dfa = partial();
        dfa.complete();
        dfa.add_symbol('c');
        dfa.complete();
        let sink = dfa.resolve("junkyard").unwrap();
        assert_eq!(dfa.state_count(), 3);
        assert_eq!(dfa.walk_edge(sink, 'c'), Some(sink));
        assert!(dfa.is_complete());
    }

    #[test]
    fn complete_avoids_user_state_named_like_sink() {
        let mut dfa = partial();
        dfa.add_edge("a", 'a', "junkyard");
        dfa.add_terminal_state("junkyard");
        dfa.complete();
        let sink = dfa.resolve("junkyard_0").unwrap();
        let user = dfa.resolve("junkyard").unwrap();
        assert!(dfa.is_terminal(user));
        assert!(!dfa.is_terminal(sink));
        assert_eq!(dfa.walk_edge(user, 'a'), Some(sink));
    }

    #[test]
    fn complete_uses_configured_sink_name() {
        let config = AutomatonConfig {
            initial_state_name: "start".to_string(),
            sink_state_name: "trap".to_string(),
        };
        let mut dfa = Automaton::with_config(config);
        dfa.add_symbol('a');
        dfa.complete();
        let trap = dfa.resolve("trap").unwrap();
        assert_eq!(dfa.walk_edge(dfa.initial_state(), 'a'), Some(trap));
    }

    #[test]
    fn reduce_removes_unreachable_states() {
        let mut dfa = partial();
        dfa.add_edge("island", 'a', "a");
        dfa.add_terminal_state("island");
        let original = dfa.clone();
        dfa.reduce_non_accessible_states();
        assert_eq!(dfa.state_id("island"), None);
        assert_eq!(dfa.state_count(), 2);
        assert!(dfa.semantic_eq(&original));
        assert_ne!(dfa, original);
    }

    #[test]
    fn reduce_is_idempotent() {
        let mut dfa = partial();
        dfa.add_edge("island", 'b', "other");
        dfa.reduce_non_accessible_states();
        let once = dfa.clone();
        dfa.reduce_non_accessible_states();
        assert_eq!(dfa, once);
    }

    #[test]
    fn reduce_tolerates_dangling_edges() {
        let mut dfa = partial();
        let a = dfa.resolve("a").unwrap();
        dfa.remove_state(a).unwrap();
        dfa.reduce_non_accessible_states();
        assert_eq!(dfa.state_count(), 1);
        assert!(!dfa.is_accepted("a"));
    }

    #[test]
    fn complete_redirects_edges_into_removed_states() {
        let mut dfa = partial();
        let a = dfa.resolve("a").unwrap();
        dfa.remove_state(a).unwrap();
        assert!(!dfa.is_complete());
        dfa.complete();
        assert!(dfa.is_complete());
        let sink = dfa.resolve("junkyard").unwrap();
        assert_eq!(dfa.walk_edge(dfa.initial_state(), 'a'), Some(sink));
        assert_snapshot!(dfa.to_string(), @r"
        initial: epsilon
        alphabet: {a, b}
        accepting: {}
        epsilon: {a -> junkyard, b -> junkyard}
        junkyard: {a -> junkyard, b -> junkyard}
        ");
    }

    #[test]
    fn complete_after_removing_the_sink() {
        let mut dfa = partial();
        dfa.complete();
        let sink = dfa.resolve("junkyard").unwrap();
        dfa.remove_state(sink).unwrap();
        dfa.complete();
        assert!(dfa.is_complete());
        assert_eq!(dfa.state_count(), 3);
        assert!(dfa.is_accepted("a"));
        assert!(!dfa.is_accepted("ab"));
    }

    #[test]
    fn co_accessible_states() {
        let mut dfa = partial();
        dfa.add_edge("epsilon", 'b', "dead");
        let co_accessible = dfa.co_accessible_states();
        assert!(co_accessible.contains(&dfa.initial_state()));
        assert!(co_accessible.contains(&dfa.resolve("a").unwrap()));
        assert!(!co_accessible.contains(&dfa.resolve("dead").unwrap()));
    }
}
