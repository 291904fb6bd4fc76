use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use rustc_hash::FxHashSet;
use serde::Serialize;
use string_interner::{backend::StringBackend, symbol::SymbolU32, StringInterner};

use crate::{
    automaton_error::AutomatonError,
    config::AutomatonConfig,
    state::{State, StateId},
    Symbol,
};

pub(crate) type Neighbours = BTreeMap<Symbol, StateId>;

/// A deterministic finite automaton over a finite alphabet of [`Symbol`]s.
///
/// States are kept in an arena keyed by [`StateId`]. Edges, the initial state and the
/// accepting set all refer to states through these handles.
///
/// Two construction contracts exist side by side:
/// - [`Automaton::from_parts`] validates every reference and rejects unknown ones;
/// - the mutation primitives ([`add_state`](Automaton::add_state),
///   [`add_edge`](Automaton::add_edge), ...) register whatever is missing.
#[derive(Debug, Clone)]
pub struct Automaton {
    names: StringInterner<StringBackend<SymbolU32>>,
    states: BTreeMap<StateId, Neighbours>,
    alphabet: BTreeSet<Symbol>,
    initial: StateId,
    accepting: BTreeSet<StateId>,
    config: AutomatonConfig,
}

impl Automaton {
    /// An automaton with a single, non-accepting state named `epsilon`.
    pub fn new() -> Self {
        Self::with_config(AutomatonConfig::default())
    }

    pub fn with_config(config: AutomatonConfig) -> Self {
        let initial = config.initial_state_name.clone();
        Self::with_initial_and_config(&initial, config)
    }

    /// An automaton whose only state is the non-accepting initial state `name`.
    pub fn with_initial(name: &str) -> Self {
        Self::with_initial_and_config(name, AutomatonConfig::default())
    }

    pub fn with_initial_and_config(name: &str, config: AutomatonConfig) -> Self {
        let mut names = StringInterner::<StringBackend<SymbolU32>>::new();
        let initial = StateId(names.get_or_intern(name));
        let mut states = BTreeMap::new();
        states.insert(initial, Neighbours::new());
        Self {
            names,
            states,
            alphabet: BTreeSet::new(),
            initial,
            accepting: BTreeSet::new(),
            config,
        }
    }

    /// Builds an automaton from an explicit description, rejecting any reference to a
    /// state or symbol that is not declared.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dfa_forge::Automaton;
    ///
    /// let dfa = Automaton::from_parts(
    ///     ["q0", "q1"],
    ///     ['a'],
    ///     "q0",
    ///     ["q1"],
    ///     [("q0", 'a', "q1"), ("q1", 'a', "q1")],
    /// )?;
    /// assert!(dfa.is_accepted("aaa"));
    /// assert!(!dfa.is_accepted(""));
    ///
    /// # Ok::<(), dfa_forge::AutomatonError>(())
    /// ```
    pub fn from_parts<'a>(
        states: impl IntoIterator<Item = &'a str>,
        alphabet: impl IntoIterator<Item = Symbol>,
        initial: &str,
        accepting: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, Symbol, &'a str)>,
    ) -> Result<Self, AutomatonError> {
        let states: Vec<&str> = states.into_iter().collect();
        let declared: FxHashSet<&str> = states.iter().copied().collect();
        let alphabet: BTreeSet<Symbol> = alphabet.into_iter().collect();
        let accepting: Vec<&str> = accepting.into_iter().collect();
        let edges: Vec<(&str, Symbol, &str)> = edges.into_iter().collect();

        if !declared.contains(initial) {
            return Err(AutomatonError::UnknownInitialState(initial.to_string()));
        }
        if let Some(state) = accepting.iter().find(|state| !declared.contains(*state)) {
            return Err(AutomatonError::UnknownAcceptingState(state.to_string()));
        }
        for &(from, symbol, to) in &edges {
            if let Some(missing) = [from, to].into_iter().find(|s| !declared.contains(s)) {
                return Err(AutomatonError::UnknownEdgeState {
                    from: from.to_string(),
                    symbol,
                    to: to.to_string(),
                    missing: missing.to_string(),
                });
            }
            if !alphabet.contains(&symbol) {
                return Err(AutomatonError::UnknownEdgeSymbol {
                    from: from.to_string(),
                    symbol,
                    to: to.to_string(),
                });
            }
        }

        let mut automaton = Self::with_initial(initial);
        for state in states {
            automaton.add_state(state);
        }
        for symbol in alphabet {
            automaton.add_symbol(symbol);
        }
        for state in accepting {
            automaton.add_terminal_state(state);
        }
        for (from, symbol, to) in edges {
            automaton.add_edge(from, symbol, to);
        }
        Ok(automaton)
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.accepting.iter().copied()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn contains_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// The name behind a handle issued by this automaton.
    pub fn name(&self, id: StateId) -> Option<&str> {
        self.names.resolve(id.0)
    }

    /// Looks up a registered state by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names
            .get(name)
            .map(StateId)
            .filter(|id| self.states.contains_key(id))
    }

    pub fn resolve(&self, name: &str) -> Result<StateId, AutomatonError> {
        self.state_id(name)
            .ok_or_else(|| AutomatonError::UnknownState(name.to_string()))
    }

    /// Outgoing edges of `id`, ordered by symbol. Empty for unregistered handles.
    pub fn edges(&self, id: StateId) -> impl Iterator<Item = (Symbol, StateId)> + '_ {
        self.states
            .get(&id)
            .into_iter()
            .flat_map(|neighbours| neighbours.iter().map(|(&symbol, &target)| (symbol, target)))
    }

    /// Snapshot of a registered state with its edge targets resolved to names.
    pub fn state(&self, id: StateId) -> Option<State> {
        let neighbours = self.states.get(&id)?;
        Some(State {
            name: self.label(id).to_string(),
            neighbours: neighbours
                .iter()
                .map(|(&symbol, &target)| (symbol, self.label(target).to_string()))
                .collect(),
        })
    }

    /// Registers a state named `name` unless one already exists, and returns its handle.
    pub fn add_state(&mut self, name: &str) -> StateId {
        let id = StateId(self.names.get_or_intern(name));
        self.states.entry(id).or_default();
        id
    }

    /// Installs `state`, replacing any state registered under the same name.
    ///
    /// Edge targets and symbols that are not registered yet are added.
    pub fn insert_state(&mut self, state: State) -> StateId {
        let id = StateId(self.names.get_or_intern(&state.name));
        let mut neighbours = Neighbours::new();
        for (symbol, target) in &state.neighbours {
            self.add_symbol(*symbol);
            neighbours.insert(*symbol, self.add_state(target));
        }
        self.states.insert(id, neighbours);
        id
    }

    pub fn add_terminal_state(&mut self, name: &str) -> StateId {
        let id = self.add_state(name);
        self.mark_terminal(id);
        id
    }

    pub(crate) fn mark_terminal(&mut self, id: StateId) {
        self.accepting.insert(id);
    }

    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.alphabet.insert(symbol);
    }

    /// Sets the edge `from --symbol--> to`, registering the states and the symbol if
    /// needed. An existing edge on the same symbol is overwritten.
    pub fn add_edge(&mut self, from: &str, symbol: Symbol, to: &str) {
        let from = self.add_state(from);
        let to = self.add_state(to);
        self.link(from, symbol, to);
    }

    pub(crate) fn link(&mut self, from: StateId, symbol: Symbol, to: StateId) {
        self.alphabet.insert(symbol);
        self.states.entry(to).or_default();
        self.states.entry(from).or_default().insert(symbol, to);
    }

    /// Unregisters `id`. Edges of other states that point to it are left in place.
    pub fn remove_state(&mut self, id: StateId) -> Result<(), AutomatonError> {
        if id == self.initial {
            return Err(AutomatonError::InitialStateRemoval(
                self.label(id).to_string(),
            ));
        }
        self.detach(id);
        Ok(())
    }

    pub(crate) fn detach(&mut self, id: StateId) {
        self.states.remove(&id);
        self.accepting.remove(&id);
    }

    pub fn remove_terminal_state(&mut self, id: StateId) {
        self.accepting.remove(&id);
    }

    pub fn remove_edge(&mut self, id: StateId, symbol: Symbol) {
        if let Some(neighbours) = self.states.get_mut(&id) {
            neighbours.remove(&symbol);
        }
    }

    pub fn is_terminal(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }

    pub fn walk_edge(&self, id: StateId, symbol: Symbol) -> Option<StateId> {
        self.states.get(&id)?.get(&symbol).copied()
    }

    /// Like [`Automaton::walk_edge`], but ignores edges into states that were removed.
    pub(crate) fn live_edge(&self, id: StateId, symbol: Symbol) -> Option<StateId> {
        self.walk_edge(id, symbol)
            .filter(|target| self.states.contains_key(target))
    }

    /// Whether every registered state has an edge on every symbol of the alphabet
    /// leading to a registered state.
    pub fn is_complete(&self) -> bool {
        self.state_ids().all(|id| {
            self.alphabet
                .iter()
                .all(|&symbol| self.live_edge(id, symbol).is_some())
        })
    }

    /// A name derived from `base` that no registered state uses.
    pub(crate) fn fresh_name(&self, base: &str) -> String {
        if self.state_id(base).is_none() {
            return base.to_string();
        }
        let mut i = 0;
        loop {
            let name = format!("{base}_{i}");
            if self.state_id(&name).is_none() {
                return name;
            }
            i += 1;
        }
    }

    pub(crate) fn label(&self, id: StateId) -> &str {
        self.names.resolve(id.0).unwrap_or_default()
    }

    fn named_states(&self) -> BTreeMap<&str, BTreeMap<Symbol, &str>> {
        self.states
            .iter()
            .map(|(&id, neighbours)| {
                let edges = neighbours
                    .iter()
                    .map(|(&symbol, &target)| (symbol, self.label(target)))
                    .collect();
                (self.label(id), edges)
            })
            .collect()
    }

    fn named_accepting(&self) -> BTreeSet<&str> {
        self.accepting.iter().map(|&id| self.label(id)).collect()
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality: same alphabet, initial state name, state names, edges (by
/// target name) and accepting state names.
impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        self.alphabet == other.alphabet
            && self.label(self.initial) == other.label(other.initial)
            && self.named_accepting() == other.named_accepting()
            && self.named_states() == other.named_states()
    }
}

impl Eq for Automaton {}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn braced<I: IntoIterator<Item = String>>(items: I) -> String {
            format!("{{{}}}", items.into_iter().collect::<Vec<_>>().join(", "))
        }
        let mut lines = vec![
            format!("initial: {}", self.label(self.initial)),
            format!("alphabet: {}", braced(self.alphabet.iter().map(|s| s.to_string()))),
            format!(
                "accepting: {}",
                braced(self.named_accepting().into_iter().map(str::to_string))
            ),
        ];
        for (name, edges) in self.named_states() {
            lines.push(format!(
                "{}: {}",
                name,
                braced(
                    edges
                        .into_iter()
                        .map(|(symbol, target)| format!("{symbol} -> {target}"))
                )
            ));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

impl Serialize for Automaton {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self)
    }
}

#[cfg(test)]
mod test {
    use insta::assert_snapshot;

    use crate::{Automaton, AutomatonError, State};

    const NO_STATES: [&str; 0] = [];
    const NO_EDGES: [(&str, char, &str); 0] = [];

    fn sample() -> Automaton {
        Automaton::from_parts(
            ["epsilon", "a", "b"],
            ['a', 'b'],
            "epsilon",
            ["a"],
            [("epsilon", 'a', "a"), ("epsilon", 'b', "b"), ("a", 'a', "a")],
        )
        .unwrap()
    }

    #[test]
    fn empty_automaton() {
        let dfa = Automaton::new();
        assert_eq!(dfa.state_count(), 1);
        assert_eq!(dfa.name(dfa.initial_state()), Some("epsilon"));
        assert!(!dfa.is_terminal(dfa.initial_state()));
        assert!(dfa.alphabet().is_empty());
    }

    #[test]
    fn from_parts_rejects_unknown_initial_state() {
        let result = Automaton::from_parts(["q"], ['a'], "p", NO_STATES, NO_EDGES);
        assert_eq!(
            result.unwrap_err(),
            AutomatonError::UnknownInitialState("p".to_string())
        );
    }

    #[test]
    fn from_parts_rejects_unknown_accepting_state() {
        let result = Automaton::from_parts(["q"], ['a'], "q", ["p"], NO_EDGES);
        assert_eq!(
            result.unwrap_err(),
            AutomatonError::UnknownAcceptingState("p".to_string())
        );
    }

    #[test]
    fn from_parts_rejects_unknown_edge_endpoint() {
        let result = Automaton::from_parts(["q"], ['a'], "q", NO_STATES, [("q", 'a', "p")]);
        assert_eq!(
            result.unwrap_err(),
            AutomatonError::UnknownEdgeState {
                from: "q".to_string(),
                symbol: 'a',
                to: "p".to_string(),
                missing: "p".to_string(),
            }
        );
    }

    #[test]
    fn from_parts_rejects_unknown_edge_symbol() {
        let result = Automaton::from_parts(["q"], ['a'], "q", NO_STATES, [("q", 'b', "q")]);
        assert!(matches!(
            result,
            Err(AutomatonError::UnknownEdgeSymbol { symbol: 'b', .. })
        ));
    }

    #[test]
    fn add_edge_registers_missing_entities() {
        let mut dfa = Automaton::new();
        dfa.add_edge("epsilon", 'x', "fresh");
        let fresh = dfa.resolve("fresh").unwrap();
        assert!(dfa.alphabet().contains(&'x'));
        assert_eq!(dfa.walk_edge(dfa.initial_state(), 'x'), Some(fresh));
        assert_eq!(dfa.state_count(), 2);
    }

    #[test]
    fn add_edge_overwrites_previous_target() {
        let mut dfa = sample();
        dfa.add_edge("epsilon", 'a', "b");
        let b = dfa.resolve("b").unwrap();
        assert_eq!(dfa.walk_edge(dfa.initial_state(), 'a'), Some(b));
        assert_eq!(dfa.edges(dfa.initial_state()).count(), 2);
    }

    #[test]
    fn add_state_by_name_keeps_existing_state() {
        let mut dfa = sample();
        let a = dfa.add_state("a");
        assert_eq!(dfa.walk_edge(a, 'a'), Some(a));
        assert_eq!(dfa.state_count(), 3);
    }

    #[test]
    fn insert_state_replaces_existing_state() {
        let mut dfa = sample();
        let a = dfa.insert_state(State::new("a").with_edge('c', "d"));
        let d = dfa.resolve("d").unwrap();
        assert_eq!(dfa.walk_edge(a, 'a'), None);
        assert_eq!(dfa.walk_edge(a, 'c'), Some(d));
        assert!(dfa.alphabet().contains(&'c'));
        assert!(dfa.is_terminal(a));
        assert_eq!(dfa.state(a), Some(State::new("a").with_edge('c', "d")));
    }

    #[test]
    fn terminal_states_are_idempotent() {
        let mut dfa = Automaton::new();
        let q = dfa.add_terminal_state("q");
        dfa.add_terminal_state("q");
        assert!(dfa.is_terminal(q));
        assert_eq!(dfa.accepting_states().count(), 1);
        dfa.remove_terminal_state(q);
        assert!(!dfa.is_terminal(q));
        assert!(dfa.contains_state(q));
    }

    #[test]
    fn remove_initial_state_fails() {
        let mut dfa = sample();
        let before = dfa.clone();
        let result = dfa.remove_state(dfa.initial_state());
        assert_eq!(
            result,
            Err(AutomatonError::InitialStateRemoval("epsilon".to_string()))
        );
        assert_eq!(dfa, before);
    }

    #[test]
    fn remove_state_keeps_inbound_edges() {
        let mut dfa = sample();
        let a = dfa.resolve("a").unwrap();
        dfa.remove_state(a).unwrap();
        assert!(!dfa.contains_state(a));
        assert!(!dfa.is_terminal(a));
        assert_eq!(dfa.state_id("a"), None);
        assert_eq!(dfa.walk_edge(dfa.initial_state(), 'a'), Some(a));
        assert_eq!(dfa.walk_edge(a, 'a'), None);
        assert_eq!(
            dfa.resolve("a"),
            Err(AutomatonError::UnknownState("a".to_string()))
        );
    }

    #[test]
    fn readding_a_state_reuses_its_handle() {
        let mut dfa = sample();
        let b = dfa.resolve("b").unwrap();
        dfa.remove_state(b).unwrap();
        assert_eq!(dfa.add_state("b"), b);
    }

    #[test]
    fn remove_edge() {
        let mut dfa = sample();
        let initial = dfa.initial_state();
        dfa.remove_edge(initial, 'a');
        dfa.remove_edge(initial, 'z');
        assert_eq!(dfa.walk_edge(initial, 'a'), None);
        assert!(dfa.walk_edge(initial, 'b').is_some());
    }

    #[test]
    fn structural_equality() {
        assert_eq!(sample(), sample());

        let mut retargeted = sample();
        retargeted.add_edge("epsilon", 'b', "a");
        assert_ne!(sample(), retargeted);

        let renamed = Automaton::from_parts(
            ["start", "x", "y"],
            ['a', 'b'],
            "start",
            ["x"],
            [("start", 'a', "x"), ("start", 'b', "y"), ("x", 'a', "x")],
        )
        .unwrap();
        assert_ne!(sample(), renamed);
    }

    #[test]
    fn structural_equality_ignores_insertion_order() {
        let mut dfa = Automaton::new();
        dfa.add_symbol('b');
        dfa.add_edge("a", 'a', "a");
        dfa.add_edge("epsilon", 'b', "b");
        dfa.add_edge("epsilon", 'a', "a");
        dfa.add_terminal_state("a");
        assert_eq!(dfa, sample());
    }

    #[test]
    fn fresh_name_skips_registered_states() {
        let mut dfa = Automaton::new();
        assert_eq!(dfa.fresh_name("junkyard"), "junkyard");
        dfa.add_state("junkyard");
        dfa.add_state("junkyard_0");
        assert_eq!(dfa.fresh_name("junkyard"), "junkyard_1");
    }

    #[test]
    fn display() {
        assert_snapshot!(sample().to_string(), @r"
        initial: epsilon
        alphabet: {a, b}
        accepting: {a}
        a: {a -> a}
        b: {}
        epsilon: {a -> a, b -> b}
        ");
    }
}
