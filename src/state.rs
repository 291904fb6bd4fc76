use std::collections::BTreeMap;
use std::fmt::Display;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::Serialize;
use string_interner::symbol::SymbolU32;

use crate::Symbol;

/// Handle of a state inside the [`Automaton`](crate::Automaton) that issued it.
///
/// The handle is the interned name of the state, so a name always maps to the same
/// handle within one automaton, even after the state was removed and added again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) SymbolU32);

/// A named state together with its outgoing edges, detached from any automaton.
///
/// Edge targets are kept by name, which makes two states with the same name and the
/// same `symbol -> target name` edges equal regardless of where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    pub name: String,
    pub neighbours: BTreeMap<Symbol, String>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            neighbours: BTreeMap::new(),
        }
    }

    /// Adds (or redefines) the edge on `symbol`. The last definition wins.
    pub fn with_edge(mut self, symbol: Symbol, target: impl Into<String>) -> Self {
        self.neighbours.insert(symbol, target.into());
        self
    }

    pub fn walk_edge(&self, symbol: Symbol) -> Option<&str> {
        self.neighbours.get(&symbol).map(String::as_str)
    }

    /// Compares the shape of the outgoing edges rather than the names.
    ///
    /// Both states must leave on the same symbols, and two symbols must share a
    /// target in `self` exactly when they share a target in `other`.
    pub fn semantic_eq(&self, other: &State) -> bool {
        same_target_pattern(&self.neighbours, &other.neighbours)
    }
}

pub(crate) fn same_target_pattern<T: Eq + Hash>(
    left: &BTreeMap<Symbol, T>,
    right: &BTreeMap<Symbol, T>,
) -> bool {
    if !left.keys().eq(right.keys()) {
        return false;
    }
    let mut forward: FxHashMap<&T, &T> = FxHashMap::default();
    let mut backward: FxHashMap<&T, &T> = FxHashMap::default();
    for (l, r) in left.values().zip(right.values()) {
        if *forward.entry(l).or_insert(r) != r || *backward.entry(r).or_insert(l) != l {
            return false;
        }
    }
    true
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let edges = self
            .neighbours
            .iter()
            .map(|(symbol, target)| format!("{symbol} -> {target}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}: {{{}}}", self.name, edges)
    }
}

impl Serialize for State {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self)
    }
}
