use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{state::StateId, Automaton, Symbol};

impl Automaton {
    /// The minimal automaton recognizing the same language, built by Moore-style
    /// partition refinement on a completed and reduced copy of `self`.
    ///
    /// States of the result are named after their partition index.
    pub fn minimalize(&self) -> Automaton {
        let mut working = self.clone();
        working.complete();
        working.reduce_non_accessible_states();

        let alphabet: Vec<Symbol> = working.alphabet().iter().copied().collect();
        let (accepting, rejecting): (Vec<StateId>, Vec<StateId>) =
            working.state_ids().partition(|&id| working.is_terminal(id));
        let mut partitions: Vec<Vec<StateId>> = [accepting, rejecting]
            .into_iter()
            .filter(|partition| !partition.is_empty())
            .collect();
        let mut owner: FxHashMap<StateId, usize> = FxHashMap::default();
        for (index, partition) in partitions.iter().enumerate() {
            for &state in partition {
                owner.insert(state, index);
            }
        }

        'refine: loop {
            for index in 0..partitions.len() {
                for &symbol in &alphabet {
                    let groups = split(&partitions[index], |state| {
                        working
                            .walk_edge(state, symbol)
                            .and_then(|target| owner.get(&target).copied())
                    });
                    if groups.len() == 1 {
                        continue;
                    }
                    debug!(
                        partition = index,
                        symbol = %symbol,
                        parts = groups.len(),
                        "splitting partition"
                    );
                    let mut groups = groups.into_iter();
                    if let Some(first) = groups.next() {
                        partitions[index] = first;
                    }
                    for group in groups {
                        let new_index = partitions.len();
                        for &state in &group {
                            owner.insert(state, new_index);
                        }
                        partitions.push(group);
                    }
                    continue 'refine;
                }
            }
            break;
        }
        debug!(
            before = working.state_count(),
            after = partitions.len(),
            "minimized automaton"
        );

        let initial = owner
            .get(&working.initial_state())
            .copied()
            .unwrap_or_default();
        let mut minimal =
            Automaton::with_initial_and_config(&initial.to_string(), self.config().clone());
        for &symbol in &alphabet {
            minimal.add_symbol(symbol);
        }
        for (index, partition) in partitions.iter().enumerate() {
            let name = index.to_string();
            minimal.add_state(&name);
            let Some(&representative) = partition.first() else {
                continue;
            };
            if working.is_terminal(representative) {
                minimal.add_terminal_state(&name);
            }
            for &symbol in &alphabet {
                let target = working
                    .walk_edge(representative, symbol)
                    .and_then(|target| owner.get(&target));
                if let Some(target) = target {
                    minimal.add_edge(&name, symbol, &target.to_string());
                }
            }
        }
        minimal
    }
}

/// Groups `states` by `key`, keeping groups in order of first appearance.
fn split<K: PartialEq>(states: &[StateId], key: impl Fn(StateId) -> K) -> Vec<Vec<StateId>> {
    let mut groups: Vec<(K, Vec<StateId>)> = Vec::new();
    for &state in states {
        let k = key(state);
        match groups.iter_mut().find(|(group_key, _)| *group_key == k) {
            Some((_, members)) => members.push(state),
            None => groups.push((k, vec![state])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}
