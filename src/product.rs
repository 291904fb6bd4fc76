//! Synchronized products of two automata.
//!
//! [`zip`] explores the reachable part of a product whose states are *sets* of states
//! drawn from both operands. The same search yields [`intersection`], [`union`] and
//! [`concatenation`]; they only differ in how the search is seeded and in which product
//! states they accept.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{state::StateId, Automaton, Symbol};

/// A state of one of the two operands of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Member {
    Left(StateId),
    Right(StateId),
}

impl Member {
    /// Whether the member accepts in the operand it belongs to.
    pub fn is_accepting(self, left: &Automaton, right: &Automaton) -> bool {
        match self {
            Member::Left(id) => left.is_terminal(id),
            Member::Right(id) => right.is_terminal(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ProductState {
    members: BTreeSet<Member>,
}

impl ProductState {
    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        self.members.iter().copied()
    }

    pub fn left(&self) -> impl Iterator<Item = StateId> + '_ {
        self.members().filter_map(|member| match member {
            Member::Left(id) => Some(id),
            Member::Right(_) => None,
        })
    }

    pub fn right(&self) -> impl Iterator<Item = StateId> + '_ {
        self.members().filter_map(|member| match member {
            Member::Left(_) => None,
            Member::Right(id) => Some(id),
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Member> for ProductState {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

/// How the right operand enters the product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Splice {
    /// Both operands start together and advance in lockstep.
    Parallel,
    /// Only the left operand starts. Whenever it reaches one of `triggers`, the right
    /// operand is started again from `injected`. This is the trigger set and injected
    /// state pair of the product construction; concatenation uses the accepting states
    /// of the left operand and the initial state of the right one.
    Sequential {
        triggers: BTreeSet<StateId>,
        injected: StateId,
    },
}

impl Splice {
    fn seed(&self, left: &Automaton, right: &Automaton) -> ProductState {
        let mut seed = ProductState::default();
        self.enter(&mut seed, left.initial_state());
        if matches!(self, Splice::Parallel) {
            seed.members.insert(Member::Right(right.initial_state()));
        }
        seed
    }

    /// Adds the left state `id` and, if it triggers, the injected right state.
    fn enter(&self, product: &mut ProductState, id: StateId) {
        product.members.insert(Member::Left(id));
        if let Splice::Sequential { triggers, injected } = self {
            if triggers.contains(&id) {
                product.members.insert(Member::Right(*injected));
            }
        }
    }

    fn step(
        &self,
        product: &ProductState,
        symbol: Symbol,
        left: &Automaton,
        right: &Automaton,
    ) -> ProductState {
        let mut next = ProductState::default();
        for member in product.members() {
            match member {
                Member::Left(id) => {
                    if let Some(target) = left.walk_edge(id, symbol) {
                        self.enter(&mut next, target);
                    }
                }
                Member::Right(id) => {
                    if let Some(target) = right.walk_edge(id, symbol) {
                        next.members.insert(Member::Right(target));
                    }
                }
            }
        }
        next
    }
}

/// Breadth-first construction of the product of `left` and `right`.
///
/// Both operands are first extended to the joint alphabet and completed, in place.
/// Product states are named `0`, `1`, ... in discovery order, exploring symbols in
/// ascending order. Once the search is done, `accept` decides for every product state
/// whether it is accepting.
pub fn zip<F>(left: &mut Automaton, right: &mut Automaton, splice: &Splice, accept: F) -> Automaton
where
    F: Fn(&ProductState, &Automaton, &Automaton) -> bool,
{
    let alphabet: BTreeSet<Symbol> = left.alphabet().union(right.alphabet()).copied().collect();
    for &symbol in &alphabet {
        left.add_symbol(symbol);
        right.add_symbol(symbol);
    }
    left.complete();
    right.complete();
    let left: &Automaton = left;
    let right: &Automaton = right;

    let mut product = Automaton::with_initial_and_config("0", left.config().clone());
    for &symbol in &alphabet {
        product.add_symbol(symbol);
    }
    let mut discovered: Vec<ProductState> = vec![splice.seed(left, right)];
    let mut index: FxHashMap<ProductState, usize> = FxHashMap::default();
    index.insert(discovered[0].clone(), 0);
    let mut queue = VecDeque::from([0usize]);
    while let Some(current) = queue.pop_front() {
        let from = current.to_string();
        for &symbol in &alphabet {
            let next = splice.step(&discovered[current], symbol, left, right);
            let target = match index.get(&next) {
                Some(&target) => target,
                None => {
                    let target = discovered.len();
                    trace!(state = target, members = next.len(), "discovered product state");
                    index.insert(next.clone(), target);
                    discovered.push(next);
                    queue.push_back(target);
                    target
                }
            };
            product.add_edge(&from, symbol, &target.to_string());
        }
    }
    debug!(states = discovered.len(), "built product automaton");

    for (id, state) in discovered.iter().enumerate() {
        if accept(state, left, right) {
            product.add_terminal_state(&id.to_string());
        }
    }
    product
}

/// Accepts the words accepted by both `left` and `right`.
pub fn intersection(left: &Automaton, right: &Automaton) -> Automaton {
    let (mut left, mut right) = (left.clone(), right.clone());
    zip(&mut left, &mut right, &Splice::Parallel, |state, left, right| {
        state.members().all(|member| member.is_accepting(left, right))
    })
}

/// Accepts the words accepted by `left` or `right`.
pub fn union(left: &Automaton, right: &Automaton) -> Automaton {
    let (mut left, mut right) = (left.clone(), right.clone());
    zip(&mut left, &mut right, &Splice::Parallel, |state, left, right| {
        state.members().any(|member| member.is_accepting(left, right))
    })
}

/// Accepts the words `uv` where `left` accepts `u` and `right` accepts `v`.
pub fn concatenation(left: &Automaton, right: &Automaton) -> Automaton {
    let (mut left, mut right) = (left.clone(), right.clone());
    let splice = Splice::Sequential {
        triggers: left.accepting_states().collect(),
        injected: right.initial_state(),
    };
    zip(&mut left, &mut right, &splice, |state, _, right| {
        state.right().any(|id| right.is_terminal(id))
    })
}
