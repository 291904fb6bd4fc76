//! dfa-forge - construction, transformation and comparison of deterministic finite automata.
//!
//! An [`Automaton`] owns its states, its alphabet of [`Symbol`]s, an initial state and a
//! set of accepting states. On top of the mutation primitives the crate provides
//! completion, reachability reduction, word acceptance, complementation, detection of
//! infinite languages, minimization and product constructions (intersection, union and
//! concatenation), along with structural (`==`) and isomorphism
//! ([`Automaton::semantic_eq`]) comparisons.
//!
//! ## How to use this library?
//!
//! ```rust
//! use dfa_forge::{concatenation, Automaton};
//!
//! let mut a_plus = Automaton::new();
//! a_plus.add_edge("epsilon", 'a', "more");
//! a_plus.add_edge("more", 'a', "more");
//! a_plus.add_terminal_state("more");
//!
//! let mut b_plus = Automaton::new();
//! b_plus.add_edge("epsilon", 'b', "more");
//! b_plus.add_edge("more", 'b', "more");
//! b_plus.add_terminal_state("more");
//!
//! let ab = concatenation(&a_plus, &b_plus).minimalize();
//! assert!(ab.is_accepted("aabb"));
//! assert!(!ab.is_accepted("ba"));
//! assert!(ab.has_loop());
//! ```

pub use automaton::Automaton;
pub use automaton_error::AutomatonError;
pub use config::AutomatonConfig;
pub use product::{concatenation, intersection, union, zip, Member, ProductState, Splice};
pub use state::{State, StateId};

pub mod automaton;
pub mod automaton_error;
pub mod config;
mod equivalence;
mod language;
mod minimization;
pub mod product;
mod reachability;
pub mod state;

/// An input symbol of an automaton.
pub type Symbol = char;
