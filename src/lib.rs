//! Level scheduled evaluation of declarative digital logic netlists.
//!
//! A [NetlistConfig] lists nets, each with a width, a topological level and the part outputs
//! driving it, and parts, each instantiating a [PartConfig] template looked up in a [Registry].
//! A [Resolver] validates it and turns it into a [Circuit], which is then driven through
//! [Circuit::update].
//!
//! ```
//! # use netsim::{NetlistConfig, Registry, Resolver, BOUNDARY};
//! let mut config = NetlistConfig::new();
//! config.boundary(&["d"], &["q"]);
//! let d = config.net("d", 1, 0);
//! let q = config.net("q", 1, 0);
//! let register = config.part("r0", "register");
//! config.drive(BOUNDARY, "d", d);
//! config.wire(BOUNDARY, "q", q);
//! config.wire(register, "d", d);
//! config.drive(register, "q", q);
//!
//! let registry = Registry::with_primitives();
//! let mut circuit = Resolver::new(&registry).resolve(&config).unwrap();
//!
//! assert_eq!(circuit.update([("d", 1)]).unwrap()["q"], 0);
//! assert_eq!(circuit.update([("d", 1)]).unwrap()["q"], 1);
//! ```
#[macro_use]
pub mod netlist;
pub mod data_structures;
mod error;
pub mod primitives;
pub use error::*;
pub use netlist::*;
