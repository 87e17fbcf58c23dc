//! Ready made part templates, registered under their snake case names by
//! [Registry::with_primitives](crate::Registry::with_primitives).
//!
//! Process functions don't know the width of the nets they drive, values are masked when they are
//! written, so the gates work on buses of any width.
mod gates;
mod memory;
mod sequential;
pub use gates::*;
pub use memory::*;
pub use sequential::*;

use crate::netlist::PartConfig;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Every primitive template shipped with the crate.
///
/// # Example
/// ```
/// # use netsim::primitives::Primitive;
/// # use std::str::FromStr;
/// assert_eq!(Primitive::Dff.name(), "dff");
/// assert_eq!(Primitive::from_str("nand").unwrap(), Primitive::Nand);
/// ```
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Primitive {
    Nand,
    And,
    Or,
    Xor,
    Not,
    Buffer,
    Mux,
    Add,
    High,
    Low,
    Register,
    Dff,
    Clock,
    Ram,
    Rom,
}

impl Primitive {
    /// Returns the key the primitive is registered under.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns a new [PartConfig] implementing the primitive.
    pub fn config(self) -> PartConfig {
        use Primitive::*;
        match self {
            Nand => nand(),
            And => and(),
            Or => or(),
            Xor => xor(),
            Not => not(),
            Buffer => buffer(),
            Mux => mux(),
            Add => add(),
            High => high(),
            Low => low(),
            Register => register(),
            Dff => dff(),
            Clock => clock(),
            Ram => ram(),
            Rom => rom(),
        }
    }
}
