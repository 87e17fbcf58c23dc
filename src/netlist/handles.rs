use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Represents the index of a net in a [Circuit](super::Circuit) or [NetlistConfig](super::NetlistConfig).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetIndex {
    pub(crate) idx: usize,
}

/// Represents the index of a part in a [Circuit](super::Circuit) or [NetlistConfig](super::NetlistConfig).
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartIndex {
    pub(crate) idx: usize,
}

/// Returns a new NetIndex from a provided usize.
macro_rules! ni {
    ( $x:expr ) => {{
        $crate::netlist::NetIndex::new($x)
    }};
}

/// Returns a new PartIndex from a provided usize.
macro_rules! pi {
    ( $x:expr ) => {{
        $crate::netlist::PartIndex::new($x)
    }};
}

/// The [PartIndex] of the boundary part, whose pins are the circuit's own interface.
///
/// The boundary part is never triggered.
pub const BOUNDARY: PartIndex = pi!(0);

impl NetIndex {
    pub const fn new(idx: usize) -> NetIndex {
        NetIndex { idx }
    }

    /// Returns the position of the net in the netlist.
    pub fn index(&self) -> usize {
        self.idx
    }
}

impl PartIndex {
    pub const fn new(idx: usize) -> PartIndex {
        PartIndex { idx }
    }

    /// Returns the position of the part in the netlist.
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Returns true if `self` is [BOUNDARY].
    pub fn is_boundary(&self) -> bool {
        *self == BOUNDARY
    }
}

impl Display for NetIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}

impl Display for PartIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}

impl From<usize> for NetIndex {
    fn from(idx: usize) -> Self {
        ni!(idx)
    }
}

impl From<usize> for PartIndex {
    fn from(idx: usize) -> Self {
        pi!(idx)
    }
}
