//! Errors raised while resolving a netlist or evaluating a [Circuit](crate::Circuit).

use crate::data_structures::{InvalidSlice, Slice, Word};
use crate::netlist::{NetIndex, PartIndex};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the kernel surfaces to its caller.
///
/// Resolution errors are returned before any evaluation happens.
/// [Error::UndefinedSignal] is the only error an evaluation can hit on a netlist that resolved
/// successfully, apart from bad arguments to the public API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A word was read before anything assigned it. During [update](crate::Circuit::update)
    /// this means the levels or sources of the netlist disagree with its real dependency order,
    /// or the net has no driver at all.
    #[error("undefined {word} signal on net {net} ({name})")]
    UndefinedSignal {
        net: NetIndex,
        name: String,
        word: Word,
    },

    /// A part references a template key that is neither registered nor declared in the netlist.
    #[error("part {part} references unregistered part config `{key}`")]
    UnregisteredPartConfig { part: PartIndex, key: String },

    /// A part references a widget key with no registered factory.
    #[error("part {part} references unregistered widget `{key}`")]
    UnregisteredWidget { part: PartIndex, key: String },

    /// The netlist has no parts, so there is no boundary part describing its interface.
    #[error("netlist has no boundary part")]
    MissingBoundary,

    /// A net width outside of `1..=32`.
    #[error("net {net} has invalid width {width}")]
    InvalidWidth { net: NetIndex, width: u8 },

    /// Nets must be listed in non-decreasing level order.
    #[error("net {net} has level {level} which is lower than the previous level {previous}")]
    LevelOrder {
        net: NetIndex,
        level: u32,
        previous: u32,
    },

    /// A combinational output drives `net` while one of the part's trigger inputs reads
    /// `input_net`, whose level is not strictly lower.
    #[error("net {net} (level {level}) is driven by part {part} which reads net {input_net} (level {input_level})")]
    LevelDependency {
        net: NetIndex,
        level: u32,
        part: PartIndex,
        input_net: NetIndex,
        input_level: u32,
    },

    /// A net index that does not exist.
    #[error("net index {net} is out of range ({len} nets)")]
    NetOutOfRange { net: NetIndex, len: usize },

    /// A part index that does not exist.
    #[error("part index {part} is out of range ({len} parts)")]
    PartOutOfRange { part: PartIndex, len: usize },

    /// A pin name that the relevant template does not declare.
    #[error("part {part} has no pin `{pin}`")]
    UnknownPin { part: PartIndex, pin: String },

    /// A declared pin that needs wiring but has none.
    #[error("pin `{pin}` of part {part} is not wired")]
    UnwiredPin { part: PartIndex, pin: String },

    /// A slice reaching past the width of the net it addresses.
    #[error("slice {slice} does not fit net {net} of width {width}")]
    SliceOutOfRange {
        net: NetIndex,
        slice: Slice,
        width: u8,
    },

    /// A net lists a source whose pin is wired somewhere else.
    #[error("net {net} lists pin `{pin}` of part {part} as a source, but that pin is not wired to it")]
    SourceMismatch {
        net: NetIndex,
        part: PartIndex,
        pin: String,
    },

    /// A stimulus sequence handed to [trace](crate::Circuit::trace) has inconsistent lengths.
    #[error("stimulus for pin `{pin}` has {len} steps, expected {expected}")]
    StimulusLength {
        pin: String,
        len: usize,
        expected: usize,
    },

    #[error(transparent)]
    InvalidSlice(#[from] InvalidSlice),

    #[error("malformed netlist config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
