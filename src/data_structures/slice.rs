use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// Widest net the kernel supports, in bits.
pub const MAX_WIDTH: u8 = 32;

/// Returns a mask with the lowest `width` bits set.
///
/// # Example
///
/// ```
/// # use netsim::data_structures::low_mask;
/// assert_eq!(low_mask(1), 0b1);
/// assert_eq!(low_mask(4), 0xF);
/// assert_eq!(low_mask(32), u32::MAX);
/// ```
///
/// # Panics
///
/// Panics in debug mode if `width` is not in `1..=32`.
#[inline(always)]
pub fn low_mask(width: u8) -> u32 {
    debug_assert!(
        (1..=MAX_WIDTH).contains(&width),
        "Tried to build a mask of width:{}",
        width
    );
    // Shifting right keeps the 32 bit case from overflowing.
    u32::MAX >> (u32::from(MAX_WIDTH) - u32::from(width))
}

/// Returned when a slice is built with `high < low` or reaches past bit 31.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("invalid slice [{high}:{low}], expected 32 > high >= low")]
pub struct InvalidSlice {
    pub high: u8,
    pub low: u8,
}

/// Inclusive bit range `[high:low]` of a net, bit 0 being the least significant bit.
///
/// Serialized as a `[high, low]` pair.
///
/// # Example
///
/// ```
/// # use netsim::data_structures::Slice;
/// let nibble = Slice::new(7, 4).unwrap();
///
/// assert_eq!(nibble.width(), 4);
/// assert_eq!(nibble.extract(0xA5), 0xA);
/// assert_eq!(nibble.insert(0xA5, 0x3), 0x35);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Slice {
    high: u8,
    low: u8,
}

impl Slice {
    /// Returns the slice `[high:low]`, or None if `high < low` or `high >= 32`.
    pub fn new(high: u8, low: u8) -> Option<Slice> {
        Slice::try_from((high, low)).ok()
    }

    /// Returns the single bit slice `[index:index]`.
    pub fn bit(index: u8) -> Option<Slice> {
        Slice::new(index, index)
    }

    /// Returns the slice covering every bit of a net `width` bits wide.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=32`.
    pub fn full(width: u8) -> Slice {
        assert!(
            (1..=MAX_WIDTH).contains(&width),
            "Tried to build a full slice of width:{}",
            width
        );
        Slice {
            high: width - 1,
            low: 0,
        }
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    /// Returns the number of bits in the slice.
    pub fn width(&self) -> u8 {
        self.high - self.low + 1
    }

    /// Returns true if the slice lies inside a net `width` bits wide.
    pub fn fits(&self, width: u8) -> bool {
        self.high < width
    }

    /// Returns the unshifted mask of the slice, `width()` low bits set.
    #[inline(always)]
    pub fn mask(&self) -> u32 {
        low_mask(self.width())
    }

    /// Returns the mask of the slice shifted into position.
    #[inline(always)]
    pub fn shifted_mask(&self) -> u32 {
        self.mask() << self.low
    }

    /// Returns the field selected by the slice, shifted down to bit 0.
    #[inline(always)]
    pub fn extract(&self, word: u32) -> u32 {
        (word >> self.low) & self.mask()
    }

    /// Returns `word` with the selected field replaced by `value`, masked to the slice width.
    /// Bits outside of the slice are left untouched.
    #[inline(always)]
    pub fn insert(&self, word: u32, value: u32) -> u32 {
        (word & !self.shifted_mask()) | ((value & self.mask()) << self.low)
    }
}

impl TryFrom<(u8, u8)> for Slice {
    type Error = InvalidSlice;

    fn try_from((high, low): (u8, u8)) -> Result<Self, Self::Error> {
        if high < low || high >= MAX_WIDTH {
            return Err(InvalidSlice { high, low });
        }
        Ok(Slice { high, low })
    }
}

impl From<Slice> for (u8, u8) {
    fn from(s: Slice) -> Self {
        (s.high, s.low)
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.high, self.low)
    }
}
