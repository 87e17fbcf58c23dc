use super::{word_mask_64, Slice};
use std::fmt::{self, Display, Formatter};

/// Selects which of the two words of a net an access refers to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Word {
    /// The settled value, read by triggered parts.
    Current,
    /// Scratch space written by triggered parts until the next flush.
    Transient,
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Word::Current => write!(f, "current"),
            Word::Transient => write!(f, "transient"),
        }
    }
}

/// Data structure holding the signal words of every net of a circuit.
///
/// Each net has a `current` word and a `transient` word, both masked to the net width.
/// [SignalStore] keeps track of which words have ever been assigned, reading a word
/// that hasn't returns None. It also keeps track of which transient bits have been written
/// since the last [commit](SignalStore::commit), so that nets driven slice by slice only
/// have the written bits flushed.
///
/// # Example
/// ```
/// # use netsim::data_structures::{SignalStore, Slice, Word};
/// let mut s = SignalStore::new(vec![8]);
/// let hi = Slice::new(7, 4).unwrap();
/// let lo = Slice::new(3, 0).unwrap();
///
/// assert_eq!(s.get(0, Slice::full(8), Word::Current), None);
///
/// s.set(0, hi, 0xA, Word::Transient);
/// s.set(0, lo, 0x5, Word::Transient);
/// assert_eq!(s.get(0, Slice::full(8), Word::Current), None);
///
/// s.commit(0);
/// assert_eq!(s.get(0, Slice::full(8), Word::Current), Some(0xA5));
/// ```
///
/// # Panics
///
/// Panics if you try to access a net index >= [SignalStore::len()]
///
/// ```should_panic
/// # use netsim::data_structures::{SignalStore, Slice, Word};
/// let s = SignalStore::new(vec![1]);
///
/// s.get(1, Slice::full(1), Word::Current);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SignalStore {
    widths: Vec<u8>,
    current: Vec<u32>,
    transient: Vec<u32>,
    written: Vec<u32>,
    assigned: Vec<u64>,
    transient_assigned: Vec<u64>,
}

impl SignalStore {
    /// Returns a new [SignalStore] with one net per item of `widths`, none of them assigned.
    pub fn new<I: IntoIterator<Item = u8>>(widths: I) -> SignalStore {
        let widths: Vec<u8> = widths.into_iter().collect();
        let n = widths.len();
        let bitset_len = (n + 63) / 64;

        SignalStore {
            widths,
            current: vec![0; n],
            transient: vec![0; n],
            written: vec![0; n],
            assigned: vec![0; bitset_len],
            transient_assigned: vec![0; bitset_len],
        }
    }

    /// Returns true if the bit at `index` is 1 in bitset `v`.
    #[inline(always)]
    fn get_bit(v: &[u64], index: usize) -> bool {
        let (word_index, mask) = word_mask_64(index);
        v[word_index] & mask != 0
    }

    #[inline(always)]
    fn set_bit(v: &mut [u64], index: usize) {
        let (word_index, mask) = word_mask_64(index);
        v[word_index] |= mask;
    }

    /// Returns the number of nets in the store.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Returns the width of `net` in bits.
    pub fn width(&self, net: usize) -> u8 {
        self.widths[net]
    }

    /// Returns true if `word` of `net` has been assigned at least once.
    pub fn is_assigned(&self, net: usize, word: Word) -> bool {
        match word {
            Word::Current => Self::get_bit(&self.assigned, net),
            Word::Transient => Self::get_bit(&self.transient_assigned, net),
        }
    }

    /// Returns the field `slice` of `word` of `net`, shifted down to bit 0.
    /// Returns None if the word has never been assigned.
    pub fn get(&self, net: usize, slice: Slice, word: Word) -> Option<u32> {
        if !self.is_assigned(net, word) {
            return None;
        }
        let value = match word {
            Word::Current => self.current[net],
            Word::Transient => self.transient[net],
        };
        Some(slice.extract(value))
    }

    /// Merges `value`, masked to the width of `slice`, into the field `slice` of `word` of `net`.
    /// Bits outside the slice are untouched; a word that was never assigned counts as 0.
    pub fn set(&mut self, net: usize, slice: Slice, value: u32, word: Word) {
        debug_assert!(
            slice.fits(self.widths[net]),
            "Tried to write slice:{} into net:{} of width:{}",
            slice,
            net,
            self.widths[net]
        );
        match word {
            Word::Current => {
                let old = if Self::get_bit(&self.assigned, net) {
                    self.current[net]
                } else {
                    0
                };
                self.current[net] = slice.insert(old, value);
                Self::set_bit(&mut self.assigned, net);
            }
            Word::Transient => {
                let old = if Self::get_bit(&self.transient_assigned, net) {
                    self.transient[net]
                } else {
                    0
                };
                self.transient[net] = slice.insert(old, value);
                self.written[net] |= slice.shifted_mask();
                Self::set_bit(&mut self.transient_assigned, net);
            }
        }
    }

    /// Copies the transient bits of `net` written since the last commit into its current word.
    /// Returns true if the current word changed, including going from unassigned to assigned.
    pub fn commit(&mut self, net: usize) -> bool {
        let written = std::mem::replace(&mut self.written[net], 0);
        if written == 0 {
            return false;
        }
        let was_assigned = Self::get_bit(&self.assigned, net);
        let old = if was_assigned { self.current[net] } else { 0 };
        let new = (old & !written) | (self.transient[net] & written);

        self.current[net] = new;
        Self::set_bit(&mut self.assigned, net);
        !was_assigned || old != new
    }

    /// Forgets the transient bits of `net` written since the last commit, they won't be committed.
    pub fn discard(&mut self, net: usize) {
        self.written[net] = 0;
    }

    /// Assigns `value`, masked to each net's width, to the current word of every net.
    pub fn fill(&mut self, value: u32) {
        for (net, width) in self.widths.iter().enumerate() {
            self.current[net] = Slice::full(*width).extract(value);
        }
        for assigned in &mut self.assigned {
            *assigned = u64::MAX;
        }
    }
}
