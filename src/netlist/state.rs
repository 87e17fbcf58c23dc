use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Persistent state owned by a single part instance.
///
/// It lives for as long as the [Circuit](super::Circuit) and is how flip-flops, registers and
/// memories remember values between calls to [update](super::Circuit::update).
/// It holds named registers, which read as 0 until first set, and a sparse word addressed memory
/// covering the whole 32 bit address space, whose words read as 0 until first written.
///
/// # Example
/// ```
/// # use netsim::PartState;
/// let mut s = PartState::default();
///
/// assert_eq!(s.get("q"), 0);
/// assert_eq!(s.replace("q", 1), 0);
/// assert_eq!(s.get("q"), 1);
///
/// s.write_memory(3, 0xBEEF);
/// s.write_memory(u32::MAX, 1);
/// assert_eq!(s.memory().collect::<Vec<_>>(), vec![(3, 0xBEEF), (u32::MAX, 1)]);
/// assert_eq!(s.read_memory(10), 0);
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PartState {
    registers: IndexMap<String, u32>,
    memory: BTreeMap<u32, u32>,
}

impl PartState {
    /// Returns the value of register `key`, 0 if it was never set.
    pub fn get(&self, key: &str) -> u32 {
        self.registers.get(key).copied().unwrap_or(0)
    }

    /// Returns true if register `key` has been set.
    pub fn contains(&self, key: &str) -> bool {
        self.registers.contains_key(key)
    }

    /// Sets register `key` to `value`.
    pub fn set(&mut self, key: &str, value: u32) {
        self.replace(key, value);
    }

    /// Sets register `key` to `value` and returns its previous value, 0 if it was never set.
    pub fn replace(&mut self, key: &str, value: u32) -> u32 {
        // Only allocate the key the first time a register is set.
        match self.registers.get_mut(key) {
            Some(old) => std::mem::replace(old, value),
            None => {
                self.registers.insert(key.to_owned(), value);
                0
            }
        }
    }

    /// Returns the registers in the order they were first set.
    pub fn registers(&self) -> impl Iterator<Item = (&str, u32)> {
        self.registers.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the written memory words and their addresses, in address order.
    pub fn memory(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.memory.iter().map(|(a, v)| (*a, *v))
    }

    /// Returns the memory word at `address`, 0 if it was never written.
    pub fn read_memory(&self, address: u32) -> u32 {
        self.memory.get(&address).copied().unwrap_or(0)
    }

    pub fn write_memory(&mut self, address: u32, value: u32) {
        self.memory.insert(address, value);
    }

    /// Replaces the whole memory with `data`, stored from address 0 up.
    pub fn load<I: IntoIterator<Item = u32>>(&mut self, data: I) {
        self.memory.clear();
        self.memory.extend((0..=u32::MAX).zip(data));
    }
}
