use super::sequential::rising_edge;
use crate::netlist::PartConfig;

/// Random access memory.
///
/// On a rising edge of `clk` with bit 0 of `load` set, `in` is stored at `address`.
/// `out` is the word at `address`, after the store. Memory starts out empty and reads as 0.
pub fn ram() -> PartConfig {
    PartConfig::new()
        .sampled_input("in")
        .input("address")
        .sampled_input("load")
        .input("clk")
        .output("out", |i, s| {
            let address = i["address"];
            if rising_edge(i, s) && i["load"] & 1 == 1 {
                s.write_memory(address, i["in"]);
            }
            s.read_memory(address)
        })
}

/// Read only memory, `out` is the word at `address`.
///
/// Contents are loaded into the part's state, see [Circuit::state_mut](crate::Circuit::state_mut).
pub fn rom() -> PartConfig {
    PartConfig::new()
        .input("address")
        .output("out", |i, s| s.read_memory(i["address"]))
}
