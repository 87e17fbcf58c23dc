use crate::netlist::PartConfig;

fn binary(f: fn(u32, u32) -> u32) -> PartConfig {
    PartConfig::new()
        .input("a")
        .input("b")
        .output("y", move |i, _| f(i["a"], i["b"]))
}

/// `y = !(a & b)`
pub fn nand() -> PartConfig {
    binary(|a, b| !(a & b))
}

/// `y = a & b`
pub fn and() -> PartConfig {
    binary(|a, b| a & b)
}

/// `y = a | b`
pub fn or() -> PartConfig {
    binary(|a, b| a | b)
}

/// `y = a ^ b`
pub fn xor() -> PartConfig {
    binary(|a, b| a ^ b)
}

/// `y = !a`
pub fn not() -> PartConfig {
    PartConfig::new().input("a").output("y", |i, _| !i["a"])
}

/// `out = in`, handy to move a slice of a net into another net.
pub fn buffer() -> PartConfig {
    PartConfig::new().input("in").output("out", |i, _| i["in"])
}

/// `y = if sel { b } else { a }`, only bit 0 of `sel` counts.
pub fn mux() -> PartConfig {
    PartConfig::new()
        .input("a")
        .input("b")
        .input("sel")
        .output("y", |i, _| if i["sel"] & 1 == 1 { i["b"] } else { i["a"] })
}

/// `sum = a + b`, wrapping at the width of the output net.
pub fn add() -> PartConfig {
    PartConfig::new()
        .input("a")
        .input("b")
        .output("sum", |i, _| i["a"].wrapping_add(i["b"]))
}

/// Drives every bit of `out` high.
pub fn high() -> PartConfig {
    PartConfig::new().latched_output("out", |_, _| u32::MAX)
}

/// Drives every bit of `out` low.
pub fn low() -> PartConfig {
    PartConfig::new().latched_output("out", |_, _| 0)
}
