use crate::netlist::{Inputs, PartConfig, PartState};

/// Stores the previous value of `clk` and returns true on a 0 to 1 transition of its bit 0.
pub(super) fn rising_edge(inputs: &Inputs<'_>, state: &mut PartState) -> bool {
    let clk = inputs["clk"] & 1;
    let previous = state.replace("clk", clk);
    previous == 0 && clk == 1
}

/// One update delay: `q` is the value `d` had on the previous update.
///
/// `d` is sampled, so `q` can feed back into the logic computing `d`.
pub fn register() -> PartConfig {
    PartConfig::new()
        .sampled_input("d")
        .latched_output("q", |i, s| s.replace("q", i["d"]))
}

/// Rising edge triggered D flip-flop.
///
/// `q` takes the value `d` settled to on the previous update whenever `clk` goes from 0 to 1.
pub fn dff() -> PartConfig {
    PartConfig::new()
        .sampled_input("d")
        .input("clk")
        .latched_output("q", |i, s| {
            if rising_edge(i, s) {
                s.set("q", i["d"]);
            }
            s.get("q")
        })
}

/// Toggles `out` every update, starting high.
pub fn clock() -> PartConfig {
    PartConfig::new().latched_output("out", |_, s| {
        let out = s.get("out") ^ 1;
        s.set("out", out);
        out
    })
}

#[cfg(test)]
mod tests {
    use crate::{Circuit, NetlistConfig, Registry, BOUNDARY};

    fn dff() -> Circuit {
        let mut c = NetlistConfig::new();
        c.boundary(&["d", "clk"], &["q"]);
        let d = c.net("d", 8, 0);
        let clk = c.net("clk", 1, 0);
        let q = c.net("q", 8, 0);
        let ff = c.part("ff", "dff");
        c.drive(BOUNDARY, "d", d);
        c.drive(BOUNDARY, "clk", clk);
        c.wire(BOUNDARY, "q", q);
        c.wire(ff, "d", d);
        c.wire(ff, "clk", clk);
        c.drive(ff, "q", q);
        Circuit::from_config(&c, &Registry::with_primitives()).unwrap()
    }

    #[test]
    fn test_dff_latches_on_rising_edge() {
        let mut c = dff();
        let mut q = |d: u32, clk: u32| c.update([("d", d), ("clk", clk)]).unwrap()["q"];

        assert_eq!(q(5, 0), 0);
        assert_eq!(q(5, 1), 5);
        // No edge, d is ignored.
        assert_eq!(q(7, 1), 5);
        assert_eq!(q(7, 0), 5);
        assert_eq!(q(9, 1), 9);
    }

    #[test]
    fn test_clock_toggles() {
        let mut c = NetlistConfig::new();
        c.boundary(&[], &["clk"]);
        let clk = c.net("clk", 1, 0);
        let osc = c.part("osc", "clock");
        c.wire(BOUNDARY, "clk", clk);
        c.drive(osc, "out", clk);
        let mut c = Circuit::from_config(&c, &Registry::with_primitives()).unwrap();

        let ticks: Vec<_> = (0..4).map(|_| c.settle().unwrap()["clk"]).collect();
        assert_eq!(ticks, vec![1, 0, 1, 0]);
    }
}
