use netsim::{Circuit, Registry, Resolver};
use tracing::Level;

/// 8 bit counter with a synchronous reset, clocked by its own oscillator.
const COUNTER: &str = r#"{
    "nets": [
        {"name": "reset", "width": 1, "level": 0, "sources": [{"part": 0, "pin": "reset"}]},
        {"name": "clk", "width": 1, "level": 0, "sources": [{"part": 1, "pin": "out"}]},
        {"name": "one", "width": 1, "level": 0, "sources": [{"part": 3, "pin": "out"}]},
        {"name": "zero", "width": 8, "level": 0, "sources": [{"part": 4, "pin": "out"}]},
        {"name": "count", "width": 8, "level": 1, "sources": [{"part": 2, "pin": "q"}]},
        {"name": "inc", "width": 8, "level": 2, "sources": [{"part": 5, "pin": "sum"}]},
        {"name": "next", "width": 8, "level": 3, "sources": [{"part": 6, "pin": "y"}]}
    ],
    "part_configs": {
        "counter": {"inputs": ["reset"], "outputs": ["count", "clk"]}
    },
    "parts": [
        {"name": "counter", "config": "counter", "wiring": {
            "reset": {"net": 0}, "count": {"net": 4}, "clk": {"net": 1}
        }},
        {"name": "osc", "config": "clock", "wiring": {"out": {"net": 1}}},
        {"name": "ff", "config": "dff", "widget": "log", "wiring": {
            "d": {"net": 6}, "clk": {"net": 1}, "q": {"net": 4}
        }},
        {"name": "one", "config": "high", "wiring": {"out": {"net": 2}}},
        {"name": "zero", "config": "low", "wiring": {"out": {"net": 3}}},
        {"name": "add", "config": "add", "wiring": {
            "a": {"net": 4}, "b": {"net": 2}, "sum": {"net": 5}
        }},
        {"name": "mux", "config": "mux", "wiring": {
            "a": {"net": 5}, "b": {"net": 3}, "sel": {"net": 0}, "y": {"net": 6}
        }}
    ]
}"#;

fn main() -> netsim::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let registry = Registry::with_primitives();
    let config = netsim::NetlistConfig::from_json(COUNTER)?;
    let mut circuit: Circuit = Resolver::new(&registry).zero_nets(true).resolve(&config)?;

    let t = std::time::Instant::now();
    for step in 0..12 {
        let reset = if step == 8 { 1 } else { 0 };
        let out = circuit.update([("reset", reset)])?;
        println!("step:{:2} clk:{} count:{}", step, out["clk"], out["count"]);
    }
    println!("duration: {}us", t.elapsed().as_micros());

    circuit.dump_dot(std::env::temp_dir().join("counter.dot"))?;
    Ok(())
}
