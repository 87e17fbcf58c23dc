use super::circuit::{Net, Part};
use super::{Circuit, Endpoint, NetlistConfig, PartConfig, PartIndex, Registry, BOUNDARY};
use crate::data_structures::{SignalStore, Slice, MAX_WIDTH};
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Turns a [NetlistConfig] into a [Circuit].
///
/// Resolution binds every part to its template, allocates and seeds its state, resolves wiring and
/// sources into endpoints, and validates the whole netlist. Any inconsistency fails resolution
/// before a single part is evaluated.
///
/// # Example
/// ```
/// # use netsim::{NetlistConfig, Registry, Resolver};
/// let registry = Registry::with_primitives();
/// let config = NetlistConfig::from_json(r#"{"parts": [{"name": "main", "config": "main"}],
///     "part_configs": {"main": {}}}"#).unwrap();
///
/// let circuit = Resolver::new(&registry).zero_nets(true).resolve(&config).unwrap();
/// assert!(circuit.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    zero_nets: bool,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Resolver {
            registry,
            zero_nets: false,
        }
    }

    /// If true every net starts out assigned to 0 instead of undefined.
    /// Circuits with feedback need this to read their latched state on the first update.
    pub fn zero_nets(mut self, zero: bool) -> Self {
        self.zero_nets = zero;
        self
    }

    /// Resolves `config` into a [Circuit].
    pub fn resolve(&self, config: &NetlistConfig) -> Result<Circuit> {
        if config.parts.is_empty() {
            return Err(Error::MissingBoundary);
        }

        let widths = self.check_nets(config)?;
        let templates = self.bind_templates(config)?;

        let mut parts = Vec::with_capacity(config.parts.len());
        for (i, (part, template)) in config.parts.iter().zip(templates).enumerate() {
            let index = pi!(i);
            let (inputs, outputs) = resolve_wiring(config, index, &template, &widths)?;
            let observer = match &part.widget {
                None => None,
                Some(key) => match self.registry.widget(key) {
                    Some(factory) => Some(factory(part.name.as_str())),
                    None => {
                        return Err(Error::UnregisteredWidget {
                            part: index,
                            key: key.clone(),
                        })
                    }
                },
            };
            parts.push(Part {
                name: part.name.clone(),
                state: template.new_state(),
                config: template,
                inputs,
                outputs,
                observer,
            });
        }

        let nets = resolve_sources(config, &parts)?;
        check_levels(&nets, &parts)?;

        let boundary = &parts[BOUNDARY.idx];
        let boundary_inputs = pin_map(
            boundary.config.input_pins().iter().map(|p| p.name()),
            &boundary.inputs,
        );
        let boundary_outputs = boundary
            .config
            .output_pins()
            .iter()
            .zip(&boundary.outputs)
            .filter_map(|(pin, endpoint)| endpoint.map(|e| (pin.name().to_owned(), e)))
            .collect();

        let mut signals = SignalStore::new(widths);
        if self.zero_nets {
            signals.fill(0);
        }

        info!(
            nets = nets.len(),
            parts = parts.len(),
            inputs = boundary_inputs.len(),
            "resolved netlist"
        );

        Ok(Circuit {
            nets,
            signals,
            parts,
            boundary_inputs,
            boundary_outputs,
            pending: IndexSet::new(),
            triggered: IndexSet::new(),
            deferred: IndexSet::new(),
            #[cfg(feature = "probes")]
            probes: HashMap::new(),
        })
    }

    /// Validates widths and level order, returns the widths.
    fn check_nets(&self, config: &NetlistConfig) -> Result<Vec<u8>> {
        let mut previous = 0;
        config
            .nets
            .iter()
            .enumerate()
            .map(|(i, net)| {
                if !(1..=MAX_WIDTH).contains(&net.width) {
                    return Err(Error::InvalidWidth {
                        net: ni!(i),
                        width: net.width,
                    });
                }
                if net.level < previous {
                    return Err(Error::LevelOrder {
                        net: ni!(i),
                        level: net.level,
                        previous,
                    });
                }
                previous = net.level;
                Ok(net.width)
            })
            .collect()
    }

    /// Looks up the template of every part, registry first then the netlist's own interfaces.
    /// Parts naming the same interface share one template.
    fn bind_templates(&self, config: &NetlistConfig) -> Result<Vec<Arc<PartConfig>>> {
        let mut interfaces: HashMap<&str, Arc<PartConfig>> = HashMap::new();
        let mut templates = Vec::with_capacity(config.parts.len());
        for (i, part) in config.parts.iter().enumerate() {
            let key = part.config.as_str();
            let template = if let Some(template) = self.registry.config(key) {
                Arc::clone(template)
            } else if let Some(template) = interfaces.get(key) {
                Arc::clone(template)
            } else if let Some(interface) = config.part_configs.get(key) {
                let template = Arc::new(PartConfig::interface(
                    &interface.inputs,
                    &interface.outputs,
                ));
                interfaces.insert(key, Arc::clone(&template));
                template
            } else {
                return Err(Error::UnregisteredPartConfig {
                    part: pi!(i),
                    key: key.to_owned(),
                });
            };
            templates.push(template);
        }
        Ok(templates)
    }
}

type Wiring = (SmallVec<[Endpoint; 4]>, SmallVec<[Option<Endpoint>; 2]>);

/// Resolves the wiring of `part` into one endpoint per declared pin.
fn resolve_wiring(
    config: &NetlistConfig,
    part: PartIndex,
    template: &PartConfig,
    widths: &[u8],
) -> Result<Wiring> {
    let wiring = &config.parts[part.idx].wiring;
    let mut inputs = SmallVec::with_capacity(template.input_pins().len());
    let mut outputs: SmallVec<[Option<Endpoint>; 2]> =
        smallvec::smallvec![None; template.output_pins().len()];

    for (pin, wire) in wiring {
        let len = widths.len();
        let width = *widths.get(wire.net.idx).ok_or(Error::NetOutOfRange {
            net: wire.net,
            len,
        })?;
        let slice = wire.slice.unwrap_or_else(|| Slice::full(width));
        if !slice.fits(width) {
            return Err(Error::SliceOutOfRange {
                net: wire.net,
                slice,
                width,
            });
        }
        let endpoint = Endpoint {
            net: wire.net,
            slice,
        };
        match template.output_position(pin) {
            Some(position) => outputs[position] = Some(endpoint),
            None if template.input_position(pin).is_some() => {}
            None => {
                return Err(Error::UnknownPin {
                    part,
                    pin: pin.clone(),
                })
            }
        }
    }

    for pin in template.input_pins() {
        let wire = wiring.get(pin.name()).ok_or_else(|| Error::UnwiredPin {
            part,
            pin: pin.name().to_owned(),
        })?;
        let width = widths[wire.net.idx];
        inputs.push(Endpoint {
            net: wire.net,
            slice: wire.slice.unwrap_or_else(|| Slice::full(width)),
        });
    }

    for (pin, endpoint) in template.output_pins().iter().zip(&outputs) {
        let needs_wiring = part.is_boundary() || !pin.is_passive();
        if needs_wiring && endpoint.is_none() {
            return Err(Error::UnwiredPin {
                part,
                pin: pin.name().to_owned(),
            });
        }
    }

    Ok((inputs, outputs))
}

/// Resolves the sources of every net into part and output pin positions.
///
/// The sources of the boundary part are its input pins, they are validated but never triggered.
fn resolve_sources(config: &NetlistConfig, parts: &[Part]) -> Result<Vec<Net>> {
    let mut nets = Vec::with_capacity(config.nets.len());
    for (i, net) in config.nets.iter().enumerate() {
        let index = ni!(i);
        let mut sources = SmallVec::new();
        for source in &net.sources {
            let part = parts.get(source.part.idx).ok_or(Error::PartOutOfRange {
                part: source.part,
                len: parts.len(),
            })?;
            let unknown = || Error::UnknownPin {
                part: source.part,
                pin: source.pin.clone(),
            };
            let (position, endpoint) = if source.part.is_boundary() {
                let position = part.config.input_position(&source.pin).ok_or_else(unknown)?;
                (position, Some(part.inputs[position]))
            } else {
                let position = part.config.output_position(&source.pin).ok_or_else(unknown)?;
                (position, part.outputs[position])
            };
            if endpoint.map(|e| e.net) != Some(index) {
                return Err(Error::SourceMismatch {
                    net: index,
                    part: source.part,
                    pin: source.pin.clone(),
                });
            }
            sources.push((source.part, position));
        }
        nets.push(Net {
            name: net.name.clone(),
            level: net.level,
            sources,
        });
    }
    Ok(nets)
}

/// Checks that every net driven by a part sits above every trigger input of the driving part.
///
/// A latched output may share the level of a trigger input reading a net no part drives, since
/// such nets are written before the walk starts.
fn check_levels(nets: &[Net], parts: &[Part]) -> Result<()> {
    let external: Vec<bool> = nets
        .iter()
        .map(|n| n.sources.iter().all(|(part, _)| part.is_boundary()))
        .collect();
    for (i, net) in nets.iter().enumerate() {
        for &(part, position) in &net.sources {
            if part.is_boundary() {
                continue;
            }
            let p = &parts[part.idx];
            let latched = p.config.output_pins()[position].is_latched();
            let triggers = p
                .config
                .input_pins()
                .iter()
                .zip(&p.inputs)
                .filter(|(pin, _)| pin.is_trigger());
            for (_, input) in triggers {
                let input_level = nets[input.net.idx].level;
                let same_level_ok = latched && external[input.net.idx];
                if input_level > net.level || (input_level == net.level && !same_level_ok) {
                    return Err(Error::LevelDependency {
                        net: ni!(i),
                        level: net.level,
                        part,
                        input_net: input.net,
                        input_level,
                    });
                }
            }
        }
    }
    Ok(())
}

fn pin_map<'a, I>(pins: I, endpoints: &[Endpoint]) -> IndexMap<String, Endpoint>
where
    I: Iterator<Item = &'a str>,
{
    pins.map(str::to_owned)
        .zip(endpoints.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::NetIndex;

    fn base() -> (NetlistConfig, NetIndex, NetIndex) {
        let mut c = NetlistConfig::new();
        c.boundary(&["a"], &["y"]);
        let a = c.net("a", 4, 0);
        let y = c.net("y", 4, 1);
        c.drive(BOUNDARY, "a", a);
        c.wire(BOUNDARY, "y", y);
        (c, a, y)
    }

    fn resolve(c: &NetlistConfig) -> Result<Circuit> {
        Resolver::new(&Registry::with_primitives()).resolve(c)
    }

    #[test]
    fn test_resolves_inverter() {
        let (mut c, a, y) = base();
        let n = c.part("n", "not");
        c.wire(n, "a", a);
        c.drive(n, "y", y);
        let circuit = resolve(&c).unwrap();
        assert_eq!(circuit.nets[1].sources.as_slice(), &[(n, 0)]);
        assert_eq!(circuit.boundary_inputs["a"].net, a);
        assert_eq!(circuit.boundary_outputs["y"].slice, Slice::full(4));
    }

    #[test]
    fn test_missing_boundary() {
        assert!(matches!(
            resolve(&NetlistConfig::new()),
            Err(Error::MissingBoundary)
        ));
    }

    #[test]
    fn test_unregistered_config() {
        let (mut c, _, _) = base();
        c.part("x", "flux_capacitor");
        assert!(matches!(
            resolve(&c),
            Err(Error::UnregisteredPartConfig { key, .. }) if key == "flux_capacitor"
        ));
    }

    #[test]
    fn test_unregistered_widget() {
        let (mut c, a, y) = base();
        let n = c.part("n", "not");
        c.wire(n, "a", a);
        c.drive(n, "y", y);
        c.widget(n, "screen");
        assert!(matches!(
            resolve(&c),
            Err(Error::UnregisteredWidget { key, .. }) if key == "screen"
        ));
    }

    #[test]
    fn test_invalid_width_and_level_order() {
        let (mut c, _, _) = base();
        c.net("wide", 33, 2);
        assert!(matches!(resolve(&c), Err(Error::InvalidWidth { width: 33, .. })));

        let (mut c, _, _) = base();
        c.net("low", 1, 0);
        assert!(matches!(
            resolve(&c),
            Err(Error::LevelOrder {
                level: 0,
                previous: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_wiring_errors() {
        let (mut c, a, y) = base();
        let n = c.part("n", "not");
        c.wire(n, "b", a);
        assert!(matches!(resolve(&c), Err(Error::UnknownPin { pin, .. }) if pin == "b"));

        let (mut c, _, y2) = base();
        let n = c.part("n", "not");
        c.drive(n, "y", y2);
        assert!(matches!(resolve(&c), Err(Error::UnwiredPin { pin, .. }) if pin == "a"));

        let (mut c, a2, _) = base();
        let n = c.part("n", "not");
        c.wire(n, "a", a2);
        c.wire(n, "y", ni!(7));
        assert!(matches!(resolve(&c), Err(Error::NetOutOfRange { len: 2, .. })));

        let (mut c, a3, _) = base();
        let n = c.part("n", "not");
        c.wire_slice(n, "a", a3, Slice::new(4, 0).unwrap());
        c.drive(n, "y", y);
        assert!(matches!(resolve(&c), Err(Error::SliceOutOfRange { width: 4, .. })));
    }

    #[test]
    fn test_source_errors() {
        let (mut c, a, y) = base();
        let n = c.part("n", "not");
        c.wire(n, "a", a);
        c.wire(n, "y", y);
        c.nets[0].sources.push(crate::netlist::SourceConfig {
            part: n,
            pin: "y".to_owned(),
        });
        assert!(matches!(resolve(&c), Err(Error::SourceMismatch { .. })));

        let (mut c, _, _) = base();
        c.nets[1].sources.push(crate::netlist::SourceConfig {
            part: pi!(5),
            pin: "y".to_owned(),
        });
        assert!(matches!(resolve(&c), Err(Error::PartOutOfRange { len: 1, .. })));
    }

    #[test]
    fn test_level_dependency() {
        let (mut c, a, _) = base();
        let z = c.net("z", 4, 1);
        let n = c.part("n", "not");
        let m = c.part("m", "not");
        c.wire(n, "a", a);
        c.drive(n, "y", ni!(1));
        c.wire(m, "a", ni!(1));
        c.drive(m, "y", z);
        assert!(matches!(
            resolve(&c),
            Err(Error::LevelDependency {
                level: 1,
                input_level: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_latched_output_breaks_feedback() {
        let mut c = NetlistConfig::new();
        c.boundary(&["clk"], &["q"]);
        let clk = c.net("clk", 1, 0);
        let q = c.net("q", 1, 0);
        let nq = c.net("nq", 1, 1);
        let dff = c.part("dff", "dff");
        let not = c.part("not", "not");
        c.drive(BOUNDARY, "clk", clk);
        c.wire(BOUNDARY, "q", q);
        c.wire(dff, "clk", clk);
        c.wire(dff, "d", nq);
        c.drive(dff, "q", q);
        c.wire(not, "a", q);
        c.drive(not, "y", nq);
        assert!(resolve(&c).is_ok());
    }

    fn clocked_dff(q_level: u32) -> NetlistConfig {
        let mut c = NetlistConfig::new();
        c.boundary(&[], &["q"]);
        let clk = c.net("clk", 1, 0);
        let one = c.net("one", 1, 0);
        let q = c.net("q", 1, q_level);
        let osc = c.part("osc", "clock");
        let high = c.part("one", "high");
        let dff = c.part("dff", "dff");
        c.wire(BOUNDARY, "q", q);
        c.drive(osc, "out", clk);
        c.drive(high, "out", one);
        c.wire(dff, "clk", clk);
        c.wire(dff, "d", one);
        c.drive(dff, "q", q);
        c
    }

    #[test]
    fn test_latched_output_above_driven_trigger() {
        assert!(matches!(
            resolve(&clocked_dff(0)),
            Err(Error::LevelDependency {
                level: 0,
                input_level: 0,
                ..
            })
        ));

        let mut circuit = Resolver::new(&Registry::with_primitives())
            .zero_nets(true)
            .resolve(&clocked_dff(1))
            .unwrap();
        // The edge produced by the clock is seen in the same update.
        assert_eq!(circuit.settle().unwrap()["q"], 1);
    }

    #[test]
    fn test_interfaces_are_shared() {
        let (mut c, a, y) = base();
        c.interface("probe", &["x"], &[]);
        let p1 = c.part("p1", "probe");
        let p2 = c.part("p2", "probe");
        c.wire(p1, "x", a);
        c.wire(p2, "x", y);
        let circuit = resolve(&c).unwrap();
        assert!(Arc::ptr_eq(
            &circuit.parts[p1.idx].config,
            &circuit.parts[p2.idx].config
        ));
    }

    #[test]
    fn test_zero_nets() {
        let (c, _, _) = base();
        let registry = Registry::with_primitives();
        let circuit = Resolver::new(&registry).zero_nets(true).resolve(&c).unwrap();
        assert!(circuit.nets().all(|n| n.value == Some(0)));
        let circuit = Resolver::new(&registry).resolve(&c).unwrap();
        assert!(circuit.nets().all(|n| n.value.is_none()));
    }
}
