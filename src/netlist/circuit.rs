use super::{Inputs, NetIndex, NetlistConfig, PartConfig, PartIndex, PartObserver, PartState};
use super::{Registry, Resolver};
use crate::data_structures::{SignalStore, Slice, Word};
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug_span, trace};

#[cfg(feature = "probes")]
use std::collections::HashMap;

/// Net and bit range a pin is wired to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Endpoint {
    pub net: NetIndex,
    pub slice: Slice,
}

#[derive(Debug)]
pub(super) struct Net {
    pub(super) name: Option<String>,
    pub(super) level: u32,
    /// Parts writing into the net, with the position of the output pin they write through.
    pub(super) sources: SmallVec<[(PartIndex, usize); 2]>,
}

pub(super) struct Part {
    pub(super) name: String,
    pub(super) config: Arc<PartConfig>,
    /// One endpoint per declared input pin.
    pub(super) inputs: SmallVec<[Endpoint; 4]>,
    /// One endpoint per declared output pin, None for unwired passive outputs.
    pub(super) outputs: SmallVec<[Option<Endpoint>; 2]>,
    pub(super) state: PartState,
    pub(super) observer: Option<Box<dyn PartObserver>>,
}

/// Snapshot of a net returned by [Circuit::nets].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NetView<'a> {
    pub index: NetIndex,
    pub name: Option<&'a str>,
    pub width: u8,
    pub level: u32,
    /// Current value, None if it has never been assigned.
    pub value: Option<u32>,
}

/// Resolved, ready to evaluate netlist.
///
/// Built by a [Resolver] from a [NetlistConfig], then driven through [update](Circuit::update).
/// Evaluation walks the nets in level order, every part driving a net gets triggered once per
/// level: it reads the settled current words of its inputs and writes its outputs into transient
/// words, which are flushed into the current words when the walk reaches the next level.
/// Parts at the same level can't observe each other, so their evaluation order doesn't matter.
///
/// # Example
/// ```
/// # use netsim::{Circuit, Registry};
/// let json = r#"{
///     "nets": [
///         {"name": "a", "width": 4, "level": 0, "sources": [{"part": 0, "pin": "a"}]},
///         {"name": "y", "width": 4, "level": 1, "sources": [{"part": 1, "pin": "y"}]}
///     ],
///     "part_configs": {"main": {"inputs": ["a"], "outputs": ["y"]}},
///     "parts": [
///         {"name": "main", "config": "main", "wiring": {"a": {"net": 0}, "y": {"net": 1}}},
///         {"name": "not0", "config": "not", "wiring": {"a": {"net": 0}, "y": {"net": 1}}}
///     ]
/// }"#;
/// let mut circuit = Circuit::from_json(json, &Registry::with_primitives()).unwrap();
///
/// assert_eq!(circuit.update([("a", 0b0101)]).unwrap()["y"], 0b1010);
/// ```
pub struct Circuit {
    pub(super) nets: Vec<Net>,
    pub(super) signals: SignalStore,
    pub(super) parts: Vec<Part>,
    pub(super) boundary_inputs: IndexMap<String, Endpoint>,
    pub(super) boundary_outputs: IndexMap<String, Endpoint>,
    /// Nets written at the current level, waiting for a flush.
    pub(super) pending: IndexSet<NetIndex>,
    /// Parts already triggered at the current level.
    pub(super) triggered: IndexSet<PartIndex>,
    /// Nets written through [write_transient](Circuit::write_transient), flushed by the next update.
    pub(super) deferred: IndexSet<NetIndex>,
    #[cfg(feature = "probes")]
    pub(super) probes: HashMap<NetIndex, String>,
}

impl Circuit {
    /// Parses `json` into a [NetlistConfig] and resolves it against `registry` with the default
    /// [Resolver] options.
    pub fn from_json(json: &str, registry: &Registry) -> Result<Circuit> {
        Circuit::from_config(&NetlistConfig::from_json(json)?, registry)
    }

    /// Resolves `config` against `registry` with the default [Resolver] options.
    pub fn from_config(config: &NetlistConfig, registry: &Registry) -> Result<Circuit> {
        Resolver::new(registry).resolve(config)
    }

    /// Writes `inputs` into the nets wired to the matching boundary input pins, evaluates the
    /// circuit and returns the value of every boundary output pin, in declaration order.
    ///
    /// Inputs that aren't provided keep the value of the previous update.
    pub fn update<I, S>(&mut self, inputs: I) -> Result<IndexMap<String, u32>>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let span = debug_span!("update");
        let _enter = span.enter();

        for (pin, value) in inputs {
            let pin = pin.as_ref();
            let endpoint = *self
                .boundary_inputs
                .get(pin)
                .ok_or_else(|| Error::UnknownPin {
                    part: super::BOUNDARY,
                    pin: pin.to_owned(),
                })?;
            trace!(pin, value, "input");
            self.signals
                .set(endpoint.net.idx, endpoint.slice, value, Word::Current);
        }

        let deferred = std::mem::take(&mut self.deferred);
        self.pending.extend(deferred);
        if let Err(e) = self.walk() {
            // Writes of the aborted walk are dropped.
            for net in self.pending.drain(..) {
                self.signals.discard(net.idx);
            }
            self.triggered.clear();
            return Err(e);
        }

        self.outputs()
    }

    /// Triggers every part once per level, flushing at every level change and at the end.
    fn walk(&mut self) -> Result<()> {
        self.triggered.clear();
        let mut level = None;
        for net in 0..self.nets.len() {
            let net_level = self.nets[net].level;
            if level != Some(net_level) {
                self.flush();
                self.triggered.clear();
                level = Some(net_level);
            }
            for source in 0..self.nets[net].sources.len() {
                let (part, _) = self.nets[net].sources[source];
                if part.is_boundary() || !self.triggered.insert(part) {
                    continue;
                }
                let affected = self.trigger(part)?;
                self.pending.extend(affected);
            }
        }
        self.flush();
        Ok(())
    }

    /// Runs [update](Circuit::update) without new inputs.
    pub fn settle(&mut self) -> Result<IndexMap<String, u32>> {
        self.update(std::iter::empty::<(&str, u32)>())
    }

    /// Triggers `part`: reads the current word of every input, runs every output's process function
    /// and writes the results into transient words, then notifies the observer.
    /// Returns the nets that were written.
    ///
    /// Triggering the boundary part does nothing.
    pub fn trigger(&mut self, part: PartIndex) -> Result<SmallVec<[NetIndex; 2]>> {
        let mut affected = SmallVec::new();
        if part.is_boundary() {
            return Ok(affected);
        }
        self.check_part(part)?;

        let mut values = SmallVec::with_capacity(self.parts[part.idx].inputs.len());
        for endpoint in &self.parts[part.idx].inputs {
            values.push(self.read(endpoint.net, endpoint.slice, Word::Current)?);
        }

        let Circuit { parts, signals, .. } = self;
        let p = &mut parts[part.idx];
        let inputs = Inputs::new(p.config.input_pins(), values);
        trace!(part = %p.name, ?inputs, "trigger");

        for (output, endpoint) in p.outputs.iter().enumerate() {
            let endpoint = match endpoint {
                Some(endpoint) => endpoint,
                None => continue,
            };
            if let Some(value) = p.config.process(output, &inputs, &mut p.state) {
                signals.set(endpoint.net.idx, endpoint.slice, value, Word::Transient);
                affected.push(endpoint.net);
            }
        }

        if let Some(observer) = &mut p.observer {
            observer.on_trigger(&inputs, &p.state);
        }
        Ok(affected)
    }

    /// Commits the transient word of every pending net into its current word.
    fn flush(&mut self) {
        for net in self.pending.drain(..) {
            let changed = self.signals.commit(net.idx);
            trace!(%net, changed, "flush");

            #[cfg(feature = "probes")]
            {
                if let (true, Some(name)) = (changed, self.probes.get(&net)) {
                    let width = self.signals.width(net.idx);
                    let value = self.signals.get(net.idx, Slice::full(width), Word::Current);
                    tracing::debug!(probe = %name, ?value, "changed");
                }
            }
        }
    }

    /// Returns the value of every boundary output pin.
    pub fn outputs(&self) -> Result<IndexMap<String, u32>> {
        self.boundary_outputs
            .iter()
            .map(|(pin, endpoint)| {
                let value = self.read(endpoint.net, endpoint.slice, Word::Current)?;
                Ok((pin.clone(), value))
            })
            .collect()
    }

    fn read(&self, net: NetIndex, slice: Slice, word: Word) -> Result<u32> {
        self.signals
            .get(net.idx, slice, word)
            .ok_or_else(|| Error::UndefinedSignal {
                net,
                name: self.nets[net.idx]
                    .name
                    .clone()
                    .unwrap_or_else(|| "anonymous".to_owned()),
                word,
            })
    }

    fn check_net(&self, net: NetIndex, slice: Option<Slice>) -> Result<Slice> {
        if net.idx >= self.nets.len() {
            return Err(Error::NetOutOfRange {
                net,
                len: self.nets.len(),
            });
        }
        let width = self.signals.width(net.idx);
        match slice {
            None => Ok(Slice::full(width)),
            Some(slice) if slice.fits(width) => Ok(slice),
            Some(slice) => Err(Error::SliceOutOfRange { net, slice, width }),
        }
    }

    fn check_part(&self, part: PartIndex) -> Result<()> {
        if part.idx >= self.parts.len() {
            return Err(Error::PartOutOfRange {
                part,
                len: self.parts.len(),
            });
        }
        Ok(())
    }

    /// Returns `slice` of the current word of `net`, the whole net if `slice` is None.
    pub fn read_signal(&self, net: NetIndex, slice: Option<Slice>) -> Result<u32> {
        let slice = self.check_net(net, slice)?;
        self.read(net, slice, Word::Current)
    }

    /// Returns `slice` of the transient word of `net`, the whole net if `slice` is None.
    pub fn read_transient(&self, net: NetIndex, slice: Option<Slice>) -> Result<u32> {
        let slice = self.check_net(net, slice)?;
        self.read(net, slice, Word::Transient)
    }

    /// Writes `value` into `slice` of the current word of `net`, the whole net if `slice` is None.
    pub fn write_signal(&mut self, net: NetIndex, slice: Option<Slice>, value: u32) -> Result<()> {
        let slice = self.check_net(net, slice)?;
        self.signals.set(net.idx, slice, value, Word::Current);
        Ok(())
    }

    /// Writes `value` into `slice` of the transient word of `net`, the whole net if `slice` is None.
    /// The write reaches the current word at the start of the next [update](Circuit::update).
    pub fn write_transient(
        &mut self,
        net: NetIndex,
        slice: Option<Slice>,
        value: u32,
    ) -> Result<()> {
        let slice = self.check_net(net, slice)?;
        self.signals.set(net.idx, slice, value, Word::Transient);
        self.deferred.insert(net);
        Ok(())
    }

    /// Returns every net in level order.
    pub fn nets(&self) -> impl Iterator<Item = NetView<'_>> {
        self.nets.iter().enumerate().map(move |(i, net)| {
            let width = self.signals.width(i);
            NetView {
                index: ni!(i),
                name: net.name.as_deref(),
                width,
                level: net.level,
                value: self.signals.get(i, Slice::full(width), Word::Current),
            }
        })
    }

    /// Returns the first net named `name`.
    pub fn net_by_name(&self, name: &str) -> Option<NetIndex> {
        self.nets
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
            .map(|i| ni!(i))
    }

    /// Returns the first part named `name`.
    pub fn part_by_name(&self, name: &str) -> Option<PartIndex> {
        self.parts
            .iter()
            .position(|p| p.name == name)
            .map(|i| pi!(i))
    }

    pub fn part_name(&self, part: PartIndex) -> Result<&str> {
        self.check_part(part)?;
        Ok(&self.parts[part.idx].name)
    }

    pub fn state(&self, part: PartIndex) -> Result<&PartState> {
        self.check_part(part)?;
        Ok(&self.parts[part.idx].state)
    }

    /// Returns the state of `part` for modification between updates, to load memory contents for example.
    pub fn state_mut(&mut self, part: PartIndex) -> Result<&mut PartState> {
        self.check_part(part)?;
        Ok(&mut self.parts[part.idx].state)
    }

    /// Attaches `observer` to `part`, replacing any previous observer.
    pub fn attach_observer<O: PartObserver + 'static>(
        &mut self,
        part: PartIndex,
        observer: O,
    ) -> Result<()> {
        self.check_part(part)?;
        self.parts[part.idx].observer = Some(Box::new(observer));
        Ok(())
    }

    /// Removes and returns the observer of `part`.
    pub fn detach_observer(&mut self, part: PartIndex) -> Result<Option<Box<dyn PartObserver>>> {
        self.check_part(part)?;
        Ok(self.parts[part.idx].observer.take())
    }

    /// Logs the value of `net` under `name` every time a flush changes it.
    #[cfg(feature = "probes")]
    pub fn probe<S: Into<String>>(&mut self, net: NetIndex, name: S) -> Result<()> {
        self.check_net(net, None)?;
        self.probes.insert(net, name.into());
        Ok(())
    }

    /// Returns the boundary input pins and their endpoints.
    pub fn input_pins(&self) -> impl Iterator<Item = (&str, Endpoint)> {
        self.boundary_inputs.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the boundary output pins and their endpoints.
    pub fn output_pins(&self) -> impl Iterator<Item = (&str, Endpoint)> {
        self.boundary_outputs.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    fn net_label(&self, net: usize) -> String {
        let name = self.nets[net].name.as_deref().unwrap_or("");
        format!(
            "{}[{}]@{}",
            name,
            self.signals.width(net),
            self.nets[net].level
        )
    }

    /// Returns the net graph in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format.
    /// There is an edge from every net a part reads to every net it drives, labelled with the part's name.
    pub fn to_dot(&self) -> String {
        use petgraph::dot::Dot;
        let mut graph = petgraph::Graph::<String, String>::new();
        let nodes: Vec<_> = (0..self.nets.len())
            .map(|i| graph.add_node(self.net_label(i)))
            .collect();
        for (i, net) in self.nets.iter().enumerate() {
            for (part, _) in &net.sources {
                if part.is_boundary() {
                    continue;
                }
                let p = &self.parts[part.idx];
                for input in &p.inputs {
                    graph.add_edge(nodes[input.net.idx], nodes[i], p.name.clone());
                }
            }
        }
        format!("{}", Dot::new(&graph))
    }

    /// Writes [to_dot](Circuit::to_dot) to `path`, to be visualized by many supported tools.
    pub fn dump_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_dot())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::BOUNDARY;

    fn and_circuit() -> Circuit {
        let mut c = NetlistConfig::new();
        c.boundary(&["a", "b"], &["y"]);
        let a = c.net("a", 1, 0);
        let b = c.net("b", 1, 0);
        let y = c.net("y", 1, 1);
        let and = c.part("and0", "and");
        c.drive(BOUNDARY, "a", a);
        c.drive(BOUNDARY, "b", b);
        c.wire(BOUNDARY, "y", y);
        c.wire(and, "a", a);
        c.wire(and, "b", b);
        c.drive(and, "y", y);
        Circuit::from_config(&c, &Registry::with_primitives()).unwrap()
    }

    #[test]
    fn test_trigger_writes_transient_only() {
        let mut c = and_circuit();
        c.write_signal(ni!(0), None, 1).unwrap();
        c.write_signal(ni!(1), None, 1).unwrap();

        assert_eq!(c.trigger(pi!(1)).unwrap().as_slice(), &[ni!(2)]);
        assert_eq!(c.read_transient(ni!(2), None).unwrap(), 1);
        assert!(matches!(
            c.read_signal(ni!(2), None),
            Err(Error::UndefinedSignal { .. })
        ));
    }

    #[test]
    fn test_trigger_boundary_is_noop() {
        let mut c = and_circuit();
        assert!(c.trigger(BOUNDARY).unwrap().is_empty());
    }

    #[test]
    fn test_trigger_reads_current_words() {
        let mut c = and_circuit();
        c.write_signal(ni!(0), None, 1).unwrap();
        c.write_transient(ni!(1), None, 1).unwrap();
        assert!(matches!(
            c.trigger(pi!(1)),
            Err(Error::UndefinedSignal {
                word: Word::Current,
                ..
            })
        ));
    }

    #[test]
    fn test_pending_transient_lands_on_update() {
        let mut c = and_circuit();
        c.update([("a", 1), ("b", 0)]).unwrap();
        c.write_transient(ni!(1), None, 1).unwrap();
        assert_eq!(c.settle().unwrap()["y"], 1);
    }

    #[test]
    fn test_failed_update_drops_its_writes() {
        let mut c = NetlistConfig::new();
        c.boundary(&["a", "b"], &["q"]);
        let a = c.net("a", 1, 0);
        let b = c.net("b", 1, 0);
        let q = c.net("q", 1, 0);
        let y = c.net("y", 1, 1);
        let z = c.net("z", 1, 1);
        let reg = c.part("reg", "register");
        let not_a = c.part("not_a", "not");
        let not_b = c.part("not_b", "not");
        c.drive(BOUNDARY, "a", a);
        c.drive(BOUNDARY, "b", b);
        c.wire(BOUNDARY, "q", q);
        c.wire(reg, "d", y);
        c.drive(reg, "q", q);
        c.wire(not_a, "a", a);
        c.drive(not_a, "y", y);
        c.wire(not_b, "a", b);
        c.drive(not_b, "y", z);
        let mut c = Circuit::from_config(&c, &Registry::with_primitives()).unwrap();
        c.write_signal(y, None, 0).unwrap();

        // not_a writes y, then not_b fails on the undefined b at the same level.
        assert!(matches!(
            c.update([("a", 0)]),
            Err(Error::UndefinedSignal { net, .. }) if net == b
        ));
        assert_eq!(c.read_signal(y, None).unwrap(), 0);

        // The register samples y before level 1 is walked again, so it stores 0 and q lags by one.
        assert_eq!(c.update([("a", 0), ("b", 0)]).unwrap()["q"], 0);
        assert_eq!(c.settle().unwrap()["q"], 0);
        assert_eq!(c.settle().unwrap()["q"], 1);
    }

    #[test]
    fn test_unknown_input_pin() {
        let mut c = and_circuit();
        assert!(matches!(
            c.update([("c", 1)]),
            Err(Error::UnknownPin { pin, .. }) if pin == "c"
        ));
    }

    #[test]
    fn test_inspection() {
        let mut c = and_circuit();
        c.update([("a", 1), ("b", 1)]).unwrap();
        let views: Vec<_> = c.nets().collect();
        assert_eq!(views.len(), 3);
        assert_eq!(views[2].name, Some("y"));
        assert_eq!(views[2].level, 1);
        assert_eq!(views[2].value, Some(1));
        assert_eq!(c.net_by_name("b"), Some(ni!(1)));
        assert_eq!(c.part_by_name("and0"), Some(pi!(1)));
        assert_eq!(c.part_name(BOUNDARY).unwrap(), "boundary");
        assert!(c.state(pi!(7)).is_err());
    }

    #[test]
    fn test_out_of_range_access() {
        let mut c = and_circuit();
        assert!(matches!(
            c.read_signal(ni!(9), None),
            Err(Error::NetOutOfRange { len: 3, .. })
        ));
        assert!(matches!(
            c.write_signal(ni!(0), Slice::new(1, 0), 0),
            Err(Error::SliceOutOfRange { width: 1, .. })
        ));
    }

    #[test]
    fn test_dot() {
        let c = and_circuit();
        let dot = c.to_dot();
        assert!(dot.contains("y[1]@1"));
        assert!(dot.contains("and0"));
    }
}
