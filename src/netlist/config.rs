use super::{NetIndex, PartIndex};
use crate::data_structures::Slice;
use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declarative description of a circuit, the input of a [Resolver](super::Resolver).
///
/// It is usually produced by a netlist compiler and read from JSON, the builder methods make it
/// easy to write one by hand.
///
/// # Levels
///
/// The `level` of every net is computed by whatever builds the netlist and must satisfy:
/// * Nets are listed in non-decreasing level order.
/// * A net driven by a part sits at a strictly higher level than every net read by a trigger
///   input of that part.
/// * A net driven by a latched output may share the level of a trigger input whose net no part
///   drives, such as an external input.
/// * Feedback only goes through latched outputs. Their parts read the fed back nets through
///   sampled inputs, which see the values settled by the previous update.
///
/// The resolver rejects netlists that break these rules.
///
/// # Boundary
///
/// Part 0 is the boundary part, whose input pins are the circuit's external inputs and whose
/// output pins are the circuit's external outputs. It is never triggered.
///
/// # Example
/// ```
/// # use netsim::{NetlistConfig, Registry, Resolver, BOUNDARY};
/// let mut config = NetlistConfig::new();
/// config.boundary(&["a", "b"], &["y"]);
/// let a = config.net("a", 1, 0);
/// let b = config.net("b", 1, 0);
/// let y = config.net("y", 1, 1);
/// let and = config.part("and0", "and");
///
/// config.drive(BOUNDARY, "a", a);
/// config.drive(BOUNDARY, "b", b);
/// config.wire(BOUNDARY, "y", y);
/// config.wire(and, "a", a);
/// config.wire(and, "b", b);
/// config.drive(and, "y", y);
///
/// let registry = Registry::with_primitives();
/// let mut circuit = Resolver::new(&registry).resolve(&config).unwrap();
/// assert_eq!(circuit.update([("a", 1), ("b", 1)]).unwrap()["y"], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetlistConfig {
    #[serde(default)]
    pub nets: Vec<NetConfig>,
    /// Pin only templates, looked up after the registry.
    #[serde(default, alias = "partConfigs")]
    pub part_configs: IndexMap<String, InterfaceConfig>,
    #[serde(default)]
    pub parts: Vec<PartInstanceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub width: u8,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// Output pin of a part that writes into a net.
/// For the boundary part it is an input pin, since external inputs drive the circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub part: PartIndex,
    pub pin: String,
}

/// Pin declaration of a template, every input is a trigger and every output is passive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(default, alias = "IN")]
    pub inputs: Vec<String>,
    #[serde(default, alias = "OUT")]
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInstanceConfig {
    pub name: String,
    /// Template key, looked up in the registry then in [NetlistConfig::part_configs].
    pub config: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default)]
    pub wiring: IndexMap<String, WireConfig>,
}

/// Endpoint a pin is wired to, the full width of the net if `slice` is None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireConfig {
    pub net: NetIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice: Option<Slice>,
}

/// Key of the interface template declared by [NetlistConfig::boundary].
pub const BOUNDARY_CONFIG: &str = "boundary";

impl NetlistConfig {
    /// Returns an empty [NetlistConfig].
    pub fn new() -> NetlistConfig {
        Default::default()
    }

    /// Parses a [NetlistConfig] from JSON.
    pub fn from_json(json: &str) -> Result<NetlistConfig> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the [NetlistConfig] to pretty printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Declares the pin only template `key`.
    pub fn interface<S: AsRef<str>>(&mut self, key: &str, inputs: &[S], outputs: &[S]) {
        let owned = |pins: &[S]| pins.iter().map(|p| p.as_ref().to_owned()).collect();
        self.part_configs.insert(
            key.to_owned(),
            InterfaceConfig {
                inputs: owned(inputs),
                outputs: owned(outputs),
            },
        );
    }

    /// Declares the circuit's external interface and adds the boundary part.
    ///
    /// # Panics
    ///
    /// Panics if a part has already been added.
    pub fn boundary<S: AsRef<str>>(&mut self, inputs: &[S], outputs: &[S]) -> PartIndex {
        assert!(
            self.parts.is_empty(),
            "The boundary must be the first part of the netlist"
        );
        self.interface(BOUNDARY_CONFIG, inputs, outputs);
        self.part(BOUNDARY_CONFIG, BOUNDARY_CONFIG)
    }

    /// Appends a net named `name`.
    pub fn net<S: Into<String>>(&mut self, name: S, width: u8, level: u32) -> NetIndex {
        self.push_net(Some(name.into()), width, level)
    }

    /// Appends a net without name.
    pub fn anonymous_net(&mut self, width: u8, level: u32) -> NetIndex {
        self.push_net(None, width, level)
    }

    fn push_net(&mut self, name: Option<String>, width: u8, level: u32) -> NetIndex {
        self.nets.push(NetConfig {
            name,
            width,
            level,
            sources: Vec::new(),
        });
        ni!(self.nets.len() - 1)
    }

    /// Appends a part named `name` instantiating template `config`.
    pub fn part<S: Into<String>, C: Into<String>>(&mut self, name: S, config: C) -> PartIndex {
        self.parts.push(PartInstanceConfig {
            name: name.into(),
            config: config.into(),
            widget: None,
            wiring: IndexMap::new(),
        });
        pi!(self.parts.len() - 1)
    }

    /// Attaches the widget registered under `key` to `part`.
    ///
    /// # Panics
    ///
    /// Panics if `part` is out of range.
    pub fn widget<S: Into<String>>(&mut self, part: PartIndex, key: S) {
        self.parts[part.idx].widget = Some(key.into());
    }

    /// Wires `pin` of `part` to the whole of `net`.
    ///
    /// # Panics
    ///
    /// Panics if `part` is out of range.
    pub fn wire(&mut self, part: PartIndex, pin: &str, net: NetIndex) {
        self.wire_endpoint(part, pin, WireConfig { net, slice: None });
    }

    /// Wires `pin` of `part` to `slice` of `net`.
    ///
    /// # Panics
    ///
    /// Panics if `part` is out of range.
    pub fn wire_slice(&mut self, part: PartIndex, pin: &str, net: NetIndex, slice: Slice) {
        self.wire_endpoint(
            part,
            pin,
            WireConfig {
                net,
                slice: Some(slice),
            },
        );
    }

    fn wire_endpoint(&mut self, part: PartIndex, pin: &str, wire: WireConfig) {
        self.parts[part.idx].wiring.insert(pin.to_owned(), wire);
    }

    /// Wires `pin` of `part` to the whole of `net` and lists it as a source of `net`.
    ///
    /// # Panics
    ///
    /// Panics if `part` or `net` are out of range.
    pub fn drive(&mut self, part: PartIndex, pin: &str, net: NetIndex) {
        self.wire(part, pin, net);
        self.add_source(part, pin, net);
    }

    /// Wires `pin` of `part` to `slice` of `net` and lists it as a source of `net`.
    ///
    /// # Panics
    ///
    /// Panics if `part` or `net` are out of range.
    pub fn drive_slice(&mut self, part: PartIndex, pin: &str, net: NetIndex, slice: Slice) {
        self.wire_slice(part, pin, net, slice);
        self.add_source(part, pin, net);
    }

    fn add_source(&mut self, part: PartIndex, pin: &str, net: NetIndex) {
        self.nets[net.idx].sources.push(SourceConfig {
            part,
            pin: pin.to_owned(),
        });
    }
}
