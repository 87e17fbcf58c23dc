use super::PartState;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt::{self, Debug, Formatter};
use std::ops::Index;

/// Function computing the value of one output pin from the inputs of a part and its state.
///
/// It may mutate the state, which is how sequential parts retain history.
pub type ProcessFn = Box<dyn Fn(&Inputs<'_>, &mut PartState) -> u32 + Send + Sync>;

/// Function seeding the [PartState] of every new instance of a [PartConfig].
pub type InitFn = Box<dyn Fn(&mut PartState) + Send + Sync>;

/// Declared input pin of a [PartConfig].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InputPin {
    pub(super) name: String,
    pub(super) trigger: bool,
}

impl InputPin {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the outputs of the part depend combinationally on this pin,
    /// in which case every non latched output must sit at a strictly higher level than it.
    ///
    /// Sampled inputs, like the `d` pin of a flip-flop, are read but aren't scheduling dependencies.
    pub fn is_trigger(&self) -> bool {
        self.trigger
    }
}

/// Declared output pin of a [PartConfig].
pub struct OutputPin {
    pub(super) name: String,
    pub(super) process: Option<ProcessFn>,
    pub(super) latched: bool,
}

impl OutputPin {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the pin has no process function, it only exists as an attachment point
    /// for observers and is never written.
    pub fn is_passive(&self) -> bool {
        self.process.is_none()
    }

    /// Returns true if the pin is driven from persistent state, which lets it break feedback loops.
    pub fn is_latched(&self) -> bool {
        self.latched
    }
}

impl Debug for OutputPin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputPin")
            .field("name", &self.name)
            .field("passive", &self.is_passive())
            .field("latched", &self.latched)
            .finish()
    }
}

/// Shared behavioural template of a part: its pins, what each output computes and how the
/// state of a new instance is seeded. Many parts can instantiate the same [PartConfig].
///
/// # Example
/// ```
/// # use netsim::PartConfig;
/// // Two input and gate.
/// let and = PartConfig::new()
///     .input("a")
///     .input("b")
///     .output("y", |i, _| i["a"] & i["b"]);
///
/// // One cycle delay, the output comes from state so it can be latched.
/// let register = PartConfig::new()
///     .sampled_input("d")
///     .latched_output("q", |i, s| s.replace("q", i["d"]));
///
/// assert_eq!(and.input_pins().len(), 2);
/// assert!(register.output_pins()[0].is_latched());
/// ```
#[derive(Default)]
pub struct PartConfig {
    inputs: Vec<InputPin>,
    outputs: Vec<OutputPin>,
    init: Option<InitFn>,
}

impl PartConfig {
    /// Returns a [PartConfig] without pins.
    pub fn new() -> PartConfig {
        Default::default()
    }

    /// Returns a [PartConfig] that only declares pins: all inputs are triggers and all outputs
    /// are passive. This is what a boundary part or an observer only part instantiates.
    pub fn interface<S: AsRef<str>>(inputs: &[S], outputs: &[S]) -> PartConfig {
        let config = inputs
            .iter()
            .fold(PartConfig::new(), |c, name| c.input(name.as_ref()));
        outputs
            .iter()
            .fold(config, |c, name| c.passive_output(name.as_ref()))
    }

    /// Appends a trigger input pin.
    pub fn input<S: Into<String>>(mut self, name: S) -> Self {
        self.inputs.push(InputPin {
            name: name.into(),
            trigger: true,
        });
        self
    }

    /// Appends an input pin that is read but is not a scheduling dependency.
    pub fn sampled_input<S: Into<String>>(mut self, name: S) -> Self {
        self.inputs.push(InputPin {
            name: name.into(),
            trigger: false,
        });
        self
    }

    /// Appends an output pin computed by `process`.
    pub fn output<S, F>(self, name: S, process: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Inputs<'_>, &mut PartState) -> u32 + Send + Sync + 'static,
    {
        self.push_output(name.into(), Some(Box::new(process)), false)
    }

    /// Appends an output pin computed by `process` that only depends on the state of the part.
    pub fn latched_output<S, F>(self, name: S, process: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Inputs<'_>, &mut PartState) -> u32 + Send + Sync + 'static,
    {
        self.push_output(name.into(), Some(Box::new(process)), true)
    }

    /// Appends an output pin without process function.
    pub fn passive_output<S: Into<String>>(self, name: S) -> Self {
        self.push_output(name.into(), None, false)
    }

    fn push_output(mut self, name: String, process: Option<ProcessFn>, latched: bool) -> Self {
        self.outputs.push(OutputPin {
            name,
            process,
            latched,
        });
        self
    }

    /// Sets the function seeding the state of new instances.
    pub fn init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut PartState) + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    pub fn input_pins(&self) -> &[InputPin] {
        &self.inputs
    }

    pub fn output_pins(&self) -> &[OutputPin] {
        &self.outputs
    }

    /// Returns the position of input pin `name`.
    pub fn input_position(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.name == name)
    }

    /// Returns the position of output pin `name`.
    pub fn output_position(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.name == name)
    }

    /// Returns true if no output has a process function.
    pub fn is_passive(&self) -> bool {
        self.outputs.iter().all(OutputPin::is_passive)
    }

    /// Returns a fresh [PartState], seeded by the init function if there is one.
    pub fn new_state(&self) -> PartState {
        let mut state = PartState::default();
        if let Some(init) = &self.init {
            init(&mut state);
        }
        state
    }

    /// Runs the process function of the output at `output`, None if it is passive.
    pub(super) fn process(
        &self,
        output: usize,
        inputs: &Inputs<'_>,
        state: &mut PartState,
    ) -> Option<u32> {
        self.outputs[output]
            .process
            .as_ref()
            .map(|process| process(inputs, state))
    }
}

impl Debug for PartConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartConfig")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// Settled values of the input pins of a part, handed to process functions and observers.
///
/// Indexing with a pin name the part doesn't declare panics, use [Inputs::get] to avoid it.
pub struct Inputs<'a> {
    pins: &'a [InputPin],
    values: SmallVec<[u32; 4]>,
}

impl<'a> Inputs<'a> {
    pub(super) fn new(pins: &'a [InputPin], values: SmallVec<[u32; 4]>) -> Self {
        debug_assert_eq!(pins.len(), values.len());
        Inputs { pins, values }
    }

    /// Returns the value of input pin `pin`.
    pub fn get(&self, pin: &str) -> Option<u32> {
        self.pins
            .iter()
            .position(|p| p.name == pin)
            .map(|i| self.values[i])
    }

    /// Returns the pins and their values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.pins
            .iter()
            .zip(self.values.iter())
            .map(|(p, v)| (p.name.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an owned copy of the inputs.
    pub fn to_map(&self) -> IndexMap<String, u32> {
        self.iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }
}

impl Index<&str> for Inputs<'_> {
    type Output = u32;

    fn index(&self, pin: &str) -> &u32 {
        match self.pins.iter().position(|p| p.name == pin) {
            Some(i) => &self.values[i],
            None => panic!("Part has no input pin `{}`", pin),
        }
    }
}

impl Debug for Inputs<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_interface_is_passive() {
        let c = PartConfig::interface(&["a", "b"], &["y"]);
        assert!(c.is_passive());
        assert_eq!(c.input_position("b"), Some(1));
        assert_eq!(c.output_position("y"), Some(0));
        assert_eq!(c.output_position("a"), None);
        assert!(c.input_pins().iter().all(InputPin::is_trigger));
    }

    #[test]
    fn test_process_and_skip_passive() {
        let c = PartConfig::new()
            .input("a")
            .output("y", |i, _| i["a"] + 1)
            .passive_output("led");
        let values: SmallVec<[u32; 4]> = smallvec![41];
        let inputs = Inputs::new(c.input_pins(), values);
        let mut state = c.new_state();

        assert_eq!(c.process(0, &inputs, &mut state), Some(42));
        assert_eq!(c.process(1, &inputs, &mut state), None);
        assert!(!c.is_passive());
    }

    #[test]
    fn test_init_seeds_every_state() {
        let c = PartConfig::new().init(|s| s.load(vec![1, 2, 3]));
        assert_eq!(c.new_state().read_memory(2), 3);
        assert_eq!(c.new_state().memory().count(), 3);
    }

    #[test]
    fn test_inputs_lookup() {
        let c = PartConfig::new().input("a").sampled_input("d");
        let inputs = Inputs::new(c.input_pins(), smallvec![3, 4]);
        assert_eq!(inputs.get("d"), Some(4));
        assert_eq!(inputs.get("x"), None);
        assert_eq!(inputs["a"], 3);
        assert_eq!(inputs.to_map().get("d"), Some(&4));
        assert!(!c.input_pins()[1].is_trigger());
    }

    #[test]
    #[should_panic(expected = "Part has no input pin `x`")]
    fn test_inputs_index_panics() {
        let c = PartConfig::new().input("a");
        let inputs = Inputs::new(c.input_pins(), smallvec![0]);
        let _ = inputs["x"];
    }
}
