use super::{Inputs, PartState};

/// Push style hook notified every time the part it is attached to is triggered.
///
/// The observer runs after every output of the part has been computed and gets the same inputs
/// the process functions saw along with the part's state. It only ever gets shared references,
/// so it can't affect the simulation.
///
/// Any `FnMut(&Inputs, &PartState)` closure is a [PartObserver].
///
/// # Example
/// ```
/// # use netsim::{Inputs, PartObserver, PartState};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// let observer = move |inputs: &Inputs, _: &PartState| sink.borrow_mut().push(inputs.to_map());
/// # let _: Box<dyn PartObserver> = Box::new(observer);
/// ```
pub trait PartObserver {
    fn on_trigger(&mut self, inputs: &Inputs<'_>, state: &PartState);
}

impl<F> PartObserver for F
where
    F: FnMut(&Inputs<'_>, &PartState),
{
    fn on_trigger(&mut self, inputs: &Inputs<'_>, state: &PartState) {
        self(inputs, state)
    }
}

/// Builds the observer of a part that names a widget, given the part's name.
pub type WidgetFactory = Box<dyn Fn(&str) -> Box<dyn PartObserver> + Send + Sync>;

/// Observer that logs every trigger of its part with [tracing].
///
/// Registered as the `"log"` widget by [Registry::with_primitives](super::Registry::with_primitives).
#[derive(Debug, Clone)]
pub struct LogObserver {
    part: String,
}

impl LogObserver {
    pub fn new<S: Into<String>>(part: S) -> Self {
        LogObserver { part: part.into() }
    }
}

impl PartObserver for LogObserver {
    fn on_trigger(&mut self, inputs: &Inputs<'_>, state: &PartState) {
        let registers: Vec<_> = state.registers().collect();
        tracing::info!(part = %self.part, ?inputs, ?registers, "triggered");
    }
}
