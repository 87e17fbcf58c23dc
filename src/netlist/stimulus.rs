use super::{Circuit, BOUNDARY};
use crate::error::{Error, Result};
use indexmap::IndexMap;

impl Circuit {
    /// Updates with `pin` set to 1, then again with `pin` set to 0.
    /// Returns the outputs after the second update.
    pub fn pulse(&mut self, pin: &str) -> Result<IndexMap<String, u32>> {
        self.update([(pin, 1)])?;
        self.update([(pin, 0)])
    }

    /// Runs one update per step of `stimulus` and records the value of every pin in `outputs`
    /// after each step.
    ///
    /// Every pin of `stimulus` must have the same number of steps.
    ///
    /// # Example
    /// ```
    /// # use netsim::{NetlistConfig, Registry, Resolver, BOUNDARY};
    /// # use indexmap::indexmap;
    /// let mut config = NetlistConfig::new();
    /// config.boundary(&["d"], &["q"]);
    /// let d = config.net("d", 1, 0);
    /// let q = config.net("q", 1, 0);
    /// let reg = config.part("r", "register");
    /// config.drive(BOUNDARY, "d", d);
    /// config.wire(BOUNDARY, "q", q);
    /// config.wire(reg, "d", d);
    /// config.drive(reg, "q", q);
    ///
    /// let registry = Registry::with_primitives();
    /// let mut circuit = Resolver::new(&registry).resolve(&config).unwrap();
    /// let trace = circuit.trace(&indexmap! {"d".to_owned() => vec![1, 0, 1, 1]}, &["q"]).unwrap();
    ///
    /// assert_eq!(trace["q"], vec![0, 1, 0, 1]);
    /// ```
    pub fn trace(
        &mut self,
        stimulus: &IndexMap<String, Vec<u32>>,
        outputs: &[&str],
    ) -> Result<IndexMap<String, Vec<u32>>> {
        let steps = stimulus.values().next().map_or(0, Vec::len);
        for (pin, values) in stimulus {
            if values.len() != steps {
                return Err(Error::StimulusLength {
                    pin: pin.clone(),
                    len: values.len(),
                    expected: steps,
                });
            }
        }

        let mut trace: IndexMap<String, Vec<u32>> = outputs
            .iter()
            .map(|pin| ((*pin).to_owned(), Vec::with_capacity(steps)))
            .collect();
        for step in 0..steps {
            let settled = self.update(stimulus.iter().map(|(pin, values)| (pin, values[step])))?;
            for (pin, values) in trace.iter_mut() {
                let value = settled.get(pin).ok_or_else(|| Error::UnknownPin {
                    part: BOUNDARY,
                    pin: pin.clone(),
                })?;
                values.push(*value);
            }
        }
        Ok(trace)
    }
}
