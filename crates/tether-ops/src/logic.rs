use tether_core::{Aggregator, Transformer};

/// True when every input is true. No inputs: true.
#[derive(Clone, Copy, Debug, Default)]
pub struct And;

/// True when any input is true. No inputs: false.
#[derive(Clone, Copy, Debug, Default)]
pub struct Or;

#[derive(Clone, Copy, Debug, Default)]
pub struct Not;

impl Aggregator<bool, bool> for And {
    fn aggregate(&self, inputs: &[bool]) -> bool {
        inputs.iter().all(|b| *b)
    }
}

impl Aggregator<bool, bool> for Or {
    fn aggregate(&self, inputs: &[bool]) -> bool {
        inputs.iter().any(|b| *b)
    }
}

impl Transformer<bool, bool> for Not {
    fn transform(&self, input: &bool) -> bool {
        !*input
    }
}

/// Absent inputs count as false.
impl Aggregator<Option<bool>, bool> for And {
    fn aggregate(&self, inputs: &[Option<bool>]) -> bool {
        inputs.iter().all(|b| *b == Some(true))
    }
}

impl Aggregator<Option<bool>, bool> for Or {
    fn aggregate(&self, inputs: &[Option<bool>]) -> bool {
        inputs.iter().any(|b| *b == Some(true))
    }
}
