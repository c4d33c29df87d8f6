/// Append-only store of sample values for one band of one cell.
///
/// Values keep their insertion order and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleAccumulator {
    values: Vec<f64>,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, samples: &[f64]) {
        self.values.extend_from_slice(samples);
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// All values in insertion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
