//! Ordering over nullable, possibly-NaN values.
//!
//! Conventions:
//! - absent equals absent, and absent sorts before anything present;
//! - two self-unordered values (NaN) are equal to each other, and sort after
//!   every ordered value;
//! - otherwise `PartialOrd` decides, and values it cannot order are only
//!   "equal" if `==` says so.
//!
//! Unlike IEEE comparison, the order is total over floats.

use std::cmp::Ordering;

use tether_core::{Aggregator, Transformer};

#[allow(clippy::eq_op)]
fn is_unordered<T: PartialOrd>(v: &T) -> bool {
    v.partial_cmp(v).is_none()
}

/// `None` only for two distinct values a partial order cannot rank.
pub fn compare_values<T: PartialOrd>(a: &T, b: &T) -> Option<Ordering> {
    if let Some(ord) = a.partial_cmp(b) {
        return Some(ord);
    }
    match (is_unordered(a), is_unordered(b)) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
        (false, false) => (a == b).then_some(Ordering::Equal),
    }
}

pub fn compare_nullable<T: PartialOrd>(a: Option<&T>, b: Option<&T>) -> Option<Ordering> {
    match (a, b) {
        (None, None) => Some(Ordering::Equal),
        (None, Some(_)) => Some(Ordering::Less),
        (Some(_), None) => Some(Ordering::Greater),
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

/// `input >= threshold`. Use `Option<T>` thresholds for nullable properties;
/// `Option`'s own ordering already puts `None` first.
#[derive(Clone, Debug)]
pub struct GreaterOrEqual<T> {
    threshold: T,
}

impl<T> GreaterOrEqual<T> {
    pub fn new(threshold: T) -> Self {
        Self { threshold }
    }
}

impl<T: PartialOrd> Transformer<T, bool> for GreaterOrEqual<T> {
    fn transform(&self, input: &T) -> bool {
        matches!(
            compare_values(input, &self.threshold),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }
}

/// `input < threshold`.
#[derive(Clone, Debug)]
pub struct LessThan<T> {
    threshold: T,
}

impl<T> LessThan<T> {
    pub fn new(threshold: T) -> Self {
        Self { threshold }
    }
}

impl<T: PartialOrd> Transformer<T, bool> for LessThan<T> {
    fn transform(&self, input: &T) -> bool {
        compare_values(input, &self.threshold) == Some(Ordering::Less)
    }
}

/// Equality under the same conventions (NaN equals NaN).
#[derive(Clone, Debug)]
pub struct EqualTo<T> {
    value: T,
}

impl<T> EqualTo<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: PartialOrd> Transformer<T, bool> for EqualTo<T> {
    fn transform(&self, input: &T) -> bool {
        compare_values(input, &self.value) == Some(Ordering::Equal)
    }
}

/// Two masters: `first >= second`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreaterOrEqualPair;

impl<T: PartialOrd> Aggregator<T, bool> for GreaterOrEqualPair {
    fn aggregate(&self, inputs: &[T]) -> bool {
        match inputs {
            [a, b] => matches!(
                compare_values(a, b),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            _ => {
                log::warn!("GreaterOrEqualPair expects 2 inputs, got {}", inputs.len());
                false
            }
        }
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }
}
