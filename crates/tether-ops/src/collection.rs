use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use tether_core::Transformer;

/// Does the collection hold `item`?
#[derive(Clone, Debug)]
pub struct Contains<T> {
    item: T,
}

impl<T> Contains<T> {
    pub fn new(item: T) -> Self {
        Self { item }
    }
}

impl<T: PartialEq> Transformer<Vec<T>, bool> for Contains<T> {
    fn transform(&self, input: &Vec<T>) -> bool {
        input.contains(&self.item)
    }
}

/// Is the value one of a fixed set of candidates?
#[derive(Clone, Debug)]
pub struct ContainedIn<T> {
    candidates: Vec<T>,
}

impl<T> ContainedIn<T> {
    pub fn new(candidates: impl IntoIterator<Item = T>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }
}

impl<T: PartialEq> Transformer<T, bool> for ContainedIn<T> {
    fn transform(&self, input: &T) -> bool {
        self.candidates.contains(input)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IsEmpty;

impl<T> Transformer<Vec<T>, bool> for IsEmpty {
    fn transform(&self, input: &Vec<T>) -> bool {
        input.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<T> Transformer<Vec<T>, usize> for Count {
    fn transform(&self, input: &Vec<T>) -> usize {
        input.len()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ToHashSet;

impl<T: Eq + Hash + Clone> Transformer<Vec<T>, HashSet<T>> for ToHashSet {
    fn transform(&self, input: &Vec<T>) -> HashSet<T> {
        input.iter().cloned().collect()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ToBTreeSet;

impl<T: Ord + Clone> Transformer<Vec<T>, BTreeSet<T>> for ToBTreeSet {
    fn transform(&self, input: &Vec<T>) -> BTreeSet<T> {
        input.iter().cloned().collect()
    }
}
