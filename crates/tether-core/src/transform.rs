//! Pure mapping steps that sit between masters and slaves.
//!
//! Any `Fn(&I) -> O` is a [`Transformer`] and any `Fn(&[I]) -> O` is an
//! [`Aggregator`]. Structs implementing the traits may carry configuration
//! (a threshold, a needle to search for) but never subscriptions.

use std::marker::PhantomData;

pub trait Transformer<I, O> {
    fn transform(&self, input: &I) -> O;
}

impl<I, O, F> Transformer<I, O> for F
where
    F: Fn(&I) -> O,
{
    fn transform(&self, input: &I) -> O {
        self(input)
    }
}

/// Many inputs, one output. Inputs arrive in the order the masters were
/// declared.
pub trait Aggregator<I, O> {
    fn aggregate(&self, inputs: &[I]) -> O;

    /// Exact number of inputs this aggregator accepts, if it cares.
    /// Checked against the master count when a binding is built.
    fn arity(&self) -> Option<usize> {
        None
    }
}

impl<I, O, F> Aggregator<I, O> for F
where
    F: Fn(&[I]) -> O,
{
    fn aggregate(&self, inputs: &[I]) -> O {
        self(inputs)
    }
}

/// `first` followed by `second`.
pub struct Then<A, B, M> {
    first: A,
    second: B,
    _mid: PhantomData<fn() -> M>,
}

impl<I, M, O, A, B> Transformer<I, O> for Then<A, B, M>
where
    A: Transformer<I, M>,
    B: Transformer<M, O>,
{
    fn transform(&self, input: &I) -> O {
        self.second.transform(&self.first.transform(input))
    }
}

impl<I, M, O, A, B> Aggregator<I, O> for Then<A, B, M>
where
    A: Aggregator<I, M>,
    B: Transformer<M, O>,
{
    fn aggregate(&self, inputs: &[I]) -> O {
        self.second.transform(&self.first.aggregate(inputs))
    }

    fn arity(&self) -> Option<usize> {
        self.first.arity()
    }
}

pub trait TransformerExt<I, M>: Transformer<I, M> + Sized {
    fn then<O, B: Transformer<M, O>>(self, next: B) -> Then<Self, B, M> {
        Then {
            first: self,
            second: next,
            _mid: PhantomData,
        }
    }
}

impl<I, M, T: Transformer<I, M>> TransformerExt<I, M> for T {}

pub trait AggregatorExt<I, M>: Aggregator<I, M> + Sized {
    fn then_map<O, B: Transformer<M, O>>(self, next: B) -> Then<Self, B, M> {
        Then {
            first: self,
            second: next,
            _mid: PhantomData,
        }
    }
}

impl<I, M, A: Aggregator<I, M>> AggregatorExt<I, M> for A {}
