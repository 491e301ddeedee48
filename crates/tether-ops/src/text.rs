use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use tether_core::Transformer;

#[derive(Clone, Copy, Debug, Default)]
pub struct ToDisplayString;

impl<T: Display> Transformer<T, String> for ToDisplayString {
    fn transform(&self, input: &T) -> String {
        input.to_string()
    }
}

/// Best-effort parse: failures are logged and yield `None`.
pub struct Parse<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> Parse<T> {
    pub fn new() -> Self {
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Default for Parse<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Parse<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Parse<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse<{}>", std::any::type_name::<T>())
    }
}

impl<T> Transformer<String, Option<T>> for Parse<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn transform(&self, input: &String) -> Option<T> {
        match input.trim().parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!(
                    "cannot convert {input:?} to {}: {e}",
                    std::any::type_name::<T>()
                );
                None
            }
        }
    }
}

/// Replaces `None` with a fixed value.
#[derive(Clone, Debug)]
pub struct OrDefault<T> {
    fallback: T,
}

impl<T> OrDefault<T> {
    pub fn new(fallback: T) -> Self {
        Self { fallback }
    }
}

impl<T: Clone> Transformer<Option<T>, T> for OrDefault<T> {
    fn transform(&self, input: &Option<T>) -> T {
        input.clone().unwrap_or_else(|| self.fallback.clone())
    }
}
