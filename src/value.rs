//! Type-erased values and argument lists for intercepted calls.
//!
//! Role dispatch is name-based: the runtime cannot know the parameter and
//! return types of a method it resolves at runtime, so every intercepted
//! call moves its arguments and its return value as [`Value`]s. Generated
//! shims (see [`role!`](crate::role) and [`data_object!`](crate::data_object))
//! take typed parameters back out positionally with [`Args::take`] and wrap
//! the typed return value on the way out.
//!
//! ```
//! use rolecast::{Args, Value, args};
//!
//! let mut args: Args = args![1.5_f64, "note"];
//! let amount: f64 = args.take().unwrap();
//! assert_eq!(amount, 1.5);
//!
//! let value = Value::new(42_u32);
//! assert!(value.is::<u32>());
//! assert_eq!(value.take_as::<u32>().unwrap(), 42);
//! ```

use core::{any::Any, fmt};
use std::collections::VecDeque;

use crate::error::Error;

/// A single type-erased owned value.
///
/// The type name of the erased value is captured at construction so that
/// failed downcasts can name what the value actually holds.
pub struct Value {
    data: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    /// Erases an owned value.
    #[must_use]
    pub fn new<T: 'static>(value: T) -> Self {
        Value {
            data: Box::new(value),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// The unit value, returned by role and data methods that yield nothing.
    #[must_use]
    pub fn unit() -> Self {
        Value::new(())
    }

    /// Returns `true` if the erased value is a `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.data.is::<T>()
    }

    /// Returns `true` if this is the unit value.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.is::<()>()
    }

    /// The type name of the erased value, as captured at construction.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recovers the typed value, returning the original [`Value`] unchanged
    /// if it does not hold a `T`.
    pub fn downcast<T: 'static>(self) -> core::result::Result<T, Value> {
        let type_name = self.type_name;
        match self.data.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(data) => Err(Value { data, type_name }),
        }
    }

    /// Borrows the typed value, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Recovers the typed value, failing with [`Error::TypeMismatch`] if it
    /// does not hold a `T`.
    pub fn take_as<T: 'static>(self) -> Result<T, Error> {
        self.downcast::<T>().map_err(|value| Error::TypeMismatch {
            expected: core::any::type_name::<T>(),
            actual: value.type_name,
        })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(<{}>)", self.type_name)
    }
}

/// An ordered argument list for an intercepted call.
///
/// Shims consume arguments positionally and by value; the list is built with
/// the [`args!`](crate::args) macro or from an iterator of [`Value`]s.
#[derive(Debug, Default)]
pub struct Args {
    values: VecDeque<Value>,
}

impl Args {
    /// An empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Args::default()
    }

    /// Builds an argument list from already-erased values, preserving order.
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        Args {
            values: values.into(),
        }
    }

    /// Appends an argument.
    pub fn push<T: 'static>(&mut self, value: T) {
        self.values.push_back(Value::new(value));
    }

    /// Takes the next argument as a `T`.
    ///
    /// Fails with [`Error::MissingArgument`] if the list is exhausted and
    /// [`Error::TypeMismatch`] if the next value holds a different type.
    pub fn take<T: 'static>(&mut self) -> Result<T, Error> {
        let value = self.values.pop_front().ok_or(Error::MissingArgument {
            expected: core::any::type_name::<T>(),
        })?;
        value.take_as::<T>()
    }

    /// Takes the next argument without recovering its type.
    #[must_use]
    pub fn take_value(&mut self) -> Option<Value> {
        self.values.pop_front()
    }

    /// The number of arguments not yet taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if every argument has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Args {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_returns_original_on_failure() {
        let value = Value::new("text");
        let value = value.downcast::<u32>().unwrap_err();
        assert_eq!(value.downcast::<&str>().unwrap(), "text");
    }

    #[test]
    fn take_as_names_both_types() {
        let err = Value::new(1_u8).take_as::<String>().unwrap_err();
        match err {
            Error::TypeMismatch { expected, actual } => {
                assert!(expected.contains("String"));
                assert!(actual.contains("u8"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn args_consume_positionally() {
        let mut args = Args::from_values(vec![Value::new(1_i32), Value::new(2_i32)]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.take::<i32>().unwrap(), 1);
        assert_eq!(args.take::<i32>().unwrap(), 2);
        assert!(matches!(
            args.take::<i32>(),
            Err(Error::MissingArgument { .. })
        ));
    }

    #[test]
    fn unit_value_round_trip() {
        assert!(Value::unit().is_unit());
        assert!(!Value::new(0_u8).is_unit());
    }
}
