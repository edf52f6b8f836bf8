//! Data objects and their explicit resolution tables.
//!
//! A data object is any type that can play roles. It acquires the capability
//! by composition: it embeds a [`Bindings`](crate::Bindings) value and
//! implements [`Data`], which exposes that value together with a
//! [`DataDescriptor`] — a static table of the object's own methods and
//! properties. The descriptor replaces interpreter-style method-miss hooks
//! and reflection with an explicit, compile-time resolution table: dispatch
//! consults it first, and only on a miss falls through to the role table.
//!
//! Descriptors are almost always generated with the
//! [`data_object!`](crate::data_object) macro, which turns ordinary inherent
//! methods and fields into erased table entries:
//!
//! ```
//! use rolecast::{Bindings, data_object};
//!
//! #[derive(Default)]
//! pub struct Account {
//!     balance: f64,
//!     bindings: Bindings,
//! }
//!
//! impl Account {
//!     fn balance(&self) -> f64 {
//!         self.balance
//!     }
//!     fn increase_balance(&mut self, amount: f64) {
//!         self.balance += amount;
//!     }
//! }
//!
//! data_object! {
//!     impl Account {
//!         bindings: bindings;
//!         methods {
//!             pub fn balance(&self) -> f64;
//!             pub fn increase_balance(&mut self, amount: f64);
//!         }
//!     }
//! }
//! ```

use core::any::Any;

use crate::{
    context::Ctx,
    error::Error,
    player::Bindings,
    value::{Args, Value},
};

/// Whether a method or property participates in name-based dispatch from
/// outside the data object.
///
/// Only `Public` entries are reachable through [`Obj::call`](crate::Obj::call)
/// and role delegation; `Private` entries exist so that bind-time conflict
/// checks can still see them (a role method may not shadow *any* own method,
/// public or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Reachable through dispatch and delegation.
    Public,
    /// Visible to conflict checks only; dispatch treats the name as absent.
    Private,
}

/// The erased entry point of one own method.
#[derive(Clone, Copy)]
pub enum MethodInvoke {
    /// A leaf accessor over the data object's state. Invoked with the object
    /// exclusively borrowed, so the body must not re-enter dispatch.
    Accessor(fn(&mut dyn Data, Args) -> Result<Value, Error>),
    /// A context operation: a use-case entry point invoked with the context
    /// handle and no live borrow, free to bind roles and re-enter dispatch.
    /// Dispatching one through a bare object handle fails with
    /// [`Error::OperationOutsideContext`].
    Operation(fn(&Ctx, Args) -> Result<Value, Error>),
}

/// One method the data object itself defines.
#[derive(Clone, Copy)]
pub struct DataMethod {
    /// The method name used for dispatch and conflict checks.
    pub name: &'static str,
    /// Dispatch visibility of the method.
    pub visibility: Visibility,
    /// The erased entry point.
    pub invoke: MethodInvoke,
}

/// One property the data object itself defines.
///
/// Reads clone the field out as a [`Value`]; writes move a [`Value`] in.
#[derive(Clone, Copy)]
pub struct DataProperty {
    /// The property name.
    pub name: &'static str,
    /// Read visibility of the property. Writes forward unconditionally to
    /// any declared property, mirroring the delegation rules.
    pub visibility: Visibility,
    /// Reads the field.
    pub get: fn(&dyn Data) -> Result<Value, Error>,
    /// Writes the field, failing with [`Error::TypeMismatch`] if the value
    /// holds a different type.
    pub set: fn(&mut dyn Data, Value) -> Result<(), Error>,
}

/// The static resolution table of one data object type.
#[derive(Clone, Copy)]
pub struct DataDescriptor {
    /// The short type name, used in diagnostics.
    pub type_name: &'static str,
    /// The type's own methods.
    pub methods: &'static [DataMethod],
    /// The type's own properties.
    pub properties: &'static [DataProperty],
}

impl DataDescriptor {
    /// Looks up an own method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&DataMethod> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// Looks up an own property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&DataProperty> {
        self.properties.iter().find(|property| property.name == name)
    }
}

/// The capability a type needs in order to play roles.
///
/// Implemented by embedding a [`Bindings`] value and exposing it alongside
/// the type's [`DataDescriptor`]; the [`data_object!`](crate::data_object)
/// macro generates the implementation.
pub trait Data: Any {
    /// The object's own-method and own-property resolution table.
    fn descriptor(&self) -> &'static DataDescriptor;

    /// The embedded per-context role tables and current-context pointer.
    fn bindings(&self) -> &Bindings;

    /// Mutable access to the embedded role tables.
    fn bindings_mut(&mut self) -> &mut Bindings;
}

/// Downcasts an erased data object reference to its concrete type.
#[doc(hidden)]
pub fn downcast_data_ref<D: Data>(data: &dyn Data) -> Result<&D, Error> {
    let actual = data.descriptor().type_name;
    let any: &dyn Any = data;
    any.downcast_ref::<D>().ok_or(Error::TypeMismatch {
        expected: core::any::type_name::<D>(),
        actual,
    })
}

/// Downcasts an erased data object reference to its concrete type, mutably.
#[doc(hidden)]
pub fn downcast_data_mut<D: Data>(data: &mut dyn Data) -> Result<&mut D, Error> {
    let actual = data.descriptor().type_name;
    let any: &mut dyn Any = data;
    any.downcast_mut::<D>().ok_or(Error::TypeMismatch {
        expected: core::any::type_name::<D>(),
        actual,
    })
}
