//! Commonly used items for convenient importing.
//!
//! The prelude re-exports the types, traits, and macros that almost every
//! user of the crate touches: the data-object surface ([`Obj`], [`Data`],
//! [`Bindings`], [`data_object!`]), the role surface ([`RoleDef`],
//! [`RoleScope`], [`role!`]), the context surface ([`Context`], [`Ctx`],
//! [`ContextState`], [`ContextScope`], [`ContextProxy`]), and the error and
//! value plumbing ([`Error`], [`Result`], [`Value`], [`Args`], [`args!`]).
//!
//! # Usage
//!
//! ```
//! use rolecast::prelude::*;
//!
//! #[derive(Default)]
//! struct Sensor {
//!     reading: f64,
//!     bindings: Bindings,
//! }
//!
//! impl Sensor {
//!     fn reading(&self) -> f64 {
//!         self.reading
//!     }
//! }
//!
//! data_object! {
//!     impl Sensor {
//!         bindings: bindings;
//!         methods {
//!             pub fn reading(&self) -> f64;
//!         }
//!     }
//! }
//!
//! let sensor = Obj::new(Sensor::default());
//! assert_eq!(sensor.call_as::<f64>("reading", args![]).unwrap(), 0.0);
//! ```
//!
//! For more specialized needs, import specific items directly from the crate
//! root.

pub use crate::{
    Args, Bindings, ConflictKind, Context, ContextProxy, ContextScope, ContextState, Ctx, Data,
    Error, Obj, PropertyPolicy, Resolution, Result, RoleDef, RoleScope, Value, Visibility, args,
    data_object, role,
};
