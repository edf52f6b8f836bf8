#![deny(
    missing_docs,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A runtime for attaching scoped, composable behavior to plain data objects.
//!
//! ## Overview
//!
//! This crate implements the Data-Context-Interaction separation: plain data
//! objects carry the stable state of a program, while the behavior of a
//! single use case lives in **roles** that are bound to data objects only for
//! the duration of one **context** and detached cleanly on exit.
//!
//! A data object never knows which roles exist. It gains the ability to play
//! them by embedding a [`Bindings`] value and implementing [`Data`]
//! (generated by the [`data_object!`] macro), after which any number of
//! contexts can bind their roles to it, dispatch method calls by name, and
//! tear everything down again without leaving a trace.
//!
//! ## Quick Example
//!
//! The classic money transfer: two accounts, a `Source` role, a `Sink` role,
//! and a context that casts both and runs the use case.
//!
//! ```
//! use rolecast::{
//!     Bindings, Context, ContextScope, ContextState, Ctx, Error, Obj, RoleDef, args,
//!     data_object, role,
//! };
//!
//! #[derive(Default)]
//! struct Account {
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
//!     fn decrease_balance(&mut self, amount: f64) {
//!         self.balance -= amount;
//!     }
//! }
//!
//! data_object! {
//!     impl Account {
//!         bindings: bindings;
//!         methods {
//!             pub fn balance(&self) -> f64;
//!             pub fn increase_balance(&mut self, amount: f64);
//!             pub fn decrease_balance(&mut self, amount: f64);
//!         }
//!     }
//! }
//!
//! role! {
//!     static SOURCE: "Source" {
//!         fn withdraw(scope, amount: f64) {
//!             scope.call_data("decrease_balance", args![amount])?;
//!         }
//!     }
//!
//!     static SINK: "Sink" {
//!         fn deposit(scope, amount: f64) {
//!             scope.call_data("increase_balance", args![amount])?;
//!         }
//!     }
//! }
//!
//! struct TransferMoney {
//!     source: Obj,
//!     sink: Obj,
//!     state: ContextState,
//!     bindings: Bindings,
//! }
//!
//! impl TransferMoney {
//!     fn new(source: &Obj, sink: &Obj) -> TransferMoney {
//!         TransferMoney {
//!             source: source.clone(),
//!             sink: sink.clone(),
//!             state: ContextState::new(),
//!             bindings: Bindings::new(),
//!         }
//!     }
//!
//!     fn transfer(ctx: &Ctx, amount: f64) -> Result<(), Error> {
//!         let source: Obj = ctx.get_as("source")?;
//!         let sink: Obj = ctx.get_as("sink")?;
//!         source.add_role("Source", ctx)?;
//!         sink.add_role("Sink", ctx)?;
//!         source.call("withdraw", args![amount])?;
//!         sink.call("deposit", args![amount])?;
//!         Ok(())
//!     }
//! }
//!
//! data_object! {
//!     impl TransferMoney {
//!         bindings: bindings;
//!         methods {
//!             pub op transfer(ctx, amount: f64);
//!         }
//!         properties {
//!             pub source: Obj;
//!             pub sink: Obj;
//!         }
//!     }
//! }
//!
//! impl Context for TransferMoney {
//!     fn role_definitions(&self) -> &'static [&'static RoleDef] {
//!         static ROLES: [&RoleDef; 2] = [&SOURCE, &SINK];
//!         &ROLES
//!     }
//!     fn context_state(&self) -> &ContextState {
//!         &self.state
//!     }
//!     fn context_state_mut(&mut self) -> &mut ContextState {
//!         &mut self.state
//!     }
//! }
//!
//! fn main() -> Result<(), Error> {
//!     let savings = Obj::new(Account::default());
//!     let checking = Obj::new(Account::default());
//!     savings.call("increase_balance", args![20.0_f64])?;
//!
//!     let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));
//!     ctx.call("transfer", args![10.0_f64])?;
//!
//!     assert_eq!(savings.call_as::<f64>("balance", args![])?, 10.0);
//!     assert_eq!(checking.call_as::<f64>("balance", args![])?, 10.0);
//!     Ok(())
//! }
//! ```
//!
//! When `ctx` goes out of scope, both accounts stop answering `withdraw` and
//! `deposit`; only their own methods remain.
//!
//! ## Core Concepts
//!
//! - **Data objects** ([`Obj`], [`Data`], [`data_object!`]) are shared
//!   handles with identity equality. Each carries a static
//!   [`DataDescriptor`]: the explicit table of its own dispatchable methods
//!   and properties.
//! - **Roles** ([`RoleDef`], [`role!`]) are statically compiled method
//!   bundles without state of their own. A role method receives a
//!   [`RoleScope`] in place of `self` and reaches the data object through
//!   delegation under visibility rules.
//! - **Contexts** ([`Context`], [`Ctx`], [`ContextScope`]) own the role
//!   table of a use case, bind roles with [`Obj::add_role`], and guarantee
//!   teardown of every binding via [`Ctx::remove_all_roles`].
//! - **Sub-contexts** ([`ContextProxy`]) let a context run a nested use case
//!   over the same data objects: each proxied call retargets the shared
//!   players to the child and restores them afterwards.
//!
//! ## Dispatch
//!
//! [`Obj::call`] resolves a name in a fixed order: the object's own public
//! methods always win; only on a miss is the role table of the object's
//! *current* context consulted; a second miss fails with
//! [`Error::BadMethodCall`]. The resolver is public as [`Obj::resolve`] for
//! data objects that implement their own dispatch fallback.

#[macro_use]
mod macros;

pub mod prelude;

mod context;
mod data;
mod error;
mod player;
mod proxy;
mod role;
mod value;

pub use self::{
    context::{Context, ContextId, ContextScope, ContextState, Ctx},
    data::{Data, DataDescriptor, DataMethod, DataProperty, MethodInvoke, Visibility},
    error::{ConflictKind, Error, Result},
    player::{Bindings, Obj, Resolution},
    proxy::ContextProxy,
    role::{PropertyPolicy, RoleDef, RoleMethod, RoleScope},
    value::{Args, Value},
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    pub use core::result::Result::{Err, Ok};
    #[doc(hidden)]
    pub use std::vec;

    #[doc(hidden)]
    pub use crate::data::{downcast_data_mut, downcast_data_ref};
}
