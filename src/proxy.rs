//! Sub-context proxies: scoped retargeting of shared role players.
//!
//! A data object can hold role bindings from an enclosing context and from a
//! sub-context at the same time, but its dispatch consults only the *current*
//! context's table. When a parent context builds a child and keeps using the
//! shared players itself, someone has to flip the players' current-context
//! pointer to the child for exactly the duration of a child call, and flip it
//! back afterwards. That is what [`ContextProxy`] does.
//!
//! The proxy is returned by [`Ctx::init_sub_context`] and is the only
//! supported way for a parent to drive a child. Every call through it:
//!
//! 1. snapshots the current-context pointer of each player known to either
//!    the child or the parent,
//! 2. repoints those players to the child,
//! 3. dispatches on the child, and
//! 4. restores every snapshot, even if the dispatched method failed.
//!
//! Calling the raw child handle instead skips the repointing, so shared
//! players keep resolving against the parent and the call fails with
//! [`Error::BadMethodCall`](crate::Error::BadMethodCall).

use core::fmt;

use crate::{
    context::Ctx,
    error::Error,
    player::Obj,
    value::{Args, Value},
};

/// The proxy a parent context holds in place of a raw child handle.
pub struct ContextProxy {
    child: Ctx,
    parent: Ctx,
}

impl ContextProxy {
    pub(crate) fn new(child: Ctx, parent: Ctx) -> Self {
        ContextProxy { child, parent }
    }

    /// The wrapped child context.
    #[must_use]
    pub fn context(&self) -> &Ctx {
        &self.child
    }

    /// The context that initialized the child.
    #[must_use]
    pub fn parent(&self) -> &Ctx {
        &self.parent
    }

    /// Invokes a method on the child with the shared players retargeted.
    ///
    /// Pointers are restored from the snapshot when the call returns, on the
    /// success and the error path alike, so a parent method higher up the
    /// stack resumes with its own bindings intact. Players first bound
    /// *during* the nested call are not in the snapshot and keep the child
    /// as their current context.
    pub fn call(&self, method: &str, args: Args) -> Result<Value, Error> {
        let _guard = Repoint::engage(&self.child, &self.parent)?;
        tracing::trace!(
            child = self.child.type_name(),
            parent = self.parent.type_name(),
            method,
            "proxied sub-context call"
        );
        self.child.call(method, args)
    }

    /// Invokes a method on the child and recovers a typed return value.
    pub fn call_as<T: 'static>(&self, method: &str, args: Args) -> Result<T, Error> {
        self.call(method, args)?.take_as::<T>()
    }

    /// Reads a public property of the child context.
    pub fn get(&self, property: &str) -> Result<Value, Error> {
        self.child.get(property)
    }

    /// Reads a public property of the child and recovers its typed value.
    pub fn get_as<T: 'static>(&self, property: &str) -> Result<T, Error> {
        self.child.get_as(property)
    }

    /// Writes a public property of the child context.
    pub fn set(&self, property: &str, value: Value) -> Result<(), Error> {
        self.child.set(property, value)
    }

    /// Tears the child down. Equivalent to calling
    /// [`Ctx::remove_all_roles`] on the wrapped handle; the parent's own
    /// teardown cascades here too.
    pub fn remove_all_roles(&self) -> Result<(), Error> {
        self.child.remove_all_roles()
    }
}

impl fmt::Debug for ContextProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ContextProxy(<{}> in <{}>)",
            self.child.type_name(),
            self.parent.type_name()
        )
    }
}

/// Restores repointed players when dropped. Restoration happens in reverse
/// order so that nested proxy calls over overlapping player sets unwind like
/// a stack.
struct Repoint {
    snapshots: Vec<(Obj, Option<Ctx>)>,
}

impl Repoint {
    fn engage(child: &Ctx, parent: &Ctx) -> Result<Repoint, Error> {
        let mut players = child.players();
        for player in parent.players() {
            if !players.contains(&player) {
                players.push(player);
            }
        }

        let mut guard = Repoint {
            snapshots: Vec::new(),
        };
        for player in players {
            let previous = player.repoint(Some(child.clone()))?;
            guard.snapshots.push((player, previous));
        }
        Ok(guard)
    }
}

impl Drop for Repoint {
    fn drop(&mut self) {
        while let Some((player, previous)) = self.snapshots.pop() {
            if player.repoint(previous).is_err() {
                tracing::warn!(
                    data = player.type_name(),
                    "player still borrowed; current context not restored"
                );
            }
        }
    }
}
