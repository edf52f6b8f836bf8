//! Contexts: use-case scopes that bind roles and guarantee their removal.
//!
//! A context is itself a data object (it has a descriptor, and it can play
//! roles in an enclosing context), extended with three things: the static
//! role table of its type, an ordered registry of every player it bound a
//! role to, and the list of sub-contexts it created. [`Ctx`] is the shared
//! handle; [`ContextScope`] is the scoped guard that runs
//! [`Ctx::remove_all_roles`] on every exit path.
//!
//! Use-case entry points ("operations", declared with `pub op` in
//! [`data_object!`](crate::data_object)) are dispatched with the context
//! handle and hold no borrow while they run, so they can bind roles, create
//! sub-contexts, and re-enter dispatch freely. Leaf accessors cannot.

use core::{cell::RefCell, fmt, ops::Deref};
use std::{
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{
    data::Data,
    error::Error,
    player::Obj,
    proxy::ContextProxy,
    role::{PropertyPolicy, RoleDef},
    value::{Args, Value},
};

/// The identity of one live context instance.
///
/// Dispatch tables are keyed by instance identity, not by context type, so
/// two live instances of the same context type cannot corrupt each other's
/// bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The bookkeeping a context carries: every player it bound a role to, in
/// registration order and without duplicates, plus the sub-contexts it
/// initialized. Embed one per context type and expose it through
/// [`Context::context_state`].
#[derive(Default)]
pub struct ContextState {
    players: IndexMap<usize, Obj, FxBuildHasher>,
    children: Vec<Ctx>,
}

impl ContextState {
    /// Creates empty context bookkeeping.
    #[must_use]
    pub fn new() -> Self {
        ContextState::default()
    }
}

/// A use-case scope. Implemented on top of [`Data`]: every context is also a
/// data object, so it can expose properties to its roles and play roles in
/// an enclosing context.
pub trait Context: Data {
    /// The role table of this context type: the compile-time association
    /// from role name to role implementation. A role belongs to exactly one
    /// context type.
    ///
    /// The table references the `static`s produced by the
    /// [`role!`](crate::role) macro:
    ///
    /// ```ignore
    /// fn role_definitions(&self) -> &'static [&'static RoleDef] {
    ///     static ROLES: [&RoleDef; 2] = [&SOURCE, &SINK];
    ///     &ROLES
    /// }
    /// ```
    fn role_definitions(&self) -> &'static [&'static RoleDef] {
        &[]
    }

    /// How role delegation treats reads of undefined properties for roles
    /// bound by this context type.
    fn property_policy(&self) -> PropertyPolicy {
        PropertyPolicy::Strict
    }

    /// The embedded bookkeeping.
    fn context_state(&self) -> &ContextState;

    /// Mutable access to the embedded bookkeeping.
    fn context_state_mut(&mut self) -> &mut ContextState;
}

/// A shared handle to a live context.
///
/// Cloning is cheap and clones designate the same context; equality is
/// instance identity.
#[derive(Clone)]
pub struct Ctx {
    id: ContextId,
    type_name: &'static str,
    inner: Rc<RefCell<dyn Context>>,
    object: Obj,
}

impl Ctx {
    /// Wraps a context value into a shared handle, assigning it a fresh
    /// [`ContextId`].
    #[must_use]
    pub fn new<C: Context>(context: C) -> Ctx {
        let type_name = context.descriptor().type_name;
        let rc = Rc::new(RefCell::new(context));
        let object = Obj::from_dyn(rc.clone());
        let inner: Rc<RefCell<dyn Context>> = rc;
        Ctx {
            id: ContextId::next(),
            type_name,
            inner,
            object,
        }
    }

    /// This context's instance identity.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The short type name of the context.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The context viewed as a plain data object, for example to let it
    /// play a role in an enclosing context.
    #[must_use]
    pub fn object(&self) -> &Obj {
        &self.object
    }

    /// Binds a role of the enclosing context to this context, making the
    /// context itself a role player.
    pub fn play_role(&self, role_name: &str, enclosing: &Ctx) -> Result<(), Error> {
        self.object.add_role(role_name, enclosing).map(|_| ())
    }

    /// Invokes a method on the context by name: its own public accessors
    /// and operations first, then any role methods it is currently playing.
    pub fn call(&self, method: &str, args: Args) -> Result<Value, Error> {
        self.object.dispatch(method, args, Some(self))
    }

    /// Invokes a method and recovers a typed return value.
    pub fn call_as<T: 'static>(&self, method: &str, args: Args) -> Result<T, Error> {
        self.call(method, args)?.take_as::<T>()
    }

    /// Reads a public property of the context.
    pub fn get(&self, property: &str) -> Result<Value, Error> {
        self.object.get(property)
    }

    /// Reads a public property and recovers its typed value.
    pub fn get_as<T: 'static>(&self, property: &str) -> Result<T, Error> {
        self.object.get_as(property)
    }

    /// Writes a public property of the context.
    pub fn set(&self, property: &str, value: Value) -> Result<(), Error> {
        self.object.set(property, value)
    }

    /// The undefined-property policy of this context's type.
    #[must_use]
    pub fn property_policy(&self) -> PropertyPolicy {
        self.inner
            .try_borrow()
            .map(|context| context.property_policy())
            .unwrap_or_default()
    }

    /// Looks a role up in this context type's role table.
    #[must_use]
    pub fn role_definition(&self, role_name: &str) -> Option<&'static RoleDef> {
        let context = self.inner.try_borrow().ok()?;
        context
            .role_definitions()
            .iter()
            .find(|def| def.name == role_name)
            .copied()
    }

    /// Every player this context has bound a role to, in registration
    /// order.
    #[must_use]
    pub fn players(&self) -> Vec<Obj> {
        self.inner
            .try_borrow()
            .map(|context| context.context_state().players.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Records a player for teardown. Duplicate registration is tolerated
    /// and keeps the original order. Fails if the context is exclusively
    /// borrowed: a binding that cannot be recorded would escape teardown, so
    /// it is refused outright.
    pub(crate) fn register_player(&self, player: &Obj) -> Result<(), Error> {
        let mut context = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name,
            })?;
        context
            .context_state_mut()
            .players
            .insert(player.key(), player.clone());
        Ok(())
    }

    /// Wraps a child context for use inside this one.
    ///
    /// The returned proxy — not the raw child handle — must be used by the
    /// parent from then on: only a call through the proxy retargets shared
    /// players to the child for the duration of the call. Calling the raw
    /// child directly is a usage error that manifests later as
    /// [`Error::BadMethodCall`].
    #[must_use]
    pub fn init_sub_context(&self, child: Ctx) -> ContextProxy {
        if let Ok(mut context) = self.inner.try_borrow_mut() {
            context.context_state_mut().children.push(child.clone());
        }
        ContextProxy::new(child, self.clone())
    }

    /// Tears down every binding this context created.
    ///
    /// Clears this context's entry from each registered player's dispatch
    /// table, resets matching current-context pointers, and cascades
    /// depth-first into every sub-context initialized through
    /// [`Ctx::init_sub_context`]. Idempotent. A player that cannot be
    /// unbound does not stop the others; all failures are collected into
    /// [`Error::Teardown`], and the failed players and sub-contexts stay
    /// registered so a later call can retry them.
    pub fn remove_all_roles(&self) -> Result<(), Error> {
        let (players, children) = match self.inner.try_borrow_mut() {
            Ok(mut context) => {
                let state = context.context_state_mut();
                (
                    core::mem::take(&mut state.players),
                    core::mem::take(&mut state.children),
                )
            }
            Err(_) => {
                return Err(Error::AlreadyBorrowed {
                    data: self.type_name,
                });
            }
        };

        let mut failures = Vec::new();
        let mut stale_players = Vec::new();
        let mut stale_children = Vec::new();
        for (key, player) in players {
            if let Err(error) = player.unbind_context(self) {
                failures.push(error);
                stale_players.push((key, player));
            }
        }
        for child in children {
            if let Err(error) = child.remove_all_roles() {
                failures.push(error);
                stale_children.push(child);
            }
        }
        if !(stale_players.is_empty() && stale_children.is_empty())
            && let Ok(mut context) = self.inner.try_borrow_mut()
        {
            let state = context.context_state_mut();
            for (key, player) in stale_players {
                state.players.insert(key, player);
            }
            state.children.extend(stale_children);
        }
        tracing::debug!(context = self.type_name, "removed all roles");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Teardown { failures })
        }
    }
}

impl PartialEq for Ctx {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ctx {}

impl fmt::Debug for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ctx(<{}>#{})", self.type_name, self.id.0)
    }
}

/// A scoped context: guarantees [`Ctx::remove_all_roles`] on every exit
/// path — normal return, early return, or unwind — without relying on
/// anyone remembering to call it.
///
/// Dereferences to [`Ctx`], so a scope can be used wherever a handle can.
///
/// ```no_run
/// use rolecast::{Ctx, ContextScope, args};
///
/// # fn build() -> Ctx { unimplemented!() }
/// # fn example() -> Result<(), rolecast::Error> {
/// let ctx = ContextScope::enter(build());
/// ctx.call("transfer", args![])?;
/// // roles are removed here even if `?` propagated an error above
/// # Ok(())
/// # }
/// ```
pub struct ContextScope {
    ctx: Ctx,
}

impl ContextScope {
    /// Takes teardown responsibility for a context.
    #[must_use]
    pub fn enter(ctx: Ctx) -> Self {
        ContextScope { ctx }
    }

    /// The guarded context handle.
    #[must_use]
    pub fn context(&self) -> &Ctx {
        &self.ctx
    }
}

impl Deref for ContextScope {
    type Target = Ctx;

    fn deref(&self) -> &Ctx {
        &self.ctx
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        if let Err(error) = self.ctx.remove_all_roles() {
            tracing::error!(
                context = self.ctx.type_name(),
                error = %error,
                "context teardown failed"
            );
        }
    }
}
