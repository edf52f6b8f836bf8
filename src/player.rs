//! Role players: shared data object handles, per-context role tables, and
//! intercepted-call dispatch.
//!
//! [`Obj`] is the handle application code holds to a data object. It is a
//! cheap-clone shared pointer with identity equality: every role bound to an
//! object and every context that registered it hold clones of the same
//! handle, and two handles compare equal exactly when they designate the
//! same object. This is what lets a role pass "itself" (the data object, not
//! the role wrapper) to collaborators.
//!
//! Dispatch order for [`Obj::call`] follows the interception contract: the
//! object's own public methods always win; only when the own lookup misses
//! does the runtime consult the role table of the object's *current*
//! context; if that also misses, the call fails with
//! [`Error::BadMethodCall`].

use core::{cell::RefCell, fmt};
use std::rc::Rc;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::{
    context::{ContextId, Ctx},
    data::{Data, MethodInvoke, Visibility},
    error::{ConflictKind, Error},
    role::RoleScope,
    value::{Args, Value},
};

/// One installed role method: which role owns the name, the context the
/// binding belongs to, and the method's entry point.
#[derive(Clone)]
pub(crate) struct MethodBinding {
    pub(crate) role_name: &'static str,
    pub(crate) context: Ctx,
    pub(crate) invoke: fn(&RoleScope<'_>, Args) -> Result<Value, Error>,
}

type MethodTable = HashMap<&'static str, MethodBinding, FxBuildHasher>;

/// The per-object role state: dispatch tables keyed by context identity and
/// the single current-context pointer.
///
/// Embed one of these in every type that should be able to play roles and
/// expose it through [`Data::bindings`]. Tables for several contexts may
/// coexist (an object can hold bindings from an enclosing context and a
/// sub-context at once), but only one context is current at a time; the
/// pointer is adopted by the first binding and force-repointed only while a
/// sub-context proxy call is in flight.
#[derive(Default)]
pub struct Bindings {
    tables: HashMap<ContextId, MethodTable, FxBuildHasher>,
    current: Option<Ctx>,
}

impl Bindings {
    /// Creates an empty binding table.
    #[must_use]
    pub fn new() -> Self {
        Bindings::default()
    }

    /// Returns `true` if the current context has a role method of this name.
    #[must_use]
    pub fn has_role_method(&self, method: &str) -> bool {
        self.resolve(method).is_some()
    }

    /// The context this object currently dispatches against, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<&Ctx> {
        self.current.as_ref()
    }

    /// Sets the current context if the object has none yet. The first
    /// binding in a context wins; later `add_role` calls must not reassign
    /// the pointer, so that role-method calls keep resolving against the
    /// context that first touched the object (idempotent set).
    pub(crate) fn adopt_context(&mut self, context: &Ctx) {
        if self.current.is_none() {
            self.current = Some(context.clone());
        }
    }

    /// Forcibly retargets the current-context pointer, returning the
    /// previous value. Only the sub-context proxy uses this.
    pub(crate) fn repoint(&mut self, context: Option<Ctx>) -> Option<Ctx> {
        core::mem::replace(&mut self.current, context)
    }

    pub(crate) fn resolve(&self, method: &str) -> Option<&MethodBinding> {
        let current = self.current.as_ref()?;
        self.tables.get(&current.id())?.get(method)
    }

    pub(crate) fn table_mut(&mut self, context: ContextId) -> &mut MethodTable {
        self.tables.entry(context).or_default()
    }

    /// Removes one named role's entries from one context's table.
    pub(crate) fn remove_role(&mut self, context: ContextId, role_name: &str) {
        if let Some(table) = self.tables.get_mut(&context) {
            table.retain(|_, binding| binding.role_name != role_name);
        }
    }

    /// Clears everything the given context bound, and resets the
    /// current-context pointer if it matches.
    pub(crate) fn clear_context(&mut self, context: &Ctx) {
        self.tables.remove(&context.id());
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.id() == context.id())
        {
            self.current = None;
        }
    }
}

/// How a method name resolves on a data object, without invoking it.
///
/// The explicit two-step resolver: own methods first, then the current
/// context's role table. Data objects that implement their own dispatch
/// fallback can consult this before or after trying the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The object itself defines a public method of this name.
    OwnMethod,
    /// A role bound in the object's current context defines the method.
    RoleMethod {
        /// The owning role's name.
        role: &'static str,
    },
    /// Nothing resolves the name; calling it raises
    /// [`Error::BadMethodCall`].
    Unresolved,
}

/// A shared handle to a data object that can play roles.
///
/// Cloning is cheap and clones designate the same object; equality is
/// object identity. All binding and dispatch entry points live here.
#[derive(Clone)]
pub struct Obj {
    inner: Rc<RefCell<dyn Data>>,
}

impl Obj {
    /// Wraps a data object into a shared handle.
    #[must_use]
    pub fn new<D: Data>(data: D) -> Self {
        Obj {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    pub(crate) fn from_dyn(inner: Rc<RefCell<dyn Data>>) -> Self {
        Obj { inner }
    }

    /// The short type name of the underlying data object.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.inner.try_borrow() {
            Ok(data) => data.descriptor().type_name,
            Err(_) => "<borrowed>",
        }
    }

    /// A stable identity key for the underlying object.
    #[must_use]
    pub fn key(&self) -> usize {
        Rc::as_ptr(&self.inner).cast::<()>() as usize
    }

    /// Binds a role to this object for the given context.
    ///
    /// Looks the role up in the role table of the context's type
    /// ([`Error::RoleNotFound`] on a miss), registers this object with the
    /// context for teardown (idempotent; refused with
    /// [`Error::AlreadyBorrowed`] if the context is exclusively borrowed),
    /// adopts the context as current if
    /// the object has none, and installs every role method into the
    /// context's dispatch table. Installing fails with
    /// [`Error::MethodConflict`] if a method name collides with one of the
    /// object's own methods or with a different role already bound in the
    /// same context; rebinding the *same* role is accepted as a no-op.
    ///
    /// Returns a clone of the handle so bindings can be chained into
    /// context fields.
    pub fn add_role(&self, role_name: &str, context: &Ctx) -> Result<Obj, Error> {
        let def = context
            .role_definition(role_name)
            .ok_or_else(|| Error::RoleNotFound {
                role: role_name.to_owned(),
                context: context.type_name(),
            })?;
        context.register_player(self)?;

        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        let descriptor = data.descriptor();
        let bindings = data.bindings_mut();
        bindings.adopt_context(context);
        let table = bindings.table_mut(context.id());

        for method in def.methods {
            if descriptor.method(method.name).is_some() {
                return Err(Error::MethodConflict {
                    role: def.name,
                    data: descriptor.type_name,
                    kind: ConflictKind::OwnMethod {
                        method: method.name,
                    },
                });
            }
            match table.get(method.name) {
                Some(existing) if existing.role_name == def.name => {
                    // Already bound by this very role; rebinding is useful
                    // for contexts whose logic re-assigns roles mid-flight.
                    continue;
                }
                Some(existing) => {
                    return Err(Error::MethodConflict {
                        role: def.name,
                        data: descriptor.type_name,
                        kind: ConflictKind::OtherRole {
                            method: method.name,
                            existing_role: existing.role_name,
                        },
                    });
                }
                None => {
                    table.insert(
                        method.name,
                        MethodBinding {
                            role_name: def.name,
                            context: context.clone(),
                            invoke: method.invoke,
                        },
                    );
                }
            }
        }
        tracing::debug!(
            role = def.name,
            context = context.type_name(),
            data = descriptor.type_name,
            "bound role"
        );
        Ok(self.clone())
    }

    /// Unbinds one named role's methods from one context's table,
    /// best-effort. Unknown role names and untouched contexts are ignored.
    pub fn remove_role(&self, role_name: &str, context: &Ctx) -> Obj {
        if let Ok(mut data) = self.inner.try_borrow_mut() {
            data.bindings_mut().remove_role(context.id(), role_name);
        }
        self.clone()
    }

    /// Returns `true` if the object's current context has a role method of
    /// this name.
    #[must_use]
    pub fn has_role_method(&self, method: &str) -> bool {
        match self.inner.try_borrow() {
            Ok(data) => data.bindings().has_role_method(method),
            Err(_) => false,
        }
    }

    /// Resolves a method name without invoking it.
    #[must_use]
    pub fn resolve(&self, method: &str) -> Resolution {
        let Ok(data) = self.inner.try_borrow() else {
            return Resolution::Unresolved;
        };
        if let Some(own) = data.descriptor().method(method) {
            if own.visibility == Visibility::Public {
                return Resolution::OwnMethod;
            }
        }
        match data.bindings().resolve(method) {
            Some(binding) => Resolution::RoleMethod {
                role: binding.role_name,
            },
            None => Resolution::Unresolved,
        }
    }

    /// Invokes a method by name: the object's own public methods first,
    /// then the current context's role table.
    pub fn call(&self, method: &str, args: Args) -> Result<Value, Error> {
        self.dispatch(method, args, None)
    }

    /// Invokes a method by name and recovers a typed return value.
    pub fn call_as<T: 'static>(&self, method: &str, args: Args) -> Result<T, Error> {
        self.call(method, args)?.take_as::<T>()
    }

    pub(crate) fn dispatch(
        &self,
        method: &str,
        args: Args,
        ctx_self: Option<&Ctx>,
    ) -> Result<Value, Error> {
        enum Target {
            Own(MethodInvoke),
            Role(MethodBinding),
        }

        let target = {
            let data = self
                .inner
                .try_borrow()
                .map_err(|_| Error::AlreadyBorrowed {
                    data: self.type_name(),
                })?;
            let own = data
                .descriptor()
                .method(method)
                .filter(|own| own.visibility == Visibility::Public)
                .map(|own| Target::Own(own.invoke));
            match own {
                Some(target) => Some(target),
                None => data
                    .bindings()
                    .resolve(method)
                    .cloned()
                    .map(Target::Role),
            }
        };

        match target {
            Some(Target::Own(MethodInvoke::Accessor(invoke))) => {
                let mut data = self
                    .inner
                    .try_borrow_mut()
                    .map_err(|_| Error::AlreadyBorrowed {
                        data: self.type_name(),
                    })?;
                invoke(&mut *data, args)
            }
            Some(Target::Own(MethodInvoke::Operation(invoke))) => {
                let ctx = ctx_self.ok_or_else(|| Error::OperationOutsideContext {
                    data: self.type_name(),
                    method: method.to_owned(),
                })?;
                invoke(ctx, args)
            }
            Some(Target::Role(binding)) => {
                tracing::trace!(
                    role = binding.role_name,
                    method,
                    data = self.type_name(),
                    "dispatching role method"
                );
                let scope = RoleScope::new(self, &binding.context, binding.role_name);
                (binding.invoke)(&scope, args)
            }
            None => Err(Error::BadMethodCall {
                data: self.type_name(),
                method: method.to_owned(),
            }),
        }
    }

    /// Reads a public property of the data object.
    pub fn get(&self, property: &str) -> Result<Value, Error> {
        let data = self
            .inner
            .try_borrow()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        let descriptor = data.descriptor();
        match descriptor.property(property) {
            Some(prop) if prop.visibility == Visibility::Public => (prop.get)(&*data),
            _ => Err(Error::UndefinedProperty {
                data: descriptor.type_name,
                property: property.to_owned(),
            }),
        }
    }

    /// Reads a public property and recovers its typed value.
    pub fn get_as<T: 'static>(&self, property: &str) -> Result<T, Error> {
        self.get(property)?.take_as::<T>()
    }

    /// Writes a public property of the data object.
    pub fn set(&self, property: &str, value: Value) -> Result<(), Error> {
        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        let descriptor = data.descriptor();
        match descriptor.property(property) {
            Some(prop) if prop.visibility == Visibility::Public => (prop.set)(&mut *data, value),
            _ => Err(Error::UndefinedProperty {
                data: descriptor.type_name,
                property: property.to_owned(),
            }),
        }
    }

    /// Borrows the concrete data object for the duration of the closure.
    ///
    /// This is a typed friend accessor: unlike the string-dispatch path it
    /// sees the whole object, so hand it only to collaborators the data
    /// object already trusts. The borrow must not outlive the closure, and
    /// dispatching on the same object from inside the closure fails with
    /// [`Error::AlreadyBorrowed`].
    pub fn with<D: Data, R>(&self, f: impl FnOnce(&D) -> R) -> Result<R, Error> {
        let data = self
            .inner
            .try_borrow()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        let typed = crate::data::downcast_data_ref::<D>(&*data)?;
        Ok(f(typed))
    }

    /// Mutably borrows the concrete data object for the duration of the
    /// closure. See [`Obj::with`] for the trust caveats.
    pub fn with_mut<D: Data, R>(&self, f: impl FnOnce(&mut D) -> R) -> Result<R, Error> {
        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        let typed = crate::data::downcast_data_mut::<D>(&mut *data)?;
        Ok(f(typed))
    }

    pub(crate) fn descriptor(&self) -> Result<&'static crate::data::DataDescriptor, Error> {
        let data = self
            .inner
            .try_borrow()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        Ok(data.descriptor())
    }

    pub(crate) fn invoke_accessor(
        &self,
        invoke: fn(&mut dyn Data, Args) -> Result<Value, Error>,
        args: Args,
    ) -> Result<Value, Error> {
        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        invoke(&mut *data, args)
    }

    /// Writes a declared property regardless of its visibility. Role
    /// delegation forwards writes unconditionally; the public API filters.
    pub(crate) fn set_any_visibility(&self, property: &str, value: Value) -> Result<(), Error> {
        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        let descriptor = data.descriptor();
        match descriptor.property(property) {
            Some(prop) => (prop.set)(&mut *data, value),
            None => Err(Error::UndefinedProperty {
                data: descriptor.type_name,
                property: property.to_owned(),
            }),
        }
    }

    /// Clears everything the given context bound on this object.
    pub(crate) fn unbind_context(&self, context: &Ctx) -> Result<(), Error> {
        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        data.bindings_mut().clear_context(context);
        Ok(())
    }

    /// Retargets the current-context pointer, returning the previous value.
    pub(crate) fn repoint(&self, context: Option<Ctx>) -> Result<Option<Ctx>, Error> {
        let mut data = self
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::AlreadyBorrowed {
                data: self.type_name(),
            })?;
        Ok(data.bindings_mut().repoint(context))
    }

    /// The object's current context, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<Ctx> {
        self.inner
            .try_borrow()
            .ok()
            .and_then(|data| data.bindings().current_context().cloned())
    }
}

impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Obj {}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj(<{}>)", self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::{args, data_object};

    assert_not_impl_any!(Obj: Send, Sync);
    assert_not_impl_any!(Bindings: Send, Sync);

    #[derive(Default)]
    struct Counter {
        hits: u32,
        bindings: Bindings,
    }

    impl Counter {
        fn hits(&self) -> u32 {
            self.hits
        }
        fn bump(&mut self) {
            self.hits += 1;
        }
    }

    data_object! {
        impl Counter {
            bindings: bindings;
            methods {
                pub fn hits(&self) -> u32;
                pub fn bump(&mut self);
            }
        }
    }

    #[derive(Default)]
    struct Blank {
        bindings: Bindings,
    }

    data_object! {
        impl Blank {
            bindings: bindings;
        }
    }

    #[test]
    fn clones_share_identity_and_state() {
        let counter = Obj::new(Counter::default());
        let alias = counter.clone();
        assert_eq!(counter, alias);
        assert_eq!(counter.key(), alias.key());

        alias.call("bump", args![]).unwrap();
        assert_eq!(counter.call_as::<u32>("hits", args![]).unwrap(), 1);
        assert_ne!(counter, Obj::new(Counter::default()));
    }

    #[test]
    fn typed_access_checks_the_concrete_type() {
        let counter = Obj::new(Counter::default());
        counter.with_mut(|counter: &mut Counter| counter.bump()).unwrap();
        assert_eq!(counter.with(|counter: &Counter| counter.hits()).unwrap(), 1);

        let err = counter.with(|_blank: &Blank| ()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { actual: "Counter", .. }));
    }

    #[test]
    fn dispatch_inside_a_typed_borrow_is_rejected() {
        let counter = Obj::new(Counter::default());
        let result = counter.with(|_counter: &Counter| counter.call("bump", args![]));
        let err = result.unwrap().unwrap_err();
        assert!(matches!(err, Error::AlreadyBorrowed { .. }));
    }
}
