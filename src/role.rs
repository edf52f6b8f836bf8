//! Roles: statically compiled method bundles and the delegation surface a
//! role method sees while it runs.
//!
//! A role is a named bundle of behavior bound to a data object for one
//! context's lifetime. Roles never have state of their own: all of "their"
//! properties are the data object's properties, reached through the
//! [`RoleScope`] passed to every role method. The scope enforces the
//! delegation rules: unqualified method calls reach the data object only
//! when the method is publicly visible, property reads resolve against the
//! data object under the context's [`PropertyPolicy`], and writes forward
//! unconditionally to any declared property.
//!
//! Role definitions are built with the [`role!`](crate::role) macro and
//! listed in the role table of exactly one context type:
//!
//! ```
//! use rolecast::{args, role};
//!
//! role! {
//!     /// The paying side of a transfer.
//!     pub static SOURCE_ACCOUNT: "SourceAccount" {
//!         fn withdraw(scope, amount: f64) {
//!             scope.call_data("decrease_balance", args![amount])?;
//!         }
//!     }
//! }
//!
//! assert_eq!(SOURCE_ACCOUNT.name, "SourceAccount");
//! assert_eq!(SOURCE_ACCOUNT.methods.len(), 1);
//! ```

use crate::{
    context::Ctx,
    data::Visibility,
    error::Error,
    player::Obj,
    value::{Args, Value},
};

/// How role delegation treats a property read that resolves to nothing.
///
/// A configuration of the delegation component, chosen per context type via
/// [`Context::property_policy`](crate::Context::property_policy).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertyPolicy {
    /// Reading an undefined property fails with
    /// [`Error::UndefinedProperty`].
    #[default]
    Strict,
    /// Reading an undefined property emits a `tracing` warning and yields
    /// [`Value::unit`], so the miss is observable but non-fatal.
    Lenient,
}

/// One method of a role definition.
#[derive(Clone, Copy)]
pub struct RoleMethod {
    /// The method name installed into the dispatch table.
    pub name: &'static str,
    /// The erased method body.
    pub invoke: fn(&RoleScope<'_>, Args) -> Result<Value, Error>,
}

/// A statically compiled role: a name plus its method table.
///
/// Each definition belongs to exactly one context type and is found through
/// [`Context::role_definitions`](crate::Context::role_definitions).
#[derive(Clone, Copy)]
pub struct RoleDef {
    /// The role name `add_role` binds by.
    pub name: &'static str,
    /// The role's methods.
    pub methods: &'static [RoleMethod],
}

/// What a role method receives in place of a `self` receiver.
///
/// The scope ties together the data object playing the role, the context the
/// binding belongs to, and the role's name, and exposes the delegation
/// surface described in the module docs.
#[derive(Clone, Copy)]
pub struct RoleScope<'a> {
    player: &'a Obj,
    context: &'a Ctx,
    role_name: &'static str,
}

impl<'a> RoleScope<'a> {
    pub(crate) fn new(player: &'a Obj, context: &'a Ctx, role_name: &'static str) -> Self {
        RoleScope {
            player,
            context,
            role_name,
        }
    }

    /// The distinguished `self` accessor: the underlying data object handle
    /// itself.
    ///
    /// Roles of different names wrapping the same data object are different
    /// bindings, but the handles returned here compare equal by identity, so
    /// a role can pass "itself" to other roles and collaborators.
    #[must_use]
    pub fn object(&self) -> Obj {
        self.player.clone()
    }

    /// Borrows the data object handle without cloning it.
    #[must_use]
    pub fn player(&self) -> &Obj {
        self.player
    }

    /// The context this role binding belongs to. Role methods reach the
    /// context's other roles through its public properties.
    #[must_use]
    pub fn context(&self) -> &Ctx {
        self.context
    }

    /// The name this role was bound under.
    #[must_use]
    pub fn role_name(&self) -> &'static str {
        self.role_name
    }

    /// Re-dispatches on the player: own public methods first, then role
    /// methods of the current context. This is how a role method calls a
    /// sibling role method.
    pub fn call(&self, method: &str, args: Args) -> Result<Value, Error> {
        self.player.call(method, args)
    }

    /// Re-dispatches on the player and recovers a typed return value.
    pub fn call_as<T: 'static>(&self, method: &str, args: Args) -> Result<T, Error> {
        self.player.call_as(method, args)
    }

    /// Forwards a call to one of the data object's own methods.
    ///
    /// Only publicly visible accessor methods are reachable this way;
    /// non-public helpers fail with [`Error::BadMethodCall`] (they are not
    /// meant for role use — grant a trusted role [`RoleScope::with_data_mut`]
    /// instead), and context operations fail with
    /// [`Error::OperationOutsideContext`].
    pub fn call_data(&self, method: &str, args: Args) -> Result<Value, Error> {
        use crate::data::MethodInvoke;

        let invoke = {
            let descriptor = self.player.descriptor()?;
            match descriptor.method(method) {
                Some(own) if own.visibility == Visibility::Public => own.invoke,
                _ => {
                    return Err(Error::BadMethodCall {
                        data: descriptor.type_name,
                        method: method.to_owned(),
                    });
                }
            }
        };
        match invoke {
            MethodInvoke::Accessor(invoke) => self.player.invoke_accessor(invoke, args),
            MethodInvoke::Operation(_) => Err(Error::OperationOutsideContext {
                data: self.player.type_name(),
                method: method.to_owned(),
            }),
        }
    }

    /// Reads a property, resolving against the data object.
    ///
    /// A read that resolves to nothing is governed by the context's
    /// [`PropertyPolicy`]: `Strict` fails, `Lenient` warns and yields
    /// [`Value::unit`].
    pub fn get(&self, property: &str) -> Result<Value, Error> {
        match self.player.get(property) {
            Err(Error::UndefinedProperty { data, property })
                if self.context.property_policy() == PropertyPolicy::Lenient =>
            {
                tracing::warn!(
                    data,
                    property = %property,
                    role = self.role_name,
                    "undefined property read"
                );
                Ok(Value::unit())
            }
            other => other,
        }
    }

    /// Reads a property and recovers its typed value.
    pub fn get_as<T: 'static>(&self, property: &str) -> Result<T, Error> {
        self.get(property)?.take_as::<T>()
    }

    /// Writes a property of the data object.
    ///
    /// Writes forward unconditionally to any declared property, public or
    /// not; only a property the data object does not declare at all fails
    /// with [`Error::UndefinedProperty`].
    pub fn set(&self, property: &str, value: Value) -> Result<(), Error> {
        self.player.set_any_visibility(property, value)
    }

    /// Typed read access to the concrete data object.
    ///
    /// The explicit friend contract for roles the data object already
    /// trusts: unlike the default string-dispatch path this sees non-public
    /// state.
    pub fn with_data<D: crate::Data, R>(&self, f: impl FnOnce(&D) -> R) -> Result<R, Error> {
        self.player.with(f)
    }

    /// Typed mutable access to the concrete data object. See
    /// [`RoleScope::with_data`].
    pub fn with_data_mut<D: crate::Data, R>(
        &self,
        f: impl FnOnce(&mut D) -> R,
    ) -> Result<R, Error> {
        self.player.with_mut(f)
    }
}
