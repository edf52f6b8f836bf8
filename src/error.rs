//! The error taxonomy of the role runtime.
//!
//! Every failure is local to a single bind or dispatch call; there is no
//! retry machinery. Binding failures ([`Error::RoleNotFound`],
//! [`Error::MethodConflict`]) are authoring mistakes surfaced before any
//! role method executes. Dispatch failures ([`Error::BadMethodCall`],
//! [`Error::UndefinedProperty`]) describe a single intercepted call.
//!
//! The enum is matchable by variant, so a data object that implements its
//! own dispatch fallback can catch [`Error::BadMethodCall`], run its
//! fallback, and re-raise if that also fails:
//!
//! ```
//! use rolecast::{Error, Value, args};
//!
//! # fn fallback(_: &str) -> Option<Value> { None }
//! # fn example(object: rolecast::Obj) -> Result<Value, Error> {
//! match object.call("frobnicate", args![]) {
//!     Err(Error::BadMethodCall { .. }) => {
//!         fallback("frobnicate").ok_or_else(|| Error::BadMethodCall {
//!             data: object.type_name(),
//!             method: "frobnicate".to_owned(),
//!         })
//!     }
//!     other => other,
//! }
//! # }
//! ```

use core::fmt;

/// The reason a role could not be bound to a data object.
///
/// Carried inside [`Error::MethodConflict`]. Both kinds are programming
/// errors: either a role method would shadow the data object's own method
/// (dispatch only ever reaches the role table when the object's own lookup
/// misses, so the shadow could never take effect), or two different roles in
/// the same context expose a method of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The role method collides with a method the data object itself
    /// defines, regardless of that method's visibility.
    OwnMethod {
        /// The colliding method name.
        method: &'static str,
    },
    /// The method name is already bound in this context by a different role.
    OtherRole {
        /// The colliding method name.
        method: &'static str,
        /// The role that already owns the name in this context.
        existing_role: &'static str,
    },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::OwnMethod { method } => write!(
                f,
                "the method `{method}` already exists on the data object; a role method \
                 can never shadow a data object method of the same name"
            ),
            ConflictKind::OtherRole {
                method,
                existing_role,
            } => write!(
                f,
                "the method `{method}` was already bound via the role `{existing_role}`; \
                 two roles in the same context may not expose same-named methods"
            ),
        }
    }
}

/// Errors raised by role binding, dispatch, delegation, and teardown.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// `add_role` requested a role name with no implementation in the role
    /// table of the context's type.
    #[error(
        "no role named `{role}` is associated with the context type `{context}` \
         (a role is declared in the role table of exactly one context type)"
    )]
    RoleNotFound {
        /// The requested role name.
        role: String,
        /// The context type whose role table was searched.
        context: &'static str,
    },

    /// A role's method name collides with an existing method at bind time.
    #[error("cannot bind role `{role}` to `{data}`: {kind}")]
    MethodConflict {
        /// The role being bound.
        role: &'static str,
        /// The data object type the role was being bound to.
        data: &'static str,
        /// What the method name collided with.
        kind: ConflictKind,
    },

    /// No own method and no role method of the object's current context
    /// resolves the call.
    #[error(
        "there is no public method `{method}` on `{data}` nor on any of the roles it \
         is currently playing (it might not be playing any roles, in which case this \
         is just a regular bad method call); if the role belongs to a sub-context, \
         make sure the parent context created it via `init_sub_context` and kept \
         using the returned proxy"
    )]
    BadMethodCall {
        /// The concrete data object type.
        data: &'static str,
        /// The method that failed to resolve.
        method: String,
    },

    /// A property read or write named a property absent from the data
    /// object (or, for reads, one that is not publicly visible).
    #[error("undefined property `{property}` on `{data}`")]
    UndefinedProperty {
        /// The concrete data object type.
        data: &'static str,
        /// The property that failed to resolve.
        property: String,
    },

    /// A context operation was dispatched through a bare [`Obj`](crate::Obj)
    /// handle instead of a context handle or proxy.
    #[error(
        "the operation `{method}` on `{data}` must be invoked through a context \
         handle or a sub-context proxy, not a bare data object handle"
    )]
    OperationOutsideContext {
        /// The concrete context type.
        data: &'static str,
        /// The operation that was dispatched.
        method: String,
    },

    /// A type-erased value did not hold the requested type.
    #[error("expected a value of type `{expected}`, found `{actual}`")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: &'static str,
        /// The type the value actually holds.
        actual: &'static str,
    },

    /// An argument list was exhausted before a shim had taken all of its
    /// declared parameters.
    #[error("missing argument of type `{expected}`")]
    MissingArgument {
        /// The type of the missing argument.
        expected: &'static str,
    },

    /// A data object was re-entrantly borrowed, for example by dispatching
    /// on an object while a typed accessor borrow of it is still live.
    #[error("the data object `{data}` is already borrowed by an enclosing call")]
    AlreadyBorrowed {
        /// The concrete data object type.
        data: &'static str,
    },

    /// Context teardown finished, but one or more players could not be
    /// unbound. Unbinding is attempted for every player regardless of
    /// earlier failures; this aggregates everything that went wrong.
    #[error("context teardown completed with {} unbind failure(s)", failures.len())]
    Teardown {
        /// The individual unbind failures, in player registration order.
        failures: Vec<Error>,
    },
}

/// A [`Result`](core::result::Result) alias where the error is [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
