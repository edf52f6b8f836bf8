/// Builds an [`Args`](crate::Args) list from expressions.
///
/// Each expression is erased into a [`Value`](crate::Value) in order; the
/// receiving shim takes them back out positionally.
///
/// # Examples
///
/// ```
/// use rolecast::args;
///
/// let empty = args![];
/// assert!(empty.is_empty());
///
/// let mut args = args![10.0_f64, "memo"];
/// assert_eq!(args.take::<f64>().unwrap(), 10.0);
/// assert_eq!(args.take::<&str>().unwrap(), "memo");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::Args::from_values($crate::__private::vec![
            $($crate::Value::new($arg)),+
        ])
    };
}

/// Declares a statically compiled role.
///
/// Expands to a `static` [`RoleDef`](crate::RoleDef) holding the role's name
/// and method table. Each method is written with an explicit scope parameter
/// in place of `self`; the macro generates the erased shim that takes the
/// declared parameters out of the argument list, runs the body, and wraps
/// the body's value as the call result. Bodies may use `?` with any
/// [`Error`](crate::Error)-valued expression.
///
/// The resulting `static` is listed in the role table of exactly one context
/// type (see [`Context::role_definitions`](crate::Context::role_definitions));
/// that listing is what makes the role bindable by name.
///
/// # Examples
///
/// ```
/// use rolecast::{args, role};
///
/// role! {
///     /// The receiving side of a transfer.
///     pub static DESTINATION_ACCOUNT: "DestinationAccount" {
///         fn deposit(scope, amount: f64) {
///             scope.call_data("increase_balance", args![amount])?;
///         }
///
///         fn owner_display(scope) {
///             scope.get_as::<String>("owner")?
///         }
///     }
/// }
///
/// assert_eq!(DESTINATION_ACCOUNT.name, "DestinationAccount");
/// assert_eq!(DESTINATION_ACCOUNT.methods.len(), 2);
/// ```
#[macro_export]
macro_rules! role {
    ($(
        $(#[$meta:meta])*
        $vis:vis static $ident:ident : $name:literal {
            $(
                fn $method:ident ( $scope:ident $(, $param:ident : $pty:ty)* $(,)? ) $body:block
            )*
        }
    )*) => {
        $(
            $(#[$meta])*
            $vis static $ident: $crate::RoleDef = $crate::RoleDef {
                name: $name,
                methods: &[
                    $(
                        $crate::RoleMethod {
                            name: ::core::stringify!($method),
                            invoke: {
                                fn __invoke(
                                    $scope: &$crate::RoleScope<'_>,
                                    mut __args: $crate::Args,
                                ) -> $crate::Result<$crate::Value> {
                                    let _ = &mut __args;
                                    let _ = &$scope;
                                    $(let $param: $pty = __args.take::<$pty>()?;)*
                                    let __out = $body;
                                    $crate::__private::Ok($crate::Value::new(__out))
                                }
                                __invoke
                            },
                        },
                    )*
                ],
            };
        )*
    };
}

/// Implements [`Data`](crate::Data) for a type, generating its resolution
/// table.
///
/// The macro names the embedded [`Bindings`](crate::Bindings) field and then
/// lists, in erased-table form, the subset of the type's surface that
/// participates in name-based dispatch:
///
/// - `methods { … }` — declarations mirroring ordinary inherent methods.
///   `pub fn` entries are publicly dispatchable accessors, `fn` entries are
///   visible to bind-time conflict checks only. Accessor bodies run with the
///   object exclusively borrowed and must not re-enter dispatch. A
///   `pub op` entry declares a context operation instead: it forwards to an
///   inherent associated function taking `&Ctx` first and returning
///   `Result<_, Error>`, and is dispatchable only through a context handle
///   or proxy.
/// - `properties { … }` — typed fields readable and writable by name.
///   Reads clone the field (it must implement `Clone`); `pub` governs reads
///   only, since role delegation writes to any declared property.
///
/// # Examples
///
/// ```
/// use rolecast::{Bindings, data_object};
///
/// #[derive(Default)]
/// pub struct Account {
///     balance: f64,
///     owner: String,
///     bindings: Bindings,
/// }
///
/// impl Account {
///     fn balance(&self) -> f64 {
///         self.balance
///     }
///     fn increase_balance(&mut self, amount: f64) {
///         self.balance += amount;
///     }
/// }
///
/// data_object! {
///     impl Account {
///         bindings: bindings;
///         methods {
///             pub fn balance(&self) -> f64;
///             pub fn increase_balance(&mut self, amount: f64);
///         }
///         properties {
///             pub owner: String;
///         }
///     }
/// }
///
/// use rolecast::Obj;
/// let account = Obj::new(Account::default());
/// account.call("increase_balance", rolecast::args![5.0_f64]).unwrap();
/// assert_eq!(account.call_as::<f64>("balance", rolecast::args![]).unwrap(), 5.0);
/// ```
#[macro_export]
macro_rules! data_object {
    (
        impl $ty:ident {
            bindings: $field:ident;
            $(methods { $($methods:tt)* })?
            $(properties { $($properties:tt)* })?
        }
    ) => {
        impl $crate::Data for $ty {
            fn descriptor(&self) -> &'static $crate::DataDescriptor {
                static DESCRIPTOR: $crate::DataDescriptor = $crate::DataDescriptor {
                    type_name: ::core::stringify!($ty),
                    methods: &$crate::__data_methods![$ty; $($($methods)*)?],
                    properties: &$crate::__data_properties![$ty; $($($properties)*)?],
                };
                &DESCRIPTOR
            }

            fn bindings(&self) -> &$crate::Bindings {
                &self.$field
            }

            fn bindings_mut(&mut self) -> &mut $crate::Bindings {
                &mut self.$field
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __data_methods {
    ($ty:ident; $($rest:tt)*) => {
        $crate::__data_methods!(@munch $ty; [] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]) => {
        [$($acc,)*]
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        pub fn $method:ident ( &self $(, $param:ident : $pty:ty)* $(,)? ) $(-> $ret:ty)? ;
        $($rest:tt)*
    ) => {
        $crate::__data_methods!(@munch $ty; [
            $($acc,)*
            $crate::__data_methods!(@accessor $ty, $method, $crate::Visibility::Public; $($param : $pty),*),
        ] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        pub fn $method:ident ( &mut self $(, $param:ident : $pty:ty)* $(,)? ) $(-> $ret:ty)? ;
        $($rest:tt)*
    ) => {
        $crate::__data_methods!(@munch $ty; [
            $($acc,)*
            $crate::__data_methods!(@accessor $ty, $method, $crate::Visibility::Public; $($param : $pty),*),
        ] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        fn $method:ident ( &self $(, $param:ident : $pty:ty)* $(,)? ) $(-> $ret:ty)? ;
        $($rest:tt)*
    ) => {
        $crate::__data_methods!(@munch $ty; [
            $($acc,)*
            $crate::__data_methods!(@accessor $ty, $method, $crate::Visibility::Private; $($param : $pty),*),
        ] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        fn $method:ident ( &mut self $(, $param:ident : $pty:ty)* $(,)? ) $(-> $ret:ty)? ;
        $($rest:tt)*
    ) => {
        $crate::__data_methods!(@munch $ty; [
            $($acc,)*
            $crate::__data_methods!(@accessor $ty, $method, $crate::Visibility::Private; $($param : $pty),*),
        ] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        pub op $method:ident ( $ctx:ident $(, $param:ident : $pty:ty)* $(,)? ) $(-> $ret:ty)? ;
        $($rest:tt)*
    ) => {
        $crate::__data_methods!(@munch $ty; [
            $($acc,)*
            $crate::DataMethod {
                name: ::core::stringify!($method),
                visibility: $crate::Visibility::Public,
                invoke: {
                    fn __invoke(
                        $ctx: &$crate::Ctx,
                        mut __args: $crate::Args,
                    ) -> $crate::Result<$crate::Value> {
                        let _ = &mut __args;
                        $(let $param: $pty = __args.take::<$pty>()?;)*
                        let __out = $ty::$method($ctx $(, $param)*)?;
                        $crate::__private::Ok($crate::Value::new(__out))
                    }
                    $crate::MethodInvoke::Operation(__invoke)
                },
            },
        ] $($rest)*)
    };
    (@accessor $ty:ident, $method:ident, $visibility:expr; $($param:ident : $pty:ty),*) => {
        $crate::DataMethod {
            name: ::core::stringify!($method),
            visibility: $visibility,
            invoke: {
                fn __invoke(
                    __data: &mut dyn $crate::Data,
                    mut __args: $crate::Args,
                ) -> $crate::Result<$crate::Value> {
                    let _ = &mut __args;
                    let __data = $crate::__private::downcast_data_mut::<$ty>(__data)?;
                    $(let $param: $pty = __args.take::<$pty>()?;)*
                    let __out = __data.$method($($param),*);
                    $crate::__private::Ok($crate::Value::new(__out))
                }
                $crate::MethodInvoke::Accessor(__invoke)
            },
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __data_properties {
    ($ty:ident; $($rest:tt)*) => {
        $crate::__data_properties!(@munch $ty; [] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]) => {
        [$($acc,)*]
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        pub $property:ident : $pty:ty;
        $($rest:tt)*
    ) => {
        $crate::__data_properties!(@munch $ty; [
            $($acc,)*
            $crate::__data_properties!(@property $ty, $property, $pty, $crate::Visibility::Public),
        ] $($rest)*)
    };
    (@munch $ty:ident; [$($acc:expr,)*]
        $property:ident : $pty:ty;
        $($rest:tt)*
    ) => {
        $crate::__data_properties!(@munch $ty; [
            $($acc,)*
            $crate::__data_properties!(@property $ty, $property, $pty, $crate::Visibility::Private),
        ] $($rest)*)
    };
    (@property $ty:ident, $property:ident, $pty:ty, $visibility:expr) => {
        $crate::DataProperty {
            name: ::core::stringify!($property),
            visibility: $visibility,
            get: {
                fn __get(__data: &dyn $crate::Data) -> $crate::Result<$crate::Value> {
                    let __data = $crate::__private::downcast_data_ref::<$ty>(__data)?;
                    $crate::__private::Ok($crate::Value::new(
                        <$pty as ::core::clone::Clone>::clone(&__data.$property),
                    ))
                }
                __get
            },
            set: {
                fn __set(
                    __data: &mut dyn $crate::Data,
                    __value: $crate::Value,
                ) -> $crate::Result<()> {
                    let __data = $crate::__private::downcast_data_mut::<$ty>(__data)?;
                    __data.$property = __value.take_as::<$pty>()?;
                    $crate::__private::Ok(())
                }
                __set
            },
        }
    };
}
