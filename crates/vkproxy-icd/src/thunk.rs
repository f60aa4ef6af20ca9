//! Forwarding thunks for commands that need no translation beyond
//! replacing the leading dispatchable handle with the native one.

use std::ptr;

use tracing::warn;

use ash::vk;

/// A dispatchable handle type whose wrapper knows its native handle and
/// the table to forward through.
pub(crate) trait Unwrap: Copy {
    type Native;
    type Table: 'static;

    /// # Safety
    /// `self` must be null or a live handle created by this driver.
    unsafe fn unwrap_native<'a>(self) -> Option<(Self::Native, &'a Self::Table)>;
}

/// What a thunk returns when it cannot forward the call.
pub(crate) trait Unavailable {
    fn unavailable() -> Self;
}

impl Unavailable for () {
    fn unavailable() {}
}

impl Unavailable for vk::Result {
    fn unavailable() -> Self {
        vk::Result::ERROR_DEVICE_LOST
    }
}

impl Unavailable for u32 {
    fn unavailable() -> Self {
        vk::FALSE
    }
}

impl Unavailable for u64 {
    fn unavailable() -> Self {
        0
    }
}

/// Allocation callbacks are never honored; the native driver always gets null.
pub(crate) fn ignore_allocator<'a>(
    p_allocator: *const vk::AllocationCallbacks<'a>,
    command: &str,
) -> *const vk::AllocationCallbacks<'a> {
    if !p_allocator.is_null() {
        warn!("{}: allocation callbacks are not supported, ignoring", command);
    }
    ptr::null()
}

#[cold]
pub(crate) fn missing<R: Unavailable>(name: &str) -> R {
    warn!("{} called but the native driver does not provide it", name);
    R::unavailable()
}

/// The value a thunk forwards for one argument, given as `command, name, name`.
/// An argument named `p_allocator` is replaced with null, everything else
/// passes through. The name comes twice so the matched literal and the
/// forwarded binding stay separate tokens.
macro_rules! forward_arg {
    ($command:ident, p_allocator, $arg:ident) => {
        $crate::thunk::ignore_allocator($arg, stringify!($command))
    };
    ($command:ident, $name:ident, $arg:ident) => {
        $arg
    };
}
pub(crate) use forward_arg;

/// Define forwarding entry points plus a `lookup` function resolving them by name.
///
/// The first parameter of every entry must be a dispatchable handle type
/// implementing [`Unwrap`]; `=> field` names the table entry to call.
macro_rules! thunks {
    ($(
        fn $name:ident($first:ident: $first_ty:ty $(, $arg:ident: $ty:ty)* $(,)?) $(-> $ret:ty)? => $field:ident;
    )*) => {
        $(
            #[allow(non_snake_case)]
            pub unsafe extern "system" fn $name($first: $first_ty $(, $arg: $ty)*) $(-> $ret)? {
                ::tracing::trace!(command = stringify!($name), "forward");
                let Some((native, table)) = $crate::thunk::Unwrap::unwrap_native($first) else {
                    return $crate::thunk::Unavailable::unavailable();
                };
                match table.$field {
                    Some(f) => f(native $(, $crate::thunk::forward_arg!($name, $arg, $arg))*),
                    None => $crate::thunk::missing(stringify!($name)),
                }
            }
        )*

        /// Resolve a forwarding entry point defined in this module.
        pub(crate) fn lookup(name: &str) -> ::ash::vk::PFN_vkVoidFunction {
            match name {
                $(stringify!($name) => $crate::proc_table::proc_fn!($name),)*
                _ => None,
            }
        }
    };
}
pub(crate) use thunks;
