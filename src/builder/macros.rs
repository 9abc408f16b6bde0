//! Macros for ergonomic state machine construction.

/// Generate a state key enum.
///
/// The enum derives everything [`StateKey`](crate::core::StateKey) needs and
/// gains an `ALL` constant listing every variant plus a `name()` accessor.
///
/// # Example
///
/// ```
/// use statebus::state_keys;
///
/// state_keys! {
///     pub enum Phase {
///         Idle,
///         Running,
///         Stopped,
///     }
/// }
///
/// assert_eq!(Phase::ALL.len(), 3);
/// assert_eq!(Phase::Running.name(), "Running");
/// ```
#[macro_export]
macro_rules! state_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The variant's identifier.
            #[allow(dead_code)]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}
