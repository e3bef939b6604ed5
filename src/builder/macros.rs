//! Macros for ergonomic state definitions.

/// Define a state struct together with its shallow-merge patch type.
///
/// Generates the struct (deriving `Clone` and `Debug`), a patch struct with
/// one `Option` per field, and the [`State`](crate::core::State) impl.
///
/// # Example
///
/// ```
/// use retrace::core::State;
/// use retrace::fluent_state;
///
/// fluent_state! {
///     #[derive(PartialEq)]
///     pub struct Calculator {
///         pub value: f64,
///         pub label: String,
///     }
///     patch: CalculatorPatch
/// }
///
/// let mut calc = Calculator { value: 1.0, label: "one".into() };
/// calc.merge(CalculatorPatch { value: Some(2.0), ..Default::default() });
/// assert_eq!(calc, Calculator { value: 2.0, label: "one".into() });
/// ```
#[macro_export]
macro_rules! fluent_state {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }

        patch: $patch:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty
            ),*
        }

        #[doc = concat!("Partial update for [`", stringify!($name), "`].")]
        #[derive(Clone, Debug, Default)]
        $vis struct $patch {
            $(pub $field: ::core::option::Option<$ty>),*
        }

        impl $crate::core::State for $name {
            type Patch = $patch;

            fn merge(&mut self, patch: Self::Patch) {
                $(
                    if let ::core::option::Option::Some(value) = patch.$field {
                        self.$field = value;
                    }
                )*
            }
        }
    };
}
