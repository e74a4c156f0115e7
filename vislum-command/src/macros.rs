/// Macro to create an enum that maps to/from a Vulkan enum.
#[macro_export]
macro_rules! vk_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $ident:ident: $vk_type:ty {
            $(
                $(#[$field_meta:meta])*
                $variant_ident:ident = $vk_ident:ident
            ),*
            $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        $vis enum $ident {
            $(
                $(#[$field_meta])*
                $variant_ident,
            )*
        }

        impl std::fmt::Display for $ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $(
                        <Self>::$variant_ident => stringify!($variant_ident),
                    )*
                })
            }
        }

        impl $ident {
            pub const fn from_vk(value: $vk_type) -> Option<Self> {
                match value {
                    $(
                        <$vk_type>::$vk_ident => Some(<Self>::$variant_ident),
                    )*
                    _ => None,
                }
            }

            pub const fn to_vk(self) -> $vk_type {
                match self {
                    $(
                        <Self>::$variant_ident => <$vk_type>::$vk_ident,
                    )*
                }
            }
        }
    }
}

/// Expands to the path of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Checks the result of a native call.
///
/// Evaluates to a `Result<T, VkError>` where the error records the failing
/// expression and where it was called from.
#[macro_export]
macro_rules! vk_check {
    ($expr:expr) => {
        match $expr {
            Ok(value) => Ok(value),
            Err(result) => Err($crate::error::VkError {
                result,
                expression: stringify!($expr),
                file: file!(),
                line: line!(),
                function: $crate::function_name!(),
            }),
        }
    };
}
