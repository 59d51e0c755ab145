//! Macro generating port error enums with snake_case constructors.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation for port error enums.
    define_port_error! {
        pub enum AssignmentPortError {
            Offline => "store offline",
            Rejected { reason: String } => "rejected: {reason}",
            Stale { expected: u32 } => "stale version {expected}",
            Clash { id: String, expected: u32 } => "clash on {id} ({expected})",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(AssignmentPortError::offline().to_string(), "store offline");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = AssignmentPortError::rejected("team missing");
        assert_eq!(err.to_string(), "rejected: team missing");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = AssignmentPortError::stale(3_u32);
        assert_eq!(err, AssignmentPortError::Stale { expected: 3 });
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = AssignmentPortError::clash("pr-7", 2_u32);
        assert_eq!(err.to_string(), "clash on pr-7 (2)");
    }
}
