/// Implements [`Reflect`](crate::Reflect) for a struct whose properties are
/// its plain fields.
///
/// Every listed field is read through [`ToValue`](crate::ToValue) and
/// written through [`FromValue`](crate::FromValue). The type name is taken
/// from the type's [`Describe`](crate::Describe) impl. Types that need
/// post-load methods or native serialization implement `Reflect` by hand.
///
/// ```ignore
/// #[derive(Debug, Clone, Default)]
/// struct Person {
///     first: String,
///     last: String,
/// }
///
/// tessera_core::reflect_fields!(Person { first, last });
/// ```
#[macro_export]
macro_rules! reflect_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn type_name(&self) -> &'static str {
                <$ty as $crate::Describe>::TYPE_NAME
            }

            fn get(&self, property: &str) -> ::core::option::Option<$crate::Value> {
                match property {
                    $(stringify!($field) => ::core::option::Option::Some(
                        $crate::ToValue::to_value(&self.$field),
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set(
                &mut self,
                property: &str,
                value: $crate::Value,
            ) -> ::core::result::Result<(), $crate::ReflectError> {
                match property {
                    $(stringify!($field) => {
                        self.$field = $crate::FromValue::from_value(value)?;
                        ::core::result::Result::Ok(())
                    })*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err($crate::ReflectError::no_such_property(
                            <$ty as $crate::Describe>::TYPE_NAME,
                            property,
                        ))
                    }
                }
            }
        }
    };
}

/// Implements [`ToValue`](crate::ToValue) and [`FromValue`](crate::FromValue)
/// for reflected types, so they can be used as property types.
///
/// Values are held as owned objects.
#[macro_export]
macro_rules! object_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ToValue for $ty {
                fn to_value(&self) -> $crate::Value {
                    $crate::Value::object(::core::clone::Clone::clone(self))
                }
            }

            impl $crate::FromValue for $ty {
                fn from_value(
                    value: $crate::Value,
                ) -> ::core::result::Result<Self, $crate::ReflectError> {
                    value.into_object()
                }
            }
        )+
    };
}

/// Implements [`ToValue`](crate::ToValue) and [`FromValue`](crate::FromValue)
/// for [`ReflectEnum`](crate::ReflectEnum) types.
#[macro_export]
macro_rules! enum_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ToValue for $ty {
                fn to_value(&self) -> $crate::Value {
                    $crate::Value::enumeration(self)
                }
            }

            impl $crate::FromValue for $ty {
                fn from_value(
                    value: $crate::Value,
                ) -> ::core::result::Result<Self, $crate::ReflectError> {
                    value.into_enum()
                }
            }
        )+
    };
}
