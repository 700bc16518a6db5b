//! Ahead-of-time contract generation for structs.

/// Generates a two-way contract for a struct with named fields.
///
/// Each field names its JSON key and the contract that handles its value.
/// The generated contract precomputes every key in both encodings. When the
/// writer allows it, the opening brace and each key (with its leading comma)
/// are written as one pre-encoded copy; otherwise keys are written and
/// escaped one by one. Deserialization accepts fields in any order, skips
/// unknown fields, and asks the field contract's
/// [`missing_value`](crate::DeserializeContract::missing_value) for absent
/// ones. At least one field is required.
///
/// ```
/// use contract_json::{object_contract, I32Contract, OptionContract, StringContract};
///
/// #[derive(Debug, PartialEq)]
/// pub struct Person {
///     pub name: String,
///     pub age: i32,
///     pub email: Option<String>,
/// }
///
/// object_contract! {
///     pub struct PersonContract for Person {
///         name: String => "name" with StringContract,
///         age: i32 => "age" with I32Contract,
///         email: Option<String> => "email" with OptionContract<StringContract>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! object_contract {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident for $target:ident {
            $first:ident : $first_ty:ty => $first_key:literal with $first_contract:ty
            $(, $field:ident : $ty:ty => $key:literal with $contract:ty)*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $first: $crate::contract::FieldSlot<$first_contract>,
            $($field: $crate::contract::FieldSlot<$contract>,)*
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    $first: $crate::contract::FieldSlot::new($first_key, true),
                    $($field: $crate::contract::FieldSlot::new($key, false),)*
                }
            }
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::SerializeContract<$target> for $name {
            fn serialize<W: $crate::JsonWriter>(
                &self,
                value: &$target,
                ctx: &mut $crate::SerializeContext<'_>,
                writer: &mut W,
            ) -> $crate::Result<()> {
                if writer.is_compatible_with_optimized_contract() {
                    writer.write_constant(&self.$first.fragment)?;
                    $crate::SerializeContract::<$first_ty>::serialize(
                        &self.$first.contract, &value.$first, ctx, writer,
                    )?;
                    $(
                        writer.write_constant(&self.$field.fragment)?;
                        $crate::SerializeContract::<$ty>::serialize(
                            &self.$field.contract, &value.$field, ctx, writer,
                        )?;
                    )*
                } else {
                    writer.write_begin_object()?;
                    writer.write_property_name(self.$first.name)?;
                    $crate::SerializeContract::<$first_ty>::serialize(
                        &self.$first.contract, &value.$first, ctx, writer,
                    )?;
                    $(
                        writer.write_value_separator()?;
                        writer.write_property_name(self.$field.name)?;
                        $crate::SerializeContract::<$ty>::serialize(
                            &self.$field.contract, &value.$field, ctx, writer,
                        )?;
                    )*
                }
                writer.write_end_object()
            }
        }

        impl $crate::DeserializeContract<$target> for $name {
            fn deserialize<U: $crate::CodeUnit>(
                &self,
                tokenizer: &mut $crate::Tokenizer<'_, U>,
                ctx: &mut $crate::DeserializeContext<'_>,
            ) -> $crate::Result<$target> {
                let mut $first: ::core::option::Option<$first_ty> = None;
                $(let mut $field: ::core::option::Option<$ty> = None;)*

                tokenizer.read_begin_object()?;
                let mut count = 0;
                while !tokenizer.try_read_end_object_or_separator(&mut count)? {
                    let token = tokenizer.read_name_token()?;
                    let name = $crate::contract::PropertyName::new(&token)?;
                    if name.is(&self.$first) {
                        $first = Some($crate::DeserializeContract::<$first_ty>::deserialize(
                            &self.$first.contract, tokenizer, ctx,
                        )?);
                        continue;
                    }
                    $(
                        if name.is(&self.$field) {
                            $field = Some($crate::DeserializeContract::<$ty>::deserialize(
                                &self.$field.contract, tokenizer, ctx,
                            )?);
                            continue;
                        }
                    )*
                    tokenizer.skip_value()?;
                }

                Ok($target {
                    $first: match $first {
                        Some(value) => value,
                        None => $crate::DeserializeContract::<$first_ty>::missing_value(
                            &self.$first.contract, self.$first.name,
                        )?,
                    },
                    $(
                        $field: match $field {
                            Some(value) => value,
                            None => $crate::DeserializeContract::<$ty>::missing_value(
                                &self.$field.contract, self.$field.name,
                            )?,
                        },
                    )*
                })
            }
        }
    };
}
