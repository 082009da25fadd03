//! Procedural macros used in the definition and implementation of getters and setters for VerifierSettings

use quote::quote;
use syn::parse::ParseStream;
use syn::parse::{Parse, Result};
use syn::{Expr, Ident, Token};

type ValueName = Ident;
type ValueType = Ident;
type DefaultValue = Expr;

/// Signature contains the results of parsing a vs_gets_and_sets definition, i.e., the
/// name of a value stored in a VerifierSettings map and the corresponding type.
struct Signature {
    value_name: ValueName,
    value_type: ValueType,
}

impl Parse for Signature {
    fn parse(stream: ParseStream<'_>) -> Result<Self> {
        let value_name = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type = stream.parse()?;
        Ok(Signature {
            value_name,
            value_type,
        })
    }
}

/// SignatureWithDefault contains the results of parsing a vs_gets_and_sets_with_default definition,
/// i.e., the name of a value stored in a VerifierSettings map, the corresponding type and the
/// default value. For example:
///     ```text
///     vs_gets_and_sets_with_default!(VS_CHECK_REVOCATION_STATUS, bool, true);
///     ```
struct SignatureWithDefault {
    value_name: ValueName,
    value_type: ValueType,
    default_value: DefaultValue,
}

impl Parse for SignatureWithDefault {
    fn parse(stream: ParseStream<'_>) -> Result<Self> {
        let value_name = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type = stream.parse()?;
        let _comma2: Token!(,) = stream.parse()?;
        let default_value = stream.parse()?;
        Ok(SignatureWithDefault {
            value_name,
            value_type,
            default_value,
        })
    }
}

/// is_string_numeric is used to determine if a string value contains only numeric characters.
/// It is used to process a slice that omits the first character, i.e., in order to identify
/// types like u8, u32, etc.
fn is_string_numeric(str: &str) -> bool {
    str.chars().all(|c| c.is_numeric())
}

/// Maps a setting name and value type to getter name, setter name and the name of the
/// VerifierSettingTypes variant that carries values of that type.
fn accessor_idents(flag: &Ident, return_t: &Ident) -> (Ident, Ident, Ident, String, String) {
    let flag_str = format!("{}", flag)[3..].to_lowercase();
    let getter_str = format!("get_{}", flag_str);
    let setter_str = format!("set_{}", flag_str);
    let vs_type_str = format!("{}", return_t);
    let mut upper_vs_type_str = if is_string_numeric(&vs_type_str[1..]) {
        vs_type_str.to_uppercase()
    } else {
        vs_type_str
    };
    if upper_vs_type_str == "bool" {
        upper_vs_type_str = "Bool".to_string();
    }
    let getter = Ident::new(&getter_str, flag.span());
    let setter = Ident::new(&setter_str, flag.span());
    let vs_type = Ident::new(&upper_vs_type_str, return_t.span());
    (getter, setter, vs_type, getter_str, setter_str)
}

/// Generates `get_xxx` and `set_xxx` methods for a `VS_XXX` value that has no default. The getter
/// returns `None` when the value is absent.
#[proc_macro]
pub fn vs_gets_and_sets(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as Signature);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let (getter, setter, vs_type, getter_str, setter_str) = accessor_idents(&flag, &return_t);

    let getter_comment = format!(
        "`{}` is used to retrieve `{}` items from a [`VerifierSettings`] instance",
        getter_str, flag
    );
    let setter_comment = format!(
        "`{}` is used to set `{}` items in a [`VerifierSettings`] instance",
        setter_str, flag
    );

    let tokens = quote! {
        impl VerifierSettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> Option<#return_t> {
                match self.0.get(#flag) {
                    Some(VerifierSettingTypes::#vs_type(v)) => Some(v.clone()),
                    _ => None,
                }
            }
            #[doc = #setter_comment]
            pub fn #setter(&mut self, v: #return_t) {
                self.0.insert(#flag.to_string(), VerifierSettingTypes::#vs_type(v));
            }
        }
    };
    tokens.into()
}

/// Generates `get_xxx` and `set_xxx` methods for a `VS_XXX` value. The getter returns the given
/// default expression (evaluated on each call) when the value is absent or has the wrong type.
#[proc_macro]
pub fn vs_gets_and_sets_with_default(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as SignatureWithDefault);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let default_value = signature.default_value;
    let (getter, setter, vs_type, getter_str, setter_str) = accessor_idents(&flag, &return_t);

    let getter_comment = format!(
        "`{}` is used to retrieve `{}` items from a [`VerifierSettings`] instance",
        getter_str, flag
    );
    let setter_comment = format!(
        "`{}` is used to set `{}` items in a [`VerifierSettings`] instance",
        setter_str, flag
    );

    let tokens = quote! {
        impl VerifierSettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> #return_t {
                match self.0.get(#flag) {
                    Some(VerifierSettingTypes::#vs_type(v)) => v.clone(),
                    _ => #default_value,
                }
            }
            #[doc = #setter_comment]
            pub fn #setter(&mut self, v: #return_t) {
                self.0.insert(#flag.to_string(), VerifierSettingTypes::#vs_type(v));
            }
        }
    };
    tokens.into()
}
