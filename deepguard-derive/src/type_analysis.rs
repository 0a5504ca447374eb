//! Type shape analysis for `DeepEntity` fields
//!
//! Maps a field's Rust type onto the `deepguard::schema::FieldType` tree:
//! - `Option<T>`, `Box<T>`, `Arc<T>`, `Rc<T>`, `Cow<T>`, `&T` → `Pointer`
//! - `Vec<T>`, `VecDeque<T>`, `HashSet<T>`, `BTreeSet<T>`, `[T]`, `[T; N]` → `List`
//! - primitives and `String` → `Scalar`
//! - the element of a `#[relation]` field → `Entity`
//! - any other path → `Struct` (a value struct such as a timestamp)

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

const POINTERS: &[&str] = &["Option", "Box", "Arc", "Rc", "Cow"];
const LISTS: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList"];
const SCALARS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "char", "str", "String",
];

/// Generate the `FieldType` expression for `ty`
///
/// `relation` marks the field as a relation: its element type must then be
/// another `DeepEntity`.
pub fn field_type(ty: &Type, relation: bool) -> syn::Result<TokenStream2> {
    match ty {
        Type::Reference(r) => {
            let inner = field_type(&r.elem, relation)?;
            Ok(quote! { ::deepguard::schema::FieldType::pointer(#inner) })
        }
        Type::Slice(s) => {
            let inner = field_type(&s.elem, relation)?;
            Ok(quote! { ::deepguard::schema::FieldType::list(#inner) })
        }
        Type::Array(a) => {
            let inner = field_type(&a.elem, relation)?;
            Ok(quote! { ::deepguard::schema::FieldType::list(#inner) })
        }
        Type::Paren(p) => field_type(&p.elem, relation),
        Type::Group(g) => field_type(&g.elem, relation),
        Type::Path(path) => {
            let Some(segment) = path.path.segments.last() else {
                return Ok(scalar(ty));
            };
            let ident = segment.ident.to_string();

            if let Some(inner) = wrapped_type(&segment.arguments) {
                if POINTERS.contains(&ident.as_str()) {
                    let inner = field_type(inner, relation)?;
                    return Ok(quote! { ::deepguard::schema::FieldType::pointer(#inner) });
                }
                if LISTS.contains(&ident.as_str()) {
                    let inner = field_type(inner, relation)?;
                    return Ok(quote! { ::deepguard::schema::FieldType::list(#inner) });
                }
            }

            if SCALARS.contains(&ident.as_str()) {
                if relation {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "relation fields must hold a DeepEntity type, found a scalar",
                    ));
                }
                return Ok(quote! { ::deepguard::schema::FieldType::scalar(#ident) });
            }

            if relation {
                Ok(quote! {
                    ::deepguard::schema::FieldType::entity(
                        ::deepguard::schema::EntityRef::of::<#ty>()
                    )
                })
            } else {
                Ok(quote! { ::deepguard::schema::FieldType::Struct(#ident) })
            }
        }
        _ if relation => Err(syn::Error::new_spanned(ty, "unsupported relation field type")),
        _ => Ok(scalar(ty)),
    }
}

fn scalar(ty: &Type) -> TokenStream2 {
    let name = quote!(#ty).to_string();
    quote! { ::deepguard::schema::FieldType::scalar(#name) }
}

/// The last generic type argument: `T` in `Option<T>`, `Cow<'a, T>`
fn wrapped_type(arguments: &PathArguments) -> Option<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().rev().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn render(ty: Type, relation: bool) -> String {
        field_type(&ty, relation).unwrap().to_string().replace(' ', "")
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            render(parse_quote!(i64), false),
            "::deepguard::schema::FieldType::scalar(\"i64\")"
        );
        assert!(render(parse_quote!(Option<String>), false)
            .starts_with("::deepguard::schema::FieldType::pointer("));
    }

    #[test]
    fn test_value_structs() {
        assert_eq!(
            render(parse_quote!(chrono::NaiveDateTime), false),
            "::deepguard::schema::FieldType::Struct(\"NaiveDateTime\")"
        );
    }

    #[test]
    fn test_relation_element_is_entity() {
        let rendered = render(parse_quote!(Option<Vec<Arc<Tag>>>), true);
        assert!(rendered.contains("pointer(::deepguard::schema::FieldType::list("));
        assert!(rendered.contains("EntityRef::of::<Tag>()"));
    }

    #[test]
    fn test_slices_and_arrays_are_lists() {
        assert!(render(parse_quote!(&'static [Tag]), true)
            .contains("pointer(::deepguard::schema::FieldType::list("));
        assert!(render(parse_quote!([u8; 4]), false)
            .starts_with("::deepguard::schema::FieldType::list("));
    }

    #[test]
    fn test_scalar_relation_is_rejected() {
        assert!(field_type(&parse_quote!(Option<i64>), true).is_err());
    }
}
