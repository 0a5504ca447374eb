//! Derive macro for `DeepEntity`
//!
//! Generates the `DeepEntity` implementation: the entity name and a schema
//! builder listing every named field with its column override, primary key
//! flag, type shape and relation annotations.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Field, Fields};

use crate::attributes;
use crate::type_analysis;

/// Generate the `DeepEntity` implementation
pub fn derive_deep_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let entity_name = struct_name.to_string();

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "DeepEntity can only be derived for structs with named fields",
            ));
        }
    };

    let table_name = attributes::extract_table_name(&input.attrs).map(|table| {
        quote! { .with_table_name(#table) }
    });

    let field_defs = fields
        .iter()
        .map(field_def)
        .collect::<syn::Result<Vec<_>>>()?;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::deepguard::DeepEntity for #struct_name #ty_generics #where_clause {
            const NAME: &'static str = #entity_name;

            fn schema() -> ::deepguard::schema::EntitySchema {
                ::deepguard::schema::EntitySchema::new(#entity_name)
                    #table_name
                    #( .field(#field_defs) )*
            }
        }
    })
}

fn field_def(field: &Field) -> syn::Result<TokenStream2> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "DeepEntity fields must be named"));
    };
    let name = ident.to_string();
    let name = name.strip_prefix("r#").unwrap_or(&name);

    let relation = attributes::extract_relation(field)?;
    let ty = type_analysis::field_type(&field.ty, relation.is_some())?;

    let column_name =
        attributes::extract_column_name(field).map(|column| quote! { .column_name(#column) });
    let primary_key =
        attributes::has_attribute(field, "primary_key").then(|| quote! { .primary_key() });
    let foreign_key = relation
        .as_ref()
        .and_then(|r| r.foreign_key.as_ref())
        .map(|key| quote! { .foreign_key(#key) });
    let many_to_many = relation
        .as_ref()
        .and_then(|r| r.many_to_many.as_ref())
        .map(|table| quote! { .many_to_many(#table) });

    Ok(quote! {
        ::deepguard::schema::FieldDef::new(#name, #ty)
            #column_name
            #primary_key
            #foreign_key
            #many_to_many
    })
}
