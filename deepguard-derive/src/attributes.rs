//! Attribute parsing utilities

use syn::{Attribute, ExprLit, Field, Lit, LitStr, Token};

/// Extract table name from struct attributes
pub fn extract_table_name(attrs: &[Attribute]) -> Option<String> {
    extract_str_value(attrs, "table_name")
}

/// Extract column name from field attributes
pub fn extract_column_name(field: &Field) -> Option<String> {
    extract_str_value(&field.attrs, "column_name")
}

/// Check if field has a specific attribute
pub fn has_attribute(field: &Field, attr_name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(attr_name))
}

fn extract_str_value(attrs: &[Attribute], name: &str) -> Option<String> {
    for attr in attrs {
        if attr.path().is_ident(name) {
            if let Ok(meta) = attr.meta.require_name_value() {
                if let syn::Expr::Lit(ExprLit {
                    lit: Lit::Str(s),
                    ..
                }) = &meta.value
                {
                    return Some(s.value());
                }
            }
        }
    }
    None
}

/// Parsed `#[relation(...)]` attribute
///
/// A key written without a value (`#[relation(foreign_key)]`) is kept as an
/// empty string; the runtime classifier reports it as malformed.
#[derive(Debug, Default)]
pub struct RelationAttribute {
    pub foreign_key: Option<String>,
    pub many_to_many: Option<String>,
}

/// Parse the `#[relation]` attribute of a field, `None` if it has none
pub fn extract_relation(field: &Field) -> syn::Result<Option<RelationAttribute>> {
    let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("relation")) else {
        return Ok(None);
    };

    let mut relation = RelationAttribute::default();
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(Some(relation));
    }

    attr.parse_nested_meta(|meta| {
        let value = if meta.input.peek(Token![=]) {
            let lit: LitStr = meta.value()?.parse()?;
            lit.value()
        } else {
            String::new()
        };

        if meta.path.is_ident("foreign_key") {
            relation.foreign_key = Some(value);
            Ok(())
        } else if meta.path.is_ident("many_to_many") {
            relation.many_to_many = Some(value);
            Ok(())
        } else {
            Err(meta.error("unknown relation attribute, expected `foreign_key` or `many_to_many`"))
        }
    })?;

    Ok(Some(relation))
}
