use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashMap;
use syn::punctuated::Punctuated;
use proc_macro2::{Delimiter, Spacing, TokenTree};
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Token, parse_macro_input};

/// Defines a settings struct resolved from environment variables
///
/// Every named field becomes a `enver::Field<T>` and is configured with an
/// optional `#[field(...)]` attribute:
///
/// - `env = "NAME"`: declared name and environment variable. Without it the
///   field identifier is upper-cased as a whole, with no word splitting:
///   `my_db_pass` reads `MY_DB_PASS` and `myDbPass` reads `MYDBPASS`
/// - `doc = "..."`: description, defaults to the field's `///` comments
/// - `default = expr`: value used when the variable is not set; a string
///   literal is converted with `Into`
///
/// Fields without a default are required, unless their type is `Option<T>`.
#[proc_macro]
pub fn define_settings(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_settings(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct FieldConfig {
    env_var: String,
    description: String,
    default: Option<Expr>,
}

fn generate_settings(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;
    let struct_attrs = &input.attrs;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "define_settings! does not support generic structs",
        ));
    }

    let no_fields = Punctuated::new();
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => &no_fields,
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "define_settings! only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "define_settings! only supports structs",
            ));
        }
    };

    let mut field_defs = Vec::new();
    let mut decls = Vec::new();
    let mut resolves = Vec::new();
    let mut idents = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for (index, field) in fields.iter().enumerate() {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let field_vis = &field.vis;
        let field_type = &field.ty;

        if let Some(cfg) = field.attrs.iter().find(|attr| attr.path().is_ident("cfg")) {
            return Err(syn::Error::new_spanned(
                cfg,
                "#[cfg] is not supported on settings fields",
            ));
        }

        let ident_str = field_name.to_string().trim_start_matches("r#").to_string();
        let config = parse_field_config(&field.attrs, &ident_str)?;

        if let Some(previous) = seen.insert(config.env_var.to_ascii_uppercase(), ident_str.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!(
                    "`{}` has the same case-insensitive name as `{}`",
                    ident_str, previous
                ),
            ));
        }

        let kept_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("field"))
            .collect();

        field_defs.push(quote! {
            #(#kept_attrs)*
            #field_vis #field_name: ::enver::Field<#field_type>
        });

        let env_var = &config.env_var;
        let description = &config.description;
        let (default_decl, required, default_arg) = match &config.default {
            Some(expr) => {
                let repr = default_repr(expr);
                let value = match expr {
                    Expr::Lit(lit) if matches!(lit.lit, Lit::Str(_)) => quote! {
                        ::core::convert::Into::into(#expr)
                    },
                    _ => quote! { #expr },
                };
                (
                    quote! { ::core::option::Option::Some(#repr) },
                    quote! { false },
                    quote! {
                        ::core::option::Option::Some({
                            let __enver_default: #field_type = #value;
                            __enver_default
                        })
                    },
                )
            }
            None => (
                quote! { ::core::option::Option::None },
                quote! { !<#field_type as ::enver::Coerce>::NULLABLE },
                quote! { ::core::option::Option::None },
            ),
        };

        decls.push(quote! {
            ::enver::FieldDecl {
                name: #env_var,
                ident: #ident_str,
                kind: <#field_type as ::enver::Coerce>::KIND,
                description: #description,
                default: #default_decl,
                required: #required,
            }
        });

        let local = format_ident!("__enver_field_{}", index);
        resolves.push(quote! {
            let #local = __enver_resolver.field::<#field_type>(#index, #default_arg);
        });
        idents.push((field_name.clone(), local));
    }

    let field_count = decls.len();
    let struct_name_str = struct_name.to_string();
    let locals: Vec<_> = idents.iter().map(|(_, local)| local).collect();
    let assigns = idents.iter().map(|(name, local)| quote! { #name: #local });

    let struct_def = quote! {
        #(#struct_attrs)*
        #vis struct #struct_name {
            #(#field_defs,)*
            #[doc(hidden)]
            __enver_values: ::enver::Resolved,
        }
    };

    let settings_impl = quote! {
        impl ::enver::Settings for #struct_name {
            fn schema() -> &'static ::enver::Schema {
                static FIELDS: [::enver::FieldDecl; #field_count] = [#(#decls),*];
                static SCHEMA: ::enver::Schema = ::enver::Schema {
                    name: #struct_name_str,
                    fields: &FIELDS,
                };
                &SCHEMA
            }

            fn resolve_from(
                __enver_env: &dyn ::enver::EnvSource,
            ) -> ::core::result::Result<Self, ::enver::ConfigErrors> {
                #[allow(unused_mut)]
                let mut __enver_resolver = ::enver::Resolver::new(
                    <Self as ::enver::Settings>::schema(),
                    __enver_env,
                );

                #(#resolves)*

                let __enver_values = __enver_resolver.finish()?;

                match (#(#locals,)*) {
                    (#(::core::option::Option::Some(#locals),)*) => ::core::result::Result::Ok(Self {
                        #(#assigns,)*
                        __enver_values,
                    }),
                    #[allow(unreachable_patterns)]
                    _ => ::core::unreachable!("resolver finished without errors but left a field unresolved"),
                }
            }

            fn values(&self) -> &::enver::Resolved {
                &self.__enver_values
            }
        }

        impl ::core::ops::Index<&str> for #struct_name {
            type Output = ::enver::Value;

            fn index(&self, name: &str) -> &::enver::Value {
                &self.__enver_values[name]
            }
        }
    };

    Ok(quote! {
        #struct_def
        #settings_impl
    })
}

/// Parse the optional #[field(env = "X", doc = "Y", default = expr)]
fn parse_field_config(attrs: &[Attribute], ident: &str) -> syn::Result<FieldConfig> {
    let mut env_var = None;
    let mut description = None;
    let mut default = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("field")) {
        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                "field attribute must be a list: #[field(env = \"...\", ...)]",
            ));
        };

        list.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .ok_or_else(|| meta.error("expected identifier"))?
                .to_string();

            if !meta.input.peek(Token![=]) {
                return Err(meta.error(format!("`{}` needs a value: {} = ...", key, key)));
            }
            meta.input.parse::<Token![=]>()?;

            match key.as_str() {
                "env" => {
                    let value: syn::LitStr = meta.input.parse()?;
                    let name = value.value();
                    if name.is_empty() || name.contains('=') || name.contains('\0') {
                        return Err(syn::Error::new_spanned(
                            value,
                            "env must be a non-empty variable name without '=' or NUL",
                        ));
                    }
                    env_var = Some(name);
                }
                "doc" => {
                    let value: syn::LitStr = meta.input.parse()?;
                    description = Some(value.value().trim().to_string());
                }
                "default" => {
                    default = Some(meta.input.parse::<Expr>()?);
                }
                other => {
                    return Err(meta.error(format!(
                        "unknown key `{}`, expected one of: env, doc, default",
                        other
                    )));
                }
            }

            Ok(())
        })?;
    }

    Ok(FieldConfig {
        env_var: env_var.unwrap_or_else(|| ident.to_uppercase()),
        description: description.unwrap_or_else(|| doc_comment(attrs)),
        default,
    })
}

/// Join the `///` lines of a field into a one-line description
fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable text of a default expression, for schema metadata
fn default_repr(expr: &Expr) -> String {
    match expr {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => s.value(),
        other => {
            let mut out = String::new();
            render_tokens(quote!(#other), &mut out);
            out
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Last {
    Start,
    Word,
    Comma,
    Operator,
    Punct,
}

/// Write tokens the way the expression is usually typed: no spaces around
/// `::`, `.` or brackets, spaces after commas and around binary operators
fn render_tokens(tokens: proc_macro2::TokenStream, out: &mut String) {
    let mut last = Last::Start;
    let mut joined_operator = false;

    for tree in tokens {
        match tree {
            TokenTree::Ident(_) | TokenTree::Literal(_) => {
                if matches!(last, Last::Word | Last::Comma | Last::Operator) {
                    out.push(' ');
                }
                out.push_str(&tree.to_string());
                last = Last::Word;
                joined_operator = false;
            }
            TokenTree::Group(group) => {
                if matches!(last, Last::Comma | Last::Operator) {
                    out.push(' ');
                }
                let (open, close) = match group.delimiter() {
                    Delimiter::Parenthesis => ("(", ")"),
                    Delimiter::Bracket => ("[", "]"),
                    Delimiter::Brace => ("{ ", " }"),
                    Delimiter::None => ("", ""),
                };
                out.push_str(open);
                render_tokens(group.stream(), out);
                out.push_str(close);
                last = Last::Word;
                joined_operator = false;
            }
            TokenTree::Punct(punct) => {
                let ch = punct.as_char();
                let binary = "+-*/%=<>|&^".contains(ch) && (last == Last::Word || joined_operator);

                if ch == ',' {
                    out.push(',');
                    last = Last::Comma;
                    joined_operator = false;
                } else if binary {
                    if !joined_operator {
                        out.push(' ');
                    }
                    out.push(ch);
                    joined_operator = punct.spacing() == Spacing::Joint;
                    last = if joined_operator { Last::Punct } else { Last::Operator };
                } else {
                    if matches!(last, Last::Comma | Last::Operator) {
                        out.push(' ');
                    }
                    out.push(ch);
                    last = Last::Punct;
                    joined_operator = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repr(src: &str) -> String {
        default_repr(&syn::parse_str::<Expr>(src).unwrap())
    }

    #[test]
    fn test_default_repr_literals() {
        assert_eq!(repr(r#""localhost""#), "localhost");
        assert_eq!(repr("8080u16"), "8080u16");
        assert_eq!(repr("false"), "false");
        assert_eq!(repr("-1"), "-1");
    }

    #[test]
    fn test_default_repr_paths_and_calls() {
        assert_eq!(repr("Vec::new()"), "Vec::new()");
        assert_eq!(repr(r#"String::from("localhost")"#), r#"String::from("localhost")"#);
        assert_eq!(repr("Environment::Dev"), "Environment::Dev");
        assert_eq!(repr("vec![1, 2, 3]"), "vec![1, 2, 3]");
        assert_eq!(repr("Duration::from_secs(30).as_millis()"), "Duration::from_secs(30).as_millis()");
    }

    #[test]
    fn test_default_repr_operators() {
        assert_eq!(repr("60 * 5"), "60 * 5");
        assert_eq!(repr("a == b"), "a == b");
        assert_eq!(repr("(1, -2)"), "(1, -2)");
        assert_eq!(repr("x as u64"), "x as u64");
    }
}
