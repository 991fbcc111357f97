//! Shared utilities for cachette procedural macros
//!
//! Attribute parsing and the code fragments shared by `#[caches_method]` and
//! `#[caches_class_method]`.

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{punctuated::Punctuated, Expr, FnArg, Ident, Meta, MetaNameValue, Pat, Signature, Token, Type};

/// How `with_key` was given.
pub enum KeySource {
    /// `with_key = "field"`: a field of the receiver.
    Field(Ident),
    /// `with_key = path::to_fn`: a function of the receiver (if any) and the
    /// arguments.
    Function(syn::Path),
}

/// Parsed macro attributes for cached methods
#[derive(Default)]
pub struct CachedMethodAttributes {
    pub expires_in: Option<TokenStream2>,
    pub no_version: Option<bool>,
    pub no_locale: Option<bool>,
    pub no_sha: Option<bool>,
    pub with_key: Option<KeySource>,
    pub only_if: Option<syn::Path>,
    pub after_load: Option<syn::Path>,
    pub custom_name: Option<String>,
}

/// Path to the core crate as seen from user code.
///
/// Generated code goes through the `cachette` facade, so callers only need
/// `cachette` in their dependencies.
pub fn core_path() -> TokenStream2 {
    quote! { ::cachette::__core }
}

impl CachedMethodAttributes {
    /// The `CachingOptions` expression built from the parsed attributes.
    pub fn options_expr(&self) -> TokenStream2 {
        let core = core_path();
        let mut expr = quote! { #core::CachingOptions::new() };
        if let Some(expires_in) = &self.expires_in {
            expr = quote! { #expr #expires_in };
        }
        if let Some(value) = self.no_version {
            expr = quote! { #expr.no_version(#value) };
        }
        if let Some(value) = self.no_locale {
            expr = quote! { #expr.no_locale(#value) };
        }
        if let Some(value) = self.no_sha {
            expr = quote! { #expr.no_sha(#value) };
        }
        expr
    }
}

fn error(message: &str) -> TokenStream2 {
    quote! { compile_error!(#message) }
}

/// Parse the `expires_in` attribute into a builder call
pub fn parse_expires_in_attribute(nv: &MetaNameValue) -> Result<TokenStream2, TokenStream2> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Int(lit_int) => {
                let secs = lit_int.base10_parse::<u64>().map_err(|_| {
                    error("`expires_in` must be a positive integer (seconds)")
                })?;
                Ok(quote! { .expires_in(::std::time::Duration::from_secs(#secs)) })
            }
            syn::Lit::Str(s) if s.value() == "never" => Ok(quote! { .never_expires() }),
            _ => Err(error(
                "Invalid literal for `expires_in`: expected integer (seconds) or \"never\"",
            )),
        },
        _ => Err(error(
            "Invalid syntax for `expires_in`: expected `expires_in = <integer>`",
        )),
    }
}

/// Parse a boolean flag given as `flag` or `flag = <bool>`
pub fn parse_flag_attribute(meta: &Meta) -> Result<bool, TokenStream2> {
    match meta {
        Meta::Path(_) => Ok(true),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(expr_lit) => match &expr_lit.lit {
                syn::Lit::Bool(b) => Ok(b.value),
                _ => Err(error("Invalid literal for flag: expected `true` or `false`")),
            },
            _ => Err(error("Invalid syntax for flag: expected `flag` or `flag = <bool>`")),
        },
        Meta::List(_) => Err(error("Invalid syntax for flag: expected `flag` or `flag = <bool>`")),
    }
}

/// Parse the `with_key` attribute
pub fn parse_with_key_attribute(nv: &MetaNameValue) -> Result<KeySource, TokenStream2> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Str(s) => syn::parse_str::<Ident>(&s.value())
                .map(KeySource::Field)
                .map_err(|_| error("Invalid `with_key`: expected a field name")),
            _ => Err(error("Invalid literal for `with_key`: expected string")),
        },
        Expr::Path(expr_path) => Ok(KeySource::Function(expr_path.path.clone())),
        _ => Err(error(
            "Invalid syntax for `with_key`: expected `with_key = \"field\"` or `with_key = path`",
        )),
    }
}

/// Parse an attribute whose value is a function path (`only_if`, `after_load`)
pub fn parse_path_attribute(nv: &MetaNameValue, attr: &str) -> Result<syn::Path, TokenStream2> {
    match &nv.value {
        Expr::Path(expr_path) => Ok(expr_path.path.clone()),
        _ => Err(error(&format!(
            "Invalid syntax for `{}`: expected `{} = path::to_fn`",
            attr, attr
        ))),
    }
}

/// Parse the `name` attribute
pub fn parse_name_attribute(nv: &MetaNameValue) -> Option<String> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        _ => None,
    }
}

/// Parse cached-method attributes from a token stream
pub fn parse_cached_method_attributes(
    attr: TokenStream2,
) -> Result<CachedMethodAttributes, TokenStream2> {
    use syn::parse::Parser;

    let parser = Punctuated::<Meta, Token![,]>::parse_terminated;
    let parsed_args = parser.parse2(attr).map_err(|e| {
        let msg = format!("Failed to parse attributes: {}", e);
        quote! { compile_error!(#msg) }
    })?;

    let mut attrs = CachedMethodAttributes::default();

    for meta in parsed_args {
        let path = meta.path();
        if path.is_ident("no_version") {
            attrs.no_version = Some(parse_flag_attribute(&meta)?);
        } else if path.is_ident("no_locale") {
            attrs.no_locale = Some(parse_flag_attribute(&meta)?);
        } else if path.is_ident("no_sha") {
            attrs.no_sha = Some(parse_flag_attribute(&meta)?);
        } else {
            let nv = match &meta {
                Meta::NameValue(nv) => nv,
                _ => {
                    let msg = format!(
                        "Invalid syntax for `{}`: expected `name = value`",
                        quote!(#path)
                    );
                    return Err(error(&msg));
                }
            };
            if nv.path.is_ident("expires_in") {
                attrs.expires_in = Some(parse_expires_in_attribute(nv)?);
            } else if nv.path.is_ident("with_key") {
                attrs.with_key = Some(parse_with_key_attribute(nv)?);
            } else if nv.path.is_ident("only_if") {
                attrs.only_if = Some(parse_path_attribute(nv, "only_if")?);
            } else if nv.path.is_ident("after_load") {
                attrs.after_load = Some(parse_path_attribute(nv, "after_load")?);
            } else if nv.path.is_ident("name") {
                attrs.custom_name = parse_name_attribute(nv);
            } else {
                let msg = format!("Unknown cached method attribute `{}`", quote!(#path));
                return Err(error(&msg));
            }
        }
    }

    Ok(attrs)
}

/// The non-receiver arguments of a signature.
pub struct MethodArgs {
    pub has_self: bool,
    /// Names used for the arguments in the generated companions.
    pub idents: Vec<Ident>,
    pub types: Vec<Type>,
}

impl MethodArgs {
    /// `(A, B,)`, the argument tuple type.
    pub fn tuple_type(&self) -> TokenStream2 {
        let types = &self.types;
        quote! { (#(#types,)*) }
    }

    /// `(a, b,)`, usable both as a pattern and as an expression.
    pub fn tuple(&self) -> TokenStream2 {
        let idents = &self.idents;
        quote! { (#(#idents,)*) }
    }

    /// `a: A, b: B`, the companion parameter list.
    pub fn params(&self) -> TokenStream2 {
        let idents = &self.idents;
        let types = &self.types;
        quote! { #(#idents: #types),* }
    }
}

/// Collect the arguments of `sig`. Plain identifiers keep their name (without
/// `mut`); any other pattern gets a generated one.
pub fn collect_args(sig: &Signature) -> MethodArgs {
    let mut args = MethodArgs {
        has_self: false,
        idents: Vec::new(),
        types: Vec::new(),
    };

    for (index, arg) in sig.inputs.iter().enumerate() {
        match arg {
            FnArg::Receiver(_) => args.has_self = true,
            FnArg::Typed(pat_type) => {
                let ident = match &*pat_type.pat {
                    Pat::Ident(pat_ident) => pat_ident.ident.clone(),
                    _ => format_ident!("__arg{}", index, span = Span::call_site()),
                };
                args.idents.push(ident);
                args.types.push((*pat_type.ty).clone());
            }
        }
    }

    args
}

/// Generate the builder hooks (`with_key`, `only_if`, `after_load`) for an
/// instance method.
pub fn generate_instance_hooks(attrs: &CachedMethodAttributes, args: &MethodArgs) -> TokenStream2 {
    let core = core_path();
    let tuple_type = args.tuple_type();
    let pattern = args.tuple();
    let idents = &args.idents;

    let with_key = match &attrs.with_key {
        Some(KeySource::Field(field)) => quote! {
            .with_key(#core::WithKey::attribute(|__receiver: &Self| {
                ::std::clone::Clone::clone(&__receiver.#field)
            }))
        },
        Some(KeySource::Function(path)) => quote! {
            .with_key(#core::WithKey::call(|__receiver: &Self, __args: &#tuple_type| {
                let #pattern = __args;
                #path(__receiver, #(#idents),*)
            }))
        },
        None => quote! {},
    };

    let only_if = match &attrs.only_if {
        Some(path) => quote! {
            .only_if(|__receiver: &Self, __args: &#tuple_type| {
                let #pattern = __args;
                #path(__receiver, #(#idents),*)
            })
        },
        None => quote! {},
    };

    let after_load = generate_after_load(attrs);

    quote! { #with_key #only_if #after_load }
}

/// Generate the builder hooks for a class method.
pub fn generate_class_hooks(attrs: &CachedMethodAttributes, args: &MethodArgs) -> Result<TokenStream2, TokenStream2> {
    let core = core_path();
    let tuple_type = args.tuple_type();
    let pattern = args.tuple();
    let idents = &args.idents;

    let with_key = match &attrs.with_key {
        Some(KeySource::Field(_)) => {
            return Err(error(
                "`with_key = \"field\"` needs a receiver; use `with_key = path` on class methods",
            ))
        }
        Some(KeySource::Function(path)) => quote! {
            .with_key(#core::ClassKey::call(|__args: &#tuple_type| {
                let #pattern = __args;
                #path(#(#idents),*)
            }))
        },
        None => quote! {},
    };

    let only_if = match &attrs.only_if {
        Some(path) => quote! {
            .only_if(|__args: &#tuple_type| {
                let #pattern = __args;
                #path(#(#idents),*)
            })
        },
        None => quote! {},
    };

    let after_load = generate_after_load(attrs);

    Ok(quote! { #with_key #only_if #after_load })
}

fn generate_after_load(attrs: &CachedMethodAttributes) -> TokenStream2 {
    match &attrs.after_load {
        Some(path) => quote! { .after_load(|__value| #path(__value)) },
        None => quote! {},
    }
}
