use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, ReturnType};

// Import shared utilities
use cachette_macro_utils::{
    collect_args, generate_class_hooks, generate_instance_hooks, parse_cached_method_attributes,
    core_path, CachedMethodAttributes, MethodArgs,
};

/// Parse macro attributes, or return the `compile_error!` describing why not
fn parse_attributes(attr: TokenStream) -> Result<CachedMethodAttributes, TokenStream2> {
    parse_cached_method_attributes(attr.into())
}

fn compile_error(message: &str) -> TokenStream {
    TokenStream::from(quote! { compile_error!(#message); })
}

/// Reject signatures the generated companions cannot forward to.
fn check_signature(input: &ItemFn, needs_receiver: bool) -> Result<(), TokenStream> {
    let sig = &input.sig;
    if sig.asyncness.is_some() {
        return Err(compile_error("cached methods cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(compile_error("cached methods cannot be generic"));
    }

    let receiver = sig.inputs.iter().find_map(|arg| match arg {
        FnArg::Receiver(receiver) => Some(receiver),
        FnArg::Typed(_) => None,
    });
    match (receiver, needs_receiver) {
        (Some(receiver), true) if receiver.reference.is_some() && receiver.mutability.is_none() => {
            Ok(())
        }
        (_, true) => Err(compile_error("#[caches_method] requires a `&self` receiver")),
        (Some(_), false) => Err(compile_error(
            "#[caches_class_method] applies to associated functions without a receiver; use #[caches_method]",
        )),
        (None, false) => Ok(()),
    }
}

struct Companions {
    via_cache: syn::Ident,
    clear_cache: syn::Ident,
    binder: syn::Ident,
    name: String,
    ret_type: TokenStream2,
}

fn companions(input: &ItemFn, attrs: &CachedMethodAttributes) -> Companions {
    let ident = &input.sig.ident;
    Companions {
        via_cache: format_ident!("{}_via_cache", ident),
        clear_cache: format_ident!("clear_cache_{}", ident),
        binder: format_ident!("__cachette_{}_binder", ident),
        name: attrs
            .custom_name
            .clone()
            .unwrap_or_else(|| ident.to_string()),
        ret_type: match &input.sig.output {
            ReturnType::Type(_, ty) => quote! { #ty },
            ReturnType::Default => quote! { () },
        },
    }
}

/// Caches a `&self` method through the type's [`CachedClass`].
///
/// The method itself is left untouched. Two companions are generated next to
/// it:
///
/// - `<name>_via_cache(&self, args..) -> Result<V, CacheError>`, the caching
///   front: per-object memo first, then the store, then the method.
/// - `clear_cache_<name>(&self, args..) -> Result<bool, CacheError>`, which
///   drops the memo slot and deletes the store entry.
///
/// # Requirements
///
/// - **Receiver type**: Must implement `Cacheable` (key identity and memo) and
///   `CacheHost` (the `CachedClass` holding name, store and default options)
/// - **Arguments**: Owned types implementing `Clone`
/// - **Return type**: Must implement `Serialize + DeserializeOwned + Clone`
///
/// # Macro Parameters
///
/// - `expires_in` (optional): Entry lifetime in seconds, or `"never"`.
///   Default: the class default, else one day.
/// - `no_version`, `no_locale`, `no_sha` (optional): Leave the key version or
///   the locale out of the key, or skip hashing. Written as a bare flag or
///   `flag = <bool>`. The locale is left out unless `no_locale = false`.
/// - `with_key` (optional): `"field"` keys on a field of the receiver;
///   `path::to_fn` keys on `fn(&Self, &A1, ..) -> impl ToCacheKey`.
///   Default: `Cacheable::cache_id`. Arguments are not part of the key unless
///   a function includes them.
/// - `only_if` (optional): `fn(&Self, &A1, ..) -> bool`; when false the method
///   runs directly and the store is not touched.
/// - `after_load` (optional): `fn(&V)`, called with freshly computed values.
/// - `name` (optional): Method name used in store keys. Default: the function
///   name.
///
/// # Examples
///
/// ```ignore
/// use cachette::{caches_method, CacheHost, CacheKey, Cacheable, CachedClass, InstanceMemo};
/// use once_cell::sync::Lazy;
///
/// struct Product {
///     id: u64,
///     sku: String,
///     base_price: f64,
///     memo: InstanceMemo,
/// }
///
/// impl Cacheable for Product {
///     fn cache_id(&self) -> CacheKey {
///         CacheKey::scalar(self.id)
///     }
///     fn cache_memo(&self) -> &InstanceMemo {
///         &self.memo
///     }
/// }
///
/// impl CacheHost for Product {
///     fn cache_class() -> &'static CachedClass {
///         static CLASS: Lazy<CachedClass> = Lazy::new(|| CachedClass::new("Product"));
///         &CLASS
///     }
/// }
///
/// impl Product {
///     #[caches_method(expires_in = 3600, with_key = "sku")]
///     fn compute_price(&self) -> f64 {
///         self.base_price * 1.21
///     }
/// }
///
/// let price = product.compute_price_via_cache()?;
/// product.clear_cache_compute_price()?;
/// ```
#[proc_macro_attribute]
pub fn caches_method(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_attributes(attr) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };

    let input = parse_macro_input!(item as ItemFn);
    if let Err(err) = check_signature(&input, true) {
        return err;
    }

    let vis = &input.vis;
    let ident = &input.sig.ident;
    let args: MethodArgs = collect_args(&input.sig);
    let Companions {
        via_cache,
        clear_cache,
        binder,
        name,
        ret_type,
    } = companions(&input, &attrs);

    let tuple_type = args.tuple_type();
    let tuple = args.tuple();
    let params = args.params();
    let idents = &args.idents;
    let options = attrs.options_expr();
    let hooks = generate_instance_hooks(&attrs, &args);
    let core = core_path();
    let via_doc = format!("Cached front of [`Self::{}`].", ident);
    let clear_doc = format!("Clears the cached result of [`Self::{}`].", ident);

    let expanded = quote! {
        #input

        #[doc(hidden)]
        fn #binder() -> #core::Result<
            #core::CachedInstanceMethod<Self, #tuple_type, #ret_type>
        > {
            <Self as #core::CacheHost>::cache_class()
                .caches_method(#name, |__receiver: &Self, __args: &#tuple_type| {
                    let #tuple = ::std::clone::Clone::clone(__args);
                    __receiver.#ident(#(#idents),*)
                })
                .options(#options)
                #hooks
                .build()
        }

        #[doc = #via_doc]
        #vis fn #via_cache(&self, #params) -> ::std::result::Result<#ret_type, #core::CacheError> {
            Self::#binder()?.call(self, #tuple)
        }

        #[doc = #clear_doc]
        #vis fn #clear_cache(&self, #params) -> ::std::result::Result<bool, #core::CacheError> {
            Self::#binder()?.clear(self, #tuple)
        }
    };

    TokenStream::from(expanded)
}

/// Caches an associated function (no receiver) through the type's
/// [`CachedClass`].
///
/// Generates `<name>_via_cache(args..) -> Result<V, CacheError>` and
/// `clear_cache_<name>(args..) -> Result<bool, CacheError>`. There is no memo:
/// results are shared through the store only, under
/// `<Class>:class:<name>:<digest>`.
///
/// Accepts the same parameters as [`macro@caches_method`], except that
/// `with_key` must be a path to `fn(&A1, ..) -> impl ToCacheKey` and `only_if`
/// a path to `fn(&A1, ..) -> bool`. By default the key is the argument list,
/// so arguments must implement `ToCacheKey` as well as `Clone`.
///
/// # Examples
///
/// ```ignore
/// use cachette::{caches_class_method, CacheHost};
///
/// impl Product {
///     #[caches_class_method(expires_in = "never", no_locale = false)]
///     fn best_sellers(category: String, limit: usize) -> Vec<u64> {
///         query_best_sellers(&category, limit)
///     }
/// }
///
/// let ids = Product::best_sellers_via_cache("books".to_string(), 10)?;
/// ```
#[proc_macro_attribute]
pub fn caches_class_method(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_attributes(attr) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };

    let input = parse_macro_input!(item as ItemFn);
    if let Err(err) = check_signature(&input, false) {
        return err;
    }

    let vis = &input.vis;
    let ident = &input.sig.ident;
    let args = collect_args(&input.sig);
    let Companions {
        via_cache,
        clear_cache,
        binder,
        name,
        ret_type,
    } = companions(&input, &attrs);

    let tuple_type = args.tuple_type();
    let tuple = args.tuple();
    let params = args.params();
    let idents = &args.idents;
    let options = attrs.options_expr();
    let hooks = match generate_class_hooks(&attrs, &args) {
        Ok(hooks) => hooks,
        Err(err) => return err.into(),
    };
    let core = core_path();
    let via_doc = format!("Cached front of [`Self::{}`].", ident);
    let clear_doc = format!("Clears the cached result of [`Self::{}`].", ident);

    let expanded = quote! {
        #input

        #[doc(hidden)]
        fn #binder() -> #core::Result<
            #core::CachedClassMethod<#tuple_type, #ret_type>
        > {
            <Self as #core::CacheHost>::cache_class()
                .caches_class_method(#name, |__args: &#tuple_type| {
                    let #tuple = ::std::clone::Clone::clone(__args);
                    Self::#ident(#(#idents),*)
                })
                .options(#options)
                #hooks
                .build()
        }

        #[doc = #via_doc]
        #vis fn #via_cache(#params) -> ::std::result::Result<#ret_type, #core::CacheError> {
            Self::#binder()?.call(#tuple)
        }

        #[doc = #clear_doc]
        #vis fn #clear_cache(#params) -> ::std::result::Result<bool, #core::CacheError> {
            Self::#binder()?.clear(#tuple)
        }
    };

    TokenStream::from(expanded)
}
