use proc_macro::TokenStream;
use quote::quote;
use syn::LitStr;

/// Identifier reserved for wildcard listeners, see `event_bus::WILDCARD`.
const WILDCARD: &str = "*";

/// Derive macro for BusEvent. It sets `BusEvent::NAME` to the type's identifier or to the value
/// of the `#[event(name = "...")]` attribute.
///
/// # Examples
/// ``` no_run
/// use event_bus::BusEvent;
/// use event_bus_macros::Event;
///
/// #[derive(Event)]
/// #[event(name = "data")]
/// struct Data {
///    foo: u32,
/// }
///
/// #[derive(Event)]
/// struct Close;
///
/// assert_eq!(Data::NAME, "data");
/// assert_eq!(Close::NAME, "Close");
/// ```
///
/// Generic events are accepted, their parameters must be `'static`:
/// ```
/// use event_bus::BusEvent;
/// use event_bus_macros::Event;
///
/// #[derive(Event)]
/// #[event(name = "wrapped")]
/// struct Wrapped<T>(T);
///
/// assert_eq!(<Wrapped<u8>>::NAME, "wrapped");
/// ```
///
/// `*` is reserved for wildcard listeners:
/// ```compile_fail
/// use event_bus_macros::Event;
///
/// #[derive(Event)]
/// #[event(name = "*")]
/// struct Everything;
/// ```
///
/// `name` is the only supported attribute key:
/// ```compile_fail
/// use event_bus_macros::Event;
///
/// #[derive(Event)]
/// #[event(label = "x")]
/// struct Labelled;
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn event_bus_event_derive(input: TokenStream) -> TokenStream {
    let ast: syn::DeriveInput =
        syn::parse(input).expect("failed to parse input into a DeriveInput");

    match impl_bus_event(&ast) {
        Ok(gen) => gen.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn impl_bus_event(ast: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let generics = static_generics(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let name = &ast.ident;
    let event_name = event_name(ast)?;

    Ok(quote! {
        impl #impl_generics event_bus::BusEvent for #name #ty_generics #where_clause {
            const NAME: &'static str = #event_name;
        }
    })
}

/// `BusEvent` requires `'static`, so every generic parameter of the event gets a `'static` bound.
fn static_generics(generics: &syn::Generics) -> syn::Generics {
    let mut generics = generics.clone();
    let params = generics.params.clone();
    let where_clause = generics.make_where_clause();

    for param in params {
        match param {
            syn::GenericParam::Type(ty) => {
                let ident = ty.ident;
                where_clause.predicates.push(syn::parse_quote!(#ident: 'static));
            }
            syn::GenericParam::Lifetime(lt) => {
                let lifetime = lt.lifetime;
                where_clause.predicates.push(syn::parse_quote!(#lifetime: 'static));
            }
            syn::GenericParam::Const(_) => {}
        }
    }

    generics
}

/// Reads `#[event(name = "...")]`, falling back to the type's identifier.
fn event_name(ast: &syn::DeriveInput) -> syn::Result<LitStr> {
    let mut event_name = None;

    for attr in ast.attrs.iter().filter(|attr| attr.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("name") {
                return Err(meta.error("unsupported event attribute, expected `name`"));
            }

            let value: LitStr = meta.value()?.parse()?;
            if value.value() == WILDCARD {
                return Err(syn::Error::new(
                    value.span(),
                    "`*` is reserved for wildcard listeners",
                ));
            }

            event_name = Some(value);
            Ok(())
        })?;
    }

    Ok(event_name.unwrap_or_else(|| LitStr::new(&ast.ident.to_string(), ast.ident.span())))
}
