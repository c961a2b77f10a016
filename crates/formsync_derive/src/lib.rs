use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Implements `formsync::form::FromFormData` for a struct with named fields.
///
/// Each field is read from the entry of the same name through
/// `FromFormValue`; `#[form(rename = "...")]` reads a different entry.
#[proc_macro_derive(FromFormData, attributes(form))]
pub fn derive_from_form_data(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "FromFormData derive currently supports only non-generic structs",
        ));
    }

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return Err(syn::Error::new(
                    Span::call_site(),
                    "FromFormData derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "FromFormData derive is only supported on structs",
            ));
        }
    };

    let formsync = formsync_path();
    let model_ident = input.ident;
    let mut initializers = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let key = renamed_key(&field.attrs)?.unwrap_or_else(|| field_ident.to_string());
        let field_ty = field.ty;
        initializers.push(quote! {
            #field_ident: <#field_ty as #formsync::form::FromFormValue>::from_form_value(
                #key,
                data.get(#key),
            )?
        });
    }

    Ok(quote! {
        impl #formsync::form::FromFormData for #model_ident {
            fn from_form_data(
                data: &#formsync::form::FormData,
            ) -> ::core::result::Result<Self, #formsync::form::FormDataError> {
                ::core::result::Result::Ok(Self {
                    #(#initializers,)*
                })
            }
        }
    })
}

fn renamed_key(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut renamed = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("form")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                renamed = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"`"))
            }
        })?;
    }
    Ok(renamed)
}

fn formsync_path() -> TokenStream2 {
    match crate_name("formsync") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::formsync),
    }
}
