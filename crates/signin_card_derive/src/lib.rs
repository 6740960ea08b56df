use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `signin_card::form::FormModel` for a struct with named fields.
///
/// For `struct SignInValues { email: String }` this generates a
/// `SignInValuesFields` accessor with one method per field returning a
/// zero-sized `SignInValuesEmailLens`, and the ordered list of declared keys.
#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "FormModel can only be derived for non-generic structs",
        ));
    }

    let model_ident = input.ident;
    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "FormModel needs named fields to build field keys",
                ));
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "FormModel can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "FormModel can only be derived for structs",
            ));
        }
    };

    let form = form_path();
    let fields_struct_ident = format_ident!("{model_ident}Fields");
    let mut lens_defs = Vec::with_capacity(named_fields.len());
    let mut accessors = Vec::with_capacity(named_fields.len());
    let mut keys = Vec::with_capacity(named_fields.len());

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.to_string();
        let lens_ident = format_ident!("{model_ident}{}Lens", to_pascal_case(&field_name));

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
            pub struct #lens_ident;

            impl #form::FieldLens<#model_ident> for #lens_ident {
                type Value = #field_ty;

                fn key(self) -> #form::FieldKey {
                    #form::FieldKey::new(#field_name)
                }

                fn get<'a>(self, model: &'a #model_ident) -> &'a Self::Value {
                    &model.#field_ident
                }

                fn set(self, model: &mut #model_ident, value: Self::Value) {
                    model.#field_ident = value;
                }
            }
        });

        accessors.push(quote! {
            pub const fn #field_ident(&self) -> #lens_ident {
                #lens_ident
            }
        });

        keys.push(quote!(#form::FieldKey::new(#field_name)));
    }

    Ok(quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#accessors)*
        }

        impl #form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_keys() -> &'static [#form::FieldKey] {
                const KEYS: &[#form::FieldKey] = &[#(#keys),*];
                KEYS
            }
        }

        #(#lens_defs)*
    })
}

fn form_path() -> TokenStream2 {
    match crate_name("signin_card") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident::form)
        }
        Ok(FoundCrate::Itself) => quote!(crate::form),
        Err(_) => quote!(::signin_card::form),
    }
}

fn to_pascal_case(input: &str) -> String {
    input
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
