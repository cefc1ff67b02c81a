use proc_macro::TokenStream;
use quote::quote;

#[derive(Clone, PartialEq, Eq)]
enum FieldId {
    Named(syn::Ident),
    Index(syn::Index),
}

impl FieldId {
    /// Name the field is registered under unless renamed
    fn default_name(&self) -> String {
        match self {
            Self::Named(ident) => ident.to_string(),
            Self::Index(index) => index.index.to_string(),
        }
    }
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    is_const: bool,
    opaque: bool,
    rename: Option<syn::LitStr>,
}

impl FieldAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("reflect")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("const") {
                    parsed.is_const = true;
                } else if meta.path.is_ident("opaque") {
                    parsed.opaque = true;
                } else if meta.path.is_ident("rename") {
                    parsed.rename = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("expected `skip`, `const`, `opaque` or `rename`"));
                }

                Ok(())
            })?;
        }

        Ok(parsed)
    }
}

struct Field {
    id: FieldId,
    name: String,
    is_const: bool,
    opaque: bool,
}

fn create_meta_fields<'a, I: Iterator<Item = &'a syn::Field>>(fields: I) -> syn::Result<Vec<Field>> {
    let mut new_fields = Vec::new();

    for (index, field) in fields.enumerate() {
        let attrs = FieldAttrs::parse(&field.attrs)?;

        if attrs.skip {
            continue;
        }

        let id = match field.ident.as_ref() {
            Some(ident) => FieldId::Named(ident.clone()),
            None => FieldId::Index(syn::Index::from(index)),
        };

        let name = match attrs.rename {
            Some(rename) => rename.value(),
            None => id.default_name(),
        };

        new_fields.push(Field {
            id,
            name,
            is_const: attrs.is_const,
            opaque: attrs.opaque,
        });
    }

    Ok(new_fields)
}

struct MetaType {
    ident: syn::Ident,
    aliases: Vec<syn::LitStr>,
    fields: Vec<Field>,
}

impl MetaType {
    fn new(input: &syn::DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "Reflect can't be derived for generic types",
            ));
        }

        let fields = match &input.data {
            syn::Data::Struct(syn::DataStruct { fields, .. }) => match fields {
                syn::Fields::Named(named) => create_meta_fields(named.named.iter())?,
                syn::Fields::Unnamed(unnamed) => create_meta_fields(unnamed.unnamed.iter())?,
                syn::Fields::Unit => Vec::new(),
            },
            syn::Data::Enum(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Reflect can't be derived for enums",
                ))
            }
            syn::Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Reflect can't be derived for unions",
                ))
            }
        };

        let mut aliases: Vec<syn::LitStr> = Vec::new();

        for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("reflect")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    aliases.push(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `name`"))
                }
            })?;
        }

        Ok(Self {
            ident: input.ident.clone(),
            aliases,
            fields,
        })
    }
}

mod gen {
    use quote::quote;

    use super::{Field, FieldId, MetaType};

    fn create_member_registration(ty_ident: &syn::Ident, field: &Field) -> proc_macro2::TokenStream {
        let name = &field.name;

        let field_tokens = match &field.id {
            FieldId::Named(ident) => quote! {#ident},
            FieldId::Index(index) => quote! {#index},
        };

        let descriptor = match field.is_const {
            true => quote! {::dynrefl::member!(const #ty_ident, #field_tokens)},
            false => quote! {::dynrefl::member!(#ty_ident, #field_tokens)},
        };

        match field.opaque {
            true => quote! {.register_opaque_member(#name, #descriptor)},
            false => quote! {.register_member(#name, #descriptor)},
        }
    }

    pub fn create_register_members_body(meta: &MetaType) -> proc_macro2::TokenStream {
        let registrations = meta
            .fields
            .iter()
            .map(|field| create_member_registration(&meta.ident, field));

        let aliases = &meta.aliases;

        quote! {
            builder
                #(#registrations)*
                #(.named(#aliases))*
        }
    }
}

/// Derives `dynrefl::Reflect`, registering every field of a struct as a member
///
/// Fields are registered under their names (tuple struct fields under `"0"`, `"1"`, ...).
/// Field attributes:
/// - `#[reflect(skip)]`: don't register
/// - `#[reflect(const)]`: register as const member
/// - `#[reflect(opaque)]`: register without setter, for types that are not `Clone`
/// - `#[reflect(rename = "name")]`: register under another name
///
/// Container attribute `#[reflect(name = "Alias")]` adds a name for registry lookups.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn reflect_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    let meta = match MetaType::new(&ast) {
        Ok(meta) => meta,
        Err(error) => return error.to_compile_error().into(),
    };

    let ty_ident = &meta.ident;
    let body = gen::create_register_members_body(&meta);

    quote! {
        #[automatically_derived]
        impl ::dynrefl::Reflect for #ty_ident {
            fn register_members(
                builder: ::dynrefl::ReflectionBuilder<'_, Self>,
            ) -> ::dynrefl::ReflectionBuilder<'_, Self> {
                #body
            }
        }
    }
    .into()
}
