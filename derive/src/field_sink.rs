use std::collections::HashMap;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_field_sink(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FieldSink` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FieldSink` may only be derived on structs with named fields.",
        ))?
    };

    let mut cases: HashMap<String, FieldMetadata> = HashMap::new();
    let mut diagnostic: Option<(Ident, Container)> = None;

    for field in &fields.named {
        if let Some(metadata) = FieldMetadata::parse(field)? {
            let tag = metadata.tag.clone();
            let existing = cases.insert(tag.to_string(), metadata);

            if existing.is_some() {
                Err(Error::new_spanned(tag, "Field tags must be unique."))?
            }
        }

        if let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("diagnostic")) {
            attr.meta.require_path_only()?;

            let existing = diagnostic.replace(parse_diagnostic_field(field)?);

            if existing.is_some() {
                Err(Error::new_spanned(
                    attr,
                    "Only one field may receive diagnostics.",
                ))?
            }
        }
    }

    let mut cases = cases.into_values().collect::<Vec<_>>();
    cases.sort_by_key(|f| f.tag.to_string());
    let cases = cases.iter().map(FieldMetadata::case);

    let add_field = quote! {
        fn add_field(&mut self, field: ::baos::sink::Field<'_>) {
            match field.tag {
                #(#cases)*
                _ => {}
            };
        }
    };

    let add_diagnostic = diagnostic.map(|(name, container)| {
        let assignment = match container {
            Container::Option => quote! { self.#name = Some(diagnostic) },
            Container::Vec => quote! { self.#name.push(diagnostic) },
        };

        quote! {
            fn add_diagnostic(&mut self, diagnostic: ::baos::sink::Diagnostic) {
                #assignment;
            }
        }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::baos::sink::FieldSink for #name #ty_generics #where_clause {
            #add_field
            #add_diagnostic
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    tag: Ident,
    container: Container,
    value_type: Type,
    handler: Option<(Type, ExprClosure)>,
}

/// How a field without a handler stores received values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Option,
    Vec,
}

impl Container {
    fn of(ident: &Ident) -> Option<Self> {
        if ident == "Option" {
            Some(Self::Option)
        } else if ident == "Vec" {
            Some(Self::Vec)
        } else {
            None
        }
    }
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let FieldAttribute { tag, handler } = attr.meta.require_list()?.parse_args()?;

        let (container, value_type) = if let Some(handler) = &handler {
            let Some(parameter) = handler.inputs.iter().nth(1) else {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            };

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with the expected value type.",
                ))?
            };

            // Unused with a handler.
            (Container::Option, (*pat_type.ty).clone())
        } else {
            let (container, inner_type) = generic_container(&field.ty)?;

            let Some(container) = Container::of(&container) else {
                Err(Error::new_spanned(
                    &container,
                    "Field without a handler must have type `Option<T>` or `Vec<T>`.",
                ))?
            };

            (container, inner_type)
        };

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            tag,
            container,
            value_type,
            handler,
        }))
    }

    fn case(&self) -> impl ToTokens {
        let Self {
            name,
            tag,
            container,
            value_type,
            handler,
        } = self;

        let assignment = if let Some((field_type, handler)) = handler {
            let body = &handler.body;
            let mut inputs = handler.inputs.iter();
            let acc = inputs.next();
            let val = inputs.next();

            quote! {
                (|#acc: &mut #field_type, #val| {#body})(&mut self.#name, value)
            }
        } else {
            match container {
                Container::Option => quote! { self.#name = Some(value) },
                Container::Vec => quote! { self.#name.push(value) },
            }
        };

        quote! {
            ::baos::sink::Tag::#tag => {
                if let Some(value) =
                    <#value_type as ::baos::sink::FromValue>::from_value(&field.value)
                {
                    #assignment
                }
            }
        }
    }
}

fn parse_diagnostic_field(field: &Field) -> Result<(Ident, Container)> {
    let Some(name) = field.ident.clone() else {
        Err(Error::new_spanned(field, "Field must be named."))?
    };

    let (container, _) = generic_container(&field.ty)?;

    let Some(container) = Container::of(&container) else {
        Err(Error::new_spanned(
            &container,
            "Diagnostic field must have type `Option<Diagnostic>` or `Vec<Diagnostic>`.",
        ))?
    };

    Ok((name, container))
}

/// Split a type of the form `C<T>` into `C` and `T`.
fn generic_container(ty: &Type) -> Result<(Ident, Type)> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, "Field must have a type annotation."))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(
            &path.path.segments,
            "Field must have a type annotation.",
        ))?
    };

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            "Field type must have a generic parameter.",
        ))?
    };

    let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            "Generic argument of the field type must be a type.",
        ))?
    };

    Ok((segment.ident.clone(), inner_type.clone()))
}

#[derive(Debug)]
struct FieldAttribute {
    tag: Ident,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let tag = input.parse::<Ident>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { tag, handler })
    }
}
