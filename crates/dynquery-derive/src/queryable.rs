use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields, LitStr};

// derive_queryable
pub fn derive_queryable(input: TokenStream) -> TokenStream {
    match expand(input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: TokenStream) -> Result<TokenStream, Error> {
    let input: DeriveInput = syn::parse2(input)?;
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Queryable cannot be derived for generic types",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(Error::new_spanned(
                    other,
                    "Queryable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                ident,
                "Queryable can only be derived for structs with named fields",
            ))
        }
    };

    let mut members = Vec::new();
    for field in named {
        let options = FieldOptions::parse(field)?;
        if !options.skip {
            members.push((field, options.name));
        }
    }

    let type_name = ident.to_string();

    let field_infos = members.iter().map(|(field, name)| {
        let ty = &field.ty;
        quote! {
            ::dynquery_core::reflect::FieldInfo {
                name: #name,
                shape: <#ty as ::dynquery_core::reflect::Reflect>::shape,
            }
        }
    });

    let field_arms = members.iter().enumerate().map(|(index, (field, _))| {
        let member = &field.ident;
        quote! {
            #index => Some(&self.#member as &dyn ::dynquery_core::reflect::Reflect),
        }
    });

    let field_mut_arms = members.iter().enumerate().map(|(index, (field, _))| {
        let member = &field.ident;
        quote! {
            #index => Some(&mut self.#member as &mut dyn ::dynquery_core::reflect::Reflect),
        }
    });

    Ok(quote! {
        const _: () = {
            static INFO: ::dynquery_core::reflect::RecordInfo = ::dynquery_core::reflect::RecordInfo {
                name: #type_name,
                fields: &[#(#field_infos),*],
            };

            impl ::dynquery_core::reflect::Reflect for #ident {
                fn shape() -> ::dynquery_core::reflect::Shape {
                    ::dynquery_core::reflect::Shape::Record(&INFO)
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn reflect(&self) -> ::dynquery_core::reflect::ReflectRef<'_> {
                    ::dynquery_core::reflect::ReflectRef::Record(self)
                }

                fn reflect_mut(&mut self) -> ::dynquery_core::reflect::ReflectMut<'_> {
                    ::dynquery_core::reflect::ReflectMut::Record(self)
                }

                fn assign(&mut self, source: &dyn ::dynquery_core::reflect::Reflect) -> bool {
                    ::dynquery_core::reflect::assign_from(self, source)
                }
            }

            impl ::dynquery_core::reflect::Record for #ident {
                fn record_info(&self) -> &'static ::dynquery_core::reflect::RecordInfo {
                    &INFO
                }

                fn field(&self, index: usize) -> Option<&dyn ::dynquery_core::reflect::Reflect> {
                    match index {
                        #(#field_arms)*
                        _ => None,
                    }
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> Option<&mut dyn ::dynquery_core::reflect::Reflect> {
                    match index {
                        #(#field_mut_arms)*
                        _ => None,
                    }
                }
            }
        };
    })
}

///
/// FieldOptions
///

struct FieldOptions {
    name: String,
    skip: bool,
}

impl FieldOptions {
    fn parse(field: &Field) -> Result<Self, Error> {
        let mut name = field
            .ident
            .as_ref()
            .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
            .unwrap_or_default();
        let mut skip = false;

        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("query")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() || value.value().contains('.') {
                        return Err(meta.error("rename must be a non-empty name without '.'"));
                    }
                    name = value.value();
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename = \"...\"` or `skip`"))
                }
            })?;
        }

        Ok(Self { name, skip })
    }
}
