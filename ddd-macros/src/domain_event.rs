use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{DeriveInput, Result, Token, Type, parse_macro_input};

/// #[derive(Event)] 宏实现
/// - 支持：`#[event(domain, integration, query, extends = Type, name = "...")]`
/// - 生成 `::ddd_domain::domain_event::Event` 实现（静态能力描述）
/// - 泛型类型标记为 parameterized，名称取 `type_name::<Self>()`
/// - `query` 只允许出现在泛型类型上，非泛型查询需通过 `extends` 声明基类型
pub(crate) fn expand(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);

    let cfg = match EventAttrConfig::from_attrs(&input.attrs) {
        Ok(cfg) => cfg,
        Err(err) => return err.to_compile_error().into(),
    };

    let parameterized = input.generics.type_params().next().is_some();

    if let Some(span) = cfg.query_span {
        if !parameterized {
            return syn::Error::new(
                span,
                "`query` requires a generic type; use `extends = DomainQuery<..>` for concrete queries",
            )
            .to_compile_error()
            .into();
        }
    }

    let ident = input.ident.clone();

    let mut caps = Vec::new();
    if cfg.domain {
        caps.push(quote! { ::ddd_domain::domain_event::EventCapabilities::DOMAIN_EVENT });
    }
    if cfg.integration {
        caps.push(quote! { ::ddd_domain::domain_event::EventCapabilities::INTEGRATION_EVENT });
    }
    if cfg.query_span.is_some() {
        caps.push(quote! { ::ddd_domain::domain_event::EventCapabilities::DOMAIN_QUERY });
    }

    let name = match (&cfg.name, parameterized) {
        (Some(lit), _) => quote! { #lit },
        (None, true) => quote! { ::std::any::type_name::<Self>() },
        (None, false) => {
            let lit = syn::LitStr::new(&ident.to_string(), ident.span());
            quote! { #lit }
        }
    };

    let mut chain = quote! { ::ddd_domain::domain_event::EventDescriptor::new(#name) };
    for cap in caps {
        chain = quote! { #chain.with_capabilities(#cap) };
    }
    if parameterized {
        chain = quote! { #chain.parameterized() };
    }
    if let Some(base) = &cfg.extends {
        chain = quote! {
            #chain.extends(<#base as ::ddd_domain::domain_event::Event>::descriptor)
        };
    }

    // 泛型类型需要显式约束自身满足 Event 的父 trait
    if parameterized {
        let (_, ty_generics, _) = input.generics.split_for_impl();
        let self_ty: Type = syn::parse_quote! { #ident #ty_generics };
        input.generics.make_where_clause().predicates.push(syn::parse_quote! {
            #self_ty: ::serde::Serialize
                + ::std::fmt::Debug
                + ::std::marker::Send
                + ::std::marker::Sync
                + 'static
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let out = quote! {
        impl #impl_generics ::ddd_domain::domain_event::Event for #ident #ty_generics #where_clause {
            fn descriptor() -> ::ddd_domain::domain_event::EventDescriptor {
                #chain
            }
        }
    };

    TokenStream::from(out)
}

// -------- parsing --------

#[derive(Default)]
struct EventAttrConfig {
    domain: bool,
    integration: bool,
    query_span: Option<proc_macro2::Span>,
    extends: Option<Type>,
    name: Option<syn::LitStr>,
}

impl EventAttrConfig {
    fn from_attrs(attrs: &[syn::Attribute]) -> Result<Self> {
        let mut cfg = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("event")) {
            let items = attr.parse_args_with(Punctuated::<EventAttrItem, Token![,]>::parse_terminated)?;
            for item in items {
                cfg.apply(item)?;
            }
        }
        Ok(cfg)
    }

    fn apply(&mut self, item: EventAttrItem) -> Result<()> {
        match item {
            EventAttrItem::Flag(key) => match key.to_string().as_str() {
                "domain" => self.domain = true,
                "integration" => self.integration = true,
                "query" => self.query_span = Some(key.span()),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown flag '{other}', expected domain/integration/query"),
                    ));
                }
            },
            EventAttrItem::Extends(key, ty) => {
                if self.extends.is_some() {
                    return Err(syn::Error::new(key.span(), "duplicate key 'extends'"));
                }
                self.extends = Some(ty);
            }
            EventAttrItem::Name(key, lit) => {
                if self.name.is_some() {
                    return Err(syn::Error::new(key.span(), "duplicate key 'name'"));
                }
                self.name = Some(lit);
            }
        }
        Ok(())
    }
}

enum EventAttrItem {
    Flag(syn::Ident),
    Extends(syn::Ident, Type),
    Name(syn::Ident, syn::LitStr),
}

impl syn::parse::Parse for EventAttrItem {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        if !input.peek(Token![=]) {
            return Ok(Self::Flag(key));
        }
        let _eq: Token![=] = input.parse()?;
        match key.to_string().as_str() {
            "extends" => Ok(Self::Extends(key, input.parse()?)),
            "name" => Ok(Self::Name(key, input.parse()?)),
            other => Err(syn::Error::new(
                key.span(),
                format!("unknown key '{other}', expected extends/name"),
            )),
        }
    }
}
