//! Parsing of `#[vet(...)]` and the `#[serde(...)]` keys that affect JSON keys.

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Token, Type};

/// Struct-level `#[vet(...)]`.
#[derive(Default)]
pub(crate) struct TypeAttrs {
    pub name: Option<LitStr>,
    pub parent: Option<Parent>,
}

pub(crate) enum Parent {
    Name(LitStr),
    Type(Type),
}

impl TypeAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("vet")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("parent") {
                    let value = meta.value()?;
                    out.parent = Some(if value.peek(LitStr) {
                        Parent::Name(value.parse()?)
                    } else {
                        Parent::Type(value.parse()?)
                    });
                } else if meta.path.is_ident("name") {
                    out.name = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("expected `parent` or `name`"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Field-level `#[vet(...)]`.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub rules: Vec<RuleAttr>,
    pub label: Option<LitStr>,
    pub display_name: Option<LitStr>,
    pub element: Option<LitStr>,
    pub skip: bool,
    pub opaque: bool,
}

impl FieldAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("vet")) {
            attr.parse_nested_meta(|meta| {
                let Some(ident) = meta.path.get_ident().map(|i| i.to_string()) else {
                    return Err(meta.error("expected a rule or field option"));
                };
                match ident.as_str() {
                    "label" => out.label = Some(meta.value()?.parse()?),
                    "display_name" => out.display_name = Some(meta.value()?.parse()?),
                    "element" => out.element = Some(meta.value()?.parse()?),
                    "skip" => out.skip = true,
                    "opaque" => out.opaque = true,
                    _ => out.rules.push(RuleAttr::parse(&ident, &meta)?),
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

enum RuleAttrKind {
    Required,
    NotNull,
    NotEmpty,
    Minimum(Expr),
    Maximum(Expr),
    Range(Expr, Expr),
    Pattern(LitStr),
    Custom(Vec<LitStr>),
}

/// One rule declared on a field.
pub(crate) struct RuleAttr {
    kind: RuleAttrKind,
    order: Option<Expr>,
    message: Option<LitStr>,
}

#[derive(Default)]
struct RuleArgs {
    keys: Vec<String>,
    order: Option<Expr>,
    message: Option<LitStr>,
    value: Option<Expr>,
    min: Option<Expr>,
    max: Option<Expr>,
    regex: Option<LitStr>,
    rules: Vec<LitStr>,
}

impl RuleArgs {
    /// `rule`, `rule = x` or `rule(key = x, ...)`.
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut args = Self::default();
        if meta.input.peek(Token![=]) {
            args.keys.push("=".to_string());
            let value = meta.value()?;
            if value.peek(LitStr) {
                args.regex = Some(value.parse()?);
            } else {
                args.value = Some(value.parse()?);
            }
        } else if meta.input.peek(syn::token::Paren) {
            meta.parse_nested_meta(|inner| {
                let Some(key) = inner.path.get_ident().map(|i| i.to_string()) else {
                    return Err(inner.error("expected an argument name"));
                };
                match key.as_str() {
                    "order" => args.order = Some(inner.value()?.parse()?),
                    "message" => args.message = Some(inner.value()?.parse()?),
                    "value" => args.value = Some(inner.value()?.parse()?),
                    "min" => args.min = Some(inner.value()?.parse()?),
                    "max" => args.max = Some(inner.value()?.parse()?),
                    "regex" => args.regex = Some(inner.value()?.parse()?),
                    "rule" => args.rules.push(inner.value()?.parse()?),
                    _ => return Err(inner.error(format!("unknown rule argument `{key}`"))),
                }
                args.keys.push(key);
                Ok(())
            })?;
        }
        Ok(args)
    }

    fn allow(&self, meta: &ParseNestedMeta, rule: &str, allowed: &[&str]) -> syn::Result<()> {
        match self
            .keys
            .iter()
            .find(|k| !matches!(k.as_str(), "order" | "message") && !allowed.contains(&k.as_str()))
        {
            Some(key) if key == "=" => Err(meta.error(format!("`{rule}` takes no value"))),
            Some(key) => Err(meta.error(format!("`{rule}` does not accept `{key}`"))),
            None => Ok(()),
        }
    }
}

impl RuleAttr {
    fn parse(rule: &str, meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut args = RuleArgs::parse(meta)?;
        let missing = |what: &str| meta.error(format!("`{rule}` requires `{what}`"));

        let kind = match rule {
            "required" => {
                args.allow(meta, rule, &[])?;
                RuleAttrKind::Required
            }
            "not_null" => {
                args.allow(meta, rule, &[])?;
                RuleAttrKind::NotNull
            }
            "not_empty" => {
                args.allow(meta, rule, &[])?;
                RuleAttrKind::NotEmpty
            }
            "minimum" | "maximum" => {
                args.allow(meta, rule, &["=", "value"])?;
                let value = args.value.take().ok_or_else(|| missing("value"))?;
                if rule == "minimum" {
                    RuleAttrKind::Minimum(value)
                } else {
                    RuleAttrKind::Maximum(value)
                }
            }
            "range" => {
                args.allow(meta, rule, &["min", "max"])?;
                let min = args.min.take().ok_or_else(|| missing("min"))?;
                let max = args.max.take().ok_or_else(|| missing("max"))?;
                RuleAttrKind::Range(min, max)
            }
            "pattern" => {
                args.allow(meta, rule, &["=", "regex"])?;
                let regex = args.regex.take().ok_or_else(|| missing("regex"))?;
                RuleAttrKind::Pattern(regex)
            }
            "custom" => {
                args.allow(meta, rule, &["rule"])?;
                if args.rules.is_empty() {
                    return Err(missing("rule = \"id\""));
                }
                RuleAttrKind::Custom(std::mem::take(&mut args.rules))
            }
            other => return Err(meta.error(format!("unknown vet rule `{other}`"))),
        };

        Ok(Self {
            kind,
            order: args.order,
            message: args.message,
        })
    }

    /// `::jsonvet::RuleSpec` constructor expression.
    pub(crate) fn to_tokens(&self) -> TokenStream {
        let spec = match &self.kind {
            RuleAttrKind::Required => quote!(::jsonvet::RuleSpec::required()),
            RuleAttrKind::NotNull => quote!(::jsonvet::RuleSpec::not_null()),
            RuleAttrKind::NotEmpty => quote!(::jsonvet::RuleSpec::not_empty()),
            RuleAttrKind::Minimum(v) => quote!(::jsonvet::RuleSpec::minimum((#v) as f64)),
            RuleAttrKind::Maximum(v) => quote!(::jsonvet::RuleSpec::maximum((#v) as f64)),
            RuleAttrKind::Range(min, max) => {
                quote!(::jsonvet::RuleSpec::range((#min) as f64, (#max) as f64))
            }
            RuleAttrKind::Pattern(regex) => quote!(::jsonvet::RuleSpec::pattern(#regex)),
            RuleAttrKind::Custom(ids) => quote!(::jsonvet::RuleSpec::custom([#(#ids),*])),
        };
        let order = self.order.as_ref().map(|o| quote!(.order(#o)));
        let message = self.message.as_ref().map(|m| quote!(.message(#m)));
        quote!(#spec #order #message)
    }
}

/// `#[serde(...)]` keys on a field.
#[derive(Default)]
pub(crate) struct SerdeField {
    pub rename: Option<String>,
    pub skip: bool,
    pub flatten: bool,
}

impl SerdeField {
    pub(crate) fn parse(attrs: &[Attribute]) -> Self {
        let mut out = Self::default();
        for meta in serde_metas(attrs) {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") || p.is_ident("skip_deserializing") => {
                    out.skip = true
                }
                Meta::Path(p) if p.is_ident("flatten") => out.flatten = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    out.rename = lit_str(&nv.value).or(out.rename);
                }
                Meta::List(list) if list.path.is_ident("rename") => {
                    out.rename = deserialize_name(list).or(out.rename);
                }
                _ => {}
            }
        }
        out
    }
}

/// `#[serde(rename_all = "...")]` on the struct.
pub(crate) fn serde_rename_all(attrs: &[Attribute]) -> Option<String> {
    let mut rule = None;
    for meta in serde_metas(attrs) {
        match &meta {
            Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                rule = lit_str(&nv.value).or(rule);
            }
            Meta::List(list) if list.path.is_ident("rename_all") => {
                rule = deserialize_name(list).or(rule);
            }
            _ => {}
        }
    }
    rule
}

fn serde_metas(attrs: &[Attribute]) -> Vec<Meta> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("serde"))
        .filter_map(|a| {
            a.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .collect()
}

fn deserialize_name(list: &syn::MetaList) -> Option<String> {
    list.parse_args_with(Punctuated::<syn::MetaNameValue, Token![,]>::parse_terminated)
        .ok()?
        .into_iter()
        .find(|nv| nv.path.is_ident("deserialize"))
        .and_then(|nv| lit_str(&nv.value))
}

fn lit_str(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value()),
        _ => None,
    }
}

/// Apply a serde `rename_all` rule to a snake_case field name.
pub(crate) fn rename_field(name: &str, rule: &str) -> Option<String> {
    let pascal = || {
        name.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<String>()
    };
    Some(match rule {
        "lowercase" => name.to_ascii_lowercase(),
        "UPPERCASE" => name.to_ascii_uppercase(),
        "PascalCase" => pascal(),
        "camelCase" => {
            let pascal = pascal();
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        "snake_case" => name.to_string(),
        "SCREAMING_SNAKE_CASE" => name.to_ascii_uppercase(),
        "kebab-case" => name.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => name.replace('_', "-").to_ascii_uppercase(),
        _ => return None,
    })
}
