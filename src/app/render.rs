use crate::{
    asset::asset_url,
    components::{
        AboutSection, FooterSection, HeaderNav, HomeSection, Loadable, NavState, PageModel,
        PortfolioPage, PortfolioSection, SectionId,
    },
    data::{Platform, SiteProperties},
};
use leptos::prelude::*;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

#[cfg(not(debug_assertions))]
use minify_html::{Cfg as HtmlMinCfg, minify};

pub(crate) const CSP_NONCE_TOKEN: &str = "__CSP_NONCE__";
const FALLBACK_TITLE: &str = "Portfolio";
pub(crate) const SESSION_META: &str = "portfolio-session";

#[derive(Clone, Debug, Default)]
pub(crate) struct HtmlOptions {
    pub meta: BTreeMap<String, String>,
    pub structured_data: Vec<String>,
}

pub(crate) fn wrap_html_with_options(body: &str, title: &str, opts: &HtmlOptions) -> String {
    let meta_tags = render_meta_tags(&opts.meta);
    let structured_json = opts
        .structured_data
        .iter()
        .map(|s| format!(r#"<script type="application/ld+json" nonce="{CSP_NONCE_TOKEN}">{s}</script>"#))
        .collect::<Vec<_>>()
        .join("\n  ");
    let stylesheet = asset_url("/assets/build/site.css");
    let script = asset_url("/assets/build/app.js");
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  {meta_tags}
  {structured_json}
  <link rel="stylesheet" href="{stylesheet}" />
</head>
<body>
{body}
<script type="module" src="{script}" nonce="{CSP_NONCE_TOKEN}"></script>
</body>
</html>"##,
        title = escape_html(title),
    )
}

/// Whole document. `session` is embedded so the page script can poll its own bundle.
pub(crate) fn render_page(page: PageModel, session: &str) -> String {
    let site = match &page.home {
        Loadable::Loaded(home) => Some(home.site.clone()),
        Loadable::Loading => None,
    };
    let rendered = Owner::new_root(None).with(|| view! { <PortfolioPage page=page /> }.to_html());

    let (title, mut opts) = match site.as_ref() {
        Some(site) => (
            format!("{} | {}", site.name, site.title),
            HtmlOptions {
                meta: page_meta(site),
                structured_data: vec![person_structured_data(site)],
            },
        ),
        None => (FALLBACK_TITLE.to_string(), HtmlOptions::default()),
    };
    opts.meta.insert(SESSION_META.to_string(), session.to_string());
    maybe_minify(wrap_html_with_options(&rendered, &title, &opts))
}

pub(crate) fn render_section(section: SectionId, page: PageModel) -> (String, bool) {
    Owner::new_root(None).with(|| match section {
        SectionId::Home => {
            let loaded = page.home.is_loaded();
            (view! { <HomeSection state=page.home /> }.to_html(), loaded)
        }
        SectionId::About => {
            let loaded = page.about.is_loaded();
            (view! { <AboutSection state=page.about /> }.to_html(), loaded)
        }
        SectionId::Portfolio => {
            let loaded = page.portfolio.is_loaded();
            (view! { <PortfolioSection state=page.portfolio /> }.to_html(), loaded)
        }
        SectionId::Contact => {
            let loaded = page.footer.is_loaded();
            (view! { <FooterSection state=page.footer /> }.to_html(), loaded)
        }
    })
}

pub(crate) fn render_header(brand: Option<String>, nav: NavState) -> String {
    Owner::new_root(None).with(|| view! { <HeaderNav brand=brand nav=nav /> }.to_html())
}

pub(crate) fn inject_runtime_tokens(template: &str, nonce: &str) -> String {
    template.replace(CSP_NONCE_TOKEN, nonce)
}

fn render_meta_tags(meta: &BTreeMap<String, String>) -> String {
    meta.iter()
        .map(|(k, v)| {
            let v = escape_html(v);
            if let Some(rel) = k.strip_prefix("link:") {
                return format!(r#"<link rel="{rel}" href="{v}" />"#);
            }
            let attr = if k.starts_with("og:") { "property" } else { "name" };
            format!(r#"<meta {attr}="{k}" content="{v}" />"#)
        })
        .collect::<Vec<_>>()
        .join("\n  ")
}

fn page_meta(site: &SiteProperties) -> BTreeMap<String, String> {
    let description = format!("{}, {}. Projects, skills and contact.", site.name, site.title);
    let mut m = BTreeMap::new();
    m.insert("description".to_string(), description.clone());
    m.insert("author".to_string(), site.name.clone());
    m.insert("og:description".to_string(), description);
    m.insert("og:title".to_string(), format!("{} | {}", site.name, site.title));
    m.insert("og:type".to_string(), "profile".to_string());
    m
}

fn person_structured_data(site: &SiteProperties) -> String {
    let same_as: Vec<String> = Platform::ALL
        .into_iter()
        .filter(|p| *p != Platform::Email)
        .filter_map(|p| site.profile_url(p))
        .collect();

    let mut obj = Map::new();
    obj.insert("@context".into(), json!("https://schema.org"));
    obj.insert("@type".into(), json!("Person"));
    obj.insert("name".into(), json!(site.name));
    obj.insert("jobTitle".into(), json!(site.title));
    obj.insert("email".into(), json!(format!("mailto:{}", site.email)));
    if !same_as.is_empty() {
        obj.insert("sameAs".into(), json!(same_as));
    }
    // `</` inside an inline script would close it early.
    Value::Object(obj).to_string().replace("</", "<\\/")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(not(debug_assertions))]
fn maybe_minify(html: String) -> String {
    let cfg = HtmlMinCfg {
        minify_js: true,
        minify_css: true,
        ..Default::default()
    };
    let min = minify(html.as_bytes(), &cfg);
    String::from_utf8(min).unwrap_or(html)
}

#[cfg(debug_assertions)]
fn maybe_minify(html: String) -> String {
    html
}
