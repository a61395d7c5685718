//! Built-in page layouts.
//!
//! Layouts are compiled [maud](https://maud.lambda.xyz/) templates, not a
//! template language. A document picks one with front matter `layout`:
//!
//! | Layout | Renders |
//! |---|---|
//! | `base` | page shell around the document body (the default) |
//! | `article` | title, date and tags above the body |
//! | `listing` | body followed by links to the collection named by `list` |
//!
//! ## Aliases
//!
//! `[layouts]` in `site.toml` maps alternate names to built-in layouts
//! (`post = "article"` by default). The alias table is consulted first, then
//! the built-in names. Anything else fails the build.

use crate::config::SiteSection;
use crate::types::Document;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Unknown layout '{0}'")]
    Unknown(String),
    #[error("{document} uses the listing layout without a `list` collection")]
    MissingList { document: PathBuf },
    #[error("{document} lists unknown collection '{name}'")]
    UnknownCollection { document: PathBuf, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Base,
    Article,
    Listing,
}

impl Layout {
    pub const NAMES: &'static [&'static str] = &["base", "article", "listing"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "base" => Some(Self::Base),
            "article" => Some(Self::Article),
            "listing" => Some(Self::Listing),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Article => "article",
            Self::Listing => "listing",
        }
    }
}

/// Resolve a front matter `layout` value through the alias table.
pub fn resolve(name: Option<&str>, aliases: &BTreeMap<String, String>) -> Result<Layout, LayoutError> {
    let Some(name) = name else {
        return Ok(Layout::Base);
    };
    let target = aliases.get(name).map(String::as_str).unwrap_or(name);
    Layout::from_name(target).ok_or_else(|| LayoutError::Unknown(name.to_string()))
}

/// Everything a layout needs to render one page.
pub struct Page<'a> {
    pub site: &'a SiteSection,
    pub document: &'a Document,
    /// Rendered markdown body.
    pub content: &'a str,
    /// Members of the `list` collection, for the listing layout.
    pub listing: &'a [&'a Document],
}

pub fn render_page(layout: Layout, page: &Page) -> Markup {
    let body = PreEscaped(page.content);
    let main = match layout {
        Layout::Base => html! {
            main.page { (body) }
        },
        Layout::Article => html! {
            main.page {
                article {
                    header.article-header {
                        h1 { (page.document.title) }
                        @if let Some(date) = &page.document.front_matter.date {
                            time datetime=(date) { (date) }
                        }
                        @if !page.document.front_matter.tags.is_empty() {
                            ul.tags {
                                @for tag in &page.document.front_matter.tags {
                                    li { (tag) }
                                }
                            }
                        }
                    }
                    (body)
                }
            }
        },
        Layout::Listing => html! {
            main.page {
                (body)
                ul.listing {
                    @for doc in page.listing {
                        li {
                            @if let Some(date) = &doc.front_matter.date {
                                time datetime=(date) { (date) }
                                " "
                            }
                            a href=(doc.url) { (doc.title) }
                        }
                    }
                }
            }
        },
    };
    base_document(page, main)
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(page: &Page, main: Markup) -> Markup {
    let title = if page.document.title == page.site.title {
        page.site.title.clone()
    } else {
        format!("{} · {}", page.document.title, page.site.title)
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for href in &page.site.stylesheets {
                    link rel="stylesheet" href=(href);
                }
            }
            body {
                (site_header(page.site))
                (main)
            }
        }
    }
}

fn site_header(site: &SiteSection) -> Markup {
    html! {
        header.site-header {
            a href="/" { (site.title) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrontMatter;

    fn aliases() -> BTreeMap<String, String> {
        BTreeMap::from([("post".to_string(), "article".to_string())])
    }

    fn document(title: &str) -> Document {
        Document {
            source: PathBuf::from("post.md"),
            output: PathBuf::from("post/index.html"),
            url: "/post/".to_string(),
            slug: "post".to_string(),
            title: title.to_string(),
            front_matter: FrontMatter {
                date: Some("2024-03-01".into()),
                tags: vec!["rust".into(), "cli".into()],
                ..FrontMatter::default()
            },
            body: String::new(),
        }
    }

    fn site() -> SiteSection {
        SiteSection {
            title: "Notes".into(),
            stylesheets: vec!["/assets/css/main.css".into()],
        }
    }

    #[test]
    fn resolve_defaults_to_base() {
        assert_eq!(resolve(None, &aliases()).unwrap(), Layout::Base);
    }

    #[test]
    fn resolve_builtin_and_alias() {
        assert_eq!(resolve(Some("listing"), &aliases()).unwrap(), Layout::Listing);
        assert_eq!(resolve(Some("post"), &aliases()).unwrap(), Layout::Article);
    }

    #[test]
    fn resolve_unknown_is_error() {
        let err = resolve(Some("layouts/post.njk"), &aliases()).unwrap_err();
        assert!(matches!(err, LayoutError::Unknown(ref n) if n == "layouts/post.njk"));
    }

    #[test]
    fn names_round_trip() {
        for name in Layout::NAMES {
            assert_eq!(Layout::from_name(name).unwrap().name(), *name);
        }
    }

    #[test]
    fn base_document_includes_doctype_and_stylesheets() {
        let site = site();
        let doc = document("Hello");
        let page = Page {
            site: &site,
            document: &doc,
            content: "<p>hi</p>",
            listing: &[],
        };
        let html = render_page(Layout::Base, &page).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/assets/css/main.css">"#));
        assert!(html.contains("<title>Hello · Notes</title>"));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn article_shows_date_and_tags() {
        let site = site();
        let doc = document("Hello");
        let page = Page {
            site: &site,
            document: &doc,
            content: "",
            listing: &[],
        };
        let html = render_page(Layout::Article, &page).into_string();
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains(r#"<time datetime="2024-03-01">2024-03-01</time>"#));
        assert!(html.contains("<li>cli</li>"));
    }

    #[test]
    fn listing_links_members() {
        let site = site();
        let index = document("Home");
        let post = document("First <post>");
        let members = [&post];
        let page = Page {
            site: &site,
            document: &index,
            content: "<p>Latest</p>",
            listing: &members,
        };
        let html = render_page(Layout::Listing, &page).into_string();
        assert!(html.contains(r#"<a href="/post/">First &lt;post&gt;</a>"#));
    }

    #[test]
    fn title_not_repeated_when_equal_to_site_title() {
        let site = site();
        let doc = document("Notes");
        let page = Page {
            site: &site,
            document: &doc,
            content: "",
            listing: &[],
        };
        let html = render_page(Layout::Base, &page).into_string();
        assert!(html.contains("<title>Notes</title>"));
    }
}
