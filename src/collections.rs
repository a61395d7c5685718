//! Named document collections.
//!
//! Each `[collections.NAME]` table in `site.toml` defines a filtered, ordered
//! list of documents. Listing pages (`layout = "listing"`, `list = "NAME"`)
//! render them.
//!
//! Membership:
//! - drafts are left out unless `include_drafts = true`
//! - with `tag` set, only documents carrying that tag
//!
//! Order: date ascending, undated documents first, ties broken by source path.
//! Drafts left out of a collection are still rendered as pages.

use crate::config::CollectionConfig;
use crate::types::Document;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub name: String,
    /// Indices into the manifest's document list, in collection order.
    pub members: Vec<usize>,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

pub fn build_collections(
    documents: &[Document],
    configs: &BTreeMap<String, CollectionConfig>,
) -> BTreeMap<String, Collection> {
    configs
        .iter()
        .map(|(name, config)| (name.clone(), build_collection(name, documents, config)))
        .collect()
}

fn build_collection(name: &str, documents: &[Document], config: &CollectionConfig) -> Collection {
    let mut members: Vec<usize> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| is_member(doc, config))
        .map(|(i, _)| i)
        .collect();
    members.sort_by(|&a, &b| {
        let (a, b) = (&documents[a], &documents[b]);
        a.front_matter
            .date
            .cmp(&b.front_matter.date)
            .then_with(|| a.source.cmp(&b.source))
    });
    Collection {
        name: name.to_string(),
        members,
    }
}

pub fn is_member(document: &Document, config: &CollectionConfig) -> bool {
    if document.is_draft() && !config.include_drafts {
        return false;
    }
    match &config.tag {
        Some(tag) => document.has_tag(tag),
        None => true,
    }
}
