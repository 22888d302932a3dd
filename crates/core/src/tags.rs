//! Tag classification.

use crate::config::{self, SpecialTag, DATAPACK_TAG, HANGAR_SPECIAL_TAGS};
use serde::Serialize;

/// Disjoint partition of a project's categories and loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagClassification {
    pub loader_compatibility: Vec<String>,
    pub datapack_indicator: Vec<String>,
    pub normal_tags: Vec<String>,
}

impl TagClassification {
    /// Every token, in classification order.
    pub fn all_tokens(&self) -> impl Iterator<Item = &String> {
        self.loader_compatibility
            .iter()
            .chain(self.datapack_indicator.iter())
            .chain(self.normal_tags.iter())
    }
}

fn canonical(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Partition Modrinth `categories` and `loaders` into loaders, the datapack
/// indicator and everything else.
///
/// Tokens are trimmed and lowercased, blanks are dropped, and each token is
/// classified once no matter how many times or in which array it appears.
/// Loaders are visited before categories.
pub fn classify_modrinth_tags<S: AsRef<str>>(categories: &[S], loaders: &[S]) -> TagClassification {
    let mut result = TagClassification::default();
    let mut seen: Vec<String> = Vec::new();

    for token in loaders.iter().chain(categories.iter()) {
        let token = canonical(token.as_ref());
        if token.is_empty() || seen.contains(&token) {
            continue;
        }
        seen.push(token.clone());

        if config::loader(&token).is_some() {
            result.loader_compatibility.push(token);
        } else if token == DATAPACK_TAG {
            result.datapack_indicator.push(token);
        } else {
            result.normal_tags.push(token);
        }
    }

    result
}

/// Badges for the Hangar tags we know about. Unknown tags are dropped.
pub fn hangar_special_tags<S: AsRef<str>>(tags: &[S]) -> Vec<SpecialTag> {
    let mut badges: Vec<SpecialTag> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if let Some(special) = HANGAR_SPECIAL_TAGS
            .iter()
            .find(|s| s.token.eq_ignore_ascii_case(tag))
        {
            if !badges.contains(special) {
                badges.push(*special);
            }
        }
    }
    badges
}
