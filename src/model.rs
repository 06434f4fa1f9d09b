//! The article entity and its wire payloads.
//!
//! An article lives in one of two states, and each state is its own type:
//! [`ArticleDraft`] has no identifier and exists only in a create request;
//! [`Article`] always has one, assigned by the store. A client cannot supply
//! an id because the draft type has nowhere to put it.

use serde::{Deserialize, Serialize};

use crate::id::ArticleId;

/// A persisted article, as stored and as returned on the wire.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The create payload: everything an [`Article`] has except the identifier.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArticleDraft {
    /// Promotes the draft to a persisted article under `id`.
    pub fn into_article(self, id: ArticleId) -> Article {
        Article {
            id,
            name: self.name,
            content: self.content,
            description: self.description,
        }
    }
}

/// The update payload. Only `name` and `content` are mutable; the identifier
/// and description are left untouched by an update.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub name: String,
    pub content: String,
}

impl Article {
    /// Applies an update in place. The id never changes.
    pub fn apply(&mut self, update: ArticleUpdate) {
        self.name = update.name;
        self.content = update.content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_omitted_when_unset() {
        let article = ArticleDraft {
            name: "Hello".to_owned(),
            content: "Article Content".to_owned(),
            description: None,
        }
        .into_article("0123456789abcdef01234567".parse().unwrap());

        let json = serde_json::to_string(&article).unwrap();
        assert!(!json.contains("description"));
        assert_eq!(
            json,
            r#"{"id":"0123456789abcdef01234567","name":"Hello","content":"Article Content"}"#
        );
    }

    #[test]
    fn description_round_trips_when_set() {
        let draft: ArticleDraft =
            serde_json::from_str(r#"{"name":"a","content":"b","description":"c"}"#).unwrap();
        assert_eq!(draft.description.as_deref(), Some("c"));
    }

    #[test]
    fn draft_decode_requires_name_and_content() {
        assert!(serde_json::from_str::<ArticleDraft>(r#"{"name":"only"}"#).is_err());
        assert!(serde_json::from_str::<ArticleDraft>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<ArticleDraft>("[]").is_err());
    }

    #[test]
    fn update_touches_only_name_and_content() {
        let mut article = ArticleDraft {
            name: "old".to_owned(),
            content: "old".to_owned(),
            description: Some("kept".to_owned()),
        }
        .into_article("0123456789abcdef01234567".parse().unwrap());
        let id = article.id;

        article.apply(ArticleUpdate { name: "new".to_owned(), content: "newer".to_owned() });

        assert_eq!(article.id, id);
        assert_eq!(article.name, "new");
        assert_eq!(article.content, "newer");
        assert_eq!(article.description.as_deref(), Some("kept"));
    }
}
