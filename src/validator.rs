//! Turning the model's text into a list of article records.
//!
//! Two tiers of problems:
//! - the text is not JSON, or not one of the two accepted shapes: the whole
//!   answer is replaced by a single sentinel record
//! - an individual record lacks `title`, `author` or `link`: a [`FieldWarning`]
//!   is logged and the record is kept exactly as it was
//!
//! Only the answer's shape can fail it. Entries inside the list are never
//! rejected, whatever they hold.
//!
//! [`validate`] never fails.

use crate::error::ParseError;
use crate::models::{ArticleRecord, FieldWarning};
use crate::utils::{looks_truncated, truncate_for_log};
use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use url::Url;

/// Key under which a wrapped answer carries its list.
pub const ARTICLES_KEY: &str = "articles";

/// The two answer shapes the model is allowed to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// A bare JSON array.
    ArticleList(Vec<Value>),
    /// An object holding the list under [`ARTICLES_KEY`].
    WrappedArticleList(Map<String, Value>),
}

impl ModelOutput {
    /// Classify a parsed answer.
    pub fn detect(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Array(items) => Ok(Self::ArticleList(items)),
            Value::Object(map) if map.contains_key(ARTICLES_KEY) => {
                Ok(Self::WrappedArticleList(map))
            }
            _ => Err(ParseError::UnexpectedFormat),
        }
    }

    /// The list itself; a wrapped value that is not an array is rejected.
    pub fn into_items(self) -> Result<Vec<Value>, ParseError> {
        match self {
            Self::ArticleList(items) => Ok(items),
            Self::WrappedArticleList(mut map) => match map.remove(ARTICLES_KEY) {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(ParseError::NotAList),
            },
        }
    }
}

/// Records plus the warnings raised while checking them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Validated {
    pub articles: Vec<ArticleRecord>,
    pub warnings: Vec<FieldWarning>,
}

/// Strict form: parse and shape-check, reporting the first hard error.
///
/// # Arguments
///
/// * `raw` - the completion text, exactly as the model returned it
///
/// # Returns
///
/// Every list entry as an [`ArticleRecord`], in the model's order, plus a
/// [`FieldWarning`] per entry that lacks a required key.
///
/// # Errors
///
/// [`ParseError::InvalidJson`] when `raw` is not JSON,
/// [`ParseError::UnexpectedFormat`] when it is neither a list nor an object
/// keyed by `"articles"`, and [`ParseError::NotAList`] when that key does not
/// hold a list.
pub fn parse_articles(raw: &str) -> Result<Validated, ParseError> {
    let value: Value = serde_json::from_str(raw).map_err(ParseError::InvalidJson)?;
    let items = ModelOutput::detect(value)?.into_items()?;

    let articles: Vec<ArticleRecord> = items.into_iter().map(ArticleRecord::from).collect();

    let warnings = check_fields(&articles);
    Ok(Validated { articles, warnings })
}

/// Lenient form: any hard error becomes a one-element sentinel list.
pub fn validate_with_warnings(raw: &str) -> Validated {
    match parse_articles(raw) {
        Ok(v) => {
            info!(
                count = v.articles.len(),
                warnings = v.warnings.len(),
                "Successfully parsed JSON"
            );
            v
        }
        Err(e) => {
            match &e {
                ParseError::InvalidJson(json_err) => error!(
                    error = %json_err,
                    truncated = looks_truncated(json_err),
                    raw_preview = %truncate_for_log(raw, 500),
                    "Error decoding JSON response"
                ),
                other => error!(error = %other, "Validation error"),
            }
            Validated {
                articles: vec![ArticleRecord::from(&e)],
                warnings: Vec::new(),
            }
        }
    }
}

/// Validate the model's answer into records. Never fails.
pub fn validate(raw: &str) -> Vec<ArticleRecord> {
    validate_with_warnings(raw).articles
}

fn check_fields(articles: &[ArticleRecord]) -> Vec<FieldWarning> {
    let mut warnings = Vec::new();
    for (index, article) in articles.iter().enumerate() {
        let missing = article.missing_fields();
        if !missing.is_empty() {
            warn!(
                index,
                missing = %missing.iter().join(", "),
                article = ?article,
                "Article missing expected keys"
            );
            warnings.push(FieldWarning { index, missing });
        }
        if let Some(link) = article.link() {
            if Url::parse(link).is_err() {
                warn!(index, %link, "Article link is not an absolute URL");
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn only_sentinel(out: &[ArticleRecord]) -> &ArticleRecord {
        assert_eq!(out.len(), 1);
        assert!(out[0].is_sentinel());
        &out[0]
    }

    #[test]
    fn test_not_json_gives_parse_sentinel() {
        let out = validate("not json");
        assert_eq!(
            out,
            vec![ArticleRecord::new(
                "Error: Could not parse AI response",
                "System",
                "#"
            )]
        );
    }

    #[test]
    fn test_wrapped_list() {
        let out = validate(r#"{"articles": [{"title":"A","author":"bob","link":"http://x"}]}"#);
        assert_eq!(out, vec![ArticleRecord::new("A", "bob", "http://x")]);
    }

    #[test]
    fn test_bare_list_matches_wrapped() {
        let bare = validate(r#"[{"title":"A","author":"bob","link":"http://x"}]"#);
        let wrapped = validate(r#"{"articles": [{"title":"A","author":"bob","link":"http://x"}]}"#);
        assert_eq!(bare, wrapped);
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!([{"title":"A","author":"bob","link":"http://x"}])
        );
    }

    #[test]
    fn test_missing_author_kept_with_warning() {
        let v = validate_with_warnings(r#"[{"title":"A","link":"http://x"}]"#);
        assert_eq!(v.articles.len(), 1);
        assert!(!v.articles[0].has_field("author"));
        assert_eq!(
            serde_json::to_value(&v.articles).unwrap(),
            json!([{"title":"A","link":"http://x"}])
        );
        assert_eq!(
            v.warnings,
            vec![FieldWarning {
                index: 0,
                missing: vec!["author"]
            }]
        );
    }

    #[test]
    fn test_scalar_is_format_error() {
        let out = validate("42");
        let r = only_sentinel(&out);
        assert_eq!(r.display_title(), "Error: Unexpected response format");
    }

    #[test]
    fn test_object_without_key_is_format_error() {
        let out = validate(r#"{"foo":1}"#);
        assert!(only_sentinel(&out).display_title().starts_with("Error:"));
    }

    #[test]
    fn test_wrapped_non_list_is_format_error() {
        let out = validate(r#"{"articles": {"title":"A"}}"#);
        assert_eq!(
            only_sentinel(&out).display_title(),
            "Error: Parsed JSON is not a list."
        );
    }

    #[test]
    fn test_non_object_entry_is_passed_through() {
        let v = validate_with_warnings(r#"[{"title":"A","author":"b","link":"http://x"}, 7]"#);
        assert_eq!(
            serde_json::to_value(&v.articles).unwrap(),
            json!([{"title":"A","author":"b","link":"http://x"}, 7])
        );
        assert_eq!(
            v.warnings,
            vec![FieldWarning {
                index: 1,
                missing: vec!["title", "author", "link"]
            }]
        );
    }

    #[test]
    fn test_non_string_field_keeps_other_records() {
        let v = validate_with_warnings(
            r#"[{"title":"A","author":"bob","link":"http://x"},{"title":42,"author":"c","link":"http://y"}]"#,
        );
        assert_eq!(v.articles.len(), 2);
        assert_eq!(v.articles[0], ArticleRecord::new("A", "bob", "http://x"));
        assert!(!v.articles[1].is_sentinel());
        assert_eq!(v.articles[1].display_title(), "42");
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn test_null_author_is_present_and_kept() {
        let v = validate_with_warnings(r#"[{"title":"A","author":null,"link":"http://x"}]"#);
        assert!(v.warnings.is_empty());
        assert_eq!(
            serde_json::to_value(&v.articles).unwrap(),
            json!([{"title":"A","author":null,"link":"http://x"}])
        );
    }

    #[test]
    fn test_records_come_back_exactly_as_given() {
        let list = json!([
            {"title":"A","author":null,"link":"http://x"},
            {"title":42,"author":"c","link":"http://y"},
            {"title":"B","author":"d","link":"https://z","points":12,"tags":["rust"]},
            {"title":"C","link":"http://w"},
        ]);
        let bare = validate(&list.to_string());
        assert_eq!(serde_json::to_value(&bare).unwrap(), list);

        let wrapped = validate(&json!({"articles": list.clone()}).to_string());
        assert_eq!(serde_json::to_value(&wrapped).unwrap(), list);
    }

    #[test]
    fn test_empty_list_is_empty() {
        let v = validate_with_warnings(r#"{"articles": []}"#);
        assert!(v.articles.is_empty());
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn test_truncated_json_is_parse_error() {
        let out = validate(r#"{"articles": [{"title": "A"#);
        assert_eq!(
            only_sentinel(&out).display_title(),
            "Error: Could not parse AI response"
        );
    }

    #[test]
    fn test_detect_shapes() {
        assert!(matches!(
            ModelOutput::detect(json!([])),
            Ok(ModelOutput::ArticleList(_))
        ));
        assert!(matches!(
            ModelOutput::detect(json!({"articles": []})),
            Ok(ModelOutput::WrappedArticleList(_))
        ));
        assert!(matches!(
            ModelOutput::detect(json!(null)),
            Err(ParseError::UnexpectedFormat)
        ));
    }

    #[test]
    fn test_relative_link_is_not_a_field_warning() {
        let v = validate_with_warnings(r#"[{"title":"A","author":"b","link":"item?id=1"}]"#);
        assert!(v.warnings.is_empty());
        assert_eq!(v.articles[0].link(), Some("item?id=1"));
    }
}
