use serde::{Deserialize, Serialize};

use crate::db::models::{Article, ArticleFields};

pub const NAME_MAX_CHARS: usize = 100;
pub const CONTENT_MAX_CHARS: usize = 65_536;
pub const FROM_URL_MAX_CHARS: usize = 200;
pub const PROJECT_MAX_CHARS: usize = 100;

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// Raw article form as submitted by the browser.
///
/// Every field is optional on the wire so a malformed submission still
/// reaches validation and is re-rendered with errors instead of rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub from_url: String,
    /// HTML checkbox: present when ticked, absent otherwise.
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub project: String,
}

/// Field-level validation messages. Every field is always present so
/// templates can iterate without existence checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors {
    pub name: Vec<String>,
    pub content: Vec<String>,
    pub from_url: Vec<String>,
    pub project: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.content.is_empty()
            && self.from_url.is_empty()
            && self.project.is_empty()
    }
}

impl From<&Article> for ArticleForm {
    fn from(article: &Article) -> Self {
        Self {
            name: article.name.clone(),
            content: article.content.clone(),
            from_url: article.from_url.clone().unwrap_or_default(),
            recommendation: article.recommendation.then(|| "on".to_string()),
            project: article.project.clone().unwrap_or_default(),
        }
    }
}

impl ArticleForm {
    /// Validate a creation submission.
    pub fn validate(&self) -> Result<ArticleFields, FormErrors> {
        self.clean(None)
    }

    /// Validate a change submission bound to an existing article.
    ///
    /// A blank name or content keeps the stored value; the optional fields
    /// and the checkbox are taken as submitted.
    pub fn validate_change(&self, current: &Article) -> Result<ArticleFields, FormErrors> {
        self.clean(Some(current))
    }

    fn clean(&self, current: Option<&Article>) -> Result<ArticleFields, FormErrors> {
        let mut errors = FormErrors::default();

        let name = match (self.name.trim(), current) {
            ("", Some(article)) => article.name.clone(),
            (name, _) => name.to_string(),
        };
        if name.is_empty() {
            errors.name.push("This field is required.".to_string());
        } else if let Some(msg) = too_long(&name, NAME_MAX_CHARS) {
            errors.name.push(msg);
        }

        let content = match (self.content.trim(), current) {
            ("", Some(article)) => article.content.clone(),
            (content, _) => content.to_string(),
        };
        if content.is_empty() {
            errors.content.push("This field is required.".to_string());
        } else if let Some(msg) = too_long(&content, CONTENT_MAX_CHARS) {
            errors.content.push(msg);
        }

        let from_url = non_blank(&self.from_url);
        if let Some(raw) = &from_url {
            if let Some(msg) = too_long(raw, FROM_URL_MAX_CHARS) {
                errors.from_url.push(msg);
            } else if !is_valid_url(raw) {
                errors.from_url.push("Enter a valid URL.".to_string());
            }
        }

        let project = non_blank(&self.project);
        if let Some(msg) = project.as_deref().and_then(|p| too_long(p, PROJECT_MAX_CHARS)) {
            errors.project.push(msg);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ArticleFields {
            name,
            content,
            from_url,
            recommendation: checkbox(self.recommendation.as_deref()),
            project,
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn too_long(value: &str, max: usize) -> Option<String> {
    let count = value.chars().count();
    (count > max).then(|| {
        format!("Ensure this value has at most {max} characters (it has {count}).")
    })
}

fn is_valid_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => URL_SCHEMES.contains(&parsed.scheme()) && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

fn checkbox(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !matches!(v.trim().to_lowercase().as_str(), "off" | "false" | "0"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, content: &str) -> ArticleForm {
        ArticleForm {
            name: name.to_string(),
            content: content.to_string(),
            ..ArticleForm::default()
        }
    }

    #[test]
    fn test_valid_minimal_form() {
        let fields = form("Test", "hello").validate().unwrap();
        assert_eq!(fields.name, "Test");
        assert_eq!(fields.content, "hello");
        assert_eq!(fields.from_url, None);
        assert_eq!(fields.project, None);
        assert!(!fields.recommendation);
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut f = form("  Test ", "\n body \n");
        f.project = "  alpha ".to_string();
        let fields = f.validate().unwrap();
        assert_eq!(fields.name, "Test");
        assert_eq!(fields.content, "body");
        assert_eq!(fields.project.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_required_fields_reported_together() {
        let errors = form("  ", "").validate().unwrap_err();
        assert_eq!(errors.name, vec!["This field is required."]);
        assert_eq!(errors.content, vec!["This field is required."]);
        assert!(errors.from_url.is_empty());
    }

    #[test]
    fn test_name_too_long() {
        let errors = form(&"n".repeat(NAME_MAX_CHARS + 1), "body")
            .validate()
            .unwrap_err();
        assert_eq!(errors.name.len(), 1);
        assert!(errors.name[0].contains("at most 100 characters"));
    }

    #[test]
    fn test_name_limit_counts_chars_not_bytes() {
        assert!(form(&"é".repeat(NAME_MAX_CHARS), "body").validate().is_ok());
    }

    #[test]
    fn test_from_url_validation() {
        let mut f = form("Test", "body");

        f.from_url = "https://example.com/a?b=c".to_string();
        assert_eq!(
            f.validate().unwrap().from_url.as_deref(),
            Some("https://example.com/a?b=c")
        );

        f.from_url = "not a url".to_string();
        assert_eq!(f.validate().unwrap_err().from_url, vec!["Enter a valid URL."]);

        f.from_url = "javascript:alert(1)".to_string();
        assert!(f.validate().is_err());

        f.from_url = format!("https://example.com/{}", "x".repeat(FROM_URL_MAX_CHARS));
        assert!(f.validate().unwrap_err().from_url[0].contains("at most 200"));
    }

    #[test]
    fn test_checkbox_values() {
        assert!(!checkbox(None));
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(Some("0")));
    }

    #[test]
    fn test_change_keeps_blank_required_fields() {
        let current = Article::create(
            ArticleFields {
                name: "Original".to_string(),
                content: "original body".to_string(),
                from_url: Some("https://example.com".to_string()),
                recommendation: true,
                project: Some("alpha".to_string()),
            },
            "user-1",
        );

        let fields = form("", "").validate_change(&current).unwrap();
        assert_eq!(fields.name, "Original");
        assert_eq!(fields.content, "original body");
        // optional fields and the checkbox are replaced as submitted
        assert_eq!(fields.from_url, None);
        assert_eq!(fields.project, None);
        assert!(!fields.recommendation);

        let fields = form("New name", "").validate_change(&current).unwrap();
        assert_eq!(fields.name, "New name");
        assert_eq!(fields.content, "original body");
    }

    #[test]
    fn test_form_from_article_prepopulates() {
        let article = Article::create(
            ArticleFields {
                name: "N".to_string(),
                content: "C".to_string(),
                from_url: None,
                recommendation: true,
                project: Some("p".to_string()),
            },
            "user-1",
        );
        let f = ArticleForm::from(&article);
        assert_eq!(f.name, "N");
        assert_eq!(f.from_url, "");
        assert_eq!(f.recommendation.as_deref(), Some("on"));
        assert_eq!(f.project, "p");
    }

    #[test]
    fn test_form_deserializes_without_checkbox() {
        let f: ArticleForm =
            serde_json::from_str(r#"{"name": "Test", "content": "body"}"#).unwrap();
        assert!(f.recommendation.is_none());
        assert!(f.from_url.is_empty());
    }
}
