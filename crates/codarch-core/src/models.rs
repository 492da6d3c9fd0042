//! Snippet records and the field rules every write must pass.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{CodarchError, Result};

pub const TITLE_MIN_LEN: usize = 4;
pub const TITLE_MAX_LEN: usize = 40;
pub const CODE_MIN_LEN: usize = 6;
pub const CODE_MAX_LEN: usize = 5000;
pub const VERSION_MIN: i64 = 1;
pub const VERSION_MAX: i64 = 999;
pub const DEFAULT_VERSION: u16 = 1;

/// Languages a snippet may be filed under.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    Markdown,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::JavaScript,
        Language::Python,
        Language::Html,
        Language::Css,
        Language::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Markdown => "Markdown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// A stored snippet, as returned to API callers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: Uuid,
    pub title: String,
    pub language: Language,
    pub code: String,
    pub version: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    /// Build a fresh record with a new id; both timestamps are `now`.
    pub fn new(fields: NewSnippet) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            language: fields.language,
            code: fields.code,
            version: fields.version,
            author: fields.author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated patch and move `updated_at` strictly forward.
    pub fn apply(&mut self, patch: SnippetPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(version) = patch.version {
            self.version = version;
        }
        if let Some(author) = patch.author {
            self.author = Some(author);
        }
        self.touch();
    }

    fn touch(&mut self) {
        let now = now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Raw snippet fields as they arrive in a request body.
///
/// Absent and `null` fields are both treated as "not supplied".
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SnippetInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Fields for a new snippet, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnippet {
    pub title: String,
    pub language: Language,
    pub code: String,
    pub version: u16,
    pub author: Option<String>,
}

/// Fields to change on an existing snippet, already validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub language: Option<Language>,
    pub code: Option<String>,
    pub version: Option<u16>,
    pub author: Option<String>,
}

impl SnippetInput {
    /// Validate for creation: title, language and code are required.
    pub fn into_new(self) -> Result<NewSnippet> {
        let mut violations = Vec::new();

        if self.title.is_none() {
            violations.push("title: is required".to_string());
        }
        if self.language.is_none() {
            violations.push("language: is required".to_string());
        }
        if self.code.is_none() {
            violations.push("code: is required".to_string());
        }

        let patch = self.check(&mut violations);
        if !violations.is_empty() {
            return Err(CodarchError::Validation(violations));
        }

        match patch {
            SnippetPatch {
                title: Some(title),
                language: Some(language),
                code: Some(code),
                version,
                author,
            } => Ok(NewSnippet {
                title,
                language,
                code,
                version: version.unwrap_or(DEFAULT_VERSION),
                author,
            }),
            _ => Err(CodarchError::Validation(vec![
                "title, language and code are required".to_string(),
            ])),
        }
    }

    /// Validate for update: only supplied fields are checked.
    pub fn into_patch(self) -> Result<SnippetPatch> {
        let mut violations = Vec::new();
        let patch = self.check(&mut violations);
        if violations.is_empty() {
            Ok(patch)
        } else {
            Err(CodarchError::Validation(violations))
        }
    }

    fn check(self, violations: &mut Vec<String>) -> SnippetPatch {
        let title = self.title.and_then(|raw| {
            let title = raw.trim().to_string();
            let len = title.chars().count();
            if (TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
                Some(title)
            } else {
                violations.push(format!(
                    "title: must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters (got {len})"
                ));
                None
            }
        });

        let language = self
            .language
            .and_then(|raw| match raw.trim().parse::<Language>() {
                Ok(language) => Some(language),
                Err(err) => {
                    let allowed: Vec<&str> = Language::ALL.iter().map(Language::as_str).collect();
                    violations.push(format!(
                        "language: {err}, expected one of {}",
                        allowed.join(", ")
                    ));
                    None
                }
            });

        let code = self.code.and_then(|code| {
            let len = code.chars().count();
            if (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&len) {
                Some(code)
            } else {
                violations.push(format!(
                    "code: must be between {CODE_MIN_LEN} and {CODE_MAX_LEN} characters (got {len})"
                ));
                None
            }
        });

        let version = self.version.and_then(|version| {
            if (VERSION_MIN..=VERSION_MAX).contains(&version) {
                u16::try_from(version).ok()
            } else {
                violations.push(format!(
                    "version: must be between {VERSION_MIN} and {VERSION_MAX} (got {version})"
                ));
                None
            }
        });

        SnippetPatch {
            title,
            language,
            code,
            version,
            author: self.author,
        }
    }
}
