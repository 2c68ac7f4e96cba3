//! Sort registry: opaque sort codes resolved to backend sort directives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One backend sort directive. Order within a list defines tie-break
/// priority; the first directive is primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDirective {
    /// Backend field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Ascending directive.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending directive.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse the backend's `-field` / `field` shorthand.
    pub fn parse(shorthand: &str) -> Option<Self> {
        let shorthand = shorthand.trim();
        match shorthand.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Self::desc(field)),
            None if shorthand.is_empty() => None,
            None => Some(Self::asc(shorthand)),
        }
    }

    /// Backend shorthand: `-field` for descending, `field` for ascending.
    pub fn to_param(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.field, direction)
    }
}

/// A selectable sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    /// Opaque code exposed in the URL.
    pub code: String,
    /// Human-readable label.
    pub label: String,
    /// Directives, never empty.
    pub directives: Vec<SortDirective>,
}

/// Fixed, ordered mapping from sort codes to directive lists.
///
/// This is the only place backend sort field names appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRegistry {
    entries: Vec<SortEntry>,
    default_code: Option<String>,
    fallback: Vec<SortDirective>,
}

impl SortRegistry {
    /// Create a registry whose last-resort resolution is `fallback`.
    pub fn new(fallback: SortDirective) -> Self {
        Self {
            entries: Vec::new(),
            default_code: None,
            fallback: vec![fallback],
        }
    }

    /// Register a code. `directives` uses the `-field` shorthand.
    ///
    /// Directives that do not parse are skipped; an entry left with no
    /// directives is not registered.
    pub fn with_entry(mut self, code: &str, label: &str, directives: &[&str]) -> Self {
        let directives: Vec<SortDirective> =
            directives.iter().filter_map(|d| SortDirective::parse(d)).collect();
        if directives.is_empty() {
            tracing::debug!(code, "sort entry without directives ignored");
            return self;
        }

        self.entries.retain(|entry| entry.code != code);
        self.entries.push(SortEntry {
            code: code.to_string(),
            label: label.to_string(),
            directives,
        });
        self
    }

    /// Code used when the URL carries no code or an unknown one.
    pub fn with_default(mut self, code: &str) -> Self {
        self.default_code = Some(code.to_string());
        self
    }

    /// Registered entries, in registration order.
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    /// Look up a registered code.
    pub fn get(&self, code: &str) -> Option<&SortEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    /// Whether `code` is registered.
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// The default entry, if the default code is registered.
    pub fn default_entry(&self) -> Option<&SortEntry> {
        self.default_code.as_deref().and_then(|code| self.get(code))
    }

    /// Resolve a code to its directives. Never empty.
    pub fn resolve(&self, code: Option<&str>) -> &[SortDirective] {
        code.and_then(|code| self.get(code))
            .or_else(|| self.default_entry())
            .map(|entry| entry.directives.as_slice())
            .unwrap_or(self.fallback.as_slice())
    }
}
