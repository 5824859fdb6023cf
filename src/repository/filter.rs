//! List filters and pagination shared by every repository backend

use bson::{doc, DateTime, Document};
use regex::{Regex, RegexBuilder};

use crate::types::QuireError;

/// One page of a listing, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of documents to skip before this page starts
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Inclusive creation-time bounds; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime>,
    pub end: Option<DateTime>,
}

impl DateRange {
    pub fn contains(&self, at: Option<DateTime>) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(at) = at else {
            return false;
        };
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }

    fn to_document(self) -> Option<Document> {
        let mut range = Document::new();
        if let Some(start) = self.start {
            range.insert("$gte", start);
        }
        if let Some(end) = self.end {
            range.insert("$lte", end);
        }
        (!range.is_empty()).then_some(range)
    }
}

/// Keyword and date filters common to all list endpoints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Literal text matched case-insensitively against the entity's text fields
    pub keywords: Option<String>,
    pub created: DateRange,
}

impl ListFilter {
    /// Keywords as an escaped regex pattern (user input is never a regex)
    fn keyword_pattern(&self) -> Option<String> {
        self.keywords
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(regex::escape)
    }

    /// Extend a MongoDB filter with keyword (`$or` over `fields`) and date clauses
    pub fn apply_to(&self, mut filter: Document, fields: &[&str]) -> Document {
        if let Some(pattern) = self.keyword_pattern() {
            let clauses: Vec<Document> = fields
                .iter()
                .map(|field| doc! { *field: { "$regex": pattern.as_str(), "$options": "i" } })
                .collect();
            filter.insert("$or", clauses);
        }

        if let Some(range) = self.created.to_document() {
            filter.insert("metadata.created_at", range);
        }

        filter
    }

    /// In-process equivalent of [`ListFilter::apply_to`]
    pub fn matcher(&self) -> Result<Matcher, QuireError> {
        let keywords = match self.keyword_pattern() {
            Some(pattern) => Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| QuireError::Internal(format!("Bad keyword pattern: {e}")))?,
            ),
            None => None,
        };

        Ok(Matcher {
            keywords,
            created: self.created,
        })
    }
}

/// Compiled form of a [`ListFilter`]
pub struct Matcher {
    keywords: Option<Regex>,
    created: DateRange,
}

impl Matcher {
    pub fn matches(&self, fields: &[&str], created_at: Option<DateTime>) -> bool {
        let keyword_hit = match &self.keywords {
            Some(re) => fields.iter().any(|f| re.is_match(f)),
            None => true,
        };
        keyword_hit && self.created.contains(created_at)
    }
}

/// Partial update for a category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub title: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }

    pub fn to_set(&self) -> Document {
        let mut set = Document::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        set
    }
}

/// Partial update for a blog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl BlogPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    pub fn to_set(&self) -> Document {
        let mut set = Document::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        set
    }
}
