//! Keyword-based category ("faculty") and topic detection.
//!
//! Matching is plain substring containment on lowercased input. Short
//! keywords therefore also hit inside unrelated words (`ki` in `markieren`);
//! this is a known limitation of the tables, not something callers should
//! correct for.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};

use crate::config::{ClassifierSettings, KeywordEntry};
use crate::types::FALLBACK_CATEGORY;

/// Category keywords in priority order. The first hit wins.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("informatik", "Informatik"),
    ("wirtschaft", "Wirtschaftswissenschaften"),
    ("ingenieur", "Ingenieurwissenschaften"),
    ("design", "Design"),
    ("gesundheit", "Gesundheitswesen"),
    ("sozial", "Sozialwesen"),
    ("recht", "Rechtswissenschaften"),
    ("kultur", "Kulturwissenschaften"),
];

pub const DEFAULT_TOPICS: &[(&str, &str)] = &[
    ("ki", "Künstliche Intelligenz"),
    ("maschinelles lernen", "Maschinelles Lernen"),
    ("data science", "Data Science"),
    ("big data", "Big Data"),
    ("cloud computing", "Cloud Computing"),
    ("cybersicherheit", "Cybersicherheit"),
    ("blockchain", "Blockchain"),
    ("internet der dinge", "Internet der Dinge"),
    ("wirtschaftsinformatik", "Wirtschaftsinformatik"),
    ("marketing", "Marketing"),
    ("finanzen", "Finanzen"),
    ("maschinenbau", "Maschinenbau"),
    ("elektrotechnik", "Elektrotechnik"),
    ("design thinking", "Design Thinking"),
    ("gesundheitsmanagement", "Gesundheitsmanagement"),
    ("soziale arbeit", "Soziale Arbeit"),
    ("recht", "Recht"),
    ("kulturwissenschaft", "Kulturwissenschaft"),
    ("medien", "Medien"),
    ("kommunikation", "Kommunikation"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub topics: BTreeSet<String>,
}

/// Where the winning category keyword was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Path,
    Text,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    categories: Vec<(String, String)>,
    topics: Vec<(String, String)>,
    fallback: String,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(owned(DEFAULT_CATEGORIES), owned(DEFAULT_TOPICS), FALLBACK_CATEGORY.to_string())
    }
}

impl KeywordClassifier {
    /// Keywords are lowercased on construction; order is kept as given.
    pub fn new(categories: Vec<(String, String)>, topics: Vec<(String, String)>, fallback: String) -> Self {
        let lower = |v: Vec<(String, String)>| v.into_iter().map(|(k, l)| (k.to_lowercase(), l)).collect();
        Self { categories: lower(categories), topics: lower(topics), fallback }
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self::new(
            table_or_default(settings.categories.as_deref(), DEFAULT_CATEGORIES),
            table_or_default(settings.topics.as_deref(), DEFAULT_TOPICS),
            settings.fallback.clone().unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
        )
    }

    pub fn classify(&self, text: &str, relative_path: &Path) -> Classification {
        let text_lower = text.to_lowercase();
        let (category, _) = self.detect_category_lower(&text_lower, relative_path);
        Classification { category, topics: self.topics_lower(&text_lower) }
    }

    pub fn detect_category(&self, text: &str, relative_path: &Path) -> (String, MatchSource) {
        self.detect_category_lower(&text.to_lowercase(), relative_path)
    }

    fn detect_category_lower(&self, text_lower: &str, relative_path: &Path) -> (String, MatchSource) {
        let segments: Vec<String> = relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(seg) => Some(seg.to_string_lossy().to_lowercase()),
                _ => None,
            })
            .collect();
        for segment in &segments {
            if let Some(label) = self.first_category_in(segment) {
                return (label.to_string(), MatchSource::Path);
            }
        }
        if let Some(label) = self.first_category_in(text_lower) {
            return (label.to_string(), MatchSource::Text);
        }
        (self.fallback.clone(), MatchSource::Fallback)
    }

    fn first_category_in(&self, haystack: &str) -> Option<&str> {
        self.categories.iter().find(|(keyword, _)| haystack.contains(keyword.as_str())).map(|(_, label)| label.as_str())
    }

    pub fn topics(&self, text: &str) -> BTreeSet<String> { self.topics_lower(&text.to_lowercase()) }

    fn topics_lower(&self, text_lower: &str) -> BTreeSet<String> {
        self.topics
            .iter()
            .filter(|(keyword, _)| text_lower.contains(keyword.as_str()))
            .map(|(_, tag)| tag.clone())
            .collect()
    }

    /// Keyword occurrences per category label; labels without hits are left out.
    pub fn mentions(&self, text: &str) -> BTreeMap<String, usize> {
        let text_lower = text.to_lowercase();
        let mut counts = BTreeMap::new();
        for (keyword, label) in &self.categories {
            let n = text_lower.matches(keyword.as_str()).count();
            if n > 0 {
                *counts.entry(label.clone()).or_insert(0) += n;
            }
        }
        counts
    }

    /// Every label `classify` can return, fallback included.
    pub fn labels(&self) -> BTreeSet<String> {
        let mut labels: BTreeSet<String> = self.categories.iter().map(|(_, l)| l.clone()).collect();
        labels.insert(self.fallback.clone());
        labels
    }

    pub fn topic_vocabulary(&self) -> BTreeSet<String> { self.topics.iter().map(|(_, t)| t.clone()).collect() }
}

fn owned(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table.iter().map(|(k, l)| (k.to_string(), l.to_string())).collect()
}

fn table_or_default(entries: Option<&[KeywordEntry]>, default: &[(&str, &str)]) -> Vec<(String, String)> {
    match entries {
        Some(list) => list.iter().map(|e| (e.keyword.clone(), e.label.clone())).collect(),
        None => owned(default),
    }
}
