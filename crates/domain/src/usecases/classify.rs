//! Rule-based classification
//!
//! A stand-in for a model: an ordered keyword table where the first rule
//! with any trigger phrase present in the text wins. Pure and synchronous.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Classification, Taxonomy};

pub const CLASSIFIER_VERSION: &str = "0.1.0";

pub const MATCH_CONFIDENCE: f64 = 0.8;
pub const NOT_IN_TAXONOMY_CONFIDENCE: f64 = 0.5;
pub const NO_MATCH_CONFIDENCE: f64 = 0.2;

/// Built-in rule table, highest priority first
const BUILTIN_RULES: &[(&[&str], &str, &str)] = &[
    (&["password", "login", "sign in"], "Accounts", "Login/Password"),
    (
        &["kyc", "verify", "verification", "identity"],
        "Accounts",
        "KYC/Verification",
    ),
    (&["transfer", "withdraw", "deposit"], "Accounts", "Transfers"),
    (
        &["pending", "filled", "cancel", "modify"],
        "Orders & Trading",
        "Modify/Cancel",
    ),
    (
        &["place order", "buy", "sell"],
        "Orders & Trading",
        "Place Order",
    ),
    (&["option"], "Products", "Options"),
    (&["etf"], "Products", "ETFs"),
    (&["stock", "share"], "Products", "Stocks"),
];

/// One row of the decision table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    triggers: Vec<String>,
    pub category: String,
    pub subcategory: String,
}

impl Rule {
    /// Create a rule. Triggers are lowercased; empty ones are dropped.
    pub fn new<I, T>(triggers: I, category: impl Into<String>, subcategory: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            triggers: triggers
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Whether any trigger occurs in already-lowercased text
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t.as_str()))
    }

    /// Every trigger occurring in already-lowercased text, in rule order
    pub fn matched_triggers<'a>(&'a self, normalized: &'a str) -> impl Iterator<Item = &'a str> {
        self.triggers
            .iter()
            .map(String::as_str)
            .filter(move |t| normalized.contains(t))
    }
}

/// The rules shipped with the classifier
pub fn default_rules() -> Vec<Rule> {
    BUILTIN_RULES
        .iter()
        .map(|(triggers, category, subcategory)| Rule::new(triggers.iter(), *category, *subcategory))
        .collect()
}

/// Valid subcategory labels per category label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyConstraint {
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl TaxonomyConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) a category with the given subcategory labels
    pub fn with_category<I, T>(mut self, category: impl Into<String>, subcategories: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.categories
            .entry(category.into())
            .or_default()
            .extend(subcategories.into_iter().map(Into::into));
        self
    }

    /// Category labels mapped to their children's labels
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        taxonomy.categories.iter().fold(Self::new(), |constraint, category| {
            constraint.with_category(
                category.label.clone(),
                category.children.iter().map(|sub| sub.label.clone()),
            )
        })
    }

    /// Build from a JSON object of `label -> [labels]`.
    ///
    /// Entries whose value is not an array are left out, non-string members
    /// are ignored, and a non-object yields an empty constraint.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::new();
        };

        object
            .iter()
            .filter_map(|(category, subs)| Some((category, subs.as_array()?)))
            .fold(Self::new(), |constraint, (category, subs)| {
                constraint.with_category(
                    category.clone(),
                    subs.iter().filter_map(Value::as_str).map(str::to_string),
                )
            })
    }

    pub fn allows(&self, category: &str, subcategory: &str) -> bool {
        self.categories
            .get(category)
            .is_some_and(|subs| subs.contains(subcategory))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

/// First-match-wins keyword classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<Rule>,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleClassifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify `text` against `constraint`. `None` is treated as empty text.
    pub fn classify(&self, text: Option<&str>, constraint: &TaxonomyConstraint) -> Classification {
        let normalized = text.unwrap_or_default().to_lowercase();

        let Some(rule) = self.rules.iter().find(|rule| rule.matches(&normalized)) else {
            return Classification::fallback(NO_MATCH_CONFIDENCE, "No keyword match");
        };

        if !constraint.allows(&rule.category, &rule.subcategory) {
            return Classification::fallback(
                NOT_IN_TAXONOMY_CONFIDENCE,
                format!(
                    "Rule not in taxonomy: {}/{}",
                    rule.category, rule.subcategory
                ),
            );
        }

        let matched: Vec<&str> = rule.matched_triggers(&normalized).collect();
        Classification {
            category: rule.category.clone(),
            subcategory: rule.subcategory.clone(),
            confidence: MATCH_CONFIDENCE,
            rationale: format!("Matched keywords: {}", matched.join(", ")),
        }
    }
}

/// Classify with the built-in rule table
pub fn classify(text: Option<&str>, constraint: &TaxonomyConstraint) -> Classification {
    RuleClassifier::default().classify(text, constraint)
}
