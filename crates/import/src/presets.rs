use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;

use moneta_core::{BankTransaction, CategoryKind};

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse presets: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid pattern {pattern:?} for field {field:?}: {source}")]
    Pattern {
        field: String,
        pattern: String,
        source: regex::Error,
    },
}

/// Classification a preset applies when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresetLabel {
    pub note: String,
    pub category: String,
    pub kind: CategoryKind,
}

/// A declarative rule: every condition must hold for the label to apply.
///
/// Conditions map a transaction field name to a pattern matched
/// case-insensitively from the start of the field's text, so `albert`
/// matches "Albert Heijn 1342" but not "Foodmarket Albert".
#[derive(Debug, Clone, Deserialize)]
pub struct PresetRule {
    pub conditions: BTreeMap<String, String>,
    pub label: PresetLabel,
}

/// Preset file layout: expense rules first, then income rules. Within each
/// table, declaration order is match order.
#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    expenses: Vec<PresetRule>,
    #[serde(default)]
    incomes: Vec<PresetRule>,
}

/// A rule paired with its precompiled condition regexes.
#[derive(Debug)]
struct CompiledPreset {
    rule: PresetRule,
    conditions: Vec<(String, Regex)>,
}

impl CompiledPreset {
    fn is_match(&self, tx: &BankTransaction) -> bool {
        self.conditions
            .iter()
            .all(|(field, regex)| regex.is_match(&tx.field_text(field)))
    }
}

/// The user's preset rules, in match order.
#[derive(Debug)]
pub struct PresetBook {
    presets: Vec<CompiledPreset>,
}

impl PresetBook {
    /// Compiles the rules. A pattern that does not compile fails the whole
    /// load rather than silently never matching.
    pub fn from_rules(rules: Vec<PresetRule>) -> Result<Self, PresetError> {
        let mut presets = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut conditions = Vec::with_capacity(rule.conditions.len());
            for (field, pattern) in &rule.conditions {
                let regex = RegexBuilder::new(&format!("^(?:{pattern})"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| PresetError::Pattern {
                        field: field.clone(),
                        pattern: pattern.clone(),
                        source,
                    })?;
                conditions.push((field.clone(), regex));
            }
            presets.push(CompiledPreset { rule, conditions });
        }
        Ok(Self { presets })
    }

    pub fn from_toml(content: &str) -> Result<Self, PresetError> {
        let file: PresetFile = toml::from_str(content)?;
        let mut rules = file.expenses;
        rules.extend(file.incomes);
        Self::from_rules(rules)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// The first rule whose every condition matches, in declaration order.
    pub fn matches(&self, tx: &BankTransaction) -> Option<&PresetRule> {
        self.presets
            .iter()
            .find(|preset| preset.is_match(tx))
            .map(|preset| &preset.rule)
    }

    pub fn rules(&self) -> impl Iterator<Item = &PresetRule> {
        self.presets.iter().map(|preset| &preset.rule)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Labels naming a category absent from `known_names`. These rules
    /// would fail at transfer time, so callers report them up front.
    pub fn unknown_categories(&self, known_names: &[&str]) -> Vec<&str> {
        let mut unknown: Vec<&str> = Vec::new();
        for rule in self.rules() {
            let name = rule.label.category.as_str();
            if !known_names.contains(&name) && !unknown.contains(&name) {
                unknown.push(name);
            }
        }
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moneta_core::{Direction, Money};

    fn tx(name: &str, direction: Direction) -> BankTransaction {
        BankTransaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            name: name.to_string(),
            counterparty: "NL99EFGH0002".to_string(),
            amount: Money::from_cents(1250),
            direction,
            notifications: "Pasvolgnr: 001".to_string(),
        }
    }

    fn rule(conditions: &[(&str, &str)], category: &str) -> PresetRule {
        PresetRule {
            conditions: conditions
                .iter()
                .map(|(f, p)| (f.to_string(), p.to_string()))
                .collect(),
            label: PresetLabel {
                note: format!("{category} note"),
                category: category.to_string(),
                kind: CategoryKind::Expense,
            },
        }
    }

    #[test]
    fn matches_case_insensitively_from_the_start() {
        let book = PresetBook::from_rules(vec![rule(&[("name", "albert")], "Groceries")]).unwrap();
        assert!(book.matches(&tx("ALBERT HEIJN 1342", Direction::Debit)).is_some());
        assert!(book.matches(&tx("Foodmarket Albert", Direction::Debit)).is_none());
    }

    #[test]
    fn all_conditions_must_hold() {
        let book = PresetBook::from_rules(vec![rule(
            &[("name", "albert"), ("debit/credit", "debit")],
            "Groceries",
        )])
        .unwrap();
        assert!(book.matches(&tx("Albert Heijn", Direction::Debit)).is_some());
        assert!(book.matches(&tx("Albert Heijn", Direction::Credit)).is_none());
    }

    #[test]
    fn first_match_wins() {
        let book = PresetBook::from_rules(vec![
            rule(&[("name", "albert")], "Groceries"),
            rule(&[("name", "albert")], "Snacks"),
        ])
        .unwrap();
        let matched = book.matches(&tx("Albert Heijn", Direction::Debit)).unwrap();
        assert_eq!(matched.label.category, "Groceries");
    }

    #[test]
    fn missing_field_reads_as_empty() {
        // An empty pattern accepts empty input; a non-empty one does not.
        let accepts_empty = PresetBook::from_rules(vec![rule(&[("iban", "")], "Misc")]).unwrap();
        assert!(accepts_empty.matches(&tx("Shop", Direction::Debit)).is_some());

        let needs_text = PresetBook::from_rules(vec![rule(&[("iban", "NL")], "Misc")]).unwrap();
        assert!(needs_text.matches(&tx("Shop", Direction::Debit)).is_none());
    }

    #[test]
    fn regex_patterns_are_supported() {
        let book =
            PresetBook::from_rules(vec![rule(&[("name", r"(albert|jumbo)")], "Groceries")])
                .unwrap();
        assert!(book.matches(&tx("Jumbo Utrecht", Direction::Debit)).is_some());
        assert!(book.matches(&tx("Lidl", Direction::Debit)).is_none());
    }

    #[test]
    fn invalid_pattern_fails_the_load() {
        let err = PresetBook::from_rules(vec![rule(&[("name", "(unclosed")], "Broken")])
            .unwrap_err();
        assert!(matches!(err, PresetError::Pattern { .. }));
    }

    #[test]
    fn toml_expenses_come_before_incomes() {
        let book = PresetBook::from_toml(
            r#"
            [[incomes]]
            label = { note = "salary", category = "Salary", kind = "income" }
            [incomes.conditions]
            name = "acme"

            [[expenses]]
            label = { note = "groceries", category = "Groceries", kind = "expense" }
            [expenses.conditions]
            name = "acme"
            "#,
        )
        .unwrap();

        // Both rules match; the expense table is consulted first.
        let matched = book.matches(&tx("Acme", Direction::Debit)).unwrap();
        assert_eq!(matched.label.category, "Groceries");
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn unknown_categories_are_reported() {
        let book = PresetBook::from_rules(vec![
            rule(&[("name", "a")], "Groceries"),
            rule(&[("name", "b")], "Gold Bars"),
        ])
        .unwrap();
        assert_eq!(book.unknown_categories(&["Groceries", "Rent"]), vec!["Gold Bars"]);
    }
}
