// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Type definitions for RouterOS replies

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Attribute that may repeat inside one block, collecting every value
pub const ABOUT: &str = ".about";

/// Reply word opening a block of a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlWord {
    Re,
    Trap,
    Done,
    Fatal,
}

impl ControlWord {
    /// Recognizes a control word (exact, case-sensitive match)
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "!re" => Some(Self::Re),
            "!trap" => Some(Self::Trap),
            "!done" => Some(Self::Done),
            "!fatal" => Some(Self::Fatal),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Re => "!re",
            Self::Trap => "!trap",
            Self::Done => "!done",
            Self::Fatal => "!fatal",
        }
    }

    /// `!done` and `!fatal` end a reply
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Fatal)
    }
}

impl fmt::Display for ControlWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of one `!re`, `!trap` or `!done` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    #[serde(flatten)]
    values: BTreeMap<String, String>,
    #[serde(rename = ".about", skip_serializing_if = "Vec::is_empty")]
    about: Vec<String>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a single-valued attribute
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key) || (key == ABOUT && !self.about.is_empty())
    }

    /// All `.about` values in arrival order
    #[must_use]
    pub fn about(&self) -> &[String] {
        &self.about
    }

    /// Number of distinct attribute names, `.about` counting once
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() + usize::from(!self.about.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn push_about(&mut self, value: String) {
        self.about.push(value);
    }

    /// Stores `key`, returning the previous value when it differs
    pub(crate) fn insert(&mut self, key: String, value: String) -> Option<String> {
        match self.values.get(&key) {
            Some(existing) if *existing != value => Some(existing.clone()),
            Some(_) => None,
            None => {
                self.values.insert(key, value);
                None
            }
        }
    }
}

/// Structured reply: one entry per control word actually observed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedReply {
    #[serde(rename = "!re", skip_serializing_if = "Option::is_none")]
    pub re: Option<Vec<Attributes>>,
    #[serde(rename = "!trap", skip_serializing_if = "Option::is_none")]
    pub trap: Option<Vec<Attributes>>,
    #[serde(rename = "!done", skip_serializing_if = "Option::is_none")]
    pub done: Option<Attributes>,
    #[serde(rename = "!fatal", skip_serializing_if = "Option::is_none")]
    pub fatal: Option<Vec<String>>,
}
