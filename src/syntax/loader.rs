//! Loading language definitions from TOML
//!
//! ```toml
//! name = "Ini"
//! extensions = ["ini", "cfg"]
//! indentation = "normal"
//! folding = "token"            # or "indentation"
//!
//! [[pattern]]
//! name = "section"
//! regex = '^\[[^\]]+\]'
//! token = "Keyword"
//! priority = 90
//!
//! [[multiline]]
//! name = "heredoc"
//! start = '<<(\w+)'
//! end = '^%1$'
//! token = "String"
//! dynamic = true
//! fold = 3
//! ```

use serde::Deserialize;

use super::highlighter::FoldingStrategy;
use super::language::LanguageDefinition;
use super::rules::{MultilineRule, PatternRule};
use super::tokens::TokenType;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    name: String,
    #[serde(default)]
    extensions: Vec<String>,
    #[serde(default)]
    indentation: Option<String>,
    #[serde(default)]
    folding: Folding,
    #[serde(default, rename = "pattern")]
    patterns: Vec<PatternEntry>,
    #[serde(default, rename = "multiline")]
    multiline_rules: Vec<MultilineEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Folding {
    #[default]
    Token,
    Indentation,
}

#[derive(Debug, Deserialize)]
struct PatternEntry {
    name: String,
    regex: String,
    token: String,
    #[serde(default)]
    priority: i64,
    #[serde(default)]
    fold: i64,
}

#[derive(Debug, Deserialize)]
struct MultilineEntry {
    name: String,
    start: String,
    end: String,
    token: String,
    #[serde(default)]
    dynamic: bool,
    #[serde(default)]
    escape: Option<char>,
    #[serde(default)]
    fold: i64,
}

/// Parse a language definition from TOML source
pub fn parse_definition(source: &str) -> Result<LanguageDefinition> {
    let file: DefinitionFile = toml::from_str(source)?;

    let mut lang = LanguageDefinition::new(&file.name);
    for ext in &file.extensions {
        lang.add_extension(ext);
    }

    if let Some(mode) = &file.indentation {
        lang.set_indentation(mode);
    }

    if let Folding::Indentation = file.folding {
        lang.set_folding(FoldingStrategy::IndentationBased);
    }

    for rule in &file.patterns {
        let priority = i32::try_from(rule.priority).map_err(|_| {
            Error::Definition(format!("{}: priority {} out of range", rule.name, rule.priority))
        })?;
        let pattern = PatternRule::new(&rule.name, &rule.regex, token(&rule.token)?, priority)?
            .with_fold(fold_value(&rule.name, rule.fold)?);
        lang.add_pattern(pattern);
    }

    for (index, rule) in file.multiline_rules.iter().enumerate() {
        let state_id = u8::try_from(index + 1)
            .map_err(|_| Error::Definition("too many multiline rules".to_string()))?;
        let token_type = token(&rule.token)?;

        let mut multiline = if rule.dynamic {
            MultilineRule::dynamic(&rule.name, &rule.start, &rule.end, token_type, state_id)?
        } else {
            MultilineRule::new(&rule.name, &rule.start, &rule.end, token_type, state_id)?
        };

        if let Some(escape) = rule.escape {
            multiline = multiline.with_escape(escape);
        }

        lang.add_multiline(multiline.with_fold(fold_value(&rule.name, rule.fold)?));
    }

    Ok(lang)
}

fn fold_value(name: &str, fold: i64) -> Result<i16> {
    i16::try_from(fold)
        .map_err(|_| Error::Definition(format!("{}: fold value {} out of range", name, fold)))
}

fn token(name: &str) -> Result<TokenType> {
    TokenType::from_name(name).ok_or_else(|| Error::UnknownToken(name.to_string()))
}
