//! Highlighting definition manager
//!
//! This module provides the SyntaxManager that owns the shared language
//! definitions and resolves them by name or file extension. Buffers hold
//! `Rc` handles to the same definitions; a definition is released once the
//! manager and every buffer using it have let go.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use super::builtin;
use super::language::{LanguageDefinition, NO_HIGHLIGHTING};
use super::loader;
use crate::error::{Error, Result};

/// Registry of highlighting definitions
pub struct SyntaxManager {
    /// Loaded language definitions
    languages: HashMap<String, Rc<LanguageDefinition>>,
    /// Extension to language name mapping
    extension_map: HashMap<String, String>,
}

impl SyntaxManager {
    /// Create a new syntax manager with built-in languages
    pub fn new() -> Self {
        let mut manager = Self {
            languages: HashMap::new(),
            extension_map: HashMap::new(),
        };

        manager.add_language(LanguageDefinition::plain());
        for lang in builtin::all_languages() {
            match lang {
                Ok(lang) => {
                    manager.add_language(lang);
                }
                Err(err) => tracing::error!(error = %err, "built-in definition failed to build"),
            }
        }

        manager
    }

    /// Add a language definition, replacing one with the same name
    pub fn add_language(&mut self, lang: LanguageDefinition) -> Rc<LanguageDefinition> {
        let name = lang.name.clone();
        for ext in &lang.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        let lang = Rc::new(lang);
        self.languages.insert(name, Rc::clone(&lang));
        lang
    }

    /// Add a definition from TOML source
    pub fn load_toml(&mut self, source: &str) -> Result<Rc<LanguageDefinition>> {
        let lang = loader::parse_definition(source)?;
        tracing::debug!(name = %lang.name, "loaded highlighting definition");
        Ok(self.add_language(lang))
    }

    /// Add a definition from a TOML file
    pub fn load_file(&mut self, path: &Path) -> Result<Rc<LanguageDefinition>> {
        let source = fs::read_to_string(path)?;
        self.load_toml(&source)
    }

    /// Detect language from filename
    pub fn detect_language(&self, filename: &Path) -> Option<&str> {
        let ext = filename.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).map(|s| s.as_str())
    }

    /// Get a definition by name
    pub fn get(&self, name: &str) -> Result<Rc<LanguageDefinition>> {
        self.languages
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDefinition(name.to_string()))
    }

    /// The plain-text definition
    pub fn plain(&self) -> Rc<LanguageDefinition> {
        match self.languages.get(NO_HIGHLIGHTING) {
            Some(lang) => Rc::clone(lang),
            None => Rc::new(LanguageDefinition::plain()),
        }
    }

    /// Definition for a file, falling back to plain text
    pub fn for_path(&self, filename: &Path) -> Rc<LanguageDefinition> {
        self.detect_language(filename)
            .and_then(|name| self.languages.get(name))
            .cloned()
            .unwrap_or_else(|| self.plain())
    }

    /// Number of handles to a definition held outside the manager
    pub fn use_count(&self, name: &str) -> Option<usize> {
        self.languages.get(name).map(|lang| Rc::strong_count(lang) - 1)
    }

    /// List available languages
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.languages.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for SyntaxManager {
    fn default() -> Self {
        Self::new()
    }
}
