//! Design token store.
//!
//! The [`Theme`] holds design tokens keyed by CSS custom property names
//! (`--color-red-500`, `--spacing-4`, ...). Tokens are added in bulk while
//! the configuration is resolved; after the owning design system finishes
//! construction the store is treated as read-only.
//!
//! Resolution returns either the raw value (for tokens flagged inline) or a
//! `var(--key, value)` reference so consumers can override the token at
//! runtime.

use std::collections::HashMap;

use crate::escape::escape_ident;
use crate::{Error, Result};

/// Flags attached to a theme entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeOptions {
    /// Resolve to the raw value instead of a `var()` reference.
    pub inline: bool,
    /// The entry came from a reference-only import and should not be emitted
    /// by callers that materialize the theme as `:root` declarations.
    pub reference: bool,
    /// The entry is a fallback default: any later non-default `add` for the
    /// same key wins, and once a non-default value exists a default is a
    /// no-op.
    pub default: bool,
}

impl ThemeOptions {
    /// Options for an inline token.
    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::default()
        }
    }

    /// Options for a default-flagged token.
    pub fn default_flag() -> Self {
        Self {
            default: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct ThemeEntry {
    value: String,
    options: ThemeOptions,
}

/// The design token store.
///
/// Iteration order over entries is insertion order, which keeps everything
/// downstream (namespace views, generated variants) deterministic.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    values: HashMap<String, ThemeEntry>,
    /// Insertion order of live keys.
    order: Vec<String>,
}

impl Theme {
    /// Create an empty theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token to the theme.
    ///
    /// Special forms:
    /// - a key ending in `-*` with value `initial` clears a namespace
    ///   (`--*` clears the whole store); any other value for such a key is a
    ///   configuration error
    /// - the value `initial` on a plain key deletes that entry
    /// - a default-flagged add never overrides an existing non-default entry
    pub fn add(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        options: ThemeOptions,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();

        if key.ends_with("-*") {
            if value != "initial" {
                return Err(Error::invalid_theme_value(key, value));
            }
            if key == "--*" {
                self.values.clear();
                self.order.clear();
            } else {
                self.clear_namespace(&key[..key.len() - 2]);
            }
            return Ok(());
        }

        if options.default {
            if let Some(existing) = self.values.get(&key) {
                if !existing.options.default {
                    return Ok(());
                }
            }
        }

        if value == "initial" {
            self.remove(&key);
        } else {
            if self.values.insert(key.clone(), ThemeEntry { value, options }).is_none() {
                self.order.push(key);
            }
        }

        Ok(())
    }

    /// List the keys under the given namespaces, with the namespace prefix
    /// stripped.
    ///
    /// Keys containing a nested `--` (sub-tokens such as
    /// `--font-size-sm--line-height`) are skipped.
    pub fn keys_in_namespaces<'a>(
        &self,
        namespaces: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut keys = vec![];

        for namespace in namespaces {
            let prefix = format!("{namespace}-");

            for key in &self.order {
                if let Some(rest) = key.strip_prefix(&prefix) {
                    if key[2..].contains("--") {
                        continue;
                    }
                    keys.push(rest.to_string());
                }
            }
        }

        keys
    }

    /// Get the raw value for the first present key.
    pub fn get<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&str> {
        keys.into_iter()
            .find_map(|key| self.values.get(key).map(|entry| entry.value.as_str()))
    }

    /// Whether the entry for `key` is default-flagged.
    pub fn has_default(&self, key: &str) -> bool {
        self.values
            .get(key)
            .map(|entry| entry.options.default)
            .unwrap_or(false)
    }

    /// Resolve a candidate value against a priority-ordered key list.
    ///
    /// Returns the raw value for inline tokens, otherwise a
    /// `var(--key, value)` reference. Absence is `None`, never an error.
    pub fn resolve(&self, candidate_value: Option<&str>, keys: &[&str]) -> Option<String> {
        let theme_key = self.resolve_key(candidate_value, keys)?;
        let entry = self.values.get(&theme_key)?;

        if entry.options.inline {
            Some(entry.value.clone())
        } else {
            Some(self.var_reference(&theme_key))
        }
    }

    /// Resolve to the raw token value, never a `var()` reference.
    pub fn resolve_value(&self, candidate_value: Option<&str>, keys: &[&str]) -> Option<String> {
        let theme_key = self.resolve_key(candidate_value, keys)?;
        self.values.get(&theme_key).map(|entry| entry.value.clone())
    }

    /// Resolve a value together with derived sibling tokens.
    ///
    /// For each suffix in `nested_suffixes`, the token `{key}{suffix}` is
    /// looked up and resolved with the same inline-or-var rules; present
    /// siblings are returned as `(suffix, value)` pairs. Used for bundles
    /// like a font-size token and its paired `--line-height`.
    pub fn resolve_with(
        &self,
        candidate_value: &str,
        keys: &[&str],
        nested_suffixes: &[&str],
    ) -> Option<(String, Vec<(String, String)>)> {
        let theme_key = self.resolve_key(Some(candidate_value), keys)?;

        let mut extra = vec![];
        for suffix in nested_suffixes {
            let nested_key = format!("{theme_key}{suffix}");
            let Some(entry) = self.values.get(&nested_key) else {
                continue;
            };

            let value = if entry.options.inline {
                entry.value.clone()
            } else {
                self.var_reference(&nested_key)
            };
            extra.push((suffix.to_string(), value));
        }

        let entry = self.values.get(&theme_key)?;
        let value = if entry.options.inline {
            entry.value.clone()
        } else {
            self.var_reference(&theme_key)
        };

        Some((value, extra))
    }

    /// An ordered key/value view of one namespace.
    ///
    /// The bare namespace key (if present) appears under `None`; sub-tokens
    /// (`--ns-x--sub`) keep their `--sub` suffix attached.
    pub fn namespace(&self, namespace: &str) -> Vec<(Option<String>, String)> {
        let prefix = format!("{namespace}-");
        let sub_prefix = format!("{namespace}--");
        let mut values = vec![];

        for key in &self.order {
            let Some(entry) = self.values.get(key) else {
                continue;
            };

            if key == namespace {
                values.push((None, entry.value.clone()));
            } else if let Some(rest) = key.strip_prefix(&sub_prefix) {
                // Preserve the `--` prefix for sub-tokens,
                // e.g. `--font-size-sm--line-height`.
                values.push((Some(format!("--{rest}")), entry.value.clone()));
            } else if let Some(rest) = key.strip_prefix(&prefix) {
                values.push((Some(rest.to_string()), entry.value.clone()));
            }
        }

        values
    }

    /// Iterate over all entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, ThemeOptions)> {
        self.order.iter().filter_map(|key| {
            self.values
                .get(key)
                .map(|entry| (key.as_str(), entry.value.as_str(), entry.options))
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the theme holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn clear_namespace(&mut self, namespace: &str) {
        self.order.retain(|key| !key.starts_with(namespace));
        self.values.retain(|key, _| !key.starts_with(namespace));
    }

    fn resolve_key(&self, candidate_value: Option<&str>, keys: &[&str]) -> Option<String> {
        for key in keys {
            let theme_key = match candidate_value {
                Some(value) => escape_ident(&format!("{key}-{}", value.replace('.', "_"))),
                None => (*key).to_string(),
            };

            if self.values.contains_key(&theme_key) {
                return Some(theme_key);
            }
        }

        None
    }

    fn var_reference(&self, theme_key: &str) -> String {
        match self.values.get(theme_key) {
            Some(entry) => format!("var({theme_key}, {})", entry.value),
            None => format!("var({theme_key})"),
        }
    }
}
