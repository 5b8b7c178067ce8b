//! Per-view configuration read from the text blob attached to a display.
//!
//! The blob is free-form `key=value` text. Problems never abort parsing:
//! they are collected as [`ConfigError`]s and the view shows an error banner
//! when [`ViewConfig::has_error`] is set.
//!
//! ```text
//! searchId=Cargo,Tank
//! excludeIds=Hidden,Trash
//! subgrids=true
//! docked=false
//! subgridScanTicks=6
//! category=Ingot
//!
//! [Thresholds]
//! Ingot/Iron=50000
//! Gold=2000
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::matcher::{parse_exclude_list, MatchRule};
use crate::scheduler::{ScanOptions, DEFAULT_CADENCE};

const THRESHOLDS_SECTION: &str = "thresholds";

/// Configuration problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Line is neither a comment, a section header nor `key=value`.
    #[error("line {0}: expected key=value")]
    MalformedLine(usize),
    /// Key not recognised.
    #[error("line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },
    /// Value should have been an integer.
    #[error("line {line}: '{value}' is not a number for '{key}'")]
    InvalidNumber {
        line: usize,
        key: String,
        value: String,
    },
    /// Value should have been a boolean.
    #[error("line {line}: '{value}' is not true/false for '{key}'")]
    InvalidBool {
        line: usize,
        key: String,
        value: String,
    },
}

/// Settings of one status view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Include pattern, possibly comma-separated.
    pub search_id: String,
    pub exclude_ids: Vec<String>,
    pub include_subgrids: bool,
    pub include_docked: bool,
    /// Host updates between full linked-structure scans.
    pub subgrid_scan_cadence: u32,
    /// Category token to aggregate, e.g. `Ingot`. `None` means all items.
    pub category_filter: Option<String>,
    /// Minimum amounts keyed by `Category/Subtype` or bare `Subtype`.
    pub thresholds: BTreeMap<String, i64>,
    #[serde(skip)]
    pub errors: Vec<ConfigError>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            search_id: "*".to_string(),
            exclude_ids: Vec::new(),
            include_subgrids: true,
            include_docked: false,
            subgrid_scan_cadence: DEFAULT_CADENCE,
            category_filter: None,
            thresholds: BTreeMap::new(),
            errors: Vec::new(),
        }
    }
}

impl ViewConfig {
    /// Parse a configuration blob. Missing keys keep their defaults.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        let mut in_thresholds = false;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            let comment = line.starts_with('#') || line.starts_with("//") || line.starts_with(';');
            if line.is_empty() || comment {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_thresholds = section.trim().eq_ignore_ascii_case(THRESHOLDS_SECTION);
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                config.errors.push(ConfigError::MalformedLine(line_no));
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            if in_thresholds {
                match value.parse::<i64>() {
                    Ok(n) => {
                        config.thresholds.insert(key.to_string(), n);
                    }
                    Err(_) => config.errors.push(invalid_number(line_no, key, value)),
                }
                continue;
            }

            match key.to_lowercase().as_str() {
                "searchid" => config.search_id = value.to_string(),
                "excludeids" => config.exclude_ids = parse_exclude_list(value),
                "subgrids" => match parse_bool(value) {
                    Some(b) => config.include_subgrids = b,
                    None => config.errors.push(invalid_bool(line_no, key, value)),
                },
                "docked" => match parse_bool(value) {
                    Some(b) => config.include_docked = b,
                    None => config.errors.push(invalid_bool(line_no, key, value)),
                },
                "subgridscanticks" => match value.parse::<u32>() {
                    Ok(n) => config.subgrid_scan_cadence = n.max(1),
                    Err(_) => config.errors.push(invalid_number(line_no, key, value)),
                },
                "category" => {
                    config.category_filter = if value.is_empty() || value == "*" {
                        None
                    } else {
                        Some(value.to_string())
                    }
                }
                _ => config.errors.push(ConfigError::UnknownKey {
                    line: line_no,
                    key: key.to_string(),
                }),
            }
        }

        for e in &config.errors {
            log::warn!("view config: {}", e);
        }
        config
    }

    /// Whether the view should show its error banner.
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn match_rule(&self) -> MatchRule {
        MatchRule::new(&self.search_id, self.exclude_ids.as_slice())
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            include_subgrids: self.include_subgrids,
            include_docked: self.include_docked,
            cadence: self.subgrid_scan_cadence.max(1),
        }
    }

    /// Push configured thresholds into the shared catalog.
    ///
    /// `Category/Subtype` keys resolve (and learn) the item; bare subtype keys
    /// only touch items the catalog already knows.
    pub fn apply_thresholds(&self, catalog: &mut Catalog) {
        for (key, &min) in &self.thresholds {
            match key.split_once('/') {
                Some((category, subtype)) => {
                    catalog.set_min_amount(category.trim(), subtype.trim(), min)
                }
                None => match catalog.lookup("", key) {
                    Some(def) => {
                        let category = def.category.clone();
                        catalog.set_min_amount(&category, key, min);
                    }
                    None => log::warn!("view config: threshold for unknown item '{}'", key),
                },
            }
        }
    }

    /// Canonical text form, suitable for seeding an empty blob.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("searchId={}\n", self.search_id));
        out.push_str(&format!("excludeIds={}\n", self.exclude_ids.join(",")));
        out.push_str(&format!("subgrids={}\n", self.include_subgrids));
        out.push_str(&format!("docked={}\n", self.include_docked));
        out.push_str(&format!("subgridScanTicks={}\n", self.subgrid_scan_cadence));
        if let Some(category) = &self.category_filter {
            out.push_str(&format!("category={}\n", category));
        }
        if !self.thresholds.is_empty() {
            out.push_str("\n[Thresholds]\n");
            for (key, min) in &self.thresholds {
                out.push_str(&format!("{}={}\n", key, min));
            }
        }
        out
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn invalid_number(line: usize, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidNumber {
        line,
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn invalid_bool(line: usize, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidBool {
        line,
        key: key.to_string(),
        value: value.to_string(),
    }
}
