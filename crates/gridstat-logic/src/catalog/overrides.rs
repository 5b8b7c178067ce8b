//! User-editable item override file: sources and parser.
//!
//! Two syntaxes are accepted, and may be mixed in one file:
//!
//! ```text
//! # INI style, one section per item
//! [Ore/HydroPellets]
//! name=Nutrient Pellets
//! volume=0.37
//! group=ore
//! min=5000
//!
//! // flat rows: category;subtype;displayName;volume;sortGroup;minAmount
//! Ingot;Lithium;Lithium Ingot;0.2;ingot;800
//! Component,Gear,Gear,2,component,100
//! ```
//!
//! Parsing is line-oriented and never fails as a whole: bad lines become
//! [`ParseIssue`]s and are skipped.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::OverrideError;

/// File name looked up in each candidate directory.
pub const OVERRIDE_FILE_NAME: &str = "ItemDefinitions.ini";

/// One item definition read from the override file.
///
/// `None` fields leave an existing catalog entry's value untouched; for new
/// entries they fall back to the catalog defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEntry {
    pub category: String,
    pub subtype: String,
    pub display_name: Option<String>,
    pub volume_per_unit: Option<f64>,
    pub sort_group: Option<String>,
    /// Zero or negative never lowers an existing threshold.
    pub min_amount: i64,
}

impl OverrideEntry {
    fn bare(category: &str, subtype: &str) -> Self {
        Self {
            category: category.to_string(),
            subtype: subtype.to_string(),
            display_name: None,
            volume_per_unit: None,
            sort_group: None,
            min_amount: 0,
        }
    }
}

/// A skipped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Everything a parse produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub entries: Vec<OverrideEntry>,
    pub issues: Vec<ParseIssue>,
}

/// Where override text comes from.
pub trait OverrideSource {
    /// Return the text and the location it was read from.
    fn read(&self) -> Result<(PathBuf, String), OverrideError>;
}

/// Reads the first existing file among a list of candidate paths.
#[derive(Debug, Clone)]
pub struct FileOverrideSource {
    candidates: Vec<PathBuf>,
}

impl FileOverrideSource {
    /// `<mod_root>/Data/ItemDefinitions.ini`, then `<data_root>/ItemDefinitions.ini`.
    pub fn new(mod_root: impl AsRef<Path>, data_root: impl AsRef<Path>) -> Self {
        Self {
            candidates: vec![
                mod_root.as_ref().join("Data").join(OVERRIDE_FILE_NAME),
                data_root.as_ref().join(OVERRIDE_FILE_NAME),
            ],
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}

impl OverrideSource for FileOverrideSource {
    fn read(&self) -> Result<(PathBuf, String), OverrideError> {
        for path in &self.candidates {
            match fs::read_to_string(path) {
                Ok(text) => return Ok((path.clone(), text)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(OverrideError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }
        Err(OverrideError::NotFound {
            tried: self.candidates.clone(),
        })
    }
}

/// Override text held in memory, e.g. embedded with `include_str!`.
#[derive(Debug, Clone)]
pub struct InlineOverrideSource {
    pub label: PathBuf,
    pub text: String,
}

impl InlineOverrideSource {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: PathBuf::from(label),
            text: text.to_string(),
        }
    }
}

impl OverrideSource for InlineOverrideSource {
    fn read(&self) -> Result<(PathBuf, String), OverrideError> {
        Ok((self.label.clone(), self.text.clone()))
    }
}

/// Section being filled while parsing INI-style input.
struct SectionDraft {
    header_line: usize,
    header: String,
    entry: OverrideEntry,
}

impl SectionDraft {
    fn new(header: &str, line: usize) -> Self {
        let (category, subtype) = header.split_once('/').unwrap_or(("", ""));
        Self {
            header_line: line,
            header: header.to_string(),
            entry: OverrideEntry::bare(category.trim(), subtype.trim()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "category" | "type" | "typeid" => self.entry.category = value.to_string(),
            "subtype" | "subtypeid" => self.entry.subtype = value.to_string(),
            "name" | "displayname" => self.entry.display_name = non_empty(value),
            "volume" => self.entry.volume_per_unit = parse_volume(value)?,
            "group" | "sortgroup" => self.entry.sort_group = non_empty(value),
            "min" | "minamount" => self.entry.min_amount = parse_amount(value)?,
            other => return Err(format!("unknown key '{}'", other)),
        }
        Ok(())
    }

    fn finish(self, report: &mut ParseReport) {
        if self.entry.category.is_empty() || self.entry.subtype.is_empty() {
            push_issue(
                report,
                self.header_line,
                format!("section [{}] has no category/subtype", self.header),
            );
        } else {
            report.entries.push(self.entry);
        }
    }
}

/// Parse override text in either syntax.
pub fn parse_overrides(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let mut section: Option<SectionDraft> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            if let Some(draft) = section.take() {
                draft.finish(&mut report);
            }
            match rest.strip_suffix(']') {
                Some(header) => section = Some(SectionDraft::new(header.trim(), line_no)),
                None => push_issue(&mut report, line_no, "unterminated section header".into()),
            }
            continue;
        }

        if let Some(draft) = section.as_mut() {
            if let Some((key, value)) = line.split_once('=') {
                if let Err(reason) = draft.set(key, value) {
                    push_issue(&mut report, line_no, reason);
                }
                continue;
            }
        } else if line.contains('=') && !line.contains(';') {
            push_issue(&mut report, line_no, "key=value outside of a section".into());
            continue;
        }

        if line.contains(';') || line.contains(',') {
            // A flat row ends any open section.
            if let Some(draft) = section.take() {
                draft.finish(&mut report);
            }
            match parse_row(line) {
                Ok(entry) => report.entries.push(entry),
                Err(reason) => push_issue(&mut report, line_no, reason),
            }
        } else {
            push_issue(&mut report, line_no, "unrecognised line".into());
        }
    }

    if let Some(draft) = section.take() {
        draft.finish(&mut report);
    }
    report
}

/// `category;subtype;displayName;volume;sortGroup;minAmount`, `;` or `,` separated.
fn parse_row(line: &str) -> Result<OverrideEntry, String> {
    let delimiter = if line.contains(';') { ';' } else { ',' };
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    if fields.len() < 3 {
        return Err(format!("expected at least 3 fields, found {}", fields.len()));
    }
    if fields[0].is_empty() || fields[1].is_empty() {
        return Err("empty category or subtype".into());
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    let mut entry = OverrideEntry::bare(fields[0], fields[1]);
    entry.display_name = non_empty(field(2));
    entry.volume_per_unit = parse_volume(field(3))?;
    entry.sort_group = non_empty(field(4));
    entry.min_amount = parse_amount(field(5))?;
    Ok(entry)
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn parse_volume(value: &str) -> Result<Option<f64>, String> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(format!("invalid volume '{}'", value.trim())),
    }
}

fn parse_amount(value: &str) -> Result<i64, String> {
    let v = value.trim();
    if v.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = v.parse::<i64>() {
        return Ok(n);
    }
    match v.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f as i64),
        _ => Err(format!("invalid amount '{}'", v)),
    }
}

fn push_issue(report: &mut ParseReport, line: usize, reason: String) {
    let issue = ParseIssue { line, reason };
    log::warn!("catalog: skipping override {}", issue);
    report.issues.push(issue);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_semicolon_row() {
        let report = parse_overrides("Ore;HydroPellets;Nutrient Pellets;0.37;ore;5000");
        assert!(report.issues.is_empty());
        assert_eq!(report.entries.len(), 1);
        let e = &report.entries[0];
        assert_eq!(e.category, "Ore");
        assert_eq!(e.subtype, "HydroPellets");
        assert_eq!(e.display_name.as_deref(), Some("Nutrient Pellets"));
        assert_eq!(e.volume_per_unit, Some(0.37));
        assert_eq!(e.sort_group.as_deref(), Some("ore"));
        assert_eq!(e.min_amount, 5000);
    }

    #[test]
    fn test_flat_comma_row_with_missing_tail() {
        let report = parse_overrides("Component,Gear,Gear");
        let e = &report.entries[0];
        assert_eq!(e.volume_per_unit, None);
        assert_eq!(e.sort_group, None);
        assert_eq!(e.min_amount, 0);
    }

    #[test]
    fn test_ini_sections() {
        let text = "\
[Ore/HydroPellets]
name = Nutrient Pellets
volume=0.37
min=5000

[Lithium]
category=Ingot
subtype=Lithium
group=ingot
";
        let report = parse_overrides(text);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].category, "Ore");
        assert_eq!(report.entries[0].display_name.as_deref(), Some("Nutrient Pellets"));
        assert_eq!(report.entries[0].min_amount, 5000);
        assert_eq!(report.entries[1].category, "Ingot");
        assert_eq!(report.entries[1].subtype, "Lithium");
        assert_eq!(report.entries[1].sort_group.as_deref(), Some("ingot"));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let text = "# comment\n\n   // another\nOre;Iron;Iron Ore\n";
        let report = parse_overrides(text);
        assert_eq!(report.entries.len(), 1);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_malformed_lines_reported_and_skipped() {
        let text = "\
Ore;Iron
Ore;Gold;Gold Ore;lots;ore;1
just words
key=value
[Broken
[Nameless]
volume=1
Ingot;Iron;Iron Ingot;0.127;ingot;100
";
        let report = parse_overrides(text);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].subtype, "Iron");
        let lines: Vec<usize> = report.issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unknown_key_keeps_section() {
        let report = parse_overrides("[Ore/Iron]\ncolour=red\nmin=10\n");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].min_amount, 10);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].line, 2);
    }

    #[test]
    fn test_row_closes_open_section() {
        let report = parse_overrides("[Ore/Iron]\nmin=10\nOre;Gold;Gold Ore\n");
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].subtype, "Iron");
        assert_eq!(report.entries[1].subtype, "Gold");
    }

    #[test]
    fn test_decimal_min_amount_truncates() {
        let report = parse_overrides("Ore;Iron;Iron Ore;0.37;ore;12.9");
        assert_eq!(report.entries[0].min_amount, 12);
    }

    #[test]
    fn test_file_source_prefers_mod_root() {
        let mod_root = tempfile::tempdir().unwrap();
        let data_root = tempfile::tempdir().unwrap();
        fs::create_dir_all(mod_root.path().join("Data")).unwrap();
        fs::write(
            mod_root.path().join("Data").join(OVERRIDE_FILE_NAME),
            "Ore;A;A",
        )
        .unwrap();
        fs::write(data_root.path().join(OVERRIDE_FILE_NAME), "Ore;B;B").unwrap();

        let source = FileOverrideSource::new(mod_root.path(), data_root.path());
        let (path, text) = source.read().unwrap();
        assert_eq!(text, "Ore;A;A");
        assert!(path.starts_with(mod_root.path()));
    }

    #[test]
    fn test_file_source_falls_back_to_data_root() {
        let mod_root = tempfile::tempdir().unwrap();
        let data_root = tempfile::tempdir().unwrap();
        fs::write(data_root.path().join(OVERRIDE_FILE_NAME), "Ore;B;B").unwrap();

        let source = FileOverrideSource::new(mod_root.path(), data_root.path());
        let (_, text) = source.read().unwrap();
        assert_eq!(text, "Ore;B;B");
    }

    #[test]
    fn test_file_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileOverrideSource::new(dir.path(), dir.path());
        match source.read() {
            Err(OverrideError::NotFound { tried }) => assert_eq!(tried.len(), 2),
            other => panic!("expected NotFound, got {:?}", other.map(|(p, _)| p)),
        }
    }
}
