//! Item catalog — maps raw inventory entries to display definitions.
//!
//! The catalog is seeded with built-in rows, extended by the user override
//! file, and learns unknown items on the fly. One catalog serves every view
//! of a session; views borrow it per call and never own it.
//!
//! # Resolution tiers
//!
//! [`Catalog::resolve`] tries, in order:
//!
//! 1. exact `(category, subtype)` match
//! 2. query category *contains* the stored category, with exact subtype
//!    (`MyObjectBuilder_Ingot` finds `Ingot`)
//! 3. subtype alone
//!
//! A total miss synthesizes a definition, stores it in the `unknown`
//! partition and returns it; the next identical query hits tier 1.
//!
//! ```
//! use gridstat_logic::catalog::Catalog;
//!
//! let mut catalog = Catalog::with_builtin();
//! let iron = catalog.resolve("MyObjectBuilder_Ingot", "Iron");
//! assert_eq!(iron.display_name, "Iron Ingot");
//!
//! let odd = catalog.resolve("Ore", "Unobtainium");
//! assert_eq!(odd.sort_group, "misc");
//! assert_eq!(catalog.unknown().count(), 1);
//! ```

mod builtin;
pub mod overrides;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use self::builtin::BUILTIN_ITEMS;
use self::overrides::{parse_overrides, OverrideEntry, OverrideSource};

/// Sort group used when none is given.
pub const DEFAULT_SORT_GROUP: &str = "misc";
/// Liters per unit assumed for unknown items.
pub const UNKNOWN_VOLUME_PER_UNIT: f64 = 0.1;
/// Threshold assumed for unknown items.
pub const UNKNOWN_MIN_AMOUNT: i64 = 1000;
/// Synthesized display names are cut to this many characters.
pub const MAX_SYNTH_NAME_LEN: usize = 15;
/// Failed override reads tolerated before giving up for the session.
pub const MAX_LOAD_ATTEMPTS: u32 = 600;

/// Display definition of one item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub category: String,
    pub subtype: String,
    pub display_name: String,
    /// Liters per unit.
    pub volume_per_unit: f64,
    pub sort_group: String,
    /// Threshold below which bars show a shortage.
    pub min_desired_amount: i64,
}

impl ItemDefinition {
    pub fn new(
        category: &str,
        subtype: &str,
        display_name: &str,
        volume_per_unit: f64,
        sort_group: &str,
        min_desired_amount: i64,
    ) -> Self {
        Self {
            category: category.to_string(),
            subtype: subtype.to_string(),
            display_name: display_name.to_string(),
            volume_per_unit,
            sort_group: normalize_group(Some(sort_group)),
            min_desired_amount,
        }
    }

    /// Placeholder for an item nobody described.
    pub fn synthesized(category: &str, subtype: &str) -> Self {
        let name: String = subtype.chars().take(MAX_SYNTH_NAME_LEN).collect();
        Self::new(
            category,
            subtype,
            &name,
            UNKNOWN_VOLUME_PER_UNIT,
            DEFAULT_SORT_GROUP,
            UNKNOWN_MIN_AMOUNT,
        )
    }

    fn from_override(entry: &OverrideEntry) -> Self {
        Self {
            category: entry.category.clone(),
            subtype: entry.subtype.clone(),
            display_name: entry
                .display_name
                .clone()
                .unwrap_or_else(|| entry.subtype.clone()),
            volume_per_unit: entry.volume_per_unit.unwrap_or(UNKNOWN_VOLUME_PER_UNIT),
            sort_group: normalize_group(entry.sort_group.as_deref()),
            min_desired_amount: entry.min_amount.max(0),
        }
    }
}

fn normalize_group(group: Option<&str>) -> String {
    match group.map(str::trim) {
        Some(g) if !g.is_empty() => g.to_string(),
        _ => DEFAULT_SORT_GROUP.to_string(),
    }
}

/// Lifecycle of the one-shot override load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// Not loaded yet; `attempts` failed reads so far.
    Pending { attempts: u32 },
    /// Read once successfully. Never re-read.
    Loaded,
    /// Gave up after [`MAX_LOAD_ATTEMPTS`] failures.
    Abandoned,
}

impl LoadState {
    pub fn is_concluded(&self) -> bool {
        !matches!(self, LoadState::Pending { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partition {
    Known,
    Unknown,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    partition: Partition,
    index: usize,
}

/// Session-wide item catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    known: Vec<Arc<ItemDefinition>>,
    unknown: Vec<Arc<ItemDefinition>>,
    index: HashMap<(String, String), Slot>,
    load_state: LoadState,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self {
            known: Vec::new(),
            unknown: Vec::new(),
            index: HashMap::new(),
            load_state: LoadState::Pending { attempts: 0 },
        }
    }

    /// Catalog seeded with the built-in rows.
    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        for &(category, subtype, name, volume, group, min) in BUILTIN_ITEMS {
            catalog.upsert(ItemDefinition::new(category, subtype, name, volume, group, min));
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.unknown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn known(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.known.iter()
    }

    /// Items learned from inventories during this session.
    pub fn unknown(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.unknown.iter()
    }

    /// Known items followed by learned ones, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.known.iter().chain(self.unknown.iter())
    }

    /// Exact lookup, no fallback and no synthesis.
    pub fn get(&self, category: &str, subtype: &str) -> Option<&Arc<ItemDefinition>> {
        self.index
            .get(&key(category, subtype))
            .map(|slot| self.slot(*slot))
    }

    /// Insert or replace by `(category, subtype)`; the last writer wins.
    ///
    /// A learned item that gets upserted moves to the known partition.
    pub fn upsert(&mut self, def: ItemDefinition) -> Arc<ItemDefinition> {
        let k = key(&def.category, &def.subtype);
        let def = Arc::new(def);
        match self.index.get(&k).copied() {
            Some(slot) if slot.partition == Partition::Known => {
                *self.slot_mut(slot) = Arc::clone(&def)
            }
            existing => {
                if let Some(slot) = existing {
                    self.forget_unknown(slot.index);
                }
                self.index.insert(
                    k,
                    Slot {
                        partition: Partition::Known,
                        index: self.known.len(),
                    },
                );
                self.known.push(Arc::clone(&def));
            }
        }
        def
    }

    /// Resolve an inventory entry to a definition. Never fails.
    pub fn resolve(&mut self, category: &str, subtype: &str) -> Arc<ItemDefinition> {
        if let Some(def) = self.lookup(category, subtype) {
            return def;
        }

        let def = Arc::new(ItemDefinition::synthesized(category, subtype));
        log::debug!("catalog: learned unknown item {}/{}", category, subtype);
        self.index.insert(
            key(category, subtype),
            Slot {
                partition: Partition::Unknown,
                index: self.unknown.len(),
            },
        );
        self.unknown.push(Arc::clone(&def));
        def
    }

    /// Tiered lookup without synthesis.
    pub fn lookup(&self, category: &str, subtype: &str) -> Option<Arc<ItemDefinition>> {
        if let Some(def) = self.get(category, subtype) {
            return Some(Arc::clone(def));
        }
        if let Some(def) = self.all().find(|d| {
            !d.category.is_empty() && d.subtype == subtype && category.contains(d.category.as_str())
        }) {
            return Some(Arc::clone(def));
        }
        self.all().find(|d| d.subtype == subtype).cloned()
    }

    /// Overwrite the threshold of an item, learning it first if needed.
    pub fn set_min_amount(&mut self, category: &str, subtype: &str, min: i64) {
        let resolved = self.resolve(category, subtype);
        let k = key(&resolved.category, &resolved.subtype);
        if let Some(slot) = self.index.get(&k).copied() {
            Arc::make_mut(self.slot_mut(slot)).min_desired_amount = min;
        }
    }

    /// Merge one override entry.
    ///
    /// Existing entries get name, volume and group updated in place; the
    /// threshold is only raised by a positive value, never reset to zero.
    pub fn apply_override(&mut self, entry: &OverrideEntry) {
        let k = key(&entry.category, &entry.subtype);
        let Some(slot) = self.index.get(&k).copied() else {
            self.upsert(ItemDefinition::from_override(entry));
            return;
        };

        let def = Arc::make_mut(self.slot_mut(slot));
        if let Some(name) = &entry.display_name {
            def.display_name = name.clone();
        }
        if let Some(volume) = entry.volume_per_unit {
            def.volume_per_unit = volume;
        }
        if entry.sort_group.is_some() {
            def.sort_group = normalize_group(entry.sort_group.as_deref());
        }
        if entry.min_amount > 0 {
            def.min_desired_amount = entry.min_amount;
        }
        if slot.partition == Partition::Unknown {
            let def = ItemDefinition::clone(self.slot(slot));
            self.upsert(def);
        }
    }

    /// Parse override text and merge every entry. Returns the entry count.
    pub fn ingest_overrides(&mut self, text: &str) -> usize {
        let report = parse_overrides(text);
        for entry in &report.entries {
            self.apply_override(entry);
        }
        report.entries.len()
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Load the override file once. Safe to call every tick.
    ///
    /// After a successful read the state is [`LoadState::Loaded`] and the
    /// source is never touched again. Each failed read counts an attempt;
    /// at [`MAX_LOAD_ATTEMPTS`] the catalog gives up silently for the rest
    /// of the session.
    pub fn ensure_loaded(&mut self, source: &dyn OverrideSource) -> LoadState {
        let LoadState::Pending { attempts } = self.load_state else {
            return self.load_state;
        };

        match source.read() {
            Ok((path, text)) => {
                let count = self.ingest_overrides(&text);
                log::info!("catalog: loaded {} override items from {:?}", count, path);
                self.load_state = LoadState::Loaded;
            }
            Err(e) => {
                let attempts = attempts + 1;
                if attempts >= MAX_LOAD_ATTEMPTS {
                    log::warn!(
                        "catalog: giving up on override file after {} attempts: {}",
                        attempts,
                        e
                    );
                    self.load_state = LoadState::Abandoned;
                } else {
                    log::debug!("catalog: override file attempt {} failed: {}", attempts, e);
                    self.load_state = LoadState::Pending { attempts };
                }
            }
        }
        self.load_state
    }

    /// Every definition as a JSON array, known items first.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let defs: Vec<&ItemDefinition> = self.all().map(|d| d.as_ref()).collect();
        serde_json::to_string_pretty(&defs)
    }

    /// Drop a learned entry, keeping the remaining ones in order.
    fn forget_unknown(&mut self, index: usize) {
        self.unknown.remove(index);
        for slot in self.index.values_mut() {
            if slot.partition == Partition::Unknown && slot.index > index {
                slot.index -= 1;
            }
        }
    }

    fn slot(&self, slot: Slot) -> &Arc<ItemDefinition> {
        match slot.partition {
            Partition::Known => &self.known[slot.index],
            Partition::Unknown => &self.unknown[slot.index],
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Arc<ItemDefinition> {
        match slot.partition {
            Partition::Known => &mut self.known[slot.index],
            Partition::Unknown => &mut self.unknown[slot.index],
        }
    }
}

fn key(category: &str, subtype: &str) -> (String, String) {
    (category.to_string(), subtype.to_string())
}
