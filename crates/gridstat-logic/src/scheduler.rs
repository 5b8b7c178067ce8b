//! Scan scheduler — keeps the expensive linked-structure walk off most ticks.
//!
//! Every tick re-walks the root structure alone, which is cheap. The full
//! walk across joints and docks runs once every `cadence` ticks; the units it
//! finds beyond the root are cached and appended to every tick's primary
//! result until the next full walk.
//!
//! Staleness bounds: root-structure units are never older than the current
//! tick, linked-structure units never older than `cadence` ticks.
//!
//! ```
//! use gridstat_logic::graph::StructureGraph;
//! use gridstat_logic::host::UnitKind;
//! use gridstat_logic::matcher::MatchRule;
//! use gridstat_logic::scheduler::{ScanOptions, ScanScheduler};
//!
//! let mut graph = StructureGraph::new();
//! let root = graph.add_structure("Base");
//! graph.add_unit(root, "Cargo", UnitKind::Generic).unwrap();
//!
//! let mut scheduler = ScanScheduler::new(ScanOptions::default());
//! let units = scheduler.tick(&graph, root, &MatchRule::match_all());
//! assert_eq!(units.len(), 1);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::collector::{collect, CollectOptions, MoverInfo};
use crate::host::{StructureId, UnitHost, UnitId};
use crate::matcher::MatchRule;

/// Default number of ticks between full linked-structure walks.
pub const DEFAULT_CADENCE: u32 = 10;

/// What a scheduler walks and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub include_subgrids: bool,
    pub include_docked: bool,
    /// Ticks between full walks. Values below 1 are treated as 1.
    pub cadence: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_subgrids: true,
            include_docked: false,
            cadence: DEFAULT_CADENCE,
        }
    }
}

impl ScanOptions {
    pub fn links(&self) -> CollectOptions {
        CollectOptions::new(self.include_subgrids, self.include_docked)
    }

    pub fn effective_cadence(&self) -> u32 {
        self.cadence.max(1)
    }
}

/// Per-view scan state. Views never share a scheduler.
#[derive(Debug, Clone, Default)]
pub struct ScanScheduler {
    options: ScanOptions,
    counter: u32,
    /// Units found by the last full walk that were not on the root structure.
    cached_sub: Option<Vec<UnitId>>,
    /// Rule the cached units were filtered with.
    cached_rule: Option<MatchRule>,
    movers: Vec<MoverInfo>,
    ticks: u64,
    last_full_scan: Option<u64>,
    full_scans: u64,
}

impl ScanScheduler {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Swap options (e.g. after a config reload). Drops the cache.
    pub fn set_options(&mut self, options: ScanOptions) {
        if self.options != options {
            self.options = options;
            self.invalidate();
        }
    }

    /// Forget cached linked-structure units; the next tick does a full walk.
    pub fn invalidate(&mut self) {
        self.cached_sub = None;
        self.cached_rule = None;
        self.counter = 0;
    }

    /// Run one host update and return root units followed by cached linked units.
    ///
    /// A rule different from the one the cache was built with drops the cache.
    pub fn tick(
        &mut self,
        host: &dyn UnitHost,
        root: StructureId,
        rule: &MatchRule,
    ) -> Vec<UnitId> {
        self.ticks += 1;
        if self.cached_rule.as_ref().is_some_and(|cached| cached != rule) {
            self.invalidate();
        }
        let primary = collect(host, root, rule, CollectOptions::PRIMARY);

        if self.options.links().follows_links() {
            self.counter += 1;
            if self.cached_sub.is_none() || self.counter >= self.options.effective_cadence() {
                self.refresh_substructures(host, root, rule, &primary.units);
            }
        } else {
            self.cached_sub = None;
            self.cached_rule = None;
        }

        self.movers = primary.movers;
        let mut units = primary.units;
        if let Some(sub) = &self.cached_sub {
            units.extend_from_slice(sub);
        }
        units
    }

    fn refresh_substructures(
        &mut self,
        host: &dyn UnitHost,
        root: StructureId,
        rule: &MatchRule,
        primary: &[UnitId],
    ) {
        let full = collect(host, root, rule, self.options.links());
        let on_root: HashSet<UnitId> = primary.iter().copied().collect();
        let sub: Vec<UnitId> = full
            .units
            .into_iter()
            .filter(|u| !on_root.contains(u))
            .collect();

        log::debug!(
            "scheduler: full scan of {} found {} linked units over {} structures",
            root,
            sub.len(),
            full.structures.len()
        );

        self.cached_sub = Some(sub);
        self.cached_rule = Some(rule.clone());
        self.counter = 0;
        self.last_full_scan = Some(self.ticks);
        self.full_scans += 1;
    }

    /// Linked-structure units from the last full walk, if one has run.
    pub fn cached_substructure(&self) -> Option<&[UnitId]> {
        self.cached_sub.as_deref()
    }

    /// Movers seen on the root structure during the latest tick.
    pub fn movers(&self) -> &[MoverInfo] {
        &self.movers
    }

    /// Ticks elapsed since the data of the last full walk was gathered.
    pub fn ticks_since_full_scan(&self) -> Option<u64> {
        self.last_full_scan.map(|t| self.ticks - t)
    }

    pub fn full_scans(&self) -> u64 {
        self.full_scans
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
