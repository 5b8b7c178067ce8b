//! Inventory view — the scan → aggregate → rows pipeline for one display.
//!
//! Every rendering view wraps one of these with its own configuration and
//! scan cache; the catalog is passed in per update so views never own it.

use crate::aggregate::{aggregate, InventoryTotals};
use crate::catalog::Catalog;
use crate::host::{StructureId, UnitHost, UnitId};
use crate::matcher::MatchRule;
use crate::scheduler::ScanScheduler;
use crate::status::{capacity_row, item_rows, StatusRow};
use crate::view_config::ViewConfig;

/// Output of one update, ready for the drawing layer.
#[derive(Debug, Clone, Default)]
pub struct ViewFrame {
    /// Configuration problems were found; draw the error banner.
    pub config_error: bool,
    pub units: Vec<UnitId>,
    pub totals: InventoryTotals,
    pub rows: Vec<StatusRow>,
    pub capacity: Option<StatusRow>,
}

/// State of one inventory status view.
#[derive(Debug, Clone)]
pub struct InventoryView {
    config: ViewConfig,
    rule: MatchRule,
    scheduler: ScanScheduler,
    thresholds_applied: bool,
}

impl InventoryView {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            rule: config.match_rule(),
            scheduler: ScanScheduler::new(config.scan_options()),
            config,
            thresholds_applied: false,
        }
    }

    /// Build from the raw configuration blob.
    pub fn from_text(text: &str) -> Self {
        Self::new(ViewConfig::parse(text))
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &ScanScheduler {
        &self.scheduler
    }

    /// Replace the configuration after the blob was edited.
    pub fn reconfigure(&mut self, config: ViewConfig) {
        self.rule = config.match_rule();
        self.scheduler.set_options(config.scan_options());
        self.scheduler.invalidate();
        self.config = config;
        self.thresholds_applied = false;
    }

    /// One host update: scan, aggregate and build rows.
    pub fn update(
        &mut self,
        host: &dyn UnitHost,
        root: StructureId,
        catalog: &mut Catalog,
    ) -> ViewFrame {
        if !self.thresholds_applied {
            self.config.apply_thresholds(catalog);
            self.thresholds_applied = true;
        }

        let units = self.scheduler.tick(host, root, &self.rule);
        let totals = aggregate(host, &units, catalog, self.config.category_filter.as_deref());
        let rows = item_rows(&totals);
        let capacity = (totals.max_volume_l > 0.0).then(|| capacity_row(&totals));

        ViewFrame {
            config_error: self.config.has_error(),
            units,
            totals,
            rows,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StructureGraph;
    use crate::host::{Inventory, InventoryItem, UnitKind};

    fn rig() -> (StructureGraph, StructureId) {
        let mut g = StructureGraph::new();
        let base = g.add_structure("Base");
        let cargo = g.add_unit(base, "Cargo A", UnitKind::Generic).unwrap();
        g.add_inventory(
            cargo,
            Inventory::with_capacity(1000.0)
                .with_item(InventoryItem::new("MyObjectBuilder_Ingot", "Iron", 300.0))
                .with_item(InventoryItem::new("MyObjectBuilder_Ore", "Ice", 40.0)),
        )
        .unwrap();
        g.add_unit(base, "Assembler", UnitKind::Generic).unwrap();
        (g, base)
    }

    #[test]
    fn test_update_builds_rows() {
        let (g, base) = rig();
        let mut catalog = Catalog::with_builtin();
        let mut view = InventoryView::from_text(
            "searchId=cargo\ncategory=Ingot\n[Thresholds]\nIngot/Iron=1000\n",
        );
        let frame = view.update(&g, base, &mut catalog);
        assert!(!frame.config_error);
        assert_eq!(frame.units.len(), 1);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].label, "Iron Ingot");
        assert_eq!(frame.rows[0].target, 1000.0);
        assert!(frame.capacity.is_some());
    }

    #[test]
    fn test_config_error_flag_passes_through() {
        let (g, base) = rig();
        let mut catalog = Catalog::with_builtin();
        let mut view = InventoryView::from_text("subgrids=perhaps");
        let frame = view.update(&g, base, &mut catalog);
        assert!(frame.config_error);
        assert_eq!(frame.rows.len(), 2);
    }

    #[test]
    fn test_views_share_catalog_not_state() {
        let (g, base) = rig();
        let mut catalog = Catalog::with_builtin();
        let mut ingots = InventoryView::from_text("category=Ingot");
        let mut ores = InventoryView::from_text("category=Ore");
        let a = ingots.update(&g, base, &mut catalog);
        let b = ores.update(&g, base, &mut catalog);
        assert_eq!(a.totals.amount_of("Iron"), 300);
        assert_eq!(b.totals.amount_of("Ice"), 40);
        assert_eq!(ingots.scheduler().ticks(), 1);
        assert_eq!(ores.scheduler().ticks(), 1);
    }

    #[test]
    fn test_reconfigure_resets_scan() {
        let (g, base) = rig();
        let mut catalog = Catalog::with_builtin();
        let mut view = InventoryView::from_text("");
        view.update(&g, base, &mut catalog);
        view.reconfigure(ViewConfig::parse("searchId=assembler"));
        let frame = view.update(&g, base, &mut catalog);
        assert_eq!(frame.units.len(), 1);
        assert!(frame.rows.is_empty());
        assert_eq!(view.scheduler().full_scans(), 2);
    }
}
