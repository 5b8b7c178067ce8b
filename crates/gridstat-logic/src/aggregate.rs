//! Inventory aggregation — per-item totals across many containers.
//!
//! Aggregates are rebuilt from scratch every pass; nothing here outlives the
//! frame that renders it. Item definitions come from the shared
//! [`Catalog`], which learns unknown items as a side effect.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{Catalog, ItemDefinition};
use crate::host::{InventoryItem, UnitHost, UnitId};

/// Aggregation key. Subtypes are only unique within a category (iron ore
/// and iron ingots share the `Iron` subtype).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemKey {
    pub category: String,
    pub subtype: String,
}

/// Running total for one item type.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedItem {
    pub definition: Arc<ItemDefinition>,
    /// First stack seen, kept for type introspection.
    pub sample: InventoryItem,
    /// Exact sum of all stacks; ore and ice stacks are fractional.
    pub total: f64,
    /// `total` truncated once, for display and thresholds.
    pub amount: i64,
}

impl AggregatedItem {
    fn new(definition: Arc<ItemDefinition>, sample: &InventoryItem) -> Self {
        Self {
            definition,
            sample: sample.clone(),
            total: 0.0,
            amount: 0,
        }
    }

    fn add(&mut self, amount: f64) {
        self.total += amount;
        // Saturating cast.
        self.amount = self.total as i64;
    }

    /// Liters occupied by the whole total.
    pub fn volume_l(&self) -> f64 {
        self.total * self.definition.volume_per_unit
    }

    /// Whether the total is below the definition's threshold.
    pub fn is_short(&self) -> bool {
        self.amount < self.definition.min_desired_amount
    }
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryTotals {
    pub items: BTreeMap<ItemKey, AggregatedItem>,
    /// Sum of inventory capacities of every readable container, in liters.
    pub max_volume_l: f64,
    /// Sum of occupied volume reported by the host, in liters.
    pub current_volume_l: f64,
    pub containers_read: usize,
    pub containers_failed: usize,
}

impl InventoryTotals {
    /// First total with this subtype, in key order.
    pub fn by_subtype(&self, subtype: &str) -> Option<&AggregatedItem> {
        self.items
            .iter()
            .find(|(k, _)| k.subtype == subtype)
            .map(|(_, v)| v)
    }

    /// Amount for a subtype, 0 when absent.
    pub fn amount_of(&self, subtype: &str) -> i64 {
        self.by_subtype(subtype).map(|i| i.amount).unwrap_or(0)
    }
}

/// Sum every item across `containers`.
///
/// `category_filter` keeps only items whose category token matches
/// (case-insensitive), e.g. `Some("Ingot")`. Unreadable containers are
/// logged and skipped; the pass always completes.
pub fn aggregate(
    host: &dyn UnitHost,
    containers: &[UnitId],
    catalog: &mut Catalog,
    category_filter: Option<&str>,
) -> InventoryTotals {
    let mut totals = InventoryTotals::default();

    for &id in containers {
        let unit = match host.unit(id) {
            Ok(unit) => unit,
            Err(e) => {
                log::warn!("aggregate: skipping container: {}", e);
                totals.containers_failed += 1;
                continue;
            }
        };
        totals.containers_read += 1;

        for inventory in &unit.inventories {
            totals.max_volume_l += inventory.max_volume_l;
            totals.current_volume_l += inventory.current_volume_l;
            if inventory.items.is_empty() {
                continue;
            }

            for item in &inventory.items {
                let category = item.category();
                if let Some(filter) = category_filter {
                    if !category.eq_ignore_ascii_case(filter) {
                        continue;
                    }
                }

                let key = ItemKey {
                    category: category.to_string(),
                    subtype: item.subtype.clone(),
                };
                totals
                    .items
                    .entry(key)
                    .or_insert_with(|| {
                        AggregatedItem::new(catalog.resolve(category, &item.subtype), item)
                    })
                    .add(item.amount);
            }
        }
    }

    totals
}

/// Volume of one resource across containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VolumeTotals {
    pub current_volume_l: f64,
    /// Capacity of all readable containers, counted even when nothing matched.
    pub max_volume_l: f64,
    /// Stacks that matched the subtype.
    pub matched_count: usize,
}

/// Total liters of `subtype` across `containers`, at `volume_per_unit` liters each.
pub fn resource_volume(
    host: &dyn UnitHost,
    containers: &[UnitId],
    subtype: &str,
    volume_per_unit: f64,
) -> VolumeTotals {
    let mut totals = VolumeTotals::default();

    for &id in containers {
        let unit = match host.unit(id) {
            Ok(unit) => unit,
            Err(e) => {
                log::warn!("aggregate: skipping container in volume scan: {}", e);
                continue;
            }
        };
        for inventory in &unit.inventories {
            totals.max_volume_l += inventory.max_volume_l;
            for item in inventory
                .items
                .iter()
                .filter(|i| i.subtype.eq_ignore_ascii_case(subtype))
            {
                totals.current_volume_l += item.amount * volume_per_unit;
                totals.matched_count += 1;
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StructureGraph;
    use crate::host::{Inventory, StructureId, UnitKind};

    const INGOT: &str = "MyObjectBuilder_Ingot";
    const ORE: &str = "MyObjectBuilder_Ore";

    fn container(
        g: &mut StructureGraph,
        s: StructureId,
        capacity: f64,
        items: &[(&str, &str, f64)],
    ) -> UnitId {
        let id = g.add_unit(s, "Cargo", UnitKind::Generic).unwrap();
        let mut inv = Inventory::with_capacity(capacity);
        for (type_id, subtype, amount) in items {
            inv = inv.with_item(InventoryItem::new(type_id, subtype, *amount));
        }
        g.add_inventory(id, inv).unwrap();
        id
    }

    #[test]
    fn test_sums_across_containers() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![
            container(&mut g, s, 100.0, &[(INGOT, "Iron", 50.0)]),
            container(&mut g, s, 200.0, &[(INGOT, "Iron", 10.0)]),
            container(&mut g, s, 300.0, &[(INGOT, "Gold", 5.0)]),
        ];
        let mut catalog = Catalog::with_builtin();
        let totals = aggregate(&g, &ids, &mut catalog, Some("Ingot"));
        assert_eq!(totals.items.len(), 2);
        assert_eq!(totals.amount_of("Iron"), 60);
        assert_eq!(totals.amount_of("Gold"), 5);
        assert!((totals.max_volume_l - 600.0).abs() < 1e-9);
        assert_eq!(totals.by_subtype("Iron").unwrap().definition.display_name, "Iron Ingot");
    }

    #[test]
    fn test_filter_excludes_other_categories() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![container(
            &mut g,
            s,
            100.0,
            &[(INGOT, "Iron", 1.0), (ORE, "Iron", 7.0)],
        )];
        let mut catalog = Catalog::with_builtin();
        let ingots = aggregate(&g, &ids, &mut catalog, Some("ingot"));
        assert_eq!(ingots.items.len(), 1);
        assert_eq!(ingots.amount_of("Iron"), 1);

        let everything = aggregate(&g, &ids, &mut catalog, None);
        assert_eq!(everything.items.len(), 2);
    }

    #[test]
    fn test_unknown_items_learned() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![container(&mut g, s, 10.0, &[("MyObjectBuilder_Component", "Widget", 3.0)])];
        let mut catalog = Catalog::with_builtin();
        let totals = aggregate(&g, &ids, &mut catalog, None);
        assert_eq!(totals.amount_of("Widget"), 3);
        assert_eq!(catalog.unknown().count(), 1);
        let item = totals.by_subtype("Widget").unwrap();
        assert!((item.volume_l() - 0.3).abs() < 1e-9);
        assert!(item.is_short());
    }

    #[test]
    fn test_fractional_stacks_summed_before_truncation() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ice = [(ORE, "Ice", 0.75); 4];
        let ids = vec![
            container(&mut g, s, 100.0, &ice[..2]),
            container(&mut g, s, 100.0, &ice[2..]),
        ];
        let mut catalog = Catalog::with_builtin();
        let totals = aggregate(&g, &ids, &mut catalog, None);
        let item = totals.by_subtype("Ice").unwrap();
        assert_eq!(item.amount, 3);
        assert!((item.total - 3.0).abs() < 1e-9);
        assert_eq!(totals.amount_of("Ice"), 3);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![container(&mut g, s, 10.0, &[(ORE, "Stone", 1e30), (ORE, "Stone", 1e30)])];
        let mut catalog = Catalog::with_builtin();
        let totals = aggregate(&g, &ids, &mut catalog, None);
        assert_eq!(totals.amount_of("Stone"), i64::MAX);
    }

    #[test]
    fn test_empty_containers_still_count_capacity() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![container(&mut g, s, 500.0, &[])];
        let mut catalog = Catalog::new();
        let totals = aggregate(&g, &ids, &mut catalog, None);
        assert!(totals.items.is_empty());
        assert!((totals.max_volume_l - 500.0).abs() < 1e-9);
        assert_eq!(totals.current_volume_l, 0.0);
    }

    #[test]
    fn test_unreadable_container_skipped() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let good = container(&mut g, s, 100.0, &[(INGOT, "Iron", 4.0)]);
        let ids = vec![UnitId(999), good];
        let mut catalog = Catalog::with_builtin();
        let totals = aggregate(&g, &ids, &mut catalog, None);
        assert_eq!(totals.containers_failed, 1);
        assert_eq!(totals.containers_read, 1);
        assert_eq!(totals.amount_of("Iron"), 4);
    }

    #[test]
    fn test_resource_volume_empty_but_has_capacity() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![
            container(&mut g, s, 100.0, &[(INGOT, "Iron", 4.0)]),
            container(&mut g, s, 50.0, &[]),
        ];
        let v = resource_volume(&g, &ids, "Ice", 0.37);
        assert!(v.max_volume_l > 0.0);
        assert_eq!(v.current_volume_l, 0.0);
        assert_eq!(v.matched_count, 0);
    }

    #[test]
    fn test_resource_volume_sums_matches() {
        let mut g = StructureGraph::new();
        let s = g.add_structure("Base");
        let ids = vec![
            container(&mut g, s, 1000.0, &[(ORE, "Ice", 100.0)]),
            container(&mut g, s, 1000.0, &[(ORE, "Ice", 300.0), (ORE, "Stone", 5.0)]),
        ];
        let v = resource_volume(&g, &ids, "ice", 0.5);
        assert!((v.current_volume_l - 200.0).abs() < 1e-9);
        assert!((v.max_volume_l - 2000.0).abs() < 1e-9);
        assert_eq!(v.matched_count, 2);
        assert!((v.current_volume_l / v.max_volume_l - 0.1).abs() < 1e-9);
    }
}
