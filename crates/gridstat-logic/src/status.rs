//! Plain status rows handed to the drawing layer.
//!
//! A row is `(label, current, target, measure)`; turning rows into sprites
//! or text is the renderer's business.

use serde::Serialize;

use crate::aggregate::{InventoryTotals, VolumeTotals};

/// Unit a row's numbers are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measure {
    Count,
    Liters,
    Percent,
}

/// One bar or line of a status view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    pub label: String,
    pub current: f64,
    pub target: f64,
    pub measure: Measure,
}

impl StatusRow {
    pub fn new(label: &str, current: f64, target: f64, measure: Measure) -> Self {
        Self {
            label: label.to_string(),
            current,
            target,
            measure,
        }
    }

    pub fn fill_ratio(&self) -> f64 {
        fill_ratio(self.current, self.target)
    }

    pub fn below_target(&self) -> bool {
        self.current < self.target
    }
}

/// `current / target` clamped to `0.0..=1.0`; 0 when there is no target.
pub fn fill_ratio(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        0.0
    } else {
        (current / target).clamp(0.0, 1.0)
    }
}

/// One row per aggregated item, ordered by sort group then display name.
pub fn item_rows(totals: &InventoryTotals) -> Vec<StatusRow> {
    let mut items: Vec<_> = totals.items.values().collect();
    items.sort_by(|a, b| {
        a.definition
            .sort_group
            .cmp(&b.definition.sort_group)
            .then_with(|| a.definition.display_name.cmp(&b.definition.display_name))
    });
    items
        .into_iter()
        .map(|item| {
            StatusRow::new(
                &item.definition.display_name,
                item.amount as f64,
                item.definition.min_desired_amount as f64,
                Measure::Count,
            )
        })
        .collect()
}

/// Liters of one resource against total capacity.
pub fn volume_row(label: &str, volume: &VolumeTotals) -> StatusRow {
    StatusRow::new(label, volume.current_volume_l, volume.max_volume_l, Measure::Liters)
}

/// Overall container fill as a percentage.
pub fn capacity_row(totals: &InventoryTotals) -> StatusRow {
    let percent = fill_ratio(totals.current_volume_l, totals.max_volume_l) * 100.0;
    StatusRow::new("Capacity", percent, 100.0, Measure::Percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregatedItem, ItemKey};
    use crate::catalog::ItemDefinition;
    use crate::host::InventoryItem;
    use std::sync::Arc;

    fn item(
        category: &str,
        subtype: &str,
        name: &str,
        group: &str,
        amount: i64,
    ) -> (ItemKey, AggregatedItem) {
        (
            ItemKey {
                category: category.into(),
                subtype: subtype.into(),
            },
            AggregatedItem {
                definition: Arc::new(ItemDefinition::new(category, subtype, name, 1.0, group, 100)),
                sample: InventoryItem::new(category, subtype, amount as f64),
                total: amount as f64,
                amount,
            },
        )
    }

    #[test]
    fn test_item_rows_sorted_by_group_then_name() {
        let mut totals = InventoryTotals::default();
        for (k, v) in [
            item("Ingot", "Iron", "Iron Ingot", "ingot", 5),
            item("Ore", "Ice", "Ice", "ore", 500),
            item("Ingot", "Gold", "Gold Ingot", "ingot", 200),
        ] {
            totals.items.insert(k, v);
        }
        let rows = item_rows(&totals);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Gold Ingot", "Iron Ingot", "Ice"]);
        assert!(rows[1].below_target());
        assert_eq!(rows[0].fill_ratio(), 1.0);
        assert_eq!(rows[1].measure, Measure::Count);
    }

    #[test]
    fn test_volume_row_without_capacity() {
        let row = volume_row("Ice", &VolumeTotals::default());
        assert_eq!(row.fill_ratio(), 0.0);
        assert_eq!(row.measure, Measure::Liters);
    }

    #[test]
    fn test_capacity_row() {
        let totals = InventoryTotals {
            max_volume_l: 200.0,
            current_volume_l: 50.0,
            ..Default::default()
        };
        let row = capacity_row(&totals);
        assert!((row.current - 25.0).abs() < 1e-9);
        assert!((row.fill_ratio() - 0.25).abs() < 1e-9);
    }
}
