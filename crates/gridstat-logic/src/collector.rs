//! Graph collector — finds matching units across linked structures.
//!
//! Starting from a root structure, the collector enumerates units and
//! follows two kinds of links:
//!
//! - **Docking**: a connected connector leads to the far structure. That
//!   structure is walked with docking disabled, so a connector pair can never
//!   bounce the walk back and forth.
//! - **Mechanical joints**: a rotor/piston/hinge base leads to its top's
//!   structure, walked with joints enabled and the caller's docking flag.
//!
//! The walk uses an explicit task stack instead of recursion, so stack depth
//! stays constant however deep the joint chains go. Tasks are pushed in
//! reverse so results come out in the same order a depth-first recursive walk
//! would produce: a unit's linked sub-structure is emitted right before the
//! unit itself. A visited set keyed by structure id guarantees each structure
//! is expanded at most once, cycles included.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::host::{StructureId, UnitHost, UnitId, UnitKind};
use crate::matcher::MatchRule;

/// Which links the collector follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectOptions {
    /// Follow mechanical joints into sub-structures.
    pub include_subgrids: bool,
    /// Follow connected docking connectors.
    pub include_docked: bool,
}

impl CollectOptions {
    /// Root structure only.
    pub const PRIMARY: CollectOptions = CollectOptions {
        include_subgrids: false,
        include_docked: false,
    };

    pub fn new(include_subgrids: bool, include_docked: bool) -> Self {
        Self {
            include_subgrids,
            include_docked,
        }
    }

    /// Whether any link is followed at all.
    pub fn follows_links(&self) -> bool {
        self.include_subgrids || self.include_docked
    }
}

/// Ship-controller metadata captured during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoverInfo {
    pub unit: UnitId,
    pub structure: StructureId,
    pub mass_kg: f64,
}

/// Result of one walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Matching units in walk order.
    pub units: Vec<UnitId>,
    /// Movers seen on any expanded structure, matched or not.
    pub movers: Vec<MoverInfo>,
    /// Expanded structures in expansion order, root first.
    pub structures: Vec<StructureId>,
    /// Host lookups that failed and were skipped.
    pub errors: usize,
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Expand {
        structure: StructureId,
        options: CollectOptions,
    },
    Descend {
        structure: StructureId,
        options: CollectOptions,
    },
    Emit(UnitId),
}

/// Walk `root` and return every unit whose display name passes `rule`.
///
/// Never fails: stale structure or unit handles are logged, counted in
/// [`Collection::errors`] and skipped, and the walk carries on with what it
/// can still reach.
pub fn collect(
    host: &dyn UnitHost,
    root: StructureId,
    rule: &MatchRule,
    options: CollectOptions,
) -> Collection {
    let mut out = Collection::default();
    let mut visited: HashSet<StructureId> = HashSet::new();
    visited.insert(root);

    let mut stack = vec![Task::Expand {
        structure: root,
        options,
    }];

    while let Some(task) = stack.pop() {
        match task {
            Task::Emit(unit) => out.units.push(unit),
            Task::Descend { structure, options } => {
                // Marked before expansion so a failing expansion is not retried.
                if visited.insert(structure) {
                    stack.push(Task::Expand { structure, options });
                }
            }
            Task::Expand { structure, options } => {
                let pending = expand(host, structure, rule, options, &mut out);
                stack.extend(pending.into_iter().rev());
            }
        }
    }

    log::debug!(
        "collector: {} units across {} structures from {} ({} errors)",
        out.units.len(),
        out.structures.len(),
        root,
        out.errors
    );
    out
}

/// Enumerate one structure's units into tasks, in walk order.
fn expand(
    host: &dyn UnitHost,
    structure: StructureId,
    rule: &MatchRule,
    options: CollectOptions,
    out: &mut Collection,
) -> Vec<Task> {
    let units = match host.structure_units(structure) {
        Ok(units) => units,
        Err(e) => {
            log::warn!("collector: skipping structure {}: {}", structure, e);
            out.errors += 1;
            return Vec::new();
        }
    };
    out.structures.push(structure);

    let mut tasks = Vec::with_capacity(units.len());
    for &id in units {
        let node = match host.unit(id) {
            Ok(node) => node,
            Err(e) => {
                log::warn!("collector: skipping unit on {}: {}", structure, e);
                out.errors += 1;
                continue;
            }
        };

        if let UnitKind::Mover { mass_kg } = node.kind {
            out.movers.push(MoverInfo {
                unit: id,
                structure,
                mass_kg,
            });
        }

        if options.include_docked {
            if let Some(far) = node.docked_structure() {
                tasks.push(Task::Descend {
                    structure: far,
                    options: CollectOptions {
                        include_docked: false,
                        ..options
                    },
                });
            }
        }

        if options.include_subgrids {
            if let Some(top) = node.joint_top() {
                tasks.push(Task::Descend {
                    structure: top,
                    options,
                });
            }
        }

        if !node.is_mover() && rule.matches(&node.display_name) {
            tasks.push(Task::Emit(id));
        }
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StructureGraph;

    fn all() -> MatchRule {
        MatchRule::match_all()
    }

    fn names(graph: &StructureGraph, units: &[UnitId]) -> Vec<String> {
        units
            .iter()
            .map(|u| graph.unit(*u).unwrap().display_name.clone())
            .collect()
    }

    /// Station with a rotor sub-structure and a docked ship.
    fn station() -> (StructureGraph, StructureId, StructureId, StructureId) {
        let mut g = StructureGraph::new();
        let base = g.add_structure("Station");
        let top = g.add_structure("Rotor Head");
        let ship = g.add_structure("Miner");

        g.add_unit(base, "Base Cargo", UnitKind::Generic).unwrap();
        let rotor = g
            .add_unit(base, "Rotor", UnitKind::JointBase { top: None })
            .unwrap();
        let con = g
            .add_unit(base, "Base Connector", UnitKind::Connector { docked_to: None })
            .unwrap();
        g.attach_joint(rotor, top).unwrap();

        g.add_unit(top, "Head Cargo", UnitKind::Generic).unwrap();

        let ship_con = g
            .add_unit(ship, "Ship Connector", UnitKind::Connector { docked_to: None })
            .unwrap();
        g.add_unit(ship, "Ship Cargo", UnitKind::Generic).unwrap();
        g.add_unit(ship, "Cockpit", UnitKind::Mover { mass_kg: 12_000.0 })
            .unwrap();
        g.dock(con, ship_con).unwrap();

        (g, base, top, ship)
    }

    #[test]
    fn test_primary_only() {
        let (g, base, _, _) = station();
        let c = collect(&g, base, &all(), CollectOptions::PRIMARY);
        assert_eq!(names(&g, &c.units), vec!["Base Cargo", "Rotor", "Base Connector"]);
        assert_eq!(c.structures, vec![base]);
    }

    #[test]
    fn test_subgrids_emitted_before_joint_base() {
        let (g, base, top, _) = station();
        let c = collect(&g, base, &all(), CollectOptions::new(true, false));
        assert_eq!(
            names(&g, &c.units),
            vec!["Base Cargo", "Head Cargo", "Rotor", "Base Connector"]
        );
        assert_eq!(c.structures, vec![base, top]);
    }

    #[test]
    fn test_docked_structure_walked() {
        let (g, base, _, ship) = station();
        let c = collect(&g, base, &all(), CollectOptions::new(false, true));
        assert_eq!(
            names(&g, &c.units),
            vec!["Base Cargo", "Rotor", "Ship Connector", "Ship Cargo", "Base Connector"]
        );
        assert!(c.structures.contains(&ship));
    }

    #[test]
    fn test_movers_go_to_side_channel() {
        let (g, base, _, ship) = station();
        let c = collect(&g, base, &all(), CollectOptions::new(true, true));
        assert!(!names(&g, &c.units).contains(&"Cockpit".to_string()));
        assert_eq!(c.movers.len(), 1);
        assert_eq!(c.movers[0].structure, ship);
        assert!((c.movers[0].mass_kg - 12_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rule_filters_units() {
        let (g, base, _, _) = station();
        let rule = MatchRule::new("cargo", &["ship"]);
        let c = collect(&g, base, &rule, CollectOptions::new(true, true));
        assert_eq!(names(&g, &c.units), vec!["Base Cargo", "Head Cargo"]);
    }

    #[test]
    fn test_docking_cycle_terminates() {
        // A docked to B, B docked to A through a second connector pair.
        let mut g = StructureGraph::new();
        let a = g.add_structure("A");
        let b = g.add_structure("B");
        let a1 = g.add_unit(a, "A1", UnitKind::Generic).unwrap();
        let a2 = g.add_unit(a, "A2", UnitKind::Generic).unwrap();
        let b1 = g.add_unit(b, "B1", UnitKind::Generic).unwrap();
        let b2 = g.add_unit(b, "B2", UnitKind::Generic).unwrap();
        g.dock(a1, b1).unwrap();
        g.dock(a2, b2).unwrap();

        let c = collect(&g, a, &all(), CollectOptions::new(true, true));
        assert_eq!(c.structures, vec![a, b]);
        assert_eq!(c.units.len(), 4);
    }

    #[test]
    fn test_joint_cycle_terminates() {
        // Physically impossible but a buggy host could report it.
        let mut g = StructureGraph::new();
        let a = g.add_structure("A");
        let b = g.add_structure("B");
        let ra = g.add_unit(a, "RA", UnitKind::JointBase { top: None }).unwrap();
        let rb = g.add_unit(b, "RB", UnitKind::JointBase { top: None }).unwrap();
        g.attach_joint(ra, b).unwrap();
        g.attach_joint(rb, a).unwrap();

        let c = collect(&g, a, &all(), CollectOptions::new(true, false));
        assert_eq!(c.structures, vec![a, b]);
        assert_eq!(names(&g, &c.units), vec!["RB", "RA"]);
    }

    #[test]
    fn test_docked_structure_does_not_follow_docks() {
        // A <-> B <-> C: from A, C is only reachable through B's dock.
        let mut g = StructureGraph::new();
        let a = g.add_structure("A");
        let b = g.add_structure("B");
        let c_id = g.add_structure("C");
        let ab = g.add_unit(a, "A-B", UnitKind::Generic).unwrap();
        let ba = g.add_unit(b, "B-A", UnitKind::Generic).unwrap();
        let bc = g.add_unit(b, "B-C", UnitKind::Generic).unwrap();
        let cb = g.add_unit(c_id, "C-B", UnitKind::Generic).unwrap();
        g.dock(ab, ba).unwrap();
        g.dock(bc, cb).unwrap();

        let c = collect(&g, a, &all(), CollectOptions::new(true, true));
        assert_eq!(c.structures, vec![a, b]);
    }

    #[test]
    fn test_docked_structure_still_follows_joints() {
        let mut g = StructureGraph::new();
        let a = g.add_structure("A");
        let b = g.add_structure("B");
        let top = g.add_structure("B Top");
        let ab = g.add_unit(a, "A-B", UnitKind::Generic).unwrap();
        let ba = g.add_unit(b, "B-A", UnitKind::Generic).unwrap();
        let rotor = g.add_unit(b, "Rotor", UnitKind::JointBase { top: None }).unwrap();
        g.add_unit(top, "Drill", UnitKind::Generic).unwrap();
        g.dock(ab, ba).unwrap();
        g.attach_joint(rotor, top).unwrap();

        let c = collect(&g, a, &all(), CollectOptions::new(true, true));
        assert_eq!(c.structures, vec![a, b, top]);
        assert!(names(&g, &c.units).contains(&"Drill".to_string()));
    }

    #[test]
    fn test_stale_structure_returns_partial() {
        let (mut g, base, top, _) = station();
        g.remove_structure(top).unwrap();
        let c = collect(&g, base, &all(), CollectOptions::new(true, false));
        assert_eq!(c.errors, 1);
        assert_eq!(names(&g, &c.units), vec!["Base Cargo", "Rotor", "Base Connector"]);
    }

    #[test]
    fn test_missing_root() {
        let g = StructureGraph::new();
        let c = collect(&g, StructureId(7), &all(), CollectOptions::new(true, true));
        assert!(c.units.is_empty());
        assert_eq!(c.errors, 1);
    }
}
