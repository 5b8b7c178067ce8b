//! In-memory structure graph implementing [`UnitHost`].
//!
//! `StructureGraph` is what tests and the headless harness feed the core in
//! place of a live game session. Structures own ordered unit lists; docking
//! and joint links are stored on the units themselves, exactly as a host
//! would expose them.

use std::collections::HashMap;

use crate::error::{HostError, HostResult};
use crate::host::{Inventory, StructureId, UnitHost, UnitId, UnitKind, UnitNode};

#[derive(Debug, Clone)]
struct StructureEntry {
    name: String,
    units: Vec<UnitId>,
}

/// Host graph held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct StructureGraph {
    structures: HashMap<StructureId, StructureEntry>,
    units: HashMap<UnitId, UnitNode>,
    next_structure: u32,
    next_unit: u32,
}

impl StructureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty structure.
    pub fn add_structure(&mut self, name: &str) -> StructureId {
        self.next_structure += 1;
        let id = StructureId(self.next_structure);
        self.structures.insert(
            id,
            StructureEntry {
                name: name.to_string(),
                units: Vec::new(),
            },
        );
        id
    }

    /// Add a unit at the end of `structure`'s enumeration order.
    pub fn add_unit(
        &mut self,
        structure: StructureId,
        name: &str,
        kind: UnitKind,
    ) -> HostResult<UnitId> {
        let entry = self
            .structures
            .get_mut(&structure)
            .ok_or(HostError::UnknownStructure(structure))?;
        self.next_unit += 1;
        let id = UnitId(self.next_unit);
        entry.units.push(id);
        self.units
            .insert(id, UnitNode::new(id, structure, name, kind));
        Ok(id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> HostResult<&mut UnitNode> {
        self.units.get_mut(&id).ok_or(HostError::UnknownUnit(id))
    }

    pub fn add_inventory(&mut self, unit: UnitId, inventory: Inventory) -> HostResult<()> {
        let node = self.unit_mut(unit)?;
        node.caps.cargo = true;
        node.inventories.push(inventory);
        Ok(())
    }

    /// Connect two connectors. Both sides see the other's structure.
    pub fn dock(&mut self, a: UnitId, b: UnitId) -> HostResult<()> {
        let structure_a = self.unit(a)?.structure;
        let structure_b = self.unit(b)?.structure;
        self.set_kind(
            a,
            UnitKind::Connector {
                docked_to: Some(structure_b),
            },
        )?;
        self.set_kind(
            b,
            UnitKind::Connector {
                docked_to: Some(structure_a),
            },
        )
    }

    /// Disconnect a connector and whichever connector on the far side points back.
    pub fn undock(&mut self, connector: UnitId) -> HostResult<()> {
        let near = self.unit(connector)?.structure;
        let far = self.unit(connector)?.docked_structure();
        self.set_kind(connector, UnitKind::Connector { docked_to: None })?;
        if let Some(far) = far {
            let partners: Vec<UnitId> = self
                .structure_units(far)?
                .iter()
                .copied()
                .filter(|id| {
                    self.units
                        .get(id)
                        .is_some_and(|u| u.docked_structure() == Some(near))
                })
                .collect();
            for partner in partners {
                self.set_kind(partner, UnitKind::Connector { docked_to: None })?;
            }
        }
        Ok(())
    }

    /// Attach `top` as the head of the joint whose base is `base`.
    pub fn attach_joint(&mut self, base: UnitId, top: StructureId) -> HostResult<()> {
        if !self.structures.contains_key(&top) {
            return Err(HostError::UnknownStructure(top));
        }
        self.set_kind(base, UnitKind::JointBase { top: Some(top) })
    }

    /// Drop a structure while leaving links to it dangling, as a host does
    /// for a grid destroyed between frames.
    pub fn remove_structure(&mut self, id: StructureId) -> HostResult<()> {
        let entry = self
            .structures
            .remove(&id)
            .ok_or(HostError::UnknownStructure(id))?;
        for unit in entry.units {
            self.units.remove(&unit);
        }
        Ok(())
    }

    pub fn structure_name(&self, id: StructureId) -> Option<&str> {
        self.structures.get(&id).map(|s| s.name.as_str())
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn set_kind(&mut self, id: UnitId, kind: UnitKind) -> HostResult<()> {
        let node = self.unit_mut(id)?;
        node.caps.add_kind(&kind);
        node.kind = kind;
        Ok(())
    }
}

impl UnitHost for StructureGraph {
    fn structure_units(&self, structure: StructureId) -> HostResult<&[UnitId]> {
        self.structures
            .get(&structure)
            .map(|s| s.units.as_slice())
            .ok_or(HostError::UnknownStructure(structure))
    }

    fn unit(&self, id: UnitId) -> HostResult<&UnitNode> {
        self.units.get(&id).ok_or(HostError::UnknownUnit(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_units_keeps_order() {
        let mut graph = StructureGraph::new();
        let s = graph.add_structure("Station");
        let a = graph.add_unit(s, "A", UnitKind::Generic).unwrap();
        let b = graph.add_unit(s, "B", UnitKind::Generic).unwrap();
        assert_eq!(graph.structure_units(s).unwrap(), &[a, b]);
        assert_eq!(graph.unit(b).unwrap().display_name, "B");
        assert_eq!(graph.structure_name(s), Some("Station"));
    }

    #[test]
    fn test_add_unit_to_missing_structure() {
        let mut graph = StructureGraph::new();
        let err = graph
            .add_unit(StructureId(42), "X", UnitKind::Generic)
            .unwrap_err();
        assert_eq!(err, HostError::UnknownStructure(StructureId(42)));
    }

    #[test]
    fn test_dock_is_bidirectional() {
        let mut graph = StructureGraph::new();
        let s1 = graph.add_structure("Base");
        let s2 = graph.add_structure("Ship");
        let c1 = graph
            .add_unit(s1, "Con", UnitKind::Connector { docked_to: None })
            .unwrap();
        let c2 = graph
            .add_unit(s2, "Con", UnitKind::Connector { docked_to: None })
            .unwrap();
        graph.dock(c1, c2).unwrap();
        assert_eq!(graph.unit(c1).unwrap().docked_structure(), Some(s2));
        assert_eq!(graph.unit(c2).unwrap().docked_structure(), Some(s1));

        graph.undock(c1).unwrap();
        assert_eq!(graph.unit(c1).unwrap().docked_structure(), None);
        assert_eq!(graph.unit(c2).unwrap().docked_structure(), None);
    }

    #[test]
    fn test_attach_joint() {
        let mut graph = StructureGraph::new();
        let s1 = graph.add_structure("Base");
        let s2 = graph.add_structure("Rotor Top");
        let rotor = graph
            .add_unit(s1, "Rotor", UnitKind::JointBase { top: None })
            .unwrap();
        graph.attach_joint(rotor, s2).unwrap();
        assert_eq!(graph.unit(rotor).unwrap().joint_top(), Some(s2));
        assert!(graph.unit(rotor).unwrap().caps.mechanical_joint);
        assert!(graph.attach_joint(rotor, StructureId(99)).is_err());
    }

    #[test]
    fn test_remove_structure_leaves_dangling_links() {
        let mut graph = StructureGraph::new();
        let s1 = graph.add_structure("Base");
        let s2 = graph.add_structure("Doomed");
        let rotor = graph
            .add_unit(s1, "Rotor", UnitKind::JointBase { top: None })
            .unwrap();
        graph.add_unit(s2, "Cargo", UnitKind::Generic).unwrap();
        graph.attach_joint(rotor, s2).unwrap();
        graph.remove_structure(s2).unwrap();
        assert_eq!(graph.structure_count(), 1);
        assert_eq!(graph.unit_count(), 1);
        assert!(graph.structure_units(s2).is_err());
    }
}
