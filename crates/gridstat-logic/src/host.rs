//! Host-side model of structures, units and their inventories.
//!
//! The host environment owns every structure and unit. The core only ever
//! holds copyable handles ([`StructureId`], [`UnitId`]) so that scan results
//! can be cached across ticks without borrowing host data.
//!
//! Dynamic type checks ("is this a battery?", "is this a connector?") are
//! answered once, when the host builds the [`UnitNode`]: link semantics live
//! in [`UnitKind`], everything else in the [`Capabilities`] flag record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HostResult;

/// Handle of a structure (a grid of connected units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(pub u32);

/// Handle of a single unit on some structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

/// How a unit links its structure to others, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnitKind {
    /// Plain unit with no structural links.
    Generic,
    /// Docking connector. `docked_to` is the far structure while connected.
    Connector { docked_to: Option<StructureId> },
    /// Base of a rotor, piston or hinge. `top` is the attached top's structure.
    JointBase { top: Option<StructureId> },
    /// Ship controller (cockpit, remote). Reports mass, never listed as a result.
    Mover { mass_kg: f64 },
}

/// Capability flags sniffed by the host when the unit is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub door: bool,
    pub power_producer: bool,
    pub battery: bool,
    pub reactor: bool,
    pub tank: bool,
    pub cargo: bool,
    pub connector: bool,
    pub mechanical_joint: bool,
    pub mover: bool,
}

impl Capabilities {
    /// Flags implied by a unit kind. Hosts can OR further flags on top.
    pub fn for_kind(kind: &UnitKind) -> Self {
        let mut caps = Self::default();
        caps.add_kind(kind);
        caps
    }

    /// Set the flag implied by `kind`, leaving the others untouched.
    pub fn add_kind(&mut self, kind: &UnitKind) {
        match kind {
            UnitKind::Generic => {}
            UnitKind::Connector { .. } => self.connector = true,
            UnitKind::JointBase { .. } => self.mechanical_joint = true,
            UnitKind::Mover { .. } => self.mover = true,
        }
    }
}

/// A single stack inside an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Raw host category identifier, e.g. `MyObjectBuilder_Ingot`.
    pub type_id: String,
    pub subtype: String,
    pub amount: f64,
}

impl InventoryItem {
    pub fn new(type_id: &str, subtype: &str, amount: f64) -> Self {
        Self {
            type_id: type_id.to_string(),
            subtype: subtype.to_string(),
            amount,
        }
    }

    /// Category token derived from the raw type id.
    pub fn category(&self) -> &str {
        category_token(&self.type_id)
    }
}

/// One inventory of a unit (a unit may have several, e.g. refinery in/out).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Capacity in liters.
    pub max_volume_l: f64,
    /// Occupied volume in liters as reported by the host.
    pub current_volume_l: f64,
    pub items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn with_capacity(max_volume_l: f64) -> Self {
        Self {
            max_volume_l,
            ..Default::default()
        }
    }

    pub fn with_item(mut self, item: InventoryItem) -> Self {
        self.items.push(item);
        self
    }
}

/// A traversable physical unit as exposed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitNode {
    pub id: UnitId,
    pub structure: StructureId,
    pub display_name: String,
    pub kind: UnitKind,
    pub caps: Capabilities,
    pub is_functional: bool,
    pub is_working: bool,
    pub inventories: Vec<Inventory>,
}

impl UnitNode {
    pub fn new(id: UnitId, structure: StructureId, display_name: &str, kind: UnitKind) -> Self {
        Self {
            id,
            structure,
            display_name: display_name.to_string(),
            caps: Capabilities::for_kind(&kind),
            kind,
            is_functional: true,
            is_working: true,
            inventories: Vec::new(),
        }
    }

    pub fn has_inventory(&self) -> bool {
        !self.inventories.is_empty()
    }

    pub fn inventory_count(&self) -> usize {
        self.inventories.len()
    }

    pub fn is_mover(&self) -> bool {
        matches!(self.kind, UnitKind::Mover { .. })
    }

    /// Far structure of a connected docking connector.
    pub fn docked_structure(&self) -> Option<StructureId> {
        match self.kind {
            UnitKind::Connector { docked_to } => docked_to,
            _ => None,
        }
    }

    /// Top structure of a mechanical joint base with an attached top.
    pub fn joint_top(&self) -> Option<StructureId> {
        match self.kind {
            UnitKind::JointBase { top } => top,
            _ => None,
        }
    }
}

/// Read access to the host's unit graph.
///
/// Lookups may fail when a handle went stale between frames (a structure
/// was destroyed or merged). Callers treat failures as "skip and log".
pub trait UnitHost {
    /// Units directly on `structure`, in host enumeration order.
    fn structure_units(&self, structure: StructureId) -> HostResult<&[UnitId]>;

    fn unit(&self, id: UnitId) -> HostResult<&UnitNode>;
}

/// Category token of a raw type id: the text after the last `_`.
///
/// `MyObjectBuilder_Ingot` → `Ingot`; ids without `_` are returned whole.
pub fn category_token(type_id: &str) -> &str {
    match type_id.rfind('_') {
        Some(idx) => &type_id[idx + 1..],
        None => type_id,
    }
}
