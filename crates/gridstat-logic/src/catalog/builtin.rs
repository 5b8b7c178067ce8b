//! Built-in item rows seeded into every catalog.
//!
//! Columns: category, subtype, display name, liters per unit, sort group,
//! minimum desired amount.

pub(crate) type BuiltinRow = (&'static str, &'static str, &'static str, f64, &'static str, i64);

pub(crate) const BUILTIN_ITEMS: &[BuiltinRow] = &[
    // Ores
    ("Ore", "Stone", "Stone", 0.37, "ore", 0),
    ("Ore", "Iron", "Iron Ore", 0.37, "ore", 10_000),
    ("Ore", "Nickel", "Nickel Ore", 0.37, "ore", 5_000),
    ("Ore", "Cobalt", "Cobalt Ore", 0.37, "ore", 3_000),
    ("Ore", "Magnesium", "Magnesium Ore", 0.37, "ore", 1_000),
    ("Ore", "Silicon", "Silicon Ore", 0.37, "ore", 5_000),
    ("Ore", "Silver", "Silver Ore", 0.37, "ore", 1_000),
    ("Ore", "Gold", "Gold Ore", 0.37, "ore", 1_000),
    ("Ore", "Platinum", "Platinum Ore", 0.37, "ore", 500),
    ("Ore", "Uranium", "Uranium Ore", 0.37, "ore", 500),
    ("Ore", "Ice", "Ice", 0.37, "ore", 10_000),
    ("Ore", "Scrap", "Scrap Metal", 0.254, "ore", 0),
    // Ingots
    ("Ingot", "Stone", "Gravel", 0.37, "ingot", 500),
    ("Ingot", "Iron", "Iron Ingot", 0.127, "ingot", 20_000),
    ("Ingot", "Nickel", "Nickel Ingot", 0.112, "ingot", 5_000),
    ("Ingot", "Cobalt", "Cobalt Ingot", 0.112, "ingot", 2_000),
    ("Ingot", "Magnesium", "Magnesium Powder", 0.575, "ingot", 500),
    ("Ingot", "Silicon", "Silicon Wafer", 0.429, "ingot", 3_000),
    ("Ingot", "Silver", "Silver Ingot", 0.095, "ingot", 1_000),
    ("Ingot", "Gold", "Gold Ingot", 0.052, "ingot", 500),
    ("Ingot", "Platinum", "Platinum Ingot", 0.047, "ingot", 200),
    ("Ingot", "Uranium", "Uranium Ingot", 0.052, "ingot", 100),
    // Components
    ("Component", "SteelPlate", "Steel Plate", 3.0, "component", 5_000),
    ("Component", "InteriorPlate", "Interior Plate", 5.0, "component", 1_000),
    ("Component", "Construction", "Construction Comp.", 2.0, "component", 2_000),
    ("Component", "MetalGrid", "Metal Grid", 15.0, "component", 500),
    ("Component", "SmallTube", "Small Steel Tube", 2.0, "component", 1_000),
    ("Component", "LargeTube", "Large Steel Tube", 38.0, "component", 200),
    ("Component", "Motor", "Motor", 8.0, "component", 500),
    ("Component", "Computer", "Computer", 1.0, "component", 500),
    ("Component", "Display", "Display", 6.0, "component", 200),
    ("Component", "BulletproofGlass", "Bulletproof Glass", 8.0, "component", 200),
    ("Component", "Girder", "Girder", 2.0, "component", 200),
    ("Component", "PowerCell", "Power Cell", 40.0, "component", 100),
    ("Component", "SolarCell", "Solar Cell", 12.0, "component", 100),
    ("Component", "RadioCommunication", "Radio-comm Comp.", 70.0, "component", 50),
    ("Component", "Detector", "Detector Comp.", 6.0, "component", 50),
    ("Component", "Medical", "Medical Comp.", 160.0, "component", 20),
    ("Component", "Reactor", "Reactor Comp.", 8.0, "component", 50),
    ("Component", "Thrust", "Thruster Comp.", 10.0, "component", 100),
    ("Component", "GravityGenerator", "GravGen Comp.", 200.0, "component", 10),
    ("Component", "Superconductor", "Superconductor", 8.0, "component", 50),
    ("Component", "Explosives", "Explosives", 2.0, "component", 20),
    // Ammunition
    ("AmmoMagazine", "NATO_5p56x45mm", "5.56x45mm NATO", 0.2, "ammo", 100),
    ("AmmoMagazine", "NATO_25x184mm", "25x184mm NATO", 16.0, "ammo", 50),
    ("AmmoMagazine", "Missile200mm", "200mm Missile", 60.0, "ammo", 20),
    // Tools and bottles
    ("PhysicalGunObject", "Welder2Item", "Enhanced Welder", 8.0, "tool", 0),
    ("PhysicalGunObject", "AngleGrinder2Item", "Enh. Grinder", 20.0, "tool", 0),
    ("PhysicalGunObject", "HandDrill2Item", "Enh. Hand Drill", 25.0, "tool", 0),
    ("OxygenContainerObject", "OxygenBottle", "Oxygen Bottle", 120.0, "bottle", 5),
    ("GasContainerObject", "HydrogenBottle", "Hydrogen Bottle", 120.0, "bottle", 5),
];
