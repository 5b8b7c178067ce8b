//! GridStat Headless Harness
//!
//! Validates scanning, catalog and aggregation logic against synthetic
//! structure graphs. Runs entirely in-process — no game session, no
//! rendering.
//!
//! Usage:
//!   cargo run -p gridstat-simtest
//!   cargo run -p gridstat-simtest -- --verbose

use std::collections::HashSet;

use gridstat_logic::aggregate::{aggregate, resource_volume};
use gridstat_logic::catalog::overrides::{parse_overrides, InlineOverrideSource};
use gridstat_logic::catalog::{Catalog, LoadState, DEFAULT_SORT_GROUP};
use gridstat_logic::collector::{collect, CollectOptions};
use gridstat_logic::error::HostResult;
use gridstat_logic::graph::StructureGraph;
use gridstat_logic::host::{Inventory, InventoryItem, StructureId, UnitHost, UnitId, UnitKind};
use gridstat_logic::matcher::{matches, MatchRule};
use gridstat_logic::scheduler::{ScanOptions, ScanScheduler};
use gridstat_logic::status::item_rows;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Override file (same text a world would ship) ────────────────────────
const OVERRIDES: &str = include_str!("../../../data/item_overrides.txt");

const SEEDS: [u64; 6] = [1, 7, 42, 1337, 9001, 65535];

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== GridStat Harness ===\n");

    let mut results = Vec::new();

    // 1. Name matching rules
    results.extend(validate_matcher(verbose));

    // 2. Collector on random linked graphs
    results.extend(validate_collector(verbose));

    // 3. Scheduler freshness
    results.extend(validate_scheduler(verbose));

    // 4. Catalog resolution tiers
    results.extend(validate_catalog(verbose));

    // 5. Override file ingest
    results.extend(validate_overrides(verbose));

    // 6. Inventory aggregation
    results.extend(validate_aggregation(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Random graphs ───────────────────────────────────────────────────────

/// Random fleet with docking rings, joint chains (cycles allowed) and a
/// few movers. Cargo names occasionally carry a "Hidden" prefix.
fn random_fleet(seed: u64, size: usize) -> HostResult<(StructureGraph, Vec<StructureId>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = StructureGraph::new();
    let ids: Vec<StructureId> = (0..size)
        .map(|i| g.add_structure(&format!("Grid {}", i)))
        .collect();

    for (i, &s) in ids.iter().enumerate() {
        for c in 0..rng.gen_range(1..4) {
            let name = if rng.gen_bool(0.2) {
                format!("Hidden Cargo {}-{}", i, c)
            } else {
                format!("Cargo {}-{}", i, c)
            };
            let unit = g.add_unit(s, &name, UnitKind::Generic)?;
            let mut inv = Inventory::with_capacity(rng.gen_range(1..20) as f64 * 100.0);
            if rng.gen_bool(0.7) {
                inv = inv.with_item(InventoryItem::new(
                    "MyObjectBuilder_Ingot",
                    "Iron",
                    rng.gen_range(1..500) as f64,
                ));
            }
            g.add_inventory(unit, inv)?;
        }
        if rng.gen_bool(0.25) {
            g.add_unit(
                s,
                &format!("Cockpit {}", i),
                UnitKind::Mover {
                    mass_kg: rng.gen_range(1_000.0..50_000.0),
                },
            )?;
        }
    }

    for _ in 0..size {
        let a = ids[rng.gen_range(0..size)];
        let b = ids[rng.gen_range(0..size)];
        if a == b {
            continue;
        }
        let ca = g.add_unit(a, "Connector", UnitKind::Connector { docked_to: None })?;
        let cb = g.add_unit(b, "Connector", UnitKind::Connector { docked_to: None })?;
        g.dock(ca, cb)?;
    }

    for &s in &ids {
        if rng.gen_bool(0.3) {
            let top = ids[rng.gen_range(0..size)];
            if top != s {
                let base = g.add_unit(s, "Rotor", UnitKind::JointBase { top: None })?;
                g.attach_joint(base, top)?;
            }
        }
    }

    Ok((g, ids))
}

fn unit_names(host: &dyn UnitHost, units: &[UnitId]) -> Vec<String> {
    units
        .iter()
        .filter_map(|u| host.unit(*u).ok())
        .map(|u| u.display_name.clone())
        .collect()
}

fn structure_set(
    host: &dyn UnitHost,
    root: StructureId,
    options: CollectOptions,
) -> HashSet<StructureId> {
    collect(host, root, &MatchRule::match_all(), options)
        .structures
        .into_iter()
        .collect()
}

// ── 1. Matcher ──────────────────────────────────────────────────────────

fn validate_matcher(_verbose: bool) -> Vec<TestResult> {
    println!("--- Name Matching ---");
    let mut results = Vec::new();

    let rule = MatchRule::new("Cargo,Tank", &["Hidden"]);
    results.push(TestResult {
        name: "matcher_alternatives".into(),
        passed: rule.matches("Large Cargo")
            && rule.matches("Hydrogen TANK")
            && !rule.matches("Refinery"),
        detail: "comma alternatives, case-insensitive".into(),
    });

    results.push(TestResult {
        name: "matcher_exclude_wins".into(),
        passed: !rule.matches("Hidden Cargo"),
        detail: "exclude beats include".into(),
    });

    let wildcard = MatchRule::new("Cargo,*", &[] as &[&str]);
    results.push(TestResult {
        name: "matcher_wildcard_anywhere".into(),
        passed: wildcard.is_match_all() && wildcard.matches("Anything At All"),
        detail: "`*` in any alternative matches every name".into(),
    });

    let short = MatchRule::new("Cargo", &["ab", "*", "cargo"]);
    results.push(TestResult {
        name: "matcher_ignored_excludes".into(),
        passed: short.effective_excludes().is_empty() && short.matches("Cargo ab"),
        detail: "short, wildcard and self-cancelling excludes dropped".into(),
    });

    results.push(TestResult {
        name: "matcher_free_fn".into(),
        passed: matches("Small Cargo", "cargo", &["large"])
            && !matches("Large Cargo", "cargo", &["large"]),
        detail: "free function agrees with MatchRule".into(),
    });

    results
}

// ── 2. Collector ────────────────────────────────────────────────────────

fn validate_collector(verbose: bool) -> Vec<TestResult> {
    println!("--- Collector ---");
    let mut results = Vec::new();

    let mut dup_structures = 0;
    let mut dup_units = 0;
    let mut root_not_first = 0;
    let mut movers_listed = 0;
    let mut excluded_listed = 0;
    let mut not_monotonic = 0;
    let mut primary_leaked = 0;

    for &seed in &SEEDS {
        let (g, ids) = match random_fleet(seed, 12) {
            Ok(fleet) => fleet,
            Err(e) => {
                results.push(TestResult {
                    name: format!("collector_build_{}", seed),
                    passed: false,
                    detail: format!("graph build failed: {}", e),
                });
                continue;
            }
        };

        let rule = MatchRule::new("cargo", &["hidden"]);
        for &root in &ids {
            let full = collect(&g, root, &rule, CollectOptions::new(true, true));

            let unique_s: HashSet<_> = full.structures.iter().collect();
            if unique_s.len() != full.structures.len() {
                dup_structures += 1;
            }
            let unique_u: HashSet<_> = full.units.iter().collect();
            if unique_u.len() != full.units.len() {
                dup_units += 1;
            }
            if full.structures.first() != Some(&root) {
                root_not_first += 1;
            }
            if full
                .units
                .iter()
                .any(|u| g.unit(*u).map(|n| n.is_mover()).unwrap_or(false))
            {
                movers_listed += 1;
            }
            if unit_names(&g, &full.units)
                .iter()
                .any(|n| n.to_lowercase().contains("hidden"))
            {
                excluded_listed += 1;
            }

            let primary = structure_set(&g, root, CollectOptions::PRIMARY);
            let joints = structure_set(&g, root, CollectOptions::new(true, false));
            let everything = structure_set(&g, root, CollectOptions::new(true, true));
            if !primary.is_subset(&joints) || !joints.is_subset(&everything) {
                not_monotonic += 1;
            }
            if primary.len() != 1 {
                primary_leaked += 1;
            }
        }

        if verbose {
            let root = ids[0];
            let c = collect(&g, root, &rule, CollectOptions::new(true, true));
            println!(
                "  seed {:5}: {} units, {} structures, {} movers from {}",
                seed,
                c.units.len(),
                c.structures.len(),
                c.movers.len(),
                root
            );
        }
    }

    results.push(TestResult {
        name: "collector_structures_once".into(),
        passed: dup_structures == 0,
        detail: format!("{} walks expanded a structure twice", dup_structures),
    });
    results.push(TestResult {
        name: "collector_units_once".into(),
        passed: dup_units == 0,
        detail: format!("{} walks listed a unit twice", dup_units),
    });
    results.push(TestResult {
        name: "collector_root_first".into(),
        passed: root_not_first == 0,
        detail: format!("{} walks did not start at the root", root_not_first),
    });
    results.push(TestResult {
        name: "collector_movers_side_channel".into(),
        passed: movers_listed == 0,
        detail: format!("{} walks listed a mover", movers_listed),
    });
    results.push(TestResult {
        name: "collector_excludes".into(),
        passed: excluded_listed == 0,
        detail: format!("{} walks listed an excluded name", excluded_listed),
    });
    results.push(TestResult {
        name: "collector_flags_monotonic".into(),
        passed: not_monotonic == 0,
        detail: "primary ⊆ joints ⊆ joints+docks".into(),
    });
    results.push(TestResult {
        name: "collector_primary_only_root".into(),
        passed: primary_leaked == 0,
        detail: format!("{} primary walks left the root", primary_leaked),
    });

    // Dangling link to a destroyed structure
    let stale = (|| -> HostResult<_> {
        let mut g = StructureGraph::new();
        let base = g.add_structure("Base");
        let gone = g.add_structure("Wreck");
        g.add_unit(base, "Base Cargo", UnitKind::Generic)?;
        let a = g.add_unit(base, "Dock", UnitKind::Connector { docked_to: None })?;
        let b = g.add_unit(gone, "Dock", UnitKind::Connector { docked_to: None })?;
        g.dock(a, b)?;
        g.remove_structure(gone)?;
        Ok(collect(&g, base, &MatchRule::match_all(), CollectOptions::new(true, true)))
    })();
    results.push(TestResult {
        name: "collector_stale_link".into(),
        passed: matches!(&stale, Ok(c) if c.errors == 1 && c.units.len() == 2),
        detail: "dangling dock logged, walk completes".into(),
    });

    results
}

// ── 3. Scheduler ────────────────────────────────────────────────────────

fn validate_scheduler(_verbose: bool) -> Vec<TestResult> {
    println!("--- Scheduler ---");
    let mut results = Vec::new();

    let rule = MatchRule::new("cargo", &[] as &[&str]);
    let mut mismatched = 0;
    let mut stale = 0;
    let mut full_scans_off = 0;

    for &seed in &SEEDS {
        let Ok((g, ids)) = random_fleet(seed, 10) else {
            continue;
        };
        let root = ids[0];
        let cadence = (seed % 5 + 1) as u32;
        let mut scheduler = ScanScheduler::new(ScanOptions {
            include_subgrids: true,
            include_docked: true,
            cadence,
        });

        let ticks = 4 * cadence as u64 + 1;
        for _ in 0..ticks {
            let units = scheduler.tick(&g, root, &rule);
            let since = scheduler.ticks_since_full_scan().unwrap_or(u64::MAX);
            if since >= cadence as u64 {
                stale += 1;
            }
            if since == 0 {
                let fresh = collect(&g, root, &rule, CollectOptions::new(true, true));
                let a: HashSet<_> = units.iter().collect();
                let b: HashSet<_> = fresh.units.iter().collect();
                if a != b || units.len() != fresh.units.len() {
                    mismatched += 1;
                }
            }
        }
        if scheduler.full_scans() != 5 {
            full_scans_off += 1;
        }
    }

    results.push(TestResult {
        name: "scheduler_matches_full_walk".into(),
        passed: mismatched == 0,
        detail: format!("{} full-scan ticks disagreed with a direct walk", mismatched),
    });
    results.push(TestResult {
        name: "scheduler_bounded_staleness".into(),
        passed: stale == 0,
        detail: "linked data never older than cadence".into(),
    });
    results.push(TestResult {
        name: "scheduler_full_scan_count".into(),
        passed: full_scans_off == 0,
        detail: "4·cadence+1 ticks → 5 full walks".into(),
    });

    results
}

// ── 4. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(_verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();
    let mut catalog = Catalog::with_builtin();

    let ingot = catalog.resolve("MyObjectBuilder_Ingot", "Iron");
    let ore = catalog.resolve("MyObjectBuilder_Ore", "Iron");
    results.push(TestResult {
        name: "catalog_tier_two".into(),
        passed: ingot.category == "Ingot" && ore.category == "Ore",
        detail: format!("{} / {}", ingot.display_name, ore.display_name),
    });

    let fallback = catalog.resolve("MyObjectBuilder_Weird", "Gold");
    results.push(TestResult {
        name: "catalog_tier_three".into(),
        passed: fallback.subtype == "Gold" && catalog.unknown().count() == 0,
        detail: format!("subtype-only fallback → {}", fallback.display_name),
    });

    let learned = catalog.resolve("MyObjectBuilder_Component", "QuantumEntangler");
    let again = catalog.resolve("MyObjectBuilder_Component", "QuantumEntangler");
    results.push(TestResult {
        name: "catalog_synthesis".into(),
        passed: learned.display_name.chars().count() <= 15
            && learned.sort_group == DEFAULT_SORT_GROUP
            && learned == again
            && catalog.unknown().count() == 1,
        detail: format!("learned '{}' once", learned.display_name),
    });

    results
}

// ── 5. Overrides ────────────────────────────────────────────────────────

fn validate_overrides(verbose: bool) -> Vec<TestResult> {
    println!("--- Override File ---");
    let mut results = Vec::new();

    let report = parse_overrides(OVERRIDES);
    results.push(TestResult {
        name: "overrides_parse_clean".into(),
        passed: report.issues.is_empty() && report.entries.len() == 5,
        detail: format!("{} entries, {} issues", report.entries.len(), report.issues.len()),
    });

    let mut catalog = Catalog::with_builtin();
    let source = InlineOverrideSource::new("data/item_overrides.txt", OVERRIDES);
    let state = catalog.ensure_loaded(&source);
    results.push(TestResult {
        name: "overrides_loaded".into(),
        passed: state == LoadState::Loaded,
        detail: format!("{:?}", state),
    });

    let pellets = catalog.get("Ore", "HydroPellets").map(|d| d.min_desired_amount);
    catalog.ingest_overrides("Ore;HydroPellets;Nutrient Pellets;0.37;ore;0");
    let after = catalog.get("Ore", "HydroPellets").map(|d| d.min_desired_amount);
    results.push(TestResult {
        name: "overrides_no_downgrade".into(),
        passed: pellets == Some(5000) && after == Some(5000),
        detail: "zero min leaves 5000 in place".into(),
    });

    let iron = catalog.get("Ingot", "Iron");
    results.push(TestResult {
        name: "overrides_section_partial".into(),
        passed: iron
            .is_some_and(|d| d.min_desired_amount == 50_000 && d.display_name == "Iron Ingot"),
        detail: "[Ingot/Iron] only raises min".into(),
    });

    if verbose {
        match catalog.to_json() {
            Ok(json) => println!("  Catalog ({} items):\n{}", catalog.len(), json),
            Err(e) => println!("  Catalog JSON failed: {}", e),
        }
    }

    results
}

// ── 6. Aggregation ──────────────────────────────────────────────────────

fn three_containers() -> HostResult<(StructureGraph, Vec<UnitId>)> {
    let mut g = StructureGraph::new();
    let base = g.add_structure("Base");
    let mut ids = Vec::new();
    let stacks = [(100.0, "Iron", 50.0), (200.0, "Iron", 10.0), (300.0, "Gold", 5.0)];
    for (capacity, subtype, amount) in stacks {
        let id = g.add_unit(base, "Cargo", UnitKind::Generic)?;
        g.add_inventory(
            id,
            Inventory::with_capacity(capacity).with_item(InventoryItem::new(
                "MyObjectBuilder_Ingot",
                subtype,
                amount,
            )),
        )?;
        ids.push(id);
    }
    Ok((g, ids))
}

fn validate_aggregation(verbose: bool) -> Vec<TestResult> {
    println!("--- Aggregation ---");
    let mut results = Vec::new();

    let (g, ids) = match three_containers() {
        Ok(rig) => rig,
        Err(e) => {
            results.push(TestResult {
                name: "aggregate_build".into(),
                passed: false,
                detail: format!("graph build failed: {}", e),
            });
            return results;
        }
    };

    let mut catalog = Catalog::with_builtin();
    let totals = aggregate(&g, &ids, &mut catalog, Some("Ingot"));
    results.push(TestResult {
        name: "aggregate_totals".into(),
        passed: totals.amount_of("Iron") == 60
            && totals.amount_of("Gold") == 5
            && totals.items.len() == 2,
        detail: format!("Iron={} Gold={}", totals.amount_of("Iron"), totals.amount_of("Gold")),
    });
    results.push(TestResult {
        name: "aggregate_capacity".into(),
        passed: (totals.max_volume_l - 600.0).abs() < 1e-9,
        detail: format!("{} L capacity", totals.max_volume_l),
    });

    let ice = resource_volume(&g, &ids, "Ice", 0.37);
    results.push(TestResult {
        name: "aggregate_empty_resource".into(),
        passed: ice.current_volume_l == 0.0 && ice.max_volume_l > 0.0,
        detail: "no ice, capacity still reported".into(),
    });

    let mut stale = ids.clone();
    stale.push(UnitId(u32::MAX));
    let partial = aggregate(&g, &stale, &mut catalog, None);
    results.push(TestResult {
        name: "aggregate_skips_unreadable".into(),
        passed: partial.containers_failed == 1 && partial.amount_of("Iron") == 60,
        detail: "missing container skipped".into(),
    });

    if verbose {
        for row in item_rows(&totals) {
            println!("    {:12} {:>8} / {:>8}", row.label, row.current, row.target);
        }
    }

    results
}
