//! Scanning and catalog core for grid status displays.
//!
//! This crate holds everything a status view needs that is independent of
//! the game engine and of pixel rendering: walking linked structures,
//! caching that walk across ticks, filtering units by name, resolving
//! inventory entries to item definitions and summing them. Functions take a
//! [`host::UnitHost`] and plain data and return plain values, so every piece
//! runs in unit tests and in the headless `gridstat-simtest` harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`aggregate`] | Per-item totals and resource volumes across containers |
//! | [`catalog`] | Item definitions, tiered resolution, override file loading |
//! | [`collector`] | Cycle-safe walk over joints and docking links |
//! | [`error`] | Host lookup and override-file errors |
//! | [`graph`] | In-memory `UnitHost` for tests and tooling |
//! | [`host`] | Structure/unit/inventory model and the host trait |
//! | [`matcher`] | Include/exclude name rules |
//! | [`scheduler`] | Cadence-throttled scan cache with bounded staleness |
//! | [`status`] | Label/current/target rows for the renderer |
//! | [`view`] | Scan → aggregate → rows pipeline for one display |
//! | [`view_config`] | Per-view key/value configuration |
//!
//! # Threading
//!
//! Everything is single-threaded and tick-driven. Each view owns its own
//! [`scheduler::ScanScheduler`]; the [`catalog::Catalog`] is shared by
//! passing `&mut` into each view's update in turn.

pub mod aggregate;
pub mod catalog;
pub mod collector;
pub mod error;
pub mod graph;
pub mod host;
pub mod matcher;
pub mod scheduler;
pub mod status;
pub mod view;
pub mod view_config;
