//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by orb handle)
//! - No rendering, audio or platform dependencies

pub mod catalog;
pub mod collision;
pub mod combo;
pub mod container;
pub mod game_over;
pub mod merge;
pub mod orb;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use catalog::{OrbCatalog, TierDef};
pub use collision::{
    CollisionResult, WallContact, contain_in_walls, orb_contact, relax_overlaps,
    resolve_against_all, resolve_orb_pair, restore_escaped, separate_pair,
};
pub use combo::ComboTracker;
pub use container::Container;
pub use game_over::{DangerState, GameOverMonitor};
pub use merge::{MergeOutput, MergePair, can_merge, find_merge, merge_output};
pub use orb::{Orb, OrbId};
pub use snapshot::{ComboView, OrbView, Snapshot};
pub use state::{GameEvent, GameState, Outcome};
pub use tick::{TickInput, tick};
