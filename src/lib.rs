//! Summit Duel Simulation Core
//!
//! A real-time arena simulation for a vertical-climber duel: one human
//! combatant versus a scripted AI opponent on procedurally generated
//! platform rows, wrapped in session telemetry collection.
//!
//! The crate is the simulation only. Rendering consumes the per-tick
//! [`snapshot::RenderSnapshot`], input arrives as discrete
//! [`game::input::InputState`] intents, and persistence receives a single
//! [`telemetry::summary::SessionSummary`] per completed session through the
//! [`persist`] module.

pub mod config;
pub mod util;
pub mod game;
pub mod telemetry;
pub mod persist;
pub mod snapshot;
