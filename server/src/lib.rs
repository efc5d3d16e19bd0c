//! Fleetdock Server - reference-data sync for Star Citizen fleets.
//!
//! This crate populates and maintains a relational database of the game's
//! vehicles, components, paints, and imagery by pulling from four
//! upstream sources and reconciling them into one canonical schema, then
//! lets a user's imported hangar sit on top of that reference data.
//!
//! The external HTTP façade consumes [`FleetService`]; the bundled binary
//! runs the scheduler daemon.

pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod hangar;
pub mod service;
pub mod sync;

pub use config::Config;
pub use error::{Error, Result};
pub use service::FleetService;
