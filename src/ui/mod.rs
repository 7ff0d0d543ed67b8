//! UI components for the vessel dashboard.
//!
//! This module contains the side panels and floating windows drawn around the map.

pub mod charts;
pub mod status_pane;
pub mod vessel_list;

pub use status_pane::{FeedStatus, StatusPane};
pub use vessel_list::{ListAction, VesselList};
