//! Stochastic sizing and siting of wildfire drone fleets.
//!
//! Fires are simulated for a base year, the hourly demand they place on surveillance (SSA) and relay
//! drones is aggregated and the cheapest fleet covering the peak is found. The fleet is then grown
//! year by year as fires become more frequent. Separately, relay drones are sited so that every
//! frontline team can reach the command centre.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod configuration;
pub mod demand;
pub mod fire;
pub mod fleet;
pub mod input;
pub mod log;
pub mod model;
pub mod optimisation;
pub mod output;
pub mod planning;
pub mod relay;
pub mod settings;
pub mod simulation;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// This is a subdirectory of the user's platform-specific config directory (e.g. `~/.config` on
/// Linux). If this cannot be determined, the current directory is used instead.
pub fn get_firefleet_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::new();
    };

    config_dir.push("firefleet");
    config_dir
}
