//! Code for working out how much equipment fires require.
//!
//! Each fire needs a fixed number of SSA and relay units for as long as it burns. Demand for the
//! year is the sum over all fires burning in each hour.
use crate::configuration::Configuration;
use crate::fire::{FireEvent, HOURS_PER_YEAR};
use crate::units::{Dimensionless, Kilometres, SquareKilometres};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use strum::{Display, EnumIter, IntoEnumIterator};

/// A class of equipment which has to be bought and deployed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    /// Surveillance/suppression-support drones
    Ssa,
    /// Communication relay drones
    Relay,
}

/// A number of units for each class of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassCounts {
    /// Number of SSA units
    pub ssa: u32,
    /// Number of relay units
    pub relay: u32,
}

impl ClassCounts {
    /// Create a new [`ClassCounts`]
    pub fn new(ssa: u32, relay: u32) -> Self {
        Self { ssa, relay }
    }

    /// Build from a function giving the count for each class
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(EquipmentClass) -> u32,
    {
        Self {
            ssa: f(EquipmentClass::Ssa),
            relay: f(EquipmentClass::Relay),
        }
    }

    /// Iterate over the counts for each class
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentClass, u32)> + '_ {
        EquipmentClass::iter().map(|class| (class, self[class]))
    }
}

impl Index<EquipmentClass> for ClassCounts {
    type Output = u32;

    fn index(&self, class: EquipmentClass) -> &u32 {
        match class {
            EquipmentClass::Ssa => &self.ssa,
            EquipmentClass::Relay => &self.relay,
        }
    }
}

impl IndexMut<EquipmentClass> for ClassCounts {
    fn index_mut(&mut self, class: EquipmentClass) -> &mut u32 {
        match class {
            EquipmentClass::Ssa => &mut self.ssa,
            EquipmentClass::Relay => &mut self.relay,
        }
    }
}

/// Calculate how many units of each class a single fire requires.
///
/// SSA units must both patrol the burned area within the maximum revisit time and serve the crew
/// (one unit per two squads). Relay units must cover the fireline, with at least one per fire.
///
/// # Arguments
///
/// * `config` - Model configuration
/// * `area` - Burned area of the fire
/// * `crew_count` - Number of crew squads deployed
/// * `fireline_length` - Length of the fireline
pub fn event_demand(
    config: &Configuration,
    area: SquareKilometres,
    crew_count: f64,
    fireline_length: Kilometres,
) -> ClassCounts {
    let patrol =
        (area / config.ssa_coverage_area) * (config.ssa_cruise_cycle / config.ssa_max_revisit);
    let ssa = patrol.value().max(crew_count / 2.0).ceil();

    // Each relay covers a stretch of fireline twice its coverage radius
    let relay_span = config.relay_coverage_radius * Dimensionless(2.0);
    let relay = (config.relay_redundancy * (fireline_length / relay_span))
        .value()
        .ceil()
        .max(1.0);

    ClassCounts::new(to_count(ssa), to_count(relay))
}

/// Convert a non-negative whole number to a count, treating anything else as zero
fn to_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value as u32
    } else {
        0
    }
}

/// Hourly demand for one class of equipment over a year
#[derive(Debug, Clone, PartialEq)]
pub struct DemandSeries(Vec<u32>);

impl Default for DemandSeries {
    fn default() -> Self {
        Self(vec![0; HOURS_PER_YEAR as usize])
    }
}

impl DemandSeries {
    /// Add demand to every hour in the given range, ignoring hours past the end of the year
    fn add(&mut self, hours: std::ops::Range<u32>, demand: u32) {
        let end = hours.end.min(HOURS_PER_YEAR);
        if hours.start >= end {
            return;
        }

        for value in &mut self.0[hours.start as usize..end as usize] {
            *value = value.saturating_add(demand);
        }
    }

    /// The maximum hourly demand (zero if there is no demand)
    pub fn peak(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// The demand for each hour of the year
    pub fn hourly(&self) -> &[u32] {
        &self.0
    }
}

/// Hourly demand for every class of equipment over a simulated year
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnualDemand {
    ssa: DemandSeries,
    relay: DemandSeries,
}

impl AnnualDemand {
    /// Aggregate the demand of a set of fire events.
    ///
    /// Each fire adds its demand to every hour from its start until it is extinguished. Demand from
    /// overlapping fires accumulates.
    pub fn from_events(events: &[FireEvent]) -> Self {
        let mut demand = Self::default();
        for event in events {
            let hours = event.active_hours();
            for class in EquipmentClass::iter() {
                demand
                    .series_mut(class)
                    .add(hours.clone(), event.demand[class]);
            }
        }

        demand
    }

    /// The hourly demand series for the given class
    pub fn series(&self, class: EquipmentClass) -> &DemandSeries {
        match class {
            EquipmentClass::Ssa => &self.ssa,
            EquipmentClass::Relay => &self.relay,
        }
    }

    fn series_mut(&mut self, class: EquipmentClass) -> &mut DemandSeries {
        match class {
            EquipmentClass::Ssa => &mut self.ssa,
            EquipmentClass::Relay => &mut self.relay,
        }
    }

    /// Peak demand for each class
    pub fn peaks(&self) -> ClassCounts {
        ClassCounts::from_fn(|class| self.series(class).peak())
    }

    /// Iterate over the hours of the year with the demand for each class in that hour
    pub fn iter_hours(&self) -> impl Iterator<Item = (u32, ClassCounts)> + '_ {
        self.ssa
            .hourly()
            .iter()
            .zip(self.relay.hourly())
            .zip(0..)
            .map(|((&ssa, &relay), hour)| (hour, ClassCounts::new(ssa, relay)))
    }
}
