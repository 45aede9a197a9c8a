//! Code for choosing how many units of each class of equipment to buy.
//!
//! The fleet must cover the peak hourly demand for each class, scaled up by a safety factor, at
//! minimum procurement cost. An optional budget cap couples the two classes.
use crate::configuration::Configuration;
use crate::demand::{ClassCounts, EquipmentClass};
use crate::optimisation::{Status, Variable, solve_minimisation};
use crate::units::{Dimensionless, Money};
use anyhow::Result;
use highs::RowProblem as Problem;
use log::{info, warn};
use strum::IntoEnumIterator;

/// The fleet chosen to meet a year's peak demand
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentConfig {
    /// The peak hourly demand for each class
    pub peak_demand: ClassCounts,
    /// The minimum number of units of each class needed to cover the peak with the safety factor
    pub required: ClassCounts,
    /// The number of units of each class to buy
    pub counts: ClassCounts,
    /// Total procurement cost of the fleet
    pub total_cost: Money,
    /// Outcome of the optimisation
    pub status: Status,
}

impl EquipmentConfig {
    /// A fleet for which no feasible solution exists. All counts and costs are zero.
    fn infeasible(peak_demand: ClassCounts, required: ClassCounts) -> Self {
        Self {
            peak_demand,
            required,
            counts: ClassCounts::default(),
            total_cost: Money(0.0),
            status: Status::Infeasible,
        }
    }

    /// The amount spent on the given class of equipment
    pub fn investment(&self, config: &Configuration, class: EquipmentClass) -> Money {
        config.unit_price(class).cost_of(self.counts[class])
    }

    /// The ratio of the number of units bought to the peak demand (zero if there is no demand)
    pub fn safety_margin(&self, class: EquipmentClass) -> Dimensionless {
        let peak = self.peak_demand[class];
        if peak == 0 {
            return Dimensionless(0.0);
        }

        Dimensionless(f64::from(self.counts[class]) / f64::from(peak))
    }
}

/// The number of units needed to cover the given peak demand with a safety factor.
///
/// Returns `None` if the result is not a valid count (e.g. because the safety factor is negative).
pub fn required_level(safety_factor: Dimensionless, peak: u32) -> Option<u32> {
    let level = (safety_factor.value() * f64::from(peak)).ceil();
    (level.is_finite() && level >= 0.0 && level <= f64::from(u32::MAX)).then_some(level as u32)
}

/// Choose the cheapest fleet which covers the given peak demand.
///
/// Each class must have at least [`required_level`] units. If the configuration has a budget cap,
/// the total cost may not exceed it.
///
/// # Arguments
///
/// * `config` - Model configuration
/// * `peak_demand` - The peak hourly demand for each class
///
/// # Returns
///
/// The chosen fleet, which will have [`Status::Infeasible`] if no fleet meets the constraints, or
/// an error if the solver failed.
pub fn size_fleet(config: &Configuration, peak_demand: ClassCounts) -> Result<EquipmentConfig> {
    let mut required = ClassCounts::default();
    for (class, peak) in peak_demand.iter() {
        let Some(level) = required_level(config.safety_factor, peak) else {
            warn!(
                "Invalid required level for {class}: safety factor {} with peak demand {peak}",
                config.safety_factor
            );
            return Ok(EquipmentConfig::infeasible(peak_demand, required));
        };
        required[class] = level;
    }

    let mut problem = Problem::default();
    let variables: Vec<(EquipmentClass, Variable)> = EquipmentClass::iter()
        .map(|class| {
            let var = problem.add_integer_column(config.unit_price(class).value(), 0.0..);
            problem.add_row(f64::from(required[class]).., [(var, 1.0)]);
            (class, var)
        })
        .collect();

    if let Some(budget_cap) = config.budget_cap {
        problem.add_row(
            ..=budget_cap.value(),
            variables
                .iter()
                .map(|&(class, var)| (var, config.unit_price(class).value())),
        );
    }

    let Some(solution) = solve_minimisation(problem)? else {
        warn!("No fleet meets the required levels {required:?} within the budget cap");
        return Ok(EquipmentConfig::infeasible(peak_demand, required));
    };

    // Columns are in the order the classes were added
    let mut counts = ClassCounts::default();
    for ((class, _), value) in variables.iter().zip(solution) {
        counts[*class] = value.round().max(0.0) as u32;
    }

    let total_cost = counts
        .iter()
        .map(|(class, count)| config.unit_price(class).cost_of(count))
        .sum();
    info!(
        "Fleet for peak demand {peak_demand:?}: {} SSA units, {} relay units, total cost {total_cost}",
        counts.ssa, counts.relay
    );

    Ok(EquipmentConfig {
        peak_demand,
        required,
        counts,
        total_cost,
        status: Status::Optimal,
    })
}
