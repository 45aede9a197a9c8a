//! Code for planning how the fleet grows as fires become more frequent.
//!
//! Each year of the horizon is simulated with its own random stream. Whenever the required fleet
//! exceeds the inventory, the shortfall is bought. Units are never retired.
use crate::configuration::Configuration;
use crate::demand::{AnnualDemand, ClassCounts, EquipmentClass};
use crate::fire::{generate_fire_events, year_rng};
use crate::fleet::{EquipmentConfig, required_level};
use crate::optimisation::Status;
use crate::units::{Dimensionless, Money};
use anyhow::{Context, Result, ensure};
use float_cmp::approx_eq;
use log::{debug, info};
use strum::IntoEnumIterator;

/// The purchases made in one year of the plan
#[derive(Debug, Clone, PartialEq)]
pub struct YearRecord {
    /// Number of years after the base year
    pub year: u32,
    /// Peak hourly demand for each class
    pub peak_demand: ClassCounts,
    /// Fleet size needed to cover the peak with the safety factor
    pub required: ClassCounts,
    /// Units bought this year
    pub purchased: ClassCounts,
    /// Units owned at the end of the year
    pub inventory: ClassCounts,
    /// Amount spent this year
    pub annual_cost: Money,
}

/// A year-by-year expansion plan for the fleet
#[derive(Debug, Clone, PartialEq)]
pub struct MultiYearPlan {
    /// Units owned before the first year of the plan
    pub initial_inventory: ClassCounts,
    /// One record per year, in order
    pub records: Vec<YearRecord>,
}

impl MultiYearPlan {
    /// Total amount spent over the whole plan
    pub fn total_cost(&self) -> Money {
        self.records.iter().map(|record| record.annual_cost).sum()
    }

    /// Average amount spent in each year after the base year, if there are any
    pub fn average_annual_cost(&self) -> Option<Money> {
        let later = self.records.get(1..).filter(|records| !records.is_empty())?;
        let total: Money = later.iter().map(|record| record.annual_cost).sum();

        Some(total / Dimensionless(later.len() as f64))
    }

    /// Check that the plan's books balance.
    ///
    /// Every year, the inventory must equal the previous inventory plus purchases and must cover
    /// the required level. The annual cost must equal the cost of the purchases. Over the whole
    /// plan, the total cost must equal the cost of the growth in inventory.
    pub fn check_ledger(&self, config: &Configuration) -> Result<()> {
        let mut previous = self.initial_inventory;
        for record in &self.records {
            for class in EquipmentClass::iter() {
                ensure!(
                    record.inventory[class] == previous[class] + record.purchased[class],
                    "Year {}: {class} inventory does not equal previous inventory plus purchases",
                    record.year
                );
                ensure!(
                    record.inventory[class] >= record.required[class],
                    "Year {}: {class} inventory is below the required level",
                    record.year
                );
            }

            let cost: Money = record
                .purchased
                .iter()
                .map(|(class, count)| config.unit_price(class).cost_of(count))
                .sum();
            ensure!(
                approx_eq!(f64, cost.value(), record.annual_cost.value()),
                "Year {}: annual cost {} does not match purchases costing {cost}",
                record.year,
                record.annual_cost
            );

            previous = record.inventory;
        }

        let growth_cost: Money = EquipmentClass::iter()
            .map(|class| {
                let growth = previous[class].saturating_sub(self.initial_inventory[class]);
                config.unit_price(class).cost_of(growth)
            })
            .sum();
        ensure!(
            approx_eq!(f64, growth_cost.value(), self.total_cost().value()),
            "Total cost {} does not match inventory growth costing {growth_cost}",
            self.total_cost()
        );

        Ok(())
    }
}

/// Plan purchases for each year from the base year to the end of the horizon.
///
/// # Arguments
///
/// * `config` - Model configuration
/// * `base` - The fleet bought for the base year, which is the starting inventory
/// * `horizon_years` - Number of years to plan for after the base year
/// * `growth_rate` - Annual growth rate of fire occurrence
/// * `seed` - Seed for the random number generator
///
/// # Returns
///
/// A plan with one record for every year from 0 to `horizon_years` inclusive, or an error if the
/// base fleet is not optimal.
pub fn plan_expansion(
    config: &Configuration,
    base: &EquipmentConfig,
    horizon_years: u32,
    growth_rate: Dimensionless,
    seed: u64,
) -> Result<MultiYearPlan> {
    ensure!(
        base.status == Status::Optimal,
        "Cannot plan expansion from a base fleet with status {}",
        base.status
    );

    let mut inventory = base.counts;
    let mut records = Vec::with_capacity(horizon_years as usize + 1);
    for year in 0..=horizon_years {
        let events = generate_fire_events(config, year, growth_rate, &mut year_rng(seed, year));
        let peak_demand = AnnualDemand::from_events(&events).peaks();
        debug!(
            "Year {year}: {} fires with peak demand {peak_demand:?}",
            events.len()
        );

        let mut required = ClassCounts::default();
        let mut purchased = ClassCounts::default();
        for (class, peak) in peak_demand.iter() {
            required[class] = required_level(config.safety_factor, peak)
                .with_context(|| format!("Invalid required level for {class} in year {year}"))?;
            purchased[class] = required[class].saturating_sub(inventory[class]);
            inventory[class] += purchased[class];
        }

        let annual_cost = purchased
            .iter()
            .map(|(class, count)| config.unit_price(class).cost_of(count))
            .sum();
        records.push(YearRecord {
            year,
            peak_demand,
            required,
            purchased,
            inventory,
            annual_cost,
        });
    }

    let plan = MultiYearPlan {
        initial_inventory: base.counts,
        records,
    };
    info!(
        "Expansion plan over {horizon_years} years costs {}",
        plan.total_cost()
    );

    Ok(plan)
}
