//! Functionality for running the capacity planning model.
use crate::demand::{AnnualDemand, EquipmentClass};
use crate::fire::{generate_fire_events, year_rng};
use crate::fleet::{EquipmentConfig, size_fleet};
use crate::model::Model;
use crate::optimisation::Status;
use crate::output::DataWriter;
use crate::output::metadata::write_metadata;
use crate::planning::{MultiYearPlan, plan_expansion};
use crate::relay::optimise_relay_deployment;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;
use strum::IntoEnumIterator;

/// Run the model.
///
/// The base year is simulated and a fleet sized for its peak demand. If a fleet could be found, it
/// is then used as the starting point for the expansion plan. Relays are sited if the model has
/// sites.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
/// * `debug_model` - Whether to write additional information (e.g. fire events) to output files
pub fn run(model: &Model, output_path: &Path, debug_model: bool) -> Result<()> {
    let config = &model.config;
    let planning = &config.planning;
    write_metadata(output_path, &model.model_path, planning.seed)
        .context("Failed to save metadata")?;
    let mut writer = DataWriter::create(output_path, debug_model)?;

    // Base year
    let events = generate_fire_events(
        config,
        0,
        planning.growth_rate,
        &mut year_rng(planning.seed, 0),
    );
    info!("Simulated {} fires in the base year", events.len());
    let demand = AnnualDemand::from_events(&events);
    let fleet = size_fleet(config, demand.peaks())?;
    log_fleet_summary(model, &fleet);

    writer.write_debug_fire_events(&events)?;
    writer.write_demand(&demand)?;
    writer.write_fleet(config, &fleet)?;

    if fleet.status == Status::Optimal {
        let plan = plan_expansion(
            config,
            &fleet,
            planning.horizon_years,
            planning.growth_rate,
            planning.seed,
        )?;
        plan.check_ledger(config)
            .context("Expansion plan is inconsistent")?;
        writer.write_plan(&plan)?;
        log_budget_report(&fleet, &plan);
        writer.write_budget_report(&fleet, &plan)?;
    } else {
        warn!("No feasible fleet for the base year; skipping expansion plan");
    }

    if let Some(problem) = &model.relay_problem {
        let result = optimise_relay_deployment(problem, config.deployment.strategy)?;
        if result.status == Status::Infeasible {
            warn!("Not every frontline team can be connected to the command centre");
        }
        writer.write_relay_deployment(&result)?;
    }

    writer.flush()?;

    Ok(())
}

/// Log a summary of the base-year fleet
fn log_fleet_summary(model: &Model, fleet: &EquipmentConfig) {
    info!("Fleet sizing status: {}", fleet.status);
    for class in EquipmentClass::iter() {
        info!(
            "{class}: peak demand {}, {} units, investment {}, safety margin {:.2}",
            fleet.peak_demand[class],
            fleet.counts[class],
            fleet.investment(&model.config, class),
            fleet.safety_margin(class).value()
        );
    }
    info!("Total investment: {}", fleet.total_cost);
}

/// Log how much the base-year fleet and the expansion plan cost
fn log_budget_report(fleet: &EquipmentConfig, plan: &MultiYearPlan) {
    info!("First-year investment: {}", fleet.total_cost);
    info!("Total expansion cost over the horizon: {}", plan.total_cost());
    match plan.average_annual_cost() {
        Some(average) => info!("Average annual expansion cost: {average}"),
        None => info!("No years after the base year to average expansion cost over"),
    }
}
