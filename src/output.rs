//! The module responsible for writing output data to disk.
use crate::configuration::Configuration;
use crate::demand::{AnnualDemand, EquipmentClass};
use crate::fire::FireEvent;
use crate::fleet::EquipmentConfig;
use crate::optimisation::Status;
use crate::planning::MultiYearPlan;
use crate::relay::RelayResult;
use crate::units::{Dimensionless, Hours, Kilometres, Money, MoneyPerUnit, SquareKilometres};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "firefleet_results";

/// The output file name for the base-year fleet
const FLEET_FILE_NAME: &str = "fleet_configuration.csv";

/// The output file name for the expansion plan
const PLAN_FILE_NAME: &str = "multi_year_plan.csv";

/// The output file name for the base-year demand series
const DEMAND_FILE_NAME: &str = "demand_series.csv";

/// The output file name for relay deployment
const RELAY_FILE_NAME: &str = "relay_deployment.csv";

/// The output file name for the outcome of relay deployment
const RELAY_SUMMARY_FILE_NAME: &str = "relay_summary.csv";

/// The output file name for the budget report
const BUDGET_FILE_NAME: &str = "budget_report.csv";

/// The output file name for base-year fire events
const FIRE_EVENTS_FILE_NAME: &str = "debug_fire_events.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory, optionally replacing an existing one.
///
/// # Returns
///
/// Whether an existing, non-empty directory was deleted, or an error if the directory is not
/// empty and `allow_overwrite` is false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let mut overwrite = false;
    if output_dir.is_dir() {
        if output_dir.read_dir()?.next().is_none() {
            // Empty directory, so nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );

        fs::remove_dir_all(output_dir)?;
        overwrite = true;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row of the fleet configuration CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct FleetRow {
    class: EquipmentClass,
    peak_demand: u32,
    required: u32,
    count: u32,
    unit_price: MoneyPerUnit,
    investment: Money,
    safety_margin: Dimensionless,
    status: Status,
}

/// Represents a row of the multi-year plan CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PlanRow {
    year: u32,
    ssa_peak: u32,
    relay_peak: u32,
    ssa_required: u32,
    relay_required: u32,
    ssa_purchased: u32,
    relay_purchased: u32,
    ssa_inventory: u32,
    relay_inventory: u32,
    annual_cost: Money,
}

/// Represents a row of the demand series CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DemandRow {
    hour: u32,
    ssa: u32,
    relay: u32,
}

/// Represents a row of the relay deployment CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RelayRow {
    candidate: usize,
    x: f64,
    y: f64,
}

/// Represents the single row of the relay summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RelaySummaryRow {
    status: Status,
    relay_count: usize,
}

/// Represents the single row of the budget report CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct BudgetRow {
    first_year_investment: Money,
    horizon_total: Money,
    /// Empty if the plan has no years after the base year
    average_annual_cost: Option<Money>,
}

/// Represents a row of the fire events CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct FireEventRow {
    region: usize,
    start_hour: u32,
    duration: Hours,
    area: SquareKilometres,
    crew_count: f64,
    fireline_length: Kilometres,
    ssa_demand: u32,
    relay_demand: u32,
}

impl FireEventRow {
    fn new(event: &FireEvent) -> Self {
        Self {
            region: event.region,
            start_hour: event.start_hour,
            duration: event.duration,
            area: event.area,
            crew_count: event.crew_count,
            fireline_length: event.fireline_length,
            ssa_demand: event.demand.ssa,
            relay_demand: event.demand.relay,
        }
    }
}

/// An object for writing model results to file
pub struct DataWriter {
    output_path: PathBuf,
    fleet_writer: csv::Writer<File>,
    plan_writer: csv::Writer<File>,
    demand_writer: csv::Writer<File>,
    fire_events_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let fire_events_writer = if save_debug_info {
            Some(new_writer(FIRE_EVENTS_FILE_NAME)?)
        } else {
            None
        };

        Ok(Self {
            output_path: output_path.to_path_buf(),
            fleet_writer: new_writer(FLEET_FILE_NAME)?,
            plan_writer: new_writer(PLAN_FILE_NAME)?,
            demand_writer: new_writer(DEMAND_FILE_NAME)?,
            fire_events_writer,
        })
    }

    /// Write the base-year fleet to a CSV file, one row per equipment class
    pub fn write_fleet(&mut self, config: &Configuration, fleet: &EquipmentConfig) -> Result<()> {
        for class in EquipmentClass::iter() {
            let row = FleetRow {
                class,
                peak_demand: fleet.peak_demand[class],
                required: fleet.required[class],
                count: fleet.counts[class],
                unit_price: config.unit_price(class),
                investment: fleet.investment(config, class),
                safety_margin: fleet.safety_margin(class),
                status: fleet.status,
            };
            self.fleet_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the expansion plan to a CSV file
    pub fn write_plan(&mut self, plan: &MultiYearPlan) -> Result<()> {
        for record in &plan.records {
            let row = PlanRow {
                year: record.year,
                ssa_peak: record.peak_demand.ssa,
                relay_peak: record.peak_demand.relay,
                ssa_required: record.required.ssa,
                relay_required: record.required.relay,
                ssa_purchased: record.purchased.ssa,
                relay_purchased: record.purchased.relay,
                ssa_inventory: record.inventory.ssa,
                relay_inventory: record.inventory.relay,
                annual_cost: record.annual_cost,
            };
            self.plan_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the hourly demand for each class to a CSV file
    pub fn write_demand(&mut self, demand: &AnnualDemand) -> Result<()> {
        for (hour, counts) in demand.iter_hours() {
            let row = DemandRow {
                hour,
                ssa: counts.ssa,
                relay: counts.relay,
            };
            self.demand_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the chosen relay sites to a CSV file, along with a summary of the outcome.
    ///
    /// The summary is always written, so an infeasible deployment can be told apart from one which
    /// needs no relays.
    pub fn write_relay_deployment(&mut self, result: &RelayResult) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.output_path.join(RELAY_FILE_NAME))?;
        for (&candidate, position) in result.selected.iter().zip(&result.positions) {
            let row = RelayRow {
                candidate,
                x: position.x,
                y: position.y,
            };
            writer.serialize(row)?;
        }
        writer.flush()?;

        let mut writer = csv::Writer::from_path(self.output_path.join(RELAY_SUMMARY_FILE_NAME))?;
        writer.serialize(RelaySummaryRow {
            status: result.status,
            relay_count: result.count(),
        })?;
        writer.flush()?;

        Ok(())
    }

    /// Write the budget report for the base-year fleet and the expansion plan
    pub fn write_budget_report(
        &mut self,
        fleet: &EquipmentConfig,
        plan: &MultiYearPlan,
    ) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.output_path.join(BUDGET_FILE_NAME))?;
        writer.serialize(BudgetRow {
            first_year_investment: fleet.total_cost,
            horizon_total: plan.total_cost(),
            average_annual_cost: plan.average_annual_cost(),
        })?;
        writer.flush()?;

        Ok(())
    }

    /// Write fire events to a CSV file, if debug info is enabled
    pub fn write_debug_fire_events(&mut self, events: &[FireEvent]) -> Result<()> {
        if let Some(ref mut wtr) = self.fire_events_writer {
            for event in events {
                wtr.serialize(FireEventRow::new(event))?;
            }
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.fleet_writer.flush()?;
        self.plan_writer.flush()?;
        self.demand_writer.flush()?;
        if let Some(ref mut wtr) = self.fire_events_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
