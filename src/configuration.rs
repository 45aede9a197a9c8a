//! Defines the [`Configuration`] struct, which represents the contents of `model.toml`.
//!
//! The configuration is validated once, when it is read in. Other parts of the program trust it.
use crate::demand::EquipmentClass;
use crate::input::{input_err_msg, read_toml};
use crate::relay::CoverStrategy;
use crate::units::{Dimensionless, Hours, Kilometres, Money, MoneyPerUnit, SquareKilometres};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_seed, u64, 42);
define_param_default!(default_horizon_years, u32, 10);
define_unit_param_default!(default_growth_rate, Dimensionless, 0.03);
define_unit_param_default!(default_link_radius, Kilometres, 20.0);

/// How the configured fire area mean and standard deviation map onto a log-normal distribution
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Clone, Copy, Default)]
pub enum AreaParameterisation {
    /// Derive location and scale from the mean and standard deviation of the area itself
    #[default]
    #[string = "moment_matched"]
    MomentMatched,
    /// Use ln(mean) as the location and ln(std) as the scale.
    ///
    /// This reproduces the behaviour of earlier versions of the model. Note that a standard
    /// deviation of 1 gives a scale of zero, i.e. every fire has the same area.
    #[string = "log_parameters"]
    LogParameters,
}

/// Parameters for the multi-year expansion plan
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PlanningParameters {
    /// Seed for the random number generator
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of years to plan for after the base year
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
    /// Annual growth rate of fire occurrence
    #[serde(default = "default_growth_rate")]
    pub growth_rate: Dimensionless,
}

impl Default for PlanningParameters {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            horizon_years: default_horizon_years(),
            growth_rate: default_growth_rate(),
        }
    }
}

/// Parameters for relay deployment
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct DeploymentParameters {
    /// Maximum distance at which a relay or the command centre can link to a frontline team
    #[serde(default = "default_link_radius")]
    pub link_radius: Kilometres,
    /// How to solve the relay siting problem
    #[serde(default)]
    pub strategy: CoverStrategy,
}

impl Default for DeploymentParameters {
    fn default() -> Self {
        Self {
            link_radius: default_link_radius(),
            strategy: CoverStrategy::default(),
        }
    }
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Configuration {
    /// Number of regions
    pub region_count: usize,
    /// Base annual fire rate for each region
    pub region_fire_rates: Vec<f64>,
    /// Mean burned area of a fire
    pub fire_area_mean: SquareKilometres,
    /// Standard deviation of the burned area of a fire
    pub fire_area_std: SquareKilometres,
    /// How the area mean and standard deviation are interpreted
    #[serde(default)]
    pub area_parameterisation: AreaParameterisation,
    /// Base number of crew squads for any fire (α1)
    pub crew_base: f64,
    /// Additional crew squads per km² burned (α2)
    pub crew_per_area: f64,
    /// Area a single SSA unit can patrol
    pub ssa_coverage_area: SquareKilometres,
    /// Time for an SSA unit to complete one cruise cycle
    pub ssa_cruise_cycle: Hours,
    /// Maximum acceptable time between revisits of any point of a fire
    pub ssa_max_revisit: Hours,
    /// Coverage radius of a relay unit along a fireline
    pub relay_coverage_radius: Kilometres,
    /// Redundancy factor applied to relay demand (β)
    pub relay_redundancy: Dimensionless,
    /// Price of one SSA unit
    pub ssa_unit_price: MoneyPerUnit,
    /// Price of one relay unit
    pub relay_unit_price: MoneyPerUnit,
    /// Multiplicative margin applied to peak demand when sizing fleets (γ)
    pub safety_factor: Dimensionless,
    /// Optional cap on the combined procurement cost of the fleet
    #[serde(default)]
    pub budget_cap: Option<Money>,
    /// Multi-year planning parameters
    #[serde(default)]
    pub planning: PlanningParameters,
    /// Relay deployment parameters
    #[serde(default)]
    pub deployment: DeploymentParameters,
}

/// Check that a parameter is a finite number greater than zero
fn check_positive(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that there is one positive fire rate per region
fn check_region_fire_rates(region_count: usize, rates: &[f64]) -> Result<()> {
    ensure!(region_count > 0, "region_count cannot be zero");
    ensure!(
        rates.len() == region_count,
        "region_fire_rates has {} entries but region_count is {region_count}",
        rates.len()
    );
    for (region, &rate) in rates.iter().enumerate() {
        check_positive(&format!("Fire rate for region {region}"), rate)?;
    }

    Ok(())
}

/// Check that the crew model coefficients are usable
fn check_crew_coefficients(crew_base: f64, crew_per_area: f64) -> Result<()> {
    ensure!(
        crew_base.is_finite() && crew_per_area.is_finite(),
        "crew_base and crew_per_area must be finite numbers"
    );

    Ok(())
}

/// Check that the safety factor is valid, warning if it provides no margin
fn check_safety_factor(value: Dimensionless) -> Result<()> {
    check_positive("safety_factor", value.value())?;
    if value < Dimensionless(1.0) {
        warn!("safety_factor is less than one, so fleets will be smaller than peak demand");
    }

    Ok(())
}

/// Check that the growth rate is valid
fn check_growth_rate(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(-1.0),
        "growth_rate must be a finite number greater than -1"
    );

    Ok(())
}

impl Configuration {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`Configuration`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Configuration> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let config: Configuration = read_toml(&file_path)?;

        config
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(config)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_region_fire_rates(self.region_count, &self.region_fire_rates)?;
        check_positive("fire_area_mean", self.fire_area_mean.value())?;
        check_positive("fire_area_std", self.fire_area_std.value())?;
        if self.area_parameterisation == AreaParameterisation::LogParameters
            && self.fire_area_std < SquareKilometres(1.0)
        {
            warn!(
                "fire_area_std is less than one, which gives a negative log-normal scale; \
                all fires will have the same area"
            );
        }
        check_crew_coefficients(self.crew_base, self.crew_per_area)?;
        check_positive("ssa_coverage_area", self.ssa_coverage_area.value())?;
        check_positive("ssa_cruise_cycle", self.ssa_cruise_cycle.value())?;
        check_positive("ssa_max_revisit", self.ssa_max_revisit.value())?;
        check_positive("relay_coverage_radius", self.relay_coverage_radius.value())?;
        check_positive("relay_redundancy", self.relay_redundancy.value())?;
        check_positive("ssa_unit_price", self.ssa_unit_price.value())?;
        check_positive("relay_unit_price", self.relay_unit_price.value())?;
        check_safety_factor(self.safety_factor)?;
        if let Some(budget_cap) = self.budget_cap {
            check_positive("budget_cap", budget_cap.value())?;
        }
        check_growth_rate(self.planning.growth_rate)?;
        check_positive("link_radius", self.deployment.link_radius.value())?;

        Ok(())
    }

    /// The price of a single unit of the given class of equipment
    pub fn unit_price(&self, class: EquipmentClass) -> MoneyPerUnit {
        match class {
            EquipmentClass::Ssa => self.ssa_unit_price,
            EquipmentClass::Relay => self.relay_unit_price,
        }
    }
}
