//! Fixtures for tests

use crate::configuration::{
    AreaParameterisation, Configuration, DeploymentParameters, PlanningParameters,
};
use crate::relay::{Position, RelayProblem};
use crate::units::{Dimensionless, Hours, Kilometres, MoneyPerUnit, SquareKilometres};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A five-region configuration with typical parameter values
#[fixture]
pub fn configuration() -> Configuration {
    Configuration {
        region_count: 5,
        region_fire_rates: vec![8.0, 12.0, 6.0, 10.0, 7.0],
        fire_area_mean: SquareKilometres(1.5),
        fire_area_std: SquareKilometres(1.0),
        area_parameterisation: AreaParameterisation::MomentMatched,
        crew_base: 2.0,
        crew_per_area: 0.3,
        ssa_coverage_area: SquareKilometres(0.8),
        ssa_cruise_cycle: Hours(1.5),
        ssa_max_revisit: Hours(0.3),
        relay_coverage_radius: Kilometres(15.0),
        relay_redundancy: Dimensionless(1.3),
        ssa_unit_price: MoneyPerUnit(80000.0),
        relay_unit_price: MoneyPerUnit(25000.0),
        safety_factor: Dimensionless(1.2),
        budget_cap: None,
        planning: PlanningParameters::default(),
        deployment: DeploymentParameters::default(),
    }
}

/// A configuration with a single region which never has any fires
#[fixture]
pub fn fireless_configuration(mut configuration: Configuration) -> Configuration {
    configuration.region_count = 1;
    configuration.region_fire_rates = vec![0.0];
    configuration
}

/// Six frontline teams with a grid of candidate relay sites, command centre at the origin
#[fixture]
pub fn relay_problem() -> RelayProblem {
    let frontlines = [
        (15.0, 10.0),
        (25.0, 15.0),
        (35.0, 8.0),
        (20.0, 25.0),
        (30.0, 30.0),
        (40.0, 20.0),
    ]
    .into_iter()
    .map(|(x, y)| Position::new(x, y))
    .collect();

    let mut candidates = Vec::new();
    for x in (5..45_i32).step_by(10) {
        for y in (5..35_i32).step_by(10) {
            candidates.push(Position::new(f64::from(x), f64::from(y)));
        }
    }

    RelayProblem {
        command_centre: Position::new(0.0, 0.0),
        frontlines,
        candidates,
        radius: Kilometres(20.0),
    }
}
