//! Common code for solving integer programmes with the HiGHS solver.
use anyhow::{Result, bail};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::{Level, log_enabled};
use serde::{Deserialize, Serialize};
use strum::Display;

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
pub type Variable = highs::Col;

/// The outcome of an optimisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// A provably optimal solution was found
    Optimal,
    /// A feasible solution was found, but it may not be optimal
    Approximate,
    /// There is no feasible solution. Other values in the result should not be trusted.
    Infeasible,
}

impl Status {
    /// Whether a feasible solution was found
    pub fn is_feasible(self) -> bool {
        self != Status::Infeasible
    }
}

/// Solve a minimisation problem.
///
/// # Returns
///
/// The values of the problem's columns (in the order in which they were added), `None` if the
/// problem is infeasible or an error if the solver failed for some other reason.
pub fn solve_minimisation(problem: Problem) -> Result<Option<Vec<f64>>> {
    let mut model = problem.optimise(Sense::Minimise);
    set_highs_options(&mut model);

    let solved = model.solve();
    match solved.status() {
        HighsModelStatus::Optimal => Ok(Some(solved.get_solution().columns().to_vec())),
        // All our problems have non-negative costs and variables, so can't be unbounded
        HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => Ok(None),
        status => bail!("Could not solve: {status:?}"),
    }
}

/// Set options for the HiGHS solver
fn set_highs_options(model: &mut highs::Model) {
    // Solver output doesn't go via our logger, so only show it when tracing
    let show_output = log_enabled!(Level::Trace);
    model.set_option("output_flag", show_output);
    model.set_option("log_to_console", show_output);

    // Counts are small, so we want exact solutions rather than ones within a relative gap
    model.set_option("mip_rel_gap", 0.0);
}
