//! Code for siting relay drones so that every frontline team can reach the command centre.
//!
//! A frontline team is connected if it is within the link radius of the command centre or of a
//! deployed relay. Choosing the fewest candidate sites which connect every team is a set cover
//! problem, which is solved either exactly (as a binary programme) or greedily.
use crate::optimisation::{Status, Variable, solve_minimisation};
use crate::units::Kilometres;
use anyhow::{Result, ensure};
use highs::RowProblem as Problem;
use log::{debug, info, warn};
use serde_string_enum::DeserializeLabeledStringEnum;

/// How to solve the relay siting problem
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum CoverStrategy {
    /// Find a minimum cover with the MILP solver
    #[default]
    #[string = "exact"]
    Exact,
    /// Repeatedly pick the site which connects the most remaining teams
    #[string = "greedy"]
    Greedy,
}

/// A point on the map, in km
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
}

impl Position {
    /// Create a new [`Position`]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another position
    pub fn distance_to(&self, other: &Position) -> Kilometres {
        Kilometres((self.x - other.x).hypot(self.y - other.y))
    }
}

/// The sites involved in a relay deployment
#[derive(Debug, Clone, PartialEq)]
pub struct RelayProblem {
    /// Location of the command centre
    pub command_centre: Position,
    /// Locations of the frontline teams
    pub frontlines: Vec<Position>,
    /// Sites where a relay could be deployed
    pub candidates: Vec<Position>,
    /// Maximum link distance (inclusive)
    pub radius: Kilometres,
}

impl RelayProblem {
    fn in_range(&self, a: &Position, b: &Position) -> bool {
        a.distance_to(b) <= self.radius
    }

    /// Whether the given frontline team can link to the command centre without a relay
    pub fn is_direct(&self, frontline: &Position) -> bool {
        self.in_range(frontline, &self.command_centre)
    }

    /// Indexes of candidate sites within range of the given frontline team
    pub fn covering_candidates<'a>(
        &'a self,
        frontline: &'a Position,
    ) -> impl Iterator<Item = usize> + 'a {
        self.candidates
            .iter()
            .enumerate()
            .filter(move |(_, candidate)| self.in_range(frontline, candidate))
            .map(|(idx, _)| idx)
    }

    /// Whether relays at the given candidate sites connect every frontline team
    pub fn is_covered_by(&self, selected: &[usize]) -> bool {
        self.frontlines.iter().all(|frontline| {
            self.is_direct(frontline)
                || selected
                    .iter()
                    .any(|&idx| self.in_range(frontline, &self.candidates[idx]))
        })
    }

    /// Frontline teams which need a relay, with the candidate sites which could serve each.
    ///
    /// Returns `None` if some team has neither a direct link nor any candidate in range.
    fn relay_requirements(&self) -> Option<Vec<Vec<usize>>> {
        let mut requirements = Vec::new();
        for (idx, frontline) in self.frontlines.iter().enumerate() {
            if self.is_direct(frontline) {
                continue;
            }

            let covering: Vec<_> = self.covering_candidates(frontline).collect();
            if covering.is_empty() {
                warn!(
                    "Frontline team {idx} at ({}, {}) cannot be reached by any candidate site",
                    frontline.x, frontline.y
                );
                return None;
            }
            requirements.push(covering);
        }

        Some(requirements)
    }
}

/// The relays chosen for deployment
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResult {
    /// Indexes of the chosen candidate sites, in ascending order
    pub selected: Vec<usize>,
    /// Locations of the chosen sites
    pub positions: Vec<Position>,
    /// Outcome of the optimisation. If infeasible, no sites are selected.
    pub status: Status,
}

impl RelayResult {
    fn new(problem: &RelayProblem, mut selected: Vec<usize>, status: Status) -> Self {
        selected.sort_unstable();
        let positions = selected.iter().map(|&idx| problem.candidates[idx]).collect();
        Self {
            selected,
            positions,
            status,
        }
    }

    /// Number of relays deployed
    pub fn count(&self) -> usize {
        self.selected.len()
    }
}

/// Choose where to deploy relays so that every frontline team is connected.
///
/// # Arguments
///
/// * `problem` - The sites involved
/// * `strategy` - Whether to find a minimum cover or a greedy approximation
///
/// # Returns
///
/// The chosen sites, with [`Status::Infeasible`] if some team cannot be connected. An error is
/// returned if the solver fails.
pub fn optimise_relay_deployment(
    problem: &RelayProblem,
    strategy: CoverStrategy,
) -> Result<RelayResult> {
    let Some(requirements) = problem.relay_requirements() else {
        return Ok(RelayResult::new(problem, Vec::new(), Status::Infeasible));
    };

    debug!(
        "{} of {} frontline teams need a relay",
        requirements.len(),
        problem.frontlines.len()
    );
    if requirements.is_empty() {
        return Ok(RelayResult::new(problem, Vec::new(), Status::Optimal));
    }

    let result = match strategy {
        CoverStrategy::Exact => solve_exact(problem, &requirements)?,
        CoverStrategy::Greedy => solve_greedy(problem, &requirements),
    };

    if result.status.is_feasible() {
        ensure!(
            problem.is_covered_by(&result.selected),
            "Relay deployment leaves a frontline team unconnected"
        );
    }

    info!(
        "Relay deployment: {} relays at sites {:?} ({})",
        result.count(),
        result.selected,
        result.status
    );

    Ok(result)
}

/// Find a minimum cover by solving a binary programme
fn solve_exact(problem: &RelayProblem, requirements: &[Vec<usize>]) -> Result<RelayResult> {
    let mut lp = Problem::default();
    let variables: Vec<Variable> = problem
        .candidates
        .iter()
        .map(|_| lp.add_integer_column(1.0, 0.0..=1.0))
        .collect();
    for covering in requirements {
        lp.add_row(1.0.., covering.iter().map(|&idx| (variables[idx], 1.0)));
    }

    let Some(solution) = solve_minimisation(lp)? else {
        return Ok(RelayResult::new(problem, Vec::new(), Status::Infeasible));
    };

    let selected = solution
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value > 0.5)
        .map(|(idx, _)| idx)
        .collect();

    Ok(RelayResult::new(problem, selected, Status::Optimal))
}

/// Build a cover by repeatedly picking the site which serves the most remaining teams.
///
/// Ties go to the site with the lowest index. The cover is at most H(n) times larger than the
/// minimum, where n is the number of teams needing a relay.
fn solve_greedy(problem: &RelayProblem, requirements: &[Vec<usize>]) -> RelayResult {
    let mut uncovered: Vec<&Vec<usize>> = requirements.iter().collect();
    let mut selected = Vec::new();
    while !uncovered.is_empty() {
        let serves =
            |idx: usize| uncovered.iter().filter(|covering| covering.contains(&idx)).count();

        // max_by_key returns the last maximum, so iterate in reverse to favour low indexes
        let best = (0..problem.candidates.len())
            .rev()
            .max_by_key(|&idx| serves(idx))
            .filter(|&idx| serves(idx) > 0);
        let Some(best) = best else {
            return RelayResult::new(problem, Vec::new(), Status::Infeasible);
        };

        selected.push(best);
        uncovered.retain(|covering| !covering.contains(&best));
    }

    RelayResult::new(problem, selected, Status::Approximate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::relay_problem;
    use rstest::rstest;

    #[test]
    fn test_distance_to() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), Kilometres(5.0));
        assert_eq!(b.distance_to(&a), Kilometres(5.0));
    }

    #[rstest]
    fn test_covering_candidates(relay_problem: RelayProblem) {
        assert!(relay_problem.is_direct(&relay_problem.frontlines[0]));
        assert!(!relay_problem.is_direct(&relay_problem.frontlines[1]));

        // (40, 20) is within 20 km of (25, 15), (25, 25), (35, 5), (35, 15) and (35, 25)
        let covering: Vec<_> = relay_problem
            .covering_candidates(&relay_problem.frontlines[5])
            .collect();
        assert_eq!(covering, [7, 8, 9, 10, 11]);
    }

    #[rstest]
    #[case(CoverStrategy::Exact, Status::Optimal)]
    #[case(CoverStrategy::Greedy, Status::Approximate)]
    fn test_optimise_relay_deployment(
        relay_problem: RelayProblem,
        #[case] strategy: CoverStrategy,
        #[case] expected_status: Status,
    ) {
        let result = optimise_relay_deployment(&relay_problem, strategy).unwrap();
        assert_eq!(result.status, expected_status);
        assert_eq!(result.count(), 1);
        assert!(relay_problem.is_covered_by(&result.selected));
        assert_eq!(result.positions.len(), 1);
    }

    #[rstest]
    fn test_greedy_picks_widest_site(relay_problem: RelayProblem) {
        let result = optimise_relay_deployment(&relay_problem, CoverStrategy::Greedy).unwrap();
        assert_eq!(result.selected, [7]);
        assert_eq!(result.positions, [Position::new(25.0, 15.0)]);
    }

    #[rstest]
    #[case(CoverStrategy::Exact)]
    #[case(CoverStrategy::Greedy)]
    fn test_frontline_at_link_radius(#[case] strategy: CoverStrategy) {
        let problem = RelayProblem {
            command_centre: Position::new(0.0, 0.0),
            frontlines: vec![Position::new(3.0, 4.0)],
            candidates: Vec::new(),
            radius: Kilometres(5.0),
        };
        let result = optimise_relay_deployment(&problem, strategy).unwrap();
        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.count(), 0);
    }

    #[test]
    fn test_candidate_at_link_radius() {
        let problem = RelayProblem {
            command_centre: Position::new(0.0, 0.0),
            frontlines: vec![Position::new(13.0, 4.0)],
            candidates: vec![Position::new(30.0, 30.0), Position::new(10.0, 0.0)],
            radius: Kilometres(5.0),
        };
        let result = optimise_relay_deployment(&problem, CoverStrategy::Exact).unwrap();
        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.selected, [1]);
    }

    #[rstest]
    #[case(CoverStrategy::Exact)]
    #[case(CoverStrategy::Greedy)]
    fn test_unreachable_frontline(
        mut relay_problem: RelayProblem,
        #[case] strategy: CoverStrategy,
    ) {
        relay_problem.frontlines.push(Position::new(100.0, 100.0));
        let result = optimise_relay_deployment(&relay_problem, strategy).unwrap();
        assert_eq!(result.status, Status::Infeasible);
        assert!(result.selected.is_empty());
    }

    #[rstest]
    fn test_no_frontlines(mut relay_problem: RelayProblem) {
        relay_problem.frontlines.clear();
        let result = optimise_relay_deployment(&relay_problem, CoverStrategy::Exact).unwrap();
        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.count(), 0);
    }

    #[test]
    fn test_exact_needs_two_relays() {
        // Teams on opposite sides of the command centre, beyond its range
        let problem = RelayProblem {
            command_centre: Position::new(0.0, 0.0),
            frontlines: vec![Position::new(-30.0, 0.0), Position::new(30.0, 0.0)],
            candidates: vec![
                Position::new(-25.0, 0.0),
                Position::new(0.0, 5.0),
                Position::new(25.0, 0.0),
            ],
            radius: Kilometres(20.0),
        };
        let result = optimise_relay_deployment(&problem, CoverStrategy::Exact).unwrap();
        assert_eq!(result.status, Status::Optimal);
        assert_eq!(result.selected, [0, 2]);
    }
}
