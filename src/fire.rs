//! Code for simulating the wildfires which occur in a year.
//!
//! Fires occur in each region as a Poisson process whose rate grows every year. The burned area of
//! each fire is log-normally distributed and determines how long it burns, how many crew squads it
//! needs and how long its fireline is.
use crate::configuration::{AreaParameterisation, Configuration};
use crate::demand::{ClassCounts, event_demand};
use crate::units::{Dimensionless, Hours, Kilometres, SquareKilometres};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, LogNormal, Poisson};
use std::f64::consts::PI;
use std::ops::Range;

/// The number of hours in a simulated year
pub const HOURS_PER_YEAR: u32 = 8760;

/// Smallest burned area a fire can have
const MIN_FIRE_AREA: SquareKilometres = SquareKilometres(0.1);

/// Largest burned area a fire can have
const MAX_FIRE_AREA: SquareKilometres = SquareKilometres(10.0);

/// How many hours a fire burns for per km² of burned area
const HOURS_PER_AREA: f64 = 8.0;

/// Shortest time a fire can burn for
const MIN_DURATION: Hours = Hours(4.0);

/// Longest time a fire can burn for
const MAX_DURATION: Hours = Hours(48.0);

/// A single wildfire
#[derive(Debug, Clone, PartialEq)]
pub struct FireEvent {
    /// Index of the region in which the fire occurred
    pub region: usize,
    /// The hour of the year in which the fire started
    pub start_hour: u32,
    /// How long the fire burns for
    pub duration: Hours,
    /// The burned area
    pub area: SquareKilometres,
    /// Number of crew squads deployed
    pub crew_count: f64,
    /// Length of the fireline
    pub fireline_length: Kilometres,
    /// Equipment required while the fire burns
    pub demand: ClassCounts,
}

impl FireEvent {
    /// Create a new fire, deriving its other properties from its burned area
    fn new(config: &Configuration, region: usize, start_hour: u32, area: SquareKilometres) -> Self {
        let crew_count = (config.crew_base + config.crew_per_area * area.value()).max(1.0);
        let duration = Hours(
            (HOURS_PER_AREA * area.value()).clamp(MIN_DURATION.value(), MAX_DURATION.value()),
        );
        let fireline_length = Kilometres(3.0 * (PI * area.value()).sqrt());
        let demand = event_demand(config, area, crew_count, fireline_length);

        Self {
            region,
            start_hour,
            duration,
            area,
            crew_count,
            fireline_length,
            demand,
        }
    }

    /// The hours of the year during which the fire is burning.
    ///
    /// A fire is only counted as burning in hours which it burns for in their entirety. The range
    /// may extend past the end of the year.
    pub fn active_hours(&self) -> Range<u32> {
        let end = f64::from(self.start_hour) + self.duration.value();
        self.start_hour..end as u32
    }
}

/// Create the random number generator used to simulate the given year.
///
/// Every year draws from its own stream of the generator seeded with `seed`, so results for a year
/// don't depend on which other years are simulated.
pub fn year_rng(seed: u64, year: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(year.into());
    rng
}

/// The distribution of burned areas, before clamping
enum AreaDistribution {
    LogNormal(LogNormal<f64>),
    /// All fires have the same area
    Fixed(f64),
}

impl AreaDistribution {
    fn new(config: &Configuration) -> Self {
        let mean = config.fire_area_mean.value();
        let std = config.fire_area_std.value();
        let (location, scale) = match config.area_parameterisation {
            AreaParameterisation::MomentMatched => {
                let variance = (1.0 + (std / mean).powi(2)).ln();
                (mean.ln() - variance / 2.0, variance.sqrt())
            }
            AreaParameterisation::LogParameters => (mean.ln(), std.ln()),
        };

        // A zero, negative or non-finite scale gives every fire the median area
        if !(scale.is_finite() && scale > 0.0) {
            return Self::Fixed(location.exp());
        }

        match LogNormal::new(location, scale) {
            Ok(dist) => Self::LogNormal(dist),
            Err(_) => Self::Fixed(location.exp()),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SquareKilometres {
        let area = match self {
            Self::LogNormal(dist) => dist.sample(rng),
            Self::Fixed(area) => *area,
        };

        // NB: f64::clamp would propagate NaN
        SquareKilometres(area.max(MIN_FIRE_AREA.value()).min(MAX_FIRE_AREA.value()))
    }
}

/// Draw the number of fires which occur in a region
fn sample_fire_count<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> u64 {
    // Poisson::new rejects non-positive and non-finite rates, for which there are no fires
    match Poisson::new(rate) {
        Ok(dist) => {
            let count: f64 = dist.sample(rng);
            count as u64
        }
        Err(_) => 0,
    }
}

/// Simulate the fires which occur in a year.
///
/// The base fire rate of every region is scaled by `(1 + growth_rate)^year`.
///
/// # Arguments
///
/// * `config` - Model configuration
/// * `year` - Number of years after the base year
/// * `growth_rate` - Annual growth rate of fire occurrence
/// * `rng` - Random number generator for this year
///
/// # Returns
///
/// The fires for the year, in no particular order.
pub fn generate_fire_events<R: Rng + ?Sized>(
    config: &Configuration,
    year: u32,
    growth_rate: Dimensionless,
    rng: &mut R,
) -> Vec<FireEvent> {
    let growth = (Dimensionless(1.0) + growth_rate).powf(f64::from(year));
    let areas = AreaDistribution::new(config);

    let mut events = Vec::new();
    for (region, &base_rate) in config.region_fire_rates.iter().enumerate() {
        let fire_count = sample_fire_count(base_rate * growth.value(), rng);
        for _ in 0..fire_count {
            let start_hour = rng.gen_range(0..HOURS_PER_YEAR);
            let area = areas.sample(rng);
            events.push(FireEvent::new(config, region, start_hour, area));
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{configuration, fireless_configuration};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_generate_fire_events_deterministic(configuration: Configuration) {
        let events1 = generate_fire_events(
            &configuration,
            3,
            Dimensionless(0.03),
            &mut year_rng(42, 3),
        );
        let events2 = generate_fire_events(
            &configuration,
            3,
            Dimensionless(0.03),
            &mut year_rng(42, 3),
        );
        assert!(!events1.is_empty());
        assert_eq!(events1, events2);
    }

    #[rstest]
    fn test_generate_fire_events_no_fires(fireless_configuration: Configuration) {
        let events = generate_fire_events(
            &fireless_configuration,
            0,
            Dimensionless(0.03),
            &mut year_rng(1, 0),
        );
        assert!(events.is_empty());
    }

    #[rstest]
    #[case(AreaParameterisation::MomentMatched)]
    #[case(AreaParameterisation::LogParameters)]
    fn test_generate_fire_events_high_rate(
        mut configuration: Configuration,
        #[case] area_parameterisation: AreaParameterisation,
    ) {
        configuration.region_count = 1;
        configuration.region_fire_rates = vec![100.0];
        configuration.fire_area_std = SquareKilometres(2.5);
        configuration.area_parameterisation = area_parameterisation;

        let events = generate_fire_events(
            &configuration,
            0,
            Dimensionless(0.0),
            &mut year_rng(7, 0),
        );
        assert!(!events.is_empty());
        for event in &events {
            assert_eq!(event.region, 0);
            assert!(event.start_hour < HOURS_PER_YEAR);
            assert!((MIN_FIRE_AREA..=MAX_FIRE_AREA).contains(&event.area));
            assert!((MIN_DURATION..=MAX_DURATION).contains(&event.duration));
            assert!(event.crew_count >= 1.0);
            assert!(event.fireline_length > Kilometres(0.0));
            assert!(event.demand.ssa >= 1);
            assert!(event.demand.relay >= 1);
        }
    }

    #[rstest]
    fn test_growth_increases_fires(configuration: Configuration) {
        // With a large enough growth rate, the later year should have many more fires
        let base = generate_fire_events(&configuration, 0, Dimensionless(1.0), &mut year_rng(3, 0));
        let later =
            generate_fire_events(&configuration, 5, Dimensionless(1.0), &mut year_rng(3, 5));
        assert!(later.len() > 10 * base.len());
    }

    #[rstest]
    fn test_growth_far_future(configuration: Configuration) {
        // Shrinking fire occurrence dies out rather than wrapping round to growth
        let events = generate_fire_events(
            &configuration,
            u32::MAX,
            Dimensionless(-0.5),
            &mut year_rng(3, u32::MAX),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_year_rng_streams_differ() {
        let a: u64 = year_rng(42, 0).r#gen();
        let b: u64 = year_rng(42, 1).r#gen();
        let c: u64 = year_rng(42, 0).r#gen();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[rstest]
    fn test_fire_event_new(configuration: Configuration) {
        let event = FireEvent::new(&configuration, 2, 100, SquareKilometres(2.0));
        assert_eq!(event.duration, Hours(16.0));
        assert_approx_eq!(f64, event.crew_count, 2.6);
        assert_approx_eq!(f64, event.fireline_length.value(), 3.0 * (2.0 * PI).sqrt());
        assert_eq!(event.active_hours(), 100..116);

        // Short and long fires are clamped
        let event = FireEvent::new(&configuration, 0, 0, SquareKilometres(0.1));
        assert_eq!(event.duration, MIN_DURATION);
        let event = FireEvent::new(&configuration, 0, 0, SquareKilometres(10.0));
        assert_eq!(event.duration, MAX_DURATION);
    }

    #[rstest]
    fn test_crew_count_at_least_one(mut configuration: Configuration) {
        configuration.crew_base = -5.0;
        let event = FireEvent::new(&configuration, 0, 0, SquareKilometres(1.0));
        assert_eq!(event.crew_count, 1.0);
    }

    #[rstest]
    fn test_area_distribution_degenerate(mut configuration: Configuration) {
        // A standard deviation of less than one gives a negative log-scale
        configuration.area_parameterisation = AreaParameterisation::LogParameters;
        configuration.fire_area_std = SquareKilometres(0.5);
        let areas = AreaDistribution::new(&configuration);
        let mut rng = year_rng(0, 0);
        assert_approx_eq!(f64, areas.sample(&mut rng).value(), 1.5);
    }

    #[test]
    fn test_sample_fire_count_invalid_rate() {
        let mut rng = year_rng(0, 0);
        assert_eq!(sample_fire_count(0.0, &mut rng), 0);
        assert_eq!(sample_fire_count(-4.0, &mut rng), 0);
        assert_eq!(sample_fire_count(f64::NAN, &mut rng), 0);
    }
}
