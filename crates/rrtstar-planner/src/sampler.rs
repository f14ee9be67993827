//! Sample generation for tree growth.
//!
//! The planner draws candidate points through the [`Sampler`] trait.
//! [`GoalBiasedSampler`] is the standard strategy: with probability
//! `goal_bias` it returns the goal itself, otherwise a uniform point over
//! the grid. Closures returning [`Point`] also implement [`Sampler`],
//! which lets tests script exact sample sequences.

use rand::Rng;

use crate::grid::OccupancyGrid;
use crate::types::{PlannerError, Point};

/// Source of candidate points for the planner.
pub trait Sampler {
    /// Draw the next candidate point.
    fn sample(&mut self) -> Point;
}

impl<F: FnMut() -> Point> Sampler for F {
    fn sample(&mut self) -> Point {
        self()
    }
}

/// Uniform sampling over the grid, biased toward the goal.
#[derive(Debug, Clone)]
pub struct GoalBiasedSampler<R> {
    rng: R,
    goal: Point,
    goal_bias: f64,
    width: f64,
    height: f64,
}

impl<R: Rng> GoalBiasedSampler<R> {
    /// Create a sampler over `grid`'s bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfig`] if `goal_bias` is outside `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(
        rng: R,
        grid: &OccupancyGrid,
        goal: Point,
        goal_bias: f64,
    ) -> Result<Self, PlannerError> {
        if !(0.0..=1.0).contains(&goal_bias) {
            return Err(PlannerError::InvalidConfig(format!(
                "goal_bias must be within [0, 1], got {goal_bias}"
            )));
        }
        Ok(Self {
            rng,
            goal,
            goal_bias,
            width: grid.width() as f64,
            height: grid.height() as f64,
        })
    }
}

impl<R: Rng> Sampler for GoalBiasedSampler<R> {
    fn sample(&mut self) -> Point {
        if self.rng.random_bool(self.goal_bias) {
            return self.goal;
        }
        Point::new(
            self.rng.random_range(0.0..self.width),
            self.rng.random_range(0.0..self.height),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn grid() -> OccupancyGrid {
        OccupancyGrid::from_rows(&["________"; 4]).unwrap()
    }

    #[test]
    fn samples_stay_inside_grid() {
        let grid = grid();
        let mut sampler =
            GoalBiasedSampler::new(StdRng::seed_from_u64(1), &grid, Point::new(7.0, 3.0), 0.2)
                .unwrap();
        for _ in 0..2000 {
            let p = sampler.sample();
            assert!(grid.contains(p), "sample {p:?} outside grid");
        }
    }

    #[test]
    fn full_bias_always_returns_goal() {
        let goal = Point::new(7.0, 3.0);
        let mut sampler =
            GoalBiasedSampler::new(StdRng::seed_from_u64(2), &grid(), goal, 1.0).unwrap();
        for _ in 0..100 {
            assert_eq!(sampler.sample(), goal);
        }
    }

    #[test]
    fn zero_bias_explores_uniformly() {
        let goal = Point::new(7.0, 3.0);
        let mut sampler =
            GoalBiasedSampler::new(StdRng::seed_from_u64(3), &grid(), goal, 0.0).unwrap();
        let samples: Vec<Point> = (0..1000).map(|_| sampler.sample()).collect();
        assert!(samples.iter().all(|&p| p != goal));
        let left = samples.iter().filter(|p| p.x < 4.0).count();
        assert!((400..600).contains(&left), "left half got {left} of 1000");
    }

    #[test]
    fn goal_frequency_tracks_bias() {
        let goal = Point::new(7.0, 3.0);
        let mut sampler =
            GoalBiasedSampler::new(StdRng::seed_from_u64(4), &grid(), goal, 0.2).unwrap();
        let hits = (0..10_000).filter(|_| sampler.sample() == goal).count();
        assert!((1700..2300).contains(&hits), "goal drawn {hits} of 10000 times");
    }

    #[test]
    fn same_seed_same_sequence() {
        let goal = Point::new(1.0, 1.0);
        let mut a = GoalBiasedSampler::new(StdRng::seed_from_u64(9), &grid(), goal, 0.3).unwrap();
        let mut b = GoalBiasedSampler::new(StdRng::seed_from_u64(9), &grid(), goal, 0.3).unwrap();
        for _ in 0..50 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn invalid_bias_rejected() {
        let result = GoalBiasedSampler::new(StdRng::seed_from_u64(0), &grid(), Point::new(0.0, 0.0), 1.2);
        assert!(matches!(result, Err(PlannerError::InvalidConfig(_))));
    }

    #[test]
    fn closures_are_samplers() {
        let script = [Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        let mut index = 0;
        let mut sampler = move || {
            let p = script[index % script.len()];
            index += 1;
            p
        };
        assert_eq!(Sampler::sample(&mut sampler), Point::new(1.0, 1.0));
        assert_eq!(Sampler::sample(&mut sampler), Point::new(2.0, 2.0));
        assert_eq!(Sampler::sample(&mut sampler), Point::new(1.0, 1.0));
    }
}
