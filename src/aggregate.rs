//! Brightness aggregation and proximity ranking.
//!
//! # Algorithm
//!
//! 1. Load every live sample once and index its brightness by id
//! 2. Resolve each location's references, silently dropping dangling ones
//! 3. Skip locations left with no live samples
//! 4. Average each location, then fold locations sharing a rounded coordinate
//!    into one [`RunningAverage`] without revisiting raw samples
//! 5. Sort by average brightness, darkest sky (highest mpas) first
//!
//! Ties are broken by rounded coordinate so the ranking is deterministic.

use crate::enrichment::mpas_to_nelm;
use crate::error::Result;
use crate::samples::SampleStore;
use crate::store::Collection;
use crate::types::{BrightnessSummary, Coordinate, Location, NearbyLocation, Sample, SampleId};
use log::debug;
use rustc_hash::FxHashMap;

/// Sample count and mean brightness that can be merged without raw samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningAverage {
    /// Number of samples represented
    pub count: usize,
    /// Mean of those samples
    pub average: f64,
}

impl RunningAverage {
    /// Averages a slice of values. Returns `None` for an empty slice.
    ///
    /// ```
    /// use skyglow::aggregate::RunningAverage;
    ///
    /// let avg = RunningAverage::from_values(&[18.5, 19.5]).unwrap();
    /// assert_eq!(avg.count, 2);
    /// assert_eq!(avg.average, 19.0);
    /// assert!(RunningAverage::from_values(&[]).is_none());
    /// ```
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            count: values.len(),
            average: values.iter().sum::<f64>() / values.len() as f64,
        })
    }

    /// Folds another group in, weighting each mean by its sample count.
    ///
    /// ```
    /// use skyglow::aggregate::RunningAverage;
    ///
    /// let mut a = RunningAverage { count: 1, average: 18.0 };
    /// a.merge(RunningAverage { count: 3, average: 20.0 });
    /// assert_eq!(a.count, 4);
    /// assert!((a.average - 19.5).abs() < 1e-12);
    /// ```
    pub fn merge(&mut self, other: RunningAverage) {
        let combined = self.count + other.count;
        if combined == 0 {
            return;
        }
        let total = combined as f64;
        self.average = self.average * (self.count as f64 / total)
            + other.average * (other.count as f64 / total);
        self.count = combined;
    }
}

/// Ranks locations by the average brightness of their live samples.
///
/// Reads the sample collection with a single listing call.
pub fn aggregate_by_brightness<C: Collection<Sample>>(
    locations: &[Location],
    samples: &SampleStore<C>,
) -> Result<Vec<BrightnessSummary>> {
    let live: FxHashMap<SampleId, f64> = samples
        .collection()
        .all()?
        .into_iter()
        .map(|sample| (sample.id, sample.mpas))
        .collect();
    Ok(aggregate_with(locations, &live))
}

/// Ranks locations using an already resolved `sample id -> mpas` index.
pub fn aggregate_with(
    locations: &[Location],
    live: &FxHashMap<SampleId, f64>,
) -> Vec<BrightnessSummary> {
    let mut groups: FxHashMap<(i64, i64), (Coordinate, RunningAverage)> = FxHashMap::default();

    for location in locations {
        let values: Vec<f64> = location
            .sample_refs
            .iter()
            .filter_map(|id| live.get(id).copied())
            .collect();
        let Some(stats) = RunningAverage::from_values(&values) else {
            continue;
        };

        let coordinate = location.coordinate.rounded();
        groups
            .entry(coordinate.grid_key())
            .and_modify(|(_, running)| running.merge(stats))
            .or_insert((coordinate, stats));
    }

    let mut ranked: Vec<((i64, i64), BrightnessSummary)> = groups
        .into_iter()
        .map(|(key, (coordinate, stats))| {
            (
                key,
                BrightnessSummary {
                    coordinate,
                    sample_count: stats.count,
                    average_mpas: stats.average,
                },
            )
        })
        .collect();
    ranked.sort_by(|(ka, a), (kb, b)| {
        b.average_mpas
            .total_cmp(&a.average_mpas)
            .then_with(|| ka.cmp(kb))
    });

    debug!(
        "aggregated {} locations into {} groups",
        locations.len(),
        ranked.len()
    );
    ranked.into_iter().map(|(_, summary)| summary).collect()
}

/// Keeps summaries strictly closer than `max_miles` to the origin.
///
/// Ranking order is preserved. Each kept entry carries its distance and the
/// naked eye limiting magnitude for its average brightness.
pub fn filter_by_proximity(
    results: &[BrightnessSummary],
    origin_lat: f64,
    origin_lon: f64,
    max_miles_exclusive: f64,
) -> Vec<NearbyLocation> {
    let origin = Coordinate::new(origin_lat, origin_lon);
    results
        .iter()
        .filter_map(|summary| {
            let distance_miles = origin.distance_to(&summary.coordinate);
            (distance_miles < max_miles_exclusive).then(|| NearbyLocation {
                lat: summary.coordinate.latitude,
                lon: summary.coordinate.longitude,
                sample_count: summary.sample_count,
                average_mpas: summary.average_mpas,
                nelm: mpas_to_nelm(summary.average_mpas),
                distance_miles,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocationId;

    fn location(id: u64, lat: f64, lon: f64, refs: &[u64]) -> Location {
        Location {
            id: LocationId(id),
            coordinate: Coordinate::new(lat, lon),
            sample_refs: refs.iter().map(|&r| SampleId(r)).collect(),
        }
    }

    fn live(values: &[(u64, f64)]) -> FxHashMap<SampleId, f64> {
        values.iter().map(|&(id, mpas)| (SampleId(id), mpas)).collect()
    }

    #[test]
    fn merge_order_does_not_matter() {
        let a = RunningAverage { count: 2, average: 18.25 };
        let b = RunningAverage { count: 5, average: 20.1 };

        let mut ab = a;
        ab.merge(b);
        let mut ba = b;
        ba.merge(a);

        assert_eq!(ab.count, ba.count);
        assert!((ab.average - ba.average).abs() < 1e-12);
    }

    #[test]
    fn merging_matches_flat_mean() {
        let values = [12.0, 14.5, 19.0, 20.5, 21.0];
        let flat = RunningAverage::from_values(&values).unwrap();

        let mut folded = RunningAverage::from_values(&values[..2]).unwrap();
        folded.merge(RunningAverage::from_values(&values[2..3]).unwrap());
        folded.merge(RunningAverage::from_values(&values[3..]).unwrap());

        assert_eq!(folded.count, flat.count);
        assert!((folded.average - flat.average).abs() < 1e-12);
    }

    #[test]
    fn empty_and_dangling_locations_are_excluded() {
        let locations = vec![
            location(1, 10.0, 10.0, &[]),
            location(2, 20.0, 20.0, &[99]),
            location(3, 30.0, 30.0, &[1, 98]),
        ];
        let results = aggregate_with(&locations, &live(&[(1, 17.0)]));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].coordinate, Coordinate::new(30.0, 30.0));
        assert_eq!(results[0].sample_count, 1);
        assert_eq!(results[0].average_mpas, 17.0);
    }

    #[test]
    fn near_identical_locations_are_merged() {
        let locations = vec![
            location(1, 40.001, -75.001, &[1]),
            location(2, 39.999, -74.999, &[2, 3, 4]),
        ];
        let results = aggregate_with(
            &locations,
            &live(&[(1, 16.0), (2, 20.0), (3, 20.0), (4, 20.0)]),
        );

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].coordinate, Coordinate::new(40.0, -75.0));
        assert_eq!(results[0].sample_count, 4);
        assert!((results[0].average_mpas - 19.0).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_darkest_first_with_coordinate_ties() {
        let locations = vec![
            location(1, 5.0, 5.0, &[1]),
            location(2, 1.0, 1.0, &[2]),
            location(3, 3.0, 3.0, &[3]),
            location(4, 2.0, 2.0, &[4]),
        ];
        let results = aggregate_with(
            &locations,
            &live(&[(1, 18.0), (2, 15.0), (3, 20.0), (4, 18.0)]),
        );

        let order: Vec<f64> = results.iter().map(|r| r.coordinate.latitude).collect();
        assert_eq!(order, vec![3.0, 2.0, 5.0, 1.0]);
    }

    #[test]
    fn proximity_is_strict() {
        let summary = BrightnessSummary {
            coordinate: Coordinate::new(41.0, -75.0),
            sample_count: 1,
            average_mpas: 20.0,
        };
        let exact = Coordinate::new(40.0, -75.0).distance_to(&summary.coordinate);

        assert!(filter_by_proximity(&[summary], 40.0, -75.0, exact).is_empty());
        let kept = filter_by_proximity(&[summary], 40.0, -75.0, exact + 1e-6);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].distance_miles - exact).abs() < 1e-9);
        assert!((kept[0].nelm - 5.49).abs() < 0.01);
    }
}
