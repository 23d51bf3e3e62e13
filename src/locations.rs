//! Location store: deduplicated places and their sample references.

use crate::error::{Result, StoreResult};
use crate::store::Collection;
use crate::types::{Coordinate, Location, LocationId, SampleId};
use log::{debug, warn};

/// Locations whose reference to a deleted sample was (or could not be) removed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScrubReport {
    /// Locations that no longer reference the sample
    pub affected: Vec<LocationId>,
    /// Locations that still reference it because their update failed
    pub failed: Vec<LocationId>,
}

/// Access to the [`Location`] collection of one scope.
///
/// Coordinates are compared exactly. Callers round with
/// [`round_coordinate`](crate::geo::round_coordinate) before calling
/// [`find_by_coordinate`](Self::find_by_coordinate) or [`create`](Self::create).
pub struct LocationStore<C> {
    collection: C,
}

impl<C: Collection<Location>> LocationStore<C> {
    /// Wraps a collection.
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    /// The underlying collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Fetches a location by identifier.
    pub fn find_by_id(&self, id: LocationId) -> Result<Option<Location>> {
        Ok(self.collection.get(id.0)?)
    }

    /// Finds the location stored at exactly this coordinate.
    pub fn find_by_coordinate(&self, latitude: f64, longitude: f64) -> Result<Option<Location>> {
        Ok(self.collection.all()?.into_iter().find(|location| {
            location.coordinate.latitude == latitude && location.coordinate.longitude == longitude
        }))
    }

    /// Every location in scope.
    pub fn all(&self) -> Result<Vec<Location>> {
        Ok(self.collection.all()?)
    }

    /// Stores a new location with no sample references.
    pub fn create(&self, coordinate: Coordinate) -> Result<Location> {
        let location = Location {
            id: LocationId(self.collection.next_id()?),
            coordinate,
            sample_refs: Vec::new(),
        };
        self.collection.insert(location.id.0, location.clone())?;
        debug!(
            "created location {} at {}, {}",
            location.id, coordinate.latitude, coordinate.longitude
        );
        Ok(location)
    }

    /// Appends a sample reference unless the location already holds it.
    ///
    /// Returns `false` when the location does not exist.
    pub fn add_reference(&self, location: LocationId, sample: SampleId) -> Result<bool> {
        let updated = self.collection.update(location.0, &mut |stored| {
            if !stored.has_ref(sample) {
                stored.sample_refs.push(sample);
            }
        })?;
        Ok(updated.is_some())
    }

    /// Removes a sample reference from every location holding it.
    ///
    /// Absent references are skipped, so repeating the call is a no-op. A failed
    /// update of one location is logged and reported in [`ScrubReport::failed`]
    /// without stopping the scan. Only a failure to list the collection aborts.
    pub fn remove_reference_everywhere(&self, sample: SampleId) -> Result<ScrubReport> {
        let mut report = ScrubReport::default();

        for location in self.collection.all()? {
            if !location.has_ref(sample) {
                continue;
            }
            let id = location.id;
            match self.strip(id, sample) {
                Ok(Some(_)) => report.affected.push(id),
                Ok(None) => debug!("location {id} vanished while removing sample {sample}"),
                Err(err) => {
                    warn!("failed to remove sample {sample} from location {id}: {err}");
                    report.failed.push(id);
                }
            }
        }

        Ok(report)
    }

    fn strip(&self, location: LocationId, sample: SampleId) -> StoreResult<Option<Location>> {
        self.collection.update(location.0, &mut |stored| {
            stored.sample_refs.retain(|&r| r != sample);
        })
    }
}
