use crate::aggregate::{aggregate_by_brightness, filter_by_proximity};
use crate::config::Config;
use crate::error::{EntityKind, Error, Result, StoreError};
use crate::ownership::authorize;
use crate::samples::validate_mpas;
use crate::store::{decode, encode, Collection, MemoryCollection, Snapshot};
use crate::types::{
    BrightnessSummary, Coordinate, DeletionReport, Location, LocationId, LocationView,
    NearbyLocation, Sample, SampleId, SampleView, SEARCH_MILES_RANGE,
};
use crate::{LocationStore, SampleStore};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// The aggregation and query engine over a pair of collections.
///
/// Every operation takes its inputs already parsed and its caller identity
/// explicitly; an empty identity means anonymous. Nothing is serialized across
/// entities, so a sample linked or deleted concurrently may leave a dangling
/// reference. Reads tolerate those and deletes scrub them.
pub struct SkyDatabase<L = MemoryCollection<Location>, S = MemoryCollection<Sample>> {
    locations: LocationStore<L>,
    samples: SampleStore<S>,
}

/// Both collections of an in-memory [`SkyDatabase`], ready for `bincode`.
#[derive(Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    /// Location records
    pub locations: Snapshot<Location>,
    /// Sample records
    pub samples: Snapshot<Sample>,
}

impl<L: Collection<Location>, S: Collection<Sample>> SkyDatabase<L, S> {
    /// Builds an engine over the given collections.
    pub fn new(locations: L, samples: S) -> Self {
        Self {
            locations: LocationStore::new(locations),
            samples: SampleStore::new(samples),
        }
    }

    /// The location store.
    pub fn locations(&self) -> &LocationStore<L> {
        &self.locations
    }

    /// The sample store.
    pub fn samples(&self) -> &SampleStore<S> {
        &self.samples
    }

    /// Returns the location at the rounded coordinate, creating it if needed.
    ///
    /// The raw input is range checked before rounding. A longitude that rounds
    /// onto `-180` is stored as `180`, the same meridian.
    ///
    /// ```
    /// use skyglow::{Config, SkyDatabase};
    ///
    /// let db = SkyDatabase::in_memory(&Config::default());
    /// let a = db.submit_location(40.001, -75.004).unwrap();
    /// let b = db.submit_location(39.999, -74.996).unwrap();
    /// assert_eq!(a.id, b.id);
    /// assert_eq!((a.lat, a.lon), (40.0, -75.0));
    /// ```
    pub fn submit_location(&self, latitude: f64, longitude: f64) -> Result<LocationView> {
        let raw = Coordinate::new(latitude, longitude);
        validate_coordinate(&raw)?;
        let mut coordinate = raw.rounded();
        if coordinate.longitude == -180.0 {
            coordinate.longitude = 180.0;
        }

        if let Some(existing) = self
            .locations
            .find_by_coordinate(coordinate.latitude, coordinate.longitude)?
        {
            return Ok(existing.to_view());
        }

        let location = self.locations.create(coordinate)?;
        info!(
            "new location {} at {}, {}",
            location.id, coordinate.latitude, coordinate.longitude
        );
        Ok(location.to_view())
    }

    /// Records a measurement at an existing location.
    pub fn submit_sample(
        &self,
        location_id: LocationId,
        mpas: f64,
        owner_id: &str,
    ) -> Result<SampleView> {
        validate_mpas(mpas)?;
        if self.locations.find_by_id(location_id)?.is_none() {
            return Err(Error::not_found(EntityKind::Location, location_id.0));
        }

        let sample = self.samples.create(mpas, owner_id)?;
        let linked = self.locations.add_reference(location_id, sample.id);
        if !matches!(linked, Ok(true)) {
            // never leave a sample that no location can reach
            if let Err(err) = self.samples.delete(sample.id) {
                warn!("could not discard unlinked sample {}: {err}", sample.id);
            }
            return Err(linked
                .err()
                .unwrap_or_else(|| Error::not_found(EntityKind::Location, location_id.0)));
        }

        info!(
            "sample {} ({} mpas) added to location {}",
            sample.id, mpas, location_id
        );
        Ok(sample.to_view())
    }

    /// Ranked brightness of every location, darkest sky first.
    pub fn aggregate(&self) -> Result<Vec<BrightnessSummary>> {
        let locations = self.locations.all()?;
        aggregate_by_brightness(&locations, &self.samples)
    }

    /// Locations strictly closer than `max_miles`, darkest sky first.
    ///
    /// The origin is rounded like stored coordinates before validation.
    /// `max_miles` must lie in `[5, 12500]`.
    pub fn query_locations_near(
        &self,
        latitude: f64,
        longitude: f64,
        max_miles: f64,
    ) -> Result<Vec<NearbyLocation>> {
        let origin = Coordinate::new(latitude, longitude).rounded();
        validate_coordinate(&origin)?;
        if !SEARCH_MILES_RANGE.contains(&max_miles) {
            return Err(Error::validation(
                "dist",
                format!(
                    "{max_miles} is outside [{}, {}] miles",
                    SEARCH_MILES_RANGE.start(),
                    SEARCH_MILES_RANGE.end()
                ),
            ));
        }

        let ranked = self.aggregate()?;
        Ok(filter_by_proximity(
            &ranked,
            origin.latitude,
            origin.longitude,
            max_miles,
        ))
    }

    /// Samples submitted by `owner_id`, newest first. Anonymous callers get none.
    pub fn list_samples_by_owner(&self, owner_id: &str) -> Result<Vec<SampleView>> {
        Ok(self
            .samples
            .find_by_owner(owner_id)?
            .iter()
            .map(Sample::to_view)
            .collect())
    }

    /// Changes the brightness of a sample the caller may mutate.
    pub fn update_sample(&self, id: SampleId, mpas: f64, caller_id: &str) -> Result<SampleView> {
        validate_mpas(mpas)?;
        let sample = self.require_sample(id)?;
        self.authorize(&sample, caller_id)?;

        let updated = self.samples.update(id, mpas)?;
        info!("sample {} updated to {} mpas", id, mpas);
        Ok(updated.to_view())
    }

    /// Deletes a sample the caller may mutate and scrubs every reference to it.
    ///
    /// Locations whose scrub failed are listed in
    /// [`DeletionReport::failed_location_ids`]; the sample is deleted regardless.
    pub fn delete_sample(&self, id: SampleId, caller_id: &str) -> Result<DeletionReport> {
        let sample = self.require_sample(id)?;
        self.authorize(&sample, caller_id)?;

        let scrub = self.locations.remove_reference_everywhere(id)?;
        self.samples.delete(id)?;
        info!(
            "sample {} deleted, {} locations updated, {} pending",
            id,
            scrub.affected.len(),
            scrub.failed.len()
        );

        Ok(DeletionReport {
            sample_id: id,
            affected_location_ids: scrub.affected,
            failed_location_ids: scrub.failed,
        })
    }

    fn require_sample(&self, id: SampleId) -> Result<Sample> {
        self.samples
            .find_by_id(id)?
            .ok_or_else(|| Error::not_found(EntityKind::Sample, id.0))
    }

    fn authorize(&self, sample: &Sample, caller_id: &str) -> Result<()> {
        authorize(sample, caller_id).inspect_err(|_| {
            warn!(
                "caller {:?} refused access to sample {}",
                caller_id, sample.id
            )
        })
    }
}

impl SkyDatabase {
    /// An empty engine over in-memory collections.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            MemoryCollection::new(config.location_scope()),
            MemoryCollection::new(config.sample_scope()),
        )
    }

    /// Loads `config.snapshot_path`, or starts empty when the file does not exist.
    pub fn open(config: &Config) -> Result<Self> {
        match std::fs::read(&config.snapshot_path) {
            Ok(bytes) => Self::from_bytes(&bytes, config),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "no snapshot at {}, starting empty",
                    config.snapshot_path.display()
                );
                Ok(Self::in_memory(config))
            }
            Err(err) => Err(StoreError::from(err).into()),
        }
    }

    /// Writes the current contents to `config.snapshot_path`.
    pub fn save(&self, config: &Config) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(&config.snapshot_path, bytes).map_err(StoreError::from)?;
        Ok(())
    }

    /// Captures both collections.
    pub fn snapshot(&self) -> DatabaseSnapshot {
        DatabaseSnapshot {
            locations: self.locations.collection().snapshot(),
            samples: self.samples.collection().snapshot(),
        }
    }

    /// Encodes both collections with `bincode`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(encode(&self.snapshot())?)
    }

    /// Rebuilds an engine from [`to_bytes`](Self::to_bytes) output.
    pub fn from_bytes(bytes: &[u8], config: &Config) -> Result<Self> {
        let snapshot: DatabaseSnapshot = decode(bytes)?;
        Ok(Self::new(
            MemoryCollection::restore(config.location_scope(), snapshot.locations)?,
            MemoryCollection::restore(config.sample_scope(), snapshot.samples)?,
        ))
    }
}

fn validate_coordinate(coordinate: &Coordinate) -> Result<()> {
    if !(-90.0..=90.0).contains(&coordinate.latitude) {
        return Err(Error::validation(
            "lat",
            format!("{} is outside [-90, 90]", coordinate.latitude),
        ));
    }
    if !coordinate.is_valid() {
        return Err(Error::validation(
            "lon",
            format!("{} is outside (-180, 180]", coordinate.longitude),
        ));
    }
    Ok(())
}
