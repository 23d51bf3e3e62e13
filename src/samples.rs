//! Sample store: sky brightness measurements and their owners.

use crate::error::{EntityKind, Error, Result};
use crate::store::Collection;
use crate::types::{Sample, SampleId, MPAS_RANGE};
use chrono::Utc;
use log::debug;

/// Checks that a brightness value lies within [`MPAS_RANGE`].
///
/// ```
/// use skyglow::samples::validate_mpas;
///
/// assert!(validate_mpas(12.0).is_ok());
/// assert!(validate_mpas(21.0).is_ok());
/// assert!(validate_mpas(11.99).is_err());
/// assert!(validate_mpas(21.01).is_err());
/// assert!(validate_mpas(f64::NAN).is_err());
/// ```
pub fn validate_mpas(mpas: f64) -> Result<()> {
    if MPAS_RANGE.contains(&mpas) {
        Ok(())
    } else {
        Err(Error::validation(
            "mpas",
            format!(
                "{mpas} is outside [{}, {}]",
                MPAS_RANGE.start(),
                MPAS_RANGE.end()
            ),
        ))
    }
}

/// Access to the [`Sample`] collection of one scope.
pub struct SampleStore<C> {
    collection: C,
}

impl<C: Collection<Sample>> SampleStore<C> {
    /// Wraps a collection.
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    /// The underlying collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Fetches a sample by identifier.
    pub fn find_by_id(&self, id: SampleId) -> Result<Option<Sample>> {
        Ok(self.collection.get(id.0)?)
    }

    /// Samples submitted by `owner_id`, newest first.
    ///
    /// Anonymous samples are never listed, so an empty `owner_id` yields nothing.
    pub fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Sample>> {
        if owner_id.is_empty() {
            return Ok(Vec::new());
        }

        let mut samples: Vec<Sample> = self
            .collection
            .all()?
            .into_iter()
            .filter(|sample| sample.owner_id == owner_id)
            .collect();
        samples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(samples)
    }

    /// Stores a new sample stamped with the current time.
    pub fn create(&self, mpas: f64, owner_id: &str) -> Result<Sample> {
        validate_mpas(mpas)?;

        let sample = Sample {
            id: SampleId(self.collection.next_id()?),
            mpas,
            owner_id: owner_id.to_string(),
            timestamp: Utc::now(),
        };
        self.collection.insert(sample.id.0, sample.clone())?;
        debug!("created sample {} ({} mpas)", sample.id, mpas);
        Ok(sample)
    }

    /// Replaces the brightness of an existing sample.
    pub fn update(&self, id: SampleId, mpas: f64) -> Result<Sample> {
        validate_mpas(mpas)?;

        self.collection
            .update(id.0, &mut |sample| sample.mpas = mpas)?
            .ok_or_else(|| Error::not_found(EntityKind::Sample, id.0))
    }

    /// Removes a sample. Returns `false` if it was already gone.
    pub fn delete(&self, id: SampleId) -> Result<bool> {
        Ok(self.collection.delete(id.0)?)
    }
}
