//! Who may change or remove a sample.

use crate::error::{Error, Result};
use crate::types::Sample;

/// Whether `caller_id` may update or delete `sample`.
///
/// Anonymous samples are open to everyone. Owned samples are open only to their
/// owner, and an empty caller never matches an owner.
///
/// ```
/// use chrono::Utc;
/// use skyglow::ownership::can_mutate;
/// use skyglow::{Sample, SampleId};
///
/// let sample = Sample {
///     id: SampleId(1),
///     mpas: 18.0,
///     owner_id: "alice".into(),
///     timestamp: Utc::now(),
/// };
/// assert!(can_mutate(&sample, "alice"));
/// assert!(!can_mutate(&sample, "bob"));
/// assert!(!can_mutate(&sample, ""));
/// ```
pub fn can_mutate(sample: &Sample, caller_id: &str) -> bool {
    sample.is_anonymous() || (!caller_id.is_empty() && caller_id == sample.owner_id)
}

/// Fails with [`Error::Authorization`] unless [`can_mutate`] allows the caller.
pub fn authorize(sample: &Sample, caller_id: &str) -> Result<()> {
    if can_mutate(sample, caller_id) {
        Ok(())
    } else {
        Err(Error::Authorization {
            sample: sample.id,
            caller: caller_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SampleId;
    use chrono::Utc;

    fn sample(owner: &str) -> Sample {
        Sample {
            id: SampleId(3),
            mpas: 17.0,
            owner_id: owner.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn anonymous_samples_are_open() {
        let open = sample("");
        assert!(can_mutate(&open, ""));
        assert!(can_mutate(&open, "anyone"));
        assert!(authorize(&open, "").is_ok());
    }

    #[test]
    fn owned_samples_are_closed_to_others() {
        let owned = sample("alice");
        assert!(authorize(&owned, "alice").is_ok());
        match authorize(&owned, "bob") {
            Err(Error::Authorization { sample, caller }) => {
                assert_eq!(sample, SampleId(3));
                assert_eq!(caller, "bob");
            }
            other => panic!("expected authorization error, got {other:?}"),
        }
        assert!(authorize(&owned, "").is_err());
    }
}
