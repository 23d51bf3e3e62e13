//! Crowd-sourced sky brightness aggregation with proximity search.
//!
//! `skyglow` collects sky quality readings (magnitudes per square arcsecond, "mpas")
//! tied to geographic coordinates and answers the question "where is the darkest
//! sky near me?". It is the engine behind a light-pollution map: transport,
//! authentication and rendering live elsewhere and call in with parsed inputs.
//!
//! # Features
//!
//! - **Deduplicated Locations** - Coordinates are rounded to 2 decimals (~1 km) and
//!   at most one location exists per rounded pair
//! - **Incremental Averages** - Per-location means merge by sample count, never
//!   re-reading raw samples
//! - **Proximity Search** - Great-circle distance in miles, strict radius cutoff
//! - **Ownership** - Anonymous samples are open to everyone, owned samples only
//!   to their submitter
//! - **Pluggable Storage** - Any scoped key/value [`Collection`](store::Collection)
//!   works; an in-memory backend with `bincode` snapshots is included
//!
//! # Quick Start
//!
//! ```
//! use skyglow::{Config, SkyDatabase};
//!
//! # fn main() -> skyglow::Result<()> {
//! let db = SkyDatabase::in_memory(&Config::default());
//!
//! let spot = db.submit_location(40.00, -75.00)?;
//! db.submit_sample(spot.id, 18.5, "")?;
//! db.submit_sample(spot.id, 19.5, "")?;
//!
//! let nearby = db.query_locations_near(40.10, -75.10, 25.0)?;
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].sample_count, 2);
//! assert_eq!(nearby[0].average_mpas, 19.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Ownership
//!
//! ```
//! use skyglow::{Config, Error, SkyDatabase};
//!
//! # fn main() -> skyglow::Result<()> {
//! let db = SkyDatabase::in_memory(&Config::default());
//! let spot = db.submit_location(35.0, -110.0)?;
//! let sample = db.submit_sample(spot.id, 20.5, "alice")?;
//!
//! assert!(matches!(
//!     db.update_sample(sample.id, 21.0, "bob"),
//!     Err(Error::Authorization { .. })
//! ));
//! assert_eq!(db.update_sample(sample.id, 21.0, "alice")?.mpas, 21.0);
//!
//! let report = db.delete_sample(sample.id, "alice")?;
//! assert_eq!(report.affected_location_ids, vec![spot.id]);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Each collection call is atomic for one entity; nothing spans entities. Linking
//! a sample to a location or scrubbing a deleted sample from every location can
//! interleave with other requests, so aggregation drops references to samples that
//! no longer exist and reference removal is idempotent. Full scans read the whole
//! scope, which assumes a modest number of locations and samples.
//!
//! # Modules
//!
//! - [`geo`] - Great-circle distance and coordinate rounding
//! - [`types`] - Core data structures ([`Location`], [`Sample`], views)
//! - [`store`] - Collection trait, in-memory backend, snapshots
//! - [`locations`], [`samples`] - Stores over the two collections
//! - [`aggregate`] - Weighted averaging, ranking, proximity filter
//! - [`ownership`] - Mutation rights
//! - [`enrichment`] - Naked eye limiting magnitude
//! - [`config`] - Scopes, snapshot path, log filter
//! - [`error`] - Error taxonomy

#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
mod database;
pub mod enrichment;
pub mod error;
pub mod geo;
pub mod locations;
pub mod ownership;
pub mod samples;
pub mod store;
pub mod types;

pub use config::Config;
pub use database::{DatabaseSnapshot, SkyDatabase};
pub use error::{EntityKind, Error, Result, StoreError};
pub use locations::LocationStore;
pub use samples::SampleStore;
pub use types::{
    BrightnessSummary, Coordinate, DeletionReport, Location, LocationId, LocationView,
    NearbyLocation, Sample, SampleId, SampleView,
};
