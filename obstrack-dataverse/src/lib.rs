//! Dataverse Web API adapter: JSON mapping for the `cr650_*` observation
//! tables, a blocking HTTP store client, and the Power Automate file relay.

pub mod client;
pub mod relay;
pub mod wire;

pub use client::{ListQuery, ObservationStore, SortDirection, StoreError, TokenSource};
pub use relay::{upload_files, validate_file, FileUpload, RelayError};
