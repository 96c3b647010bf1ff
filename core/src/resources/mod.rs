//! Resource clients: one borrowed view per backend collection.
//!
//! Each operation is a fixed method and path delegating to `ApiClient`.
//! They differ only in what they send and how the success payload is decoded.

mod maintenance;
mod profile;
mod properties;
mod tenants;

pub use maintenance::Maintenance;
pub use profile::Profile;
pub use properties::Properties;
pub use tenants::Tenants;
