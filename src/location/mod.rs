//! Location subsystem.
//!
//! Postal code validation, the OneMap provider, the optional local address
//! database, and the resolver that ties them together.

pub mod database;
pub mod providers;
pub mod resolver;
pub mod types;

pub use database::AddressDatabase;
pub use providers::{format_coords, AddressLookup, OneMapClient, ONEMAP_SEARCH_URL};
pub use resolver::LocationResolver;
pub use types::{AddressRecord, Coordinate, LocationError, LocationSource, PostalCode, ResolvedLocation};
