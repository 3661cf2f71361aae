//! Upstream data clients: NASA NeoWs, Nominatim and USGS EPQS.

pub mod mock;
pub mod nasa;
pub mod nominatim;
pub mod usgs;

pub use mock::{MockElevationConnector, MockGeocodingConnector, MockNeoConnector};
pub use nasa::{NasaConfig, NasaNeoConnector, DEMO_API_KEY};
pub use nominatim::{NominatimConfig, NominatimConnector};
pub use usgs::{UsgsConfig, UsgsElevationConnector};
