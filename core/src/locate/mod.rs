pub mod geocoder;
pub mod resolver;

pub use geocoder::{GeocodeHit, Geocoder, NominatimGeocoder};
pub use resolver::{parse_coordinate_text, resolve_coordinates, LocationResolver, ResolvedBy};
