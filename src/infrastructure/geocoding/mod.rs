mod maps_url;
mod plus_code;

pub use maps_url::{extract_lat_lng, HttpMapsUrlResolver, MapsUrlResolution, MapsUrlResolver};
pub use plus_code::{decode_plus_code, DecodedPlusCode};
