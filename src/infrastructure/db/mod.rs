pub mod places;

pub use places::{PlaceStore, SqlitePlaceRepository};
