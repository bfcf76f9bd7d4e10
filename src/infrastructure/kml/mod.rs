mod fetcher;
mod placemark;

pub use fetcher::{HttpKmlSource, KmlSource};
pub use placemark::{
    decode_xml_entities, extract_coordinate, parse_placemark, parse_placemarks, split_placemarks,
    KmlPlacemark,
};
