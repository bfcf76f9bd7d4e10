pub mod config;
pub mod csv;
pub mod db;
pub mod geocoding;
pub mod http_client;
pub mod kml;
pub mod storage;
