use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Travel place catalogue: CSV import with geocoding and HVO station export
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Import places from a CSV file (upsert by name)
    Import {
        /// CSV with columns placeName, placeTypeHint, lat, lng, plusCode, googleMapsUrl
        file: PathBuf,
    },

    /// Export HVO100/XTL stations from the My Maps KML as an import CSV
    ExportFuelStations {
        /// Also keep stations that only advertise HVO blends
        #[arg(long)]
        include_blends: bool,

        /// Output file (default: dated file in the configured output directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve,
}
