//! Minimal Open Location Code (Plus Code) decoder.
//!
//! Only full codes are decoded. A short code such as `8MPR+HH Fachbach` has its locality
//! stripped but the missing area prefix is not reconstructed, so it yields `None`.

use serde::{Deserialize, Serialize};

const SEPARATOR: char = '+';
const SEPARATOR_POSITION: usize = 8;
const PADDING_CHAR: char = '0';
const CODE_ALPHABET: &str = "23456789CFGHJMPQRVWX";
const LAT_MAX: f64 = 90.0;
const LNG_MAX: f64 = 180.0;

/// Significant characters decoded (five lat/lng pairs).
const PAIR_CODE_LENGTH: usize = 10;

/// Cell size in degrees for each pair position.
const PAIR_RESOLUTIONS: [f64; 5] = [20.0, 1.0, 0.05, 0.0025, 0.000125];

/// Center of a decoded cell. Note `lon`, not `lng`: callers map the name at their boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPlusCode {
    pub lat: f64,
    pub lon: f64,
    pub code: String,
}

pub fn decode_plus_code(input: &str) -> Option<DecodedPlusCode> {
    let token = input.split_whitespace().next()?;

    if !token.contains(SEPARATOR) {
        return None;
    }

    let upper = token.to_uppercase();
    let plain_len = upper.chars().count() - 1;
    if plain_len < PAIR_CODE_LENGTH {
        return None;
    }

    decode_full_code(&upper)
}

fn decode_full_code(code: &str) -> Option<DecodedPlusCode> {
    let sep_idx = code.chars().position(|c| c == SEPARATOR)?;
    if sep_idx != SEPARATOR_POSITION {
        return None;
    }

    let significant: Vec<char> = code
        .replacen(SEPARATOR, "", 1)
        .chars()
        .filter(|&c| c != PADDING_CHAR)
        .take(PAIR_CODE_LENGTH)
        .collect();

    if significant.len() < PAIR_CODE_LENGTH {
        return None;
    }

    let mut lat = -LAT_MAX;
    let mut lon = -LNG_MAX;

    for (pair, resolution) in significant.chunks(2).zip(PAIR_RESOLUTIONS) {
        let lat_val = digit_value(pair[0])?;
        let lon_val = digit_value(pair[1])?;

        lat += lat_val as f64 * resolution;
        lon += lon_val as f64 * resolution;
    }

    let cell_size = PAIR_RESOLUTIONS[PAIR_RESOLUTIONS.len() - 1];

    Some(DecodedPlusCode {
        lat: (lat + cell_size / 2.0).clamp(-LAT_MAX, LAT_MAX),
        lon: (lon + cell_size / 2.0).clamp(-LNG_MAX, LNG_MAX),
        code: code.to_string(),
    })
}

fn digit_value(c: char) -> Option<usize> {
    CODE_ALPHABET.find(c)
}
