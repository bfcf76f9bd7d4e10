// ============================================================
// TÖRTCHENSYSTEM RATING
// ============================================================
// Seven criteria, three values each, summed into a point total

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of a single rating criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TsValue {
    Stimmig,
    #[default]
    Okay,
    PasstNicht,
}

impl TsValue {
    /// Points contributed to the total
    pub fn points(&self) -> i64 {
        match self {
            TsValue::Stimmig => 2,
            TsValue::Okay => 1,
            TsValue::PasstNicht => 0,
        }
    }

    /// Lenient conversion from an arbitrary JSON value, falling back to `OKAY`
    pub fn from_json(value: Option<&Value>) -> TsValue {
        let Some(s) = value.and_then(Value::as_str) else {
            return TsValue::default();
        };

        match s.trim().to_uppercase().as_str() {
            "STIMMIG" => TsValue::Stimmig,
            "OKAY" => TsValue::Okay,
            "PASST_NICHT" | "PASSTNICHT" => TsValue::PasstNicht,
            _ => TsValue::default(),
        }
    }
}

/// Full rating of a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDetail {
    pub ts_umgebung: TsValue,
    pub ts_platz_struktur: TsValue,
    pub ts_sanitaer: TsValue,
    pub ts_buchung: TsValue,
    pub ts_hilde: TsValue,
    pub ts_preis_leistung: TsValue,
    pub ts_nachklang: TsValue,

    pub total_points: i64,

    pub note: String,

    pub c_umgebung: String,
    pub c_platz_struktur: String,
    pub c_sanitaer: String,
    pub c_buchung: String,
    pub c_hilde: String,
    pub c_preis_leistung: String,
    pub c_nachklang: String,
}

impl Default for RatingDetail {
    fn default() -> Self {
        Self::blank()
    }
}

impl RatingDetail {
    /// All criteria `OKAY`, total 7, no comments
    pub fn blank() -> Self {
        Self {
            ts_umgebung: TsValue::Okay,
            ts_platz_struktur: TsValue::Okay,
            ts_sanitaer: TsValue::Okay,
            ts_buchung: TsValue::Okay,
            ts_hilde: TsValue::Okay,
            ts_preis_leistung: TsValue::Okay,
            ts_nachklang: TsValue::Okay,
            total_points: 7,
            note: String::new(),
            c_umgebung: String::new(),
            c_platz_struktur: String::new(),
            c_sanitaer: String::new(),
            c_buchung: String::new(),
            c_hilde: String::new(),
            c_preis_leistung: String::new(),
            c_nachklang: String::new(),
        }
    }

    pub fn criteria(&self) -> [TsValue; 7] {
        [
            self.ts_umgebung,
            self.ts_platz_struktur,
            self.ts_sanitaer,
            self.ts_buchung,
            self.ts_hilde,
            self.ts_preis_leistung,
            self.ts_nachklang,
        ]
    }

    /// Sum of the criterion points, ignoring the stored `total_points`
    pub fn calc_total_points(&self) -> i64 {
        self.criteria().iter().map(TsValue::points).sum()
    }
}

/// Unwraps the nested-write shapes editors send (`upsert.update`, `create`, ...)
fn unwrap_rating_payload(input: &Value) -> Option<&Value> {
    if input.is_null() {
        return None;
    }

    for path in [
        &["upsert", "update"][..],
        &["upsert", "create"][..],
        &["update"][..],
        &["create"][..],
    ] {
        let mut cur = input;
        let mut found = true;
        for key in path {
            match cur.get(key) {
                Some(next) if !next.is_null() => cur = next,
                _ => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            return Some(cur);
        }
    }

    Some(input)
}

fn as_comment(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Normalizes an arbitrary rating payload into a complete [`RatingDetail`].
///
/// Unknown criterion values become `OKAY`. A finite numeric `totalPoints` is kept as sent,
/// anything else is recomputed from the criteria.
pub fn normalize_rating_detail(input: &Value) -> RatingDetail {
    let empty = Value::Object(Default::default());
    let src = unwrap_rating_payload(input).unwrap_or(&empty);

    let mut out = RatingDetail {
        ts_umgebung: TsValue::from_json(src.get("tsUmgebung")),
        ts_platz_struktur: TsValue::from_json(src.get("tsPlatzStruktur")),
        ts_sanitaer: TsValue::from_json(src.get("tsSanitaer")),
        ts_buchung: TsValue::from_json(src.get("tsBuchung")),
        ts_hilde: TsValue::from_json(src.get("tsHilde")),
        ts_preis_leistung: TsValue::from_json(src.get("tsPreisLeistung")),
        ts_nachklang: TsValue::from_json(src.get("tsNachklang")),
        total_points: 0,
        note: as_comment(src.get("note")),
        c_umgebung: as_comment(src.get("cUmgebung")),
        c_platz_struktur: as_comment(src.get("cPlatzStruktur")),
        c_sanitaer: as_comment(src.get("cSanitaer")),
        c_buchung: as_comment(src.get("cBuchung")),
        c_hilde: as_comment(src.get("cHilde")),
        c_preis_leistung: as_comment(src.get("cPreisLeistung")),
        c_nachklang: as_comment(src.get("cNachklang")),
    };

    out.total_points = match src.get("totalPoints").and_then(Value::as_f64) {
        Some(total) if total.is_finite() => total.round() as i64,
        _ => out.calc_total_points(),
    };

    out
}
