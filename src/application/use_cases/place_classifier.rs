use crate::domain::place::PlaceType;

/// Picks the place type from an explicit hint, else from keywords in the name.
pub fn classify_place(type_hint: &str, place_name: &str) -> PlaceType {
    if let Some(place_type) = PlaceType::from_hint(type_hint) {
        return place_type;
    }

    let name = place_name.to_lowercase();
    if name.contains("hvo") || name.contains("tankstelle") {
        PlaceType::HvoTankstelle
    } else if name.contains("stellplatz") {
        // also covers "wohnmobilstellplatz"
        PlaceType::Stellplatz
    } else if name.contains("camping") {
        PlaceType::Campingplatz
    } else {
        PlaceType::IMPORT_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_wins_over_name() {
        assert_eq!(
            classify_place(" stellplatz ", "HVO Tankstelle Nord"),
            PlaceType::Stellplatz
        );
    }

    #[test]
    fn test_unknown_hint_falls_back_to_name() {
        assert_eq!(classify_place("CAMPING", "Campingplatz Am See"), PlaceType::Campingplatz);
    }

    #[test]
    fn test_name_keywords_in_precedence_order() {
        assert_eq!(classify_place("", "Camping & HVO100"), PlaceType::HvoTankstelle);
        assert_eq!(classify_place("", "Aral Tankstelle"), PlaceType::HvoTankstelle);
        assert_eq!(classify_place("", "Wohnmobilstellplatz Camping"), PlaceType::Stellplatz);
        assert_eq!(classify_place("", "Knaus Campingpark"), PlaceType::Campingplatz);
        assert_eq!(classify_place("", "Burg Eltz"), PlaceType::Sehenswuerdigkeit);
    }
}
