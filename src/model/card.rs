//! Data models for catalog cards, sets, and result pages

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Matches the start of each camelCase word after the first
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// A card ability (Poké-Power, Ability, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A card attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub name: String,
    #[serde(default)]
    pub cost: Vec<String>,
    #[serde(default)]
    pub converted_energy_cost: u32,
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub text: String,
}

/// A weakness or resistance entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Image URLs for a set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetImages {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub logo: String,
}

/// Set metadata, embedded in every card and listed by `/sets`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub printed_total: u32,
    #[serde(default)]
    pub total: u32,
    /// Release date as published by the catalog (`YYYY/MM/DD`)
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub images: SetImages,
}

/// Card image URLs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub large: String,
}

/// Price statistics for one printing variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub mid: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub market: Option<f64>,
}

/// TCGplayer price snapshot attached to a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcgPlayer {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub updated_at: String,
    /// Keyed by printing variant (`normal`, `holofoil`, `reverseHolofoil`, ...)
    #[serde(default)]
    pub prices: BTreeMap<String, PriceRange>,
}

/// A trading card as returned by the catalog
///
/// Favorites and collection entries store this record verbatim, so it must
/// round-trip through `card_data` columns without losing fields the UI reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub supertype: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolves_from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<Ability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attacks: Vec<Attack>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<TypeModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resistances: Vec<TypeModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retreat_cost: Vec<String>,
    pub set: CardSet,
    #[serde(default)]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_text: Option<String>,
    #[serde(default)]
    pub images: CardImages,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcgplayer: Option<TcgPlayer>,
}

impl Card {
    /// `number/printedTotal`, as printed on the card
    pub fn collector_number(&self) -> String {
        format!("{}/{}", self.number, self.set.printed_total)
    }

    /// Price variants with humanized labels, in catalog key order
    pub fn price_breakdown(&self) -> Vec<(String, &PriceRange)> {
        self.tcgplayer
            .as_ref()
            .map(|tcg| {
                tcg.prices
                    .iter()
                    .map(|(key, range)| (price_label(key), range))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Turn a camelCase price key into a title-cased label
///
/// `reverseHolofoil` becomes `Reverse Holofoil`, `1stEditionHolofoil`
/// becomes `1st Edition Holofoil`.
pub fn price_label(key: &str) -> String {
    CAMEL_BOUNDARY
        .replace_all(key, "$1 $2")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPage {
    pub data: Vec<Card>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
}

/// Envelope used by every non-search catalog endpoint
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[cfg(test)]
pub(crate) fn sample_card(id: &str, name: &str) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        supertype: "Pokémon".to_string(),
        subtypes: vec!["Basic".to_string()],
        hp: Some("60".to_string()),
        types: vec!["Lightning".to_string()],
        evolves_from: None,
        abilities: Vec::new(),
        attacks: Vec::new(),
        weaknesses: Vec::new(),
        resistances: Vec::new(),
        retreat_cost: Vec::new(),
        set: CardSet {
            id: "base1".to_string(),
            name: "Base".to_string(),
            series: "Base".to_string(),
            printed_total: 102,
            total: 102,
            release_date: "1999/01/09".to_string(),
            images: SetImages::default(),
        },
        number: "58".to_string(),
        artist: None,
        rarity: Some("Common".to_string()),
        flavor_text: None,
        images: CardImages::default(),
        tcgplayer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU_JSON: &str = r#"{
        "id": "base1-58",
        "name": "Pikachu",
        "supertype": "Pokémon",
        "subtypes": ["Basic"],
        "hp": "40",
        "types": ["Lightning"],
        "attacks": [
            {
                "name": "Gnaw",
                "cost": ["Colorless"],
                "convertedEnergyCost": 1,
                "damage": "10",
                "text": ""
            }
        ],
        "weaknesses": [{ "type": "Fighting", "value": "×2" }],
        "retreatCost": ["Colorless"],
        "set": {
            "id": "base1",
            "name": "Base",
            "series": "Base",
            "printedTotal": 102,
            "total": 102,
            "releaseDate": "1999/01/09",
            "images": { "symbol": "s.png", "logo": "l.png" }
        },
        "number": "58",
        "artist": "Mitsuhiro Arita",
        "rarity": "Common",
        "images": { "small": "small.png", "large": "large.png" },
        "tcgplayer": {
            "url": "https://prices.example/base1-58",
            "updatedAt": "2024/01/01",
            "prices": {
                "normal": { "low": 1.0, "mid": 2.5, "high": 10.0, "market": 2.0 },
                "1stEditionHolofoil": { "market": 250.0 }
            }
        }
    }"#;

    #[test]
    fn test_card_deserializes_catalog_payload() {
        let card: Card = serde_json::from_str(PIKACHU_JSON).unwrap();

        assert_eq!(card.id, "base1-58");
        assert_eq!(card.hp.as_deref(), Some("40"));
        assert_eq!(card.attacks[0].converted_energy_cost, 1);
        assert_eq!(card.weaknesses[0].kind, "Fighting");
        assert_eq!(card.collector_number(), "58/102");
        assert_eq!(card.set.release_date, "1999/01/09");
    }

    #[test]
    fn test_card_survives_denormalized_copy() {
        let card: Card = serde_json::from_str(PIKACHU_JSON).unwrap();
        let stored = serde_json::to_value(&card).unwrap();

        assert_eq!(stored["retreatCost"][0], "Colorless");
        assert!(stored.get("abilities").is_none());

        let restored: Card = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, card);
    }

    #[test]
    fn test_price_labels() {
        assert_eq!(price_label("normal"), "Normal");
        assert_eq!(price_label("reverseHolofoil"), "Reverse Holofoil");
        assert_eq!(price_label("1stEditionHolofoil"), "1st Edition Holofoil");
    }

    #[test]
    fn test_price_breakdown_uses_labels() {
        let card: Card = serde_json::from_str(PIKACHU_JSON).unwrap();
        let labels: Vec<String> = card
            .price_breakdown()
            .into_iter()
            .map(|(label, _)| label)
            .collect();

        assert_eq!(labels, vec!["1st Edition Holofoil", "Normal"]);
    }

    #[test]
    fn test_card_page_defaults_missing_counts() {
        let page: CardPage = serde_json::from_str(r#"{ "data": [] }"#).unwrap();
        assert_eq!(page.total_count, 0);
        assert!(page.data.is_empty());
    }
}
