// src/browser/filter.rs

use serde::{Deserialize, Serialize};

use crate::models::property::{Property, PropertyCategory};

/// Intervalo fechado com limites opcionais.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy + PartialOrd + std::str::FromStr> NumericRange<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// Os campos do formulário chegam como texto; vazio ou inválido = sem limite.
    pub fn parse(min: &str, max: &str) -> Self {
        Self {
            min: min.trim().parse().ok(),
            max: max.trim().parse().ok(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Sem limites, tudo passa. Com limite, um valor ausente não passa.
    pub fn contains(&self, value: Option<T>) -> bool {
        if !self.is_set() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Critérios escolhidos pelo usuário. Um critério vazio não restringe nada;
/// um registro aparece se satisfizer todos os critérios preenchidos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyFilter {
    pub category: Option<PropertyCategory>,
    pub district: Option<String>,
    pub rooms: Option<String>,
    pub housing_class: Option<String>,
    pub repair_type: Option<String>,
    pub heating: Option<String>,
    pub land_type: Option<String>,
    pub house_subtype: Option<String>,
    pub location_type: Option<String>,
    pub year_built: Option<String>,
    pub wall_type: Option<String>,
    pub bathroom_type: Option<String>,

    pub price: NumericRange<i64>,
    pub total_area: NumericRange<f64>,
    pub kitchen_area: NumericRange<f64>,

    pub has_furniture: bool,
    pub has_repair: bool,
    #[serde(rename = "isEOselya")]
    pub is_eoselya: bool,

    pub tech: Vec<String>,
    pub comfort: Vec<String>,
    pub comm: Vec<String>,
    pub infra: Vec<String>,
}

fn exact(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match wanted.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => actual == Some(wanted),
    }
}

// Todas as tags escolhidas precisam estar no registro.
fn subset(wanted: &[String], actual: &[String]) -> bool {
    wanted.iter().all(|tag| actual.contains(tag))
}

fn flag(required: bool, actual: bool) -> bool {
    !required || actual
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, property: &Property) -> bool {
        let d = &property.details;

        self.category.is_none_or(|c| c == d.category)
            && exact(&self.district, Some(d.district.as_str()))
            && exact(&self.rooms, d.rooms.as_deref())
            && exact(&self.housing_class, d.housing_class.as_deref())
            && exact(&self.repair_type, d.repair_type.as_deref())
            && exact(&self.heating, d.heating.as_deref())
            && exact(&self.land_type, d.land_type.as_deref())
            && exact(&self.house_subtype, d.house_subtype.as_deref())
            && exact(&self.location_type, d.location_type.as_deref())
            && exact(&self.year_built, d.year_built.as_deref())
            && exact(&self.wall_type, d.wall_type.as_deref())
            && exact(&self.bathroom_type, d.bathroom_type.as_deref())
            && self.price.contains(Some(d.price))
            && self.total_area.contains(d.total_area)
            && self.kitchen_area.contains(d.kitchen_area)
            && flag(self.has_furniture, d.has_furniture)
            && flag(self.has_repair, d.has_repair)
            && flag(self.is_eoselya, d.is_eoselya)
            && subset(&self.tech, &d.tech)
            && subset(&self.comfort, &d.comfort)
            && subset(&self.comm, &d.comm)
            && subset(&self.infra, &d.infra)
    }

    /// Mantém a ordem original da lista.
    pub fn apply<'a>(&self, properties: &'a [Property]) -> Vec<&'a Property> {
        properties.iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::property::PropertyDetails;
    use serde_json::{json, Value};

    fn property(id: &str, fields: Value) -> Property {
        let mut base = json!({
            "category": "apartments",
            "price": 50000,
            "district": "Приморский",
            "address": "ул. Пушкинская 1",
            "ownerPhone": "+380",
            "totalArea": 50,
        });
        if let (Some(base), Some(fields)) = (base.as_object_mut(), fields.as_object()) {
            for (k, v) in fields {
                base.insert(k.clone(), v.clone());
            }
        }
        let details: PropertyDetails = serde_json::from_value(base).unwrap();
        let mut property = Property::new(details);
        property.id = id.to_string();
        property
    }

    fn sample() -> Vec<Property> {
        vec![
            property("a", json!({ "rooms": "1", "price": 30000, "totalArea": 32, "kitchenArea": 6 })),
            property(
                "b",
                json!({
                    "rooms": "2", "price": 55000, "totalArea": 54, "kitchenArea": 10,
                    "hasFurniture": true, "tech": ["Бойлер", "Кондиционер"], "heating": "Газ"
                }),
            ),
            property(
                "c",
                json!({
                    "district": "Киевский", "rooms": "3", "price": 90000, "totalArea": 80,
                    "hasFurniture": true, "hasRepair": true, "isEOselya": true, "tech": ["Бойлер"]
                }),
            ),
            property(
                "d",
                json!({ "category": "houses", "price": 150000, "totalArea": 120, "isEOselya": true }),
            ),
            property("e", json!({ "category": "land", "price": 9000, "totalArea": null, "landArea": 6 })),
        ]
    }

    fn ids(filter: &PropertyFilter, properties: &[Property]) -> Vec<String> {
        filter.apply(properties).into_iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn empty_filter_passes_everything() {
        let all = sample();
        let filter = PropertyFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter, &all), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn criteria_are_combined_with_and() {
        let all = sample();
        let filter = PropertyFilter {
            category: Some(PropertyCategory::Apartments),
            has_furniture: true,
            price: NumericRange::new(Some(50000), None),
            ..Default::default()
        };
        assert_eq!(ids(&filter, &all), vec!["b", "c"]);

        let filter = PropertyFilter {
            district: Some("Киевский".into()),
            is_eoselya: true,
            ..filter
        };
        assert_eq!(ids(&filter, &all), vec!["c"]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let all = sample();
        let filter = PropertyFilter {
            price: NumericRange::new(Some(30000), Some(55000)),
            ..Default::default()
        };
        assert_eq!(ids(&filter, &all), vec!["a", "b"]);
    }

    #[test]
    fn missing_value_fails_an_active_range() {
        let all = sample();
        let filter = PropertyFilter {
            total_area: NumericRange::new(Some(0.0), None),
            ..Default::default()
        };
        // "e" (terreno) não tem totalArea.
        assert_eq!(ids(&filter, &all), vec!["a", "b", "c", "d"]);

        let filter = PropertyFilter {
            kitchen_area: NumericRange::new(Some(8.0), None),
            ..Default::default()
        };
        assert_eq!(ids(&filter, &all), vec!["b"]);
    }

    #[test]
    fn tags_use_subset_semantics() {
        let all = sample();
        let one = PropertyFilter {
            tech: vec!["Бойлер".into()],
            ..Default::default()
        };
        assert_eq!(ids(&one, &all), vec!["b", "c"]);

        let both = PropertyFilter {
            tech: vec!["Кондиционер".into(), "Бойлер".into()],
            ..Default::default()
        };
        assert_eq!(ids(&both, &all), vec!["b"]);
    }

    #[test]
    fn blank_strings_count_as_unset() {
        let all = sample();
        let filter = PropertyFilter {
            district: Some("  ".into()),
            rooms: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&all).len(), all.len());
    }

    #[test]
    fn exact_match_on_optional_fields() {
        let all = sample();
        let filter = PropertyFilter {
            heating: Some("Газ".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter, &all), vec!["b"]);
    }

    #[test]
    fn relaxing_a_bound_never_shrinks_the_result() {
        let all = sample();
        let bounds = [None, Some(9000), Some(30000), Some(55000), Some(90000), Some(200000)];

        for min in bounds {
            for max in bounds {
                let strict = PropertyFilter {
                    price: NumericRange::new(min, max),
                    has_furniture: true,
                    ..Default::default()
                };
                let strict_ids = ids(&strict, &all);

                let no_min = PropertyFilter {
                    price: NumericRange::new(None, max),
                    ..strict.clone()
                };
                let no_max = PropertyFilter {
                    price: NumericRange::new(min, None),
                    ..strict.clone()
                };
                let no_flag = PropertyFilter {
                    has_furniture: false,
                    ..strict.clone()
                };

                for relaxed in [no_min, no_max, no_flag] {
                    let relaxed_ids = ids(&relaxed, &all);
                    assert!(
                        strict_ids.iter().all(|id| relaxed_ids.contains(id)),
                        "{strict:?} -> {relaxed:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn form_strings_parse_into_ranges() {
        let range: NumericRange<i64> = NumericRange::parse("10000", "");
        assert_eq!(range, NumericRange::new(Some(10000), None));

        let range: NumericRange<f64> = NumericRange::parse(" ", "abc");
        assert!(!range.is_set());
    }

    #[test]
    fn filter_state_deserializes_from_partial_json() {
        let filter: PropertyFilter = serde_json::from_value(json!({
            "category": "houses",
            "price": { "min": 100000 },
            "isEOselya": true
        }))
        .unwrap();

        assert_eq!(filter.category, Some(PropertyCategory::Houses));
        assert_eq!(filter.price.min, Some(100000));
        assert!(filter.is_eoselya);
        assert_eq!(ids(&filter, &sample()), vec!["d"]);
    }
}
