//! Simulated kitchen data shared by the kitchen tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CATEGORIES: &[&str] = &["entrée", "plat", "dessert", "boisson"];
pub const TAGS: &[&str] = &["vegetarien", "vegan", "sans_gluten"];
pub const ALLERGENS: &[&str] = &["gluten", "lait", "œuf", "soja", "arachide", "fruits_a_coque"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub time_minutes: Option<u32>,
}

impl Recipe {
    /// Placeholder returned for dishes outside the catalog.
    pub fn unavailable(dish_name: &str) -> Self {
        Self {
            title: dish_name.trim().to_string(),
            ingredients: vec![],
            steps: vec!["Recette non disponible (simulé).".to_string()],
            time_minutes: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DietaryInfo {
    pub allergens: Vec<String>,
    pub vegan: Option<bool>,
    pub notes: String,
}

impl DietaryInfo {
    pub fn unknown() -> Self {
        Self {
            allergens: vec![],
            vegan: None,
            notes: "Info non disponible (simulé).".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    pub price: f64,
    pub prep_minutes: u32,
    pub allergens: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KitchenCatalog {
    pub fridge: Vec<String>,
    /// Keyed by lowercase dish name.
    pub recipes: BTreeMap<String, Recipe>,
    /// Keyed by lowercase ingredient name.
    pub dietary: BTreeMap<String, DietaryInfo>,
    pub menu: Vec<Dish>,
}

impl KitchenCatalog {
    /// The everyday kitchen: full fridge and the six-dish restaurant menu.
    pub fn weeknight() -> Self {
        Self {
            fridge: strings(&[
                "tomates",
                "oignons",
                "ail",
                "riz",
                "lentilles",
                "pois chiches",
                "tofu",
                "œufs",
                "yaourt",
                "citron",
                "huile d'olive",
                "basilic",
                "origan",
                "poivrons",
                "épinards",
            ]),
            recipes: [
                recipe(
                    "shakshuka",
                    "Shakshuka express",
                    &["tomates", "oignons", "ail", "poivrons", "œufs", "huile d'olive", "épices"],
                    &[
                        "Faire revenir oignons + poivrons dans l'huile d'olive.",
                        "Ajouter ail + tomates, mijoter 10 min.",
                        "Former 2-3 puits, casser les œufs, couvrir 5-7 min.",
                        "Servir avec herbes fraîches.",
                    ],
                    25,
                ),
                recipe(
                    "bol de lentilles citronnées",
                    "Bol de lentilles citronnées",
                    &["lentilles", "oignons", "ail", "citron", "huile d'olive", "épinards", "épices"],
                    &[
                        "Cuire les lentilles (ou utiliser des lentilles déjà cuites).",
                        "Sauter oignons + ail, ajouter lentilles + épices.",
                        "Ajouter épinards, finir avec jus + zeste de citron.",
                    ],
                    20,
                ),
                recipe(
                    "curry de pois chiches",
                    "Curry de pois chiches facile",
                    &["pois chiches", "tomates", "oignons", "ail", "épinards", "épices", "huile d'olive"],
                    &[
                        "Faire revenir oignons + ail + épices.",
                        "Ajouter tomates + pois chiches, mijoter 12 min.",
                        "Ajouter épinards 2 min, ajuster l'assaisonnement.",
                    ],
                    20,
                ),
            ]
            .into_iter()
            .collect(),
            dietary: [
                dietary("arachide", &["arachide"], true, "Allergène majeur."),
                dietary("cacahuète", &["arachide"], true, "Allergène majeur."),
                dietary("œufs", &["œuf"], false, "Produit animal."),
                dietary("lait", &["lait"], false, "Lactose possible."),
                dietary("yaourt", &["lait"], false, "Produit laitier."),
                dietary("tofu", &["soja"], true, "Source de protéines végétales."),
                dietary("lentilles", &[], true, "Riche en fibres et protéines."),
                dietary("pois chiches", &[], true, "Bon pour budget + satiété."),
                dietary("riz", &[], true, "Naturellement sans gluten."),
            ]
            .into_iter()
            .collect(),
            menu: vec![
                dish("Salade quinoa", 8.5, 12, &[], "entrée", &["vegan", "sans_gluten"]),
                dish("Curry pois chiches", 16.0, 20, &[], "plat", &["vegan", "sans_gluten"]),
                dish("Risotto champignons", 18.0, 25, &["lait"], "plat", &["vegetarien"]),
                dish("Saumon grillé", 21.0, 22, &[], "plat", &["sans_gluten"]),
                dish("Salade fruits", 6.5, 8, &[], "dessert", &["vegan", "sans_gluten"]),
                dish("Thé vert", 3.0, 3, &[], "boisson", &["vegan", "sans_gluten"]),
            ],
        }
    }

    /// Reduced, allergen-safe data for the eight-guest dinner party.
    pub fn dinner_party() -> Self {
        Self {
            fridge: strings(&[
                "tomates",
                "oignons",
                "ail",
                "citron",
                "huile d'olive",
                "basilic",
                "poivrons",
                "épinards",
                "lentilles",
                "pois chiches",
                "riz",
                "yaourt",
                "fruits (pommes, poires, oranges)",
            ]),
            recipes: [
                recipe(
                    "houmous",
                    "Houmous citronné",
                    &["pois chiches", "citron", "huile d'olive", "ail", "cumin", "sel"],
                    &[
                        "Mixer tous les ingrédients.",
                        "Ajuster sel/citron.",
                        "Servir avec légumes crus.",
                    ],
                    10,
                ),
                recipe(
                    "curry de pois chiches",
                    "Curry de pois chiches & épinards",
                    &["pois chiches", "tomates", "oignons", "ail", "épinards", "épices", "huile d'olive"],
                    &[
                        "Faire revenir oignons + ail + épices.",
                        "Ajouter tomates + pois chiches, mijoter 12 min.",
                        "Ajouter épinards 2 min. Servir.",
                    ],
                    20,
                ),
                recipe(
                    "salade de fruits",
                    "Salade de fruits frais",
                    &["fruits", "citron"],
                    &["Couper les fruits.", "Ajouter un trait de citron.", "Servir frais."],
                    10,
                ),
            ]
            .into_iter()
            .collect(),
            dietary: [
                dietary("arachide", &["arachide", "fruits_a_coque"], true, "Allergène majeur."),
                dietary("noix", &["fruits_a_coque"], true, "Allergène majeur."),
                dietary("amande", &["fruits_a_coque"], true, "Allergène majeur."),
                dietary("noisette", &["fruits_a_coque"], true, "Allergène majeur."),
                dietary("blé", &["gluten"], true, "Contient gluten."),
                dietary("gluten", &["gluten"], true, "Allergène."),
                dietary("riz", &[], true, "Naturellement sans gluten."),
                dietary("pois chiches", &[], true, "Protéines végétales."),
                dietary("lentilles", &[], true, "Protéines + fibres."),
                dietary("yaourt", &["lait"], false, "Produit laitier."),
            ]
            .into_iter()
            .collect(),
            menu: vec![
                dish("Houmous & légumes", 5.5, 10, &[], "entrée", &["vegan", "sans_gluten"]),
                dish("Curry pois chiches", 16.0, 20, &[], "plat", &["vegan", "sans_gluten"]),
                dish("Salade fruits", 6.5, 8, &[], "dessert", &["vegan", "sans_gluten"]),
                dish("Eau petillante", 2.5, 1, &[], "boisson", &["vegan", "sans_gluten"]),
            ],
        }
    }

    pub fn recipe(&self, dish_name: &str) -> Option<&Recipe> {
        self.recipes.get(&dish_name.trim().to_lowercase())
    }

    pub fn dietary_info(&self, ingredient: &str) -> Option<&DietaryInfo> {
        self.dietary.get(&ingredient.trim().to_lowercase())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn recipe(
    key: &str,
    title: &str,
    ingredients: &[&str],
    steps: &[&str],
    minutes: u32,
) -> (String, Recipe) {
    (
        key.to_string(),
        Recipe {
            title: title.to_string(),
            ingredients: strings(ingredients),
            steps: strings(steps),
            time_minutes: Some(minutes),
        },
    )
}

fn dietary(key: &str, allergens: &[&str], vegan: bool, notes: &str) -> (String, DietaryInfo) {
    (
        key.to_string(),
        DietaryInfo {
            allergens: strings(allergens),
            vegan: Some(vegan),
            notes: notes.to_string(),
        },
    )
}

fn dish(
    name: &str,
    price: f64,
    prep_minutes: u32,
    allergens: &[&str],
    category: &str,
    tags: &[&str],
) -> Dish {
    Dish {
        name: name.to_string(),
        price,
        prep_minutes,
        allergens: strings(allergens),
        category: category.to_string(),
        tags: strings(tags),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weeknight_catalog() {
        let catalog = KitchenCatalog::weeknight();
        assert_eq!(catalog.fridge.len(), 15);
        assert_eq!(catalog.menu.len(), 6);
        assert_eq!(catalog.recipe("  Shakshuka ").unwrap().time_minutes, Some(25));
        assert_eq!(catalog.dietary_info("TOFU").unwrap().allergens, ["soja"]);
    }

    #[test]
    fn test_dinner_party_menu_is_safe() {
        let catalog = KitchenCatalog::dinner_party();
        assert_eq!(catalog.menu.len(), 4);
        assert!(catalog.menu.iter().all(|d| d.allergens.is_empty()
            && d.tags.contains(&"vegan".to_string())
            && d.tags.contains(&"sans_gluten".to_string())));
        assert!(catalog.recipe("houmous").is_some());
        assert!(catalog.recipe("shakshuka").is_none());
    }

    #[test]
    fn test_menu_uses_known_vocabulary() {
        for catalog in [KitchenCatalog::weeknight(), KitchenCatalog::dinner_party()] {
            for dish in &catalog.menu {
                assert!(CATEGORIES.contains(&dish.category.as_str()));
                assert!(dish.tags.iter().all(|t| TAGS.contains(&t.as_str())));
                assert!(dish.allergens.iter().all(|a| ALLERGENS.contains(&a.as_str())));
            }
        }
    }
}
