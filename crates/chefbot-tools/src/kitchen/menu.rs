use super::catalog::{Dish, KitchenCatalog, ALLERGENS, CATEGORIES, TAGS};
use crate::error::Result;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use chefbot_core::{Context, ToolDefinition, ToolParameter};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_LIMIT: f64 = 10.0;

const TAG_SYNONYMS: &[(&str, &str)] = &[
    ("vegetarian", "vegetarien"),
    ("végétarien", "vegetarien"),
    ("veggie", "vegetarien"),
    ("végan", "vegan"),
    ("gluten-free", "sans_gluten"),
    ("gluten free", "sans_gluten"),
    ("sans gluten", "sans_gluten"),
    ("gf", "sans_gluten"),
];

const ALLERGEN_SYNONYMS: &[(&str, &str)] = &[
    ("egg", "œuf"),
    ("eggs", "œuf"),
    ("oeuf", "œuf"),
    ("œufs", "œuf"),
    ("milk", "lait"),
    ("dairy", "lait"),
    ("lactose", "lait"),
    ("soy", "soja"),
    ("soya", "soja"),
    ("peanut", "arachide"),
    ("peanuts", "arachide"),
    ("cacahuète", "arachide"),
    ("wheat", "gluten"),
    ("blé", "gluten"),
    ("nuts", "fruits_a_coque"),
    ("tree nuts", "fruits_a_coque"),
    ("noix", "fruits_a_coque"),
    ("fruits à coque", "fruits_a_coque"),
    ("fruits a coque", "fruits_a_coque"),
];

/// Raw `menu_database` arguments as sent by the model.
#[derive(Clone, Debug, Deserialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub exclude_allergens: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub include_tags: Option<Vec<String>>,
    /// Absent means 10, an explicit null means no limit.
    #[serde(default = "default_limit", deserialize_with = "lenient_number")]
    pub limit: Option<f64>,
}

fn default_limit() -> Option<f64> {
    Some(DEFAULT_LIMIT)
}

impl Default for MenuQuery {
    fn default() -> Self {
        Self {
            category: None,
            max_price: None,
            exclude_allergens: None,
            include_tags: None,
            limit: default_limit(),
        }
    }
}

impl MenuQuery {
    /// `None` means no category filter, including for unknown categories.
    pub fn normalized_category(&self) -> Option<String> {
        let c = self.category.as_deref()?.trim().to_lowercase();
        if matches!(c.as_str(), "" | "all" | "*" | "toutes" | "tout") {
            return None;
        }
        let c = c.replace("entree", "entrée");
        CATEGORIES.contains(&c.as_str()).then_some(c)
    }

    pub fn normalized_tags(&self) -> Vec<String> {
        normalize(self.include_tags.as_deref(), TAG_SYNONYMS, TAGS, true)
    }

    pub fn normalized_allergens(&self) -> Vec<String> {
        normalize(self.exclude_allergens.as_deref(), ALLERGEN_SYNONYMS, ALLERGENS, false)
    }

    /// Matching dishes, cheapest first.
    pub fn search<'a>(&self, dishes: &'a [Dish]) -> Vec<&'a Dish> {
        let category = self.normalized_category();
        let allergens = self.normalized_allergens();
        let tags = self.normalized_tags();

        let mut results: Vec<&Dish> = dishes
            .iter()
            .filter(|d| {
                category
                    .as_deref()
                    .map_or(true, |c| d.category.to_lowercase() == c)
            })
            .filter(|d| self.max_price.map_or(true, |max| d.price <= max))
            .filter(|d| {
                !d.allergens
                    .iter()
                    .any(|a| allergens.contains(&a.to_lowercase()))
            })
            .filter(|d| {
                let dish_tags: Vec<String> = d.tags.iter().map(|t| t.to_lowercase()).collect();
                tags.iter().all(|t| dish_tags.contains(t))
            })
            .collect();

        results.sort_by(|a, b| a.price.total_cmp(&b.price));
        if let Some(limit) = self.limit {
            results.truncate(limit.max(0.0) as usize);
        }
        results
    }
}

fn normalize(
    values: Option<&[String]>,
    synonyms: &[(&str, &str)],
    valid: &[&str],
    underscore_spaces: bool,
) -> Vec<String> {
    let mut out = Vec::new();
    for value in values.unwrap_or_default() {
        let key = value.trim().to_lowercase();
        let mut mapped = synonyms
            .iter()
            .find(|(from, _)| *from == key)
            .map(|(_, to)| to.to_string())
            .unwrap_or(key);
        if underscore_spaces {
            mapped = mapped.replace(' ', "_");
        }
        if valid.contains(&mapped.as_str()) && !out.contains(&mapped) {
            out.push(mapped);
        }
    }
    out
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => s
            .trim()
            .trim_end_matches('€')
            .trim()
            .replace(',', ".")
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!("expected a number, got {}", other))),
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(vec![s]),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    })
}

fn show(value: &Option<impl serde::Serialize>) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

pub struct MenuDatabaseTool {
    def: ToolDefinition,
    catalog: Arc<KitchenCatalog>,
}

impl MenuDatabaseTool {
    pub fn new(catalog: Arc<KitchenCatalog>) -> Self {
        let strings = || ToolParameter::array(ToolParameter::string());
        let def = ToolDefinition::new(
            "menu_database",
            "Search the restaurant menu by criteria: category, max price, exclude allergens, \
             include tags. Returns matching dishes as JSON.",
        )
        .with_param(
            "category",
            ToolParameter::string()
                .with_description(
                    "Optional. One of: entrée, plat, dessert, boisson. Use 'all' to mean no filter.",
                )
                .nullable(),
        )
        .with_param(
            "max_price",
            ToolParameter::number()
                .with_description("Optional. Maximum price per dish.")
                .nullable(),
        )
        .with_param(
            "exclude_allergens",
            strings()
                .with_description("Optional. Allergens to exclude (e.g. gluten, lait, œuf, soja).")
                .nullable(),
        )
        .with_param(
            "include_tags",
            strings()
                .with_description("Optional. Tags required. Use: vegetarien, vegan, sans_gluten.")
                .nullable(),
        )
        .with_param(
            "limit",
            ToolParameter::number()
                .with_description("Optional. Max number of results.")
                .nullable(),
        );
        Self { def, catalog }
    }
}

#[async_trait]
impl Tool for MenuDatabaseTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, ctx: &Context, input: Value) -> Result<ToolOutput> {
        let query: MenuQuery = match input {
            Value::Null => MenuQuery::default(),
            other => serde_json::from_value(other)?,
        };
        let results = query.search(&self.catalog.menu);

        let line = format!(
            "[menu_database] category={}->{} max_price={} exclude_allergens={}->{:?} include_tags={}->{:?} results={}",
            show(&query.category),
            show(&query.normalized_category()),
            show(&query.max_price),
            show(&query.exclude_allergens),
            query.normalized_allergens(),
            show(&query.include_tags),
            query.normalized_tags(),
            results.len()
        );
        debug!("{}", line);
        ctx.tracer().trace(&line);

        Ok(ToolOutput::json(&json!({ "results": results }))?.with_metadata("results", results.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefbot_core::observe::{MemorySink, Tracer};

    fn query(value: Value) -> MenuQuery {
        serde_json::from_value(value).unwrap()
    }

    fn names(results: Vec<&Dish>) -> Vec<&str> {
        results.into_iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_category_normalization() {
        assert_eq!(query(json!({"category": " Entree "})).normalized_category().as_deref(), Some("entrée"));
        assert_eq!(query(json!({"category": "toutes"})).normalized_category(), None);
        assert_eq!(query(json!({"category": "starter"})).normalized_category(), None);
        assert_eq!(query(json!({})).normalized_category(), None);
    }

    #[test]
    fn test_synonyms() {
        let q = query(json!({
            "include_tags": ["Vegetarian", "gluten free", "spicy"],
            "exclude_allergens": ["Milk", "wheat", "nuts", "shellfish"]
        }));
        assert_eq!(q.normalized_tags(), ["vegetarien", "sans_gluten"]);
        assert_eq!(q.normalized_allergens(), ["lait", "gluten", "fruits_a_coque"]);
    }

    #[test]
    fn test_search_filters_and_sorts() {
        let catalog = KitchenCatalog::weeknight();

        let plats = query(json!({"category": "plat"})).search(&catalog.menu);
        assert_eq!(names(plats), ["Curry pois chiches", "Risotto champignons", "Saumon grillé"]);

        let no_milk = query(json!({"category": "plat", "exclude_allergens": ["lait"]})).search(&catalog.menu);
        assert_eq!(names(no_milk), ["Curry pois chiches", "Saumon grillé"]);

        let veg = query(json!({"include_tags": ["vegetarien"]})).search(&catalog.menu);
        assert_eq!(names(veg), ["Risotto champignons"]);

        let cheap = query(json!({"max_price": "8.5", "limit": 2})).search(&catalog.menu);
        assert_eq!(names(cheap), ["Thé vert", "Salade fruits"]);

        let all = query(json!({"limit": null})).search(&catalog.menu);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].name, "Thé vert");
    }

    #[test]
    fn test_default_limit() {
        let mut catalog = KitchenCatalog::weeknight();
        let extra = catalog.menu[0].clone();
        for _ in 0..10 {
            catalog.menu.push(extra.clone());
        }
        assert_eq!(MenuQuery::default().search(&catalog.menu).len(), 10);
        assert_eq!(query(json!({"limit": 0})).search(&catalog.menu).len(), 0);
    }

    #[tokio::test]
    async fn test_tool_writes_trace_line() {
        let sink = Arc::new(MemorySink::new());
        let ctx = Context::new().with_tracer(Tracer::new().with_sink(sink.clone()));
        let tool = MenuDatabaseTool::new(Arc::new(KitchenCatalog::weeknight()));

        let output = tool
            .execute(
                &ctx,
                json!({"category": "dessert", "include_tags": "vegan", "max_price": null}),
            )
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(value["results"][0]["name"], "Salade fruits");
        assert_eq!(value["results"][0]["prep_minutes"], 8);

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[menu_database] category=\"dessert\"->\"dessert\""));
        assert!(lines[0].ends_with("results=1"));
    }
}
