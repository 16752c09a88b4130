//! The `chefbot-menu-eval` dataset and its file store.

use crate::error::{KitchenError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

pub const DATASET_NAME: &str = "chefbot-menu-eval";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInput {
    pub constraints: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Expected criteria. `must_avoid` and `must_include` drive the rule
/// scores; other criteria are passed to the judge as they are.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Expected {
    #[serde(default)]
    pub must_avoid: Vec<String>,
    #[serde(default)]
    pub must_include: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetItem {
    pub id: String,
    pub input: ItemInput,
    pub expected_output: Expected,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl DatasetItem {
    fn case(constraints: &str, expected: Value, category: &str) -> Result<Self> {
        Ok(Self {
            id: category.to_string(),
            input: ItemInput {
                constraints: constraints.to_string(),
                extra: Map::new(),
            },
            expected_output: serde_json::from_value(expected)?,
            metadata: Map::from_iter([("category".to_string(), json!(category))]),
        })
    }

    pub fn category(&self) -> Option<&str> {
        self.metadata.get("category").and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<DatasetItem>,
}

impl Dataset {
    pub fn chefbot_menu_eval() -> Result<Self> {
        Ok(Self {
            name: DATASET_NAME.to_string(),
            description: "Evaluation dataset for ChefBot menu planning (constraints-based)"
                .to_string(),
            metadata: Map::from_iter([
                ("created_by".to_string(), json!("chefbot_eval")),
                ("domain".to_string(), json!("meal_planning")),
                ("version".to_string(), json!("1.0")),
            ]),
            items: builtin_cases()?,
        })
    }

    /// Appends the items whose id is not present yet. Returns how many were added.
    pub fn merge_items(&mut self, items: Vec<DatasetItem>) -> usize {
        let mut added = 0;
        for item in items {
            if !self.items.iter().any(|existing| existing.id == item.id) {
                self.items.push(item);
                added += 1;
            }
        }
        added
    }
}

pub fn builtin_cases() -> Result<Vec<DatasetItem>> {
    Ok(vec![
        DatasetItem::case(
            "Repas pour diabétique, dîner léger. Éviter sucre, soda, pâtes blanches. \
             Inclure légumes verts et protéines maigres. Max 600 kcal/repas.",
            json!({
                "must_avoid": ["sucre", "soda", "pâtes blanches"],
                "must_include": ["légumes verts", "protéines maigres"],
                "max_calories_per_meal": 600
            }),
            "health_diabetic_light",
        )?,
        DatasetItem::case(
            "Allergie sévère aux arachides + régime vegan. Budget 5€ par personne. \
             Inclure légumineuses. Éviter arachide, beurre de cacahuète, miel, œuf, lait.",
            json!({
                "must_avoid": ["arachide", "cacahuète", "beurre de cacahuète", "miel", "œuf", "lait"],
                "must_include": ["légumineuses"],
                "budget_per_person_eur_max": 5
            }),
            "allergy_peanut_vegan_budget",
        )?,
        DatasetItem::case(
            "Menu pour 6 convives style méditerranéen. Inclure huile d'olive, tomates, \
             herbes (basilic/origan). Éviter porc. Option sans gluten si possible \
             (éviter blé, farine de blé).",
            json!({
                "must_avoid": ["porc", "blé", "farine de blé"],
                "must_include": ["huile d'olive", "tomates", "basilic", "origan"],
                "servings": 6
            }),
            "cultural_mediterranean_group",
        )?,
        DatasetItem::case(
            "Régime pauvre en sel (hypertension). Éviter sel, sauce soja, charcuterie. \
             Inclure épices/aromates (citron, ail) et légumes. Recette simple en 20 minutes.",
            json!({
                "must_avoid": ["sel", "sauce soja", "charcuterie"],
                "must_include": ["citron", "ail", "légumes"],
                "max_minutes": 20
            }),
            "low_sodium_quick",
        )?,
        DatasetItem::case(
            "Préférences: cuisine japonaise maison. Inclure riz, gingembre. Éviter poisson \
             cru (grossesse). Idée bento. Éviter alcool (mirin/saké).",
            json!({
                "must_avoid": ["poisson cru", "mirin", "saké", "alcool"],
                "must_include": ["riz", "gingembre"],
                "style": "japonais"
            }),
            "cultural_japanese_pregnancy",
        )?,
    ])
}

/// Datasets and experiment runs as pretty JSON files in one directory.
#[derive(Clone, Debug)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dataset_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn runs_dir(&self, dataset: &str) -> PathBuf {
        self.dir.join(format!("{}-runs", dataset))
    }

    /// Creates the dataset file, or reuses the existing one and adds only
    /// the built-in items it is missing.
    pub async fn create_chefbot_dataset(&self) -> Result<Dataset> {
        let fresh = Dataset::chefbot_menu_eval()?;
        let path = self.dataset_path(&fresh.name);

        let dataset = if fs::try_exists(&path).await? {
            let mut existing = self.load(&fresh.name).await?;
            let added = existing.merge_items(fresh.items);
            info!(dataset = %existing.name, added, "Dataset already exists, reusing it");
            existing
        } else {
            info!(dataset = %fresh.name, items = fresh.items.len(), "Dataset created");
            fresh
        };

        self.save(&dataset).await?;
        Ok(dataset)
    }

    pub async fn load(&self, name: &str) -> Result<Dataset> {
        let path = self.dataset_path(name);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KitchenError::dataset(format!(
                    "dataset '{}' not found in {}",
                    name,
                    self.dir.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self, dataset: &Dataset) -> Result<PathBuf> {
        let path = self.dataset_path(&dataset.name);
        write_json_atomic(&path, dataset).await?;
        Ok(path)
    }

    /// Writes `<dir>/<dataset>-runs/<run>.json`.
    pub async fn save_run<T: Serialize>(
        &self,
        dataset: &str,
        run_name: &str,
        run: &T,
    ) -> Result<PathBuf> {
        let path = self.runs_dir(dataset).join(format!("{}.json", run_name));
        write_json_atomic(&path, run).await?;
        Ok(path)
    }
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(json.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, path).await?;
    debug!(path = %path.display(), bytes = json.len(), "JSON file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_cases() {
        let cases = builtin_cases().unwrap();
        assert_eq!(cases.len(), 5);
        assert_eq!(cases[1].id, "allergy_peanut_vegan_budget");
        assert_eq!(cases[1].expected_output.must_avoid.len(), 6);
        assert_eq!(cases[2].expected_output.extra["servings"], json!(6));
        assert_eq!(cases[4].category(), Some("cultural_japanese_pregnancy"));
        assert!(cases[3].input.constraints.contains("Recette simple en 20 minutes."));
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path());

        let first = store.create_chefbot_dataset().await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert!(store.dataset_path(DATASET_NAME).exists());

        let second = store.create_chefbot_dataset().await.unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(store.load(DATASET_NAME).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_existing_items_are_kept() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path());

        let mut custom = Dataset::chefbot_menu_eval().unwrap();
        custom.items.truncate(1);
        custom.items.push(DatasetItem {
            id: "custom".to_string(),
            input: ItemInput {
                constraints: "Sans lactose.".to_string(),
                extra: Map::new(),
            },
            expected_output: Expected {
                must_avoid: vec!["lait".to_string()],
                ..Default::default()
            },
            metadata: Map::new(),
        });
        store.save(&custom).await.unwrap();

        let dataset = store.create_chefbot_dataset().await.unwrap();
        assert_eq!(dataset.items.len(), 6);
        assert_eq!(dataset.items[1].id, "custom");
    }

    #[tokio::test]
    async fn test_load_missing_dataset() {
        let dir = TempDir::new().unwrap();
        let err = DatasetStore::new(dir.path()).load("nope").await.unwrap_err();
        assert!(matches!(err, KitchenError::Dataset(_)));
    }

    #[tokio::test]
    async fn test_save_run() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path());

        let path = store
            .save_run(DATASET_NAME, "run-1", &json!({"ok": true}))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("chefbot-menu-eval-runs/run-1.json"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"ok\": true"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
