use super::{banner, App};
use chefbot_kitchen::DatasetStore;
use colored::Colorize;

pub async fn run(app: &App, dataset_only: bool) -> anyhow::Result<()> {
    banner("CHEFBOT - DATASET + EVALUATION + EXPERIMENT");

    let store = DatasetStore::new(app.config.data_dir());
    let dataset = store.create_chefbot_dataset().await?;
    println!(
        "{} {} ({} items) in {}",
        "✓ Dataset:".green(),
        dataset.name,
        dataset.items.len(),
        store.dir().display()
    );
    if dataset_only {
        return Ok(());
    }

    let (run, path) = app.bot.run_experiment(&store).await?;

    println!("\n{} {}", "Experiment:".cyan().bold(), run.name);
    for item in &run.items {
        let scores: Vec<String> = item
            .evaluations
            .iter()
            .map(|e| format!("{}={:.2}", e.name, e.value))
            .collect();
        println!("  {} {}", item.item_id.bold(), scores.join(" "));
        for error in &item.errors {
            println!("    {} {}", "Error:".red(), error);
        }
    }

    println!("\n{}", "Moyennes".cyan().bold());
    for average in &run.averages {
        println!(
            "  {:<24} {:.3}  (n={})",
            average.name, average.value, average.count
        );
    }
    if run.failed_items() > 0 {
        println!(
            "{} {} item(s) with errors",
            "Warning:".yellow().bold(),
            run.failed_items()
        );
    }
    println!("\n{} {}", "✓ Run saved:".green(), path.display());
    Ok(())
}
