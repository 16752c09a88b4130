use super::{banner, App};
use chefbot_kitchen::prompts::WEEKLY_CONSTRAINTS;
use colored::Colorize;

pub async fn run(app: &App, constraints: Option<String>) -> anyhow::Result<()> {
    let constraints = constraints.unwrap_or_else(|| WEEKLY_CONSTRAINTS.to_string());

    banner("PARTIE 2 - MENU DE LA SEMAINE");
    println!("{} {}\n", "Contraintes:".cyan().bold(), constraints);

    let menu = app.bot.plan_weekly_menu(&constraints).await?;

    for day in menu.days() {
        println!("{}", day.day.bold());
        println!("  {} {}", "Déjeuner:".yellow(), day.lunch);
        println!("  {} {}", "Dîner:".yellow(), day.dinner);
        if let Some(notes) = day.notes.as_deref().filter(|n| !n.is_empty()) {
            println!("  {} {}", "Notes:".dimmed(), notes);
        }
    }

    println!("\n{}", serde_json::to_string_pretty(&menu)?);
    Ok(())
}
