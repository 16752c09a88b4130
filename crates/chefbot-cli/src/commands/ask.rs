use super::{banner, App};
use chefbot_kitchen::prompts::{DEMO_TEMPERATURES, LUNCH_QUESTION};
use colored::Colorize;

pub async fn run(app: &App, question: Option<String>, temperature: Option<f32>) -> anyhow::Result<()> {
    let question = question.unwrap_or_else(|| LUNCH_QUESTION.to_string());
    let temperatures = match temperature {
        Some(t) => vec![t],
        None => DEMO_TEMPERATURES.to_vec(),
    };

    banner("PARTIE 1 - CHEF DE SAISON");
    println!("{} {}", "Question:".cyan().bold(), question);

    for temperature in temperatures {
        println!("\n{} {}", "Température".yellow().bold(), temperature);
        match app.bot.ask_chef(&question, temperature).await {
            Ok(answer) => println!("{}", answer),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    Ok(())
}
