use super::{banner, App};
use chefbot_kitchen::prompts::PARTY_REQUEST;
use chefbot_kitchen::DinnerPartyTeam;
use colored::Colorize;

pub async fn run(app: &App, request: Option<String>) -> anyhow::Result<()> {
    let request = request.unwrap_or_else(|| PARTY_REQUEST.to_string());

    banner("PARTIE 6 - MULTI AGENT");
    println!("{} {}\n", "Demande:".cyan().bold(), request);

    let team = DinnerPartyTeam::new(&app.bot)?;
    let answer = team.manager_run(&request).await?;

    println!("{}", "=== PROPOSITION FINALE ===".green().bold());
    println!("{}", answer);
    Ok(())
}
