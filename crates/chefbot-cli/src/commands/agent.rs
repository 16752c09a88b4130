use super::{banner, App};
use chefbot_kitchen::prompts::DINNER_QUESTION;
use chefbot_kitchen::manual_agent_question;
use colored::Colorize;

pub async fn run(app: &App, question: Option<String>, framework: bool) -> anyhow::Result<()> {
    banner("PARTIE 4 - AGENT CUISINE");

    let result = if framework {
        let question = question.unwrap_or_else(|| DINNER_QUESTION.to_string());
        app.bot.run_framework_agent(&question).await
    } else {
        let question = question.unwrap_or_else(manual_agent_question);
        app.bot.manual_tool_calling_agent(&question).await
    };

    match result {
        Ok(response) => {
            for call in &response.tool_calls {
                println!("{} {}({})", "Tool call:".cyan(), call.name, call.input);
                println!("{} {}", "Result:".dimmed(), call.output);
            }
            println!("\n{}", "=== FINAL ANSWER ===".green().bold());
            println!("{}", response.text);
            Ok(())
        }
        Err(e) if e.is_max_iterations() => {
            println!("\n{}", "=== FINAL ANSWER ===".green().bold());
            println!("Error: max iterations reached");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
