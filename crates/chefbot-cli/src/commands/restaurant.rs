use super::{banner, App};
use chefbot_kitchen::prompts::{CONVERSATION_TURNS, GROUP_MENU_QUESTION};
use chefbot_kitchen::RestaurantWaiter;
use clap::Subcommand;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Subcommand, Debug)]
pub enum Scenario {
    /// One group-menu request handled by the planning agent
    Plan {
        /// The request; defaults to the three-guest, 60 € question
        question: Option<String>,
    },
    /// The three scripted turns on one session
    Conversation,
    /// Talk to the waiter yourself
    Chat,
}

pub async fn run(app: &App, scenario: Option<Scenario>) -> anyhow::Result<()> {
    let waiter = RestaurantWaiter::new(&app.bot)?;

    match scenario {
        Some(Scenario::Plan { question }) => {
            waiter.write_header();
            plan(&waiter, question.as_deref().unwrap_or(GROUP_MENU_QUESTION)).await
        }
        Some(Scenario::Conversation) => {
            waiter.write_header();
            conversation(&waiter).await
        }
        Some(Scenario::Chat) => chat(&waiter).await,
        None => {
            banner("PARTIE 5 - RESTAURANT INTELLIGENT");
            waiter.write_header();
            plan(&waiter, GROUP_MENU_QUESTION).await?;
            conversation(&waiter).await
        }
    }
}

async fn plan(waiter: &RestaurantWaiter, question: &str) -> anyhow::Result<()> {
    println!("\n{}", "--- 5.2 (planning agent) ---".cyan().bold());
    println!("{} {}", "USER:".bold(), question);
    let answer = waiter.plan_group_menu(question).await?;
    println!("{} {}", "AGENT:".magenta().bold(), answer);
    Ok(())
}

async fn conversation(waiter: &RestaurantWaiter) -> anyhow::Result<()> {
    println!(
        "\n{}",
        format!("--- 5.3 (conversation, {} turns) ---", CONVERSATION_TURNS.len())
            .cyan()
            .bold()
    );
    let answers = waiter.conversation(&CONVERSATION_TURNS).await?;
    for (i, (turn, answer)) in CONVERSATION_TURNS.iter().zip(&answers).enumerate() {
        println!("{} {}", format!("USER({}):", i + 1).bold(), turn);
        println!("{} {}\n", format!("AGENT({}):", i + 1).magenta().bold(), answer);
    }
    Ok(())
}

async fn chat(waiter: &RestaurantWaiter) -> anyhow::Result<()> {
    let session = waiter.agent().create_session();

    println!("{}", "Restaurant ChefBot".green().bold());
    println!("Type {} to exit\n", "quit".yellow());

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(&format!("{} ", "Vous:".cyan().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    println!("{}", "Au revoir !".green());
                    break;
                }

                rl.add_history_entry(line)?;

                print!("{} ", "Serveur:".magenta().bold());

                match waiter.chat(&session, line).await {
                    Ok(response) => {
                        println!("{}\n", response);
                    }
                    Err(e) => {
                        println!("{} {}\n", "Error:".red().bold(), e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".yellow());
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Au revoir !".green());
                break;
            }
            Err(err) => {
                println!("{} {:?}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}
