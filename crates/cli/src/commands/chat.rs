//! `solstis chat` — Interactive or single-message chat in the terminal.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use solstis_agent::TurnOrchestrator;
use solstis_catalog::KitCatalog;
use solstis_config::AppConfig;
use solstis_sessions::InMemoryStore;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    config_path: Option<&Path>,
    user: &str,
    kit: Option<&str>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set OPENAI_API_KEY, or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let catalog = Arc::new(KitCatalog::load(config.catalog.kits_file.as_deref())?);
    let collaborators = solstis_providers::build_from_config(&config);
    let orchestrator = TurnOrchestrator::from_config(
        &config,
        Arc::new(InMemoryStore::new()),
        catalog,
        collaborators.llm,
    );

    let greeting = match kit {
        Some(kit) => {
            let outcome = orchestrator.setup(user, kit).await?;
            if !outcome.kit_recognized() {
                eprintln!("  note: kit '{kit}' is not in the catalog; using generic instructions");
            }
            outcome.greeting
        }
        None => orchestrator.reset(user).await?,
    };

    if let Some(msg) = message {
        // Single message mode
        let reply = orchestrator.handle_turn(user, kit, &msg).await?;
        println!("{reply}");
        return Ok(());
    }

    println!();
    println!("  Solstis — Interactive Mode");
    println!();
    println!("  Model:     {}", config.llm.model);
    println!("  Kit:       {}", kit.unwrap_or(&config.conversation.default_kit));
    println!();
    println!("  Type 'clear' to start over, 'history' to dump the log, 'exit' to quit.");
    println!();
    print_reply(&greeting);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt_marker()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "clear" => {
                let greeting = orchestrator.reset(user).await?;
                print_reply(&greeting);
            }
            "history" => {
                if let Some(state) = orchestrator.history(user).await? {
                    println!("{}", serde_json::to_string_pretty(&state.messages)?);
                }
            }
            _ => match orchestrator.handle_turn(user, kit, input).await {
                Ok(reply) => print_reply(&reply),
                Err(e) => {
                    eprintln!("  [Error] {e}");
                    println!();
                }
            },
        }
        prompt_marker()?;
    }

    println!();
    println!("  Stay safe.");
    println!();

    Ok(())
}

fn print_reply(reply: &str) {
    println!();
    for line in reply.lines() {
        println!("  Solstis > {line}");
    }
    println!();
}

fn prompt_marker() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
