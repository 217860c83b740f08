//! `solstis config` — Show the effective configuration.

use std::path::Path;

use solstis_config::AppConfig;

pub fn run(config_path: Option<&Path>, default: bool) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    let key_state = |set: bool| if set { "set" } else { "not set" };

    println!();
    println!("  LLM:        {} @ {}", config.llm.model, config.llm.base_url);
    println!("  API key:    {}", key_state(config.has_api_key()));
    println!(
        "  Sampling:   temperature {} · max_tokens {} · timeout {}s",
        config.llm.temperature, config.llm.max_tokens, config.llm.timeout_secs
    );
    println!(
        "  History:    last {} messages · default kit '{}'",
        config.conversation.window_size, config.conversation.default_kit
    );
    match &config.catalog.kits_file {
        Some(path) => println!("  Kits:       {}", path.display()),
        None => println!("  Kits:       built-in"),
    }
    println!("  Gateway:    {}:{}", config.gateway.host, config.gateway.port);
    println!("  CORS:       {}", config.gateway.cors_origins.join(", "));
    println!(
        "  Speech:     ElevenLabs key {} · voice {}",
        key_state(config.speech.elevenlabs_api_key.is_some()),
        config.speech.voice_id
    );
    match (config.sessions.max_sessions, config.sessions.idle_ttl_secs) {
        (None, None) => println!("  Sessions:   unbounded"),
        (max, ttl) => println!(
            "  Sessions:   max {} · idle ttl {} · sweep every {}s",
            max.map_or("-".to_string(), |n| n.to_string()),
            ttl.map_or("-".to_string(), |s| format!("{s}s")),
            config.sessions.sweep_interval_secs
        ),
    }
    println!();

    Ok(())
}
