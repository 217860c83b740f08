//! `solstis serve` — Start the HTTP API server.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Solstis Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.llm.model);
    if !config.has_api_key() {
        println!("   Warning:   no LLM API key set (OPENAI_API_KEY); chat turns will fail");
    }

    solstis_gateway::start(config).await?;

    Ok(())
}
