//! `solstis prompt` — Print the composed instruction text for a kit.

use std::path::Path;
use std::sync::Arc;

use solstis_agent::PromptComposer;
use solstis_catalog::KitCatalog;

pub fn run(
    config_path: Option<&Path>,
    kit: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let catalog = Arc::new(KitCatalog::load(config.catalog.kits_file.as_deref())?);
    let composer = PromptComposer::new(catalog).with_default_kit(&config.conversation.default_kit);

    if composer.resolve(kit).is_none() {
        eprintln!(
            "  note: kit '{}' is not in the catalog; showing generic instructions",
            kit.unwrap_or(composer.default_kit())
        );
    }
    println!("{}", composer.compose(kit));

    Ok(())
}
