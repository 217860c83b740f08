//! `solstis kits` — List the kit catalog.

use std::path::Path;

use solstis_catalog::KitCatalog;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let catalog = KitCatalog::load(config.catalog.kits_file.as_deref())?;

    println!();
    for kit in catalog.list() {
        let marker = if kit.id == config.conversation.default_kit {
            " (default)"
        } else {
            ""
        };
        println!("  {:<14} {}{marker}", kit.id, kit.name);
        println!("  {:<14} {} items · {}", "", kit.contents.len(), kit.use_case);
    }
    println!();

    Ok(())
}
