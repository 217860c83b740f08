//! Prompt Composer — kit-aware instruction text for every turn.
//!
//! `compose` is a pure function of the kit id, the catalog, and the fixed
//! template below. Two named policies decide what happens without a usable
//! kit:
//!
//! - **default kit**: no kit selected yet, so use the configured default
//!   (`"standard"` unless overridden).
//! - **fallback instruction**: the selected kit is not in the catalog, so
//!   use generic text that names no supplies at all.

use std::sync::Arc;

use solstis_catalog::KitCatalog;
use solstis_core::{KitDefinition, KitItem};

/// Kit applied when a conversation has no selection.
pub const DEFAULT_KIT_ID: &str = "standard";

/// Instruction text used when the selected kit cannot be resolved.
pub const FALLBACK_INSTRUCTION: &str = "You are Solstis, a calm and supportive first-aid \
assistant. No kit information is available for this conversation, so do not assume the user \
has any particular supplies. Always ask first whether this is a life-threatening emergency, \
and if it is, tell the user to call 911 immediately. Otherwise give simple, safe, step-by-step \
guidance, ask one question at a time, and recommend professional medical care for anything \
serious.";

const GUIDELINES: &str = "\
IMPORTANT GUIDELINES:
1. Triage first. Before anything else, ask whether this is a life-threatening emergency. If there is severe bleeding, trouble breathing, chest pain, or loss of consciousness, or the user is unsure, tell them to call 911 immediately.
2. Only recommend items listed under AVAILABLE ITEMS. Common household basics such as clean water, soap, and a clean cloth may also be suggested. If something the user needs is not in the kit, say so and explain what to do without it.
3. If a treatment has not helped after two attempts, or symptoms get worse, stop and direct the user to professional medical care.
4. Bleeding: for minor cuts, clean the wound, protect it, and cover it. For heavy bleeding, apply firm, direct pressure with the most absorbent dressing in the kit for at least ten minutes, and call 911 if blood soaks through or will not stop.
5. Burns: cool a minor burn under cool running water for ten minutes before using any burn product from the kit. Large, deep, or blistering burns, and burns on the face, hands, or genitals, need emergency care.
6. Keep each reply to one or two short sentences and ask one question at a time. Use plain language anyone can follow.
7. When you mention an item, tell the user its LED-lit compartment will light up so they can find it quickly.
8. Stay calm, supportive, and reassuring. Never diagnose or go beyond first aid.";

/// Render one kit line: `name`, then ` (qty: N)`, then ` - description`.
pub fn render_item(item: &KitItem) -> String {
    let mut line = item.item.clone();
    if let Some(quantity) = item.quantity {
        line.push_str(&format!(" (qty: {quantity})"));
    }
    if let Some(description) = &item.description {
        line.push_str(" - ");
        line.push_str(description);
    }
    line
}

#[derive(Debug, Clone)]
pub struct PromptComposer {
    catalog: Arc<KitCatalog>,
    default_kit: String,
}

impl PromptComposer {
    pub fn new(catalog: Arc<KitCatalog>) -> Self {
        Self {
            catalog,
            default_kit: DEFAULT_KIT_ID.into(),
        }
    }

    pub fn with_default_kit(mut self, kit_id: impl Into<String>) -> Self {
        self.default_kit = kit_id.into();
        self
    }

    pub fn default_kit(&self) -> &str {
        &self.default_kit
    }

    pub fn catalog(&self) -> &KitCatalog {
        &self.catalog
    }

    /// The kit a conversation uses, after applying the default kit policy.
    pub fn resolve(&self, kit_id: Option<&str>) -> Option<&KitDefinition> {
        let id = kit_id.unwrap_or(&self.default_kit);
        self.catalog.lookup(id).ok()
    }

    /// Instruction text for `kit_id`. Never fails.
    pub fn compose(&self, kit_id: Option<&str>) -> String {
        match self.resolve(kit_id) {
            Some(kit) => Self::render(kit),
            None => FALLBACK_INSTRUCTION.to_string(),
        }
    }

    fn render(kit: &KitDefinition) -> String {
        let items = kit
            .contents
            .iter()
            .map(|item| format!("- {}", render_item(item)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are Solstis, a calm and supportive first-aid assistant. You help users with \
first aid using only the items available in their specific kit.

KIT INFORMATION:
Kit Name: {name}
Description: {description}
Use Case: {use_case}

AVAILABLE ITEMS:
{items}

{GUIDELINES}",
            name = kit.name,
            description = kit.description,
            use_case = kit.use_case,
        )
    }

    /// Opening line shown when a conversation starts or restarts.
    pub fn greeting(&self, user_name: &str, kit_id: Option<&str>) -> String {
        let name = match user_name.trim() {
            "" => "there",
            name => name,
        };
        let help = match self.resolve(kit_id) {
            Some(kit) => format!("I'm here to help with your {}.", kit.name),
            None => "I'm here to help.".to_string(),
        };
        format!(
            "Hey {name}. {help} If this is a life-threatening emergency, please call 911 \
immediately. Otherwise, I'll guide you step-by-step. Can you tell me what happened?"
        )
    }
}
