//! The kits Solstis ships with.

use solstis_core::{KitDefinition, KitItem};

fn kit(
    id: &str,
    name: &str,
    description: &str,
    use_case: &str,
    contents: Vec<KitItem>,
) -> KitDefinition {
    KitDefinition {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        use_case: use_case.into(),
        contents,
    }
}

fn item(name: &str) -> KitItem {
    KitItem::new(name)
}

pub(crate) fn kits() -> Vec<KitDefinition> {
    vec![standard(), college(), oc_standard(), oc_vehicle()]
}

fn standard() -> KitDefinition {
    kit(
        "standard",
        "Standard Kit",
        "Comprehensive first aid kit for general use.",
        "Home, workplace, or everyday carry.",
        vec![
            item("Band-Aids"),
            item(r#"4" x 4" Gauze Pads"#).with_quantity(5),
            item(r#"2" Roll Gauze"#).with_description("Holds gauze in place"),
            item(r#"5" x 9" ABD Pad"#).with_description("For nosebleeds or deeper cuts"),
            item(r#"1" Cloth Medical Tape"#),
            item("Triple Antibiotic Ointment")
                .with_description("Mini tube for infection prevention"),
            item("Blunt Tip Tweezers").with_description("For splinters or debris removal"),
            item("Small Trauma Shears").with_description("Safe for cutting tape or clothing"),
            item("QuickClot Gauze or Hemostatic Wipe")
                .with_description("For guided serious bleeding control"),
            item(r#"4" x 4" Burn Gel Dressing"#)
                .with_description("For finger burns or hot pans"),
            item("2 oz Burn Spray").with_description("For minor burns or sunburns"),
            item("Sting & Bite Relief Wipes").with_quantity(2),
            item("Mini Eye Wash Bottle").with_quantity(1),
            item("Oral Glucose Gel").with_description("For dizziness or low energy"),
            item("Electrolyte Powder Pack").with_description("Hydration support"),
            item(r#"2" Elastic Ace Bandage"#).with_description("For sprains"),
            item("Instant Cold Pack").with_description("For bruises or swelling"),
            item("Triangle Bandage").with_description("Can be sling or gentle wrap"),
        ],
    )
}

fn college() -> KitDefinition {
    kit(
        "college",
        "College Kit",
        "Essential medical supplies for college students.",
        "Dorm rooms, campus travel, everyday minor illness care.",
        [
            "Acetaminophen",
            "Ibuprofen",
            "Hydrocortisone Cream",
            "Benadryl",
            "Allergy Medication",
            "DayQuil",
            "NyQuil",
            "Cough Medicines",
            "Antacids",
            "Antiseptic Wipes",
            "Antibiotic Ointment",
            "Adhesive Bandages",
            "Gauze Pads",
            "Medical Tape",
            "Elastic Bandage",
            "Hand Sanitizer",
            "Latex-Free Gloves",
        ]
        .into_iter()
        .map(item)
        .collect(),
    )
}

fn oc_standard() -> KitDefinition {
    kit(
        "oc_standard",
        "OC Standard Kit",
        "Occupational safety kit with Honeywell products.",
        "Worksites, industrial environments, OSHA compliance.",
        vec![
            item(r#"24" x 72" Compress"#).with_quantity(2),
            item(r#"1" x 3" Cloth Bandages"#).with_quantity(32),
            item(r#"1" x 2 1/2 yd Adhesive Tape"#).with_quantity(2),
            item("Eye Dressing Package").with_quantity(4),
            item(r#"4" x 6 yd Roller Bandage"#).with_quantity(2),
            item(r#"4" Offset Compress"#).with_quantity(2),
            item(r#"3" x 3" Pads"#).with_quantity(8),
            item("Exam Gloves").with_quantity(12),
            item("Triangle Bandage").with_quantity(2),
            item("1 oz Eye Wash").with_quantity(2),
            item("Cold Pack").with_quantity(2),
            item("Antiseptic Skin Wipes").with_quantity(20),
            item("Sting Kill Wipes").with_quantity(20),
            item("Rescue Blanket").with_quantity(1),
            item(r#"2" Elastic Ace Bandage"#).with_description("For sprains"),
            item("Instant Cold Pack").with_description("For bruises, swelling"),
            item("Triangle Bandage").with_description("Can be sling or wrap"),
        ],
    )
}

fn oc_vehicle() -> KitDefinition {
    kit(
        "oc_vehicle",
        "OC Vehicle Kit",
        "Compact vehicle emergency kit.",
        "Glovebox or trunk storage for roadside injuries.",
        vec![
            item(r#"24" x 72" Gauze Compress"#).with_quantity(1),
            item(r#"1" x 2 1/2 yd Adhesive Tape"#).with_quantity(2),
            item("Eye Dressing Package").with_quantity(4),
            item(r#"4" Offset Compress"#).with_quantity(1),
            item(r#"3" x 3" Pads"#).with_quantity(4),
            item("Cold Pack").with_quantity(1),
            item("Antiseptic Skin Wipes").with_quantity(10),
            item("1 oz Eye Wash").with_quantity(1),
            item(r#"1" x 3" Cloth Bandages"#).with_quantity(16),
            item("Rescue Blanket").with_quantity(1),
            item("Exam Gloves").with_quantity(12),
        ],
    )
}
