//! Static carbon-footprint notes per waste material.

pub const FOOTPRINT_UNAVAILABLE: &str =
    "⚠ Carbon footprint information not available for this waste type.";

static FOOTPRINTS: &[(&str, &str)] = &[
    (
        "cardboard",
        "📦 **Cardboard Waste**:\n\
         • Virgin cardboard: emits approx. **0.5–0.9 kg CO₂/kg**.\n\
         • Recycled cardboard: **0.2–0.4 kg CO₂/kg**.\n\
         ♻ Recycling reduces water, energy use, and deforestation.",
    ),
    (
        "plastic",
        "🧴 **Plastic Waste**:\n\
         • PET (bottles): **2.1–3.5 kg CO₂/kg**.\n\
         • HDPE (containers): **1.7–2.8 kg CO₂/kg**.\n\
         • General plastic avg: **3–6 kg CO₂/kg**.\n\
         ♻ Recycling plastic saves up to 30–60% emissions.",
    ),
    (
        "glass",
        "🍾 **Glass Waste**:\n\
         • New glass: **0.6–1.2 kg CO₂/kg** due to melting.\n\
         • Recycled glass: **0.2–0.4 kg CO₂/kg**.\n\
         ♻ Glass is 100% recyclable without quality loss.",
    ),
    (
        "metal",
        "🛠 **Metal Waste**:\n\
         • Aluminum: **10–13 kg CO₂/kg (virgin)**, **0.6–1 kg (recycled)**.\n\
         • Steel: **1.8–2.5 kg CO₂/kg**, **~60% less if recycled**.\n\
         ♻ Recycling metals saves significant energy and emissions.",
    ),
    (
        "paper",
        "📄 **Paper Waste**:\n\
         • Virgin paper: **1.8–2.5 kg CO₂/kg**.\n\
         • Recycled paper: **0.9–1.5 kg CO₂/kg**.\n\
         ♻ Recycling paper reduces landfill methane & preserves forests.",
    ),
    (
        "trash",
        "🗑 **Mixed General Trash**:\n\
         • Emissions vary **widely**: depends on materials, landfill gases, and incineration.\n\
         • Can exceed **5 kg CO₂/kg**, especially with food & plastic mixed.\n\
         ♻ Waste separation and composting reduce footprint significantly.",
    ),
];

/// Drops ASCII digits, surrounding whitespace, case, `_`, `-` and spaces, so
/// `"0 Plastic_02"` becomes `"plastic"`.
pub fn footprint_key(label: &str) -> String {
    let without_digits: String = label.chars().filter(|c| !c.is_ascii_digit()).collect();
    without_digits
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect()
}

pub fn carbon_footprint(label: &str) -> &'static str {
    let key = footprint_key(label);
    FOOTPRINTS
        .iter()
        .find(|(material, _)| *material == key)
        .map(|(_, text)| *text)
        .unwrap_or(FOOTPRINT_UNAVAILABLE)
}

/// The footprint text split into display lines.
pub fn footprint_lines(label: &str) -> Vec<&'static str> {
    carbon_footprint(label).split('\n').collect()
}
