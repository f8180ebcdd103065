//! Command implementations

pub mod compact;
pub mod layout;
pub mod simulate;

use anyhow::Result;
use clap::ValueEnum;

use crate::presets::Preset;
use crate::utils::ReportTable;

/// Print every built-in preset with its emitters
pub fn list_presets() -> Result<()> {
    let mut table = ReportTable::new(&["Preset", "Emitters", "Description"]);
    for preset in Preset::value_variants() {
        let system = preset.build(1);
        let emitters = system
            .emitters
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let name = preset
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        table.push([name.as_str(), emitters.as_str(), preset.description()]);
    }
    table.print();
    Ok(())
}
