use tabled::Table;

use crate::{
    error, info,
    management::{ArtistStore, PresetStore},
    success,
    types::PresetTableRow,
    warning,
};

pub async fn list_presets() {
    let presets = match super::store().presets().await {
        Ok(presets) => presets,
        Err(e) => error!("Failed to load presets. Err: {}", e),
    };

    if presets.is_empty() {
        info!("No presets saved. Save one with `releasebot presets save <name>`.");
        return;
    }

    let rows: Vec<PresetTableRow> = presets
        .into_iter()
        .map(|(name, artists)| PresetTableRow {
            name,
            artists: artists.len(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

/// Snapshots the current artist list under `name`.
pub async fn save_preset(name: String) {
    let store = super::store();
    let artists = super::tracked_artists(&store).await;
    let count = artists.len();

    match store.save_preset(name.clone(), artists).await {
        Ok(()) => success!("Saved preset \"{}\" with {} artist(s).", name, count),
        Err(e) => error!("Failed to save preset. Err: {}", e),
    }
}

/// Replaces the tracked artists with a preset.
pub async fn load_preset(name: String, assume_yes: bool) {
    let store = super::store();
    let current = match store.list().await {
        Ok(artists) => artists.len(),
        Err(e) => error!("Failed to load artists. Err: {}", e),
    };

    if current > 0 {
        let question = format!(
            "Replace the {} tracked artist(s) with preset \"{}\"?",
            current, name
        );
        if !super::confirm(&question, assume_yes).await {
            info!("Cancelled.");
            return;
        }
    }

    match store.apply_preset(&name).await {
        Ok(Some(count)) => success!("Loaded preset \"{}\", now tracking {} artist(s).", name, count),
        Ok(None) => warning!("No preset named \"{}\".", name),
        Err(e) => error!("Failed to load preset. Err: {}", e),
    }
}

pub async fn delete_preset(name: String) {
    match super::store().delete_preset(&name).await {
        Ok(true) => success!("Deleted preset \"{}\".", name),
        Ok(false) => warning!("No preset named \"{}\".", name),
        Err(e) => error!("Failed to delete preset. Err: {}", e),
    }
}
