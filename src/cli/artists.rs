use tabled::Table;

use crate::{
    error, info,
    management::ArtistStore,
    success,
    types::{ArtistTableRow, SearchResultRow},
    warning,
};

const SEARCH_LIMIT: u32 = 10;

pub async fn list_artists(search: Option<String>) {
    let mut artists = match super::store().list().await {
        Ok(artists) => artists,
        Err(e) => error!("Failed to load artists. Err: {}", e),
    };

    if artists.is_empty() {
        info!("No artists tracked yet. Add one with `releasebot artists add <name>`.");
        return;
    }

    // sort artists by name
    artists.sort_by_key(|a| a.name.to_lowercase());

    if let Some(search) = search {
        let term = search.to_lowercase();
        artists.retain(|a| a.name.to_lowercase().contains(&term));
    }

    let rows: Vec<ArtistTableRow> = artists
        .into_iter()
        .map(|a| ArtistTableRow {
            name: a.name,
            id: a.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Searches Spotify and tracks the chosen result.
///
/// `pick` selects a result by its 1-based number; without it the user is
/// asked. `0` cancels.
pub async fn add_artist(query: String, pick: Option<usize>) {
    let session = super::session().await;

    let pb = super::spinner(format!("Searching for \"{}\"...", query));
    let results = session.client.search_artists(&query, SEARCH_LIMIT).await;
    pb.finish_and_clear();

    let results = match results {
        Ok(results) if results.is_empty() => {
            warning!("No artists found for \"{}\".", query);
            return;
        }
        Ok(results) => results,
        Err(e) => error!("Search failed. Err: {}", e),
    };

    let rows: Vec<SearchResultRow> = results
        .iter()
        .enumerate()
        .map(|(i, a)| SearchResultRow {
            index: i + 1,
            name: a.name.clone(),
            followers: a.followers.as_ref().map_or(0, |f| f.total),
            genres: a.genres.iter().take(3).cloned().collect::<Vec<_>>().join(","),
        })
        .collect();
    println!("{}", Table::new(rows));

    let choice = match pick {
        Some(n) => n,
        None => match super::prompt("Pick an artist (0 to cancel):").await {
            Some(answer) => match answer.parse::<usize>() {
                Ok(n) => n,
                Err(_) => error!("\"{}\" is not a number.", answer),
            },
            None => 0,
        },
    };

    if choice == 0 {
        info!("Cancelled.");
        return;
    }

    let Some(artist) = results.get(choice - 1) else {
        error!("Pick a number between 1 and {}.", results.len());
    };

    match session.store.add(artist.clone()).await {
        Ok(true) => success!("Now tracking {}.", artist.name),
        Ok(false) => info!("{} is already tracked.", artist.name),
        Err(e) => error!("Failed to save artist. Err: {}", e),
    }
}

pub async fn remove_artist(artist_id: String) {
    match super::store().remove(&artist_id).await {
        Ok(Some(artist)) => success!("Stopped tracking {}.", artist.name),
        Ok(None) => warning!("No tracked artist with id {}.", artist_id),
        Err(e) => error!("Failed to remove artist. Err: {}", e),
    }
}

/// Tracks every artist the user follows on Spotify.
pub async fn import_artists() {
    let session = super::session().await;

    let pb = super::spinner("Fetching followed artists...");
    let followed = session.client.list_followed_artists().await;
    pb.finish_and_clear();

    let followed = match followed {
        Ok(followed) => followed,
        Err(e) => error!("Failed to fetch followed artists. Err: {}", e),
    };

    info!("You follow {} artist(s).", followed.len());
    match session.store.add_many(followed).await {
        Ok(0) => success!("Nothing to import, all followed artists are tracked."),
        Ok(added) => success!("Imported {} artist(s).", added),
        Err(e) => error!("Failed to save artists. Err: {}", e),
    }
}
