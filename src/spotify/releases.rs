use crate::{
    Res,
    spotify::SpotifyClient,
    types::{Album, Track},
};

const RELEASES_PAGE_LIMIT: u32 = 50;
const TRACKS_PAGE_LIMIT: u32 = 50;

/// Options for listing an artist's releases.
#[derive(Debug, Clone)]
pub struct ReleaseQuery {
    /// Comma separated release groups, e.g. `album,single`.
    pub include_groups: String,
    pub market: Option<String>,
}

impl ReleaseQuery {
    pub fn new(include_groups: impl Into<String>) -> Self {
        Self {
            include_groups: include_groups.into(),
            market: None,
        }
    }

    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }
}

impl SpotifyClient {
    /// Retrieves every release of an artist in the requested groups.
    ///
    /// # Arguments
    ///
    /// * `artist_id` - Spotify artist id
    /// * `options` - `include_groups` and optional market
    ///
    /// # Returns
    ///
    /// All releases across every page, in the order Spotify returns them.
    /// Nothing is filtered by date here.
    ///
    /// # Errors
    ///
    /// A failing page aborts the call; pages that already succeeded are not
    /// requested again because each page is its own retried call. An
    /// unknown artist ends in [`crate::Error::Exhausted`] wrapping a 404.
    pub async fn list_artist_releases(
        &self,
        artist_id: &str,
        options: &ReleaseQuery,
    ) -> Res<Vec<Album>> {
        let mut query = vec![("include_groups".to_string(), options.include_groups.clone())];
        if let Some(market) = &options.market {
            query.push(("market".to_string(), market.clone()));
        }

        self.get_all_pages(
            &format!("listArtistReleases({artist_id})"),
            &format!("/artists/{artist_id}/albums"),
            &query,
            RELEASES_PAGE_LIMIT,
        )
        .await
    }

    /// Every track of a release.
    pub async fn list_release_tracks(&self, release_id: &str) -> Res<Vec<Track>> {
        self.get_all_pages(
            &format!("listReleaseTracks({release_id})"),
            &format!("/albums/{release_id}/tracks"),
            &[],
            TRACKS_PAGE_LIMIT,
        )
        .await
    }
}
