use crate::{
    Res,
    spotify::SpotifyClient,
    types::{Artist, FollowedArtistsResponse, SearchArtistsResponse},
};

/// Page size of the followed-artists endpoint.
const FOLLOWED_PAGE_LIMIT: u32 = 50;

impl SpotifyClient {
    /// Retrieves every artist the user follows.
    ///
    /// This endpoint pages with an opaque `after` cursor instead of an
    /// offset; the loop ends when Spotify stops returning a cursor.
    pub async fn list_followed_artists(&self) -> Res<Vec<Artist>> {
        let mut artists = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![
                ("type".to_string(), "artist".to_string()),
                ("limit".to_string(), FOLLOWED_PAGE_LIMIT.to_string()),
            ];
            if let Some(cursor) = &after {
                query.push(("after".to_string(), cursor.clone()));
            }

            let label = format!(
                "listFollowedArtists(after={})",
                after.as_deref().unwrap_or("start")
            );
            let res: FollowedArtistsResponse = self.get(&label, "/me/following", &query).await?;
            artists.extend(res.artists.items);

            after = res.artists.cursors.and_then(|c| c.after);
            if after.is_none() {
                break;
            }
        }

        Ok(artists)
    }

    /// Searches artists by name. Only the first page is fetched.
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search, passed through as `q`
    /// * `limit` - Number of results to ask for (Spotify allows 1-50)
    ///
    /// # Returns
    ///
    /// The matching artists in Spotify's relevance order.
    ///
    /// # Errors
    ///
    /// Whatever the request fails with after retries, typically
    /// [`crate::Error::Exhausted`].
    pub async fn search_artists(&self, query: &str, limit: u32) -> Res<Vec<Artist>> {
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), "artist".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];

        let res: SearchArtistsResponse = self
            .get(&format!("searchArtists(\"{query}\")"), "/search", &params)
            .await?;
        Ok(res.artists.items)
    }
}
