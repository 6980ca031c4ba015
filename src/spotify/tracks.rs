use std::future::Future;

use crate::{
    error::UpstreamError,
    spotify::SpotifyClient,
    types::{PlaylistTracksResponse, Track},
};

/// Items requested per playlist page; a shorter page ends the listing.
pub const PAGE_SIZE: usize = 100;

/// Retrieves a single track.
///
/// Returns `Ok(None)` when Spotify does not know the id.
pub async fn get_track(client: &SpotifyClient, id: &str) -> Result<Option<Track>, UpstreamError> {
    client.get_json::<Track>(&format!("/tracks/{id}"), &[]).await
}

/// Retrieves every track of a playlist.
///
/// Pages of [`PAGE_SIZE`] items are requested until a short page comes back.
/// Items without a track or without a track id (removed or local files) are
/// skipped.
pub async fn get_playlist_tracks(
    client: &SpotifyClient,
    playlist_id: &str,
) -> Result<Vec<Track>, UpstreamError> {
    let path = format!("/playlists/{playlist_id}/tracks");

    let items = collect_pages(PAGE_SIZE, |offset| {
        let path = path.clone();
        async move {
            let query = [
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ];
            let page = client
                .get_json::<PlaylistTracksResponse>(&path, &query)
                .await?
                .ok_or_else(|| UpstreamError::Status {
                    status: reqwest::StatusCode::NOT_FOUND,
                    url: path.clone(),
                })?;
            tracing::debug!(offset, items = page.items.len(), "fetched playlist page");
            Ok::<_, UpstreamError>(page.items)
        }
    })
    .await?;

    Ok(items
        .into_iter()
        .filter_map(|item| item.track)
        .filter(|track| !track.id.is_empty())
        .collect())
}

/// Drives offset pagination: calls `fetch_page(offset)` with offsets
/// `0, page_size, 2 * page_size, ...` until a page shorter than `page_size`
/// is returned, and concatenates the pages in order.
pub async fn collect_pages<T, E, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut all = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(offset).await?;
        let len = page.len();
        all.extend(page);
        if len < page_size || page_size == 0 {
            return Ok(all);
        }
        offset += page_size;
    }
}
