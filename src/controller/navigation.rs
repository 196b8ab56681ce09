//! Catalog loads, search and playlist navigation

use crate::error::{PlayerError, Result};
use crate::model::{Notification, Song};

use super::{ControllerEvent, PlaybackController, flatten};

impl PlaybackController {
    /// Reload the full catalog into the playlist.
    pub fn refresh(&mut self) {
        let request = self.next_catalog_request();
        tracing::debug!(request, "Fetching catalog");

        let catalog = self.catalog.clone();
        self.runner.run(
            "fetch_all",
            async move { catalog.fetch_all().await },
            move |outcome| ControllerEvent::CatalogLoaded {
                request,
                result: flatten(outcome),
            },
        );
    }

    /// Replace the playlist with the server's matches for `query`.
    pub fn search(&mut self, query: String) {
        let request = self.next_catalog_request();
        tracing::debug!(request, query = %query, "Searching catalog");

        let catalog = self.catalog.clone();
        self.runner.run(
            "search",
            async move { catalog.search(&query).await },
            move |outcome| ControllerEvent::CatalogLoaded {
                request,
                result: flatten(outcome),
            },
        );
    }

    /// Select and play the next row. No-op on the last row.
    pub fn next(&mut self) {
        match self.navigator.next().cloned() {
            Some(song) => self.select_from_playlist(song),
            None => tracing::debug!(selected = ?self.navigator.selected_index(), "Already at the last song"),
        }
    }

    /// Select and play the previous row. No-op on the first row.
    pub fn previous(&mut self) {
        match self.navigator.previous().cloned() {
            Some(song) => self.select_from_playlist(song),
            None => tracing::debug!(selected = ?self.navigator.selected_index(), "Already at the first song"),
        }
    }

    fn select_from_playlist(&mut self, song: Song) {
        self.notify(Notification::SelectionChanged {
            index: self.navigator.selected_index(),
        });
        self.select(song);
    }

    fn next_catalog_request(&mut self) -> u64 {
        self.catalog_epoch += 1;
        self.catalog_epoch
    }

    pub(super) fn on_catalog_loaded(&mut self, request: u64, result: Result<Vec<Song>>) {
        if request != self.catalog_epoch {
            tracing::debug!(request, latest = self.catalog_epoch, "Ignoring superseded catalog result");
            return;
        }

        match result {
            Ok(songs) => {
                tracing::info!(request, songs = songs.len(), "Playlist replaced");
                self.navigator.set_playlist(songs);
                self.notify(Notification::PlaylistChanged {
                    len: self.navigator.len(),
                });
                self.notify(Notification::SelectionChanged { index: None });
            }
            Err(e) => {
                let network = matches!(&e, PlayerError::Catalog(c) if c.is_network());
                tracing::error!(request, network, error = %e, "Catalog request failed, keeping playlist");
                self.report_error(&e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, closed_server_url, drain, song};
    use crate::model::TransportState;
    use super::*;
    use crate::model::CatalogClient;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    async fn mount_songs(h: &Harness, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&h.server)
            .await;
    }

    fn catalog_loaded(event: &ControllerEvent) -> bool {
        matches!(event, ControllerEvent::CatalogLoaded { .. })
    }

    #[tokio::test]
    async fn fetch_then_play_first_song() {
        let mut h = Harness::new().await;
        mount_songs(&h, json!([{ "id": 1, "title": "A", "artist": "X", "playCount": 0, "duration": 125 }])).await;

        h.controller.refresh();
        h.pump_until(catalog_loaded).await;
        assert_eq!(h.controller.playlist().len(), 1);
        assert_eq!(h.controller.selected_index(), None);

        h.controller.play_index(0).unwrap();
        h.pump().await;

        let info = h.controller.playback_info();
        assert_eq!(info.state, TransportState::Playing);
        assert_eq!(info.duration_label(), "02:05");
    }

    #[tokio::test]
    async fn empty_search_result_clears_selection_only() {
        let mut h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "zzz-no-match"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&h.server)
            .await;
        h.controller.navigator.set_playlist(vec![song(1, 10), song(2, 10)]);
        h.controller.navigator.select_index(1).unwrap();

        h.controller.search("zzz-no-match".into());
        h.pump_until(catalog_loaded).await;

        assert!(h.controller.playlist().is_empty());
        assert_eq!(h.controller.selected_index(), None);
        assert_eq!(h.controller.state(), TransportState::Idle);
    }

    #[tokio::test]
    async fn search_does_not_disturb_playback() {
        let mut h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&h.server)
            .await;
        h.controller.navigator.set_playlist(vec![song(1, 100)]);
        h.controller.play_index(0).unwrap();
        h.pump().await;

        h.controller.search("other".into());
        h.pump_until(catalog_loaded).await;

        assert_eq!(h.controller.state(), TransportState::Playing);
        assert_eq!(h.controller.current_track().map(|s| s.id), Some(1));
        assert_eq!(h.controller.selected_index(), None);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_playlist_and_notifies() {
        let mut h = Harness::new().await;
        let mut notifications = h.controller.subscribe();
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&h.server)
            .await;
        h.controller.navigator.set_playlist(vec![song(1, 10), song(2, 10)]);

        h.controller.refresh();
        h.pump_until(catalog_loaded).await;

        assert_eq!(h.controller.playlist().len(), 2);
        assert!(drain(&mut notifications).contains(&Notification::Error {
            message: "Catalog server sent an unreadable response.".into(),
        }));
    }

    #[tokio::test]
    async fn superseded_catalog_result_is_ignored() {
        let mut h = Harness::new().await;
        Mock::given(method("GET"))
            .and(path("/songs"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "id": 1, "title": "A", "artist": "X", "playCount": 0, "duration": 1 }]))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 5, "title": "E", "artist": "X", "playCount": 0, "duration": 1 },
                { "id": 6, "title": "F", "artist": "X", "playCount": 0, "duration": 1 },
            ])))
            .mount(&h.server)
            .await;

        h.controller.refresh();
        h.controller.search("e".into());

        // Search resolves first, the slow fetch arrives afterwards and must not win
        h.pump_until(catalog_loaded).await;
        h.pump_until(catalog_loaded).await;

        let ids: Vec<i64> = h.controller.playlist().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[tokio::test]
    async fn next_and_previous_play_neighbours() {
        let mut h = Harness::new().await;
        h.controller.navigator.set_playlist(vec![song(1, 10), song(2, 10), song(3, 10)]);

        h.controller.next();
        assert_eq!(h.controller.state(), TransportState::Idle);

        h.controller.play_index(2).unwrap();
        h.pump().await;
        h.controller.next();
        assert_eq!(h.controller.state(), TransportState::Playing);
        assert_eq!(h.controller.selected_index(), Some(2));

        h.controller.previous();
        assert_eq!(h.controller.state(), TransportState::Loading);
        assert_eq!(h.controller.selected_index(), Some(1));
        assert_eq!(h.controller.current_track().map(|s| s.id), Some(2));
    }

    #[tokio::test]
    async fn play_index_out_of_range_leaves_state_alone() {
        let mut h = Harness::new().await;
        h.controller.navigator.set_playlist(vec![song(1, 10)]);
        h.controller.navigator.select_index(0).unwrap();

        assert!(h.controller.play_index(1).is_err());
        assert_eq!(h.controller.selected_index(), Some(0));
        assert_eq!(h.controller.state(), TransportState::Idle);
    }

    #[tokio::test]
    async fn failed_search_keeps_playlist_and_selection() {
        let mut h = Harness::new().await;
        let mut notifications = h.controller.subscribe();
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("index rebuilding"))
            .mount(&h.server)
            .await;
        h.controller.navigator.set_playlist(vec![song(1, 10), song(2, 10)]);
        h.controller.navigator.select_index(1).unwrap();

        h.controller.search("anything".into());
        h.pump_until(catalog_loaded).await;

        assert_eq!(h.controller.playlist(), &[song(1, 10), song(2, 10)]);
        assert_eq!(h.controller.selected_index(), Some(1));
        assert!(drain(&mut notifications).contains(&Notification::Error {
            message: "Catalog server error (500).".into(),
        }));
    }

    #[tokio::test]
    async fn search_against_unreachable_server_keeps_playlist() {
        let mut h = Harness::new().await;
        h.controller.catalog = CatalogClient::with_client(reqwest::Client::new(), closed_server_url());
        let mut notifications = h.controller.subscribe();
        h.controller.navigator.set_playlist(vec![song(1, 10)]);
        h.controller.navigator.select_index(0).unwrap();

        h.controller.search("anything".into());
        h.pump_until(catalog_loaded).await;

        assert_eq!(h.controller.playlist(), &[song(1, 10)]);
        assert_eq!(h.controller.selected_index(), Some(0));
        assert!(drain(&mut notifications).contains(&Notification::Error {
            message: "Cannot reach the catalog server.".into(),
        }));
    }

    #[tokio::test]
    async fn refresh_against_unreachable_server_keeps_playlist() {
        let mut h = Harness::new().await;
        h.controller.catalog = CatalogClient::with_client(reqwest::Client::new(), closed_server_url());
        let mut notifications = h.controller.subscribe();
        h.controller.navigator.set_playlist(vec![song(1, 10), song(2, 10)]);

        h.controller.refresh();
        h.pump_until(catalog_loaded).await;

        assert_eq!(h.controller.playlist().len(), 2);
        assert!(drain(&mut notifications)
            .iter()
            .any(|n| matches!(n, Notification::Error { .. })));
    }
}
