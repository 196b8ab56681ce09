//! Model module - data types and client-side state
//!
//! - `song`: Song records as served by the catalog
//! - `catalog_client`: HTTP client for the catalog service
//! - `navigator`: Playlist and selection bookkeeping
//! - `playback`: Transport state and position tracking
//! - `types`: UI state and observer notifications

mod song;
mod catalog_client;
mod navigator;
mod playback;
mod types;

pub use song::Song;
pub use catalog_client::CatalogClient;
pub use navigator::PlaylistNavigator;
pub use playback::{PlaybackInfo, PlaybackTiming, TransportState};
pub use types::{ActiveSection, Notification, UiState};
