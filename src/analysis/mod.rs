//! The six analyzers.
//!
//! Each one is a pure function over immutable input slices. None of them reads
//! another analyzer's output, so they can run in any order or in parallel and
//! still produce the same rows in the same order.

pub mod avg_listen;
pub mod favorite_genre;
pub mod loyalty;
pub mod night_owl;
pub mod recommend;
pub mod top_songs;

pub use avg_listen::{avg_listen_time, AvgListenTime};
pub use favorite_genre::{favorite_genres, FavoriteGenre};
pub use loyalty::{loyalty_scores, LoyaltyScore};
pub use night_owl::{night_owls, NightOwl};
pub use recommend::{recommend, Recommendation};
pub use top_songs::{top_songs, week_start, TopSong};

use std::cmp::Ordering;

/// Descending by a float, NaN-safe. Used for the score-ordered reports.
pub(crate) fn desc_f64(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
