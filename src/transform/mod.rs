pub mod dimension;
pub mod fact;
pub mod time;
pub mod util;

pub use dimension::{filter_next_song, song_dimensions, time_rows, user_rows};
pub use fact::{build_songplay, resolve_songplay, Resolution};
pub use time::derive_time;
