mod backdrop;
mod controls;
mod lyrics_view;
mod progress_bar;

pub use backdrop::Backdrop;
pub use controls::Controls;
pub use lyrics_view::LyricsView;
pub use progress_bar::ProgressBar;
