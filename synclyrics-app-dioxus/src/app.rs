use crate::components::{Backdrop, Controls, LyricsView, ProgressBar};
use crate::state::LyricsState;
use dioxus::prelude::*;

const STYLE: &str = include_str!("../assets/style.css");

/// Root application component.
/// Renders the backdrop, track header/footer, lyric list and controls.
#[component]
pub fn App() -> Element {
    let state = use_context::<LyricsState>();

    let title = state.title.read().clone();
    let artist = state.artist.read().clone();
    let show_header = *state.show_header.read();
    let show_progress_bar = *state.show_progress_bar.read();

    rsx! {
        style { "{STYLE}" }
        div { class: "app",
            Backdrop {}

            if show_header {
                header { class: "track-header",
                    h1 { class: "track-title", "{title}" }
                    h2 { class: "track-artist", "{artist}" }
                }
            }

            LyricsView {}

            footer { class: "track-footer",
                if show_header {
                    span { class: "footer-text", "{title} \u{2022} {artist}" }
                }
                Controls {}
            }

            if show_progress_bar {
                ProgressBar {}
            }
        }
    }
}
