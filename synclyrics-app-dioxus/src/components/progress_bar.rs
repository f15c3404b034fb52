use crate::state::LyricsState;
use dioxus::prelude::*;

/// Thin bar along the bottom edge showing song progress.
#[component]
pub fn ProgressBar() -> Element {
    let state = use_context::<LyricsState>();
    let percent = *state.progress.read();

    rsx! {
        div { class: "progress-bar",
            div { class: "progress-fill", style: "width: {percent:.2}%;" }
        }
    }
}
