use crate::state::LyricsState;
use dioxus::prelude::*;
use synclyrics_core::{Background, CinemaGeometry};

const VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".webm", ".ogg", ".mov"];

/// Album art or cinema media behind the lyrics.
#[component]
pub fn Backdrop() -> Element {
    let state = use_context::<LyricsState>();
    let background = state.background.read().clone();

    match background {
        Background::None => rsx! {},
        Background::Artwork { url } => rsx! {
            div {
                class: "backdrop artwork",
                style: "background-image: url('{url}');",
            }
        },
        Background::Cinema { url, geometry } => {
            let style = cinema_style(&geometry);
            rsx! {
                div { class: "backdrop cinema", style,
                    if is_video(&url) {
                        video {
                            class: "cinema-screen",
                            src: "{url}",
                            autoplay: true,
                            muted: true,
                            r#loop: true,
                        }
                    } else {
                        img { class: "cinema-screen", src: "{url}" }
                    }
                }
            }
        }
    }
}

/// CSS custom properties consumed by `.cinema` in the stylesheet.
fn cinema_style(geometry: &CinemaGeometry) -> String {
    format!(
        "--cinema-width: {}%; --cinema-height: {}%; --cinema-opacity: {};",
        geometry.screen_width, geometry.screen_height, geometry.screen_opacity
    )
}

fn is_video(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
