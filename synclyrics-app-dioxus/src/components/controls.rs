use crate::state::LyricsState;
use dioxus::desktop::tao::window::{Fullscreen, Window};
use dioxus::desktop::use_window;
use dioxus::prelude::*;
use synclyrics_core::{EngineHandle, EngineInput, SyncConfig};
use tracing::warn;

/// Offset, game mode, visibility and fullscreen controls.
#[component]
pub fn Controls() -> Element {
    let mut state = use_context::<LyricsState>();
    let engine = use_context::<EngineHandle>();
    let step = use_context::<SyncConfig>().offset_step_secs();
    let desktop = use_window();

    let offset = *state.manual_offset.read();
    let game_mode = *state.game_mode.read();
    let show_header = *state.show_header.read();
    let show_progress_bar = *state.show_progress_bar.read();

    let adjust = {
        let engine = engine.clone();
        move |delta: f64| {
            if dispatch(&engine, EngineInput::AdjustOffset(delta)) {
                state.manual_offset += delta;
            }
        }
    };
    let mut earlier = adjust.clone();
    let mut later = adjust;

    let on_game_mode = {
        let engine = engine.clone();
        move |evt: FormEvent| {
            dispatch(&engine, EngineInput::SetGameMode(evt.checked()));
        }
    };

    let on_header = {
        let engine = engine.clone();
        move |evt: FormEvent| {
            dispatch(
                &engine,
                EngineInput::UpdateVisibility {
                    show_header: evt.checked(),
                    show_progress_bar: *state.show_progress_bar.peek(),
                },
            );
        }
    };

    let on_progress = move |evt: FormEvent| {
        dispatch(
            &engine,
            EngineInput::UpdateVisibility {
                show_header: *state.show_header.peek(),
                show_progress_bar: evt.checked(),
            },
        );
    };

    let toggle_fullscreen = move |_: MouseEvent| {
        let window: &Window = &desktop;
        if window.fullscreen().is_some() {
            window.set_fullscreen(None);
        } else if let Some(monitor) = window.current_monitor() {
            window.set_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        } else {
            warn!("Cannot enter fullscreen: no monitor found for the window");
        }
    };

    rsx! {
        div { class: "controls",
            div { class: "offset",
                button { onclick: move |_| earlier(-step), "-{step:.1}s" }
                span { class: "offset-value", "{offset:+.1}s" }
                button { onclick: move |_| later(step), "+{step:.1}s" }
            }
            label {
                input { r#type: "checkbox", checked: game_mode, oninput: on_game_mode }
                "Game mode"
            }
            label {
                input { r#type: "checkbox", checked: show_header, oninput: on_header }
                "Header"
            }
            label {
                input { r#type: "checkbox", checked: show_progress_bar, oninput: on_progress }
                "Progress"
            }
            button { onclick: toggle_fullscreen, "Fullscreen" }
        }
    }
}

/// Queue `input` for the engine, logging if it has stopped.
fn dispatch(engine: &EngineHandle, input: EngineInput) -> bool {
    match engine.send(input) {
        Ok(()) => true,
        Err(e) => {
            warn!("Dropped user action: {}", e);
            false
        }
    }
}
