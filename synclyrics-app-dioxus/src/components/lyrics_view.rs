use crate::bridge::{line_id, LYRICS_CONTAINER_ID};
use crate::state::LyricsState;
use dioxus::prelude::*;
use synclyrics_core::{segments, EngineHandle, EngineInput, LineState, LyricLine, Segment};
use tracing::warn;

/// Scrollable list of every lyric line.
#[component]
pub fn LyricsView() -> Element {
    let state = use_context::<LyricsState>();
    let engine = use_context::<EngineHandle>();

    let lines = state.lines.read().clone();
    let active = *state.active.read();

    let on_resize = move |_: Event<ResizeData>| {
        if let Err(e) = engine.send(EngineInput::Resized) {
            warn!("Failed to report resize: {}", e);
        }
    };

    rsx! {
        div {
            id: LYRICS_CONTAINER_ID,
            class: "lyrics-container",
            onresize: on_resize,

            div { class: "lyrics-spacer" }
            for (index, line) in lines.iter().enumerate() {
                LyricRow {
                    key: "{index}",
                    index,
                    line: line.clone(),
                    state: LineState::of(index, active),
                }
            }
            div { class: "lyrics-spacer" }
        }
    }
}

#[component]
fn LyricRow(index: usize, line: LyricLine, state: LineState) -> Element {
    let class = match state {
        LineState::Active => "lyric-line active",
        LineState::Past => "lyric-line past",
        LineState::Upcoming => "lyric-line",
    };

    let spans = segments(&line.text).into_iter().map(|segment| match segment {
        Segment::Plain(text) => rsx! {
            span { "{text}" }
        },
        Segment::Masked(word) => rsx! {
            span { class: "masked", "{word}" }
        },
    });

    rsx! {
        div {
            id: line_id(index),
            class,
            {spans}
        }
    }
}
