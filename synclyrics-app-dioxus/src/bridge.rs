use crate::state::LyricsState;
use dioxus::prelude::*;
use synclyrics_core::{DisplayCommand, EngineHandle, EngineInput, ScrollBehavior};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "synclyrics::bridge";

/// Id of the scrollable lyric container
pub const LYRICS_CONTAINER_ID: &str = "lyrics-container";

/// DOM id of lyric line `index`.
#[must_use]
pub fn line_id(index: usize) -> String {
    format!("lyric-line-{index}")
}

/// Bridge engine display commands to Dioxus signals.
/// This function spawns an async task that listens to the display channel
/// and updates the lyrics state signals, running scroll commands as scripts.
///
/// The engine may have published before this subscription existed, and a
/// lagging receiver loses commands, so both cases ask the engine for a full
/// replay.
pub fn use_display_bridge(
    display_tx: broadcast::Sender<DisplayCommand>,
    engine: EngineHandle,
    state: LyricsState,
) {
    use_future(move || {
        let mut rx = display_tx.subscribe();
        let engine = engine.clone();
        let mut state = state;
        async move {
            request_resync(&engine);
            loop {
                match rx.recv().await {
                    Ok(DisplayCommand::ScrollToLine { index, behavior }) => {
                        run_script(scroll_to_line_script(index, behavior));
                    }
                    Ok(DisplayCommand::ResetScroll) => run_script(reset_scroll_script()),
                    Ok(command) => state.apply(command),
                    Err(broadcast::error::RecvError::Closed) => {
                        info!(target: LOG_TARGET, "Display channel closed");
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(target: LOG_TARGET, "Missed {} display commands, resyncing", n);
                        request_resync(&engine);
                    }
                }
            }
        }
    });
}

fn request_resync(engine: &EngineHandle) {
    if let Err(e) = engine.send(EngineInput::Resync) {
        debug!(target: LOG_TARGET, "Resync not sent: {}", e);
    }
}

fn run_script(js: String) {
    spawn(async move {
        if let Err(e) = document::eval(&js).await {
            debug!(target: LOG_TARGET, "Scroll script failed: {}", e);
        }
    });
}

/// Center line `index` vertically in the lyric container.
///
/// Runs on the next animation frame so a line rendered in the same batch
/// is already laid out.
fn scroll_to_line_script(index: usize, behavior: ScrollBehavior) -> String {
    format!(
        r"
        requestAnimationFrame(() => {{
            const container = document.getElementById('{container}');
            const line = document.getElementById('{line}');
            if (!container || !line) return;
            const top = line.offsetTop - container.clientHeight / 2 + line.clientHeight / 2;
            container.scrollTo({{ top, behavior: '{behavior}' }});
        }});
        ",
        container = LYRICS_CONTAINER_ID,
        line = line_id(index),
        behavior = behavior.as_str(),
    )
}

fn reset_scroll_script() -> String {
    format!(
        r"
        requestAnimationFrame(() => {{
            const container = document.getElementById('{LYRICS_CONTAINER_ID}');
            if (container) container.scrollTo({{ top: 0, behavior: 'instant' }});
        }});
        "
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_script_targets_line() {
        let js = scroll_to_line_script(7, ScrollBehavior::Smooth);
        assert!(js.contains("getElementById('lyric-line-7')"));
        assert!(js.contains("getElementById('lyrics-container')"));
        assert!(js.contains("behavior: 'smooth'"));
    }

    #[test]
    fn test_resize_scroll_is_instant() {
        let js = scroll_to_line_script(0, ScrollBehavior::Instant);
        assert!(js.contains("behavior: 'instant'"));
    }

    #[test]
    fn test_reset_scrolls_to_top() {
        let js = reset_scroll_script();
        assert!(js.contains("top: 0"));
        assert!(js.contains("lyrics-container"));
    }
}
