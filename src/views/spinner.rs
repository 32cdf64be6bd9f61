use std::time::Instant;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MS: u128 = 80;

/// Braille spinner frame for the time elapsed since `start`.
pub fn spinner_frame(start: Instant) -> &'static str {
    frame_at(start.elapsed().as_millis())
}

fn frame_at(elapsed_ms: u128) -> &'static str {
    FRAMES[(elapsed_ms / FRAME_MS) as usize % FRAMES.len()]
}

/// Pin every spinner frame in rendered text to the first one.
#[cfg(test)]
pub fn mask_frames(text: &str) -> String {
    text.chars()
        .map(|c| {
            if FRAMES.iter().any(|f| f.starts_with(c)) {
                '⠋'
            } else {
                c
            }
        })
        .collect()
}
