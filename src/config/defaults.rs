//! Default value functions referenced by the serde derives.

pub(super) fn default_port() -> u16 {
    8765
}

pub(super) fn default_cors_origins() -> String {
    "*".to_string()
}

pub(super) fn default_max_players() -> u8 {
    4
}

pub(super) fn default_min_players() -> u8 {
    2
}

pub(super) fn default_outbound_queue_capacity() -> usize {
    64
}

/// Drawing payloads are opaque strings (typically encoded canvases), so the
/// frame ceiling is generous.
pub(super) fn default_max_message_size() -> usize {
    1024 * 1024
}

pub(super) fn default_color_themes() -> Vec<String> {
    ["Nature", "Space", "Food", "Fantasy", "Animals"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub(super) fn default_prompts() -> Vec<String> {
    [
        "A mythical creature",
        "A dream you had",
        "Your favorite food",
        "A city in the clouds",
        "An alien landscape",
        "A self-portrait as an animal",
        "The meaning of life",
        "A robot in love",
        "A secret garden",
        "Time travel",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub(super) fn default_voting_display_secs() -> u64 {
    10
}

pub(super) fn default_log_dir() -> String {
    "logs".to_string()
}

pub(super) fn default_log_filename() -> String {
    "server.log".to_string()
}

pub(super) fn default_log_rotation() -> String {
    "daily".to_string()
}
