pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type for an uploaded file, keyed on the lowercased text after the last `.`.
///
/// A name without a `.` is looked up as a whole, which never matches.
pub fn content_type_for(filename: &str) -> &'static str {
    let lowered = filename.to_lowercase();
    let extension = lowered.rsplit('.').next().unwrap_or_default();

    match extension {
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "m4a" => "audio/m4a",
        "json" => "application/json",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
