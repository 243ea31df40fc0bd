//! Platform identifiers used by `platforms` restrictions

/// Normalize a platform identifier.
///
/// Lowercases and maps common aliases onto the names Rust reports in
/// `std::env::consts::OS` (`win32` -> `windows`, `darwin` -> `macos`).
pub fn normalize_platform(id: &str) -> String {
    let lowered = id.trim().to_lowercase();
    match lowered.as_str() {
        "win32" | "win" | "win64" => "windows".to_string(),
        "darwin" | "osx" | "mac" => "macos".to_string(),
        _ => lowered,
    }
}

/// Normalized identifier of the host OS
pub fn current_platform() -> String {
    normalize_platform(std::env::consts::OS)
}

/// Check whether a `platforms` list admits the given platform.
///
/// An empty list (after dropping blank entries) admits every platform.
pub fn platform_allowed(platforms: &[String], platform: &str) -> bool {
    let wanted = normalize_platform(platform);
    let mut listed = platforms
        .iter()
        .filter(|p| !p.trim().is_empty())
        .peekable();

    if listed.peek().is_none() {
        return true;
    }
    listed.any(|p| normalize_platform(p) == wanted)
}
