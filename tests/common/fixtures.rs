//! Test fixtures - reusable configuration for tests.

/// One local target mirroring `**/*.txt` into `out/`
pub const LOCAL_MIRROR_CONFIG: &str = r#"
[workspace]
name = "site"

[[targets]]
name = "mirror"
type = "local"
dir = "out"
files = "**/*.txt"
exclude = "out/**"
"#;

/// Two local targets, one restricted to another platform
pub const PLATFORM_CONFIG: &str = r#"
[workspace]
name = "site"

[settings]
platform = "linux"

[[targets]]
name = "everywhere"
type = "local"
dir = "out/all"
files = "**/*.txt"
exclude = "out/**"

[[targets]]
name = "windows-only"
type = "local"
dir = "out/win"
files = "**/*.txt"
exclude = "out/**"
platforms = ["win32"]
"#;
