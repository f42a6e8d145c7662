// ─── Platform Helpers ───

use std::borrow::Cow;

/// Host operating system, as relevant to package filtering and shell
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    FreeBsd,
    Other,
}

impl HostOs {
    /// Substrings that mark a package name as specific to this OS.
    fn marker_substrings(self) -> &'static [&'static str] {
        match self {
            HostOs::Windows => &["windows", "win32", "win64"],
            HostOs::MacOs => &["macosx", "macos", "mac os", "osx"],
            HostOs::Linux => &["linux"],
            HostOs::FreeBsd => &["freebsd"],
            HostOs::Other => &[],
        }
    }
}

pub fn host_os() -> HostOs {
    if cfg!(target_os = "windows") {
        HostOs::Windows
    } else if cfg!(target_os = "macos") {
        HostOs::MacOs
    } else if cfg!(target_os = "linux") {
        HostOs::Linux
    } else if cfg!(target_os = "freebsd") {
        HostOs::FreeBsd
    } else {
        HostOs::Other
    }
}

const ALL_KNOWN: [HostOs; 4] = [HostOs::Windows, HostOs::MacOs, HostOs::Linux, HostOs::FreeBsd];

/// Whether a package may be installed on this host. Packages are assumed
/// portable unless their name embeds another operating system's marker.
pub fn mod_valid_for_host(mod_name: &str) -> bool {
    let host = host_os();
    if host == HostOs::Other {
        return true;
    }

    let lower = mod_name.to_lowercase();
    for os in ALL_KNOWN {
        if os == host {
            continue;
        }
        if os.marker_substrings().iter().any(|m| lower.contains(m)) {
            return false;
        }
    }
    true
}

/// Replace runs of invalid file-name characters with a single underscore.
pub fn sanitize_file_name(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut in_run = false;
    for c in candidate.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Surround a path with quotes when it contains spaces, for shell command
/// assembly.
pub fn quote_path_if_needed(path: &str) -> Cow<'_, str> {
    if path.contains(' ') {
        Cow::Owned(format!("\"{path}\""))
    } else {
        Cow::Borrowed(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portable_names_are_valid_everywhere() {
        assert!(mod_valid_for_host("Graphics Upgrade Pack"));
        assert!(mod_valid_for_host("Core Assets 2.0"));
    }

    #[test]
    fn foreign_os_markers_are_excluded() {
        if cfg!(target_os = "linux") {
            assert!(!mod_valid_for_host("Launcher (Windows)"));
            assert!(!mod_valid_for_host("Sound Pack OSX"));
            assert!(mod_valid_for_host("Launcher (Linux)"));
        }
        if cfg!(target_os = "windows") {
            assert!(!mod_valid_for_host("Launcher (Linux)"));
            assert!(mod_valid_for_host("Launcher (Windows)"));
        }
    }

    #[test]
    fn sanitizes_runs_of_invalid_characters() {
        assert_eq!(sanitize_file_name("My Mod: The Sequel!"), "My_Mod_The_Sequel_");
        assert_eq!(sanitize_file_name("  already_fine.txt  "), "already_fine.txt");
    }

    #[test]
    fn quotes_only_paths_with_spaces() {
        assert_eq!(quote_path_if_needed("/opt/games/dest"), "/opt/games/dest");
        assert_eq!(
            quote_path_if_needed("C:\\Program Files\\Game"),
            "\"C:\\Program Files\\Game\""
        );
    }
}
