//! Path glob matching for configuration scopes
//!
//! Supports `*` (within one path segment), `**` (across segments) and `?`.
//! Paths are expected with `/` separators, relative to the workspace root.

/// Case policy for comparing literal glob characters against a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    /// Windows paths compare case-insensitively, everything else exactly
    pub fn platform() -> Self {
        if cfg!(windows) {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        }
    }

    fn eq(self, a: u8, b: u8) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => a.eq_ignore_ascii_case(&b),
        }
    }
}

/// Match `path` against `glob` using the platform case policy
pub fn glob_match(glob: &str, path: &str) -> bool {
    glob_match_with(glob, path, CaseSensitivity::platform())
}

/// Match `path` against `glob` with an explicit case policy
pub fn glob_match_with(glob: &str, path: &str, case: CaseSensitivity) -> bool {
    let (glob, path) = (glob.as_bytes(), path.as_bytes());
    fast_path(glob, path, case).unwrap_or_else(|| slow_path(glob, path, case))
}

/// Scope check used by configurations.
///
/// A glob without any directory separator applies at every depth, so
/// `*.log` behaves like `**/*.log`.
pub fn scope_matches(glob: &str, path: &str) -> bool {
    if glob.contains('/') || glob.contains('\\') {
        glob_match(glob, path)
    } else {
        glob_match(&format!("**/{glob}"), path)
    }
}

fn is_separator(b: u8) -> bool {
    b == b'/' || (cfg!(windows) && b == b'\\')
}

// `**/*.ext` and `**/name` reduce to a suffix comparison.
fn fast_path(glob: &[u8], path: &[u8], case: CaseSensitivity) -> Option<bool> {
    let mut suffix = glob.strip_prefix(b"**/")?;

    let mut needs_dir_anchor = true;
    if let Some(rest) = suffix.strip_prefix(b"*") {
        suffix = rest;
        needs_dir_anchor = false;
    }

    if suffix.is_empty() || suffix.iter().any(|&b| b == b'*' || b == b'?' || b == b'/') {
        return None;
    }

    if path.len() < suffix.len() {
        return Some(false);
    }

    let tail = &path[path.len() - suffix.len()..];
    let same = tail.iter().zip(suffix).all(|(&a, &b)| case.eq(a, b));
    Some(
        same && (!needs_dir_anchor
            || path.len() == suffix.len()
            || is_separator(path[path.len() - suffix.len() - 1])),
    )
}

// Backtracking matcher after https://research.swtch.com/glob
fn slow_path(glob: &[u8], path: &[u8], case: CaseSensitivity) -> bool {
    let (mut gi, mut pi) = (0, 0);
    // Restart points (glob index, path index) for the latest `*` and `**`.
    let mut star: Option<(usize, usize)> = None;
    let mut double_star: Option<(usize, usize)> = None;

    while gi < glob.len() || pi < path.len() {
        if gi < glob.len() {
            match glob[gi] {
                b'?' => {
                    if pi < path.len() && !is_separator(path[pi]) {
                        gi += 1;
                        pi += 1;
                        continue;
                    }
                }
                b'*' => {
                    if glob.get(gi + 1) == Some(&b'*') {
                        let skip = if glob.get(gi + 2) == Some(&b'/') { 3 } else { 2 };
                        double_star = Some((gi, pi + 1));
                        gi += skip;
                    } else {
                        star = Some((gi, pi + 1));
                        gi += 1;
                    }
                    continue;
                }
                c => {
                    if pi < path.len() && case.eq(path[pi], c) {
                        gi += 1;
                        pi += 1;
                        continue;
                    }
                }
            }
        }

        // A single star never swallows a separator.
        if let Some((g, p)) = star {
            if p <= path.len() && !is_separator(path[p - 1]) {
                gi = g;
                pi = p;
                continue;
            }
        }

        if let Some((g, p)) = double_star {
            if p <= path.len() {
                gi = g;
                pi = p;
                continue;
            }
        }

        return false;
    }

    true
}
