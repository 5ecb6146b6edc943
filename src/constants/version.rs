use semver::Version;

pub fn get_version() -> String {
    let semver = env!("CARGO_PKG_VERSION").parse::<Version>();

    match semver {
        Ok(semver) => {
            // vergen falls back to this marker when git is unavailable at build time.
            if env!("VERGEN_GIT_SHA") == "VERGEN_IDEMPOTENT_OUTPUT" {
                format!("{semver} - {}", release_name(&semver))
            } else {
                format!(
                    "{semver} - {} [`{}`]",
                    release_name(&semver),
                    short_sha(env!("VERGEN_GIT_SHA"))
                )
            }
        }
        Err(_) => {
            tracing::warn!(
                "couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown."
            );
            String::from("0.0.0-unknown - No Release Name")
        }
    }
}

/// versions are calendar based, so the minor component is the release month.
fn release_name(version: &Version) -> &'static str {
    const MONTHS: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];

    MONTHS
        .get((version.minor as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("Unreleased")
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_name_follows_month() {
        assert_eq!(release_name(&Version::new(2025, 10, 1)), "October");
        assert_eq!(release_name(&Version::new(2025, 0, 1)), "Unreleased");
    }

    #[test]
    fn short_sha_truncates() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }
}
