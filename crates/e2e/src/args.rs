//! Command-line cleanup for the `harness = false` entry point
//!
//! `cargo test` forwards libtest flags (`--nocapture`, `--test-threads 4`,
//! a name filter, ...) to every test binary. Only those are dropped here, so
//! a misspelled harness flag still reaches clap and fails loudly.

use tracing::warn;

/// libtest flags that take a value, inline (`--color=never`) or as the next
/// argument
const VALUE_FLAGS: &[&str] = &[
    "--test-threads",
    "--color",
    "--format",
    "--logfile",
    "--skip",
    "--report-time",
    "-Z",
];

/// libtest flags without a value
const BARE_FLAGS: &[&str] = &[
    "--nocapture",
    "--show-output",
    "--quiet",
    "-q",
    "--exact",
    "--ignored",
    "--include-ignored",
    "--list",
    "--bench",
    "--test",
    "--force-run-in-process",
    "--ensure-time",
];

/// Remove the libtest flags and positional test-name filters from `args`.
/// The first element (the program name) is kept as is.
pub fn strip_libtest_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut kept: Vec<String> = args.next().into_iter().collect();
    let mut expects_value = false;

    while let Some(arg) = args.next() {
        if BARE_FLAGS.contains(&arg.as_str()) {
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        if let Some((flag, _)) = arg.split_once('=') {
            if VALUE_FLAGS.contains(&flag) {
                continue;
            }
        }

        if arg.starts_with('-') {
            // harness option; a following non-flag argument belongs to it
            expects_value = !arg.contains('=');
            kept.push(arg);
        } else if expects_value {
            expects_value = false;
            kept.push(arg);
        } else {
            warn!("Ignoring test name filter '{}'; use --name or --tag", arg);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(args: &[&str]) -> Vec<String> {
        strip_libtest_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_drops_libtest_flags() {
        assert_eq!(
            strip(&[
                "e2e",
                "--nocapture",
                "--test-threads",
                "4",
                "--color=never",
                "-q",
                "--format",
                "pretty",
            ]),
            vec!["e2e"]
        );
    }

    #[test]
    fn test_keeps_harness_flags_and_values() {
        assert_eq!(
            strip(&["e2e", "--tag", "location", "--nocapture", "-n", "form3-submit"]),
            vec!["e2e", "--tag", "location", "-n", "form3-submit"]
        );
        assert_eq!(
            strip(&["e2e", "--output=/tmp/out", "--exact"]),
            vec!["e2e", "--output=/tmp/out"]
        );
    }

    #[test]
    fn test_misspelled_flag_is_kept_for_clap() {
        assert_eq!(
            strip(&["e2e", "--tagg", "smoke"]),
            vec!["e2e", "--tagg", "smoke"]
        );
    }

    #[test]
    fn test_drops_name_filter() {
        assert_eq!(strip(&["e2e", "form2", "--ignored"]), vec!["e2e"]);
    }

    #[test]
    fn test_empty_args() {
        assert!(strip(&[]).is_empty());
    }
}
