//! Command: print version information.

/// Version string: the build's `COOK_VERSION`, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("COOK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to stdout.
pub fn run() {
    println!("cook {}", version());
}
