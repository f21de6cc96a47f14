// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    // built only provides git information with the git2 feature, which we can't use
    let version = git_output(&["describe", "--match", "v[0-9]*", "--tags", "HEAD"])
        .map(|v| v.trim_start_matches('v').to_string())
        .or_else(|| git_output(&["rev-parse", "--short", "HEAD"]));
    let dirty = git_output(&["diff-index", "--name-only", "HEAD", "--"])
        .map(|changes| !changes.is_empty())
        .unwrap_or_default();

    let out_dir = env::var("OUT_DIR").unwrap();
    let mut code = String::from("// Git information generated at build time\n");
    match version {
        Some(v) => code.push_str(&format!(
            "pub const GIT_VERSION: Option<&'static str> = Some(\"{v}\");\n"
        )),
        None => code.push_str("pub const GIT_VERSION: Option<&'static str> = None;\n"),
    }
    if dirty {
        code.push_str("pub const GIT_DIRTY: Option<bool> = Some(true);\n");
    } else {
        code.push_str("pub const GIT_DIRTY: Option<bool> = None;\n");
    }
    fs::write(Path::new(&out_dir).join("git_built.rs"), code).unwrap();

    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// Run a git command and return its trimmed stdout if successful.
fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
