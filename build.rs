use std::process::Command;

fn main() {
    let git_hash = capture("git", &["rev-parse", "--short", "HEAD"]);
    println!("cargo:rustc-env=POLLCAST_GIT_HASH={git_hash}");

    let build_date = capture("date", &["-u", "+%Y-%m-%d"]);
    println!("cargo:rustc-env=POLLCAST_BUILD_DATE={build_date}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}

/// Trimmed stdout of a command, or "unknown" if it is unavailable or fails.
fn capture(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
