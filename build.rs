use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_output("git", &["rev-parse", "--short", "HEAD"])
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let status = match command_output("git", &["status", "--porcelain"]) {
        Some(s) if s.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let rustc = command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string());

    let vars = [
        ("HASH", hash),
        ("STATUS", status.to_string()),
        ("TIMESTAMP", timestamp),
        ("TARGET", env::var("TARGET").unwrap_or_else(|_| "unknown-target".into())),
        ("PROFILE", env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into())),
        ("RUSTC", rustc),
    ];
    for (key, value) in vars {
        println!("cargo:rustc-env=SALESBOARD_BUILD_{key}={value}");
    }
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
