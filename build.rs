fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    // `git describe` gives "v0.1.0" on a tag and "v0.1.0-3-gabc1234" past it;
    // --always falls back to the bare short hash when no tag exists yet.
    let describe = std::process::Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    println!("cargo:rustc-env=FOCAL_STATS_DESCRIBE={describe}");
}
