fn main() {
    // Embeds build metadata (git commit, versions) as `built.rs` in OUT_DIR.
    if let Err(err) = built::write_built_file() {
        panic!("Failed to acquire build-time information: {err}");
    }
}
