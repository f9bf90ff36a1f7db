pub fn print_version_info() {
    println!("hlmdl {}", env!("CARGO_PKG_VERSION"));

    // Packagers can stamp the build with these
    if let Some(info) = option_env!("HLMDL_BUILD_COMMIT_HASH") {
        println!("build commit: {}", info);
    }
    if let Some(info) = option_env!("HLMDL_BUILD_COMMIT_DATE") {
        println!("build commit date: {}", info);
    }
}
