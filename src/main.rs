fn main() {
    #[cfg(feature = "cli")]
    minidiff::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("minidiff: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
