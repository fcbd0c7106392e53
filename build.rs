fn main() {
    // The headless library has nothing to generate; only the desktop shell
    // needs the Tauri context (config, capabilities, icons).
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
