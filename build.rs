fn main() {
    // Emits the ESP-IDF link/include environment when building for the
    // device; a no-op for host-side test builds.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
