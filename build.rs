fn main() {
    println!("cargo:rerun-if-changed=menus/Menu.json");
    println!("cargo:rerun-if-changed=config/rig.json");

    // Host builds (tests, fuzzing) have no ESP-IDF toolchain to describe.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
