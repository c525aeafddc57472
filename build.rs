fn main() {
    println!("cargo:rerun-if-env-changed=KETTLE_CONFIG_JSON");

    // ESP-IDF environment is only needed for the device build; host builds
    // (tests, fuzzing) skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
