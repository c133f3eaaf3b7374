fn main() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let config = cbindgen::Config::from_file("cbindgen.toml").unwrap_or_default();

    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    if let Ok(bindings) = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        let include_dir = format!("{}/include", crate_dir);
        if std::fs::create_dir_all(&include_dir).is_ok() {
            bindings.write_to_file(format!("{}/spacecal.h", include_dir));
        }
    }
}
