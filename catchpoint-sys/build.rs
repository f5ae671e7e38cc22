//! Build script for catchpoint-sys
//!
//! This script compiles the C checkpoint shim.

fn main() {
	// Inform Cargo that if the shim changes, it should rerun this build script
	println!("cargo:rerun-if-changed=src/checkpoint.c");
	println!("cargo:rerun-if-changed=src/checkpoint.h");

	let mut build = cc::Build::new();

	build.file("src/checkpoint.c").flag_if_supported("-fPIC");

	if std::env::var("PROFILE").unwrap() == "debug" {
		build.flag_if_supported("-g");
	}

	build.compile("catchpoint_shim");
}
