//! Build script for proto compilation.
//!
//! Compiles `proto/provider.proto` (the Hemmer provider protocol) into the
//! `generated` module. A vendored `protoc` is used unless `PROTOC` is already
//! set, so building does not require a system protobuf installation.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    // The client half is only used by the in-process gRPC tests.
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/provider.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/provider.proto");

    Ok(())
}
