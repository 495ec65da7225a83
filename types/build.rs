fn main() {
    println!("cargo:rerun-if-changed=proto/apsp.proto");
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path().expect("No bundled protoc for this host");
        std::env::set_var("PROTOC", protoc);
    }
    prost_build::compile_protos(&["proto/apsp.proto"], &["proto/"])
        .expect("Failed to compile proto/apsp.proto");
}
