extern crate tonic_build;

fn main() {
    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .type_attribute(
            ".abd.Label",
            "#[derive(Copy, Eq, Hash, Ord, PartialOrd, derive_more::From)]",
        )
        .compile(&["src/protos/abd.proto"], &["src/protos/"])
        .unwrap();

    // https://github.com/hyperium/tonic/blob/master/tonic-build/README.md
}
