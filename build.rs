use rustc_version::{version_meta, Channel};

fn main() {
    // set the docsrs cfg on nightly toolchains, which gates the doc_auto_cfg
    // attribute in lib.rs for docs.rs style builds
    if version_meta().is_ok_and(|meta| meta.channel == Channel::Nightly) {
        println!("cargo:rustc-cfg=docsrs")
    }
    println!("cargo:rustc-check-cfg=cfg(docsrs)");
}
