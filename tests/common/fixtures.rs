//! Archive fixtures and mock archive hosts

use modpack_dl::{Catalog, Config};
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Source name used by the mock catalog
pub const SOURCE: &str = "Mock";
/// Version name used by the mock catalog
pub const VERSION: &str = "1.21";

/// Build an in-memory ZIP archive with the given entries
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Deflated);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A realistic three-archive modpack: config, mods, resource packs
pub fn modpack_archives() -> Vec<(&'static str, Vec<u8>)> {
    let big_mod: Vec<u8> = (0..300_000u32).map(|i| (i % 253) as u8).collect();
    vec![
        (
            "/config",
            zip_bytes(&[
                ("config/sodium-options.json", br#"{"quality":"fancy"}"#),
                ("config/iris/shaders.properties", b"enabled=true"),
            ]),
        ),
        (
            "/mods",
            zip_bytes(&[
                ("mods/sodium-0.5.jar", big_mod.as_slice()),
                ("mods/lithium-0.12.jar", b"lithium"),
            ]),
        ),
        (
            "/resourcepacks",
            zip_bytes(&[("resourcepacks/faithful-32x.zip", b"textures")]),
        ),
    ]
}

/// Serve each archive at its path on a fresh mock server
pub async fn serve_archives(archives: &[(&str, Vec<u8>)]) -> MockServer {
    let server = MockServer::start().await;
    for (route, body) in archives {
        Mock::given(method("GET"))
            .and(path(*route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;
    }
    server
}

/// Config whose catalog points at `routes` on `server`, in order
pub fn config_for(server: &MockServer, routes: &[&str]) -> Config {
    let mut catalog = Catalog::empty();
    catalog.insert(
        SOURCE,
        VERSION,
        routes
            .iter()
            .map(|route| format!("{}{}", server.uri(), route))
            .collect(),
    );
    Config {
        catalog,
        ..Config::default()
    }
}
