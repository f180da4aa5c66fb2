//! End-to-end connector installation scenarios: register a connector,
//! extract its package into the version-specific install directory, and
//! verify the registry and disk agree afterwards.

use std::io::{Cursor, Write};

use connector_package::{ConnectorMetadata, ConnectorPackage};
use connector_registry::{ConnectorRegistry, ConnectorSettings, FileRegistry, InMemoryRegistry};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use zip::write::SimpleFileOptions;

fn build_package_archive(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap()
}

#[tokio::test]
async fn register_lookup_remove_round_trip() {
    let cancel = CancellationToken::new();
    let mut registry = InMemoryRegistry::new();

    let settings = ConnectorSettings::new("Reductech.Connectors.Nuix", "1.0.0");
    registry.add("nuix", settings.clone(), &cancel).await.unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.try_get_settings("nuix"), Some(&settings));
    assert!(registry.contains_id("Reductech.Connectors.Nuix"));
    assert!(registry.contains_version_string("Reductech.Connectors.Nuix", "1.0.0"));

    assert!(registry.remove("nuix", &cancel).await.unwrap());
    assert_eq!(registry.len(), 0);
    assert!(!registry.contains_id("Reductech.Connectors.Nuix"));
}

#[tokio::test]
async fn install_package_into_version_directory() {
    let temp = TempDir::new().unwrap();
    let connector_root = temp.path().join("connectors");
    let registry_path = temp.path().join("connectors.json");
    let cancel = CancellationToken::new();

    let mut registry = FileRegistry::create(&registry_path, []).await.unwrap();

    let metadata = ConnectorMetadata::new("Reductech.Connectors.Nuix", "1.0.0");
    let mut package = ConnectorPackage::new(
        metadata.clone(),
        build_package_archive(&[
            ("Reductech.Connectors.Nuix.dll", "assembly bytes"),
            ("lib/Dependency.dll", "dependency bytes"),
        ]),
    )
    .unwrap();

    let destination = metadata.install_path(&connector_root);
    package.extract(&destination, &cancel).await.unwrap();

    registry
        .add(
            "nuix",
            ConnectorSettings::new(metadata.id.clone(), metadata.version.clone()),
            &cancel,
        )
        .await
        .unwrap();

    // Disk and registry agree on the installed identity.
    assert!(
        destination.join("Reductech.Connectors.Nuix.dll").exists(),
        "connector assembly missing from install dir"
    );
    assert!(destination.join("lib/Dependency.dll").exists());
    assert!(registry.contains_version_string(&metadata.id, &metadata.version));

    // The persisted document survives a reload with the same view.
    let reloaded = FileRegistry::load(&registry_path).await.unwrap();
    assert!(reloaded.contains("nuix"));
    assert_eq!(
        reloaded.get("nuix").unwrap().id,
        "Reductech.Connectors.Nuix"
    );

    // The document on disk is plain name-keyed JSON.
    let raw = std::fs::read_to_string(&registry_path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["nuix"]["version"], "1.0.0");
}

#[tokio::test]
async fn side_by_side_versions_share_an_id() {
    let temp = TempDir::new().unwrap();
    let connector_root = temp.path().join("connectors");
    let cancel = CancellationToken::new();
    let mut registry = InMemoryRegistry::new();

    for version in ["1.0.0", "2.0.0"] {
        let metadata = ConnectorMetadata::new("Example.Connector", version);
        let mut package = ConnectorPackage::new(
            metadata.clone(),
            build_package_archive(&[("Example.Connector.dll", version)]),
        )
        .unwrap();
        package
            .extract(&metadata.install_path(&connector_root), &cancel)
            .await
            .unwrap();

        registry
            .add(
                &format!("example-{version}"),
                ConnectorSettings::new("Example.Connector", version),
                &cancel,
            )
            .await
            .unwrap();
    }

    // Both physical versions are resolvable; each name binds exactly one.
    assert!(connector_root
        .join("Example.Connector/1.0.0/Example.Connector.dll")
        .exists());
    assert!(connector_root
        .join("Example.Connector/2.0.0/Example.Connector.dll")
        .exists());
    assert_eq!(registry.try_get_settings_by_id("Example.Connector").len(), 2);
    assert!(registry.contains_version_string("Example.Connector", "1.0.0"));
    assert!(registry.contains_version_string("Example.Connector", "2.0.0"));
}

#[tokio::test]
async fn reinstalling_the_same_package_converges() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();

    let metadata = ConnectorMetadata::new("Example.Connector", "1.0.0");
    let archive = build_package_archive(&[("Example.Connector.dll", "bytes")]);
    let destination = metadata.install_path(temp.path());

    let mut package = ConnectorPackage::new(metadata.clone(), archive.clone()).unwrap();
    package.extract(&destination, &cancel).await.unwrap();

    // A second download of the same package extracts over the first.
    let mut package = ConnectorPackage::new(metadata, archive).unwrap();
    package.extract(&destination, &cancel).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(destination.join("Example.Connector.dll")).unwrap(),
        "bytes"
    );
}

#[tokio::test]
async fn malicious_package_cannot_escape_install_directory() {
    let temp = TempDir::new().unwrap();
    let connector_root = temp.path().join("connectors");
    let cancel = CancellationToken::new();

    let metadata = ConnectorMetadata::new("Evil.Connector", "1.0.0");
    let mut package = ConnectorPackage::new(
        metadata.clone(),
        build_package_archive(&[("../../../outside.txt", "pwned")]),
    )
    .unwrap();

    let err = package
        .extract(&metadata.install_path(&connector_root), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, connector_package::Error::UnsafePath { .. }));
    assert!(!temp.path().join("outside.txt").exists());
}
