//! Basic config store operation tests
//!
//! Tests blob reads and writes on both config tiers

use rollgate::config_store::{ConfigLocation, ConfigStore, read_or_create};
use rollgate_config_adapter_fs::FsConfigStore;
use tempfile::TempDir;

fn create_test_store() -> (FsConfigStore, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let store = FsConfigStore::new(
		temp_dir.path().join("config").into(),
		temp_dir.path().join("instances").into(),
	)
	.expect("Failed to create store");
	(store, temp_dir)
}

#[test]
fn test_new_creates_roots() {
	let (store, _temp) = create_test_store();
	assert!(store.config_dir().is_dir());
	assert!(store.instance_root().is_dir());
}

#[test]
fn test_read_missing_blob() {
	let (store, _temp) = create_test_store();
	let content = store.read(&ConfigLocation::global("rolling_gate.json")).expect("Read failed");
	assert!(content.is_none());
}

#[test]
fn test_write_and_read_global() {
	let (store, temp) = create_test_store();
	let location = ConfigLocation::global("rolling_gate.json");

	store.write(&location, r#"{"language": "en_us"}"#).expect("Write failed");
	let content = store.read(&location).expect("Read failed");
	assert_eq!(content.as_deref(), Some(r#"{"language": "en_us"}"#));
	assert!(temp.path().join("config/rolling_gate.json").is_file());
}

#[test]
fn test_instance_blobs_are_isolated() {
	let (store, temp) = create_test_store();
	let world1 = ConfigLocation::instance("world1", "rolling_gate.json");
	let world2 = ConfigLocation::instance("world2", "rolling_gate.json");

	store.write(&world1, r#"{"view_distance": 16}"#).expect("Write failed");
	store.write(&world2, r#"{"view_distance": 32}"#).expect("Write failed");

	assert_eq!(store.read(&world1).expect("Read failed").as_deref(), Some(r#"{"view_distance": 16}"#));
	assert_eq!(store.read(&world2).expect("Read failed").as_deref(), Some(r#"{"view_distance": 32}"#));
	assert!(temp.path().join("instances/world1/rolling_gate.json").is_file());
	assert!(store.read(&ConfigLocation::global("rolling_gate.json")).expect("Read failed").is_none());
}

#[test]
fn test_overwrite_leaves_no_tmpfile() {
	let (store, temp) = create_test_store();
	let location = ConfigLocation::global("rolling_gate_client.json");

	store.write(&location, "{}").expect("Write failed");
	store.write(&location, r#"{"a": 1}"#).expect("Overwrite failed");

	assert_eq!(store.read(&location).expect("Read failed").as_deref(), Some(r#"{"a": 1}"#));
	let entries: Vec<_> = std::fs::read_dir(temp.path().join("config"))
		.expect("Failed to list config dir")
		.collect();
	assert_eq!(entries.len(), 1);
}

#[test]
fn test_read_or_create_writes_placeholder() {
	let (store, temp) = create_test_store();
	let location = ConfigLocation::instance("world", "rolling_gate.json");

	let map = read_or_create(&store, &location).expect("read_or_create failed");
	assert!(map.is_empty());
	let written = std::fs::read_to_string(temp.path().join("instances/world/rolling_gate.json"))
		.expect("Placeholder missing");
	assert_eq!(written, "{}");
}

// vim: ts=4
