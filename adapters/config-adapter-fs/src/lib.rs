//! Filesystem config store
//!
//! Global blobs live at `<config_dir>/<file>`, instance blobs at
//! `<instance_root>/<instance>/<file>`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::{
	fmt::Debug,
	fs::{File, create_dir_all, read_to_string, remove_file, rename},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};

use rollgate::{
	config_store::{ConfigLocation, ConfigStore, ConfigTier},
	prelude::*,
};

/// Rejects path components that could escape the configured roots
fn check_component(kind: &str, component: &str) -> ClResult<()> {
	let invalid = component.is_empty()
		|| component == "."
		|| component == ".."
		|| component.contains(['/', '\\', '\0']);
	if invalid {
		Err(Error::ConfigError(format!("Invalid {} name: {:?}", kind, component)))?
	}
	Ok(())
}

#[derive(Debug)]
pub struct FsConfigStore {
	config_dir: Box<Path>,
	instance_root: Box<Path>,
}

impl FsConfigStore {
	pub fn new(config_dir: Box<Path>, instance_root: Box<Path>) -> ClResult<Self> {
		create_dir_all(&config_dir)?;
		create_dir_all(&instance_root)?;
		Ok(Self { config_dir, instance_root })
	}

	pub fn config_dir(&self) -> &Path {
		&self.config_dir
	}

	pub fn instance_root(&self) -> &Path {
		&self.instance_root
	}

	/// Calculates the path of a config blob
	pub fn path_of(&self, location: &ConfigLocation) -> ClResult<PathBuf> {
		check_component("file", &location.file_name)?;
		match &location.tier {
			ConfigTier::Global => Ok(self.config_dir.join(&*location.file_name)),
			ConfigTier::Instance(instance) => {
				check_component("instance", instance)?;
				Ok(self.instance_root.join(&**instance).join(&*location.file_name))
			}
		}
	}
}

impl ConfigStore for FsConfigStore {
	fn read(&self, location: &ConfigLocation) -> ClResult<Option<String>> {
		let path = self.path_of(location)?;
		match read_to_string(&path) {
			Ok(content) => Ok(Some(content)),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	/// Writes through a temporary file renamed into place
	fn write(&self, location: &ConfigLocation, content: &str) -> ClResult<()> {
		let path = self.path_of(location)?;
		let Some(dir) = path.parent() else {
			return Err(Error::ConfigError(format!("{} has no parent directory", path.display())));
		};
		create_dir_all(dir)?;

		let tmp_path = dir.join(format!(".{}.tmp", location.file_name));
		let res = (|| {
			let mut file = File::create(&tmp_path)?;
			file.write_all(content.as_bytes())?;
			file.sync_all()?;
			rename(&tmp_path, &path)?;
			Ok::<(), Error>(())
		})();
		if res.is_err() {
			info!("  config write failed, removing tmpfile: {:?}", &tmp_path);
			let _ = remove_file(&tmp_path);
		} else {
			info!("Wrote {}", path.display());
		}
		res
	}
}

// vim: ts=4
