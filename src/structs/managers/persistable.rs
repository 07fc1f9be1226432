use std::fs::{self, File};
use std::io::BufReader;

use rmp_serde::Serializer;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::IoError;
use crate::utils::{create_directories_if_needed, file_exists};

/* Stores (instruments, prices, rates) are opened once per run from a MessagePack file
and written back with `save`, or when dropped if they are persistent */
pub trait Persistable: Serialize + DeserializeOwned {
    const PATH: &'static str;

    fn new(path: Option<String>) -> Result<Self, IoError>
    where
        Self: Sized,
    {
        Self::_new(path, true)
    }

    /* In-memory store, never written to disk */
    fn new_non_persistent() -> Result<Self, IoError>
    where
        Self: Sized,
    {
        Self::_new(None, false)
    }

    fn _new(path: Option<String>, persist: bool) -> Result<Self, IoError>
    where
        Self: Sized,
    {
        let path = path.unwrap_or(Self::PATH.to_string());
        if !persist || !file_exists(&path) {
            return Ok(Self::default_new(path, persist));
        }
        debug!("Loading store {path}");
        let file = File::open(&path).map_err(|e| IoError::new(format!("{path}: {e}")))?;
        let mut loaded: Self = rmp_serde::from_read(BufReader::new(file))
            .map_err(|e| IoError::new(format!("{path}: {e}")))?;
        loaded.attach(path, persist);
        Ok(loaded)
    }

    fn save(&self) -> Result<(), IoError> {
        if !self.is_persistent() {
            return Ok(());
        }
        let path = self.get_path();
        create_directories_if_needed(path);
        let file = File::create(path).map_err(|e| IoError::new(format!("{path}: {e}")))?;
        let mut writer = Serializer::new(file);
        self.serialize(&mut writer)
            .map_err(|e| IoError::new(e.to_string()))?;
        debug!("Saved store {path}");
        Ok(())
    }

    fn delete(&self) -> Result<(), IoError> {
        let path = self.get_path();
        if file_exists(path) {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn get_path(&self) -> &str;

    /* Path and persistence flag are not serialized, they are set again after loading */
    fn attach(&mut self, path: String, persist: bool);

    /* Empty store */
    fn default_new(path: String, persist: bool) -> Self;

    fn is_persistent(&self) -> bool;
}
