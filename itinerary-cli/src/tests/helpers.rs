//! Helpers for writing request files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// A hotel and three always-open places, as request JSON.
pub(super) const THREE_PLACE_REQUEST: &str = r#"{
  "places": [
    { "id": "pagoda", "name": "Jade Pagoda", "coordinates": [106.70, 10.79], "priority": 3 },
    { "id": "market", "name": "Ben Thanh Market", "coordinates": [106.71, 10.77], "visitDuration": 45 },
    { "id": "museum", "name": "History Museum", "coordinates": [106.72, 10.78] }
  ],
  "anchor": { "name": "Riverside Hotel", "coordinates": [106.69, 10.77] }
}"#;

pub(super) const SINGLE_PLACE_REQUEST: &str = r#"{
  "places": [
    { "id": "pagoda", "name": "Jade Pagoda", "coordinates": [106.70, 10.79] },
    { "id": "nowhere", "name": "Unmapped Cafe" }
  ],
  "anchor": { "name": "Riverside Hotel", "coordinates": [106.69, 10.77] }
}"#;
