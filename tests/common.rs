#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use kioskclock::config::{Config, HOME_ENV, RemoteKind, write_config};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// A kiosk living in a temp directory: config home, database, photo dir
/// and a directory remote seeded with employees.
pub struct TestKiosk {
    pub home: TempDir,
    pub db: String,
    pub remote: PathBuf,
    pub photo: PathBuf,
}

pub fn kiosk() -> TestKiosk {
    let home = tempfile::tempdir().expect("tempdir");
    let remote = home.path().join("remote");
    fs::create_dir_all(&remote).expect("remote dir");

    fs::write(
        remote.join("employees.json"),
        json!([
            { "employeeID": "E1", "firstName": "Ana", "lastName": "Cruz", "pin": "123456", "store": "Main" },
            { "employeeID": "E2", "firstName": "", "lastName": "", "pin": "222222", "store": "Main" },
            { "employeeID": "E9", "firstName": "Old", "lastName": "Hand", "pin": "999999", "employedStatus": false }
        ])
        .to_string(),
    )
    .expect("employees.json");

    let photo = home.path().join("shot.jpg");
    fs::write(&photo, JPEG).expect("photo");

    let k = TestKiosk {
        db: home.path().join("kiosk.sqlite").to_string_lossy().to_string(),
        remote,
        photo,
        home,
    };
    k.configure(|_| {});
    k
}

impl TestKiosk {
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("kioskclock");
        cmd.env(HOME_ENV, self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("KIOSKCLOCK_LOG");
        cmd
    }

    /// Rewrite the config file, starting from the test defaults.
    pub fn configure(&self, tweak: impl FnOnce(&mut Config)) {
        let mut cfg = Config::default();
        cfg.database = self.db.clone();
        cfg.photo_dir = self.photo_dir().to_string_lossy().to_string();
        cfg.remote.kind = RemoteKind::Dir;
        cfg.remote.path = Some(self.remote.to_string_lossy().to_string());
        tweak(&mut cfg);

        write_config(&self.home.path().join("kioskclock.conf"), &cfg).expect("write config");
    }

    pub fn photo_dir(&self) -> PathBuf {
        self.home.path().join("photos")
    }

    /// Records written to the directory remote, oldest first.
    pub fn records(&self) -> Vec<Value> {
        let path = self.remote.join("logs.jsonl");
        if !path.exists() {
            return Vec::new();
        }
        fs::read_to_string(path)
            .expect("read logs")
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect()
    }

    pub fn blob(&self, key: &str) -> PathBuf {
        self.remote.join("blobs").join(key)
    }

    /// Make the remote unreachable, as if the share were unmounted.
    pub fn go_offline(&self) {
        fs::rename(&self.remote, self.parked()).expect("park remote");
    }

    pub fn go_online(&self) {
        fs::rename(self.parked(), &self.remote).expect("restore remote");
    }

    fn parked(&self) -> PathBuf {
        self.home.path().join("remote.offline")
    }

    pub fn staged_photos(&self) -> Vec<PathBuf> {
        list_files(&self.photo_dir())
    }
}

pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}
