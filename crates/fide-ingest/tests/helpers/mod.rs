//! Test helpers for sync integration tests
//!
//! - A mock feed server serving a zipped players list
//! - Scratch working directory and sync configuration
//! - Feed and record builders

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use fide_common::store::DatasetStore;
use fide_common::PlayerRecord;
use fide_ingest::SyncConfig;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const ARCHIVE_NAME: &str = "players_list_xml.zip";
pub const DATA_FILE_NAME: &str = "players_list_xml_foa.xml";

/// Mock feed plus a scratch directory holding database and digest
pub struct TestFeed {
    pub server: MockServer,
    pub dir: TempDir,
}

impl TestFeed {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Serve `body` as the archive for every request
    pub async fn serve_archive(&self, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", ARCHIVE_NAME)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&self.server)
            .await;
    }

    /// Serve the archive at most `times` times with the given body
    pub async fn serve_archive_times(&self, body: Vec<u8>, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", ARCHIVE_NAME)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn serve_status(&self, status: u16) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub fn config(&self) -> SyncConfig {
        SyncConfig::builder()
            .base_url(self.server.uri())
            .work_dir(self.dir.path())
            .database_path(self.database_path())
            .hash_file(self.hash_path())
            .max_retries(1)
            .timeout_secs(5)
            .show_progress(false)
            .build()
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join("fide_ratings.db")
    }

    pub fn hash_path(&self) -> PathBuf {
        self.dir.path().join("last_hash.txt")
    }

    pub async fn store(&self) -> DatasetStore {
        DatasetStore::open(self.database_path())
            .await
            .expect("Failed to open store")
    }

    pub fn stored_digest(&self) -> Option<String> {
        std::fs::read_to_string(self.hash_path()).ok()
    }
}

pub fn zip_entries(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Zipped feed containing the given players under the expected entry name
pub fn feed_archive(players: &[PlayerRecord]) -> Vec<u8> {
    zip_entries(&[(DATA_FILE_NAME, &feed_xml(players))])
}

pub fn feed_xml(players: &[PlayerRecord]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<playerslist>\n");
    for p in players {
        xml.push_str(&player_xml(p));
    }
    xml.push_str("</playerslist>\n");
    xml
}

pub fn player_xml(p: &PlayerRecord) -> String {
    format!(
        "<player><fideid>{}</fideid><name>{}</name><country>{}</country><sex>{}</sex>\
         <title>{}</title><w_title></w_title><o_title></o_title><foa_title></foa_title>\
         <rating>{}</rating><games>{}</games><k>20</k>\
         <rapid_rating>{}</rapid_rating><rapid_games>{}</rapid_games><rapid_k>20</rapid_k>\
         <blitz_rating>{}</blitz_rating><blitz_games>{}</blitz_games><blitz_k>20</blitz_k>\
         <birthday>{}</birthday><flag></flag></player>\n",
        p.id,
        p.name,
        p.country,
        p.sex,
        p.title.as_deref().unwrap_or(""),
        p.rating,
        p.games_played,
        p.rapid_rating,
        p.rapid_games,
        p.blitz_rating,
        p.blitz_games,
        p.birthday.as_deref().unwrap_or(""),
    )
}

pub fn player(id: &str, name: &str, rating: i64) -> PlayerRecord {
    PlayerRecord {
        id: id.to_string(),
        name: name.to_string(),
        country: "NOR".to_string(),
        sex: "M".to_string(),
        title: None,
        rating,
        games_played: 9,
        rapid_rating: rating.saturating_sub(10),
        rapid_games: 3,
        blitz_rating: rating.saturating_sub(20),
        blitz_games: 4,
        birthday: Some("1990".to_string()),
    }
}
