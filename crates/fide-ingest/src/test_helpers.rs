// Shared fixtures for unit tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build an in-memory zip archive from `(name, contents)` pairs
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// One `<player>` element in feed format
pub fn player_xml(id: &str, name: &str, rating: i64) -> String {
    format!(
        r#"<player>
    <fideid>{id}</fideid>
    <name>  {name}  </name>
    <country>ESP</country>
    <sex>M</sex>
    <title></title>
    <w_title></w_title>
    <rating>{rating}</rating>
    <games>0</games>
    <k>40</k>
    <rapid_rating>0</rapid_rating>
    <rapid_games>0</rapid_games>
    <blitz_rating>0</blitz_rating>
    <blitz_games>0</blitz_games>
    <birthday>1990</birthday>
    <flag></flag>
  </player>"#
    )
}

/// A complete feed document wrapping the given player elements
pub fn feed_xml(players: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<playerslist>\n  {}\n</playerslist>\n",
        players.join("\n  ")
    )
}
