//! Streaming parser for the players XML feed
//!
//! The feed is a flat list of `<player>` elements whose children are looked
//! up by element name, so child order does not matter. Unknown children
//! (`w_title`, `k`, `flag`, ...) are ignored.
//!
//! Parsing is strict. A required field that is missing, empty, or not an
//! integer where one is expected aborts the whole parse with
//! [`FideError::MalformedRecord`]; no row of a bad feed is ever accepted.

use fide_common::{FideError, PlayerRecord, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

const PLAYER_ELEMENT: &[u8] = b"player";

/// Lazy, single-pass sequence of records read from an XML source
///
/// Yields `Err` at most once; the iterator is exhausted after an error.
pub struct PlayerReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// 1-based ordinal of the last `<player>` element opened
    ordinal: usize,
    finished: bool,
}

impl<R: BufRead> PlayerReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::with_capacity(1024),
            ordinal: 0,
            finished: false,
        }
    }

    /// Number of player elements seen so far
    pub fn records_read(&self) -> usize {
        self.ordinal
    }

    fn next_record(&mut self) -> Result<Option<PlayerRecord>> {
        // Children of the current <player>, keyed by element name
        let mut fields: Option<HashMap<String, String>> = None;
        let mut current: Option<String> = None;

        loop {
            self.buf.clear();
            let ordinal = if fields.is_some() { self.ordinal } else { self.ordinal + 1 };
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| FideError::malformed(ordinal, "xml", e.to_string()))?;

            match event {
                Event::Start(e) => {
                    let name = e.name();
                    if fields.is_none() {
                        if name.as_ref() == PLAYER_ELEMENT {
                            self.ordinal += 1;
                            fields = Some(HashMap::new());
                        }
                    } else if current.is_none() {
                        current = Some(String::from_utf8_lossy(name.as_ref()).into_owned());
                    }
                },
                Event::Empty(e) => {
                    let name = e.name();
                    match fields.as_mut() {
                        // <player/> carries no fields at all
                        None if name.as_ref() == PLAYER_ELEMENT => {
                            self.ordinal += 1;
                            return build_record(self.ordinal, &HashMap::new()).map(Some);
                        },
                        Some(map) if current.is_none() => {
                            map.entry(String::from_utf8_lossy(name.as_ref()).into_owned())
                                .or_default();
                        },
                        _ => {},
                    }
                },
                Event::Text(text) => {
                    if let (Some(map), Some(name)) = (fields.as_mut(), current.as_ref()) {
                        let text = text
                            .unescape()
                            .map_err(|e| FideError::malformed(ordinal, name.as_str(), e.to_string()))?;
                        map.entry(name.clone()).or_default().push_str(&text);
                    }
                },
                Event::CData(data) => {
                    if let (Some(map), Some(name)) = (fields.as_mut(), current.as_ref()) {
                        map.entry(name.clone())
                            .or_default()
                            .push_str(&String::from_utf8_lossy(&data));
                    }
                },
                Event::End(e) => {
                    if let Some(name) = current.take() {
                        if let Some(map) = fields.as_mut() {
                            map.entry(name).or_default();
                        }
                    } else if fields.is_some() && e.name().as_ref() == PLAYER_ELEMENT {
                        let map = fields.take().unwrap_or_default();
                        return build_record(self.ordinal, &map).map(Some);
                    }
                },
                Event::Eof => {
                    if fields.is_some() {
                        return Err(FideError::malformed(
                            self.ordinal,
                            "xml",
                            "document ends inside <player>",
                        ));
                    }
                    return Ok(None);
                },
                _ => {},
            }
        }
    }
}

impl<R: BufRead> Iterator for PlayerReader<R> {
    type Item = Result<PlayerRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            },
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            },
        }
    }
}

/// Open the extracted data file as a lazy record sequence
pub fn open_records(path: &Path) -> Result<PlayerReader<BufReader<File>>> {
    let file = File::open(path)?;
    debug!(path = %path.display(), "Opened data file");
    Ok(PlayerReader::new(BufReader::new(file)))
}

/// Parse the whole data file, failing on the first malformed record
pub fn parse_file(path: &Path) -> Result<Vec<PlayerRecord>> {
    let records = open_records(path)?.collect::<Result<Vec<_>>>()?;
    info!(records = records.len(), path = %path.display(), "Parsed data file");
    Ok(records)
}

// ============================================================================
// Field validation
// ============================================================================

fn build_record(ordinal: usize, map: &HashMap<String, String>) -> Result<PlayerRecord> {
    let sex = required_text(ordinal, map, "sex")?;
    if sex.chars().count() != 1 {
        return Err(FideError::malformed(
            ordinal,
            "sex",
            format!("must be a single character, got '{}'", sex),
        ));
    }

    Ok(PlayerRecord {
        id: required_text(ordinal, map, "fideid")?,
        name: required_text(ordinal, map, "name")?,
        country: required_text(ordinal, map, "country")?,
        sex,
        title: optional_text(map, "title"),
        rating: required_int(ordinal, map, "rating")?,
        games_played: required_int(ordinal, map, "games")?,
        rapid_rating: required_int(ordinal, map, "rapid_rating")?,
        rapid_games: required_int(ordinal, map, "rapid_games")?,
        blitz_rating: required_int(ordinal, map, "blitz_rating")?,
        blitz_games: required_int(ordinal, map, "blitz_games")?,
        birthday: optional_text(map, "birthday"),
    })
}

fn required_text(ordinal: usize, map: &HashMap<String, String>, element: &str) -> Result<String> {
    match map.get(element).map(|value| value.trim()) {
        None => Err(FideError::malformed(ordinal, element, "is missing")),
        Some("") => Err(FideError::malformed(ordinal, element, "is empty")),
        Some(value) => Ok(value.to_string()),
    }
}

fn required_int(ordinal: usize, map: &HashMap<String, String>, element: &str) -> Result<i64> {
    let raw = required_text(ordinal, map, element)?;
    raw.parse::<i64>().map_err(|_| {
        FideError::malformed(ordinal, element, format!("is not an integer: '{}'", raw))
    })
}

/// Absent and empty both map to `None`
fn optional_text(map: &HashMap<String, String>, element: &str) -> Option<String> {
    map.get(element)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
