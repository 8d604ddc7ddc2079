use crate::error::Result;
use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::OnceLock;

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus");

/// Fixed common-word list used for words and time tests
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

/// Fixed pool of curated quotes
#[derive(Deserialize, Clone, Debug)]
pub struct QuotePool {
    pub name: String,
    pub size: u32,
    pub quotes: Vec<String>,
}

fn read_corpus_file<T: DeserializeOwned>(file_name: &str) -> Result<T> {
    let file = CORPUS_DIR.get_file(file_name).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("corpus file not found: {file_name}"),
        )
    })?;
    let contents = file.contents_utf8().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("corpus file is not utf-8: {file_name}"),
        )
    })?;
    Ok(serde_json::from_str(contents)?)
}

/// The embedded common-word list. The asset is compiled in, so failing to parse it is a build defect.
pub fn common_words() -> &'static WordList {
    static WORDS: OnceLock<WordList> = OnceLock::new();
    WORDS.get_or_init(|| {
        read_corpus_file("english.json").expect("embedded english.json must be a valid word list")
    })
}

pub fn quotes() -> &'static QuotePool {
    static QUOTES: OnceLock<QuotePool> = OnceLock::new();
    QUOTES.get_or_init(|| {
        read_corpus_file("quotes.json").expect("embedded quotes.json must be a valid quote pool")
    })
}
