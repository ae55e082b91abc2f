//! Reference corpus: chapters (surahs) of numbered verses (ayat).
//!
//! The corpus is loaded once through a [`CorpusProvider`] and then only read.
//! Every alignment run borrows it immutably, so one `Corpus` can back any
//! number of concurrent runs.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SubtitleError};
use crate::normalize::{normalize, normalized_words};

/// Upper bound of chapter ids in the reference text.
pub const MAX_CHAPTER: u32 = 114;

/// Position of a verse in the corpus. Chapter 0 / verse 0 marks an unmatched segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub const UNMATCHED: VerseRef = VerseRef {
        chapter: 0,
        verse: 0,
    };

    pub const fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }

    pub fn is_unmatched(&self) -> bool {
        self.chapter == 0
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verse {
    pub reference: VerseRef,
    /// Reference text with diacritics, used for display.
    pub text: String,
    /// Diacritic-free text, used for scoring.
    pub normalized: String,
    pub words: Vec<String>,
}

impl Verse {
    pub fn new(reference: VerseRef, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            reference,
            normalized: normalize(&text),
            words: normalized_words(&text),
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterInfo {
    pub id: u32,
    pub name: String,
    pub name_en: Option<String>,
    pub verse_count: u32,
}

impl ChapterInfo {
    pub fn new(id: u32, name: impl Into<String>, verse_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            name_en: None,
            verse_count,
        }
    }
}

/// Source of the reference text.
pub trait CorpusProvider: Send + Sync {
    /// Chapter index, ordered by id.
    fn chapters(&self) -> Result<Vec<ChapterInfo>>;

    /// Verse texts of one chapter; position `i` holds verse `i + 1`.
    fn verses(&self, chapter: u32) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct Corpus {
    chapters: Vec<ChapterInfo>,
    verses: HashMap<u32, Vec<Verse>>,
}

impl Corpus {
    /// Loads every chapter of the provider's index.
    ///
    /// A chapter whose verses cannot be read is kept with zero verses.
    pub fn load(provider: &dyn CorpusProvider) -> Result<Self> {
        let mut chapters = provider.chapters()?;
        chapters.sort_by_key(|c| c.id);

        let mut verses = HashMap::with_capacity(chapters.len());
        for chapter in &chapters {
            let texts = match provider.verses(chapter.id) {
                Ok(texts) => texts,
                Err(e) => {
                    warn!(chapter = chapter.id, error = %e, "chapter verses unavailable, treating as empty");
                    Vec::new()
                }
            };
            if !texts.is_empty() && texts.len() != chapter.verse_count as usize {
                warn!(
                    chapter = chapter.id,
                    expected = chapter.verse_count,
                    found = texts.len(),
                    "verse count differs from chapter index"
                );
            }
            verses.insert(chapter.id, build_verses(chapter.id, texts));
        }

        debug!(chapters = chapters.len(), "corpus loaded");
        Ok(Self { chapters, verses })
    }

    /// Builds a corpus from chapters and their verse texts.
    pub fn from_chapters<I, T>(chapters: I) -> Self
    where
        I: IntoIterator<Item = (ChapterInfo, Vec<T>)>,
        T: Into<String>,
    {
        let mut corpus = Self::default();
        for (info, texts) in chapters {
            corpus.verses.insert(info.id, build_verses(info.id, texts));
            corpus.chapters.push(info);
        }
        corpus.chapters.sort_by_key(|c| c.id);
        corpus
    }

    pub fn chapters(&self) -> &[ChapterInfo] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter(&self, id: u32) -> Option<&ChapterInfo> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// Verses of `chapter`, empty when the chapter is unknown or failed to load.
    pub fn verses(&self, chapter: u32) -> &[Verse] {
        self.verses.get(&chapter).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn verse(&self, r: VerseRef) -> Option<&Verse> {
        let idx = r.verse.checked_sub(1)? as usize;
        self.verses(r.chapter).get(idx)
    }
}

fn build_verses<T: Into<String>>(chapter: u32, texts: Vec<T>) -> Vec<Verse> {
    (1..)
        .zip(texts)
        .map(|(n, text)| Verse::new(VerseRef::new(chapter, n), text))
        .collect()
}

// On-disk layout:
//   <root>/surahs.json                 {"result": [{"id", "name": {"ar", "en"}, "verses_count"}]}
//   <root>/json/surah/surah_<id>.json  {"verses": [{"text": {"ar": "..."}}]}

#[derive(Deserialize)]
struct ChapterIndexFile {
    #[serde(default)]
    result: Vec<ChapterEntry>,
}

#[derive(Deserialize)]
struct ChapterEntry {
    id: u32,
    name: LocalizedText,
    #[serde(default)]
    verses_count: u32,
}

#[derive(Deserialize)]
struct LocalizedText {
    ar: String,
    #[serde(default)]
    en: Option<String>,
}

#[derive(Deserialize)]
struct ChapterFile {
    #[serde(default)]
    verses: Vec<VerseEntry>,
}

#[derive(Deserialize)]
struct VerseEntry {
    text: LocalizedText,
}

/// Reads the corpus from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct JsonDirProvider {
    root: PathBuf,
}

impl JsonDirProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("surahs.json")
    }

    pub fn chapter_path(&self, chapter: u32) -> PathBuf {
        self.root
            .join("json")
            .join("surah")
            .join(format!("surah_{chapter}.json"))
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, context: &'static str) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|e| SubtitleError::io(context, path, e))?;
    serde_json::from_str(&data).map_err(|e| SubtitleError::json(context, path, e))
}

impl CorpusProvider for JsonDirProvider {
    fn chapters(&self) -> Result<Vec<ChapterInfo>> {
        let path = self.index_path();
        let index: ChapterIndexFile =
            read_json(&path, "reading chapter index").map_err(|e| {
                SubtitleError::CorpusUnavailable {
                    path: path.clone(),
                    reason: e.to_string(),
                }
            })?;

        Ok(index
            .result
            .into_iter()
            .filter(|c| (1..=MAX_CHAPTER).contains(&c.id))
            .map(|c| ChapterInfo {
                id: c.id,
                name: c.name.ar,
                name_en: c.name.en,
                verse_count: c.verses_count,
            })
            .collect())
    }

    fn verses(&self, chapter: u32) -> Result<Vec<String>> {
        let file: ChapterFile = read_json(&self.chapter_path(chapter), "reading chapter verses")?;
        Ok(file.verses.into_iter().map(|v| v.text.ar).collect())
    }
}
