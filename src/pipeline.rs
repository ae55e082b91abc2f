//! File-level orchestration: parse, back up, align, merge, render, write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::align::{MatchOutcome, align_segments};
use crate::config::ProcessOptions;
use crate::corpus::Corpus;
use crate::detect::detect_chapter;
use crate::error::{Result, SubtitleError};
use crate::merge::{MergedCaption, merge_captions, single_captions};
use crate::render::{
    ChapterRange, RenderedCaption, chapter_ranges, render_captions, render_ranges, render_srt,
};
use crate::srt::{TimedSegment, parse_srt};
use crate::transcript::{TranscriptSource, segments_to_srt};

pub const BACKUP_SUFFIX: &str = "_backup.srt";
pub const PROCESSED_SUFFIX: &str = "_processed.srt";
pub const RANGES_SUFFIX: &str = "_sura_ranges.txt";
pub const RAW_SUFFIX: &str = "_raw.srt";

/// Chapter searched when none is given and detection finds nothing.
const FALLBACK_CHAPTER: u32 = 1;

/// `dir/name.ext` -> `dir/name<suffix>`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}"))
}

pub fn backup_path(path: &Path) -> PathBuf {
    if is_backup(path) {
        path.to_path_buf()
    } else {
        sibling(path, BACKUP_SUFFIX)
    }
}

pub fn processed_path(path: &Path) -> PathBuf {
    sibling(path, PROCESSED_SUFFIX)
}

pub fn ranges_path(path: &Path) -> PathBuf {
    sibling(path, RANGES_SUFFIX)
}

pub fn raw_srt_path(path: &Path) -> PathBuf {
    sibling(path, RAW_SUFFIX)
}

fn is_backup(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(BACKUP_SUFFIX))
}

/// Copies the input next to itself. A file that already is a backup is its
/// own backup and nothing is written.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    if backup.as_path() != path {
        fs::copy(path, &backup).map_err(|e| SubtitleError::io("creating backup", &backup, e))?;
        debug!(backup = %backup.display(), "backup written");
    }
    Ok(backup)
}

/// Writes through a temp file in the target directory, then renames it over `path`.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SubtitleError::io("creating temp file", dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| SubtitleError::io("writing output", path, e))?;
    tmp.persist(path)
        .map_err(|e| SubtitleError::io("replacing output", path, e.error))?;
    Ok(())
}

/// Everything one alignment run produced, before anything is written.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentRun {
    /// Set when no chapters were given and detection ran.
    pub detected_chapter: Option<u32>,
    pub chapters: Vec<u32>,
    pub outcomes: Vec<MatchOutcome>,
    pub captions: Vec<MergedCaption>,
    pub rendered: Vec<RenderedCaption>,
    pub ranges: Vec<ChapterRange>,
}

impl AlignmentRun {
    pub fn matched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_matched()).count()
    }

    pub fn unmatched(&self) -> usize {
        self.outcomes.len() - self.matched()
    }
}

/// Runs detection, alignment, merging and rendering on parsed segments.
///
/// No I/O. `corpus` is only read, so concurrent runs may share it.
pub fn process_segments(
    segments: &[TimedSegment],
    corpus: &Corpus,
    options: &ProcessOptions,
) -> AlignmentRun {
    let (detected_chapter, chapters) = if options.chapters.is_empty() {
        let detected = detect_chapter(segments, corpus, options.align.detect_threshold);
        (detected, vec![detected.unwrap_or(FALLBACK_CHAPTER)])
    } else {
        (None, options.chapters.clone())
    };

    let mut outcomes = align_segments(segments, corpus, &chapters, &options.align);
    outcomes.sort_by(|a, b| a.segment.start.total_cmp(&b.segment.start));

    let captions = if options.merge_enabled {
        merge_captions(&outcomes, &options.merge)
    } else {
        single_captions(&outcomes)
    };
    let rendered = render_captions(&captions);
    let ranges = chapter_ranges(&outcomes, corpus);

    AlignmentRun {
        detected_chapter,
        chapters,
        outcomes,
        captions,
        rendered,
        ranges,
    }
}

/// Paths and counts of one processed file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub processed_srt_path: PathBuf,
    pub ranges_path: PathBuf,
    pub backup_path: PathBuf,
    pub detected_chapter: Option<u32>,
    pub chapters: Vec<u32>,
    pub total_captions: usize,
    pub matched: usize,
    pub unmatched: usize,
    #[serde(skip)]
    pub run: AlignmentRun,
}

/// Processes a caption file, writing `<stem>_processed.srt` and
/// `<stem>_sura_ranges.txt` beside it.
///
/// The input is parsed before anything is written, so a malformed file
/// leaves no backup or output behind.
pub fn process_file(path: &Path, corpus: &Corpus, options: &ProcessOptions) -> Result<ProcessReport> {
    let text = fs::read_to_string(path).map_err(|e| SubtitleError::io("reading captions", path, e))?;
    let segments = parse_srt(&text).map_err(|e| SubtitleError::parse(path, e))?;
    debug!(path = %path.display(), segments = segments.len(), "captions parsed");

    let backup = create_backup(path)?;
    let run = process_segments(&segments, corpus, options);

    let processed = processed_path(path);
    write_atomic(&processed, &render_srt(&run.rendered))?;
    let ranges = ranges_path(path);
    write_atomic(&ranges, &render_ranges(&run.ranges))?;

    info!(
        input = %path.display(),
        output = %processed.display(),
        captions = run.rendered.len(),
        matched = run.matched(),
        unmatched = run.unmatched(),
        "captions processed"
    );

    Ok(ProcessReport {
        processed_srt_path: processed,
        ranges_path: ranges,
        backup_path: backup,
        detected_chapter: run.detected_chapter,
        chapters: run.chapters.clone(),
        total_captions: run.rendered.len(),
        matched: run.matched(),
        unmatched: run.unmatched(),
        run,
    })
}

/// Writes a transcript as a raw caption file at `out_path`.
pub fn write_raw_srt(source: &dyn TranscriptSource, out_path: &Path) -> Result<()> {
    let segments = source.segments()?;
    write_atomic(out_path, &segments_to_srt(&segments))?;
    debug!(path = %out_path.display(), segments = segments.len(), "raw captions written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths() {
        let input = Path::new("/tmp/rec/surah.srt");
        assert_eq!(backup_path(input), Path::new("/tmp/rec/surah_backup.srt"));
        assert_eq!(processed_path(input), Path::new("/tmp/rec/surah_processed.srt"));
        assert_eq!(ranges_path(input), Path::new("/tmp/rec/surah_sura_ranges.txt"));
        assert_eq!(raw_srt_path(Path::new("a/b.json")), Path::new("a/b_raw.srt"));
    }

    #[test]
    fn backup_of_backup_is_itself() {
        let input = Path::new("x/surah_backup.srt");
        assert_eq!(backup_path(input), input);
        assert_eq!(processed_path(input), Path::new("x/surah_backup_processed.srt"));
    }

    #[test]
    fn only_the_last_extension_is_replaced() {
        assert_eq!(processed_path(Path::new("a.b.srt")), Path::new("a.b_processed.srt"));
        assert_eq!(processed_path(Path::new("noext")), Path::new("noext_processed.srt"));
    }
}
