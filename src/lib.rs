pub mod align;
pub mod config;
pub mod corpus;
pub mod detect;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod similarity;
pub mod srt;
pub mod timecode;
pub mod transcript;

pub use align::{Aligner, MatchOutcome, OccurrenceTracker, align_segments};
pub use config::{AlignConfig, MergeConfig, ProcessOptions};
pub use corpus::{ChapterInfo, Corpus, CorpusProvider, JsonDirProvider, Verse, VerseRef};
pub use error::{Result, SubtitleError};
pub use merge::MergedCaption;
pub use pipeline::{AlignmentRun, ProcessReport, process_file, process_segments};
pub use srt::TimedSegment;
