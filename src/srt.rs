// Reads caption (.srt, UTF-8) blocks into timed segments and writes them back.
//
// Block layout:
//   1
//   00:00:01,000 --> 00:00:02,000
//   text...
//   more text...

use serde::Serialize;
use tracing::warn;

use crate::error::{Result, SubtitleError};
use crate::timecode;

/// One caption block as parsed from the input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedSegment {
    pub index: u32,
    pub start: f64, // seconds
    pub end: f64,   // seconds
    pub text: String,
}

/// Parses caption text, returning segments sorted by start time.
///
/// Blocks with fewer than three lines are skipped. Any other malformed block
/// fails the whole parse, naming the 1-based block number. A block ending
/// before it starts is malformed; zero-length blocks (`end == start`) are
/// accepted as written.
pub fn parse_srt(srt_text: &str) -> Result<Vec<TimedSegment>> {
    let norm = srt_text
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let blocks = norm
        .split("\n\n")
        .map(|b| b.trim())
        .filter(|b| !b.is_empty());

    let mut segments = Vec::new();

    for (i, block) in blocks.enumerate() {
        let block_no = i + 1;
        let lines: Vec<&str> = block.lines().map(|l| l.trim()).collect();
        if lines.len() < 3 {
            warn!(block = block_no, lines = lines.len(), "skipping short caption block");
            continue;
        }

        let index = lines[0]
            .parse::<u32>()
            .map_err(|e| SubtitleError::malformed(block_no, lines[0], format!("bad index: {e}")))?;

        let timing = lines[1];
        let (start_ts, end_ts) = timing
            .split_once("-->")
            .ok_or_else(|| SubtitleError::malformed(block_no, timing, "missing '-->'"))?;
        let start = timecode::parse(start_ts).map_err(|e| SubtitleError::malformed(block_no, timing, e))?;
        let end = timecode::parse(end_ts).map_err(|e| SubtitleError::malformed(block_no, timing, e))?;
        if end < start {
            return Err(SubtitleError::malformed(block_no, timing, "end precedes start"));
        }

        let text = lines[2..]
            .iter()
            .filter(|l| !l.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            warn!(block = block_no, index, "skipping caption block without text");
            continue;
        }

        segments.push(TimedSegment {
            index,
            start,
            end,
            text,
        });
    }

    // stable: equal starts keep file order
    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok(segments)
}

/// Writes `(start, end, text)` entries as caption blocks numbered from 1.
pub fn write_srt<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (f64, f64, &'a str)>,
{
    let mut out = String::new();
    for (n, (start, end, text)) in (1..).zip(entries) {
        out.push_str(&format!(
            "{n}\n{} --> {}\n{text}\n\n",
            timecode::format(start),
            timecode::format(end)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blocks_and_joins_text_lines() {
        let srt = "1\n00:00:00,000 --> 00:00:02,000\nبسم الله\nالرحمن الرحيم\n\n2\n00:00:02,500 --> 00:00:04,000\nالحمد لله\n";
        let segs = parse_srt(srt).unwrap();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].index, 1);
        assert_eq!(segs[0].text, "بسم الله الرحمن الرحيم");
        assert_eq!(segs[1].start, 2.5);
        assert_eq!(segs[1].end, 4.0);
    }

    #[test]
    fn handles_crlf_and_bom() {
        let srt = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nx\r\n\r\n";
        let segs = parse_srt(srt).unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].text, "x");
    }

    #[test]
    fn skips_short_blocks() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nkept\n";
        let segs = parse_srt(srt).unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].index, 2);
    }

    #[test]
    fn sorts_by_start() {
        let srt = "1\n00:00:05,000 --> 00:00:06,000\nb\n\n2\n00:00:01,000 --> 00:00:02,000\na\n";
        let segs = parse_srt(srt).unwrap();
        assert_eq!(segs[0].text, "a");
        assert_eq!(segs[1].text, "b");
    }

    #[test]
    fn malformed_timing_names_the_block() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nok\n\n2\n00:00:03 -> 00:00:04\nbad\n";
        match parse_srt(srt) {
            Err(SubtitleError::MalformedBlock { block, line, .. }) => {
                assert_eq!(block, 2);
                assert_eq!(line, "00:00:03 -> 00:00:04");
            }
            other => panic!("expected MalformedBlock, got {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_and_index_are_errors() {
        assert!(parse_srt("1\n00:00:xx,000 --> 00:00:02,000\nt\n").is_err());
        assert!(parse_srt("one\n00:00:01,000 --> 00:00:02,000\nt\n").is_err());
        assert!(parse_srt("1\n00:00:03,000 --> 00:00:02,000\nt\n").is_err());
    }

    #[test]
    fn zero_length_block_is_kept() {
        let segs = parse_srt("1\n00:00:02,000 --> 00:00:02,000\nt\n").unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!((segs[0].start, segs[0].end), (2.0, 2.0));
    }

    #[test]
    fn oversized_hours_are_a_malformed_block() {
        let srt = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nt\n";
        assert!(matches!(parse_srt(srt), Err(SubtitleError::MalformedBlock { block: 1, .. })));
    }

    #[test]
    fn writes_numbered_blocks() {
        let out = write_srt([(0.0, 2.0, "a"), (2.5, 4.0, "b")]);
        assert_eq!(
            out,
            "1\n00:00:00,000 --> 00:00:02,000\na\n\n2\n00:00:02,500 --> 00:00:04,000\nb\n\n"
        );
    }

    #[test]
    fn written_output_parses_back() {
        let out = write_srt([(1.25, 3.0, "الحمد لله")]);
        let segs = parse_srt(&out).unwrap();
        assert_eq!(segs[0].start, 1.25);
        assert_eq!(segs[0].text, "الحمد لله");
    }
}
