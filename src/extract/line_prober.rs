//! Discovery of soft-wrapped lines inside a single text run.
//!
//! The host layout engine does not expose its line-break decisions, but it can
//! report the rectangles a character range occupies. A range spanning N visual
//! lines decomposes into N rectangles, so growing a range one character at a
//! time and counting rectangles tells us which line each character landed on.
//! This costs one measurement per character.

use crate::geometry::Rect;
use crate::host::MeasurementProvider;
use crate::Result;

/// One visual line of a run: its text and the box the layout engine gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub rect: Rect,
}

/// Partition `text` (the content of `run`) into its rendered lines.
///
/// Whitespace-only runs and whitespace-only lines are dropped. If the host
/// cannot measure the run at all, the run contributes no lines.
pub fn probe_lines<N>(run: &N, text: &str, measure: &dyn MeasurementProvider<N>) -> Vec<Line> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match try_probe(run, text, measure) {
        Ok(lines) => lines,
        Err(e) => {
            log::debug!("skipping unmeasurable text run: {}", e);
            Vec::new()
        }
    }
}

fn try_probe<N>(run: &N, text: &str, measure: &dyn MeasurementProvider<N>) -> Result<Vec<Line>> {
    let mut buffers: Vec<String> = Vec::new();
    let mut len = 0;

    for (i, ch) in text.chars().enumerate() {
        let count = measure.client_rects(run, 0, i + 1)?.len();
        let line = count.saturating_sub(1);
        if buffers.len() <= line {
            buffers.resize_with(line + 1, String::new);
        }
        buffers[line].push(ch);
        len = i + 1;
    }

    let rects = measure.client_rects(run, 0, len)?;
    log::trace!("probed {} chars into {} lines", len, rects.len());

    Ok(rects
        .into_iter()
        .zip(buffers)
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(rect, text)| Line { text, rect })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::Cell;

    /// Lays characters out on a fixed grid, wrapping after `cols` characters.
    struct Grid {
        cols: usize,
        calls: Cell<usize>,
    }

    impl MeasurementProvider<()> for Grid {
        fn client_rects(&self, _run: &(), start: usize, end: usize) -> Result<Vec<Rect>> {
            self.calls.set(self.calls.get() + 1);
            let mut rects = Vec::new();
            let mut i = start;
            while i < end {
                let line = i / self.cols;
                let line_end = ((line + 1) * self.cols).min(end);
                let col = i % self.cols;
                rects.push(Rect::new(
                    col as f64 * 8.0,
                    line as f64 * 16.0,
                    (line_end - i) as f64 * 8.0,
                    16.0,
                ));
                i = line_end;
            }
            Ok(rects)
        }

        fn bounding_rect(&self, _node: &()) -> Result<Rect> {
            Ok(Rect::default())
        }
    }

    struct Detached;

    impl MeasurementProvider<()> for Detached {
        fn client_rects(&self, _run: &(), _start: usize, _end: usize) -> Result<Vec<Rect>> {
            Err(Error::MeasurementUnavailable("detached".into()))
        }

        fn bounding_rect(&self, _node: &()) -> Result<Rect> {
            Err(Error::MeasurementUnavailable("detached".into()))
        }
    }

    fn grid(cols: usize) -> Grid {
        Grid {
            cols,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn unwrapped_run_is_one_line() {
        let g = grid(80);
        let lines = probe_lines(&(), "hello world", &g);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "hello world");
        assert_eq!(lines[0].rect, Rect::new(0.0, 0.0, 88.0, 16.0));
    }

    #[test]
    fn soft_wraps_split_text_by_line() {
        let g = grid(5);
        let lines = probe_lines(&(), "abcdefghijkl", &g);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["abcde", "fghij", "kl"]);
        assert_eq!(lines[2].rect.y, 32.0);
        assert_eq!(lines[2].rect.width, 16.0);
    }

    #[test]
    fn whitespace_only_lines_are_dropped() {
        let g = grid(3);
        let lines = probe_lines(&(), "ab    cd", &g);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        // "ab ", "   " (dropped), "cd"
        assert_eq!(texts, vec!["ab ", "cd"]);
    }

    #[test]
    fn whitespace_run_is_not_probed() {
        let g = grid(10);
        assert!(probe_lines(&(), " \t  ", &g).is_empty());
        assert!(probe_lines(&(), "", &g).is_empty());
        assert_eq!(g.calls.get(), 0);
    }

    #[test]
    fn one_measurement_per_character_plus_final() {
        let g = grid(4);
        probe_lines(&(), "abcdefg", &g);
        assert_eq!(g.calls.get(), 8);
    }

    #[test]
    fn unmeasurable_run_yields_no_lines() {
        assert!(probe_lines(&(), "hello", &Detached).is_empty());
    }

    #[test]
    fn multibyte_characters_count_once() {
        let g = grid(2);
        let lines = probe_lines(&(), "héllo", &g);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["hé", "ll", "o"]);
    }
}
