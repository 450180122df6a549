//! Exhaustive checks of the geometry and edit invariants: every selection
//! range over a corpus of sample buffers, every markup in a set, every
//! marker offset.

use n_markdown::line::{char_len, char_slice, split_lines};
use n_markdown::marker::Template;
use n_markdown::{Cursor, Markup, SelectionDirection, Surface, TextArea, WrapOptions};
use pretty_assertions::assert_eq;

/// Buffers free of markup characters, so a first wrap always wraps.
const SAMPLES: &[&str] = &[
    "",
    "a",
    "hello world",
    "one\ntwo",
    "\n",
    "x\n\ny\n",
    "héllo ünïcode\n→ arrows",
    "  indented\n\tline",
];

fn markups() -> Vec<Markup> {
    vec![
        Markup::symmetric("**"),
        Markup::symmetric("_"),
        Markup::symmetric("~~"),
        Markup::symmetric("`"),
        Markup::new("```\n", "\n```"),
        Markup::new("<<", ">>"),
    ]
}

fn ranges(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..=len).flat_map(move |start| (start..=len).map(move |end| (start, end)))
}

fn area(text: &str, start: usize, end: usize) -> TextArea {
    let mut area = TextArea::from_text(text);
    area.set_selection_range(start, end, SelectionDirection::Forward);
    area
}

fn state(area: &TextArea) -> (String, usize, usize) {
    (area.value(), area.selection_start(), area.selection_end())
}

#[test]
fn wrap_twice_is_identity() {
    let options = WrapOptions::default();
    for sample in SAMPLES {
        for (start, end) in ranges(char_len(sample)) {
            for markup in markups() {
                let mut surface = area(sample, start, end);
                let before = state(&surface);

                Cursor::new(&mut surface).wrap(markup.clone(), &options);
                let wrapped = state(&surface);
                assert_eq!(
                    wrapped.0,
                    format!(
                        "{}{}{}{}{}",
                        char_slice(sample, 0, start),
                        markup.prefix,
                        char_slice(sample, start, end),
                        markup.suffix,
                        char_slice(sample, end, usize::MAX)
                    ),
                    "wrap {markup:?} over {sample:?} [{start}, {end})"
                );
                assert_eq!(
                    wrapped.2 - wrapped.1,
                    end - start,
                    "inner selected after wrap"
                );
                assert!(Cursor::new(&mut surface).is_wrapped_with(&markup));

                Cursor::new(&mut surface).wrap(markup.clone(), &options);
                assert_eq!(
                    state(&surface),
                    before,
                    "unwrap {markup:?} over {sample:?} [{start}, {end})"
                );
            }
        }
    }
}

#[test]
fn wrap_without_unwrap_always_adds() {
    let options = WrapOptions {
        unwrap: false,
        placeholder: String::new(),
    };
    let markup = Markup::symmetric("*");
    for sample in SAMPLES {
        for (start, end) in ranges(char_len(sample)) {
            let mut surface = area(sample, start, end);
            Cursor::new(&mut surface).wrap(markup.clone(), &options);
            Cursor::new(&mut surface).wrap(markup.clone(), &options);
            assert_eq!(
                char_len(&surface.value()),
                char_len(sample) + 4,
                "{sample:?} [{start}, {end})"
            );
        }
    }
}

#[test]
fn lines_rebuild_the_buffer() {
    for sample in SAMPLES {
        let lines = split_lines(sample);
        assert!(!lines.is_empty());

        let joined: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined.join("\n"), *sample);

        for (index, line) in lines.iter().enumerate() {
            assert_eq!(line.line_number, index + 1);
            assert_eq!(line.ends_at - line.starts_at, char_len(&line.text));
        }
        assert_eq!(lines[0].starts_at, 0);
        assert_eq!(lines[lines.len() - 1].ends_at, char_len(sample));
        for pair in lines.windows(2) {
            assert_eq!(pair[1].starts_at, pair[0].ends_at + 1);
        }
    }
}

#[test]
fn every_offset_has_exactly_one_line() {
    for sample in SAMPLES {
        let lines = split_lines(sample);
        for offset in 0..=char_len(sample) {
            let owners = lines.iter().filter(|l| l.contains(offset)).count();
            assert_eq!(owners, 1, "offset {offset} in {sample:?}");
        }
    }
}

#[test]
fn single_marker_places_caret() {
    for sample in SAMPLES {
        for k in 0..=char_len(sample) {
            let template = Template::from(char_slice(sample, 0, k))
                .marker()
                .text(char_slice(sample, k, usize::MAX));
            let rendered = template.render();
            assert_eq!(rendered.text, *sample);
            assert_eq!(rendered.markers, vec![k]);

            let mut surface = TextArea::from_text("");
            Cursor::new(&mut surface).set_text(template);
            assert_eq!(state(&surface), ((*sample).to_owned(), k, k));
        }
    }
}

#[test]
fn marker_pairs_place_selection() {
    for sample in SAMPLES {
        for (i, j) in ranges(char_len(sample)) {
            let template = Template::from(char_slice(sample, 0, i))
                .marker()
                .text(char_slice(sample, i, j))
                .marker()
                .text(char_slice(sample, j, usize::MAX));

            let mut surface = TextArea::from_text("");
            Cursor::new(&mut surface).set_text(template);
            assert_eq!(state(&surface), ((*sample).to_owned(), i, j));
        }
    }
}

#[test]
fn select_is_clamped() {
    for sample in SAMPLES {
        let len = char_len(sample);
        let mut surface = area(sample, 0, 0);
        Cursor::new(&mut surface).select(n_markdown::SelectRange::Absolute {
            start: len + 3,
            end: len + 9,
        });
        assert_eq!((surface.selection_start(), surface.selection_end()), (len, len));
    }
}
