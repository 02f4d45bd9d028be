//! Comment interleaving.
//!
//! The printer stages comments on fragments as `preceding`/`following`
//! annotations. This pass splices them into the text stream:
//!
//! - an own-line preceding comment goes at the start of the line holding
//!   its fragment, indented like that line
//! - an inline block comment stays next to its fragment
//! - a trailing comment goes at the end of the line holding its fragment,
//!   or on the next line when it stood on its own line in the source
//!
//! Staged annotations are consumed; the returned fragments carry none.

use crate::fragment::Fragment;
use csz_common::Comment;
use memchr::{memchr, memrchr};

pub fn interleave(fragments: Vec<Fragment>, indent_unit: &str) -> Vec<Fragment> {
    if !fragments.iter().any(Fragment::has_comments) {
        return fragments;
    }
    let mut out: Vec<Fragment> = Vec::with_capacity(fragments.len() + 8);
    let mut end_of_line: Vec<Comment> = Vec::new();

    for mut fragment in fragments {
        let preceding = std::mem::take(&mut fragment.preceding);
        let following = std::mem::take(&mut fragment.following);

        if !end_of_line.is_empty()
            && let Some(newline) = memchr(b'\n', fragment.text.as_bytes())
        {
            let tail = fragment.text.split_off(newline);
            let head = std::mem::replace(&mut fragment.text, tail);
            if !head.is_empty() {
                out.push(Fragment::new(head, fragment.location));
            }
            let text = render_end_of_line(&end_of_line, &line_indent(&out), indent_unit);
            out.push(Fragment::new(text, None));
            end_of_line.clear();
        }

        if !preceding.is_empty() {
            insert_preceding(&mut out, &preceding, indent_unit);
        }
        out.push(fragment);

        for comment in following {
            if comment.block && !comment.new_line {
                out.push(Fragment::new(
                    format!(" {}", comment.render(indent_unit)),
                    None,
                ));
            } else {
                end_of_line.push(comment);
            }
        }
    }
    if !end_of_line.is_empty() {
        let text = render_end_of_line(&end_of_line, &line_indent(&out), indent_unit);
        out.push(Fragment::new(text, None));
    }
    out
}

fn render_end_of_line(comments: &[Comment], indent: &str, indent_unit: &str) -> String {
    let mut text = String::new();
    for comment in comments {
        if comment.new_line {
            text.push('\n');
            text.push_str(indent);
        } else {
            text.push(' ');
        }
        text.push_str(&comment.render(&format!("{indent}{indent_unit}")));
    }
    text
}

/// Place comments before the current line; inline block comments go right
/// before the fragment instead.
fn insert_preceding(out: &mut Vec<Fragment>, comments: &[Comment], indent_unit: &str) {
    let (inline, own_line): (Vec<&Comment>, Vec<&Comment>) = comments
        .iter()
        .partition(|c| c.block && !c.new_line);

    if !own_line.is_empty() {
        let (at, indent) = line_start(out);
        let mut text = String::new();
        for comment in own_line {
            text.push_str(&comment.render(&indent));
            text.push('\n');
            text.push_str(&indent);
        }
        insert_at(out, at, Fragment::new(text, None));
    }
    for comment in inline {
        out.push(Fragment::new(format!("{} ", comment.render(indent_unit)), None));
    }
}

/// Position of the first non-blank character of the last line in `out`
/// (fragment index, byte offset), with the line's indentation.
fn line_start(out: &[Fragment]) -> ((usize, usize), String) {
    let mut start = (0, 0);
    for (i, fragment) in out.iter().enumerate().rev() {
        if let Some(newline) = memrchr(b'\n', fragment.text.as_bytes()) {
            start = (i, newline + 1);
            break;
        }
    }
    let mut indent = String::new();
    let (mut i, mut offset) = start;
    while i < out.len() {
        let text = &out[i].text[offset..];
        let blank = text.len() - text.trim_start_matches([' ', '\t']).len();
        indent.push_str(&text[..blank]);
        if blank < text.len() {
            return ((i, offset + blank), indent);
        }
        i += 1;
        offset = 0;
    }
    ((out.len(), 0), indent)
}

fn line_indent(out: &[Fragment]) -> String {
    line_start(out).1
}

fn insert_at(out: &mut Vec<Fragment>, (index, offset): (usize, usize), fragment: Fragment) {
    if index >= out.len() {
        out.push(fragment);
        return;
    }
    if offset == 0 {
        out.insert(index, fragment);
        return;
    }
    let tail = out[index].text.split_off(offset);
    let location = out[index].location;
    out.insert(index + 1, fragment);
    out.insert(index + 2, Fragment::new(tail, location));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::fragments_to_text;
    use csz_common::{SourceLocation, Span};

    fn loc(start: u32) -> SourceLocation {
        SourceLocation::on_line(0, start, start + 1, Span::new(start, start + 1))
    }

    #[test]
    fn own_line_comment_goes_before_the_line() {
        let mut b = Fragment::new("b = 2;", None);
        b.preceding.push(Comment::line(" note", loc(1)));
        let fragments = vec![
            Fragment::new("a = 1;", None),
            Fragment::new("\n", None),
            Fragment::new("  ", None),
            b,
        ];
        let text = fragments_to_text(&interleave(fragments, "  "));
        assert_eq!(text, "a = 1;\n  // note\n  b = 2;");
    }

    #[test]
    fn trailing_line_comment_ends_the_line() {
        let mut a = Fragment::new("a = 1;", None);
        a.following.push(Comment::line(" one", loc(1)).trailing().inline());
        let fragments = vec![a, Fragment::new("\nb = 2;", None)];
        let text = fragments_to_text(&interleave(fragments, "  "));
        assert_eq!(text, "a = 1; // one\nb = 2;");
    }

    #[test]
    fn inline_block_comment_stays_in_place() {
        let mut x = Fragment::new("x", None);
        x.preceding.push(Comment::block(" t ", loc(1)).inline());
        let fragments = vec![Fragment::new("f(", None), x, Fragment::new(")", None)];
        let text = fragments_to_text(&interleave(fragments, "  "));
        assert_eq!(text, "f(/* t */ x)");
    }
}
