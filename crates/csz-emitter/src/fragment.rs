//! Output fragments.
//!
//! A fragment is an atomic piece of output text with the location of the node
//! that produced it. Comments are staged on fragments as `preceding` or
//! `following` annotations until the interleaving pass splices them into the
//! text stream.

use csz_common::{Comment, SourceLocation};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub location: Option<SourceLocation>,
    /// Comments to place before this fragment (on their own line if they
    /// were on their own line in the source).
    pub preceding: Vec<Comment>,
    /// Comments to place after this fragment.
    pub following: Vec<Comment>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            text: text.into(),
            location,
            preceding: Vec::new(),
            following: Vec::new(),
        }
    }

    pub fn has_comments(&self) -> bool {
        !self.preceding.is_empty() || !self.following.is_empty()
    }
}

/// Concatenate fragment texts into the final output.
pub fn fragments_to_text(fragments: &[Fragment]) -> String {
    let len = fragments.iter().map(|f| f.text.len()).sum();
    let mut out = String::with_capacity(len);
    for fragment in fragments {
        out.push_str(&fragment.text);
    }
    out
}
