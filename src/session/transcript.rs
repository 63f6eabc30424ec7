// ABOUTME: Append-only conversation transcript — entries, speakers, and attachment descriptors.
// ABOUTME: Entry ids are assigned in append order and define display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// Descriptor of binary media associated with an entry. Only metadata is
/// kept — the bytes are never retained once the server has acknowledged
/// them, and attachments are never resent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub mime: String,
    pub file_name: String,
}

/// One utterance in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: u64,
    pub speaker: Speaker,
    pub text: String,
    pub attachment: Option<AttachmentRef>,
    pub at: DateTime<Utc>,
}

/// The ordered, append-only sequence of entries for one session.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return a clone of it (ids are assigned here).
    pub fn append(
        &mut self,
        speaker: Speaker,
        text: impl Into<String>,
        attachment: Option<AttachmentRef>,
    ) -> TranscriptEntry {
        let entry = TranscriptEntry {
            id: self.next_id,
            speaker,
            text: text.into(),
            attachment,
            at: Utc::now(),
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff at least one entry was authored by the user.
    pub fn has_user_contribution(&self) -> bool {
        self.entries.iter().any(|e| e.speaker == Speaker::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_append_order() {
        let mut t = Transcript::new();
        let a = t.append(Speaker::Assistant, "hello", None);
        let b = t.append(Speaker::User, "hi", None);
        let c = t.append(Speaker::Assistant, "how are you?", None);
        assert_eq!((a.id, b.id, c.id), (0, 1, 2));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn user_contribution_ignores_assistant_entries() {
        let mut t = Transcript::new();
        t.append(Speaker::Assistant, "greeting", None);
        assert!(!t.has_user_contribution());
        t.append(Speaker::User, "my knee hurts", None);
        assert!(t.has_user_contribution());
    }

    #[test]
    fn appended_entries_are_not_mutated_by_later_appends() {
        let mut t = Transcript::new();
        let first = t.append(Speaker::User, "original", None);
        for i in 0..10 {
            t.append(Speaker::Assistant, format!("reply {i}"), None);
        }
        assert_eq!(t.entries()[0], first);
    }

    #[test]
    fn attachment_metadata_is_preserved() {
        let mut t = Transcript::new();
        let entry = t.append(
            Speaker::User,
            "photo sent",
            Some(AttachmentRef {
                mime: "image/png".to_string(),
                file_name: "rash.png".to_string(),
            }),
        );
        let stored = &t.entries()[0];
        assert_eq!(stored.attachment, entry.attachment);
        assert_eq!(stored.attachment.as_ref().unwrap().mime, "image/png");
    }
}
