//! Keys waiting behind the sounding note in mono mode.

/// How many older keys mono mode remembers.
pub const HELD_NOTES_CAPACITY: usize = crate::MAX_VOICES - 1;

/// Fixed-size, most-recent-first list of held keys.
///
/// When a new key takes over the mono voice, the key it replaced is pushed
/// here. Releasing the sounding key resumes the most recently pushed key
/// that is still down. Keys released while queued are removed, so they can
/// never be resumed.
#[derive(Debug, Clone, Default)]
pub struct HeldNotes {
    notes: [u8; HELD_NOTES_CAPACITY],
    len: usize,
}

impl HeldNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `note` as the most recent key. When full, the oldest key is
    /// forgotten.
    pub fn push(&mut self, note: u8) {
        self.remove(note);

        let keep = self.len.min(HELD_NOTES_CAPACITY - 1);
        self.notes.copy_within(0..keep, 1);
        self.notes[0] = note;
        self.len = keep + 1;
    }

    /// Forget `note` if it is queued. Returns whether it was.
    pub fn remove(&mut self, note: u8) -> bool {
        match self.notes[..self.len].iter().position(|&n| n == note) {
            Some(index) => {
                self.notes.copy_within(index + 1..self.len, index);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    pub fn pop_most_recent(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }

        let note = self.notes[0];
        self.notes.copy_within(1..self.len, 0);
        self.len -= 1;
        Some(note)
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Queued keys, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.notes[..self.len].iter().copied()
    }
}
