/// Notes still held down under a mono legato line, most recent last.
///
/// Fixed capacity; pushing onto a full stack forgets the oldest note.
#[derive(Debug, Clone)]
pub struct HeldNotes<const N: usize> {
    notes: [u8; N],
    len: usize,
}

impl<const N: usize> HeldNotes<N> {
    pub fn new() -> Self {
        Self {
            notes: [0; N],
            len: 0,
        }
    }

    pub fn push(&mut self, note: u8) {
        if N == 0 {
            return;
        }

        if self.len == N {
            self.notes.copy_within(1.., 0);
            self.len -= 1;
        }

        self.notes[self.len] = note;
        self.len += 1;
    }

    /// Take the most recently pushed note.
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        Some(self.notes[self.len])
    }

    /// Drop every occurrence of `note`, keeping the order of the rest.
    pub fn remove(&mut self, note: u8) {
        let mut kept = 0;
        for index in 0..self.len {
            if self.notes[index] != note {
                self.notes[kept] = self.notes[index];
                kept += 1;
            }
        }
        self.len = kept;
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.notes[..self.len]
    }
}

impl<const N: usize> Default for HeldNotes<N> {
    fn default() -> Self {
        Self::new()
    }
}
