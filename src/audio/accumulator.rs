/// Append-only PCM buffer for a single recording
#[derive(Debug, Default)]
pub struct AudioAccumulator {
    buffer: Vec<u8>,
    chunks: usize,
}

impl AudioAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, audio: &[u8]) {
        if audio.is_empty() {
            return;
        }
        self.buffer.extend_from_slice(audio);
        self.chunks += 1;
    }

    /// Bytes accumulated so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of non-empty appends
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Hand over the recording. Returns `None` when nothing was captured.
    pub fn finish(self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}
