use anyhow::{ensure, Result};
use std::borrow::Cow;

/// Result of scanning one chunk read from the socket
#[derive(Debug, PartialEq, Eq)]
pub enum Detection<'a> {
    /// No marker yet; every byte here is audio
    Audio(Cow<'a, [u8]>),
    /// Marker found. `audio` precedes it, `discarded` bytes followed it
    /// within the same read and are dropped.
    Marker { audio: Cow<'a, [u8]>, discarded: usize },
}

/// Finds the end-of-recording marker embedded in-line with PCM bytes.
///
/// A read that ends with the first few bytes of the marker is ambiguous, so
/// those bytes are held back and re-scanned together with the next read.
/// This lets a marker split across two reads still be detected. Call
/// [`FrameDetector::finish`] when the peer disconnects to get them back.
#[derive(Debug, Clone)]
pub struct FrameDetector {
    marker: Vec<u8>,
    carry: Vec<u8>,
}

impl FrameDetector {
    pub fn new(marker: impl Into<Vec<u8>>) -> Result<Self> {
        let marker = marker.into();
        ensure!(!marker.is_empty(), "End-of-recording marker must not be empty");

        Ok(Self {
            marker,
            carry: Vec::new(),
        })
    }

    pub fn marker(&self) -> &[u8] {
        &self.marker
    }

    /// Bytes currently held back as a possible marker prefix
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Scan the next chunk
    pub fn feed<'a>(&mut self, chunk: &'a [u8]) -> Detection<'a> {
        if self.carry.is_empty() {
            return self.scan(Cow::Borrowed(chunk));
        }

        let mut window = std::mem::take(&mut self.carry);
        window.extend_from_slice(chunk);
        self.scan(Cow::Owned(window))
    }

    /// Release held-back bytes once no more input will arrive
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.carry)
    }

    fn scan<'a>(&mut self, window: Cow<'a, [u8]>) -> Detection<'a> {
        if let Some(pos) = find(&window, &self.marker) {
            let discarded = window.len() - pos - self.marker.len();
            return Detection::Marker {
                audio: truncate(window, pos),
                discarded,
            };
        }

        let held = self.partial_marker_suffix(&window);
        let split = window.len() - held;
        self.carry.extend_from_slice(&window[split..]);
        Detection::Audio(truncate(window, split))
    }

    /// Length of the longest suffix of `window` that is a proper prefix of the marker
    fn partial_marker_suffix(&self, window: &[u8]) -> usize {
        let longest = (self.marker.len() - 1).min(window.len());
        (1..=longest)
            .rev()
            .find(|&len| window.ends_with(&self.marker[..len]))
            .unwrap_or(0)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn truncate(bytes: Cow<'_, [u8]>, len: usize) -> Cow<'_, [u8]> {
    match bytes {
        Cow::Borrowed(slice) => Cow::Borrowed(&slice[..len]),
        Cow::Owned(mut vec) => {
            vec.truncate(len);
            Cow::Owned(vec)
        }
    }
}
