//! # Bounded Output Buffer
//!
//! Raw bytes captured from the pty, capped at a fixed size. When an append
//! pushes the buffer past its cap, the oldest bytes are dropped so that only
//! the most recent half of the cap remains. The cut always lands on a UTF-8
//! character boundary.
//!
//! Decoding withholds a trailing incomplete UTF-8 sequence, so a snapshot
//! taken between two chunks that split a character never shows a torn
//! character.

/// Default cap for retained task output (100 KiB).
pub const DEFAULT_OUTPUT_CAP: usize = 100 * 1024;

#[derive(Debug)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    cap: usize,
    dropped: u64,
}

impl OutputBuffer {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            bytes: Vec::with_capacity(cap.min(DEFAULT_OUTPUT_CAP)),
            cap,
            dropped: 0,
        }
    }

    /// Append a chunk, truncating from the front if the cap is exceeded.
    pub fn append(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
        if self.bytes.len() <= self.cap {
            return;
        }

        let keep = self.cap / 2;
        let mut cut = self.bytes.len() - keep;
        while cut < self.bytes.len() && is_continuation(self.bytes[cut]) {
            cut += 1;
        }
        self.bytes.drain(..cut);
        self.dropped += cut as u64;
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Total number of bytes discarded by truncation so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes covering the last `n` lines (a trailing newline does not start
    /// a new line).
    pub fn tail_lines(&self, n: usize) -> &[u8] {
        if n == 0 {
            return &[];
        }
        let mut end = self.bytes.len();
        if end > 0 && self.bytes[end - 1] == b'\n' {
            end -= 1;
        }
        let mut seen = 0;
        for (idx, byte) in self.bytes[..end].iter().enumerate().rev() {
            if *byte == b'\n' {
                seen += 1;
                if seen == n {
                    return &self.bytes[idx + 1..];
                }
            }
        }
        &self.bytes
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Length of the longest prefix that does not end inside a UTF-8 sequence.
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(4) {
        let byte = bytes[len - back];
        if is_continuation(byte) {
            continue;
        }
        let width = if byte & 0b1000_0000 == 0 {
            1
        } else if byte & 0b1110_0000 == 0b1100_0000 {
            2
        } else if byte & 0b1111_0000 == 0b1110_0000 {
            3
        } else if byte & 0b1111_1000 == 0b1111_0000 {
            4
        } else {
            1
        };
        return if width > back { len - back } else { len };
    }
    len
}

/// Decode captured bytes, holding back a trailing partial character.
pub fn decode(bytes: &[u8]) -> String {
    let complete = complete_prefix_len(bytes);
    String::from_utf8_lossy(&bytes[..complete]).into_owned()
}

/// Split decoded output into its last `n` logical lines.
pub fn last_lines(text: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..]
        .iter()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
