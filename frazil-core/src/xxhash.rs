//! XXH64 for Zstandard frame checksums.
//!
//! Zstandard stores the low 32 bits of XXH64 (seed 0) over the regenerated
//! frame content. Because a frame's output is produced across many reads,
//! the hasher is incremental: [`Xxh64::update`] may be called with any
//! partition of the input and [`Xxh64::digest`] yields the same value as a
//! one-shot hash.

/// XXH64 prime constants.
const PRIME64_1: u64 = 0x9E3779B185EBCA87;
const PRIME64_2: u64 = 0xC2B2AE3D27D4EB4F;
const PRIME64_3: u64 = 0x165667B19E3779F9;
const PRIME64_4: u64 = 0x85EBCA77C2B2AE63;
const PRIME64_5: u64 = 0x27D4EB2F165667C5;

/// Incremental XXH64 hasher with seed 0.
#[derive(Debug, Clone)]
pub struct Xxh64 {
    v1: u64,
    v2: u64,
    v3: u64,
    v4: u64,
    buffer: [u8; 32],
    buffered: usize,
    total: u64,
}

impl Xxh64 {
    /// Create a fresh hasher.
    pub fn new() -> Self {
        Self {
            v1: PRIME64_1.wrapping_add(PRIME64_2),
            v2: PRIME64_2,
            v3: 0,
            v4: 0u64.wrapping_sub(PRIME64_1),
            buffer: [0; 32],
            buffered: 0,
            total: 0,
        }
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Absorb `data` into the hash state.
    pub fn update(&mut self, mut data: &[u8]) {
        self.total = self.total.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = (32 - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < 32 {
                return;
            }
            let block = self.buffer;
            self.consume_block(&block);
            self.buffered = 0;
        }

        while data.len() >= 32 {
            let (block, rest) = data.split_at(32);
            self.consume_block(block);
            data = rest;
        }

        self.buffer[..data.len()].copy_from_slice(data);
        self.buffered = data.len();
    }

    /// Finish the hash over everything absorbed so far.
    ///
    /// Does not consume the state; more data may still be absorbed.
    pub fn digest(&self) -> u64 {
        let mut hash = if self.total >= 32 {
            let mut h = self
                .v1
                .rotate_left(1)
                .wrapping_add(self.v2.rotate_left(7))
                .wrapping_add(self.v3.rotate_left(12))
                .wrapping_add(self.v4.rotate_left(18));
            h = merge_round64(h, self.v1);
            h = merge_round64(h, self.v2);
            h = merge_round64(h, self.v3);
            h = merge_round64(h, self.v4);
            h
        } else {
            PRIME64_5
        };

        hash = hash.wrapping_add(self.total);

        let tail = &self.buffer[..self.buffered];
        let mut pos = 0;

        while pos + 8 <= tail.len() {
            let k = read_u64_le(&tail[pos..]).wrapping_mul(PRIME64_2);
            hash ^= k.rotate_left(31).wrapping_mul(PRIME64_1);
            hash = hash
                .rotate_left(27)
                .wrapping_mul(PRIME64_1)
                .wrapping_add(PRIME64_4);
            pos += 8;
        }

        if pos + 4 <= tail.len() {
            let k = (read_u32_le(&tail[pos..]) as u64).wrapping_mul(PRIME64_1);
            hash ^= k;
            hash = hash
                .rotate_left(23)
                .wrapping_mul(PRIME64_2)
                .wrapping_add(PRIME64_3);
            pos += 4;
        }

        while pos < tail.len() {
            hash ^= (tail[pos] as u64).wrapping_mul(PRIME64_5);
            hash = hash.rotate_left(11).wrapping_mul(PRIME64_1);
            pos += 1;
        }

        // Final avalanche
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(PRIME64_2);
        hash ^= hash >> 29;
        hash = hash.wrapping_mul(PRIME64_3);
        hash ^= hash >> 32;

        hash
    }

    fn consume_block(&mut self, block: &[u8]) {
        self.v1 = round64(self.v1, read_u64_le(&block[0..]));
        self.v2 = round64(self.v2, read_u64_le(&block[8..]));
        self.v3 = round64(self.v3, read_u64_le(&block[16..]));
        self.v4 = round64(self.v4, read_u64_le(&block[24..]));
    }
}

impl Default for Xxh64 {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute XXH64 of `data` in one shot with seed 0.
pub fn xxhash64(data: &[u8]) -> u64 {
    let mut hasher = Xxh64::new();
    hasher.update(data);
    hasher.digest()
}

#[inline]
fn round64(acc: u64, input: u64) -> u64 {
    acc.wrapping_add(input.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

#[inline]
fn merge_round64(mut acc: u64, val: u64) -> u64 {
    let val = round64(0, val);
    acc ^= val;
    acc.wrapping_mul(PRIME64_1).wrapping_add(PRIME64_4)
}

#[inline]
fn read_u64_le(data: &[u8]) -> u64 {
    u64::from_le_bytes([
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ])
}

#[inline]
fn read_u32_le(data: &[u8]) -> u32 {
    u32::from_le_bytes([data[0], data[1], data[2], data[3]])
}
