//! High-score watch.
//!
//! Periodically sums a fixed set of memory ranges (where a game keeps its
//! score table) and emits a signed event record when the sum changes. It only
//! reads memory through [`MemoryRead`] and takes time from the host, so it is
//! independent of any video or CPU state.

use std::fmt;
use std::time::Duration;

use md5::{Digest, Md5};

use crate::core::bus::MemoryRead;

/// Maximum number of memory ranges one watch can track.
pub const MAX_RANGES: usize = 20;

/// Minimum time between two checksum polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Salt prepended to the hex dump before signing.
const SIGN_SALT: &str = "1008611";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HiscoreError {
    #[error("score watch supports at most {max} memory ranges, {requested} configured")]
    TooManyRanges { requested: usize, max: usize },
}

/// A contiguous run of `len` bytes starting at `address`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRange {
    pub address: u16,
    pub len: u16,
}

impl MemoryRange {
    pub const fn new(address: u16, len: u16) -> Self {
        Self { address, len }
    }

    fn bytes<M: MemoryRead + ?Sized>(self, mem: &M) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |i| mem.read_byte(self.address.wrapping_add(i)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreEventKind {
    NewScore,
    Exit,
}

impl ScoreEventKind {
    pub const fn name(self) -> &'static str {
        match self {
            ScoreEventKind::NewScore => "newscore",
            ScoreEventKind::Exit => "exit",
        }
    }
}

/// A signed snapshot of the watched memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEvent {
    pub kind: ScoreEventKind,
    pub time: Duration,
    /// Lowercase hex dump of every watched byte, in range order.
    pub data: String,
    /// Lowercase hex MD5 of the salted dump.
    pub sign: String,
}

impl fmt::Display for ScoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hiscore::event,{},data,{},sign,{}",
            self.kind.name(),
            self.data,
            self.sign
        )
    }
}

/// MD5 signature of a hex dump, as lowercase hex.
pub fn sign(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(SIGN_SALT.as_bytes());
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct ScoreWatch {
    ranges: Vec<MemoryRange>,
    checksum: u32,
    last_poll: Duration,
    resets: u32,
}

impl ScoreWatch {
    /// Start watching `ranges`, taking the initial checksum from `mem`.
    ///
    /// More than [`MAX_RANGES`] ranges is a configuration error; the host is
    /// expected to abort start-up rather than continue with fewer ranges.
    pub fn new<M: MemoryRead + ?Sized>(
        ranges: &[MemoryRange],
        mem: &M,
        now: Duration,
    ) -> Result<Self, HiscoreError> {
        if ranges.len() > MAX_RANGES {
            return Err(HiscoreError::TooManyRanges {
                requested: ranges.len(),
                max: MAX_RANGES,
            });
        }

        let mut watch = Self {
            ranges: ranges.to_vec(),
            checksum: 0,
            last_poll: now,
            resets: 0,
        };
        watch.checksum = watch.memory_sum(mem);
        Ok(watch)
    }

    pub fn ranges(&self) -> &[MemoryRange] {
        &self.ranges
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn reset_count(&self) -> u32 {
        self.resets
    }

    fn memory_sum<M: MemoryRead + ?Sized>(&self, mem: &M) -> u32 {
        self.ranges
            .iter()
            .flat_map(|r| r.bytes(mem))
            .fold(0u32, |sum, b| sum.wrapping_add(u32::from(b)))
    }

    fn snapshot<M: MemoryRead + ?Sized>(
        &self,
        kind: ScoreEventKind,
        mem: &M,
        now: Duration,
    ) -> ScoreEvent {
        let data: String = self
            .ranges
            .iter()
            .flat_map(|r| r.bytes(mem))
            .map(|b| format!("{b:02x}"))
            .collect();
        let sign = sign(&data);
        ScoreEvent {
            kind,
            time: now,
            data,
            sign,
        }
    }

    /// Per-frame poll. Returns a `newscore` event when the watched bytes
    /// changed since the last poll.
    pub fn on_frame<M: MemoryRead + ?Sized>(&mut self, mem: &M, now: Duration) -> Option<ScoreEvent> {
        if now.saturating_sub(self.last_poll) <= POLL_INTERVAL {
            return None;
        }
        self.last_poll = now;

        let sum = self.memory_sum(mem);
        if self.checksum == 0 {
            // Score RAM was still blank at start-up; adopt the first real sum.
            self.checksum = sum;
            return None;
        }
        if sum == self.checksum {
            return None;
        }

        self.checksum = sum;
        let event = self.snapshot(ScoreEventKind::NewScore, mem, now);
        tracing::info!(time = now.as_secs_f64(), "{event}");
        Some(event)
    }

    pub fn on_reset(&mut self) {
        self.resets += 1;
    }

    /// Exit or pause: always emits a snapshot.
    pub fn on_exit<M: MemoryRead + ?Sized>(&self, mem: &M, now: Duration) -> ScoreEvent {
        let event = self.snapshot(ScoreEventKind::Exit, mem, now);
        tracing::info!(time = now.as_secs_f64(), "{event}");
        event
    }
}
