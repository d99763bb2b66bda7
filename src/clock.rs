use crate::constants::MAX_24BIT_UINT_VALUE;
use log::debug;
use std::time::Duration;

/// Converts delta-times in ticks into real time, following the most recent Set Tempo event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Clock {
    /// Ticks per quarter note, from the header chunk. Never zero.
    resolution: u16,
    /// Microseconds per quarter note. Zero until the file sets a tempo (unless an initial tempo
    /// was configured).
    tempo: u32,
    /// Microseconds per tick.
    delta_base: u32,
}

impl Clock {
    pub(crate) fn new(resolution: u16, tempo: u32) -> Self {
        debug_assert_ne!(resolution, 0);
        let mut clock = Self {
            resolution,
            tempo: 0,
            delta_base: 0,
        };
        clock.set_tempo(tempo);
        clock
    }

    /// Sets the tempo from the three payload bytes of a Set Tempo event.
    pub(crate) fn set_tempo_bytes(&mut self, bytes: [u8; 3]) {
        let tempo = u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]);
        self.set_tempo(tempo);
        debug!(
            "set tempo: {} microseconds per quarter, delta base: {}",
            self.tempo, self.delta_base
        );
    }

    fn set_tempo(&mut self, tempo: u32) {
        self.tempo = tempo.min(MAX_24BIT_UINT_VALUE);
        self.delta_base = self.tempo / u32::from(self.resolution.max(1));
    }

    /// Ticks per quarter note.
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    /// Microseconds per quarter note.
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Microseconds per tick, `tempo / resolution` rounded down.
    pub fn delta_base(&self) -> u32 {
        self.delta_base
    }

    /// The real time that `ticks` take at the current tempo.
    pub fn delay(&self, ticks: u32) -> Delay {
        Delay {
            ticks,
            micros: u64::from(ticks) * u64::from(self.delta_base),
        }
    }
}

/// The time to wait before the next event.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Delay {
    ticks: u32,
    micros: u64,
}

impl Delay {
    /// The delta-time in ticks, as stored in the file.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// The delta-time in microseconds at the tempo in effect when it was read. This is zero while
    /// no tempo is known, which means "no timing information", not "play immediately forever".
    pub fn micros(&self) -> u64 {
        self.micros
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_micros(self.micros)
    }

    /// A step only returns a zero delay when it stopped at an End of Track event: no event
    /// follows, and the next step reports the end of the stream.
    pub fn is_zero(&self) -> bool {
        self.ticks == 0
    }
}
