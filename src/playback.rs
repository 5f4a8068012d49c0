use crate::slider::Slider;
use crate::years::Year;
use log::debug;
use std::time::{Duration, Instant};

/// Default time between automatic year steps
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    /// One timer; `next_tick` is when it fires next
    Running { next_tick: Instant },
}

/// What a toggle did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// Playback started; `rewound` carries the year when the slider was
    /// sent back to the first position
    Started { rewound: Option<Year> },
    Stopped,
}

/// Steps the slider through the catalog on a fixed period
pub struct Playback {
    state: PlaybackState,
    interval: Duration,
}

impl Playback {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: PlaybackState::Idle,
            interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PlaybackState::Running { .. })
    }

    /// Button text for the current state
    pub fn label(&self) -> &'static str {
        if self.is_running() {
            "⏸ Pause"
        } else {
            "▶ Play"
        }
    }

    /// Play/pause. Starting at the last position rewinds to the first.
    pub fn toggle(&mut self, slider: &mut Slider, now: Instant) -> Toggle {
        if self.is_running() {
            self.stop();
            return Toggle::Stopped;
        }

        let rewound = if slider.is_at_end() {
            slider.first();
            Some(slider.year())
        } else {
            None
        };

        debug!("playback started at {}", slider.year());
        self.state = PlaybackState::Running {
            next_tick: now + self.interval,
        };
        Toggle::Started { rewound }
    }

    pub fn stop(&mut self) {
        if self.is_running() {
            debug!("playback stopped");
        }
        self.state = PlaybackState::Idle;
    }

    /// Fire the timer if it is due. Returns the year the slider moved to;
    /// stepping past the last position stops playback and returns `None`.
    pub fn poll(&mut self, slider: &mut Slider, now: Instant) -> Option<Year> {
        let PlaybackState::Running { next_tick } = self.state else {
            return None;
        };
        if now < next_tick {
            return None;
        }

        match slider.peek_next() {
            Some((index, year)) => {
                slider.set(index);
                // After a stall the missed ticks are dropped, not replayed
                let mut following = next_tick + self.interval;
                if following <= now {
                    following = now + self.interval;
                }
                self.state = PlaybackState::Running { next_tick: following };
                Some(year)
            }
            None => {
                self.stop();
                None
            }
        }
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::years::{last_index, CATALOG};

    fn tick(start: Instant, n: u32) -> Instant {
        start + DEFAULT_INTERVAL * n
    }

    #[test]
    fn test_plays_to_end_then_stops() {
        let start = Instant::now();
        let mut slider = Slider::new(20);
        let mut playback = Playback::default();

        assert_eq!(playback.toggle(&mut slider, start), Toggle::Started { rewound: None });
        assert_eq!(playback.label(), "⏸ Pause");

        for n in 1..=5 {
            let year = playback.poll(&mut slider, tick(start, n));
            assert_eq!(year, Some(CATALOG[20 + n as usize]));
        }
        assert_eq!(slider.index(), last_index());
        assert!(playback.is_running());

        assert_eq!(playback.poll(&mut slider, tick(start, 6)), None);
        assert!(!playback.is_running());
        assert_eq!(playback.label(), "▶ Play");
        assert_eq!(slider.index(), last_index());

        // Timer is gone
        assert_eq!(playback.poll(&mut slider, tick(start, 7)), None);
        assert_eq!(slider.index(), last_index());
    }

    #[test]
    fn test_not_due_yet() {
        let start = Instant::now();
        let mut slider = Slider::new(0);
        let mut playback = Playback::default();
        playback.toggle(&mut slider, start);

        assert_eq!(playback.poll(&mut slider, start + Duration::from_millis(1499)), None);
        assert_eq!(slider.index(), 0);
        assert_eq!(playback.poll(&mut slider, tick(start, 1)), Some(CATALOG[1]));
    }

    #[test]
    fn test_play_at_end_rewinds() {
        let start = Instant::now();
        let mut slider = Slider::new(last_index());
        let mut playback = Playback::default();

        let toggled = playback.toggle(&mut slider, start);
        assert_eq!(toggled, Toggle::Started { rewound: Some(CATALOG[0]) });
        assert_eq!(slider.index(), 0);
        assert_eq!(playback.poll(&mut slider, tick(start, 1)), Some(CATALOG[1]));
    }

    #[test]
    fn test_stall_advances_one_year() {
        let start = Instant::now();
        let mut slider = Slider::new(0);
        let mut playback = Playback::default();
        playback.toggle(&mut slider, start);

        // Nothing polled for ten periods
        let late = tick(start, 10);
        assert_eq!(playback.poll(&mut slider, late), Some(CATALOG[1]));
        assert_eq!(playback.poll(&mut slider, late + Duration::from_millis(16)), None);
        assert_eq!(playback.poll(&mut slider, late + Duration::from_millis(32)), None);
        assert_eq!(slider.index(), 1);

        assert_eq!(playback.state(), PlaybackState::Running { next_tick: late + DEFAULT_INTERVAL });
        assert_eq!(playback.poll(&mut slider, late + DEFAULT_INTERVAL), Some(CATALOG[2]));
    }

    #[test]
    fn test_pause_stops_immediately() {
        let start = Instant::now();
        let mut slider = Slider::new(5);
        let mut playback = Playback::default();

        playback.toggle(&mut slider, start);
        assert_eq!(playback.toggle(&mut slider, start), Toggle::Stopped);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.poll(&mut slider, tick(start, 3)), None);
        assert_eq!(slider.index(), 5);
    }
}
