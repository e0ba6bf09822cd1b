use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Seconds on each side's clock and the per-move increment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TimeControl {
    Blitz,
    Rapid,
    Classical,
    /// No hard clock. Only a soft per-move countdown is shown.
    Untimed,
}

/// Soft per-move countdown used by [`TimeControl::Untimed`].
pub const UNTIMED_MOVE_INTERVAL: Duration = Duration::from_secs(30);

impl TimeControl {
    pub const ALL: [TimeControl; 4] = [
        TimeControl::Blitz,
        TimeControl::Rapid,
        TimeControl::Classical,
        TimeControl::Untimed,
    ];

    pub fn initial_seconds(&self) -> u32 {
        match self {
            TimeControl::Blitz => 300,
            TimeControl::Rapid => 600,
            TimeControl::Classical => 1800,
            TimeControl::Untimed => 0,
        }
    }

    pub fn increment_seconds(&self) -> u32 {
        0
    }

    pub fn is_timed(&self) -> bool {
        !matches!(self, TimeControl::Untimed)
    }

    /// Time control header value for PGN export, e.g. `300+0`.
    pub fn to_pgn(&self) -> String {
        match self {
            TimeControl::Untimed => "-".to_string(),
            _ => format!("{}+{}", self.initial_seconds(), self.increment_seconds()),
        }
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::Blitz
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeControl::Blitz => "blitz",
            TimeControl::Rapid => "rapid",
            TimeControl::Classical => "classical",
            TimeControl::Untimed => "untimed",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TimeControl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blitz" => Ok(TimeControl::Blitz),
            "rapid" => Ok(TimeControl::Rapid),
            "classical" => Ok(TimeControl::Classical),
            "untimed" | "timeless" => Ok(TimeControl::Untimed),
            _ => Err("invalid time control; options are: blitz, rapid, classical, untimed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_control_table() {
        assert_eq!(TimeControl::Blitz.initial_seconds(), 300);
        assert_eq!(TimeControl::Rapid.initial_seconds(), 600);
        assert_eq!(TimeControl::Classical.initial_seconds(), 1800);
        assert_eq!(TimeControl::Untimed.initial_seconds(), 0);
        for tc in TimeControl::ALL.iter() {
            assert_eq!(tc.increment_seconds(), 0);
        }
        assert!(!TimeControl::Untimed.is_timed());
        assert!(TimeControl::Blitz.is_timed());
    }

    #[test]
    fn test_parse() {
        for tc in TimeControl::ALL.iter() {
            assert_eq!(tc.to_string().parse::<TimeControl>(), Ok(*tc));
        }
        assert_eq!("timeless".parse::<TimeControl>(), Ok(TimeControl::Untimed));
        assert!("bullet".parse::<TimeControl>().is_err());
    }

    #[test]
    fn test_pgn_header() {
        assert_eq!(TimeControl::Blitz.to_pgn(), "300+0");
        assert_eq!(TimeControl::Untimed.to_pgn(), "-");
    }
}
