use super::*;
use rbs_cards::Card;
use rbs_core::*;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// Static parameters of one game instance.
///
/// Durations serialize as integer milliseconds so a config file reads
/// `{"turn_timeout": 30000}`. Missing fields fall back to the defaults
/// in [`rbs_core`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub slots: usize,
    pub deck_size: usize,
    #[serde(with = "millis")]
    pub turn_timeout: Duration,
    #[serde(with = "millis")]
    pub turn_warning: Duration,
    #[serde(with = "millis")]
    pub point_freeze: Duration,
    #[serde(with = "millis")]
    pub penalty_freeze: Duration,
    #[serde(with = "millis")]
    pub tick: Duration,
    #[serde(with = "millis")]
    pub warning_tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slots: SLOTS,
            deck_size: DECK_SIZE,
            turn_timeout: Duration::from_millis(TURN_TIMEOUT),
            turn_warning: Duration::from_millis(TURN_WARNING),
            point_freeze: Duration::from_millis(POINT_FREEZE),
            penalty_freeze: Duration::from_millis(PENALTY_FREEZE),
            tick: Duration::from_millis(TICK),
            warning_tick: Duration::from_millis(WARNING_TICK),
        }
    }
}

impl Config {
    /// Parses a JSON document, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
    /// Checks that these parameters can seat `players` and run a round.
    pub fn validate(&self, players: usize) -> Result<(), ConfigError> {
        if players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if self.slots < SET_SIZE {
            return Err(ConfigError::TooFewSlots(self.slots));
        }
        if self.deck_size < SET_SIZE {
            return Err(ConfigError::DeckTooSmall(self.deck_size));
        }
        if self.deck_size > Card::COUNT {
            return Err(ConfigError::DeckTooLarge {
                size: self.deck_size,
                max: Card::COUNT,
            });
        }
        [
            ("turn_timeout", self.turn_timeout),
            ("tick", self.tick),
            ("warning_tick", self.warning_tick),
        ]
        .into_iter()
        .find(|(_, d)| d.is_zero())
        .map_or(Ok(()), |(name, _)| Err(ConfigError::ZeroDuration(name)))
    }
}

/// Duration <-> integer milliseconds.
pub(crate) mod millis {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_are_valid() {
        assert_eq!(Config::default().validate(4), Ok(()));
    }
    #[test]
    fn json_fills_defaults() {
        let config = Config::from_json(r#"{"slots": 9, "turn_timeout": 2500}"#).unwrap();
        assert_eq!(config.slots, 9);
        assert_eq!(config.turn_timeout, Duration::from_millis(2500));
        assert_eq!(config.deck_size, DECK_SIZE);
        assert_eq!(config.tick, Duration::from_millis(TICK));
    }
    #[test]
    fn json_roundtrip_uses_millis() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["point_freeze"], POINT_FREEZE);
    }
    #[test]
    fn rejects_unplayable() {
        let config = Config::default();
        assert_eq!(config.validate(0), Err(ConfigError::NoPlayers));
        let config = Config {
            slots: 2,
            ..Config::default()
        };
        assert_eq!(config.validate(1), Err(ConfigError::TooFewSlots(2)));
        let config = Config {
            deck_size: 100,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(1),
            Err(ConfigError::DeckTooLarge { size: 100, .. })
        ));
        let config = Config {
            tick: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(config.validate(1), Err(ConfigError::ZeroDuration("tick")));
    }
}
