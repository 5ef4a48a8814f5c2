/// A card encoded as a single byte.
///
/// The 81 cards of a full deck are bijectively mapped to `0..81`. Reading the
/// index in base 3 yields four features, least significant first:
/// count, color, shading, shape. Card identity is all the game engine needs;
/// the features only matter to [`Rules`] implementations that inspect them.
///
/// # Parsing
///
/// Cards print and parse as four-character codes like `"2gsD"`:
/// count (`1`-`3`), color (`r`/`g`/`p`), shading (`o`pen, `s`triped,
/// `f`illed), shape (`D`iamond, `O`val, `S`quiggle).
///
/// [`Rules`]: super::rules::Rules
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Card(u8);

impl Card {
    /// Number of features per card.
    pub const FEATURES: usize = 4;
    /// Number of values per feature.
    pub const VALUES: u8 = 3;
    /// Number of distinct cards (3^4).
    pub const COUNT: usize = 81;

    /// Value of the `i`th feature, in `0..3`.
    pub fn feature(&self, i: usize) -> u8 {
        debug_assert!(i < Self::FEATURES);
        (0..i).fold(self.0, |n, _| n / Self::VALUES) % Self::VALUES
    }
    /// All feature values, least significant first.
    pub fn features(&self) -> [u8; Self::FEATURES] {
        std::array::from_fn(|i| self.feature(i))
    }
}

/// features isomorphism
impl From<[u8; Card::FEATURES]> for Card {
    fn from(features: [u8; Card::FEATURES]) -> Self {
        Self(
            features
                .iter()
                .rev()
                .fold(0, |n, f| n * Self::VALUES + f % Self::VALUES),
        )
    }
}

/// u8 isomorphism
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        c.0
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self(n)
    }
}

const COUNTS: [char; 3] = ['1', '2', '3'];
const COLORS: [char; 3] = ['r', 'g', 'p'];
const SHADES: [char; 3] = ['o', 's', 'f'];
const SHAPES: [char; 3] = ['D', 'O', 'S'];
const GLYPHS: [[char; 3]; Card::FEATURES] = [COUNTS, COLORS, SHADES, SHAPES];

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if usize::from(self.0) >= Self::COUNT {
            return write!(f, "#{}", self.0);
        }
        self.features()
            .iter()
            .zip(GLYPHS.iter())
            .try_for_each(|(v, glyphs)| write!(f, "{}", glyphs[*v as usize]))
    }
}

/// str isomorphism
impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let chars = s.trim().chars().collect::<Vec<_>>();
        match chars.len() {
            Card::FEATURES => chars
                .iter()
                .zip(GLYPHS.iter())
                .map(|(c, glyphs)| {
                    glyphs
                        .iter()
                        .position(|g| g == c)
                        .map(|v| v as u8)
                        .ok_or_else(|| format!("unknown glyph {}", c))
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(|v| Card::from([v[0], v[1], v[2], v[3]])),
            _ => Err("4 characters".into()),
        }
    }
}
