//! Reference data the commands read from.
//!
//! Commands only see the [`Dex`] trait. The shipped implementation is an
//! immutable [`SnapshotDex`] loaded from JSON at startup.

mod chart;
mod snapshot;

use pokedex_interaction::Page;
use serde::Deserialize;

pub(crate) use snapshot::SnapshotDex;

/// Moves a Pokemon can know at once.
pub(crate) const MOVESET_SIZE: usize = 4;

/// Longest Pokemon, move or type name a dataset may hold, in characters.
/// Also the input cap on name options, so button state stays small.
pub(crate) const MAX_NAME_LEN: u16 = 32;

/// Damage factor of a neutral hit, in percent.
pub(crate) const NEUTRAL: u32 = 100;

/// Errors raised by a [`Dex`].
#[derive(Debug, thiserror::Error)]
pub(crate) enum DexError {
    /// The snapshot file could not be read.
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for the schema.
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// The snapshot is internally inconsistent.
    #[error("invalid dataset: {0}")]
    Invalid(String),
}

/// Result type for dataset operations.
pub(crate) type DexResult<T> = Result<T, DexError>;

/// How a move is learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum LearnMethod {
    LevelUp,
    Egg,
    Machine,
    Tutor,
}

/// A move's static data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Move {
    pub(crate) name: String,
    pub(crate) display_name: String,
    #[serde(rename = "type")]
    pub(crate) move_type: String,
    pub(crate) damage_class: String,
    #[serde(default)]
    pub(crate) power: Option<u32>,
    #[serde(default)]
    pub(crate) accuracy: Option<u32>,
    #[serde(default)]
    pub(crate) pp: Option<u32>,
}

/// One row of a learnset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LearnedMove {
    pub(crate) level: u32,
    pub(crate) method: LearnMethod,
    pub(crate) info: Move,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Ability {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct BaseStat {
    pub(crate) name: String,
    pub(crate) base: u32,
}

/// A Pokemon's dex entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Pokemon {
    /// Lookup key, e.g. `mr-mime`.
    pub(crate) name: String,
    /// Shown to users, e.g. `Mr. Mime`.
    pub(crate) display_name: String,
    pub(crate) types: Vec<String>,
    #[serde(default)]
    pub(crate) abilities: Vec<Ability>,
    #[serde(default)]
    pub(crate) stats: Vec<BaseStat>,
}

/// An elemental type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct PokemonType {
    /// Lookup key, e.g. `fire`.
    pub(crate) name: String,
    pub(crate) display_name: String,
}

/// How much damage one type deals to or takes from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Efficacy {
    /// The type on the other side of the matchup.
    pub(crate) opposing: PokemonType,
    /// Percent of normal damage: 0, 25, 50, 100, 200 or 400.
    pub(crate) factor: u32,
}

/// Which rows of a learnset to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LearnsetFilter {
    /// Highest level included.
    pub(crate) max_level: u32,
    /// Include egg moves alongside level-up moves.
    pub(crate) egg_moves: bool,
}

/// Read access to Pokemon reference data.
///
/// Paged queries return the rows of `page` and whether another page follows.
#[async_trait::async_trait]
pub(crate) trait Dex: Send + Sync {
    /// Generation label shown in embeds.
    fn generation(&self) -> &str;

    /// Pokemon whose display name starts with `prefix`, alphabetically.
    async fn search_pokemon(&self, prefix: &str, limit: usize) -> DexResult<Vec<Pokemon>>;

    /// Look up a Pokemon by key or display name, ignoring case.
    async fn pokemon(&self, name: &str) -> DexResult<Option<Pokemon>>;

    /// Moves whose display name starts with `prefix`, alphabetically.
    async fn search_moves(&self, prefix: &str, limit: usize) -> DexResult<Vec<Move>>;

    /// Look up a move by key or display name, ignoring case.
    async fn find_move(&self, name: &str) -> DexResult<Option<Move>>;

    /// Types whose display name starts with `prefix`, alphabetically.
    async fn search_types(&self, prefix: &str, limit: usize) -> DexResult<Vec<PokemonType>>;

    /// Look up a type by key or display name, ignoring case.
    async fn find_type(&self, name: &str) -> DexResult<Option<PokemonType>>;

    /// Damage every type deals to a defender of all `types` combined.
    async fn defending(&self, types: &[String]) -> DexResult<Vec<Efficacy>>;

    /// Damage `attacker` deals to each type.
    async fn attacking(&self, attacker: &str) -> DexResult<Vec<Efficacy>>;

    /// Moves `name` learns, lowest level first.
    async fn learnset(
        &self,
        name: &str,
        filter: LearnsetFilter,
        page: Page,
    ) -> DexResult<(Vec<LearnedMove>, bool)>;

    /// The level-up moves `name` knows at `level`: the [`MOVESET_SIZE`]
    /// most recently learned, ties sharing a rank, lowest level first.
    async fn moveset(
        &self,
        name: &str,
        level: u32,
        page: Page,
    ) -> DexResult<(Vec<LearnedMove>, bool)>;
}
