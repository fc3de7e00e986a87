//! In-memory dataset loaded once from a JSON snapshot.
//!
//! ```json
//! {
//!   "generation": "Generation IX",
//!   "moves": [{ "name": "tackle", "display_name": "Tackle", "type": "Normal",
//!               "damage_class": "Physical", "power": 40, "accuracy": 100, "pp": 35 }],
//!   "types": [{ "name": "fire", "display_name": "Fire",
//!               "damage": { "grass": 200, "water": 50 } }],
//!   "pokemon": [{ "name": "bulbasaur", "display_name": "Bulbasaur",
//!                 "types": ["Grass", "Poison"],
//!                 "abilities": [{ "name": "Overgrow" }, { "name": "Chlorophyll", "hidden": true }],
//!                 "stats": [{ "name": "HP", "base": 45 }],
//!                 "learnset": [{ "move": "tackle", "level": 1, "method": "level-up" }] }]
//! }
//! ```
//!
//! `damage` maps defending types to percent of normal damage; unlisted
//! matchups are neutral. Names are limited to [`MAX_NAME_LEN`] characters.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use pokedex_interaction::Page;
use serde::Deserialize;
use tracing::info;

use super::chart::{RawType, TypeChart};
use super::{
    Dex, DexError, DexResult, Efficacy, LearnMethod, LearnedMove, LearnsetFilter, MAX_NAME_LEN,
    MOVESET_SIZE, Move, Pokemon, PokemonType,
};

#[derive(Deserialize)]
struct RawSnapshot {
    generation: String,
    #[serde(default)]
    moves: Vec<Move>,
    #[serde(default)]
    types: Vec<RawType>,
    #[serde(default)]
    pokemon: Vec<RawPokemon>,
}

#[derive(Deserialize)]
struct RawPokemon {
    #[serde(flatten)]
    pokemon: Pokemon,
    #[serde(default)]
    learnset: Vec<RawLearn>,
}

#[derive(Deserialize)]
struct RawLearn {
    #[serde(rename = "move")]
    move_name: String,
    level: u32,
    method: LearnMethod,
}

struct Entry {
    pokemon: Pokemon,
    /// Sorted by level, then move display name.
    learnset: Vec<LearnedMove>,
}

/// Immutable dataset. Entries and moves are kept in display-name order so
/// prefix search yields alphabetical results without sorting per query.
pub(crate) struct SnapshotDex {
    generation: String,
    entries: Vec<Entry>,
    /// Lowercased key and display name to entry index.
    index: HashMap<String, usize>,
    moves: Vec<Move>,
    /// Lowercased key and display name to move index.
    move_index: HashMap<String, usize>,
    chart: TypeChart,
}

fn check_name(kind: &str, name: &str) -> DexResult<()> {
    if name.chars().count() > usize::from(MAX_NAME_LEN) {
        return Err(DexError::Invalid(format!(
            "{kind} name {name:?} is longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Index `items` by lowercased key and display name. Keys must be unique;
/// a display name never shadows another item's key.
fn index_names<'a>(
    kind: &str,
    items: impl Iterator<Item = (&'a str, &'a str)> + Clone,
) -> DexResult<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (i, (key, display)) in items.clone().enumerate() {
        check_name(kind, key)?;
        check_name(kind, display)?;
        if index.insert(key.to_lowercase(), i).is_some() {
            return Err(DexError::Invalid(format!("duplicate {kind} {key:?}")));
        }
    }
    for (i, (_, display)) in items.enumerate() {
        index.entry(display.to_lowercase()).or_insert(i);
    }
    Ok(index)
}

impl SnapshotDex {
    /// Read and index the snapshot at `path`.
    pub(crate) fn load(path: &Path) -> DexResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DexError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let dex = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            pokemon = dex.entries.len(),
            moves = dex.moves.len(),
            types = dex.chart.len(),
            generation = %dex.generation,
            "loaded dataset"
        );
        Ok(dex)
    }

    /// Index a snapshot held in memory.
    pub(crate) fn from_json(text: &str) -> DexResult<Self> {
        let raw: RawSnapshot = serde_json::from_str(text)?;
        let chart = TypeChart::build(raw.types)?;

        let mut all_moves = raw.moves;
        all_moves.sort_by_cached_key(|m| m.display_name.to_lowercase());
        let move_index = index_names(
            "move",
            all_moves
                .iter()
                .map(|m| (m.name.as_str(), m.display_name.as_str())),
        )?;
        let moves: HashMap<&str, &Move> =
            all_moves.iter().map(|m| (m.name.as_str(), m)).collect();

        let mut entries = raw
            .pokemon
            .into_iter()
            .map(|raw| {
                let mut learnset = raw
                    .learnset
                    .into_iter()
                    .map(|learn| {
                        let info = moves.get(learn.move_name.as_str()).ok_or_else(|| {
                            DexError::Invalid(format!(
                                "{} learns unknown move {:?}",
                                raw.pokemon.name, learn.move_name
                            ))
                        })?;
                        Ok(LearnedMove {
                            level: learn.level,
                            method: learn.method,
                            info: (*info).clone(),
                        })
                    })
                    .collect::<DexResult<Vec<_>>>()?;
                learnset.sort_by(|a, b| {
                    a.level
                        .cmp(&b.level)
                        .then_with(|| a.info.display_name.cmp(&b.info.display_name))
                });
                // A dataset without a chart only serves learnsets.
                if !chart.is_empty()
                    && let Some(unknown) = raw.pokemon.types.iter().find(|t| !chart.contains(t))
                {
                    return Err(DexError::Invalid(format!(
                        "{} has unknown type {unknown:?}",
                        raw.pokemon.name
                    )));
                }
                Ok(Entry {
                    pokemon: raw.pokemon,
                    learnset,
                })
            })
            .collect::<DexResult<Vec<_>>>()?;
        entries.sort_by_cached_key(|e| e.pokemon.display_name.to_lowercase());

        let index = index_names(
            "pokemon",
            entries
                .iter()
                .map(|e| (e.pokemon.name.as_str(), e.pokemon.display_name.as_str())),
        )?;

        Ok(Self {
            generation: raw.generation,
            entries,
            index,
            moves: all_moves,
            move_index,
            chart,
        })
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index
            .get(&name.trim().to_lowercase())
            .and_then(|&i| self.entries.get(i))
    }
}

/// The rows of `page`, plus whether any row follows it.
fn window(rows: Vec<LearnedMove>, page: Page) -> (Vec<LearnedMove>, bool) {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    let mut rows: Vec<_> = rows
        .into_iter()
        .skip(offset)
        .take(limit.saturating_add(1))
        .collect();
    let has_next = rows.len() > limit;
    rows.truncate(limit);
    (rows, has_next)
}

#[async_trait::async_trait]
impl Dex for SnapshotDex {
    fn generation(&self) -> &str {
        &self.generation
    }

    async fn search_pokemon(&self, prefix: &str, limit: usize) -> DexResult<Vec<Pokemon>> {
        let prefix = prefix.trim().to_lowercase();
        Ok(self
            .entries
            .iter()
            .filter(|e| e.pokemon.display_name.to_lowercase().starts_with(&prefix))
            .take(limit)
            .map(|e| e.pokemon.clone())
            .collect())
    }

    async fn pokemon(&self, name: &str) -> DexResult<Option<Pokemon>> {
        Ok(self.entry(name).map(|e| e.pokemon.clone()))
    }

    async fn search_moves(&self, prefix: &str, limit: usize) -> DexResult<Vec<Move>> {
        let prefix = prefix.trim().to_lowercase();
        Ok(self
            .moves
            .iter()
            .filter(|m| m.display_name.to_lowercase().starts_with(&prefix))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_move(&self, name: &str) -> DexResult<Option<Move>> {
        Ok(self
            .move_index
            .get(&name.trim().to_lowercase())
            .and_then(|&i| self.moves.get(i))
            .cloned())
    }

    async fn search_types(&self, prefix: &str, limit: usize) -> DexResult<Vec<PokemonType>> {
        Ok(self.chart.search(prefix, limit))
    }

    async fn find_type(&self, name: &str) -> DexResult<Option<PokemonType>> {
        Ok(self.chart.get(name).cloned())
    }

    async fn defending(&self, types: &[String]) -> DexResult<Vec<Efficacy>> {
        self.chart.defending(types)
    }

    async fn attacking(&self, attacker: &str) -> DexResult<Vec<Efficacy>> {
        self.chart.attacking(attacker)
    }

    async fn learnset(
        &self,
        name: &str,
        filter: LearnsetFilter,
        page: Page,
    ) -> DexResult<(Vec<LearnedMove>, bool)> {
        let Some(entry) = self.entry(name) else {
            return Ok((Vec::new(), false));
        };
        let mut seen = HashSet::new();
        let rows = entry
            .learnset
            .iter()
            .filter(|m| match m.method {
                LearnMethod::LevelUp => true,
                LearnMethod::Egg => filter.egg_moves,
                LearnMethod::Machine | LearnMethod::Tutor => false,
            })
            .filter(|m| m.level <= filter.max_level)
            // Ascending order, so the first sighting is the earliest level.
            .filter(|m| seen.insert(m.info.name.as_str()))
            .cloned()
            .collect();
        Ok(window(rows, page))
    }

    async fn moveset(
        &self,
        name: &str,
        level: u32,
        page: Page,
    ) -> DexResult<(Vec<LearnedMove>, bool)> {
        let Some(entry) = self.entry(name) else {
            return Ok((Vec::new(), false));
        };

        let mut latest: Vec<&LearnedMove> = Vec::new();
        let mut seen = HashSet::new();
        for learned in entry
            .learnset
            .iter()
            .rev()
            .filter(|m| m.method == LearnMethod::LevelUp && m.level <= level)
        {
            if seen.insert(learned.info.name.as_str()) {
                latest.push(learned);
            }
        }

        // Competition ranking by level, highest first: a move survives when
        // fewer than MOVESET_SIZE moves were learned strictly later.
        let mut rows: Vec<LearnedMove> = latest
            .iter()
            .filter(|m| latest.iter().filter(|o| o.level > m.level).count() < MOVESET_SIZE)
            .map(|m| (*m).clone())
            .collect();
        rows.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then_with(|| a.info.display_name.cmp(&b.info.display_name))
        });
        Ok(window(rows, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../data/pokedex.json");

    fn fixture(learnset: &str) -> SnapshotDex {
        let text = format!(
            r#"{{
                "generation": "Generation IX",
                "moves": [
                    {{ "name": "a", "display_name": "Alpha", "type": "Normal", "damage_class": "Physical", "power": 40, "accuracy": 100, "pp": 35 }},
                    {{ "name": "b", "display_name": "Bravo", "type": "Normal", "damage_class": "Status", "accuracy": 100, "pp": 40 }},
                    {{ "name": "c", "display_name": "Charlie", "type": "Grass", "damage_class": "Special", "power": 45, "accuracy": 100, "pp": 25 }},
                    {{ "name": "d", "display_name": "Delta", "type": "Grass", "damage_class": "Status", "pp": 10 }},
                    {{ "name": "e", "display_name": "Echo", "type": "Grass", "damage_class": "Physical", "power": 55, "accuracy": 95, "pp": 25 }},
                    {{ "name": "f", "display_name": "Foxtrot", "type": "Poison", "damage_class": "Status", "accuracy": 75, "pp": 35 }}
                ],
                "pokemon": [{{
                    "name": "testmon", "display_name": "Testmon", "types": ["Grass"],
                    "learnset": [{learnset}]
                }}]
            }}"#
        );
        SnapshotDex::from_json(&text).unwrap()
    }

    fn names(rows: &[LearnedMove]) -> Vec<&str> {
        rows.iter().map(|m| m.info.name.as_str()).collect()
    }

    const ALL: LearnsetFilter = LearnsetFilter {
        max_level: 100,
        egg_moves: false,
    };

    #[test]
    fn sample_dataset_loads() {
        let dex = SnapshotDex::from_json(SAMPLE).unwrap();
        assert!(!dex.entries.is_empty());
        assert!(dex.entry("bulbasaur").is_some());
        assert!(dex.entry("Mr. Mime").is_some());
    }

    #[test]
    fn unknown_move_reference_is_invalid() {
        let text = r#"{
            "generation": "I",
            "moves": [],
            "pokemon": [{ "name": "x", "display_name": "X", "types": [],
                          "learnset": [{ "move": "ghost", "level": 1, "method": "level-up" }] }]
        }"#;
        assert!(matches!(
            SnapshotDex::from_json(text),
            Err(DexError::Invalid(msg)) if msg.contains("ghost")
        ));
    }

    #[test]
    fn duplicate_pokemon_is_invalid() {
        let text = r#"{
            "generation": "I",
            "pokemon": [
                { "name": "x", "display_name": "X", "types": [] },
                { "name": "X", "display_name": "Other", "types": [] }
            ]
        }"#;
        assert!(matches!(SnapshotDex::from_json(text), Err(DexError::Invalid(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = SnapshotDex::load(&path).err().unwrap();
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_prefix_in_order() {
        let dex = SnapshotDex::from_json(SAMPLE).unwrap();
        let found = dex.search_pokemon("VEN", 25).await.unwrap();
        assert_eq!(found[0].display_name, "Venusaur");

        let all = dex.search_pokemon("", 3).await.unwrap();
        assert_eq!(all.len(), 3);
        let mut sorted = all.clone();
        sorted.sort_by_key(|p| p.display_name.to_lowercase());
        assert_eq!(all, sorted);

        assert!(dex.search_pokemon("zzz", 25).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pokemon_lookup_accepts_key_or_display_name() {
        let dex = SnapshotDex::from_json(SAMPLE).unwrap();
        let by_key = dex.pokemon("mr-mime").await.unwrap().unwrap();
        let by_display = dex.pokemon("  mr. mime ").await.unwrap().unwrap();
        assert_eq!(by_key, by_display);
        assert!(dex.pokemon("missingno").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn learnset_filters_dedupes_and_orders() {
        let dex = fixture(
            r#"
            { "move": "c", "level": 9, "method": "level-up" },
            { "move": "a", "level": 1, "method": "level-up" },
            { "move": "b", "level": 1, "method": "level-up" },
            { "move": "c", "level": 20, "method": "level-up" },
            { "move": "d", "level": 1, "method": "egg" },
            { "move": "e", "level": 30, "method": "level-up" },
            { "move": "f", "level": 0, "method": "machine" }
            "#,
        );

        let (rows, has_next) = dex.learnset("testmon", ALL, Page::first(15)).await.unwrap();
        assert_eq!(names(&rows), ["a", "b", "c", "e"]);
        assert_eq!(rows[2].level, 9);
        assert!(!has_next);

        let filter = LearnsetFilter {
            max_level: 9,
            egg_moves: true,
        };
        let (rows, _) = dex.learnset("testmon", filter, Page::first(15)).await.unwrap();
        assert_eq!(names(&rows), ["a", "b", "d", "c"]);
        assert_eq!(rows[2].method, LearnMethod::Egg);
    }

    #[tokio::test]
    async fn learnset_pages_look_one_row_ahead() {
        let dex = fixture(
            r#"
            { "move": "a", "level": 1, "method": "level-up" },
            { "move": "b", "level": 2, "method": "level-up" },
            { "move": "c", "level": 3, "method": "level-up" },
            { "move": "d", "level": 4, "method": "level-up" }
            "#,
        );
        let first = Page::first(2);
        let (rows, has_next) = dex.learnset("testmon", ALL, first).await.unwrap();
        assert_eq!(names(&rows), ["a", "b"]);
        assert!(has_next);

        // Exactly full last page: nothing follows.
        let (rows, has_next) = dex.learnset("testmon", ALL, first.next()).await.unwrap();
        assert_eq!(names(&rows), ["c", "d"]);
        assert!(!has_next);

        let (rows, has_next) = dex
            .learnset("testmon", ALL, first.next().next())
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert!(!has_next);
    }

    #[tokio::test]
    async fn unknown_pokemon_has_no_rows() {
        let dex = fixture("");
        let (rows, has_next) = dex.learnset("nobody", ALL, Page::first(15)).await.unwrap();
        assert!(rows.is_empty() && !has_next);
        let (rows, _) = dex.moveset("nobody", 50, Page::first(15)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn moveset_keeps_four_most_recent() {
        let dex = fixture(
            r#"
            { "move": "a", "level": 1, "method": "level-up" },
            { "move": "b", "level": 5, "method": "level-up" },
            { "move": "c", "level": 10, "method": "level-up" },
            { "move": "d", "level": 15, "method": "level-up" },
            { "move": "e", "level": 20, "method": "level-up" },
            { "move": "f", "level": 25, "method": "level-up" }
            "#,
        );
        let (rows, has_next) = dex.moveset("testmon", 22, Page::first(15)).await.unwrap();
        assert_eq!(names(&rows), ["b", "c", "d", "e"]);
        assert!(!has_next);

        let (rows, _) = dex.moveset("testmon", 4, Page::first(15)).await.unwrap();
        assert_eq!(names(&rows), ["a"]);
    }

    #[tokio::test]
    async fn moveset_ties_share_a_rank() {
        let dex = fixture(
            r#"
            { "move": "a", "level": 1, "method": "level-up" },
            { "move": "b", "level": 1, "method": "level-up" },
            { "move": "c", "level": 1, "method": "level-up" },
            { "move": "d", "level": 7, "method": "level-up" },
            { "move": "e", "level": 9, "method": "level-up" },
            { "move": "f", "level": 9, "method": "egg" }
            "#,
        );
        // Ranks: e=1, d=2, a/b/c=3, so all five survive.
        let (rows, _) = dex.moveset("testmon", 10, Page::first(15)).await.unwrap();
        assert_eq!(names(&rows), ["a", "b", "c", "d", "e"]);

        let (rows, has_next) = dex.moveset("testmon", 10, Page::first(4)).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert!(has_next);
    }

    #[tokio::test]
    async fn moveset_uses_latest_relearn() {
        let dex = fixture(
            r#"
            { "move": "a", "level": 1, "method": "level-up" },
            { "move": "b", "level": 2, "method": "level-up" },
            { "move": "c", "level": 3, "method": "level-up" },
            { "move": "d", "level": 4, "method": "level-up" },
            { "move": "a", "level": 12, "method": "level-up" }
            "#,
        );
        let (rows, _) = dex.moveset("testmon", 20, Page::first(15)).await.unwrap();
        assert_eq!(names(&rows), ["b", "c", "d", "a"]);
        assert_eq!(rows[3].level, 12);
    }

    #[test]
    fn overlong_names_are_invalid() {
        let text = format!(
            r#"{{ "generation": "I",
                 "pokemon": [{{ "name": "{}", "display_name": "X", "types": [] }}] }}"#,
            "x".repeat(usize::from(MAX_NAME_LEN) + 1)
        );
        assert!(matches!(
            SnapshotDex::from_json(&text),
            Err(DexError::Invalid(msg)) if msg.contains("longer than")
        ));
    }

    #[test]
    fn pokemon_types_must_be_charted() {
        let text = r#"{
            "generation": "I",
            "types": [{ "name": "fire", "display_name": "Fire" }],
            "pokemon": [{ "name": "x", "display_name": "X", "types": ["Fire", "Shadow"] }]
        }"#;
        assert!(matches!(
            SnapshotDex::from_json(text),
            Err(DexError::Invalid(msg)) if msg.contains("Shadow")
        ));
    }

    #[tokio::test]
    async fn moves_are_searchable_and_found_by_either_name() {
        let dex = SnapshotDex::from_json(SAMPLE).unwrap();
        let found = dex.search_moves("so", 25).await.unwrap();
        assert_eq!(found[0].display_name, "Solar Beam");

        let by_key = dex.find_move("vine-whip").await.unwrap().unwrap();
        let by_display = dex.find_move(" VINE WHIP").await.unwrap().unwrap();
        assert_eq!(by_key, by_display);
        assert!(dex.find_move("splash").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sample_chart_covers_eighteen_types() {
        let dex = SnapshotDex::from_json(SAMPLE).unwrap();
        assert_eq!(dex.search_types("", 25).await.unwrap().len(), 18);
        assert_eq!(dex.find_type("fairy").await.unwrap().unwrap().display_name, "Fairy");

        let effs = dex
            .defending(&["Grass".to_owned(), "Poison".to_owned()])
            .await
            .unwrap();
        let psychic = effs.iter().find(|e| e.opposing.name == "psychic").unwrap();
        assert_eq!(psychic.factor, 200);
        let grass = effs.iter().find(|e| e.opposing.name == "grass").unwrap();
        assert_eq!(grass.factor, 25);
    }
}
