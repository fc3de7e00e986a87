//! Type effectiveness chart.

use std::collections::HashMap;

use serde::Deserialize;

use super::{DexError, DexResult, Efficacy, NEUTRAL, PokemonType};

/// Factors a snapshot may list for a single attacker and defender.
const FACTORS: [u32; 4] = [0, 50, NEUTRAL, 200];

#[derive(Deserialize)]
pub(super) struct RawType {
    #[serde(flatten)]
    info: PokemonType,
    /// Factor against each defending type, by key. Unlisted types take
    /// neutral damage.
    #[serde(default)]
    damage: HashMap<String, u32>,
}

pub(super) struct TypeChart {
    /// Dataset order, which is also the order matchups are reported in.
    types: Vec<PokemonType>,
    /// Lowercased key and display name to position.
    index: HashMap<String, usize>,
    /// `factors[attacker][defender]`.
    factors: Vec<Vec<u32>>,
    /// Positions in display-name order.
    alphabetical: Vec<usize>,
}

impl TypeChart {
    pub(super) fn build(raw: Vec<RawType>) -> DexResult<Self> {
        let mut index = HashMap::with_capacity(raw.len().saturating_mul(2));
        for (i, t) in raw.iter().enumerate() {
            if index.insert(t.info.name.to_lowercase(), i).is_some() {
                return Err(DexError::Invalid(format!("duplicate type {:?}", t.info.name)));
            }
        }
        for (i, t) in raw.iter().enumerate() {
            index.entry(t.info.display_name.to_lowercase()).or_insert(i);
        }

        let mut factors = Vec::with_capacity(raw.len());
        for t in &raw {
            let mut row = vec![NEUTRAL; raw.len()];
            for (target, &factor) in &t.damage {
                let Some(&j) = index.get(&target.to_lowercase()) else {
                    return Err(DexError::Invalid(format!(
                        "{} damages unknown type {target:?}",
                        t.info.name
                    )));
                };
                if !FACTORS.contains(&factor) {
                    return Err(DexError::Invalid(format!(
                        "{} deals unsupported factor {factor} to {target}",
                        t.info.name
                    )));
                }
                row[j] = factor;
            }
            factors.push(row);
        }

        let types: Vec<PokemonType> = raw.into_iter().map(|t| t.info).collect();
        let mut alphabetical: Vec<usize> = (0..types.len()).collect();
        alphabetical.sort_by_cached_key(|&i| types[i].display_name.to_lowercase());

        Ok(Self {
            types,
            index,
            factors,
            alphabetical,
        })
    }

    pub(super) fn len(&self) -> usize {
        self.types.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.trim().to_lowercase()).copied()
    }

    pub(super) fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(super) fn get(&self, name: &str) -> Option<&PokemonType> {
        self.position(name).and_then(|i| self.types.get(i))
    }

    pub(super) fn search(&self, prefix: &str, limit: usize) -> Vec<PokemonType> {
        let prefix = prefix.trim().to_lowercase();
        self.alphabetical
            .iter()
            .map(|&i| &self.types[i])
            .filter(|t| t.display_name.to_lowercase().starts_with(&prefix))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Each attacker against the combination of `defenders`, factors
    /// multiplied together.
    pub(super) fn defending(&self, defenders: &[String]) -> DexResult<Vec<Efficacy>> {
        let targets = defenders
            .iter()
            .map(|name| {
                self.position(name)
                    .ok_or_else(|| DexError::Invalid(format!("unknown type {name:?}")))
            })
            .collect::<DexResult<Vec<_>>>()?;

        Ok(self
            .types
            .iter()
            .zip(&self.factors)
            .map(|(attacker, row)| Efficacy {
                opposing: attacker.clone(),
                factor: targets.iter().fold(NEUTRAL, |acc, &t| {
                    acc.saturating_mul(row[t]).saturating_div(NEUTRAL)
                }),
            })
            .collect())
    }

    pub(super) fn attacking(&self, attacker: &str) -> DexResult<Vec<Efficacy>> {
        let row = self
            .position(attacker)
            .and_then(|i| self.factors.get(i))
            .ok_or_else(|| DexError::Invalid(format!("unknown type {attacker:?}")))?;
        Ok(self
            .types
            .iter()
            .zip(row)
            .map(|(defender, &factor)| Efficacy {
                opposing: defender.clone(),
                factor,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> TypeChart {
        let raw: Vec<RawType> = serde_json::from_str(
            r#"[
                { "name": "fire", "display_name": "Fire",
                  "damage": { "fire": 50, "water": 50, "grass": 200, "steel": 200 } },
                { "name": "water", "display_name": "Water",
                  "damage": { "fire": 200, "water": 50, "grass": 50 } },
                { "name": "grass", "display_name": "Grass",
                  "damage": { "fire": 50, "water": 200, "grass": 50, "steel": 50 } },
                { "name": "ghost", "display_name": "Ghost", "damage": { "normal": 0 } },
                { "name": "normal", "display_name": "Normal", "damage": { "ghost": 0, "steel": 50 } },
                { "name": "steel", "display_name": "Steel",
                  "damage": { "fire": 50, "water": 50, "steel": 50 } }
            ]"#,
        )
        .unwrap();
        TypeChart::build(raw).unwrap()
    }

    fn factor_of(effs: &[Efficacy], name: &str) -> u32 {
        effs.iter().find(|e| e.opposing.name == name).unwrap().factor
    }

    #[test]
    fn attacking_row_defaults_to_neutral() {
        let effs = chart().attacking("Fire").unwrap();
        assert_eq!(effs.len(), 6);
        assert_eq!(factor_of(&effs, "grass"), 200);
        assert_eq!(factor_of(&effs, "ghost"), NEUTRAL);
        assert_eq!(effs[0].opposing.name, "fire");
    }

    #[test]
    fn dual_types_multiply() {
        let chart = chart();
        let effs = chart
            .defending(&["grass".to_owned(), "steel".to_owned()])
            .unwrap();
        assert_eq!(factor_of(&effs, "fire"), 400);
        assert_eq!(factor_of(&effs, "grass"), 25);
        assert_eq!(factor_of(&effs, "water"), 50);
        assert_eq!(factor_of(&effs, "normal"), 50);

        let effs = chart.defending(&["Ghost".to_owned()]).unwrap();
        assert_eq!(factor_of(&effs, "normal"), 0);
    }

    #[test]
    fn search_is_alphabetical() {
        let names: Vec<_> = chart()
            .search("", 10)
            .into_iter()
            .map(|t| t.display_name)
            .collect();
        assert_eq!(names, ["Fire", "Ghost", "Grass", "Normal", "Steel", "Water"]);
        assert_eq!(chart().search("g", 10).len(), 2);
    }

    #[test]
    fn unknown_targets_and_factors_are_invalid() {
        let raw: Vec<RawType> = serde_json::from_str(
            r#"[{ "name": "fire", "display_name": "Fire", "damage": { "ice": 200 } }]"#,
        )
        .unwrap();
        assert!(matches!(TypeChart::build(raw), Err(DexError::Invalid(m)) if m.contains("ice")));

        let raw: Vec<RawType> = serde_json::from_str(
            r#"[{ "name": "fire", "display_name": "Fire", "damage": { "fire": 300 } }]"#,
        )
        .unwrap();
        assert!(matches!(TypeChart::build(raw), Err(DexError::Invalid(m)) if m.contains("300")));
    }

    #[test]
    fn unknown_type_lookup_fails() {
        assert!(chart().get("shadow").is_none());
        assert!(chart().attacking("shadow").is_err());
        assert!(chart().defending(&["shadow".to_owned()]).is_err());
    }
}
