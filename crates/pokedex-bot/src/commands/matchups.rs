//! Type chart rendering shared by `/weak` and `/coverage`.

use pokedex_interaction::prelude::*;
use tracing::warn;

use crate::dex::Efficacy;

/// Field titles for each damage bucket.
pub(super) struct ChartLabels {
    pub(super) quadruple: &'static str,
    pub(super) double: &'static str,
    /// Shown only on charts that list every bucket.
    pub(super) neutral: Option<&'static str>,
    pub(super) half: &'static str,
    pub(super) quarter: &'static str,
    pub(super) immune: &'static str,
}

impl ChartLabels {
    /// Damage taken by a defender.
    pub(super) const DEFENSIVE: Self = Self {
        quadruple: "Weaknesses (4x)",
        double: "Weaknesses (2x)",
        neutral: None,
        half: "Resistances (0.5x)",
        quarter: "Resistances (0.25x)",
        immune: "Immunities",
    };

    /// Damage dealt by an attacker.
    pub(super) const OFFENSIVE: Self = Self {
        quadruple: "Super Effective (4x)",
        double: "Super Effective (2x)",
        neutral: Some("Neutral (1x)"),
        half: "Resists (0.5x)",
        quarter: "Resists (0.25x)",
        immune: "Immune",
    };

    fn complete(&self) -> bool {
        self.neutral.is_some()
    }
}

/// One field per damage bucket, strongest first. Empty buckets are left out
/// unless the labels ask for a complete chart, where the 2x, 1x, 0.5x and
/// immune rows always show.
pub(super) fn chart_fields(efficacies: &[Efficacy], labels: &ChartLabels) -> Vec<EmbedField> {
    let mut buckets: [Vec<&str>; 6] = Default::default();
    for efficacy in efficacies {
        let slot = match efficacy.factor {
            400 => 0,
            200 => 1,
            100 => 2,
            50 => 3,
            25 => 4,
            0 => 5,
            other => {
                warn!(factor = other, opposing = %efficacy.opposing.name, "unexpected damage factor");
                continue;
            },
        };
        buckets[slot].push(efficacy.opposing.display_name.as_str());
    }
    let [quadruple, double, neutral, half, quarter, immune] = buckets;

    let complete = labels.complete();
    let rows = [
        (Some(labels.quadruple), quadruple, false),
        (Some(labels.double), double, complete),
        (labels.neutral, neutral, complete),
        (Some(labels.half), half, complete),
        (Some(labels.quarter), quarter, false),
        (Some(labels.immune), immune, complete),
    ];
    rows.into_iter()
        .filter_map(|(label, types, always)| {
            let label = label?;
            if types.is_empty() && !always {
                return None;
            }
            let value = if types.is_empty() {
                "_None_".to_owned()
            } else {
                types.join(" ")
            };
            Some(EmbedField {
                name: label.to_owned(),
                value,
                inline: None,
            })
        })
        .collect()
}
