//! Effects of consuming an item or fluid, read from its food condition sets.

use crate::resolve_soft;
use ingestion::ReferenceResolver;
use pakdump_core::schema::{FoodConditionSetProps, KeyValue};
use pakdump_core::{ObjectRecord, RecordKind};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::warn;

fn condition_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bC_(\w+)_C\b").ok()).as_ref()
}

fn addiction_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bADD_(\w+)\b").ok()).as_ref()
}

fn skill_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bST_(\w+)_C\b").ok()).as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTrigger {
    Eat,
    Drink,
    Inject,
}

impl ConditionTrigger {
    pub const ALL: [ConditionTrigger; 3] = [
        ConditionTrigger::Eat,
        ConditionTrigger::Drink,
        ConditionTrigger::Inject,
    ];

    /// Property holding the condition set reference.
    pub fn property(&self) -> &'static str {
        match self {
            ConditionTrigger::Eat => "ConditionsOnEat",
            ConditionTrigger::Drink => "ConditionsOnDrink",
            ConditionTrigger::Inject => "ConditionsOnInject",
        }
    }
}

/// A named effect and its magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effect {
    pub name: String,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionEffects {
    pub trigger: ConditionTrigger,
    /// Console name of the condition set.
    pub source: String,
    pub conditions: Vec<Effect>,
    pub addictions: Vec<Effect>,
    pub skill_xp: Vec<Effect>,
    pub blood_sugar_impact: Option<f64>,
}

impl ConditionEffects {
    pub fn is_valid(&self) -> bool {
        !self.conditions.is_empty()
            || !self.addictions.is_empty()
            || !self.skill_xp.is_empty()
            || self.blood_sugar_impact.is_some_and(|impact| impact != 0.0)
    }
}

/// Effects for every trigger the record defines, in eat/drink/inject order.
pub fn condition_effects(resolver: &ReferenceResolver, record: &ObjectRecord) -> Vec<ConditionEffects> {
    ConditionTrigger::ALL
        .iter()
        .filter_map(|trigger| {
            let reference = record.properties.reference(trigger.property())?;
            let set = resolve_soft(resolver, &reference)?;
            if set.kind != RecordKind::FoodConditionSet {
                warn!(reference = %reference.object_name, kind = %set.kind, "Not a food condition set");
                return None;
            }
            let props: FoodConditionSetProps = match set.properties.decode() {
                Ok(props) => props,
                Err(err) => {
                    warn!(reference = %reference.object_name, error = %err, "Malformed food condition set");
                    return None;
                }
            };
            let effects = ConditionEffects {
                trigger: *trigger,
                source: set.console_name().to_string(),
                conditions: extract(condition_pattern(), &props.conditions),
                addictions: extract(addiction_pattern(), &props.addictions),
                skill_xp: extract(skill_pattern(), &props.xp_gain),
                blood_sugar_impact: props.blood_sugar_impact,
            };
            effects.is_valid().then_some(effects)
        })
        .collect()
}

/// Keys not matching `pattern` are dropped.
fn extract(pattern: Option<&Regex>, entries: &[KeyValue]) -> Vec<Effect> {
    let Some(pattern) = pattern else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let caps = pattern.captures(&entry.key)?;
            Some(Effect {
                name: humanize(&caps[1]),
                magnitude: entry.value,
            })
        })
        .collect()
}

/// `MeleeCombat` -> `Melee Combat`, `Well_Fed` -> `Well Fed`.
pub fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c == '_' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            prev = None;
            continue;
        }
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            out.push(' ');
        }
        out.push(c);
        prev = Some(c);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(key: &str, value: f64) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("MeleeCombat"), "Melee Combat");
        assert_eq!(humanize("Well_Fed"), "Well Fed");
        assert_eq!(humanize("Drunk"), "Drunk");
        assert_eq!(humanize("HP"), "HP");
    }

    #[test]
    fn test_extract_drops_unmatched_keys() {
        let entries = vec![
            kv(
                "/Script/Engine.BlueprintGeneratedClass'/Game/Vein/Gameplay/Conditions/C_Drunk.C_Drunk_C'",
                20.0,
            ),
            kv("C_Hydrated_C", 5.0),
            kv("SomethingElse", 1.0),
        ];
        let effects = extract(condition_pattern(), &entries);
        assert_eq!(
            effects,
            vec![
                Effect {
                    name: "Drunk".into(),
                    magnitude: 20.0
                },
                Effect {
                    name: "Hydrated".into(),
                    magnitude: 5.0
                },
            ]
        );
    }

    #[test]
    fn test_patterns_are_independent() {
        let entries = vec![kv("ADD_Alcohol", 8.0), kv("ST_Strength_C", 100.0)];
        assert!(extract(condition_pattern(), &entries).is_empty());
        assert_eq!(extract(addiction_pattern(), &entries)[0].name, "Alcohol");
        assert_eq!(extract(skill_pattern(), &entries)[0].name, "Strength");
    }
}
