/// Oxidation-state inference for a single species.
///
/// The states are assigned by a prioritized list of rules. Each rule looks at the whole species
/// and at one element of it and either assigns a state or passes; the first rule that assigns
/// wins. Elements no rule covers are resolved afterwards: a single one is solved from the net
/// charge, several are looked up in a small table of common states and otherwise set to 0.
use crate::Redox::errors::{RedoxError, checked_add, checked_mul, checked_sub, exact_div};
use crate::Redox::formula::Species;
use crate::Redox::species_parser::process_ion;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;

/// Element symbol -> oxidation number for one species, in formula order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OxidationProfile {
    states: Vec<(String, i32)>,
}

impl OxidationProfile {
    pub fn get(&self, element: &str) -> Option<i32> {
        self.states
            .iter()
            .find(|(el, _)| el == element)
            .map(|(_, state)| *state)
    }

    pub fn set(&mut self, element: &str, state: i32) {
        match self.states.iter_mut().find(|(el, _)| el == element) {
            Some((_, existing)) => *existing = state,
            None => self.states.push((element.to_string(), state)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.states.iter().map(|(el, state)| (el.as_str(), *state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// sum of oxidation number times atom count
    pub fn weighted_sum(&self, species: &Species) -> Result<i64, RedoxError> {
        let context = format!("summing the oxidation states of {}", species.formula);
        self.iter().try_fold(0i64, |sum, (el, state)| {
            let term = checked_mul(state as i64, species.atoms.get(el) as i64, &context)?;
            checked_add(sum, term, &context)
        })
    }

    pub fn to_map(&self) -> HashMap<String, i32> {
        self.states.iter().cloned().collect()
    }
}

impl fmt::Display for OxidationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(el, state)| {
                if state > 0 {
                    format!("{}: +{}", el, state)
                } else {
                    format!("{}: {}", el, state)
                }
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// One entry of the rule cascade.
pub struct OxidationRule {
    pub name: &'static str,
    pub assign: fn(&Species, &str) -> Option<i32>,
}

/// Species whose states differ from the standard element rules
const SPECIES_OVERRIDES: &[(&str, &[(&str, i32)])] = &[
    ("O2^2-", &[("O", -1)]),
    ("H2O2", &[("H", 1), ("O", -1)]),
    ("Na2O2", &[("Na", 1), ("O", -1)]),
    ("BaO2", &[("Ba", 2), ("O", -1)]),
    ("ClO^-", &[("Cl", 1), ("O", -2)]),
    ("MnO4^-", &[("Mn", 7), ("O", -2)]),
    ("MnO4^2-", &[("Mn", 6), ("O", -2)]),
    ("MnO2", &[("Mn", 4), ("O", -2)]),
    ("OF2", &[("O", 2), ("F", -1)]),
    ("LiH", &[("Li", 1), ("H", -1)]),
    ("NaH", &[("Na", 1), ("H", -1)]),
    ("KH", &[("K", 1), ("H", -1)]),
    ("CaH2", &[("Ca", 2), ("H", -1)]),
    ("MgH2", &[("Mg", 2), ("H", -1)]),
    ("LiAlH4", &[("Li", 1), ("Al", 3), ("H", -1)]),
    ("NaBH4", &[("Na", 1), ("B", 3), ("H", -1)]),
];

/// Used when several elements of a species are not covered by any rule
const COMMON_STATES: &[(&str, &str, i32)] = &[
    ("SO2", "S", 4),
    ("SO3", "S", 6),
    ("H2S", "S", -2),
    ("NO", "N", 2),
    ("NO2", "N", 4),
    ("NH3", "N", -3),
    ("CO2", "C", 4),
    ("CO", "C", 2),
    ("CH4", "C", -4),
];

fn elemental_form(species: &Species, _element: &str) -> Option<i32> {
    (species.charge == 0 && species.atoms.len() == 1).then_some(0)
}

fn monatomic_ion(species: &Species, element: &str) -> Option<i32> {
    (species.atoms.len() == 1 && species.atoms.get(element) == 1).then_some(species.charge)
}

fn species_override(species: &Species, element: &str) -> Option<i32> {
    SPECIES_OVERRIDES
        .iter()
        .find(|(formula, _)| *formula == species.formula)
        .and_then(|(_, states)| states.iter().find(|(el, _)| *el == element))
        .map(|(_, state)| *state)
}

fn standard_element(species: &Species, element: &str) -> Option<i32> {
    let oxygen_free = !species.atoms.contains("O");
    match element {
        "H" => Some(1),
        "O" => Some(-2),
        "F" => Some(-1),
        "Cl" | "Br" | "I" if oxygen_free => Some(-1),
        "Li" | "Na" | "K" | "Rb" | "Cs" => Some(1),
        "Be" | "Mg" | "Ca" | "Sr" | "Ba" => Some(2),
        "Al" => Some(3),
        "Mn" if oxygen_free => Some(2),
        _ => None,
    }
}

pub const RULES: &[OxidationRule] = &[
    OxidationRule {
        name: "elemental form",
        assign: elemental_form,
    },
    OxidationRule {
        name: "monatomic ion",
        assign: monatomic_ion,
    },
    OxidationRule {
        name: "species override",
        assign: species_override,
    },
    OxidationRule {
        name: "standard element",
        assign: standard_element,
    },
];

fn common_state(formula: &str, element: &str) -> Option<i32> {
    COMMON_STATES
        .iter()
        .find(|(f, el, _)| *f == formula && *el == element)
        .map(|(_, _, state)| *state)
}

/// Infers the oxidation state of every element of the species.
pub fn infer_oxidation_states(species: &Species) -> Result<OxidationProfile, RedoxError> {
    if species.atoms.is_empty() {
        return Err(RedoxError::UnrecognizedSpecies(species.formula.clone()));
    }
    let mut assigned: Vec<(&str, Option<i32>)> = Vec::with_capacity(species.atoms.len());
    for (element, _) in species.atoms.iter() {
        let state = RULES.iter().find_map(|rule| {
            let state = (rule.assign)(species, element);
            if let Some(s) = state {
                debug!("{} in {}: {} by rule '{}'", element, species.formula, s, rule.name);
            }
            state
        });
        assigned.push((element, state));
    }

    let unknown: Vec<&str> = assigned
        .iter()
        .filter(|(_, state)| state.is_none())
        .map(|(el, _)| *el)
        .collect();
    let mut defaulted = false;
    match unknown.as_slice() {
        [] => {}
        [element] => {
            let context =
                format!("solving the oxidation state of {} in {}", element, species.formula);
            let known = assigned.iter().try_fold(0i64, |sum, (el, state)| match state {
                Some(s) => checked_add(
                    sum,
                    checked_mul(*s as i64, species.atoms.get(el) as i64, &context)?,
                    &context,
                ),
                None => Ok(sum),
            })?;
            let count = species.atoms.get(element) as i64;
            let state = exact_div(
                checked_sub(species.charge as i64, known, &context)?,
                count,
                &context,
            )?;
            let state = i32::try_from(state).map_err(|_| RedoxError::Overflow(context.clone()))?;
            set_state(&mut assigned, element, state);
        }
        several => {
            for element in several {
                let state = common_state(&species.formula, element).unwrap_or_else(|| {
                    warn!("no rule for {} in {}, assuming 0", element, species.formula);
                    0
                });
                set_state(&mut assigned, element, state);
            }
            defaulted = true;
        }
    }

    let mut profile = OxidationProfile::default();
    for (element, state) in assigned {
        if let Some(state) = state {
            profile.set(element, state);
        }
    }
    if profile.is_empty() {
        return Err(RedoxError::UnrecognizedSpecies(species.formula.clone()));
    }
    if !defaulted {
        let found = profile.weighted_sum(species)?;
        if found != species.charge as i64 {
            return Err(RedoxError::ChargeMismatch {
                species: species.formula.clone(),
                expected: species.charge as i64,
                found,
            });
        }
    }
    Ok(profile)
}

fn set_state(assigned: &mut [(&str, Option<i32>)], element: &str, state: i32) {
    if let Some(entry) = assigned.iter_mut().find(|(el, _)| *el == element) {
        entry.1 = Some(state);
    }
}

/// Convenience entry point taking the species as written by the user.
pub fn get_oxidation_state(species: &str) -> Result<OxidationProfile, RedoxError> {
    let species = process_ion(species)?;
    infer_oxidation_states(&species)
}

/// A species together with its inferred oxidation profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedSpecies {
    pub species: Species,
    pub profile: OxidationProfile,
}

pub fn analyze_species(formula: &str) -> Result<AnalyzedSpecies, RedoxError> {
    let species = Species::parse(formula)?;
    let profile = infer_oxidation_states(&species)?;
    Ok(AnalyzedSpecies { species, profile })
}
