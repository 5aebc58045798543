//! Decides whether a reaction is treated as a redox reaction.
//!
//! Any ion written with explicit `^` notation makes the reaction redox; otherwise the
//! oxidation states of every element are compared pairwise between reactants and products.
use crate::Redox::errors::RedoxError;
use crate::Redox::oxidation_states::{AnalyzedSpecies, analyze_species};

/// First element found whose state differs between a reactant and a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub element: String,
    pub reactant: String,
    pub product: String,
    pub from: i32,
    pub to: i32,
}

pub fn has_ionic_notation(reactants: &[AnalyzedSpecies], products: &[AnalyzedSpecies]) -> bool {
    reactants
        .iter()
        .chain(products)
        .any(|s| s.species.has_ionic_notation())
}

/// Scans reactants in order, their elements in formula order, then products in order.
pub fn first_state_change(
    reactants: &[AnalyzedSpecies],
    products: &[AnalyzedSpecies],
) -> Option<StateChange> {
    for reactant in reactants {
        for (element, from) in reactant.profile.iter() {
            for product in products {
                if let Some(to) = product.profile.get(element) {
                    if to != from {
                        return Some(StateChange {
                            element: element.to_string(),
                            reactant: reactant.species.formula.clone(),
                            product: product.species.formula.clone(),
                            from,
                            to,
                        });
                    }
                }
            }
        }
    }
    None
}

pub fn is_redox(reactants: &[AnalyzedSpecies], products: &[AnalyzedSpecies]) -> bool {
    has_ionic_notation(reactants, products) || first_state_change(reactants, products).is_some()
}

/// Same as [`is_redox`] for normalized formulas; fails if a species cannot be analyzed.
pub fn is_redox_reaction(reactants: &[String], products: &[String]) -> Result<bool, RedoxError> {
    let reactants = reactants
        .iter()
        .map(|r| analyze_species(r))
        .collect::<Result<Vec<_>, _>>()?;
    let products = products
        .iter()
        .map(|p| analyze_species(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(is_redox(&reactants, &products))
}
