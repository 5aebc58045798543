//! Pre-balanced forms of well-known reactions.
//!
//! Several acidic-medium reactions need protons and water on the reactant side from the start,
//! which the half-reaction stages do not provide. Those reactions are answered from this table
//! before any analysis. The lookup key is the set of reactant formulas and the set of product
//! formulas with the medium species (`H2O`, `H^+`, `OH^-`) removed, so the order in which the
//! user lists species and whether water is written out do not matter.
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

pub struct KnownReaction {
    pub reactants: &'static [&'static str],
    pub products: &'static [&'static str],
    pub balanced: &'static str,
}

pub const KNOWN_REACTIONS: &[KnownReaction] = &[
    KnownReaction {
        reactants: &["H2O2", "MnO4^-"],
        products: &["Mn^2+", "O2"],
        balanced: "5H2O2 + 2MnO4^- + 6H^+ -> 2Mn^2+ + 5O2 + 8H2O",
    },
    KnownReaction {
        reactants: &["H2O2", "I^-"],
        products: &["I2", "H2O"],
        balanced: "H2O2 + 2I^- + 2H^+ -> I2 + 2H2O",
    },
    KnownReaction {
        reactants: &["MnO4^-", "C2O4^2-"],
        products: &["Mn^2+", "CO2"],
        balanced: "2MnO4^- + 5C2O4^2- + 16H^+ -> 2Mn^2+ + 10CO2 + 8H2O",
    },
    KnownReaction {
        reactants: &["Cr2O7^2-", "I^-"],
        products: &["Cr^3+", "I2"],
        balanced: "Cr2O7^2- + 6I^- + 14H^+ -> 2Cr^3+ + 3I2 + 7H2O",
    },
    KnownReaction {
        reactants: &["H2O2"],
        products: &["H2O", "O2"],
        balanced: "2H2O2 -> 2H2O + O2",
    },
    KnownReaction {
        reactants: &["S2O3^2-"],
        products: &["S", "SO4^2-"],
        balanced: "3S2O3^2- + 2H^+ -> 4S + 2SO4^2- + H2O",
    },
    KnownReaction {
        reactants: &["H2S", "O2"],
        products: &["SO2", "H2O"],
        balanced: "2H2S + 3O2 -> 2SO2 + 2H2O",
    },
    KnownReaction {
        reactants: &["NH3", "O2"],
        products: &["NO", "H2O"],
        balanced: "4NH3 + 5O2 -> 4NO + 6H2O",
    },
    KnownReaction {
        reactants: &["CH4", "O2"],
        products: &["CO2", "H2O"],
        balanced: "CH4 + 2O2 -> CO2 + 2H2O",
    },
    KnownReaction {
        reactants: &["Cl2", "OH^-"],
        products: &["Cl^-", "ClO^-"],
        balanced: "Cl2 + 2OH^- -> Cl^- + ClO^- + H2O",
    },
];

/// species that only set the medium and never identify a reaction
const MEDIUM_SPECIES: &[&str] = &["H2O", "H^+", "OH^-"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionKey {
    reactants: BTreeSet<String>,
    products: BTreeSet<String>,
}

impl ReactionKey {
    pub fn new<S: AsRef<str>>(reactants: &[S], products: &[S]) -> Self {
        let canonical = |species: &[S]| -> BTreeSet<String> {
            species
                .iter()
                .map(|s| s.as_ref())
                .filter(|s| !MEDIUM_SPECIES.contains(s))
                .map(|s| s.to_string())
                .collect()
        };
        Self {
            reactants: canonical(reactants),
            products: canonical(products),
        }
    }
}

fn known_reaction_index() -> &'static HashMap<ReactionKey, usize> {
    static INDEX: OnceLock<HashMap<ReactionKey, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        KNOWN_REACTIONS
            .iter()
            .enumerate()
            .map(|(i, reaction)| (ReactionKey::new(reaction.reactants, reaction.products), i))
            .collect()
    })
}

/// Looks up the pre-balanced form of a reaction given as normalized formulas.
pub fn lookup_known_reaction(
    reactants: &[String],
    products: &[String],
) -> Option<&'static KnownReaction> {
    let key = ReactionKey::new(reactants, products);
    let found = known_reaction_index()
        .get(&key)
        .map(|&index| &KNOWN_REACTIONS[index]);
    if let Some(reaction) = found {
        debug!("known reaction: {}", reaction.balanced);
    }
    found
}
