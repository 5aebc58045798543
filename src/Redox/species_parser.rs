/// Parsing of a raw equation string into the normalized reactant and product species.
///
/// `2Na+ + Cl- -> NaCl` yields reactants `["Na^+", "Cl^-"]` and products `["NaCl"]`:
/// leading coefficients are dropped and the ionic suffix is always written with `^`.
use crate::Redox::errors::RedoxError;
use crate::Redox::formula::Species;
use log::debug;

pub const REACTION_ARROW: &str = "->";

/// Splits a leading stoichiometric coefficient off the token: `2H2O` -> (Some(2), "H2O")
pub fn split_coefficient(token: &str) -> (Option<u32>, &str) {
    let digits_end = token
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(token.len(), |(i, _)| i);
    if digits_end == 0 {
        return (None, token);
    }
    (token[..digits_end].parse().ok(), &token[digits_end..])
}

/// Rewrites the charge notation of a species into the `base^<digits><sign>` form.
/// `Cl-` -> `Cl^-`, `Na+` -> `Na^+`, `Fe^3` -> `Fe^3+`; atoms are never touched.
pub fn normalize_ion(species: &str) -> String {
    if let Some((base, suffix)) = species.split_once('^') {
        if suffix.ends_with('+') || suffix.ends_with('-') {
            species.to_string()
        } else {
            format!("{}^{}+", base, suffix)
        }
    } else if let Some(base) = species.strip_suffix('-') {
        format!("{}^-", base)
    } else if let Some(base) = species.strip_suffix('+') {
        format!("{}^+", base)
    } else {
        species.to_string()
    }
}

/// Coefficient stripping, normalization and validation of a single raw token
pub fn process_ion(token: &str) -> Result<Species, RedoxError> {
    let (_, formula) = split_coefficient(token.trim());
    Species::parse(&normalize_ion(formula))
}

// a '+' glued to the end of a formula ("Na+ ", "Fe^3++") is a charge sign,
// anything else separates two species
fn is_charge_sign(prev: Option<char>, next: Option<char>) -> bool {
    match prev {
        None => false,
        Some(c) if c.is_whitespace() || c == '+' => false,
        Some('^') => true,
        Some(_) => match next {
            None => true,
            Some(c) => c.is_whitespace() || c == '+',
        },
    }
}

/// Splits one side of an equation on its top-level `+` separators.
pub fn split_species(side: &str) -> Vec<String> {
    let chars: Vec<char> = side.chars().collect();
    let mut species = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '+' {
            let prev = if i == 0 { None } else { Some(chars[i - 1]) };
            let next = chars.get(i + 1).copied();
            if !is_charge_sign(prev, next) {
                species.push(std::mem::take(&mut current));
                continue;
            }
        }
        current.push(c);
    }
    species.push(current);
    species
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses `<species> (+ <species>)* -> <species> (+ <species>)*`.
///
/// The separator is checked before anything else, then both sides must be non-empty,
/// and only then is each species validated.
pub fn parse_reaction(text: &str) -> Result<(Vec<String>, Vec<String>), RedoxError> {
    let sides: Vec<&str> = text.split(REACTION_ARROW).collect();
    if sides.len() != 2 {
        return Err(RedoxError::Format);
    }
    let reactant_tokens = split_species(sides[0]);
    let product_tokens = split_species(sides[1]);
    if reactant_tokens.is_empty() || product_tokens.is_empty() {
        return Err(RedoxError::EmptyOperand);
    }
    let reactants = reactant_tokens
        .iter()
        .map(|token| process_ion(token).map(|s| s.formula))
        .collect::<Result<Vec<_>, _>>()?;
    let products = product_tokens
        .iter()
        .map(|token| process_ion(token).map(|s| s.formula))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("parsed reactants {:?}, products {:?}", reactants, products);
    Ok((reactants, products))
}
