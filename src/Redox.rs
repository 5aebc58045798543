/// Error kinds of parsing and balancing, exact integer division helper
pub mod errors;
/// Element table, atom counting, net charge and molar mass of a species written as
/// `Formula` or `Formula^<digits><sign>`; element-by-species composition matrix.
pub mod formula;
/// Splitting of the raw equation text into species.
/// - `->` must appear exactly once
/// - `+` separates species unless it is glued to the end of a formula (`Na+ + Cl-`)
/// - leading coefficients are dropped, bare trailing signs become `^+`/`^-`,
///   a magnitude without sign (`Mn^2`) is taken as positive
pub mod species_parser;
/// Oxidation numbers of every element of a species.
/// The rules are an ordered list of (name, assignment function) pairs:
/// 1) elemental forms are 0
/// 2) a monatomic ion carries its charge
/// 3) species-specific overrides: peroxides, hypochlorite, permanganate and manganate, MnO2, OF2, metal hydrides
/// 4) standard rules for H, O, F, halogens, alkali and alkaline-earth metals, Al, Mn
///
/// A single element left over is solved from the net charge with exact division; several are
/// looked up in a table of common states or set to 0.
pub mod oxidation_states;
/// Decides whether the reaction is redox (explicit ions, or any changed oxidation state)
pub mod redox_classifier;
/// Terms with coefficients, auxiliary water/protons/electrons, conservation checks
pub mod equation;
/// Pre-balanced well known reactions looked up by their species sets
pub mod known_reactions;
/// Half-reaction (ion-electron) method as a state machine:
/// DetectPairs -> ScaleElectrons -> BalanceOxygen -> BalanceHydrogen -> BalanceCharge -> Format
pub mod half_reactions;
/// Exact rational null space of the element and charge conservation matrix, used whenever the
/// half-reaction method is not applicable or does not produce a conserving equation
pub mod stoichiometry;
/// Result text (`Reaksi setara:` block with explanation, failure line) and oxidation state table
pub mod formatter;
/// Optional collector of intermediate results
pub mod trace;
/// `parse`, `balance`, `try_balance` and friends.
/// # Examples
/// ```
/// use RedoxBalancer::Redox::balancer_api::{balance, parse};
/// let (reactants, products) = parse("Fe + O2 -> Fe2O3").unwrap();
/// let text = balance(&reactants, &products);
/// assert!(text.starts_with("Reaksi setara:\n4Fe + 3O2 -> 2Fe2O3"));
/// ```
pub mod balancer_api;
/// tests
pub mod balancer_tests;
