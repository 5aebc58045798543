/// Entry points used by the shell.
///
/// `parse` turns the raw text into normalized species, `balance` always returns printable text,
/// `try_balance` returns a typed result instead. Balancing order:
/// 1) the table of known reactions;
/// 2) oxidation states of every species; species whose states cannot be inferred go to the
///    linear solver;
/// 3) non-redox reactions go to the linear solver;
/// 4) the half-reaction method; a result that does not conserve atoms and charge, a missing
///    oxidation/reduction pair or failing integer arithmetic hand over to the linear solver.
use crate::Redox::errors::RedoxError;
use crate::Redox::formatter::{format_equation, render, render_failure};
use crate::Redox::half_reactions::{HalfReaction, HalfReactionBalancer, HalfReactionOutcome};
use crate::Redox::known_reactions::lookup_known_reaction;
use crate::Redox::oxidation_states::{AnalyzedSpecies, analyze_species};
use crate::Redox::redox_classifier::is_redox;
use crate::Redox::species_parser::parse_reaction;
use crate::Redox::stoichiometry::solve_linear;
use crate::Redox::trace::Trace;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceMethod {
    KnownReaction,
    HalfReaction {
        oxidation: HalfReaction,
        reduction: HalfReaction,
        electron_lcm: i64,
    },
    Stoichiometric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedReaction {
    pub equation_line: String,
    pub method: BalanceMethod,
}

/// Splits the equation text into normalized reactant and product formulas.
pub fn parse(text: &str) -> Result<(Vec<String>, Vec<String>), RedoxError> {
    parse_reaction(text)
}

/// Oxidation profile of every reactant and product
pub fn analyze_reaction(
    reactants: &[String],
    products: &[String],
) -> Result<(Vec<AnalyzedSpecies>, Vec<AnalyzedSpecies>), RedoxError> {
    let analyze = |list: &[String]| {
        list.iter()
            .map(|s| analyze_species(s))
            .collect::<Result<Vec<_>, _>>()
    };
    Ok((analyze(reactants)?, analyze(products)?))
}

pub fn try_balance(reactants: &[String], products: &[String]) -> Result<BalancedReaction, RedoxError> {
    try_balance_traced(reactants, products, &mut Trace::disabled())
}

pub fn try_balance_traced(
    reactants: &[String],
    products: &[String],
    trace: &mut Trace,
) -> Result<BalancedReaction, RedoxError> {
    info!("balancing {} -> {}", reactants.join(" + "), products.join(" + "));
    if let Some(known) = lookup_known_reaction(reactants, products) {
        trace.record("known", known.balanced);
        return Ok(BalancedReaction {
            equation_line: known.balanced.to_string(),
            method: BalanceMethod::KnownReaction,
        });
    }

    let (analyzed_reactants, analyzed_products) = match analyze_reaction(reactants, products) {
        Ok(analyzed) => analyzed,
        Err(e) if e.is_arithmetic() => {
            trace.record("oxidation states", e.to_string());
            return balance_linear(reactants, products, trace, None);
        }
        Err(e) => return Err(e),
    };
    for entry in analyzed_reactants.iter().chain(analyzed_products.iter()) {
        trace.record(
            "oxidation states",
            format!("{}: {}", entry.species.formula, entry.profile),
        );
    }

    if !is_redox(&analyzed_reactants, &analyzed_products) {
        trace.record("classify", "no oxidation state changes");
        return balance_linear(reactants, products, trace, None);
    }

    match HalfReactionBalancer::new(&analyzed_reactants, &analyzed_products).run(trace) {
        Ok(HalfReactionOutcome::Balanced(balance)) if balance.equation.is_balanced() => {
            Ok(BalancedReaction {
                equation_line: format_equation(&balance.equation),
                method: BalanceMethod::HalfReaction {
                    oxidation: balance.oxidation,
                    reduction: balance.reduction,
                    electron_lcm: balance.electron_lcm,
                },
            })
        }
        Ok(HalfReactionOutcome::Balanced(balance)) => {
            trace.record(
                "verify",
                format!("{} does not conserve atoms and charge", format_equation(&balance.equation)),
            );
            balance_linear(reactants, products, trace, None)
        }
        Ok(HalfReactionOutcome::NoRedoxPair) => balance_linear(reactants, products, trace, None),
        Err(e) if e.is_arithmetic() => {
            warn!("half-reaction method failed: {}", e);
            trace.record("half reactions", e.to_string());
            balance_linear(reactants, products, trace, Some(e))
        }
        Err(e) => Err(e),
    }
}

// an error of an earlier stage takes precedence over the solver's own error
fn balance_linear(
    reactants: &[String],
    products: &[String],
    trace: &mut Trace,
    earlier: Option<RedoxError>,
) -> Result<BalancedReaction, RedoxError> {
    match solve_linear(reactants, products, trace) {
        Ok(equation) => Ok(BalancedReaction {
            equation_line: format_equation(&equation),
            method: BalanceMethod::Stoichiometric,
        }),
        Err(e) => Err(earlier.unwrap_or(e)),
    }
}

/// Balances and renders; failures are rendered as text too.
pub fn balance_with_options(
    reactants: &[String],
    products: &[String],
    show_explanation: bool,
    trace: &mut Trace,
) -> String {
    match try_balance_traced(reactants, products, trace) {
        Ok(result) => render(&result, show_explanation),
        Err(e) => {
            warn!("{}", e);
            render_failure(&e)
        }
    }
}

pub fn balance(reactants: &[String], products: &[String]) -> String {
    balance_with_options(reactants, products, true, &mut Trace::disabled())
}

/// Parses and balances; only parsing errors are returned as errors.
pub fn balance_equation(text: &str) -> Result<String, RedoxError> {
    let (reactants, products) = parse(text)?;
    Ok(balance(&reactants, &products))
}
