/// Text rendering of balancing results.
///
/// The banners and explanation lines are shown to users verbatim:
/// ```text
/// Reaksi setara:
/// 4Fe + 3O2 -> 2Fe2O3
///
/// Penjelasan:
/// Oksidasi: Fe -> Fe2O3 + 3e-
/// Reduksi: O2 + 2e- -> Fe2O3
/// KPK elektron: 12
/// ```
use crate::Redox::balancer_api::{BalanceMethod, BalancedReaction};
use crate::Redox::equation::{Equation, Term};
use crate::Redox::errors::RedoxError;
use crate::Redox::half_reactions::HalfReaction;
use crate::Redox::oxidation_states::AnalyzedSpecies;
use prettytable::{Cell, Row, Table, row};

pub const BALANCED_BANNER: &str = "Reaksi setara:";
pub const LINEAR_BANNER: &str = "Reaksi setara (stoikiometri):";
pub const FAILURE_PREFIX: &str = "Gagal menyetarakan reaksi";

/// coefficient 1 is not written
pub fn format_term(term: &Term) -> String {
    if term.coefficient == 1 {
        term.species.formula.clone()
    } else {
        format!("{}{}", term.coefficient, term.species.formula)
    }
}

fn format_side(terms: &[Term]) -> String {
    terms
        .iter()
        .filter(|t| t.is_visible())
        .map(format_term)
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Equation line without electrons
pub fn format_equation(equation: &Equation) -> String {
    format!(
        "{} -> {}",
        format_side(&equation.reactants),
        format_side(&equation.products)
    )
}

pub fn explanation_lines(
    oxidation: &HalfReaction,
    reduction: &HalfReaction,
    electron_lcm: i64,
) -> Vec<String> {
    vec![
        String::new(),
        "Penjelasan:".to_string(),
        format!(
            "Oksidasi: {} -> {} + {}e-",
            oxidation.source, oxidation.target, oxidation.change
        ),
        format!(
            "Reduksi: {} + {}e- -> {}",
            reduction.source, reduction.change, reduction.target
        ),
        format!("KPK elektron: {}", electron_lcm),
    ]
}

pub fn render(result: &BalancedReaction, show_explanation: bool) -> String {
    let mut lines = Vec::new();
    match &result.method {
        BalanceMethod::KnownReaction => {
            lines.push(BALANCED_BANNER.to_string());
            lines.push(result.equation_line.clone());
        }
        BalanceMethod::HalfReaction {
            oxidation,
            reduction,
            electron_lcm,
        } => {
            lines.push(BALANCED_BANNER.to_string());
            lines.push(result.equation_line.clone());
            if show_explanation {
                lines.extend(explanation_lines(oxidation, reduction, *electron_lcm));
            }
        }
        BalanceMethod::Stoichiometric => {
            lines.push(LINEAR_BANNER.to_string());
            lines.push(result.equation_line.clone());
        }
    }
    lines.join("\n")
}

pub fn render_failure(error: &RedoxError) -> String {
    format!("{}: {}", FAILURE_PREFIX, error)
}

/// Table of oxidation states, one row per species occurrence
pub fn oxidation_table(reactants: &[AnalyzedSpecies], products: &[AnalyzedSpecies]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Side", "Species", "Charge", "Oxidation states", "Molar mass, g/mol"]);
    let sides = [("reactant", reactants), ("product", products)];
    for (side, analyzed) in sides {
        for entry in analyzed {
            let molar_mass = entry
                .species
                .molar_mass()
                .map_or_else(|| "-".to_string(), |m| format!("{:.3}", m));
            table.add_row(Row::new(vec![
                Cell::new(side),
                Cell::new(&entry.species.formula),
                Cell::new(&entry.species.charge.to_string()),
                Cell::new(&entry.profile.to_string()),
                Cell::new(&molar_mass),
            ]));
        }
    }
    table
}
