/////////////////////////////////////////////////////////////////////////////////////////////////////////
// END-TO-END BALANCING TESTS
/////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Redox::balancer_api::*;
    use crate::Redox::equation::{Equation, Term, TermKind};
    use crate::Redox::errors::RedoxError;
    use crate::Redox::species_parser::{parse_reaction, process_ion, split_coefficient};
    use crate::Redox::trace::Trace;
    use std::collections::BTreeSet;

    fn balanced(text: &str) -> String {
        balance_equation(text).unwrap()
    }

    /// second line of a success block
    fn equation_line(output: &str) -> String {
        output.lines().nth(1).unwrap().to_string()
    }

    fn conserves(line: &str) -> bool {
        let (left, right) = line.split_once(" -> ").unwrap();
        let terms = |side: &str| -> Vec<Term> {
            side.split(" + ")
                .map(|token| {
                    let (coefficient, _) = split_coefficient(token);
                    Term::with_coefficient(
                        process_ion(token).unwrap(),
                        coefficient.unwrap_or(1) as i64,
                        TermKind::Given,
                    )
                })
                .collect()
        };
        Equation::from_terms(terms(left), terms(right)).is_balanced()
    }

    #[test]
    fn test_fixed_acidic_reactions() {
        assert_eq!(
            balanced("H2O2 + MnO4^- -> Mn^2+ + O2"),
            "Reaksi setara:\n5H2O2 + 2MnO4^- + 6H^+ -> 2Mn^2+ + 5O2 + 8H2O"
        );
        assert_eq!(
            balanced("Cr2O7^2- + I^- -> Cr^3+ + I2"),
            "Reaksi setara:\nCr2O7^2- + 6I^- + 14H^+ -> 2Cr^3+ + 3I2 + 7H2O"
        );
        assert_eq!(
            balanced("MnO4^- + C2O4^2- -> Mn^2+ + CO2"),
            "Reaksi setara:\n2MnO4^- + 5C2O4^2- + 16H^+ -> 2Mn^2+ + 10CO2 + 8H2O"
        );
        // listing order does not matter
        assert_eq!(
            balanced("MnO4- + H2O2 -> O2 + Mn^2+"),
            "Reaksi setara:\n5H2O2 + 2MnO4^- + 6H^+ -> 2Mn^2+ + 5O2 + 8H2O"
        );
    }

    #[test]
    fn test_iron_rust() {
        assert_eq!(
            balanced("Fe + O2 -> Fe2O3"),
            "Reaksi setara:\n4Fe + 3O2 -> 2Fe2O3\n\nPenjelasan:\nOksidasi: Fe -> Fe2O3 + 3e-\nReduksi: O2 + 2e- -> Fe2O3\nKPK elektron: 12"
        );
    }

    #[test]
    fn test_half_reaction_method() {
        assert_eq!(
            balanced("Zn + Cu^2+ -> Zn^2+ + Cu"),
            "Reaksi setara:\nZn + Cu^2+ -> Zn^2+ + Cu\n\nPenjelasan:\nOksidasi: Zn -> Zn^2+ + 2e-\nReduksi: Cu^2+ + 2e- -> Cu\nKPK elektron: 2"
        );
        assert_eq!(
            equation_line(&balanced("MnO4^- + Fe^2+ -> Mn^2+ + Fe^3+")),
            "MnO4^- + 5Fe^2+ + 8H^+ -> Mn^2+ + 5Fe^3+ + 4H2O"
        );
        assert_eq!(
            equation_line(&balanced("Cu + NO3^- -> Cu^2+ + NO2")),
            "Cu + 2NO3^- + 4H^+ -> Cu^2+ + 2NO2 + 2H2O"
        );
        assert_eq!(
            equation_line(&balanced("H2 + O2 -> H2O")),
            "2H2 + O2 -> 2H2O"
        );
        assert_eq!(
            balanced("H2O2 + Fe^2+ -> Fe^3+ + H2O"),
            "Reaksi setara:\nH2O2 + 2Fe^2+ + 2H^+ -> 2Fe^3+ + 2H2O\n\nPenjelasan:\nOksidasi: Fe^2+ -> Fe^3+ + 1e-\nReduksi: H2O2 + 1e- -> H2O\nKPK elektron: 2"
        );
    }

    #[test]
    fn test_disproportionation() {
        let output = balanced("Cl2 -> Cl^- + ClO3^-");
        assert_eq!(
            equation_line(&output),
            "3Cl2 + 3H2O -> 5Cl^- + ClO3^- + 6H^+"
        );
        assert!(output.contains("Oksidasi: Cl2 -> ClO3^- + 5e-"));
        assert!(output.contains("Reduksi: Cl2 + 1e- -> Cl^-"));
        assert!(output.ends_with("KPK elektron: 10"));
    }

    #[test]
    fn test_linear_fallback() {
        // the two halves disagree on CO2
        assert_eq!(
            balanced("C2H6 + O2 -> CO2 + H2O"),
            "Reaksi setara (stoikiometri):\n2C2H6 + 7O2 -> 4CO2 + 6H2O"
        );
        assert_eq!(
            balanced("Ag^+ + Cl^- -> AgCl"),
            "Reaksi setara (stoikiometri):\nAg^+ + Cl^- -> AgCl"
        );
        assert_eq!(
            balanced("NaOH + HCl -> NaCl + H2O"),
            "Reaksi setara (stoikiometri):\nNaOH + HCl -> NaCl + H2O"
        );
        assert_eq!(
            balanced("NH4NO3 -> N2O + H2O"),
            "Reaksi setara (stoikiometri):\nNH4NO3 -> N2O + 2H2O"
        );
        // chlorine atoms do not divide evenly between the halves
        assert_eq!(
            balanced("KMnO4 + HCl -> KCl + MnCl2 + Cl2 + H2O"),
            "Reaksi setara (stoikiometri):\n2KMnO4 + 16HCl -> 2KCl + 2MnCl2 + 5Cl2 + 8H2O"
        );
        // no integer oxidation state for iron in magnetite
        assert_eq!(
            balanced("Fe3O4 + CO -> Fe + CO2"),
            "Reaksi setara (stoikiometri):\nFe3O4 + 4CO -> 3Fe + 4CO2"
        );
    }

    #[test]
    fn test_failure_is_rendered() {
        let output = balanced("Fe^2+ -> Fe^3+");
        assert!(output.starts_with("Gagal menyetarakan reaksi: "));
        let (reactants, products) = parse("Fe^2+ -> Fe^3+").unwrap();
        assert!(matches!(
            try_balance(&reactants, &products),
            Err(RedoxError::Unbalanceable(_))
        ));
    }

    #[test]
    fn test_huge_charges_do_not_panic() {
        // the electron lcm leaves i64, the exact solver still finds the coefficients
        assert_eq!(
            balanced("Fe^2000000000- + Cu^2000000000+ -> Fe^2000000000+ + Cu^1999999999-"),
            "Reaksi setara (stoikiometri):\n3999999999Fe^2000000000- + 4000000000Cu^2000000000+ -> 3999999999Fe^2000000000+ + 4000000000Cu^1999999999-"
        );
        // a spectator on both sides leaves no unique solution, the overflow is reported
        let output =
            balanced("Fe^2000000000- + Cu^2000000000+ + Zn -> Fe^2000000000+ + Cu^1999999999- + Zn");
        assert!(
            output.starts_with("Gagal menyetarakan reaksi: integer overflow"),
            "{}",
            output
        );
    }

    #[test]
    fn test_parse_errors_surface() {
        assert_eq!(balance_equation("Fe -> "), Err(RedoxError::EmptyOperand));
        assert_eq!(balance_equation("Fe + O2"), Err(RedoxError::Format));
        assert_eq!(
            balance_equation("Fe + O2").unwrap_err().to_string(),
            "Format reaksi salah, harus dengan tanda \"->\""
        );
    }

    #[test]
    fn test_typed_result() {
        let (reactants, products) = parse("Fe + O2 -> Fe2O3").unwrap();
        let result = try_balance(&reactants, &products).unwrap();
        assert_eq!(result.equation_line, "4Fe + 3O2 -> 2Fe2O3");
        let BalanceMethod::HalfReaction {
            oxidation,
            reduction,
            electron_lcm,
        } = result.method
        else {
            panic!("expected the half-reaction method");
        };
        assert_eq!(oxidation.source, "Fe");
        assert_eq!(reduction.source, "O2");
        assert_eq!(electron_lcm, 12);

        let (reactants, products) = parse("CH4 + O2 -> CO2 + H2O").unwrap();
        assert_eq!(
            try_balance(&reactants, &products).unwrap().method,
            BalanceMethod::KnownReaction
        );
    }

    #[test]
    fn test_explanation_can_be_switched_off() {
        let (reactants, products) = parse("Zn + Cu^2+ -> Zn^2+ + Cu").unwrap();
        let output = balance_with_options(&reactants, &products, false, &mut Trace::disabled());
        assert_eq!(output, "Reaksi setara:\nZn + Cu^2+ -> Zn^2+ + Cu");
    }

    #[test]
    fn test_trace_collects_steps() {
        let (reactants, products) = parse("C2H6 + O2 -> CO2 + H2O").unwrap();
        let mut trace = Trace::new();
        try_balance_traced(&reactants, &products, &mut trace).unwrap();
        let steps: BTreeSet<&str> = trace.entries().iter().map(|e| e.step.as_str()).collect();
        assert!(steps.contains("oxidation states"));
        assert!(steps.contains("detect"));
        assert!(steps.contains("half reactions"));
        assert!(steps.contains("linear"));

        let mut disabled = Trace::disabled();
        try_balance_traced(&reactants, &products, &mut disabled).unwrap();
        assert!(disabled.entries().is_empty());
    }

    #[test]
    fn test_analyze_reaction() {
        let (reactants, products) = parse("MnO4^- + Fe^2+ -> Mn^2+ + Fe^3+").unwrap();
        let (r, p) = analyze_reaction(&reactants, &products).unwrap();
        assert_eq!(r[0].profile.get("Mn"), Some(7));
        assert_eq!(p[0].profile.get("Mn"), Some(2));
        assert_eq!(p[1].profile.get("Fe"), Some(3));
    }

    const SAMPLE_REACTIONS: &[&str] = &[
        "Fe + O2 -> Fe2O3",
        "H2O2 + MnO4^- -> Mn^2+ + O2",
        "Cr2O7^2- + I^- -> Cr^3+ + I2",
        "MnO4^- + Fe^2+ -> Mn^2+ + Fe^3+",
        "Cu + NO3^- -> Cu^2+ + NO2",
        "Cl2 -> Cl^- + ClO3^-",
        "H2 + O2 -> H2O",
        "C2H6 + O2 -> CO2 + H2O",
        "Zn + Cu^2+ -> Zn^2+ + Cu",
        "NH4NO3 -> N2O + H2O",
        "Cl2 + OH^- -> Cl^- + ClO^-",
    ];

    #[test]
    fn test_results_conserve_atoms_and_charge() {
        for text in SAMPLE_REACTIONS {
            let line = equation_line(&balanced(text));
            assert!(conserves(&line), "{} -> {}", text, line);
        }
    }

    #[test]
    fn test_reparsing_the_result_keeps_the_species() {
        let medium: BTreeSet<String> = ["H2O", "H^+", "OH^-"].iter().map(|s| s.to_string()).collect();
        for text in SAMPLE_REACTIONS {
            let (reactants, products) = parse_reaction(text).unwrap();
            let line = equation_line(&balanced(text));
            let (again_r, again_p) = parse_reaction(&line).unwrap();
            let before: BTreeSet<String> = reactants.into_iter().chain(products).collect();
            let after: BTreeSet<String> = again_r.into_iter().chain(again_p).collect();
            assert!(before.is_subset(&after), "{}", line);
            assert!(after.difference(&before).all(|s| medium.contains(s)), "{}", line);
            // balancing the balanced equation again changes nothing
            assert_eq!(equation_line(&balanced(&line)), line);
        }
    }
}
