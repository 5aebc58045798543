use super::cli_args::RunOptions;
use super::cli_main::{balance_report, get_user_input, print_report};
use std::io::{self, Write};

/// Reactions offered in the examples menu
pub const EXAMPLE_REACTIONS: &[&str] = &[
    "H2O2 + MnO4^- -> Mn^2+ + O2",
    "Cr2O7^2- + I^- -> Cr^3+ + I2",
    "H2O2 + I^- -> I2 + H2O",
    "MnO4^- + C2O4^2- -> Mn^2+ + CO2",
    "Fe + O2 -> Fe2O3",
];

pub fn examples_menu(options: RunOptions) {
    loop {
        println!("\n=== Contoh Reaksi ===");
        for (i, reaction) in EXAMPLE_REACTIONS.iter().enumerate() {
            println!("{}. {}", i + 1, reaction);
        }
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        let _ = io::stdout().flush();

        let choice = get_user_input();
        let choice = choice.trim();
        if choice == "0" {
            break;
        }
        match choice.parse::<usize>() {
            Ok(n) if (1..=EXAMPLE_REACTIONS.len()).contains(&n) => {
                let reaction = EXAMPLE_REACTIONS[n - 1];
                println!("\n{}", reaction);
                print_report(balance_report(reaction, options));
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
