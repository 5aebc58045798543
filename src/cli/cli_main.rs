use super::cli_args::{Cli, RunOptions};
use super::cli_examples::examples_menu;
use crate::Redox::balancer_api::{analyze_reaction, balance_with_options, parse};
use crate::Redox::errors::RedoxError;
use crate::Redox::formatter::oxidation_table;
use crate::Redox::trace::Trace;
use crate::settings::{with_config, with_config_mut};
use log::{error, info};
use std::io::{self, Write};

/// Balanced equation text followed by the optional oxidation state table and trace.
/// Only a malformed equation is an error.
pub fn balance_report(text: &str, options: RunOptions) -> Result<String, RedoxError> {
    let (reactants, products) = parse(text)?;
    info!("Reaktan: {:?}, Produk: {:?}", reactants, products);
    let mut trace = if options.trace {
        Trace::new()
    } else {
        Trace::disabled()
    };
    let mut report = balance_with_options(&reactants, &products, options.show_explanation, &mut trace);
    if options.show_table {
        match analyze_reaction(&reactants, &products) {
            Ok((r, p)) => {
                report.push_str("\n\n");
                report.push_str(&oxidation_table(&r, &p).to_string());
            }
            Err(e) => report.push_str(&format!("\n\n{}", e)),
        }
    }
    if options.trace && !trace.entries().is_empty() {
        report.push_str("\n\n");
        report.push_str(&trace.render());
    }
    Ok(report)
}

pub fn print_report(report: Result<String, RedoxError>) {
    match report {
        Ok(text) => println!("\x1b[32m{}\x1b[0m", text),
        Err(e) => {
            error!("{}", e);
            println!("\x1b[31m{}\x1b[0m", e);
        }
    }
}

/// Balances the equations given on the command line; false if any of them was malformed.
pub fn run_batch(cli: &Cli) -> bool {
    let options = with_config(|manager| RunOptions::resolve(cli, manager.get_config()));
    let mut all_parsed = true;
    for equation in &cli.equations {
        let report = balance_report(equation, options);
        all_parsed &= report.is_ok();
        print_report(report);
    }
    all_parsed
}

pub fn run_interactive_menu() {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => balance_prompt(),
            "2" => examples_menu(current_options()),
            "3" => settings_menu(),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn current_options() -> RunOptions {
    with_config(|manager| RunOptions::from_config(manager.get_config()))
}

/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Green (\x1b[32m) / Red (\x1b[31m) - results and errors
*/
fn show_main_menu() {
    println!("\x1b[34m\n Penyetaraan Reaksi Redoks \n Format: A + B -> C + D, ion: Fe^3+ \n\x1b[0m");
    println!("\x1b[33m1. Balance a reaction\x1b[0m");
    println!("\x1b[33m2. Examples\x1b[0m");
    println!("\x1b[33m3. Settings\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}

fn balance_prompt() {
    print!("\x1b[36mMasukkan reaksi: \x1b[0m");
    let _ = io::stdout().flush();
    let input = get_user_input();
    let input = input.trim();
    if input.is_empty() || input == "0" {
        println!("Mohon masukkan reaksi terlebih dahulu!");
        return;
    }
    print_report(balance_report(input, current_options()));
}

fn settings_menu() {
    loop {
        let config = with_config(|manager| manager.get_config().clone());
        println!("\n=== Settings ===");
        println!("1. Show explanation: {}", config.show_explanation);
        println!("2. Show oxidation state table: {}", config.show_oxidation_table);
        println!("3. Trace balancing steps: {}", config.trace);
        println!("4. Log level: {}", config.log_level);
        println!("5. Reset to defaults");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        let _ = io::stdout().flush();

        let result = match get_user_input().trim() {
            "1" => with_config_mut(|m| m.set_flag("show_explanation", !config.show_explanation)),
            "2" => with_config_mut(|m| {
                m.set_flag("show_oxidation_table", !config.show_oxidation_table)
            }),
            "3" => with_config_mut(|m| m.set_flag("trace", !config.trace)),
            "4" => {
                print!("Level (off, error, warn, info, debug, trace): ");
                let _ = io::stdout().flush();
                let level = get_user_input();
                let result = with_config_mut(|m| m.set_log_level(level.trim()));
                if result.is_ok() {
                    log::set_max_level(with_config(|m| m.get_config().level_filter()));
                }
                result
            }
            "5" => with_config_mut(|m| m.reset_to_defaults()),
            "0" => break,
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("{}", e);
            println!("\x1b[31m{}\x1b[0m", e);
        }
    }
}

/// One line from stdin; end of input reads as "0" so every menu can be left.
pub fn get_user_input() -> String {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) | Err(_) => "0".to_string(),
        Ok(_) => input,
    }
}
