/// command line arguments and the options they resolve to
pub mod cli_args;
/// example reactions shown in the menu
pub mod cli_examples;
/// one-shot balancing and the interactive terminal menu
pub mod cli_main;
