fn main() {
    if let Err(e) = portfolio_cards::app::run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
