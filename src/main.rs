mod expr_engine;
mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

#[cfg(feature = "tui")]
fn main() -> anyhow::Result<()> {
    #[cfg(feature = "line")]
    if std::env::args().any(|arg| arg == "--line") {
        line_mode::run_line();
        return Ok(());
    }
    tui_mode::run_tui()
}

#[cfg(all(feature = "line", not(feature = "tui")))]
fn main() {
    line_mode::run_line();
}

#[cfg(not(any(feature = "tui", feature = "line")))]
fn main() {
    println!("plotcalc was built without a front-end.");
    println!("Rebuild with the default `tui` feature or with `--features line`.");
}
