//! Progress bar construction

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// A stderr progress bar, or a hidden one when `visible` is false.
///
/// indicatif already hides stderr bars when stderr is not a terminal.
pub fn progress_bar(len: u64, message: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template("{msg:>12} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len}")
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(message);
    bar
}
