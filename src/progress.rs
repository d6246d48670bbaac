use indicatif::{ProgressBar, ProgressStyle};

pub fn default_progress_bar(label: &str, n_items: usize) -> ProgressBar {
    let progress_template = &format!(
        "[{{wide_bar}}] {}: {{pos}}/{{len}} {{msg}} Time: ({{elapsed}}/{{duration}})",
        label
    );
    let progress = ProgressBar::new(n_items as u64);
    let style = ProgressStyle::default_bar()
        .template(progress_template)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

/// A visible bar when verbose, otherwise one that draws nothing.
pub fn scorer_progress_bar(n_scorers: usize, verbose: bool) -> ProgressBar {
    if verbose {
        default_progress_bar("Scorers", n_scorers)
    } else {
        ProgressBar::hidden()
    }
}
