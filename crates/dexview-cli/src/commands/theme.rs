//! Theme preference.

use dexview_models::Theme;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::output::render_theme;

pub(crate) fn handle_theme_get(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    render_theme(ctx.personalization.theme(), format)
}

pub(crate) fn handle_theme_set(ctx: &AppContext, theme: Theme) {
    ctx.personalization.set_theme(theme);
    println!("Theme set to {}.", theme.as_str());
}

pub(crate) fn handle_theme_cycle(ctx: &AppContext) {
    let next = ctx.personalization.cycle_theme();
    println!("Theme set to {}.", next.as_str());
}
