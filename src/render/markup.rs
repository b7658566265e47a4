use crate::ir::Markup;
use crate::sanitize::sanitize_svg;

/// Author-supplied markup passes through the sanitizer and nothing else.
pub fn render_markup(markup: &Markup) -> String {
    sanitize_svg(&markup.markup)
}
