//! HTML document shell around the generated resume fragment.

use crate::render::style::{ResolvedStyle, FONT_SIZE, H3_COLOR, H4_COLOR};

/// Wraps `fragment` in a complete HTML document styled with `style`.
///
/// The fragment is inserted verbatim; an empty or malformed fragment still
/// yields a complete document.
pub fn build_html_document(fragment: &str, style: &ResolvedStyle) -> String {
    let ResolvedStyle {
        full_name_color,
        current_role_color,
        text_color,
        bg_color,
        heading_font,
        text_font,
        line_height,
    } = style;

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {{
    font-family: {text_font};
    color: {text_color};
    background-color: {bg_color};
    font-size: {FONT_SIZE};
    line-height: {line_height};
    padding: 25px;
    margin: 0;
}}
h1 {{
    text-align: center;
    color: {full_name_color};
    font-family: {heading_font};
    margin-bottom: 20px;
    page-break-after: avoid;
}}
h2 {{
    text-align: center;
    color: {current_role_color};
    font-family: {heading_font};
    page-break-after: avoid;
}}
h3 {{
    color: {H3_COLOR};
    font-family: {heading_font};
    page-break-after: avoid;
}}
h4 {{
    color: {H4_COLOR};
    font-family: {heading_font};
    page-break-after: avoid;
}}
pre {{
    background: #f4f4f4;
    padding: 10px;
    white-space: pre-wrap;
    word-wrap: break-word;
}}
.page-break {{
    page-break-before: always;
    break-before: page;
}}
</style>
</head>
<body>{fragment}</body>
</html>
"#
    )
}
