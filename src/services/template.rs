//! Placeholder substitution for generated documents.
//!
//! Pure string work: `{{key}}` markers are replaced with supplied
//! values; unknown markers are left in place.

/// Built-in index document template
pub const INDEX_TEMPLATE: &str = "\
# Specification: {{source}}

**Source**: `{{source}}`
**Generated**: {{date}}

## Overview

[Describe what `{{source}}` provides]

## Interface

[Document the public interface]

## Notes

[Implementation notes]
";

/// Built-in history document template
pub const HISTORY_TEMPLATE: &str = "\
# History: {{source}}

| Date | Change |
|------|--------|
| {{date}} | Initial specification generated |
";

/// Substitute `{{key}}` markers with their values
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

/// Look up a built-in template pair by name; unknown names fall back to
/// the default with a warning.
pub fn templates_for(name: &str) -> (&'static str, &'static str) {
    match name {
        "default" => (INDEX_TEMPLATE, HISTORY_TEMPLATE),
        other => {
            tracing::warn!(template = other, "unknown template name, using default");
            (INDEX_TEMPLATE, HISTORY_TEMPLATE)
        }
    }
}
