use crate::value::{format_rfc3339, Context, ContextValue};
use crate::Normalizer;

/// Replace `{key}` placeholders in `template` with context values.
///
/// Substitution is a single left-to-right pass: replaced text is never
/// scanned again, and placeholders with no matching key stay as written.
/// Collections are rendered with the default normalization bounds.
pub fn interpolate(template: &str, context: &Context) -> Result<String, serde_json::Error> {
    interpolate_with(template, context, &Normalizer::default())
}

/// [`interpolate`] with collections bounded by `normalizer`.
pub fn interpolate_with(
    template: &str,
    context: &Context,
    normalizer: &Normalizer,
) -> Result<String, serde_json::Error> {
    if !template.contains('{') {
        return Ok(template.to_string());
    }

    let mut replacements = Vec::with_capacity(context.len());
    for (key, value) in context.iter() {
        replacements.push((format!("{{{}}}", key), display_value(value, normalizer)?));
    }

    let mut interpolated = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        interpolated.push_str(&rest[..start]);
        let tail = &rest[start..];

        // Longest token wins when several keys match at the same offset.
        let matched = replacements
            .iter()
            .filter(|(token, _)| tail.starts_with(token.as_str()))
            .max_by_key(|(token, _)| token.len());

        match matched {
            Some((token, replacement)) => {
                interpolated.push_str(replacement);
                rest = &tail[token.len()..];
            }
            None => {
                interpolated.push('{');
                rest = &tail[1..];
            }
        }
    }
    interpolated.push_str(rest);

    Ok(interpolated)
}

/// Text substituted for a context value inside a message.
pub fn display_value(
    value: &ContextValue,
    normalizer: &Normalizer,
) -> Result<String, serde_json::Error> {
    let text = match value {
        ContextValue::Null => String::new(),
        ContextValue::Bool(true) => "1".to_string(),
        ContextValue::Bool(false) => String::new(),
        ContextValue::Int(i) => i.to_string(),
        ContextValue::UInt(u) => u.to_string(),
        ContextValue::Float(x) => x.to_string(),
        ContextValue::String(s) => s.clone(),
        ContextValue::Stringable(v) => v.to_log_string(),
        ContextValue::Error(e) => e.to_string(),
        ContextValue::DateTime(dt) => format_rfc3339(dt),
        ContextValue::Serializable { type_name, .. } => format!("{{object {}}}", type_name),
        ContextValue::Object { class, .. } => format!("{{object {}}}", class),
        ContextValue::Resource => "{resource}".to_string(),
        ContextValue::Sequence(_) | ContextValue::Map(_) => {
            serde_json::to_string(&normalizer.normalize(value, 0)?)?
        }
    };
    Ok(text)
}
