//! `PH_*` placeholder substitution for the terraform variables template.

use serde_json::Value;

/// Replace every `PH_<KEY>` placeholder in `template` with the matching
/// value from `vars`. Booleans render lowercase, strings render unquoted,
/// everything else renders as its JSON form.
///
/// Keys are applied longest-first so a key that is a prefix of another
/// (`access_key_id` / `access_key_id_op`) never corrupts the longer
/// placeholder.
#[must_use]
pub fn render(template: &str, vars: &serde_json::Map<String, Value>) -> String {
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

    let mut out = template.to_string();
    for key in keys {
        let placeholder = format!("PH_{}", key.to_uppercase());
        let replacement = match &vars[key.as_str()] {
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&placeholder, &replacement);
    }
    out
}
