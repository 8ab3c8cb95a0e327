/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders in raw config text.
///
/// Unresolvable variables without a fallback are left as-is, so a missing
/// credential shows up later as a host-side auth failure rather than a
/// silently empty string.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with a custom lookup, testable without
/// touching the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: emit the remainder literally.
            result.push_str(&rest[start..]);
            return result;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        if name.is_empty() {
            result.push_str(&rest[start..start + 2 + end + 1]);
        } else {
            match (lookup(name), fallback) {
                (Some(val), _) => result.push_str(&val),
                (None, Some(fallback)) => result.push_str(fallback),
                (None, None) => result.push_str(&rest[start..start + 2 + end + 1]),
            }
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}
