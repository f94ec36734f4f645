use crate::models::UserProfile;

pub const PROFILE_PREAMBLE: &str = include_str!("../data/prompts/profile_preamble.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Compute the system instruction actually sent upstream.
///
/// When a profile with a non-empty name is supplied, the rendered preamble is
/// prepended to `system_prompt`; otherwise the prompt passes through
/// unmodified. Called once per invocation, before the failover loop.
pub fn effective_system_prompt(profile: Option<&UserProfile>, system_prompt: &str) -> String {
    match profile {
        Some(profile) if !profile.name.is_empty() => {
            let preamble = render(
                PROFILE_PREAMBLE,
                &[
                    ("name", profile.name.as_str()),
                    ("gender", profile.gender.as_str()),
                    ("rating", profile.rating.as_str()),
                ],
            );
            format!("{}{}", preamble, system_prompt)
        }
        _ => system_prompt.to_string(),
    }
}
