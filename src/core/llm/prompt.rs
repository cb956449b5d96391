//! Prompt Construction
//!
//! Builds the instruction prompt sent to the provider, either the built-in
//! librarian prompt or an operator-supplied template.

/// System instruction paired with every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that outputs JSON.";

/// Placeholder replaced by the user's raw query in a template.
pub const QUERY_PLACEHOLDER: &str = "$QUERY";

/// Placeholder replaced by the formatted catalog results in a template.
pub const RESULTS_PLACEHOLDER: &str = "$RESULTS";

/// Format the catalog's existing author suggestions as a prompt block.
pub fn format_results(existing: &[String]) -> String {
    if existing.is_empty() {
        return "No author suggestions were found in our catalog.\n".to_string();
    }

    let mut block = String::from("Here are some author suggestions retrieved from our catalog:\n");
    for (i, value) in existing.iter().enumerate() {
        block.push_str(&format!("{}. {}\n", i + 1, value));
    }
    block.push_str(
        "\nAnalyze the query and these suggestions. You may keep good suggestions, refine them, or replace them if they are not relevant.\n",
    );
    block
}

/// Default prompt asking for a correction and 6-10 author terms.
pub fn default_prompt(query: &str, existing: &[String]) -> String {
    let mut prompt = format!(
        "You are a helpful academic librarian assistant. The user is searching for: \"{}\".\n",
        query
    );

    if existing.is_empty() {
        prompt.push('\n');
    }
    prompt.push_str(&format_results(existing));

    prompt.push_str("1. If the query contains an OBVIOUS spelling error, set 'didYouMean' to the FULL corrected query string.\n");
    prompt.push_str("2. If the query is likely intentional, leave 'didYouMean' empty.\n");
    prompt.push_str("3. Populate 'suggestions' with 6-10 relevant AUTHORS (people or organizations) related to the query, most relevant first.\n");
    prompt.push_str("   - STRICTLY names of people (historians, writers) or organizations/agencies.\n");
    prompt.push_str("   - Do NOT suggest book titles, general topics, historical events, or refined search queries.\n");
    prompt.push_str("   - Example: For 'civil war', suggest 'Foote, Shelby' or 'McPherson, James', NOT 'Civil War Battles'.\n");
    prompt.push_str("\nRespond in JSON format: {\"didYouMean\": \"...\", \"suggestions\": [\"...\"]}");

    prompt
}

/// Fill an operator template. Each placeholder is replaced once, at its
/// first occurrence.
pub fn render_template(template: &str, query: &str, existing: &[String]) -> String {
    let results = format_results(existing);

    // positions are taken from the template itself so substituted text is
    // never rescanned for placeholders
    let mut slots: Vec<(usize, &str, &str)> = [
        (QUERY_PLACEHOLDER, query),
        (RESULTS_PLACEHOLDER, results.as_str()),
    ]
    .into_iter()
    .filter_map(|(placeholder, value)| {
        template.find(placeholder).map(|at| (at, placeholder, value))
    })
    .collect();
    slots.sort_by_key(|(at, _, _)| *at);

    let mut rendered = String::with_capacity(template.len() + query.len() + results.len());
    let mut cursor = 0;
    for (at, placeholder, value) in slots {
        rendered.push_str(&template[cursor..at]);
        rendered.push_str(value);
        cursor = at + placeholder.len();
    }
    rendered.push_str(&template[cursor..]);
    rendered
}

/// Resolve the prompt for a request.
pub fn build_prompt(query: &str, existing: &[String], template: Option<&str>) -> String {
    match template {
        Some(t) if !t.trim().is_empty() => render_template(t, query, existing),
        _ => default_prompt(query, existing),
    }
}
