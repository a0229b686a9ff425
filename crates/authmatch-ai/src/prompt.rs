//! Prompt construction for vision-model extraction.

use authmatch_core::DocumentTemplate;

const INSTRUCTIONS: &str = "\
Respond ONLY with a JSON object. No markdown fences, no explanation, just raw JSON.
Use exactly the keys listed below, copied verbatim. Copy each value exactly as printed \
on the form; do not reformat amounts, dates or account numbers.
If a field is blank, illegible or not on the form, set its key to null.";

/// Build the extraction prompt for one document template.
///
/// The oracle is asked for the template's raw labels as keys. Renaming onto
/// canonical fields happens afterwards in the schema mapper.
pub fn build_prompt(document_type: &str, template: &DocumentTemplate) -> String {
    let mut prompt = String::from("You are extracting fields from a scanned banking form");
    if template.description.is_empty() {
        prompt.push_str(&format!(" of type '{document_type}'.\n\n"));
    } else {
        prompt.push_str(&format!(": {}.\n\n", template.description));
    }
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nKeys:\n");
    for label in template.labels() {
        prompt.push_str(&format!("- {}\n", serde_json::Value::from(label)));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use authmatch_core::SchemaRegistry;

    #[test]
    fn lists_every_label_once_as_json_string() {
        let registry = SchemaRegistry::builtin().unwrap();
        let template = registry.template("tna_authority").unwrap();
        let prompt = build_prompt("tna_authority", template);

        assert!(prompt.contains("- \"DE User Name\"\n"));
        assert!(prompt.contains("- \"Temporary processing limit override\"\n"));
        assert_eq!(prompt.matches("- \"BSB\"\n").count(), 1);
        assert_eq!(prompt.lines().filter(|l| l.starts_with("- ")).count(), template.labels().len());
    }

    #[test]
    fn uses_description_when_present() {
        let registry = SchemaRegistry::builtin().unwrap();
        let prompt = build_prompt("tna_request", registry.template("tna_request").unwrap());
        assert!(prompt.starts_with(
            "You are extracting fields from a scanned banking form: Direct Credit Transaction"
        ));
        assert!(prompt.contains("set its key to null"));
    }

    #[test]
    fn falls_back_to_document_type() {
        let registry = SchemaRegistry::from_json(
            r#"{ "version": 1, "templates": { "slip": { "fields": [ { "label": "Name", "field": "user_name" } ] } } }"#,
        )
        .unwrap();
        let prompt = build_prompt("slip", registry.template("slip").unwrap());
        assert!(prompt.contains("of type 'slip'."));
    }
}
