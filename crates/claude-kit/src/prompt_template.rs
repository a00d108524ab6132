use include_dir::{include_dir, Dir};
use serde::Serialize;
use serde_json::json;
use tera::{Context, Error as TeraError, Tera};

static PROMPTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

/// Render an inline Tera template
pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the embedded templates, e.g. `persona/pirate.md`
pub fn render_prompt<T: Serialize>(name: &str, context_data: &T) -> Result<String, TeraError> {
    let template = PROMPTS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("Unknown prompt template: {}", name)))?;
    Ok(load_prompt(template, context_data)?.trim_end().to_string())
}

/// Render an embedded template that takes no variables
pub fn builtin_prompt(name: &str) -> Result<String, TeraError> {
    render_prompt(name, &json!({}))
}

/// Names of the embedded templates under `dir`, without the `.md` extension
pub fn prompt_names(dir: &str) -> Vec<String> {
    let mut names: Vec<String> = PROMPTS
        .get_dir(dir)
        .map(|d| {
            d.files()
                .filter_map(|f| f.path().file_stem())
                .filter_map(|stem| stem.to_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
