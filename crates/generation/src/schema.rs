//! Output schemas pinning the model to a fixed set of named files.

use pagewright_core::{GeneratedFile, GenerationResult, ENTRY_FILE, LICENSE_FILE, README_FILE};
use serde::Deserialize;
use serde_json::{json, Value};

/// Schema for a new project: entry file, readme and license, plus the
/// commit message used when the file set is pushed.
pub fn new_project_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "index_html": {
                "type": "string",
                "description": "Complete HTML for the application entry file"
            },
            "readme": {
                "type": "string",
                "description": "README.md content describing the application"
            },
            "license": {
                "type": "string",
                "description": "Full text of the MIT license"
            },
            "commit_message": {
                "type": "string",
                "description": "Short imperative commit message"
            }
        },
        "required": ["index_html", "readme", "license", "commit_message"],
        "additionalProperties": false
    })
}

/// Schema for an update round: only the entry file is regenerated.
pub fn update_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "index_html": {
                "type": "string",
                "description": "Complete updated HTML for the application entry file"
            },
            "commit_message": {
                "type": "string",
                "description": "Short imperative commit message describing the change"
            }
        },
        "required": ["index_html", "commit_message"],
        "additionalProperties": false
    })
}

#[derive(Debug, Deserialize)]
pub struct NewProjectOutput {
    pub index_html: String,
    pub readme: String,
    pub license: String,
    pub commit_message: String,
}

impl From<NewProjectOutput> for GenerationResult {
    fn from(output: NewProjectOutput) -> Self {
        GenerationResult::new(
            vec![
                GeneratedFile::new(ENTRY_FILE, output.index_html),
                GeneratedFile::new(README_FILE, output.readme),
                GeneratedFile::new(LICENSE_FILE, output.license),
            ],
            output.commit_message,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOutput {
    pub index_html: String,
    pub commit_message: String,
}

impl From<UpdateOutput> for GenerationResult {
    fn from(output: UpdateOutput) -> Self {
        GenerationResult::new(
            vec![GeneratedFile::new(ENTRY_FILE, output.index_html)],
            output.commit_message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_output_maps_to_canonical_paths() {
        let output = NewProjectOutput {
            index_html: "<html></html>".to_string(),
            readme: "# app".to_string(),
            license: "MIT".to_string(),
            commit_message: "Initial version".to_string(),
        };
        let result: GenerationResult = output.into();

        assert_eq!(result.files.len(), 3);
        assert_eq!(result.entry_content(), Some("<html></html>"));
        assert_eq!(result.file(README_FILE), Some("# app"));
        assert_eq!(result.file(LICENSE_FILE), Some("MIT"));
        assert_eq!(result.commit_message, "Initial version");
    }

    #[test]
    fn test_update_output_touches_only_entry_file() {
        let output = UpdateOutput {
            index_html: "<html>v2</html>".to_string(),
            commit_message: "Add dark mode".to_string(),
        };
        let result: GenerationResult = output.into();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.entry_content(), Some("<html>v2</html>"));
    }

    #[test]
    fn test_schemas_require_all_fields() {
        let schema = new_project_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);

        let schema = update_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
    }
}
