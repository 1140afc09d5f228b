//! Prompt construction.
//!
//! The prompt is provider-agnostic and fully determined by its inputs:
//! identical inputs always produce byte-identical text.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::domain::GenerationStage;
use crate::domain::value_objects::fence_language;

/// The manifest shape every stage asks for, shown to the model verbatim.
pub const MANIFEST_SHAPE: &str = r#"{"files":[{"path": "...", "content": "..."}]}"#;

/// Assemble the instruction document for one stage.
///
/// Sections, in order: role, policy, requirements, prior artifacts (when
/// any, sorted by path), stage instructions, output format.
pub fn build_prompt(
    stage: GenerationStage,
    policy: &str,
    requirements: &str,
    prior_artifacts: &BTreeMap<String, String>,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(role_line(stage));
    prompt.push_str("\n\n# Policy and Guidelines:\n");
    prompt.push_str(policy.trim_end());
    prompt.push_str("\n\n# Requirements:\n");
    prompt.push_str(requirements.trim_end());
    prompt.push('\n');

    if !prior_artifacts.is_empty() {
        prompt.push_str("\n# Existing Files:\n");
        for (path, content) in prior_artifacts {
            // Writing into a String cannot fail.
            let _ = write!(
                prompt,
                "\n## {path}\n```{lang}\n{content}\n```\n",
                lang = fence_language(path),
                content = content.trim_end(),
            );
        }
    }

    prompt.push_str("\n# Instructions:\n");
    for (number, step) in instructions(stage).iter().enumerate() {
        let _ = writeln!(prompt, "{}. {step}", number + 1);
    }

    prompt.push_str("\n# Output Format:\n");
    prompt.push_str("Return only a JSON object with exactly this shape:\n");
    prompt.push_str(MANIFEST_SHAPE);
    prompt.push_str("\nPaths are relative to the project root.\n\n");
    prompt.push_str(closing_line(stage));

    prompt
}

fn role_line(stage: GenerationStage) -> &'static str {
    match stage {
        GenerationStage::Domain => {
            "You are a domain modeling expert. Using the policy and the requirements below, \
             generate the domain layer code."
        }
        GenerationStage::Layout => {
            "You are a software architect specializing in layered architecture. Using the policy, \
             the requirements and the existing domain files below, generate the structure of the \
             remaining layers without implementations."
        }
    }
}

fn instructions(stage: GenerationStage) -> Vec<String> {
    let layers = stage.target_layers().join(", ");
    match stage {
        GenerationStage::Domain => vec![
            "Analyze the requirements".into(),
            "Identify aggregates, entities, value objects, domain services and domain errors".into(),
            "Follow the policy strictly".into(),
            format!("Generate code for these layers only: {layers}"),
            "Organize files into aggregates/, entities/, value_objects/, services/ and errors/".into(),
            "Enforce every invariant inside the domain models".into(),
        ],
        GenerationStage::Layout => vec![
            "Analyze the requirements".into(),
            "Review the existing domain files to learn which models exist".into(),
            format!("Design these layers around those models: {layers}"),
            "Follow the policy strictly".into(),
            "Emit structure only; leave file contents empty or minimal".into(),
        ],
    }
}

fn closing_line(stage: GenerationStage) -> &'static str {
    match stage {
        GenerationStage::Domain => "Generate the domain layer code now:",
        GenerationStage::Layout => "Generate the layout structure now:",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifacts() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("src/domain/b.py".to_string(), "class B: ...".to_string());
        map.insert("src/domain/a.py".to_string(), "class A: ...".to_string());
        map
    }

    #[test]
    fn identical_inputs_give_identical_prompts() {
        let first = build_prompt(GenerationStage::Layout, "policy", "reqs", &artifacts());
        let second = build_prompt(GenerationStage::Layout, "policy", "reqs", &artifacts());
        assert_eq!(first, second);
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let prompt = build_prompt(GenerationStage::Layout, "POLICY-TEXT", "REQ-TEXT", &artifacts());

        let policy = prompt.find("POLICY-TEXT").unwrap();
        let reqs = prompt.find("REQ-TEXT").unwrap();
        let files = prompt.find("# Existing Files:").unwrap();
        let instructions = prompt.find("# Instructions:").unwrap();
        let shape = prompt.find(MANIFEST_SHAPE).unwrap();

        assert!(policy < reqs);
        assert!(reqs < files);
        assert!(files < instructions);
        assert!(instructions < shape);
    }

    #[test]
    fn artifacts_are_sorted_and_fenced() {
        let prompt = build_prompt(GenerationStage::Layout, "p", "r", &artifacts());

        let a = prompt.find("## src/domain/a.py").unwrap();
        let b = prompt.find("## src/domain/b.py").unwrap();
        assert!(a < b);
        assert!(prompt.contains("```python\nclass A: ...\n```"));
    }

    #[test]
    fn artifact_section_omitted_when_empty() {
        let prompt = build_prompt(GenerationStage::Domain, "p", "r", &BTreeMap::new());
        assert!(!prompt.contains("# Existing Files:"));
        assert!(prompt.contains(MANIFEST_SHAPE));
    }

    #[test]
    fn instructions_name_target_layers() {
        let domain = build_prompt(GenerationStage::Domain, "p", "r", &BTreeMap::new());
        assert!(domain.contains("these layers only: domain"));

        let layout = build_prompt(GenerationStage::Layout, "p", "r", &BTreeMap::new());
        assert!(layout.contains("application, infrastructure, interface"));
    }
}
