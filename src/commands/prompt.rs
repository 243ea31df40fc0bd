use dialoguer::FuzzySelect;

use targetsync::domain::entities::Target;
use targetsync::domain::ports::TargetPrompt;

/// Fuzzy-select prompt on the terminal
pub(crate) struct DialoguerPrompt {
    pub prompt: String,
}

impl TargetPrompt for DialoguerPrompt {
    fn choose(&self, candidates: &[&Target]) -> Option<usize> {
        let items: Vec<String> = candidates
            .iter()
            .map(|target| match &target.description {
                Some(description) if !description.trim().is_empty() => {
                    format!("{} ({})", target.name, description)
                }
                _ => target.name.clone(),
            })
            .collect();

        FuzzySelect::new()
            .with_prompt(&self.prompt)
            .items(&items)
            .default(0)
            .interact_opt()
            .ok()
            .flatten()
    }
}
