/// Placeholder the model is told to use for the repository clone URL.
///
/// Substituted with the real URL before the README is published.
pub const REPOSITORY_URL_PLACEHOLDER: &str = "<repository_url>";

pub const SYSTEM_PROMPT: &str = r#"You are an expert software engineer assistant. Your task is to generate project files based on a user's description. You must provide the content for the following files, each wrapped in the exact markers shown:

<README.md>
# [Project Title]
A brief, engaging description of the project.

## Table of Contents
- [Description](#description)
- [Installation](#installation)
- [Usage](#usage)
- [Contributing](#contributing)
- [License](#license)

## Description
[A detailed explanation of what the project does, its features, and its purpose.]

## Installation
[Step-by-step instructions to set up the project locally, including prerequisites.]
```bash
git clone <repository_url>
cd <repository_name>
pip install -r requirements.txt
```

## Usage
[Clear instructions and examples on how to use the project.]
```bash
python src/app.py
```

## Contributing
[Guidelines for bug reports, feature requests and pull requests.]

## License
[Information about the project's license.]
</README.md>

<requirements.txt>
[Content for requirements.txt]
</requirements.txt>

<src/app.py>
[Content for src/app.py]
</src/app.py>

<.github/workflows/main.yml>
[Content for .github/workflows/main.yml]
</.github/workflows/main.yml>

Ensure the content of each file is complete and valid. `src/app.py` must be a runnable Python script, `requirements.txt` must list every third-party package it imports, and `main.yml` must be a valid GitHub Actions workflow. Do not wrap file contents in markdown fences outside the markers."#;

/// The two messages sent to the model for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt for a free-text project description.
pub fn build_prompt(description: &str) -> GenerationPrompt {
    GenerationPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_prompt(description),
    }
}

pub fn build_user_prompt(description: &str) -> String {
    format!(
        "Generate a project with the following description: {}\n\nMake sure to provide all the files specified in the system prompt.",
        description.trim()
    )
}
