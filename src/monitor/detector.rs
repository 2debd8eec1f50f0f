//! # Command Detection
//!
//! Recognizes well-known slow commands to give the status line a friendly
//! description, and flags commands that would sit waiting for keyboard input
//! (the game owns the keyboard, so they would never finish).

/// What we know about a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Shown on the status line.
    pub description: &'static str,
    /// A non-interactive alternative, when the command is known to prompt.
    pub interactive_hint: Option<&'static str>,
}

const KNOWN_COMMANDS: &[(&str, &str)] = &[
    ("docker pull", "Pulling Docker image"),
    ("docker build", "Building Docker image"),
    ("docker compose up", "Starting Docker Compose services"),
    ("kubectl apply", "Applying Kubernetes manifests"),
    ("eksctl create", "Creating EKS cluster"),
    ("npm install", "Installing NPM packages"),
    ("npm ci", "Installing NPM packages"),
    ("yarn install", "Installing Yarn packages"),
    ("npx create-next-app", "Creating Next.js application"),
    ("create-next-app", "Creating Next.js application"),
    ("npm init", "Initializing NPM package"),
    ("yarn init", "Initializing Yarn package"),
    ("go mod download", "Downloading Go dependencies"),
    ("go build", "Building Go project"),
    ("cargo build", "Building Rust project"),
    ("cargo install", "Installing Rust crate"),
];

const GENERIC_DESCRIPTION: &str = "Running command";

/// Commands that prompt unless one of the listed flags is present.
const INTERACTIVE_COMMANDS: &[(&str, &[&str], &str)] = &[
    ("npm init", &["-y", "--yes"], "npm init -y"),
    ("yarn init", &["-y", "--yes"], "yarn init -y"),
    (
        "npx create-next-app",
        &["--yes", "--ts", "--js", "--typescript", "--javascript"],
        "npx create-next-app@latest my-app --ts --eslint --app --use-npm",
    ),
    (
        "create-next-app",
        &["--yes", "--ts", "--js", "--typescript", "--javascript"],
        "create-next-app my-app --ts --eslint --app --use-npm",
    ),
];

pub fn detect(command_line: &str) -> Detection {
    let normalized = command_line.split_whitespace().collect::<Vec<_>>().join(" ");

    let description = KNOWN_COMMANDS
        .iter()
        .find(|(pattern, _)| has_command_prefix(&normalized, pattern))
        .map(|(_, description)| *description)
        .unwrap_or(GENERIC_DESCRIPTION);

    let interactive_hint = INTERACTIVE_COMMANDS
        .iter()
        .find(|(pattern, skip_flags, _)| {
            has_command_prefix(&normalized, pattern)
                && !normalized
                    .split(' ')
                    .any(|arg| skip_flags.contains(&arg))
        })
        .map(|(_, _, hint)| *hint);

    Detection {
        description,
        interactive_hint,
    }
}

/// Prefix match on whole words: `npm install` matches `npm install -D x`
/// but `npm i` does not match `npm init`.
fn has_command_prefix(command_line: &str, pattern: &str) -> bool {
    let mut words = command_line.split(' ');
    pattern.split(' ').all(|expected| {
        words
            .next()
            .map(|word| word == expected || word.starts_with(&format!("{expected}@")))
            .unwrap_or(false)
    })
}
