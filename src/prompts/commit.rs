/// Asks for one short commit subject line. `{files}` is the staged file
/// list joined by commas, `{diff}` the staged diff.
pub const COMMIT_PROMPT: &str = "Generate a single line, concise, and descriptive git commit message summarizing the staged changes on the following files: {files}. Do not include bullet points, extra formatting, or multiple lines. Diff:
{diff}";
