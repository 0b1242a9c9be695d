/// Asks for a per-file summary of the staged diff.
pub const STATUS_PROMPT: &str = "Based on the following git diff output for staged changes, provide a single concise sentence that summarizes the changes made to each file. Indicate for each file whether code was added, removed, or modified, and if possible, what kind of changes occurred (for example, bug fixes, refactoring, or feature additions). Do not simply list the file names. Diff:

{diff}";
