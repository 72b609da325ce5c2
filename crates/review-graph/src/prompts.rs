//! Review prompt templates
//!
//! Every agent uses the same shape: a fixed instruction, then the diff
//! interpolated verbatim inside a `diff` code fence. The diff is never
//! truncated or escaped.

use crate::node::ReviewNode;

/// Prompt templates for the review agents
pub struct ReviewPrompts;

impl ReviewPrompts {
    /// Instruction text for a node, without the diff.
    pub fn instruction(node: ReviewNode) -> &'static str {
        match node {
            ReviewNode::Summarize => {
                "You are a senior Android developer. Summarize the following code diff:"
            }
            ReviewNode::Critique => {
                "Critique this commit for potential bugs, poor practices, or risky logic:"
            }
            ReviewNode::Suggestions => "Suggest clear improvements to this commit:",
            ReviewNode::Security => {
                "You are an application security reviewer. Identify security issues in this \
                 commit: injection, unsafe input handling, hard-coded secrets, insecure storage, \
                 exported components, or weakened permissions. Reply with concrete findings only:"
            }
            ReviewNode::Architecture => {
                "You are a software architect. Review this commit for layering violations, \
                 coupling between modules, misplaced responsibilities, and deviations from \
                 clean architecture or MVVM conventions:"
            }
            ReviewNode::TestCoverage => {
                "Review the tests in this commit. Point out untested branches, missing edge \
                 cases, weak assertions, and tests that do not exercise the changed code:"
            }
            ReviewNode::Ui => {
                "You are a Jetpack Compose and Android UI expert. Review the UI changes in this \
                 commit for recomposition cost, state hoisting, modifier ordering, \
                 accessibility, and layout issues:"
            }
            ReviewNode::Dependency => {
                "Review the dependency changes in this commit. Flag outdated or vulnerable \
                 versions, unnecessary additions, duplicate libraries, and version conflicts:"
            }
            ReviewNode::Performance => {
                "Review this commit for performance problems: work on the main thread, \
                 unnecessary allocations, inefficient loops or queries, and memory leaks:"
            }
            ReviewNode::Readability => {
                "Review this commit for readability: naming, function length, comments, \
                 dead code, and consistency with the surrounding code style:"
            }
        }
    }

    /// Full prompt for a node with the diff interpolated.
    pub fn build(node: ReviewNode, diff: &str) -> String {
        format!("{}\n\n```diff\n{}\n```", Self::instruction(node), diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spine_prompts() {
        assert_eq!(
            ReviewPrompts::build(ReviewNode::Summarize, "+a"),
            "You are a senior Android developer. Summarize the following code diff:\n\n```diff\n+a\n```"
        );
        assert!(ReviewPrompts::build(ReviewNode::Critique, "+a").starts_with("Critique this commit"));
        assert!(ReviewPrompts::build(ReviewNode::Suggestions, "+a").starts_with("Suggest clear"));
    }

    #[test]
    fn test_diff_interpolated_verbatim() {
        let diff = "--- a/x.kt\n+++ b/x.kt\n+val s = \"${'$'}{name}\" // `tick` {braces}\n\n\n";
        for node in ReviewNode::ALL {
            let prompt = ReviewPrompts::build(node, diff);
            assert!(prompt.contains(diff), "{node} prompt must carry the diff verbatim");
        }
    }

    #[test]
    fn test_large_diff_not_truncated() {
        let diff = "+x\n".repeat(50_000);
        let prompt = ReviewPrompts::build(ReviewNode::Readability, &diff);
        assert!(prompt.len() > diff.len());
        assert!(prompt.contains(&diff));
    }

    #[test]
    fn test_every_node_has_instruction() {
        for node in ReviewNode::ALL {
            assert!(!ReviewPrompts::instruction(node).is_empty());
        }
    }
}
